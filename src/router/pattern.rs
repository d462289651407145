//! Route pattern compiler.
//!
//! Turns an authored route pattern into an anchored regular expression and
//! the ordered list of parameter names its capture groups correspond to.
//!
//! | Token      | Meaning                                             |
//! |------------|-----------------------------------------------------|
//! | `/literal` | literal path segment                                |
//! | `:name`    | named capture, one or more word/hyphen characters   |
//! | `*`        | wildcard capture, non-greedy, any characters        |
//! | `(...)`    | optional segment, may contain `:name` and `*`       |
//! | `.`        | literal dot                                         |
//!
//! Compilation is a fixed, ordered list of rewrite rules applied to the
//! pattern text (see [`PatternCompiler::RULE_NAMES`]). Every regex
//! metacharacter that is not route syntax is escaped before any syntax is
//! introduced, and unbalanced parentheses are kept as literals, so every
//! input produces a valid expression.

use std::borrow::Cow;
use std::fmt;

use once_cell::sync::Lazy;
use regex::{Captures, Regex, RegexBuilder};
use tracing::{debug, warn};

/// Placeholder for the opening of an optional group while the remaining
/// rules run; swapped for `(?:` at the end.
const GROUP_OPEN: char = '\u{E000}';
/// Placeholder for the closing of an optional group; swapped for `)?`.
const GROUP_CLOSE: char = '\u{E001}';

/// Compiled-size budget for a route expression. Each `:name` compiles to a
/// Unicode word class, so a few hundred parameters outgrow the regex crate's
/// default limit.
pub const EXPRESSION_SIZE_LIMIT: usize = 256 * (1 << 20);

/// Name recorded for a wildcard capture.
pub const WILDCARD: &str = "*";

/// Parameter slot recorded for one capture group, in capture order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamName {
    /// `:name`, stored without the marker and with its authored case.
    Named(String),
    /// `*`
    Wildcard,
}

impl ParamName {
    /// Token as written in the pattern (`:id`, `*`).
    #[must_use]
    pub fn token(&self) -> Cow<'_, str> {
        match self {
            ParamName::Named(name) => Cow::Owned(format!(":{name}")),
            ParamName::Wildcard => Cow::Borrowed(WILDCARD),
        }
    }
}

impl fmt::Display for ParamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token())
    }
}

type Rewrite = fn(&Captures<'_>) -> String;

struct RewriteRule {
    name: &'static str,
    pattern: Regex,
    rewrite: Rewrite,
    /// Re-apply until the text stops changing (nested optional groups).
    until_stable: bool,
}

impl RewriteRule {
    fn new(name: &'static str, pattern: &str, rewrite: Rewrite) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("route rewrite rule should be valid"),
            rewrite,
            until_stable: false,
        }
    }

    fn until_stable(mut self) -> Self {
        self.until_stable = true;
        self
    }

    fn apply(&self, input: &str) -> String {
        let mut text = self.pattern.replace_all(input, self.rewrite).into_owned();
        if self.until_stable {
            loop {
                let next = self.pattern.replace_all(&text, self.rewrite);
                if next == text {
                    break;
                }
                text = next.into_owned();
            }
        }
        text
    }
}

fn escape_literal(caps: &Captures<'_>) -> String {
    let matched = &caps[0];
    match matched.chars().next() {
        Some(c @ (GROUP_OPEN | GROUP_CLOSE)) => format!("\\x{{{:X}}}", c as u32),
        _ => regex::escape(matched),
    }
}

static RULES: Lazy<Vec<RewriteRule>> = Lazy::new(|| {
    vec![
        RewriteRule::new("leading_slashes", r"\A/+", |_| String::new()),
        RewriteRule::new("trailing_slashes", r"/+\z", |_| String::new()),
        RewriteRule::new("separators", r"/{2,}", |_| "/".to_string()),
        RewriteRule::new(
            "literals",
            r"[\\.+?^$|\[\]{}\x{E000}\x{E001}]",
            escape_literal,
        ),
        RewriteRule::new("optional_groups", r"\(([^()]*)\)", |caps| {
            format!("{GROUP_OPEN}{}{GROUP_CLOSE}", &caps[1])
        })
        .until_stable(),
        RewriteRule::new("stray_parens", r"[()]", |caps| format!("\\{}", &caps[0])),
        RewriteRule::new("wildcards", r"\*", |_| "(.*?)".to_string()),
        RewriteRule::new("named_params", r":[\w\-]+", |_| r"([\w\-]+)".to_string()),
        RewriteRule::new("group_markers", r"[\x{E000}\x{E001}]", |caps| {
            if caps[0].starts_with(GROUP_OPEN) {
                "(?:".to_string()
            } else {
                ")?".to_string()
            }
        }),
    ]
});

static PARAM_TOKENS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r":([\w\-]+)|\*").expect("route parameter token regex should be valid")
});

/// Compiles route patterns. Stateless; see [`PatternCompiler::compile`].
pub struct PatternCompiler;

impl PatternCompiler {
    /// Rewrite rules in the order they are applied.
    pub const RULE_NAMES: [&'static str; 9] = [
        "leading_slashes",
        "trailing_slashes",
        "separators",
        "literals",
        "optional_groups",
        "stray_parens",
        "wildcards",
        "named_params",
        "group_markers",
    ];

    /// Compile a pattern. Never fails.
    #[must_use]
    pub fn compile(pattern: &str) -> CompiledPattern {
        Self::compile_with_size_limit(pattern, EXPRESSION_SIZE_LIMIT)
    }

    /// Compile a pattern whose expression may use up to `size_limit` bytes.
    ///
    /// An expression over the limit falls back to matching the pattern text
    /// literally (slashes trimmed), which captures no parameters.
    #[must_use]
    pub fn compile_with_size_limit(pattern: &str, size_limit: usize) -> CompiledPattern {
        let body = Self::rewrite(pattern);
        let expression = if body.is_empty() {
            r"\A/?\z".to_string()
        } else {
            format!(r"\A/?{body}/?\z")
        };
        let param_names = Self::param_names(pattern);

        let built = RegexBuilder::new(&expression)
            .size_limit(size_limit)
            .build();
        let matcher = match built {
            Ok(regex) => PathMatcher::Expression(regex),
            Err(e) => {
                // Only reachable when the expression exceeds `size_limit`.
                warn!(
                    pattern = %pattern,
                    size_limit,
                    error = %e,
                    "Route pattern too large for an expression; matching it literally"
                );
                PathMatcher::Exact(pattern.trim_matches('/').to_string())
            }
        };

        debug!(
            pattern = %pattern,
            expression = %expression,
            param_count = param_names.len(),
            "Route pattern compiled"
        );

        CompiledPattern {
            raw: pattern.to_string(),
            expression,
            matcher,
            param_names,
        }
    }

    /// Run every rewrite rule over `pattern`, returning the unanchored body.
    #[must_use]
    pub fn rewrite(pattern: &str) -> String {
        RULES
            .iter()
            .fold(pattern.to_string(), |text, rule| rule.apply(&text))
    }

    /// Apply a single named rule. Returns `None` for an unknown rule name.
    #[must_use]
    pub fn apply_rule(name: &str, input: &str) -> Option<String> {
        RULES
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.apply(input))
    }

    fn param_names(pattern: &str) -> Vec<ParamName> {
        PARAM_TOKENS
            .captures_iter(pattern)
            .map(|caps| match caps.get(1) {
                Some(name) => ParamName::Named(name.as_str().to_string()),
                None => ParamName::Wildcard,
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
enum PathMatcher {
    Expression(Regex),
    Exact(String),
}

/// A route pattern compiled once at registration time.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    raw: String,
    expression: String,
    matcher: PathMatcher,
    param_names: Vec<ParamName>,
}

impl CompiledPattern {
    /// The pattern as authored.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The anchored expression the pattern compiled to.
    #[must_use]
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Parameter slots, one per capture group, in capture order.
    #[must_use]
    pub fn param_names(&self) -> &[ParamName] {
        &self.param_names
    }

    #[must_use]
    pub fn is_match(&self, path: &str) -> bool {
        match &self.matcher {
            PathMatcher::Expression(regex) => regex.is_match(path),
            PathMatcher::Exact(body) => path.trim_matches('/') == body.as_str(),
        }
    }

    /// Captured values for `path`, index 0 being the whole match.
    ///
    /// Unmatched optional groups are `None`.
    #[must_use]
    pub fn captures<'p>(&self, path: &'p str) -> Option<Vec<Option<&'p str>>> {
        match &self.matcher {
            PathMatcher::Expression(regex) => regex
                .captures(path)
                .map(|caps| caps.iter().map(|m| m.map(|m| m.as_str())).collect()),
            PathMatcher::Exact(_) => self.is_match(path).then(|| vec![Some(path)]),
        }
    }
}

impl PartialEq for CompiledPattern {
    fn eq(&self, other: &Self) -> bool {
        self.expression == other.expression && self.param_names == other.param_names
    }
}

impl Eq for CompiledPattern {}
