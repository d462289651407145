use super::{ParamName, ParameterSet, PatternCompiler};

#[test]
fn test_root_path() {
    let pattern = PatternCompiler::compile("/");
    assert!(pattern.is_match("/"));
    assert!(pattern.is_match(""));
    assert!(!pattern.is_match("/a"));
    assert!(pattern.param_names().is_empty());
}

#[test]
fn test_leading_and_trailing_slashes_are_optional() {
    let pattern = PatternCompiler::compile("/foo");
    assert!(pattern.is_match("/foo"));
    assert!(pattern.is_match("foo"));
    assert!(pattern.is_match("/foo/"));
    assert!(!pattern.is_match("/foobar"));
    let doubled = PatternCompiler::compile("//foo//");
    assert_eq!(pattern.expression(), doubled.expression());
}

#[test]
fn test_matching_is_anchored_and_case_sensitive() {
    let pattern = PatternCompiler::compile("/about");
    assert!(!pattern.is_match("/x/about"));
    assert!(!pattern.is_match("/about/x"));
    assert!(!pattern.is_match("/About"));
}

#[test]
fn test_compilation_is_deterministic() {
    for raw in ["/", "/a/:b", "/*/:file.:ext", "/x(.:fmt)", "/((a))", "weird)(+?"] {
        let first = PatternCompiler::compile(raw);
        let second = PatternCompiler::compile(raw);
        assert_eq!(first.expression(), second.expression());
        assert_eq!(first.param_names(), second.param_names());
        assert_eq!(first, second);
    }
}

#[test]
fn test_param_names_in_capture_order() {
    let pattern = PatternCompiler::compile("/*/:file.:ext");
    assert_eq!(
        pattern.param_names(),
        [
            ParamName::Wildcard,
            ParamName::Named("file".into()),
            ParamName::Named("ext".into()),
        ]
    );
}

#[test]
fn test_dots_are_literal() {
    let pattern = PatternCompiler::compile("/feed.xml");
    assert!(pattern.is_match("/feed.xml"));
    assert!(!pattern.is_match("/feedxxml"));
}

#[test]
fn test_named_params_accept_word_and_hyphen() {
    let pattern = PatternCompiler::compile("/posts/:post-slug");
    let caps = pattern.captures("/posts/hello_world-2").unwrap();
    assert_eq!(caps[1], Some("hello_world-2"));
    assert!(!pattern.is_match("/posts/a/b"));
    let slug = ParamName::Named("post-slug".into());
    assert_eq!(pattern.param_names(), [slug]);
}

#[test]
fn test_named_params_are_unicode_aware() {
    let pattern = PatternCompiler::compile("/tag/:name");
    assert!(pattern.is_match("/tag/café"));
}

#[test]
fn test_wildcard_is_non_greedy() {
    let pattern = PatternCompiler::compile("/*/*");
    let caps = pattern.captures("/a/b/c").unwrap();
    assert_eq!(caps[1], Some("a"));
    assert_eq!(caps[2], Some("b/c"));

    let pattern = PatternCompiler::compile("/files/*/:name.:ext");
    let caps = pattern.captures("/files/a/b/c.txt").unwrap();
    assert_eq!(caps[1], Some("a/b"));
    assert_eq!(caps[2], Some("c"));
    assert_eq!(caps[3], Some("txt"));
    // named params never span a dot
    assert!(!pattern.is_match("/files/a/c.tar.gz"));
}

#[test]
fn test_optional_group() {
    let pattern = PatternCompiler::compile("/report(.:format)");
    assert!(pattern.is_match("/report"));
    assert!(pattern.is_match("/report.json"));
    let caps = pattern.captures("/report").unwrap();
    assert_eq!(caps[1], None);
    let caps = pattern.captures("/report.csv").unwrap();
    assert_eq!(caps[1], Some("csv"));
}

#[test]
fn test_nested_optional_groups() {
    let pattern = PatternCompiler::compile("/a(/:b(/:c))");
    assert!(pattern.is_match("/a"));
    assert!(pattern.is_match("/a/1"));
    assert!(pattern.is_match("/a/1/2"));
    assert_eq!(pattern.param_names().len(), 2);
}

#[test]
fn test_malformed_tokens_are_literal() {
    let pattern = PatternCompiler::compile("/a(b");
    assert!(pattern.is_match("/a(b"));

    let pattern = PatternCompiler::compile("/price+tax?/[x]{2}$|^");
    assert!(pattern.is_match("/price+tax?/[x]{2}$|^"));

    let pattern = PatternCompiler::compile("/odd/:");
    assert!(pattern.is_match("/odd/:"));
    assert!(pattern.param_names().is_empty());

    let pattern = PatternCompiler::compile("/back\\slash");
    assert!(pattern.is_match("/back\\slash"));
}

#[test]
fn test_placeholder_characters_in_input_stay_literal() {
    let raw = "/\u{E000}x\u{E001}";
    let pattern = PatternCompiler::compile(raw);
    assert!(pattern.is_match(raw));
}

#[test]
fn test_rules_apply_individually() {
    assert_eq!(
        PatternCompiler::apply_rule("leading_slashes", "///a/b/").as_deref(),
        Some("a/b/")
    );
    assert_eq!(
        PatternCompiler::apply_rule("trailing_slashes", "a/b//").as_deref(),
        Some("a/b")
    );
    assert_eq!(
        PatternCompiler::apply_rule("separators", "a//b///c").as_deref(),
        Some("a/b/c")
    );
    assert_eq!(
        PatternCompiler::apply_rule("literals", "a.b").as_deref(),
        Some(r"a\.b")
    );
    assert_eq!(
        PatternCompiler::apply_rule("wildcards", "a/*").as_deref(),
        Some("a/(.*?)")
    );
    assert_eq!(
        PatternCompiler::apply_rule("named_params", "a/:id").as_deref(),
        Some(r"a/([\w\-]+)")
    );
    assert!(PatternCompiler::apply_rule("nope", "a").is_none());
}

#[test]
fn test_rewrite_of_full_pattern() {
    assert_eq!(
        PatternCompiler::rewrite("/*/:file.:ext"),
        r"(.*?)/([\w\-]+)\.([\w\-]+)"
    );
    assert_eq!(
        PatternCompiler::compile("/x(.:fmt)").expression(),
        r"\A/?x(?:\.([\w\-]+))?/?\z"
    );
}

#[test]
fn test_pattern_with_hundreds_of_params_still_captures() {
    let pattern: String = (0..400).map(|i| format!("/:p{i}")).collect();
    let path: String = (0..400).map(|i| format!("/v{i}")).collect();
    let compiled = PatternCompiler::compile(&pattern);
    assert!(compiled.is_match(&path));

    let captured = compiled.captures(&path).unwrap();
    assert_eq!(captured.len(), 401);
    assert_eq!(captured[400], Some("v399"));
    let params = ParameterSet::extract(compiled.param_names(), captured, true);
    assert_eq!(params.get("p0"), Some("v0"));
    assert_eq!(params.get("p399"), Some("v399"));
}

#[test]
fn test_oversized_expression_matches_pattern_text_literally() {
    let compiled = PatternCompiler::compile_with_size_limit("/users/:id", 16);
    assert_eq!(compiled.expression(), r"\A/?users/([\w\-]+)/?\z");
    assert!(!compiled.is_match("/users/7"));
    assert!(compiled.is_match("/users/:id/"));
    assert_eq!(
        compiled.captures("/users/:id"),
        Some(vec![Some("/users/:id")])
    );
}
