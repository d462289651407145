//! Parameter extraction.
//!
//! Maps the capture groups of a matched pattern onto names, positionally.
//! Names are case-insensitive (stored lowercased), a name that occurs more
//! than once collapses into a list, and wildcard captures go to their own
//! ordered list.

use std::collections::BTreeMap;

use serde::Serialize;

use super::pattern::ParamName;

/// Value captured for a named parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Single(String),
    /// The name occurred more than once in the pattern; left-to-right order.
    Multi(Vec<String>),
}

impl ParamValue {
    /// The first captured value.
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        match self {
            ParamValue::Single(v) => Some(v.as_str()),
            ParamValue::Multi(vs) => vs.first().map(String::as_str),
        }
    }

    /// All captured values in capture order.
    #[must_use]
    pub fn all(&self) -> Vec<&str> {
        match self {
            ParamValue::Single(v) => vec![v.as_str()],
            ParamValue::Multi(vs) => vs.iter().map(String::as_str).collect(),
        }
    }

    fn push(&mut self, value: String) {
        match self {
            ParamValue::Single(first) => {
                let first = std::mem::take(first);
                *self = ParamValue::Multi(vec![first, value]);
            }
            ParamValue::Multi(vs) => vs.push(value),
        }
    }
}

/// Named and wildcard values extracted for one matched request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParameterSet {
    values: BTreeMap<String, ParamValue>,
    wildcards: Vec<String>,
}

impl ParameterSet {
    /// Pair `names` with `captured` positionally.
    ///
    /// With `skip_full_match` the first captured value (the whole match) is
    /// dropped before pairing. Unmatched optional captures (`None`) create
    /// no entry. Surplus values or names are ignored.
    #[must_use]
    pub fn extract<'a, I>(names: &[ParamName], captured: I, skip_full_match: bool) -> Self
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let mut set = ParameterSet::default();
        let values = captured.into_iter().skip(usize::from(skip_full_match));

        for (name, value) in names.iter().zip(values) {
            let Some(value) = value else {
                continue;
            };
            match name {
                ParamName::Wildcard => set.wildcards.push(value.to_string()),
                ParamName::Named(name) => set.insert(name, value.to_string()),
            }
        }
        set
    }

    fn insert(&mut self, name: &str, value: String) {
        let key = name.trim_start_matches(':').to_lowercase();
        match self.values.get_mut(&key) {
            Some(existing) => existing.push(value),
            None => {
                self.values.insert(key, ParamValue::Single(value));
            }
        }
    }

    /// First value captured for `name` (case-insensitive).
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.value(name).and_then(ParamValue::first)
    }

    /// Raw value for `name` (case-insensitive).
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(&name.to_lowercase())
    }

    /// Every value captured for `name`, in capture order.
    #[must_use]
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.value(name).map(ParamValue::all).unwrap_or_default()
    }

    #[must_use]
    pub fn values(&self) -> &BTreeMap<String, ParamValue> {
        &self.values
    }

    /// Wildcard captures in left-to-right order.
    #[must_use]
    pub fn wildcards(&self) -> &[String] {
        &self.wildcards
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.wildcards.is_empty()
    }
}
