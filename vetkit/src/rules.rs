//! Declared validation rules.
//!
//! A form request advertises the rules it validates with so tests can assert
//! against the declaration itself, independent of any particular payload.
//! Rules use the compact `name:param1,param2` notation, the same shape the
//! failed-rules map reports.

use std::collections::BTreeMap;
use std::fmt;

/// A single validation rule, such as `required` or `min:8`.
///
/// Names are stored lower-cased so comparisons never depend on how the
/// rule was written down.
///
/// # Examples
///
/// ```
/// use vetkit::rules::Rule;
///
/// let rule = Rule::from("Min:8");
/// assert_eq!(rule.name(), "min");
/// assert_eq!(rule.params(), ["8"]);
/// assert_eq!(rule.to_string(), "min:8");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    name: String,
    params: Vec<String>,
}

impl Rule {
    /// Creates a rule with no parameters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().to_lowercase(),
            params: Vec::new(),
        }
    }

    /// Appends a parameter to the rule.
    pub fn param(mut self, param: impl Into<String>) -> Self {
        self.params.push(param.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.params.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}:{}", self.name, self.params.join(","))
        }
    }
}

impl From<&str> for Rule {
    /// Parses the `name:param1,param2` notation.
    fn from(raw: &str) -> Self {
        match raw.split_once(':') {
            Some((name, params)) => Self {
                name: name.to_lowercase(),
                params: params.split(',').map(str::to_string).collect(),
            },
            None => Self::new(raw),
        }
    }
}

impl From<String> for Rule {
    fn from(raw: String) -> Self {
        Rule::from(raw.as_str())
    }
}

/// The full set of rules a form request declares, keyed by field name.
///
/// # Examples
///
/// ```
/// use vetkit::rules::{Rule, RuleSet};
///
/// let rules = RuleSet::new()
///     .field("email", ["required", "email"])
///     .field("password", ["required", "min:8"]);
///
/// assert!(rules.has("email", &Rule::new("required")));
/// assert_eq!(rules.rules_for("password").len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    fields: BTreeMap<String, Vec<Rule>>,
}

impl RuleSet {
    /// Creates an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares the rules for one field.
    pub fn field<I, R>(mut self, name: impl Into<String>, rules: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<Rule>,
    {
        self.fields
            .entry(name.into())
            .or_default()
            .extend(rules.into_iter().map(Into::into));
        self
    }

    /// The rules declared for a field, empty when the field declares none.
    pub fn rules_for(&self, field: &str) -> &[Rule] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether a field declares the given rule.
    pub fn has(&self, field: &str, rule: &Rule) -> bool {
        self.rules_for(field).contains(rule)
    }

    /// Iterates over fields and their rules in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &[Rule])> {
        self.fields.iter().map(|(name, rules)| (name, rules.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }
}
