//! Assertions over a validation run.
//!
//! [`ValidationOutcome`] is what the harness returns from `validate`. It
//! never fails on its own; each `assert_*` method panics with a descriptive
//! message when its expectation does not hold, which is how test failures
//! surface. Assertions borrow the outcome, so they chain.

use std::collections::BTreeMap;

use crate::report::ValidationReport;
use crate::rules::{Rule, RuleSet};

/// An expectation against the failed-rules map.
///
/// `Contains` matches when the named field's concatenated failures contain
/// the fragment, so `"min"` matches `"requiredmin:8"`. `Rule` matches when
/// any field's failures render exactly to the rule, the way rule objects
/// are matched by their lower-cased name.
#[derive(Debug, Clone, PartialEq)]
pub enum Expected {
    Contains(String),
    Rule(Rule),
}

impl From<&str> for Expected {
    fn from(fragment: &str) -> Self {
        Expected::Contains(fragment.to_string())
    }
}

impl From<String> for Expected {
    fn from(fragment: String) -> Self {
        Expected::Contains(fragment)
    }
}

impl From<Rule> for Expected {
    fn from(rule: Rule) -> Self {
        Expected::Rule(rule)
    }
}

/// The result of one `validate` call: the validation report plus the rules
/// the form request declares.
///
/// # Examples
///
/// ```ignore
/// let outcome = TestFormRequest::<StoreOrderRequest>::new()
///     .validate(json!({"email": "not-an-email"}));
///
/// outcome
///     .assert_fails_with([("email", "email")])
///     .assert_has_rule("email", "required");
/// ```
#[derive(Debug, Clone)]
pub struct ValidationOutcome {
    report: ValidationReport,
    rules: RuleSet,
}

impl ValidationOutcome {
    pub(crate) fn new(report: ValidationReport, rules: RuleSet) -> Self {
        Self { report, rules }
    }

    /// The underlying report, for inspection beyond the assertions here.
    pub fn report(&self) -> &ValidationReport {
        &self.report
    }

    /// The rules the form request declared.
    pub fn declared_rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Whether validation passed.
    pub fn passes(&self) -> bool {
        self.report.passes()
    }

    /// Whether validation failed.
    pub fn fails(&self) -> bool {
        self.report.fails()
    }

    /// The failed-rules map, empty when validation passed.
    pub fn failed_rules(&self) -> BTreeMap<String, String> {
        self.report.failed_rules()
    }

    /// Asserts validation passed.
    pub fn assert_passes(&self) -> &Self {
        if self.fails() {
            panic!(
                "Validation of the payload:\n{}\ndid not pass validation rules\n{}\n",
                self.report.payload().pretty(),
                self.pretty_failed_rules(),
            );
        }
        self
    }

    /// Asserts validation failed.
    pub fn assert_fails(&self) -> &Self {
        if self.passes() {
            panic!(
                "Expected validation to fail, but the payload passed validation rules\n{}\n",
                self.report.payload().pretty(),
            );
        }
        self
    }

    /// Asserts validation failed, then checks each `(field, expectation)`
    /// pair against the failed-rules map.
    pub fn assert_fails_with<I, K, E>(&self, expected: I) -> &Self
    where
        I: IntoIterator<Item = (K, E)>,
        K: AsRef<str>,
        E: Into<Expected>,
    {
        self.assert_fails();
        let failed = self.failed_rules();

        for (field, expectation) in expected {
            let field = field.as_ref();
            match expectation.into() {
                Expected::Contains(fragment) => {
                    let Some(rules) = failed.get(field) else {
                        panic!(
                            "Field \"{field}\" is not among the failed fields\n{}\n",
                            self.pretty_failed_rules(),
                        );
                    };
                    if !rules.contains(&fragment) {
                        panic!(
                            "The failed rules for field \"{field}\" do not contain \"{fragment}\" (got \"{rules}\")",
                        );
                    }
                }
                Expected::Rule(rule) => {
                    let rendered = rule.to_string();
                    if !failed.values().any(|rules| *rules == rendered) {
                        panic!(
                            "The failed rules do not contain \"{rendered}\"\n{}\n",
                            self.pretty_failed_rules(),
                        );
                    }
                }
            }
        }
        self
    }

    /// Asserts `rule` is among the rules declared for `field`, whether or
    /// not that rule failed for this payload.
    pub fn assert_has_rule(&self, field: &str, rule: impl Into<Rule>) -> &Self {
        let rule = rule.into();
        if !self.rules.has(field, &rule) {
            let declared: Vec<String> = self
                .rules
                .rules_for(field)
                .iter()
                .map(ToString::to_string)
                .collect();
            panic!(
                "Field \"{field}\" does not declare the rule \"{rule}\"\ndeclared rules for \"{field}\": {declared:?}",
            );
        }
        self
    }

    /// Asserts `message` appears among the rendered failure messages.
    pub fn assert_has_message(&self, message: &str) -> &Self {
        let messages = self.report.messages();
        if !messages.iter().any(|m| m == message) {
            panic!(
                "\"{message}\" was not contained in the failed validation messages\n{}",
                pretty_messages(&messages),
            );
        }
        self
    }

    /// Asserts `message` appears among the failure messages for one field.
    pub fn assert_has_message_for(&self, field: &str, message: &str) -> &Self {
        let messages = self.report.messages_for(field);
        if !messages.iter().any(|m| m == message) {
            panic!(
                "\"{message}\" was not contained in the failed {field} validation messages\n{}",
                pretty_messages(&messages),
            );
        }
        self
    }

    /// Asserts each `(field, expectation)` pair is absent from the
    /// failed-rules map. Trivially satisfied when validation passed.
    pub fn assert_rules_without_failures<I, K, E>(&self, expected: I) -> &Self
    where
        I: IntoIterator<Item = (K, E)>,
        K: AsRef<str>,
        E: Into<Expected>,
    {
        if self.passes() {
            tracing::debug!("validation passed, no failed rules to check");
            return self;
        }
        let failed = self.failed_rules();

        for (field, expectation) in expected {
            let field = field.as_ref();
            match expectation.into() {
                Expected::Contains(fragment) => {
                    if let Some(rules) = failed.get(field) {
                        if rules.contains(&fragment) {
                            panic!(
                                "Field \"{field}\" unexpectedly failed with \"{fragment}\" (got \"{rules}\")",
                            );
                        }
                    }
                }
                Expected::Rule(rule) => {
                    let rendered = rule.to_string();
                    if failed.values().any(|rules| *rules == rendered) {
                        panic!(
                            "The failed rules unexpectedly contain \"{rendered}\"\n{}\n",
                            self.pretty_failed_rules(),
                        );
                    }
                }
            }
        }
        self
    }

    /// Dumps the payload and the failed-rules map, then halts the test.
    /// Debug aid only.
    pub fn dump_failed_rules(&self) -> ! {
        panic!(
            "payload:\n{}\nfailed rules:\n{}",
            self.report.payload().pretty(),
            self.pretty_failed_rules(),
        );
    }

    fn pretty_failed_rules(&self) -> String {
        serde_json::to_string_pretty(&self.failed_rules()).unwrap_or_else(|_| "{}".to_string())
    }
}

fn pretty_messages(messages: &[String]) -> String {
    serde_json::to_string_pretty(messages).unwrap_or_else(|_| "[]".to_string())
}
