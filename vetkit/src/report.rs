//! The outcome of one validation run, in an assertable shape.
//!
//! [`ValidationReport`] wraps the payload that was validated together with
//! the errors the validator produced, and renders them into the compact
//! failed-rules notation the assertion layer matches against.

use std::collections::BTreeMap;

use serde_json::Value;
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::payload::Payload;

/// What a single validation run produced: the payload that went in and the
/// validator errors that came out, if any.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    payload: Payload,
    errors: Option<ValidationErrors>,
}

impl ValidationReport {
    pub(crate) fn new(payload: Payload, errors: Option<ValidationErrors>) -> Self {
        Self { payload, errors }
    }

    /// Whether validation passed.
    pub fn passes(&self) -> bool {
        self.errors.is_none()
    }

    /// Whether validation failed.
    pub fn fails(&self) -> bool {
        self.errors.is_some()
    }

    /// The payload this report was produced from.
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// The raw validator errors, when validation failed.
    pub fn errors(&self) -> Option<&ValidationErrors> {
        self.errors.as_ref()
    }

    /// The failed rules, one entry per failed field.
    ///
    /// Each failure renders as the lower-cased rule code, followed by `:`
    /// and its parameters when it has any. Parameters are ordered by
    /// parameter name, and the echoed `value` parameter is left out, so
    /// `length(min = 8)` renders as `length:8`. When several rules fail on
    /// one field their renderings concatenate directly, without a
    /// separator: a too-short non-email value under `length(min = 8), email`
    /// reads `"length:8email"`. Nested and list errors flatten to dotted
    /// paths such as `address.city` and `items.1.city`.
    pub fn failed_rules(&self) -> BTreeMap<String, String> {
        self.flattened()
            .into_iter()
            .map(|(field, errors)| {
                let rendered: String = errors.iter().map(|error| failed_rule(error)).collect();
                (field, rendered)
            })
            .collect()
    }

    /// Every failure message across all fields, in field order.
    ///
    /// A rule declared with `message = "..."` reports that message; rules
    /// without one fall back to the validator's own rendering.
    pub fn messages(&self) -> Vec<String> {
        self.flattened()
            .into_values()
            .flat_map(|errors| errors.into_iter().map(ToString::to_string))
            .collect()
    }

    /// The failure messages recorded for one field.
    pub fn messages_for(&self, field: &str) -> Vec<String> {
        self.flattened()
            .remove(field)
            .map(|errors| errors.into_iter().map(ToString::to_string).collect())
            .unwrap_or_default()
    }

    fn flattened(&self) -> BTreeMap<String, Vec<&ValidationError>> {
        let mut flat = BTreeMap::new();
        if let Some(errors) = &self.errors {
            flatten(None, errors, &mut flat);
        }
        flat
    }
}

fn flatten<'e>(
    prefix: Option<&str>,
    errors: &'e ValidationErrors,
    out: &mut BTreeMap<String, Vec<&'e ValidationError>>,
) {
    for (field, kind) in errors.errors() {
        let path = match prefix {
            Some(prefix) => format!("{prefix}.{field}"),
            None => field.to_string(),
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                out.entry(path).or_default().extend(field_errors.iter());
            }
            ValidationErrorsKind::Struct(inner) => flatten(Some(&path), inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    flatten(Some(&format!("{path}.{index}")), inner, out);
                }
            }
        }
    }
}

fn failed_rule(error: &ValidationError) -> String {
    let mut params: Vec<(&str, String)> = error
        .params
        .iter()
        .filter(|(name, _)| name.as_ref() != "value")
        .map(|(name, value)| (name.as_ref(), param_display(value)))
        .collect();
    params.sort_by(|a, b| a.0.cmp(b.0));

    let mut rendered = error.code.to_lowercase();
    if !params.is_empty() {
        rendered.push(':');
        let values: Vec<&str> = params.iter().map(|(_, value)| value.as_str()).collect();
        rendered.push_str(&values.join(","));
    }
    rendered
}

fn param_display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        // Range bounds serialize as floats; 18.0 should read as 18.
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else if let Some(f) = n.as_f64() {
                if f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 {
                    format!("{}", f as i64)
                } else {
                    f.to_string()
                }
            } else {
                n.to_string()
            }
        }
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use validator::Validate;

    #[derive(Debug, Validate)]
    struct Signup {
        #[validate(required, email)]
        email: Option<String>,
        #[validate(length(min = 8))]
        password: Option<String>,
    }

    fn report_for(value: &impl Validate) -> ValidationReport {
        ValidationReport::new(Payload::new(), value.validate().err())
    }

    #[test]
    fn test_passing_report_has_no_failed_rules() {
        let report = report_for(&Signup {
            email: Some("a@b.com".to_string()),
            password: None,
        });

        assert!(report.passes());
        assert!(!report.fails());
        assert!(report.failed_rules().is_empty());
        assert!(report.messages().is_empty());
    }

    #[test]
    fn test_missing_required_field_reports_required() {
        let report = report_for(&Signup {
            email: None,
            password: None,
        });

        assert!(report.fails());
        let failed = report.failed_rules();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed.get("email"), Some(&"required".to_string()));
    }

    #[test]
    fn test_invalid_value_reports_rule_code() {
        let report = report_for(&Signup {
            email: Some("not-an-email".to_string()),
            password: None,
        });

        let failed = report.failed_rules();
        assert_eq!(failed.get("email"), Some(&"email".to_string()));
    }

    #[test]
    fn test_rule_params_render_after_colon() {
        let report = report_for(&Signup {
            email: Some("a@b.com".to_string()),
            password: Some("short".to_string()),
        });

        let failed = report.failed_rules();
        assert_eq!(failed.get("password"), Some(&"length:8".to_string()));
    }

    #[test]
    fn test_multiple_failures_concatenate_without_separator() {
        #[derive(Debug, Validate)]
        struct Contact {
            #[validate(length(min = 8), email)]
            address: Option<String>,
        }

        let report = report_for(&Contact {
            address: Some("short".to_string()),
        });

        let failed = report.failed_rules();
        assert_eq!(failed.get("address"), Some(&"length:8email".to_string()));
    }

    #[test]
    fn test_numeric_params_render_as_integers() {
        #[derive(Debug, Validate)]
        struct Signee {
            #[validate(range(min = 18))]
            age: Option<u32>,
        }

        let report = report_for(&Signee { age: Some(5) });

        let failed = report.failed_rules();
        assert_eq!(failed.get("age"), Some(&"range:18".to_string()));
    }

    #[test]
    fn test_nested_struct_errors_flatten_to_dotted_paths() {
        #[derive(Debug, Validate)]
        struct Address {
            #[validate(length(min = 2))]
            city: String,
        }

        #[derive(Debug, Validate)]
        struct Profile {
            #[validate(nested)]
            address: Address,
        }

        let report = report_for(&Profile {
            address: Address {
                city: "x".to_string(),
            },
        });

        let failed = report.failed_rules();
        assert_eq!(failed.get("address.city"), Some(&"length:2".to_string()));
    }

    #[test]
    fn test_list_errors_flatten_with_index() {
        #[derive(Debug, Validate)]
        struct Address {
            #[validate(length(min = 2))]
            city: String,
        }

        #[derive(Debug, Validate)]
        struct Batch {
            #[validate(nested)]
            items: Vec<Address>,
        }

        let report = report_for(&Batch {
            items: vec![
                Address {
                    city: "Lisbon".to_string(),
                },
                Address {
                    city: "x".to_string(),
                },
            ],
        });

        let failed = report.failed_rules();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed.get("items.1.city"), Some(&"length:2".to_string()));
    }

    #[test]
    fn test_custom_messages_are_reported() {
        #[derive(Debug, Validate)]
        struct Invite {
            #[validate(email(message = "must be a valid email address"))]
            email: String,
        }

        let report = report_for(&Invite {
            email: "nope".to_string(),
        });

        assert_eq!(report.messages(), ["must be a valid email address"]);
        assert_eq!(
            report.messages_for("email"),
            ["must be a valid email address"]
        );
        assert!(report.messages_for("name").is_empty());
    }

    #[test]
    fn test_report_keeps_the_payload() {
        let payload = Payload::from(json!({"email": "a@b.com"}));
        let report = ValidationReport::new(payload.clone(), None);
        assert_eq!(report.payload(), &payload);
    }
}
