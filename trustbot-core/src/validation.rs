//! Validation System - Rule/Policy Separation
//!
//! Rules produce structured violations.
//! Policy maps violations to actions.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::answers::AnswerSet;
use crate::schema::{DocumentTypeSpec, FieldKind};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViolationSeverity {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationViolation {
    pub rule: String,
    pub field: String,
    pub severity: ViolationSeverity,
    pub message: String,
    pub remediation: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FailureMode {
    Block,
    /// Record violations, render anyway (empty values stay empty).
    #[default]
    Warn,
    /// As `Warn`, and emit each violation through `tracing`.
    Log,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub violations: Vec<ValidationViolation>,
    pub type_id: String,
}

impl ValidationResult {
    pub fn has_errors(&self) -> bool {
        self.violations.iter().any(|v| v.severity == ViolationSeverity::Error)
    }
}

pub trait ValidationRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn validate(&self, answers: &AnswerSet, spec: &DocumentTypeSpec) -> Vec<ValidationViolation>;
}

// --- Concrete Rules ---

pub struct RequiredFieldRule;

impl ValidationRule for RequiredFieldRule {
    fn name(&self) -> &'static str { "required_field" }

    fn validate(&self, answers: &AnswerSet, spec: &DocumentTypeSpec) -> Vec<ValidationViolation> {
        spec.fields
            .iter()
            .filter(|f| f.required && answers.value(&f.id).trim().is_empty())
            .map(|f| ValidationViolation {
                rule: self.name().to_string(),
                field: f.id.clone(),
                severity: ViolationSeverity::Warning,
                message: format!("{} is required", f.label),
                remediation: vec![format!("Provide a value for {}", f.label)],
            })
            .collect()
    }
}

pub struct DateFormatRule;

impl ValidationRule for DateFormatRule {
    fn name(&self) -> &'static str { "date_format" }

    fn validate(&self, answers: &AnswerSet, spec: &DocumentTypeSpec) -> Vec<ValidationViolation> {
        spec.fields
            .iter()
            .filter(|f| f.kind == FieldKind::Date)
            .filter_map(|f| {
                let value = answers.value(&f.id).trim();
                if value.is_empty() || NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok() {
                    return None;
                }
                Some(ValidationViolation {
                    rule: self.name().to_string(),
                    field: f.id.clone(),
                    severity: ViolationSeverity::Warning,
                    message: format!("{} is not a calendar date: {}", f.label, value),
                    remediation: vec!["Use the YYYY-MM-DD format".to_string()],
                })
            })
            .collect()
    }
}

pub struct UnknownFieldRule;

impl ValidationRule for UnknownFieldRule {
    fn name(&self) -> &'static str { "unknown_field" }

    fn validate(&self, answers: &AnswerSet, spec: &DocumentTypeSpec) -> Vec<ValidationViolation> {
        answers
            .iter()
            .filter(|(key, _)| spec.field(key).is_none())
            .map(|(key, _)| ValidationViolation {
                rule: self.name().to_string(),
                field: key.to_string(),
                severity: ViolationSeverity::Info,
                message: format!("'{}' is not a field of {}", key, spec.label),
                remediation: vec!["Value is ignored by the template".to_string()],
            })
            .collect()
    }
}

/// Validator orchestrates rules and applies policy
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
    failure_mode: FailureMode,
}

impl Validator {
    pub fn new(failure_mode: FailureMode) -> Self {
        Self {
            rules: vec![
                Box::new(RequiredFieldRule),
                Box::new(DateFormatRule),
                Box::new(UnknownFieldRule),
            ],
            failure_mode,
        }
    }

    pub fn validate(&self, answers: &AnswerSet, spec: &DocumentTypeSpec) -> ValidationResult {
        let mut violations = vec![];
        for rule in &self.rules {
            violations.extend(rule.validate(answers, spec));
        }

        match self.failure_mode {
            FailureMode::Block => {
                // Missing required values block under this policy
                for v in violations.iter_mut().filter(|v| v.rule == "required_field") {
                    v.severity = ViolationSeverity::Error;
                }
                let valid = !violations.iter().any(|v| v.severity == ViolationSeverity::Error);
                ValidationResult { valid, violations, type_id: spec.id.clone() }
            }
            FailureMode::Warn => {
                // Never block, just record
                ValidationResult { valid: true, violations, type_id: spec.id.clone() }
            }
            FailureMode::Log => {
                for v in &violations {
                    tracing::info!(
                        type_id = %spec.id,
                        rule = %v.rule,
                        field = %v.field,
                        severity = ?v.severity,
                        "{}",
                        v.message
                    );
                }
                ValidationResult { valid: true, violations, type_id: spec.id.clone() }
            }
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(FailureMode::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::schema::SchemaRegistry;

    fn revocable() -> DocumentTypeSpec {
        SchemaRegistry::builtin(&GeneratorConfig::default())
            .unwrap()
            .get("revocable")
            .unwrap()
            .clone()
    }

    fn complete() -> AnswerSet {
        AnswerSet::new()
            .with("grantorName", "John Roe")
            .with("trusteeName", "Mary Roe")
            .with("beneficiaryName", "Sam Roe")
            .with("establishedDate", "2024-03-04")
    }

    #[test]
    fn test_complete_answers_clean() {
        let result = Validator::default().validate(&complete(), &revocable());
        assert!(result.valid);
        assert!(result.violations.is_empty());
    }

    #[test]
    fn test_missing_required_warns_by_default() {
        let result = Validator::default().validate(&AnswerSet::new(), &revocable());
        assert!(result.valid);
        assert_eq!(result.violations.len(), 4);
        assert!(!result.has_errors());
    }

    #[test]
    fn test_missing_required_blocks_under_block() {
        let answers = complete().with("trusteeName", "  ");
        let result = Validator::new(FailureMode::Block).validate(&answers, &revocable());
        assert!(!result.valid);
        assert_eq!(result.violations[0].field, "trusteeName");
        assert_eq!(result.violations[0].severity, ViolationSeverity::Error);
    }

    #[test]
    fn test_bad_date_is_warning_only() {
        let answers = complete().with("establishedDate", "03/04/2024");
        let result = Validator::new(FailureMode::Block).validate(&answers, &revocable());
        assert!(result.valid);
        assert_eq!(result.violations[0].rule, "date_format");
    }

    #[test]
    fn test_log_mode_records_without_blocking() {
        let answers = complete().with("establishedDate", "soon").with("grantorName", "");
        let result = Validator::new(FailureMode::Log).validate(&answers, &revocable());
        assert!(result.valid);
        assert_eq!(result.violations.len(), 2);
        assert!(result
            .violations
            .iter()
            .all(|v| v.severity == ViolationSeverity::Warning));
    }

    #[test]
    fn test_unknown_field_reported() {
        let answers = complete().with("nickname", "JR");
        let result = Validator::default().validate(&answers, &revocable());
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].severity, ViolationSeverity::Info);
    }
}
