use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rule tag attached to tax-id / national-id checksum and format failures.
pub const RULE_CHECKSUM: &str = "checksum";

/// Errors that can occur while building or decoding invoice requests.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FacturaError {
    /// The request failed one or more validation rules.
    #[error("invalid invoice request: {0}")]
    InvalidRequest(ValidationResult),

    /// A numeric code is not part of the authority's catalogue.
    #[error("unknown {kind} code {code}")]
    UnknownCode {
        /// Which table the code was looked up in (e.g. "voucher type").
        kind: &'static str,
        /// The rejected code.
        code: u16,
    },
}

/// A single validation error with field path and message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Path to the invalid field (e.g. "customer.documentNumber" or "CbtesAsoc").
    pub field: String,
    /// Human-readable error description.
    pub message: String,
    /// Rule tag if applicable (e.g. [`RULE_CHECKSUM`]).
    pub rule: Option<String>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(rule) = &self.rule {
            write!(f, "[{}] {}: {}", rule, self.field, self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

impl ValidationError {
    /// Create a validation error without a rule tag.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: None,
        }
    }

    /// Create a validation error with a rule tag.
    pub fn with_rule(
        field: impl Into<String>,
        message: impl Into<String>,
        rule: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: Some(rule.into()),
        }
    }

    /// Whether this error comes from an identity checksum/format check.
    pub fn is_checksum_failure(&self) -> bool {
        self.rule.as_deref() == Some(RULE_CHECKSUM)
    }
}

/// Outcome of a validation pass. All violations are collected, not just the first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Rendered messages, one per violation.
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.to_string()).collect()
    }

    /// Whether any violation mentions `needle` in its message.
    pub fn mentions(&self, needle: &str) -> bool {
        self.errors.iter().any(|e| e.message.contains(needle))
    }
}

impl From<Vec<ValidationError>> for ValidationResult {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }
}

impl Extend<ValidationError> for ValidationResult {
    fn extend<T: IntoIterator<Item = ValidationError>>(&mut self, iter: T) {
        self.errors.extend(iter);
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            return f.write_str("no errors");
        }
        let joined = self
            .errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_with_and_without_rule() {
        let plain = ValidationError::new("items", "at least one item is required");
        assert_eq!(plain.to_string(), "items: at least one item is required");

        let tagged = ValidationError::with_rule("DocNro", "bad check digit", RULE_CHECKSUM);
        assert_eq!(tagged.to_string(), "[checksum] DocNro: bad check digit");
        assert!(tagged.is_checksum_failure());
        assert!(!plain.is_checksum_failure());
    }

    #[test]
    fn result_joins_messages() {
        let result = ValidationResult::from(vec![
            ValidationError::new("a", "first"),
            ValidationError::new("b", "second"),
        ]);
        assert!(!result.is_valid());
        assert_eq!(result.to_string(), "a: first; b: second");
        assert!(result.mentions("second"));
        assert_eq!(ValidationResult::new().to_string(), "no errors");
    }
}
