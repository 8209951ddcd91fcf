//! # Validation Violations
//!
//! Structured description of everything wrong with a configuration document.
//! Structural schema failures and cross-field business-rule failures share
//! one collection so that an operator sees every problem in a single pass.

use std::fmt;

use serde::Serialize;

/// A single violated constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    /// JSON Pointer to the offending value (empty for the document root).
    pub instance_path: String,
    /// Name of the cross-field rule that fired, `None` for structural
    /// schema violations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
    /// Plain-language description.
    pub message: String,
}

impl Violation {
    /// A structural (per-field) violation.
    pub fn structural(instance_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            instance_path: instance_path.into(),
            rule: None,
            message: message.into(),
        }
    }

    /// A violation produced by a named cross-field rule.
    pub fn rule(
        rule: impl Into<String>,
        instance_path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            instance_path: instance_path.into(),
            rule: Some(rule.into()),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): {}", self.message)?;
        } else {
            write!(f, "  {}: {}", self.instance_path, self.message)?;
        }
        if let Some(rule) = &self.rule {
            write!(f, " [{rule}]")?;
        }
        Ok(())
    }
}

/// Collection of validation violations, rendered one per line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a violation.
    pub fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }

    /// `Ok(())` when empty, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<Vec<Violation>> for ValidationViolations {
    fn from(violations: Vec<Violation>) -> Self {
        Self { violations }
    }
}

impl Extend<Violation> for ValidationViolations {
    fn extend<I: IntoIterator<Item = Violation>>(&mut self, iter: I) {
        self.violations.extend(iter);
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violation_display_root() {
        let v = Violation::structural("", r#""offices" is a required property"#);
        assert_eq!(v.to_string(), r#"  (root): "offices" is a required property"#);
    }

    #[test]
    fn test_violation_display_with_rule() {
        let v = Violation::rule(
            "guest-invitation-requires-desk-reservation",
            "/offices/1",
            "allowGuestInvitation requires allowDeskReservation",
        );
        let display = v.to_string();
        assert!(display.starts_with("  /offices/1: "));
        assert!(display.ends_with("[guest-invitation-requires-desk-reservation]"));
    }

    #[test]
    fn test_violations_join_multiline() {
        let violations = ValidationViolations::from(vec![
            Violation::structural("/name", "expected string"),
            Violation::structural("/offices/0/id", "does not match pattern"),
        ]);
        let text = violations.to_string();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("/name"));
        assert!(text.contains("/offices/0/id"));
    }

    #[test]
    fn test_into_result() {
        assert!(ValidationViolations::new().into_result().is_ok());
        let mut v = ValidationViolations::new();
        v.push(Violation::structural("", "bad"));
        assert_eq!(v.into_result().unwrap_err().len(), 1);
    }
}
