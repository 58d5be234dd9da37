//! Error types for rulebot.
//!
//! All library operations report failures through [`RulebotError`].
//! Action execution has its own [`ActionError`]: it is recorded and
//! logged by the engine but never propagated to the caller.

use std::fmt;

use thiserror::Error;

use crate::registry::{ComponentKind, PropertyType};

/// A single parse diagnostic with source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDiagnostic {
    /// 1-based line number.
    pub line: usize,
    /// 1-based column number.
    pub column: usize,
    /// Human-readable description of the problem.
    pub message: String,
}

impl ParseDiagnostic {
    /// Create a new diagnostic.
    #[must_use]
    pub fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.message)
    }
}

/// Semantic rejection of a well-formed document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    /// The root object of a rule document must be a `Rule`.
    #[error("document root is `{found}`, expected `Rule`")]
    NotARule {
        /// Type name actually found at the root.
        found: String,
    },
    /// The document parses but uses a shape the editing model cannot
    /// represent (e.g. a trigger bound to a raw expression).
    #[error("unsupported rule shape: {0}")]
    ComplexRule(String),
}

/// Main error type for rulebot operations.
#[derive(Debug, Error)]
pub enum RulebotError {
    /// One or more syntax errors in a rule document.
    #[error("{}", format_diagnostics(.0))]
    Parse(Vec<ParseDiagnostic>),

    /// Well-formed but semantically invalid document.
    #[error(transparent)]
    Structural(#[from] StructuralError),

    /// A type name with no registry entry.
    #[error("unknown component type: {0}")]
    UnknownType(String),

    /// A type name registered twice.
    #[error("component type already registered: {0}")]
    DuplicateType(String),

    /// A type was used in a slot its capability kind does not allow.
    #[error("{type_name} is a {actual}, expected a {expected}")]
    KindMismatch {
        /// Offending type name.
        type_name: String,
        /// Kind required by the slot.
        expected: ComponentKind,
        /// Kind the type was registered with.
        actual: ComponentKind,
    },

    /// A property that does not exist on the component's schema.
    #[error("{type_name} has no property `{property}`")]
    UnknownProperty {
        /// Component type name.
        type_name: String,
        /// Property name.
        property: String,
    },

    /// A property value that does not match the schema type.
    #[error("property `{property}` expects a {expected} value")]
    IncompatibleValue {
        /// Property name.
        property: String,
        /// Type declared in the schema.
        expected: PropertyType,
    },

    /// An index outside the actions list.
    #[error("action index {0} is out of range")]
    ActionIndex(usize),

    /// Rule rejected by the validation gate.
    #[error("Invalid rule: {0}")]
    Validation(String),

    /// Rule store failure.
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration failure.
    #[error("Config error: {0}")]
    Config(String),

    /// Requested item does not exist.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl RulebotError {
    /// Collect the parse diagnostics if this is a parse failure.
    #[must_use]
    pub fn diagnostics(&self) -> &[ParseDiagnostic] {
        match self {
            Self::Parse(diagnostics) => diagnostics,
            _ => &[],
        }
    }
}

fn format_diagnostics(diagnostics: &[ParseDiagnostic]) -> String {
    if diagnostics.len() == 1 {
        format!("parse error at {}", diagnostics[0])
    } else {
        let mut out = format!("{} parse errors", diagnostics.len());
        for diagnostic in diagnostics {
            out.push_str("\n  ");
            out.push_str(&diagnostic.to_string());
        }
        out
    }
}

/// Failure of a single action during rule firing.
///
/// Never propagated: the engine records it in the fire report and moves
/// on to the next action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ActionError(pub String);

impl ActionError {
    /// Create an action error from any message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_display() {
        let diagnostic = ParseDiagnostic::new(3, 14, "expected `{`");
        assert_eq!(diagnostic.to_string(), "3:14: expected `{`");
    }

    #[test]
    fn test_parse_error_display_single() {
        let err = RulebotError::Parse(vec![ParseDiagnostic::new(1, 2, "oops")]);
        assert_eq!(err.to_string(), "parse error at 1:2: oops");
    }

    #[test]
    fn test_parse_error_display_multiple() {
        let err = RulebotError::Parse(vec![
            ParseDiagnostic::new(1, 2, "first"),
            ParseDiagnostic::new(4, 5, "second"),
        ]);
        let text = err.to_string();
        assert!(text.starts_with("2 parse errors"));
        assert!(text.contains("1:2: first"));
        assert!(text.contains("4:5: second"));
    }

    #[test]
    fn test_not_a_rule_display() {
        let err = RulebotError::from(StructuralError::NotARule {
            found: "Rectangle".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "document root is `Rectangle`, expected `Rule`"
        );
    }
}
