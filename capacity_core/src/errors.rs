//! # Error Types
//!
//! Structured error types for capacity_core. Every variant carries enough
//! context to be rendered as operator-facing text by the session router, or
//! serialized for an LLM consumer.
//!
//! Only store I/O-layer failures are fatal ([`DesignError::is_fatal`]); the
//! router recovers every other variant into a response line.
//!
//! ## Example
//!
//! ```rust
//! use capacity_core::errors::{DesignError, DesignResult};
//!
//! fn parse_value(raw: &str) -> DesignResult<f64> {
//!     raw.parse::<f64>()
//!         .ok()
//!         .filter(|v| v.is_finite())
//!         .ok_or_else(|| DesignError::invalid_value(raw))
//! }
//!
//! assert!(parse_value("abc").is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for capacity_core operations
pub type DesignResult<T> = Result<T, DesignError>;

/// Structured error type for store, formula and router operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum DesignError {
    /// Element name does not start with a recognised type prefix
    #[error("Unknown element type for '{element}'.")]
    UnknownElementType { element: String },

    /// No document under that element name
    #[error("{element} does not exist.")]
    ElementNotFound { element: String },

    /// Element exists but has no property with that name
    #[error("{element} does not contain '{property}'.")]
    PropertyNotFound { element: String, property: String },

    /// Formula name is not in the catalog
    #[error("Unsupported formula type.")]
    UnsupportedFormula { formula: String },

    /// A formula input is absent from the property set
    #[error("Calculation failed. Missing required variable: {variable}")]
    MissingVariable { variable: String },

    /// Evaluation produced a non-finite or otherwise invalid quantity
    #[error("Calculation failed due to an error: {detail}")]
    EvaluationError { detail: String },

    /// A value could not be parsed as a finite number
    #[error("Invalid value '{value}'. Expected a number.")]
    InvalidValue { value: String },

    /// Input matched no command shape
    #[error("Invalid command. Check available commands.")]
    InvalidCommand { input: String },

    /// The store declined to touch the property
    #[error("Failed to update {element}.")]
    UpdateDeclined { element: String, property: String },

    /// The backing store could not be reached or read
    #[error("Store error: {operation} on '{location}' - {reason}")]
    StoreUnavailable {
        operation: String,
        location: String,
        reason: String,
    },

    /// A partition is locked by another process
    #[error("Store locked: '{location}' is locked by {locked_by} since {locked_at}")]
    StoreLocked {
        location: String,
        locked_by: String,
        locked_at: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// The chat collaborator failed to produce a reply
    #[error("Chat service error: {reason}")]
    ChatFailed { reason: String },

    /// Configuration could not be loaded
    #[error("Invalid configuration in '{source_name}': {reason}")]
    InvalidConfig { source_name: String, reason: String },
}

impl DesignError {
    /// Create an UnknownElementType error
    pub fn unknown_element_type(element: impl Into<String>) -> Self {
        DesignError::UnknownElementType {
            element: element.into(),
        }
    }

    /// Create an ElementNotFound error
    pub fn element_not_found(element: impl Into<String>) -> Self {
        DesignError::ElementNotFound {
            element: element.into(),
        }
    }

    /// Create a PropertyNotFound error
    pub fn property_not_found(element: impl Into<String>, property: impl Into<String>) -> Self {
        DesignError::PropertyNotFound {
            element: element.into(),
            property: property.into(),
        }
    }

    /// Create an UnsupportedFormula error
    pub fn unsupported_formula(formula: impl Into<String>) -> Self {
        DesignError::UnsupportedFormula {
            formula: formula.into(),
        }
    }

    /// Create a MissingVariable error
    pub fn missing_variable(variable: impl Into<String>) -> Self {
        DesignError::MissingVariable {
            variable: variable.into(),
        }
    }

    /// Create an EvaluationError
    pub fn evaluation(detail: impl Into<String>) -> Self {
        DesignError::EvaluationError {
            detail: detail.into(),
        }
    }

    /// Create an InvalidValue error
    pub fn invalid_value(value: impl Into<String>) -> Self {
        DesignError::InvalidValue {
            value: value.into(),
        }
    }

    /// Create an InvalidCommand error
    pub fn invalid_command(input: impl Into<String>) -> Self {
        DesignError::InvalidCommand {
            input: input.into(),
        }
    }

    /// Create an UpdateDeclined error
    pub fn update_declined(element: impl Into<String>, property: impl Into<String>) -> Self {
        DesignError::UpdateDeclined {
            element: element.into(),
            property: property.into(),
        }
    }

    /// Create a StoreUnavailable error
    pub fn store_unavailable(
        operation: impl Into<String>,
        location: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        DesignError::StoreUnavailable {
            operation: operation.into(),
            location: location.into(),
            reason: reason.into(),
        }
    }

    /// Create a StoreLocked error
    pub fn store_locked(
        location: impl Into<String>,
        locked_by: impl Into<String>,
        locked_at: impl Into<String>,
    ) -> Self {
        DesignError::StoreLocked {
            location: location.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Create a ChatFailed error
    pub fn chat_failed(reason: impl Into<String>) -> Self {
        DesignError::ChatFailed {
            reason: reason.into(),
        }
    }

    /// Create an InvalidConfig error
    pub fn invalid_config(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        DesignError::InvalidConfig {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    /// Whether the session must stop. Only I/O-layer store failures qualify.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DesignError::StoreUnavailable { .. } | DesignError::SerializationError { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            DesignError::UnknownElementType { .. } => "UNKNOWN_ELEMENT_TYPE",
            DesignError::ElementNotFound { .. } => "ELEMENT_NOT_FOUND",
            DesignError::PropertyNotFound { .. } => "PROPERTY_NOT_FOUND",
            DesignError::UnsupportedFormula { .. } => "UNSUPPORTED_FORMULA",
            DesignError::MissingVariable { .. } => "MISSING_VARIABLE",
            DesignError::EvaluationError { .. } => "EVALUATION_ERROR",
            DesignError::InvalidValue { .. } => "INVALID_VALUE",
            DesignError::InvalidCommand { .. } => "INVALID_COMMAND",
            DesignError::UpdateDeclined { .. } => "UPDATE_DECLINED",
            DesignError::StoreUnavailable { .. } => "STORE_UNAVAILABLE",
            DesignError::StoreLocked { .. } => "STORE_LOCKED",
            DesignError::SerializationError { .. } => "SERIALIZATION_ERROR",
            DesignError::ChatFailed { .. } => "CHAT_FAILED",
            DesignError::InvalidConfig { .. } => "INVALID_CONFIG",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = DesignError::missing_variable("fck");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"MissingVariable\""));
        let roundtrip: DesignError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(DesignError::element_not_found("Beam1").error_code(), "ELEMENT_NOT_FOUND");
        assert_eq!(DesignError::unsupported_formula("X").error_code(), "UNSUPPORTED_FORMULA");
        assert_eq!(DesignError::update_declined("Beam1", "h").error_code(), "UPDATE_DECLINED");
    }

    #[test]
    fn test_user_facing_messages() {
        assert_eq!(
            DesignError::element_not_found("Beam9").to_string(),
            "Beam9 does not exist."
        );
        assert_eq!(
            DesignError::property_not_found("Beam1", "zz").to_string(),
            "Beam1 does not contain 'zz'."
        );
        assert_eq!(
            DesignError::unknown_element_type("Truss1").to_string(),
            "Unknown element type for 'Truss1'."
        );
    }

    #[test]
    fn test_only_store_failures_are_fatal() {
        assert!(DesignError::store_unavailable("read", "/db", "denied").is_fatal());
        assert!(!DesignError::element_not_found("Beam1").is_fatal());
        assert!(!DesignError::chat_failed("timeout").is_fatal());
        assert!(!DesignError::store_locked("/db", "bob", "now").is_fatal());
    }
}
