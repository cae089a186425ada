//! Error types
//!
//! Capability errors are always recoverable: the resolver skips the tier and
//! the selector falls back. Knowledge base errors are fatal, but only at load
//! time. Nothing here ever reaches the caller of `DialogueSession::turn`.

use crate::types::Capability;

/// Failure of a single language capability call
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CapabilityError {
    /// The capability was never initialized (missing model or backend)
    #[error("capability '{0}' is unavailable")]
    Unavailable(Capability),

    /// The capability is initialized but failed at call time
    #[error("capability '{capability}' failed: {reason}")]
    CallFailed {
        capability: Capability,
        reason: String,
    },
}

impl CapabilityError {
    pub fn call_failed(capability: Capability, reason: impl Into<String>) -> Self {
        Self::CallFailed {
            capability,
            reason: reason.into(),
        }
    }

    /// The capability this error concerns
    pub fn capability(&self) -> Capability {
        match self {
            Self::Unavailable(c) => *c,
            Self::CallFailed { capability, .. } => *capability,
        }
    }
}

/// Knowledge base loading and validation errors
#[derive(Debug, thiserror::Error)]
pub enum KnowledgeBaseError {
    #[error("failed to read knowledge base: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid knowledge base JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("knowledge base contains no intents")]
    Empty,

    #[error("intent '{0}' is declared more than once")]
    DuplicateIntent(String),

    #[error("intent '{0}' has no patterns")]
    NoPatterns(String),

    #[error("intent '{0}' has no responses")]
    NoResponses(String),

    #[error("intent '{intent}' has a blank pattern at position {index}")]
    BlankPattern { intent: String, index: usize },

    #[error("intent '{intent}' has a blank response at position {index}")]
    BlankResponse { intent: String, index: usize },
}

/// Session configuration errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_accessor() {
        let err = CapabilityError::call_failed(Capability::Similarity, "model crashed");
        assert_eq!(err.capability(), Capability::Similarity);
        assert_eq!(
            err.to_string(),
            "capability 'similarity' failed: model crashed"
        );

        let err = CapabilityError::Unavailable(Capability::Generate);
        assert_eq!(err.capability(), Capability::Generate);
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::OutOfRange {
            field: "temperature",
            value: 3.0,
            min: 0.1,
            max: 2.0,
        };
        assert_eq!(err.to_string(), "temperature = 3 is outside [0.1, 2]");
    }
}
