//! Error taxonomy for model assembly and simulation

use thiserror::Error;

use crate::value::ValueType;

/// Errors raised while building or running a model
///
/// Every variant is a configuration or programming error. Nothing here is
/// transient, so callers are expected to fail fast rather than retry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Cannot connect port '{port}' ({expected}) to source '{source_port}' ({found})")]
    TypeMismatch {
        port: String,
        source_port: String,
        expected: ValueType,
        found: ValueType,
    },

    #[error("Invalid state on port '{port}': {reason}")]
    InvalidState { port: String, reason: String },

    #[error("Port '{0}' was read before any value was set")]
    Uninitialized(String),

    #[error("Invalid configuration for block '{block}': {reason}")]
    InvalidConfiguration { block: String, reason: String },

    #[error("Input series does not match declared inports: missing {missing:?}, unexpected {unexpected:?}")]
    PortMismatch {
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    #[error("Inport '{port}' of block '{block}' is not connected")]
    UnconnectedInput { block: String, port: String },

    #[error("Block '{block}' has no port named '{port}'")]
    UnknownPort { block: String, port: String },

    #[error("Block id {0} does not belong to this model")]
    UnknownBlock(usize),

    #[error("Connecting '{port}' to '{source_port}' would make it resolve through itself")]
    CyclicConnection { port: String, source_port: String },

    #[error("Algebraic loop through blocks {0:?}")]
    AlgebraicLoop(Vec<String>),

    #[error("Integer division by zero in block '{0}'")]
    DivisionByZero(String),

    #[error("Integer overflow in block '{0}'")]
    Overflow(String),

    #[error("Signal '{signal}' has {found} samples, expected {expected}")]
    LengthMismatch {
        signal: String,
        expected: usize,
        found: usize,
    },

    #[error("Value of type {found} cannot be used where {expected} is required ({context})")]
    InvalidValue {
        context: String,
        expected: ValueType,
        found: ValueType,
    },
}

/// Result alias used across the crate
pub type SimResult<T> = Result<T, SimError>;

impl SimError {
    pub(crate) fn config(block: &str, reason: impl Into<String>) -> Self {
        SimError::InvalidConfiguration {
            block: block.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn state(port: &str, reason: impl Into<String>) -> Self {
        SimError::InvalidState {
            port: port.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = SimError::TypeMismatch {
            port: "u".into(),
            source_port: "y".into(),
            expected: ValueType::Real,
            found: ValueType::Boolean,
        };
        assert_eq!(
            err.to_string(),
            "Cannot connect port 'u' (real) to source 'y' (boolean)"
        );

        let err = SimError::UnconnectedInput {
            block: "gain1".into(),
            port: "u".into(),
        };
        assert_eq!(err.to_string(), "Inport 'u' of block 'gain1' is not connected");
    }

    #[test]
    fn test_config_helper() {
        let err = SimError::config("sum1", "bad operator '*'");
        assert!(matches!(err, SimError::InvalidConfiguration { .. }));
        assert!(err.to_string().contains("sum1"));
    }
}
