use thiserror::Error;

/// Main error type for metric-space morphing
#[derive(Error, Debug)]
pub enum MmError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Dimension mismatch: {what} has length {actual}, expected {expected}")]
    DimensionMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },

    #[error("Unbound name: {name}")]
    UnboundName { name: String },

    #[error("Binding {name} is not a {expected}")]
    BindingType { name: String, expected: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MmError {
    pub fn dimension_mismatch(what: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            what: what.into(),
            expected,
            actual,
        }
    }
}

/// Result type alias for morphing operations
pub type MmResult<T> = Result<T, MmError>;

/// Fails with [`MmError::DimensionMismatch`] unless `actual == expected`.
pub fn ensure_len(what: &str, expected: usize, actual: usize) -> MmResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(MmError::dimension_mismatch(what, expected, actual))
    }
}

/// Macro for creating invalid-argument errors
#[macro_export]
macro_rules! invalid_argument {
    ($($arg:tt)*) => {
        $crate::MmError::InvalidArgument(format!($($arg)*))
    };
}

/// Macro for creating configuration errors
#[macro_export]
macro_rules! config_error {
    ($($arg:tt)*) => {
        $crate::MmError::Config(format!($($arg)*))
    };
}
