/// Convenience result type used across exprkit.
pub type ExprKitResult<T> = Result<T, ExprKitError>;

/// Top-level error taxonomy used by the public APIs.
#[derive(thiserror::Error, Debug)]
pub enum ExprKitError {
    /// A required expression, predicate or token was absent.
    #[error("null argument: {0}")]
    NullArgument(String),

    /// An expression tree does not have the shape an operation requires.
    #[error("invalid shape: {0}")]
    InvalidShape(String),

    /// An operator token, method or node kind is not supported.
    #[error("not supported: {0}")]
    NotSupported(String),

    /// Runtime failure while executing a compiled program.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// Lambda source text could not be parsed.
    #[error("parse error at byte {offset}: {message}")]
    Parse {
        /// Byte offset into the source text.
        offset: usize,
        /// Human-readable description.
        message: String,
    },

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ExprKitError {
    /// Build a [`ExprKitError::NullArgument`] value.
    pub fn null_argument(name: impl Into<String>) -> Self {
        Self::NullArgument(name.into())
    }

    /// Build a [`ExprKitError::InvalidShape`] value.
    pub fn invalid_shape(msg: impl Into<String>) -> Self {
        Self::InvalidShape(msg.into())
    }

    /// Build a [`ExprKitError::NotSupported`] value.
    pub fn not_supported(msg: impl Into<String>) -> Self {
        Self::NotSupported(msg.into())
    }

    /// Build a [`ExprKitError::Evaluation`] value.
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Build a [`ExprKitError::Parse`] value.
    pub fn parse(offset: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            offset,
            message: message.into(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
