//! Error types for sqlpatch

use thiserror::Error;

/// Boxed error produced by decoders and transform hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for sqlpatch operations
pub type PatchResult<T> = Result<T, PatchError>;

/// Errors returned while building a schema or decoding a patch.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum PatchError {
    /// Input is not a well-formed JSON object
    #[error("invalid JSON format: {detail}")]
    InvalidFormat { detail: String },

    /// Input object has no properties
    #[error("input is an empty JSON object")]
    EmptyInput,

    /// Input contains a property the schema does not declare
    #[error("unexpected field on key '{key}'")]
    UnexpectedField { key: String },

    /// A declared property could not be decoded (or its transform rejected it)
    #[error("cannot unmarshal field on key '{key}', {source}")]
    UnmarshalFailure {
        key: String,
        #[source]
        source: BoxError,
    },

    /// Schema description is unusable
    #[error("schema construction error: {0}")]
    Construction(String),

    /// Dialect or registry misconfiguration
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Discriminant of a [`PatchError`], convenient for matching in callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidFormat,
    EmptyInput,
    UnexpectedField,
    UnmarshalFailure,
    Construction,
    Configuration,
}

impl PatchError {
    /// Create an invalid format error
    pub fn invalid_format(detail: impl Into<String>) -> Self {
        Self::InvalidFormat {
            detail: detail.into(),
        }
    }

    /// Create an unexpected field error for a property name
    pub fn unexpected_field(key: impl Into<String>) -> Self {
        Self::UnexpectedField { key: key.into() }
    }

    /// Create an unmarshal error for a property name
    pub fn unmarshal(key: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::UnmarshalFailure {
            key: key.into(),
            source: source.into(),
        }
    }

    /// Create a construction error
    pub fn construction(message: impl Into<String>) -> Self {
        Self::Construction(message.into())
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidFormat { .. } => ErrorKind::InvalidFormat,
            Self::EmptyInput => ErrorKind::EmptyInput,
            Self::UnexpectedField { .. } => ErrorKind::UnexpectedField,
            Self::UnmarshalFailure { .. } => ErrorKind::UnmarshalFailure,
            Self::Construction(_) => ErrorKind::Construction,
            Self::Configuration(_) => ErrorKind::Configuration,
        }
    }

    /// The JSON property responsible for the error, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::UnexpectedField { key } | Self::UnmarshalFailure { key, .. } => Some(key),
            _ => None,
        }
    }

    /// Check if this error was caused by the request body (as opposed to setup)
    pub fn is_input_error(&self) -> bool {
        !matches!(self, Self::Construction(_) | Self::Configuration(_))
    }

    /// Check if this is an unexpected field error
    pub fn is_unexpected_field(&self) -> bool {
        matches!(self, Self::UnexpectedField { .. })
    }

    /// Check if this is an empty input error
    pub fn is_empty_input(&self) -> bool {
        matches!(self, Self::EmptyInput)
    }
}

impl From<serde_json::Error> for PatchError {
    fn from(err: serde_json::Error) -> Self {
        Self::invalid_format(err.to_string())
    }
}
