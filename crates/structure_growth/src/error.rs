//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias. Variants cover
//! missing or cyclic templates, invalid sidecar directives, invalid run configuration,
//! world writer failures, IO and parse errors.
//!
//! A candidate structure that cannot be placed is *not* an error; see
//! [`crate::growth::node::Placability`].
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("template '{name}' has no voxel data")]
    TemplateNotFound { name: String },

    #[error("template reference cycle: {}", chain.join(" -> "))]
    TemplateCycle { chain: Vec<String> },

    #[error("invalid template '{name}': {reason}")]
    InvalidTemplate { name: String, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("world writer error: {0}")]
    World(String),

    #[cfg(feature = "serde")]
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub(crate) fn invalid_template(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidTemplate {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Other(value)
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error::Other(value.to_owned())
    }
}
