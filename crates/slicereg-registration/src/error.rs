//! Error types for registration and command operations.
//!
//! Core construction failures are wrapped unchanged; the registration layer
//! adds the "nothing loaded yet" conditions the command layer reports.

use slicereg_core::CoreError;
use thiserror::Error;

/// Main error type for registration operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistrationError {
    /// A command needed the current atlas but none has been loaded.
    #[error("No atlas loaded")]
    NoAtlasLoaded,

    /// A command needed the current section but none has been loaded.
    #[error("No section loaded")]
    NoSectionLoaded,

    /// Annotation layer requested from an atlas without an annotation volume.
    #[error("Atlas has no annotation volume")]
    MissingAnnotation,

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Error from the core data model.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type for registration operations.
pub type Result<T> = std::result::Result<T, RegistrationError>;

impl RegistrationError {
    /// Create an invalid configuration error.
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// True for the errors that mean "load something first".
    pub fn is_missing_state(&self) -> bool {
        matches!(self, Self::NoAtlasLoaded | Self::NoSectionLoaded)
    }
}
