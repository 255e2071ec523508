//! Error types for StudyAI.
//!
//! This module defines the error hierarchy shared by the session controller,
//! the artifact store, configuration loading, and the HTTP layer.

use std::path::PathBuf;

use crate::artifact::ArtifactKind;

/// A specialized `Result` type for StudyAI operations.
pub type Result<T> = std::result::Result<T, StudyError>;

/// Errors that can occur while generating, storing, or reviewing artifacts.
///
/// Variants carry actionable suggestions where a user can do something about
/// the failure.
#[derive(Debug, thiserror::Error)]
pub enum StudyError {
    // ========================================================================
    // Request Errors
    // ========================================================================
    /// The user's input was rejected before any work started.
    #[error("Invalid {field}: {message}")]
    Validation {
        /// Name of the offending field.
        field: String,
        /// What is wrong with it.
        message: String,
    },

    // ========================================================================
    // Generation and Storage Errors
    // ========================================================================
    /// The content generator could not produce an artifact.
    #[error("Generation failed: {message}\n\nSuggestion: Try again; the generator may be temporarily unavailable")]
    GenerationFailure {
        /// Description of the failure.
        message: String,
    },

    /// No artifact exists with the given identifier.
    #[error("{kind} not found: '{id}'")]
    NotFound {
        /// Kind of artifact that was requested.
        kind: ArtifactKind,
        /// Identifier that was looked up.
        id: String,
    },

    /// The document store failed to read or write.
    #[error("Persistence error: {message}\n\nSuggestion: Check that the database is reachable and writable")]
    Persistence {
        /// Description of the storage failure.
        message: String,
    },

    // ========================================================================
    // Session Errors
    // ========================================================================
    /// Invalid session transition attempted.
    #[error("Invalid session transition: cannot go from {from} to {to}")]
    InvalidTransition {
        /// The current phase.
        from: String,
        /// The attempted target phase.
        to: String,
    },

    /// Answers can no longer be changed because the session is completed.
    #[error("Answers are locked: the session is already completed\n\nSuggestion: Reset the session to start over")]
    AnswersLocked,

    /// A timed test received input before it was started.
    #[error("The practice test has not been started\n\nSuggestion: Start the test before answering")]
    TestNotStarted,

    /// An answer referenced a question the artifact does not contain.
    #[error("Unknown question id: {id}")]
    UnknownQuestion {
        /// The unknown question id.
        id: u32,
    },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Invalid JSON syntax in configuration file.
    #[error("Invalid JSON in config file '{path}': {message}\n\nSuggestion: Validate your studyai.json with a JSON linter")]
    ConfigParse {
        /// Path to the configuration file.
        path: PathBuf,
        /// Description of the parse error.
        message: String,
    },

    /// Configuration validation failed.
    #[error("Invalid configuration: {message}\n\nSuggestion: {suggestion}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
        /// Actionable suggestion for the user.
        suggestion: String,
    },

    // ========================================================================
    // General Errors
    // ========================================================================
    /// General I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StudyError {
    /// Creates a new `Validation` error.
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a new `GenerationFailure` error.
    #[must_use]
    pub fn generation(message: impl Into<String>) -> Self {
        Self::GenerationFailure {
            message: message.into(),
        }
    }

    /// Creates a new `NotFound` error for an artifact id.
    #[must_use]
    pub fn not_found(kind: ArtifactKind, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Creates a new `Persistence` error.
    #[must_use]
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidTransition` error.
    #[must_use]
    pub fn invalid_transition(from: impl std::fmt::Display, to: impl std::fmt::Display) -> Self {
        Self::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    /// Creates a new `ConfigParse` error with the given path and message.
    #[must_use]
    pub fn config_parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ConfigParse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new `ConfigValidation` error with the given message and suggestion.
    #[must_use]
    pub fn config_validation(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Returns `true` if this error is transient and the action may be retried.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::GenerationFailure { .. } | Self::Persistence { .. }
        )
    }

    /// Returns `true` if the error was caused by user input rather than the system.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::AnswersLocked
                | Self::TestNotStarted
                | Self::UnknownQuestion { .. }
                | Self::InvalidTransition { .. }
        )
    }

    /// A short message suitable for a dismissible notice.
    ///
    /// Strips the suggestion block so the text fits on one line.
    #[must_use]
    pub fn user_message(&self) -> String {
        let full = self.to_string();
        full.split("\n\n").next().unwrap_or_default().to_string()
    }
}
