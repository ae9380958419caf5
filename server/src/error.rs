use std::{io, path::PathBuf};

use thiserror::Error;

use detangler_shared::VocabularyError;

/// Errors raised while loading a [`DetanglerConfig`](crate::DetanglerConfig).
/// None of these reach the host: the offending value falls back to its default.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Config could not be parsed as TOML: {message}")]
    Parse { message: String },

    #[error("`{field}` must be at least {min}, got {value}")]
    InvalidInterval {
        field: &'static str,
        value: i64,
        min: i64,
    },

    #[error("`{field}` must be at least {min}, got {value}")]
    InvalidThreshold {
        field: &'static str,
        value: i64,
        min: i64,
    },

    #[error("`vocabulary` rejected: {0}")]
    InvalidVocabulary(#[from] VocabularyError),
}

/// Errors surfaced to whoever issued an administrative command.
/// Registry and sweep state are left untouched when one of these is returned.
#[derive(Debug, Error)]
pub enum DetanglerError {
    #[error("Command requires permission level {required}, source has {actual}")]
    PermissionDenied { required: u8, actual: u8 },

    #[error("Unknown command `{input}`. Expected one of: scan, dryrun, run, report, dump")]
    UnknownCommand { input: String },

    #[error("Failed to generate report at {path}: {source}")]
    Report {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}
