use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while building a viewer command.
///
/// `NotFound` and `BracketInName` are fatal input errors: the whole run stops
/// before the viewer is launched. Recoverable per-file problems are not errors;
/// they surface as [`crate::SkipReason`]s.
#[derive(Debug, Error)]
pub enum PresetError {
    #[error("File {path} does not exist.")]
    NotFound { path: String },

    #[error("Regular expression in filename {path} is not supported, use wild card (*) instead")]
    BracketInName { path: String },

    #[error("Failed to read NIfTI image {path}: {message}")]
    ImageLoad { path: PathBuf, message: String },

    #[error("Failed to parse preset {origin}: {source}")]
    PresetSyntax {
        origin: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid pattern '{pattern}' in preset {origin}: {source}")]
    Pattern {
        origin: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid preset {origin}: {message}")]
    Preset { origin: String, message: String },

    #[error("Failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PresetError>;

impl PresetError {
    pub fn image_load(path: &Path, message: impl ToString) -> Self {
        Self::ImageLoad { path: path.to_path_buf(), message: message.to_string() }
    }

    pub fn preset(origin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Preset { origin: origin.into(), message: message.into() }
    }

    /// True for errors caused by the command-line inputs themselves.
    pub fn is_fatal_input(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::BracketInName { .. })
    }
}
