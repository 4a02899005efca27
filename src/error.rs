use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for respack operations
#[derive(Error, Diagnostic, Debug)]
pub enum PackError {
    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(respack::io))]
    Io { path: PathBuf, message: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(respack::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Failed to read source {path}: {message}")]
    #[diagnostic(code(respack::source))]
    SourceRead { path: String, message: String },

    #[error("Failed to convert {path}: {message}")]
    #[diagnostic(code(respack::asset))]
    AssetConversion { path: String, message: String },

    #[error("Failed to write archive {path}: {message}")]
    #[diagnostic(code(respack::write))]
    Write { path: PathBuf, message: String },

    #[error("Build failed: {message}")]
    #[diagnostic(code(respack::build))]
    Build {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Parse error: {message}")]
    #[diagnostic(code(respack::parse))]
    Parse {
        message: String,
        #[help]
        help: Option<String>,
    },
}

impl PackError {
    /// Shorthand for a configuration error with optional help text.
    pub fn config(message: impl Into<String>, help: Option<&str>) -> Self {
        Self::Config {
            message: message.into(),
            help: help.map(str::to_string),
        }
    }
}

pub type Result<T> = std::result::Result<T, PackError>;
