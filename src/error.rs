use std::io;
use std::process::ExitCode;

use thiserror::Error;

/// Settings that could not be read from the environment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be an integer between 0 and 13, got {value:?}")]
    InvalidPsm { var: &'static str, value: String },

    #[error("{var} must not be empty")]
    Empty { var: &'static str },

    #[error("{var} must be `compact` or `json`, got {value:?}")]
    InvalidLogFormat { var: &'static str, value: String },
}

/// Failures before the readiness signal. Every variant ends the process.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(
        "Missing dependency: OCR engine `{command}` could not be started ({source}). \
         Install Tesseract OCR (https://github.com/tesseract-ocr/tesseract) \
         or point OCR_CORE_TESSERACT at the executable."
    )]
    MissingDependency {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("Incompatible OCR engine: {0}")]
    Incompatible(String),

    #[error("Model load failed: {0}")]
    ModelLoad(String),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

impl StartupError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            StartupError::MissingDependency { .. } => ExitCode::from(1),
            _ => ExitCode::from(2),
        }
    }
}

/// Failures while recognizing a single image. Never fatal.
#[derive(Debug, Error)]
pub enum RecognizeError {
    #[error("failed to run OCR engine `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("OCR engine exited with {status}: {stderr}")]
    Engine { status: String, stderr: String },
}
