//! Error types for docshift conversions.

use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of a [`ConversionError`], used by front ends to
/// decide how to present a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Input bytes are not in a supported format.
    Decode,
    /// The source document is malformed or encrypted.
    Render,
    /// An external tool is missing, failed, timed out or produced no output.
    ExternalTool,
    /// The selected conversion cannot run for this input or on this host.
    UnsupportedOperation,
    /// Writing output, filesystem access or configuration failed.
    Internal,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::Decode => "DecodeError",
            ErrorKind::Render => "RenderError",
            ErrorKind::ExternalTool => "ExternalToolError",
            ErrorKind::UnsupportedOperation => "UnsupportedOperationError",
            ErrorKind::Internal => "InternalError",
        };
        f.write_str(name)
    }
}

/// Main error type for the docshift library.
#[derive(Error, Debug)]
pub enum ConversionError {
    /// Input is not a raster image the decoder understands.
    #[error("Failed to decode input image: {0}")]
    Decode(String),

    /// PDF could not be loaded or a page could not be rendered.
    #[error("PDF rendering failed: {0}")]
    Render(String),

    /// PDF requires a password.
    #[error("PDF is encrypted or password protected")]
    Encrypted,

    /// External tool ran but the conversion failed.
    #[error("{tool} conversion failed for '{path}': {message}")]
    ExternalTool {
        tool: String,
        path: PathBuf,
        message: String,
    },

    /// External tool is not installed or not found in PATH.
    #[error("{tool} not found. Install it and make sure it is in PATH or configured explicitly")]
    ToolNotFound { tool: String },

    /// External tool did not finish in time.
    #[error("{tool} conversion timed out after {timeout_secs} seconds for '{path}'")]
    Timeout {
        tool: String,
        path: PathBuf,
        timeout_secs: u64,
    },

    /// Input extension does not match the selected conversion.
    #[error("Unsupported operation: {kind} does not accept '.{extension}' files")]
    UnsupportedInput { kind: String, extension: String },

    /// Selection label does not name a conversion.
    #[error("Unknown conversion kind '{0}'")]
    UnknownKind(String),

    /// Pdfium could not be loaded, so PDF conversions are disabled.
    #[error("PDF conversions are unavailable: {0}")]
    PdfEngineUnavailable(String),

    /// Output document could not be written.
    #[error("Failed to write {format} output: {message}")]
    Encode { format: String, message: String },

    /// Filesystem error while staging or reading back artifacts.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ConversionError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConversionError::Decode(_) => ErrorKind::Decode,
            ConversionError::Render(_) | ConversionError::Encrypted => ErrorKind::Render,
            ConversionError::ExternalTool { .. }
            | ConversionError::ToolNotFound { .. }
            | ConversionError::Timeout { .. } => ErrorKind::ExternalTool,
            ConversionError::UnsupportedInput { .. }
            | ConversionError::UnknownKind(_)
            | ConversionError::PdfEngineUnavailable(_) => ErrorKind::UnsupportedOperation,
            ConversionError::Encode { .. }
            | ConversionError::Io(_)
            | ConversionError::InvalidConfig(_) => ErrorKind::Internal,
        }
    }

    pub(crate) fn encode(format: &str, err: impl std::fmt::Display) -> Self {
        ConversionError::Encode {
            format: format.to_string(),
            message: err.to_string(),
        }
    }
}

/// Result type alias for convenience.
pub type Result<T> = std::result::Result<T, ConversionError>;
