use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for flatex operations
#[derive(Error, Debug)]
pub enum FlatexError {
    /// IO error when reading, writing or copying files
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Referenced file (inclusion target, bibliography, figure) is missing
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// A line matched a directive pattern but carries no brace-delimited argument
    #[error("Malformed directive (no brace group): {}", .line.trim_end())]
    MalformedDirective { line: String },

    /// Extension-less graphics reference with no matching file in its directory
    #[error("No graphics file matching '{reference}' in {}", .directory.display())]
    GraphicsNotFound { reference: String, directory: PathBuf },

    /// Base document path has no usable file name
    #[error("Invalid input document: {path}")]
    InvalidInput { path: PathBuf },

    /// `WalkDir` error when listing a figure directory
    #[error("Directory traversal error: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FlatexError>;
