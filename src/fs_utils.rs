use crate::error::{FlatexError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Standard extension of the markup language
pub const TEX_EXTENSION: &str = "tex";
/// Extension of the generated bibliography beside a document
pub const BIBLIOGRAPHY_EXTENSION: &str = "bbl";
/// Extension of local style resources
pub const STYLE_EXTENSION: &str = "sty";

/// Reads a file as a sequence of lines, each keeping its line terminator
///
/// # Errors
///
/// - `FlatexError::FileNotFound` if the path doesn't exist or isn't a file.
/// - `FlatexError::Io` if there's an error reading the file.
pub fn read_file_lines(path: &Path) -> Result<Vec<String>> {
    if !path.is_file() {
        return Err(FlatexError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let contents = fs::read_to_string(path)?;
    Ok(contents.split_inclusive('\n').map(String::from).collect())
}

/// Resolves an inclusion reference against a directory context
///
/// References that already end in `.tex` are joined as is, anything else gets the
/// extension appended. The context is never made the process working directory; a
/// relative or empty context is interpreted against it only to produce an absolute path.
///
/// # Errors
///
/// Returns `FlatexError::Io` if the current directory cannot be determined.
pub fn resolve_inclusion_path(context: &Path, reference: &str) -> Result<PathBuf> {
    let suffix = format!(".{TEX_EXTENSION}");
    let joined = if reference.ends_with(&suffix) {
        context.join(reference)
    } else {
        context.join(format!("{reference}{suffix}"))
    };

    std::path::absolute(joined).map_err(Into::into)
}

/// Path of the bibliography output sharing the document's base name
///
/// # Errors
///
/// Returns `FlatexError::Io` if the current directory cannot be determined.
pub fn bibliography_path(document: &Path) -> Result<PathBuf> {
    std::path::absolute(document.with_extension(BIBLIOGRAPHY_EXTENSION)).map_err(Into::into)
}

/// Directory a document's relative references are resolved from
#[must_use]
pub fn document_dir(document: &Path) -> PathBuf {
    match document.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Copies `source` to `destination`, creating the destination's parent directories
///
/// # Errors
///
/// - `FlatexError::FileNotFound` if `source` isn't a file.
/// - `FlatexError::Io` if directories cannot be created or the copy fails.
pub fn copy_into(source: &Path, destination: &Path) -> Result<()> {
    if !source.is_file() {
        return Err(FlatexError::FileNotFound {
            path: source.to_path_buf(),
        });
    }

    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(source, destination)?;
    Ok(())
}
