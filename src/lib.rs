//! # flatex
//!
//! Flattens a LaTeX document spread over many files into a single self-contained file.
//!
//! ## Features
//!
//! - Replaces `\input{..}` and `\include{..}` lines with the referenced file, recursively
//! - Substitutes `\bibliography{..}` with the generated `.bbl` file
//! - Strips comment-only and blank lines
//! - Copies figures (`\includegraphics`) and local style files (`\usepackage`) next to the output
//!
//! Directive recognition is line based pattern matching, not a LaTeX parser. Inclusion
//! cycles are not detected.
//!
//! ## Usage
//!
//! ### As a Library
//!
//! ```no_run
//! use flatex::{FlattenConfig, flatten_document};
//! use std::path::Path;
//!
//! let config = FlattenConfig::default();
//! match flatten_document(Path::new("paper/main.tex"), &config) {
//!     Ok(flat) => print!("{}", flat.render()),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```
//!
//! ### As a CLI Tool
//!
//! ```bash
//! # Writes build/main/main.tex plus figures and style files
//! flatex paper/main.tex
//!
//! # Custom output location, keep comments
//! flatex paper/main.tex dist arxiv.tex --keep-comments
//!
//! # Check that every figure resolves
//! flatex paper/main.tex --dry-run
//! ```

pub mod directive;
pub mod error;
pub mod flatten;
pub mod fs_utils;
pub mod resources;

// Re-export main types and functions for convenience
pub use error::{FlatexError, Result};
pub use flatten::{
    FlattenConfig, FlattenSummary, Flattened, OutputTarget, expand_file, flatten_document,
    flatten_to, post_process,
};
pub use resources::{ResourceCheck, ResourceKind, copy_resources, inspect_resources};
