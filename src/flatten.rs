use crate::directive::{extract_inclusion_target, is_bibliography, is_comment, is_inclusion};
use crate::error::{FlatexError, Result};
use crate::fs_utils::{
    TEX_EXTENSION, bibliography_path, document_dir, read_file_lines, resolve_inclusion_path,
};
use crate::resources::copy_resources;
use log::{debug, info, trace};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory under which default outputs are placed
pub const DEFAULT_BUILD_DIR: &str = "build";

/// Policies applied while flattening a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenConfig {
    /// Replace `\bibliography{..}` with the contents of the sibling `.bbl` file
    pub include_bibliography: bool,
    /// Copy figures referenced by `\includegraphics` next to the output
    pub copy_graphics: bool,
    /// Copy local `.sty` files referenced by `\usepackage` next to the output
    pub copy_styles: bool,
    /// Don't add a blank separator line after each inclusion
    pub no_blank_after_include: bool,
    /// Drop lines that are only a comment
    pub strip_comments: bool,
    /// Resolve nested inclusions from the including file's directory instead of the root's
    pub resolve_from_includer: bool,
}

impl Default for FlattenConfig {
    fn default() -> Self {
        Self {
            include_bibliography: true,
            copy_graphics: true,
            copy_styles: true,
            no_blank_after_include: false,
            strip_comments: true,
            resolve_from_includer: false,
        }
    }
}

/// Result of expanding a document tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flattened {
    /// The flattened document, one entry per line
    pub lines: Vec<String>,
    /// Every file read while expanding, in reading order
    pub sources: Vec<PathBuf>,
}

impl Flattened {
    /// Joins the lines into the final document text
    #[must_use]
    pub fn render(&self) -> String {
        self.lines.concat()
    }
}

/// Recursively expands `file`, resolving its inclusions against `context`
///
/// # Errors
///
/// - `FlatexError::FileNotFound` if the file, an inclusion target or a bibliography is missing.
/// - `FlatexError::MalformedDirective` if an inclusion line cannot be parsed.
/// - `FlatexError::Io` on read failures.
pub fn expand_file(file: &Path, context: &Path, config: &FlattenConfig) -> Result<Vec<String>> {
    let mut sources = Vec::new();
    expand_traced(file, context, config, &mut sources)
}

fn expand_traced(
    file: &Path,
    context: &Path,
    config: &FlattenConfig,
    sources: &mut Vec<PathBuf>,
) -> Result<Vec<String>> {
    debug!("Expanding {}", file.display());
    let lines = read_file_lines(file)?;
    sources.push(file.to_path_buf());

    let mut output = Vec::with_capacity(lines.len());
    for line in lines {
        if is_inclusion(&line) {
            let target = resolve_inclusion_path(context, &extract_inclusion_target(&line)?)?;
            let nested_context = if config.resolve_from_includer {
                document_dir(&target)
            } else {
                context.to_path_buf()
            };

            let mut included = expand_traced(&target, &nested_context, config, sources)?;
            terminate_last_line(&mut included);
            output.extend(included);
            if !config.no_blank_after_include {
                output.push("\n".to_string());
            }
        } else if config.include_bibliography && is_bibliography(&line) {
            let bibliography = bibliography_path(file)?;
            debug!("Substituting bibliography {}", bibliography.display());
            let mut entries = read_file_lines(&bibliography)?;
            sources.push(bibliography);
            terminate_last_line(&mut entries);
            output.extend(entries);
        } else if config.strip_comments && is_comment(&line) {
            trace!("Dropping comment: {}", line.trim_end());
        } else {
            output.push(line);
        }
    }

    Ok(output)
}

// Spliced content must not run into the line following the directive
fn terminate_last_line(lines: &mut [String]) {
    if let Some(last) = lines.last_mut()
        && !last.ends_with('\n')
    {
        last.push('\n');
    }
}

/// Removes blank lines and, when `strip_comments` is set, comment-only lines
#[must_use]
pub fn post_process(lines: Vec<String>, strip_comments: bool) -> Vec<String> {
    lines
        .into_iter()
        .filter(|line| !line.trim().is_empty())
        .filter(|line| !(strip_comments && is_comment(line)))
        .collect()
}

/// Expands and post-processes a root document
///
/// # Errors
///
/// Returns any error from `expand_file`.
pub fn flatten_document(document: &Path, config: &FlattenConfig) -> Result<Flattened> {
    let context = document_dir(document);
    let mut sources = Vec::new();
    let lines = expand_traced(document, &context, config, &mut sources)?;

    Ok(Flattened {
        lines: post_process(lines, config.strip_comments),
        sources,
    })
}

/// Where the flattened document and its resources go
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    /// Directory receiving the document and copied resources
    pub root: PathBuf,
    /// Full path of the flattened document
    pub file: PathBuf,
}

impl OutputTarget {
    /// Derives the output location, defaulting to `build/<stem>/<stem>.tex`
    ///
    /// # Errors
    ///
    /// Returns `FlatexError::InvalidInput` if the document path has no file stem.
    pub fn derive(
        document: &Path,
        root: Option<PathBuf>,
        filename: Option<PathBuf>,
    ) -> Result<Self> {
        let stem = document
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| FlatexError::InvalidInput {
                path: document.to_path_buf(),
            })?;

        let root = root.unwrap_or_else(|| Path::new(DEFAULT_BUILD_DIR).join(stem));
        let filename =
            filename.unwrap_or_else(|| PathBuf::from(format!("{stem}.{TEX_EXTENSION}")));
        let file = root.join(filename);

        Ok(Self { root, file })
    }
}

/// Summary of a completed flatten run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenSummary {
    /// Path the flattened document was written to
    pub output_file: PathBuf,
    /// Number of lines in the flattened document
    pub lines: usize,
    /// Every file read while expanding
    pub sources: Vec<PathBuf>,
    /// Destinations of copied figures and style files
    pub copied: Vec<PathBuf>,
}

/// Flattens `document`, copies its resources and writes the result to `target`
///
/// # Errors
///
/// Returns errors from expansion, resource copying, or writing the output.
pub fn flatten_to(
    document: &Path,
    target: &OutputTarget,
    config: &FlattenConfig,
) -> Result<FlattenSummary> {
    let output_dir = target
        .file
        .parent()
        .map_or_else(|| target.root.clone(), Path::to_path_buf);
    fs::create_dir_all(&output_dir)?;

    let flattened = flatten_document(document, config)?;
    let copied = copy_resources(
        &flattened.lines,
        &document_dir(document),
        &output_dir,
        config.copy_graphics,
        config.copy_styles,
    )?;

    info!("Writing output to {}", target.file.display());
    fs::write(&target.file, flattened.render())?;

    Ok(FlattenSummary {
        output_file: target.file.clone(),
        lines: flattened.lines.len(),
        sources: flattened.sources,
        copied,
    })
}
