//! Discovery and copying of figures and local style files referenced by a flattened document.

use crate::directive::{extract_graphics_path, extract_package_name, is_graphics, is_package};
use crate::error::{FlatexError, Result};
use crate::fs_utils::{STYLE_EXTENSION, copy_into};
use log::{debug, info};
use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Figure extensions that are taken literally; anything else triggers a prefix search
pub const GRAPHICS_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "pdf", "tiff"];

/// An external asset referenced from the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    /// Path given to `\includegraphics`, possibly without extension
    Graphics(PathBuf),
    /// Single package name given to `\usepackage`
    Package(String),
}

/// Kind of a resource as reported by `inspect_resources`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Graphics,
    Style,
}

/// Resolution status of one resource reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceCheck {
    pub kind: ResourceKind,
    pub reference: String,
    /// Source files the reference resolves to, relative to the document directory
    pub paths: Vec<PathBuf>,
    pub exists: bool,
}

/// Collects the resource references of a line sequence in document order
///
/// # Errors
///
/// Returns `FlatexError::MalformedDirective` for a directive line without argument.
pub fn find_resources(lines: &[String], graphics: bool, styles: bool) -> Result<Vec<Resource>> {
    let mut resources = Vec::new();

    for line in lines {
        if graphics && is_graphics(line) {
            resources.push(Resource::Graphics(extract_graphics_path(line)?));
        } else if styles && is_package(line) {
            let names = extract_package_name(line)?;
            resources.extend(
                names
                    .split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(|name| Resource::Package(name.to_string())),
            );
        }
    }

    Ok(resources)
}

fn has_graphics_extension(reference: &Path) -> bool {
    reference
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            GRAPHICS_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

/// Lists the figure files a graphics reference stands for, relative to `source_dir`
///
/// A reference with a known extension maps to itself. Otherwise every file in the
/// reference's directory whose name starts with the reference's file name is returned,
/// sorted by name.
///
/// # Errors
///
/// - `FlatexError::GraphicsNotFound` if the prefix search has no directory or no match.
/// - `FlatexError::WalkDir` if the directory cannot be listed.
pub fn graphics_sources(source_dir: &Path, reference: &Path) -> Result<Vec<PathBuf>> {
    if has_graphics_extension(reference) {
        return Ok(vec![reference.to_path_buf()]);
    }

    let parent = reference.parent().unwrap_or_else(|| Path::new(""));
    let directory = source_dir.join(parent);
    let prefix = reference
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    let not_found = || FlatexError::GraphicsNotFound {
        reference: reference.display().to_string(),
        directory: directory.clone(),
    };

    if prefix.is_empty() || !directory.is_dir() {
        return Err(not_found());
    }

    let mut matches = Vec::new();
    for entry in WalkDir::new(&directory)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str()
            && name.starts_with(prefix)
        {
            matches.push(parent.join(name));
        }
    }

    if matches.is_empty() {
        return Err(not_found());
    }
    Ok(matches)
}

/// Local style file for a package, if one sits in `source_dir`
#[must_use]
pub fn style_source(source_dir: &Path, package: &str) -> Option<PathBuf> {
    let file_name = PathBuf::from(format!("{package}.{STYLE_EXTENSION}"));
    source_dir.join(&file_name).is_file().then_some(file_name)
}

// Keeps copies inside the output directory even for absolute or `..` references
fn mirror_path(relative: &Path) -> PathBuf {
    relative
        .components()
        .filter(|component| matches!(component, Component::Normal(_)))
        .collect()
}

/// Copies every referenced figure and local style file into `output_dir`
///
/// Figures keep the directory structure of their reference. The line sequence is only
/// read. Returns the destination paths in copy order.
///
/// # Errors
///
/// - `FlatexError::FileNotFound` if a figure with explicit extension is missing.
/// - `FlatexError::GraphicsNotFound` if an extension-less figure has no match.
/// - `FlatexError::MalformedDirective` for a directive line without argument.
/// - `FlatexError::Io` on copy failures.
pub fn copy_resources(
    lines: &[String],
    source_dir: &Path,
    output_dir: &Path,
    copy_graphics: bool,
    copy_styles: bool,
) -> Result<Vec<PathBuf>> {
    let mut copied = Vec::new();

    for resource in find_resources(lines, copy_graphics, copy_styles)? {
        match resource {
            Resource::Graphics(reference) => {
                info!("Copy figure: {}", reference.display());
                for relative in graphics_sources(source_dir, &reference)? {
                    let destination = output_dir.join(mirror_path(&relative));
                    copy_into(&source_dir.join(&relative), &destination)?;
                    copied.push(destination);
                }
            }
            Resource::Package(name) => {
                if let Some(relative) = style_source(source_dir, &name) {
                    info!("Copy style file: {}", relative.display());
                    let destination = output_dir.join(&relative);
                    copy_into(&source_dir.join(&relative), &destination)?;
                    copied.push(destination);
                } else {
                    debug!("No local style file for package {name}");
                }
            }
        }
    }

    Ok(copied)
}

/// Resolves every resource reference without copying anything
///
/// # Errors
///
/// Returns `FlatexError::MalformedDirective` or listing errors; unresolved references
/// are reported through `ResourceCheck::exists` instead.
pub fn inspect_resources(
    lines: &[String],
    source_dir: &Path,
    graphics: bool,
    styles: bool,
) -> Result<Vec<ResourceCheck>> {
    let mut checks = Vec::new();

    for resource in find_resources(lines, graphics, styles)? {
        let check = match resource {
            Resource::Graphics(reference) => {
                let paths = match graphics_sources(source_dir, &reference) {
                    Ok(paths) => paths,
                    Err(FlatexError::GraphicsNotFound { .. }) => Vec::new(),
                    Err(e) => return Err(e),
                };
                let exists =
                    !paths.is_empty() && paths.iter().all(|p| source_dir.join(p).is_file());
                ResourceCheck {
                    kind: ResourceKind::Graphics,
                    reference: reference.display().to_string(),
                    paths,
                    exists,
                }
            }
            Resource::Package(name) => {
                let path = style_source(source_dir, &name);
                ResourceCheck {
                    kind: ResourceKind::Style,
                    exists: path.is_some(),
                    paths: path.into_iter().collect(),
                    reference: name,
                }
            }
        };
        checks.push(check);
    }

    Ok(checks)
}
