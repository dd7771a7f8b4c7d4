use clap::{Parser, ValueEnum};
use flatex::fs_utils::document_dir;
use flatex::{
    FlattenConfig, OutputTarget, ResourceCheck, ResourceKind, Result, flatten_document,
    flatten_to, inspect_resources,
};
use log::{LevelFilter, debug, info, warn};
use serde::Serialize;
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};
use std::path::{Path, PathBuf};

const LONG_HELP: &str = r#"
Recognized directives (one per line, anything after a % is ignored):
  \input{file} / \include{file}  - Replaced by the file's flattened contents
  \bibliography{refs}            - Replaced by <document>.bbl
  \includegraphics[..]{fig}      - Figure copied next to the output
  \usepackage{name}              - name.sty copied if it sits beside the document

Examples:
  # Flatten into build/main/main.tex
  flatex paper/main.tex
  # Choose output directory and file name
  flatex paper/main.tex dist arxiv.tex
  # Keep comment lines and skip the bibliography
  flatex paper/main.tex --keep-comments --no-bbl
  # Validate inclusions and figures without writing anything
  flatex paper/main.tex --dry-run
  # List every source file and resource as JSON
  flatex paper/main.tex --list=json
"#;

/// Flatten a multi-file LaTeX document into a single file.
///
/// Copyright 2026 flatex contributors.
/// Licensed under the EUPL v1.2.
#[derive(Parser, Debug)]
#[command(
    name = "flatex",
    version,
    author = "flatex contributors",
    about = "Flatten a multi-file LaTeX document into a single file.",
    after_long_help = LONG_HELP
)]
struct Cli {
    /// Root document to flatten
    #[arg(value_name = "BASE_FILE")]
    base_file: PathBuf,

    /// Output directory (defaults to build/<name>)
    #[arg(value_name = "OUTPUT_ROOT", env = "FLATEX_OUTPUT_ROOT")]
    output_root: Option<PathBuf>,

    /// Output file name inside the output directory (defaults to <name>.tex)
    #[arg(value_name = "OUTPUT_FILENAME")]
    output_filename: Option<PathBuf>,

    /// Leave \bibliography lines alone instead of inlining the .bbl file
    #[arg(long)]
    no_bbl: bool,

    /// Don't copy figures referenced by \includegraphics
    #[arg(long)]
    no_figures: bool,

    /// Don't copy local style files referenced by \usepackage
    #[arg(long)]
    no_styles: bool,

    /// Don't insert a blank line after each inclusion
    #[arg(long)]
    noline: bool,

    /// Keep comment-only lines
    #[arg(long)]
    keep_comments: bool,

    /// Resolve nested inclusions from the including file's directory
    #[arg(long)]
    resolve_from_includer: bool,

    /// Validate inclusions and resources without writing output
    #[arg(long, conflicts_with = "list")]
    dry_run: bool,

    /// List source files and resources (optionally with format: plain, json)
    #[arg(long, value_name = "FORMAT", num_args = 0..=1, default_missing_value = "plain", conflicts_with = "dry_run")]
    list: Option<ListFormat>,

    /// Increase verbosity (can be used multiple times)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn config(&self) -> FlattenConfig {
        FlattenConfig {
            include_bibliography: !self.no_bbl,
            copy_graphics: !self.no_figures,
            copy_styles: !self.no_styles,
            no_blank_after_include: self.noline,
            strip_comments: !self.keep_comments,
            resolve_from_includer: self.resolve_from_includer,
        }
    }

    fn log_level(&self) -> LevelFilter {
        match (self.quiet, self.verbose) {
            (true, _) => LevelFilter::Error,
            (false, 0) => LevelFilter::Info,
            (false, 1) => LevelFilter::Debug,
            (false, _) => LevelFilter::Trace,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq)]
enum ListFormat {
    /// One path or reference per line
    Plain,
    /// JSON output for scripting
    Json,
}

#[derive(Serialize)]
struct Listing {
    sources: Vec<String>,
    resources: Vec<ResourceCheck>,
}

fn main() {
    let cli = Cli::parse();

    let log_config = ConfigBuilder::new()
        .set_time_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .build();
    if let Err(e) = TermLogger::init(
        cli.log_level(),
        log_config,
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("[WARN] Logger unavailable: {e}");
    }

    let config = cli.config();
    let result = if cli.dry_run {
        dry_run(&cli.base_file, &config)
    } else if let Some(format) = cli.list {
        list_contents(&cli.base_file, format, &config)
    } else {
        run(&cli, &config)
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

fn run(cli: &Cli, config: &FlattenConfig) -> Result<bool> {
    let target = OutputTarget::derive(
        &cli.base_file,
        cli.output_root.clone(),
        cli.output_filename.clone(),
    )?;
    debug!("Flattening {} into {}", cli.base_file.display(), target.file.display());

    let summary = flatten_to(&cli.base_file, &target, config)?;
    info!(
        "Flattened {} files into {} lines, copied {} resources",
        summary.sources.len(),
        summary.lines,
        summary.copied.len()
    );
    Ok(true)
}

fn dry_run(document: &Path, config: &FlattenConfig) -> Result<bool> {
    info!("Performing dry run - validating inclusions and resources...");

    let flattened = flatten_document(document, config)?;
    let checks = inspect_resources(
        &flattened.lines,
        &document_dir(document),
        config.copy_graphics,
        config.copy_styles,
    )?;

    let tally = tally_checks(&checks);

    println!(
        "\nSummary: {} source files, {} resources referenced",
        flattened.sources.len(),
        checks.len()
    );
    if tally.resolved > 0 {
        println!("  ✓ {} resolved", tally.resolved);
    }
    if tally.missing > 0 {
        println!("  ✗ {} missing", tally.missing);
    }

    Ok(tally.missing == 0)
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Tally {
    resolved: usize,
    /// Unresolved figures; missing local style files don't count
    missing: usize,
}

fn tally_checks(checks: &[ResourceCheck]) -> Tally {
    let mut tally = Tally::default();
    for check in checks {
        match (check.kind, check.exists) {
            (_, true) => {
                let paths = check
                    .paths
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                info!("✓ {} -> {paths}", check.reference);
                tally.resolved += 1;
            }
            (ResourceKind::Graphics, false) => {
                warn!("✗ {} (not found)", check.reference);
                tally.missing += 1;
            }
            (ResourceKind::Style, false) => {
                debug!("- {} (no local style file)", check.reference);
            }
        }
    }
    tally
}

fn build_listing(document: &Path, config: &FlattenConfig) -> Result<Listing> {
    let flattened = flatten_document(document, config)?;
    let resources = inspect_resources(
        &flattened.lines,
        &document_dir(document),
        config.copy_graphics,
        config.copy_styles,
    )?;
    let sources = flattened
        .sources
        .iter()
        .map(|p| p.display().to_string())
        .collect();

    Ok(Listing { sources, resources })
}

fn list_contents(document: &Path, format: ListFormat, config: &FlattenConfig) -> Result<bool> {
    let listing = build_listing(document, config)?;

    match format {
        ListFormat::Plain => {
            for source in &listing.sources {
                println!("{source}");
            }
            for resource in &listing.resources {
                println!("{}", resource.reference);
            }
        }
        ListFormat::Json => {
            let json = serde_json::to_string_pretty(&listing)?;
            println!("{json}");
        }
    }

    Ok(true)
}
