//! Scan sessions: one directory traversal producing one tool table.

use crate::assembler::assemble;
use crate::classifier::{classify, ClassificationSkip};
use crate::closure::select_closure;
use crate::declaration::ParsedModule;
use crate::error::{FileError, Result, SkipKind};
use crate::references::collect_definition_references;
use crate::scanner::SourceScanner;
use crate::tree_sitter_wrapper::PythonParser;
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use toolscout_core::{ScanConfig, ToolRecord, ToolTable};
use tracing::{debug, info, trace, warn};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Options controlling which files a scan visits and how.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub extensions: Vec<String>,
    pub skip_hidden: bool,
    pub exclude: Vec<String>,
    pub follow_links: bool,
    pub parallel: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            extensions: vec!["py".to_string()],
            skip_hidden: false,
            exclude: Vec::new(),
            follow_links: false,
            parallel: true,
        }
    }
}

impl From<&ScanConfig> for ScanOptions {
    fn from(config: &ScanConfig) -> Self {
        Self {
            extensions: config.extensions.clone(),
            skip_hidden: config.skip_hidden,
            exclude: config.exclude.clone(),
            follow_links: config.follow_links,
            parallel: config.parallel,
        }
    }
}

/// A file left out of the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub kind: SkipKind,
    pub message: String,
}

impl From<FileError> for SkippedFile {
    fn from(err: FileError) -> Self {
        Self {
            path: err.path().clone(),
            kind: err.kind(),
            message: err.message().to_string(),
        }
    }
}

/// Outcome of a completed scan.
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub root: PathBuf,
    pub table: Arc<ToolTable>,
    pub files_scanned: usize,
    pub skipped: Vec<SkippedFile>,
}

/// Builds tool tables from directories.
#[derive(Debug, Clone)]
pub struct ToolScanner {
    files: SourceScanner,
    parallel: bool,
}

impl ToolScanner {
    pub fn new(options: &ScanOptions) -> Result<Self> {
        let files = SourceScanner::new()
            .with_extensions(options.extensions.iter().cloned())
            .with_skip_hidden(options.skip_hidden)
            .with_follow_links(options.follow_links)
            .with_exclude(&options.exclude)?;

        Ok(Self {
            files,
            parallel: options.parallel,
        })
    }

    /// Scan `root` and build a fresh table.
    ///
    /// Only root-level problems fail the scan. Files that cannot be read or
    /// parsed are recorded in the report and otherwise ignored.
    pub fn scan(&self, root: &Path) -> Result<ScanReport> {
        let start = Instant::now();
        let files = self.files.collect(root)?;
        debug!("Found {} candidate files under {}", files.len(), root.display());

        let outcomes: Vec<std::result::Result<Vec<ToolRecord>, FileError>> = if self.parallel {
            files
                .par_iter()
                .map_init(PythonParser::new, |parser, path| match parser {
                    Ok(parser) => analyze_file(path, parser),
                    Err(e) => Err(FileError::parse(path, e.clone())),
                })
                .collect()
        } else {
            let mut parser = PythonParser::new();
            files
                .iter()
                .map(|path| match parser.as_mut() {
                    Ok(parser) => analyze_file(path, parser),
                    Err(e) => Err(FileError::parse(path, e.clone())),
                })
                .collect()
        };

        // Merge in traversal order so duplicate names resolve the same way
        // regardless of how files were scheduled.
        let mut records = Vec::new();
        let mut skipped = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(found) => records.extend(found),
                Err(err) => {
                    warn!("Skipping file: {}", err);
                    skipped.push(SkippedFile::from(err));
                }
            }
        }

        let table = ToolTable::from_records(records);
        info!(
            "Scanned {} files under {} in {:?}: {} tools, {} skipped",
            files.len(),
            root.display(),
            start.elapsed(),
            table.len(),
            skipped.len()
        );

        Ok(ScanReport {
            root: root.to_path_buf(),
            table: Arc::new(table),
            files_scanned: files.len(),
            skipped,
        })
    }
}

/// Scan `root` with `options`.
pub fn scan_directory(root: &Path, options: &ScanOptions) -> Result<ScanReport> {
    ToolScanner::new(options)?.scan(root)
}

/// Read, parse and analyze one file.
pub fn analyze_file(
    path: &Path,
    parser: &mut PythonParser,
) -> std::result::Result<Vec<ToolRecord>, FileError> {
    let bytes = std::fs::read(path).map_err(|e| FileError::read(path, e.to_string()))?;
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes);
    let source = std::str::from_utf8(bytes)
        .map_err(|e| FileError::read(path, format!("invalid UTF-8: {}", e)))?;

    analyze_source(path, source, parser)
}

/// Extract every tool declared in `source`, in declaration order.
pub fn analyze_source(
    path: &Path,
    source: &str,
    parser: &mut PythonParser,
) -> std::result::Result<Vec<ToolRecord>, FileError> {
    let tree = parser
        .parse(source)
        .map_err(|message| FileError::parse(path, message))?;
    let module = ParsedModule::from_tree(&tree, source);

    let mut records = Vec::new();
    for (index, class) in module.classes() {
        let metadata = match classify(class, source) {
            Ok(metadata) => metadata,
            Err(skip) => {
                log_skip(path, class.name().unwrap_or_default(), &skip);
                continue;
            }
        };

        let refs = collect_definition_references(class.node, source);
        let selection = select_closure(&module, index, &refs);
        let code = assemble(&module, &selection);

        debug!(
            "Found tool '{}' ({}) in {}",
            metadata.name,
            class.name().unwrap_or_default(),
            path.display()
        );
        records.push(ToolRecord {
            name: metadata.name,
            description: metadata.description,
            file_path: path.to_path_buf(),
            class_name: class.name().unwrap_or_default().to_string(),
            input_schema: metadata.input_schema,
            output_schema: metadata.output_schema,
            code,
        });
    }

    Ok(records)
}

fn log_skip(path: &Path, class_name: &str, skip: &ClassificationSkip) {
    match skip {
        ClassificationSkip::NotAClass => {}
        ClassificationSkip::MissingMethods(missing) => trace!(
            "{}::{} is not a tool, missing {:?}",
            path.display(),
            class_name,
            missing
        ),
        ClassificationSkip::NoLiteralName => trace!(
            "{}::{} has no literal get_name return",
            path.display(),
            class_name
        ),
    }
}
