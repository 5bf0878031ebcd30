//! Tool discovery and code slicing for Python sources.
//!
//! A scan walks a directory, parses every Python file with tree-sitter, and
//! keeps each class that declares `get_name`, `get_description` and
//! `execute`. For every such tool it builds a code excerpt made of the file's
//! imports, the class itself, and the other declarations the class mentions
//! directly.
//!
//! # Examples
//!
//! ```no_run
//! use toolscout_analysis::{scan_directory, ScanOptions};
//! use std::path::Path;
//!
//! let report = scan_directory(Path::new("./tools"), &ScanOptions::default())?;
//! for tool in report.table.iter() {
//!     println!("{}: {}", tool.name, tool.description);
//! }
//! # Ok::<(), toolscout_analysis::ScanError>(())
//! ```

pub mod assembler;
pub mod classifier;
pub mod closure;
pub mod declaration;
pub mod error;
pub mod extractor;
pub mod literal;
pub mod references;
pub mod registry;
pub mod scanner;
pub mod session;
pub mod tree_sitter_wrapper;

pub use assembler::assemble;
pub use classifier::{classify, ClassificationSkip, ToolMetadata, REQUIRED_METHODS};
pub use closure::select_closure;
pub use declaration::{Declaration, DeclarationKind, Method, ParsedModule, Scope};
pub use error::{FileError, Result, ScanError, SkipKind};
pub use references::{collect_definition_references, collect_references, ReferenceSet};
pub use registry::ToolRegistry;
pub use scanner::SourceScanner;
pub use session::{
    analyze_file, analyze_source, scan_directory, ScanOptions, ScanReport, SkippedFile,
    ToolScanner,
};
pub use tree_sitter_wrapper::PythonParser;
