//! Process-wide holder of the current tool table.

use crate::error::Result;
use crate::session::{ScanOptions, ScanReport, ToolScanner};
use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;
use toolscout_core::ToolTable;
use tracing::info;

/// Shared registry whose table is replaced as a whole on every rescan.
///
/// Readers take an `Arc` snapshot and never observe a partially built table.
/// A rescan that fails leaves the previous table in place.
#[derive(Debug)]
pub struct ToolRegistry {
    current: RwLock<Arc<ToolTable>>,
    scanner: ToolScanner,
}

impl ToolRegistry {
    pub fn new(options: &ScanOptions) -> Result<Self> {
        Ok(Self {
            current: RwLock::new(Arc::new(ToolTable::new())),
            scanner: ToolScanner::new(options)?,
        })
    }

    /// The current table.
    pub fn snapshot(&self) -> Arc<ToolTable> {
        self.current.read().clone()
    }

    /// Scan `root` and publish the resulting table.
    pub fn rescan(&self, root: &Path) -> Result<ScanReport> {
        let report = self.scanner.scan(root)?;
        *self.current.write() = Arc::clone(&report.table);
        info!(
            "Tool registry now holds {} tools from {}",
            report.table.len(),
            root.display()
        );
        Ok(report)
    }

    /// Publish an already built table.
    pub fn replace(&self, table: ToolTable) {
        *self.current.write() = Arc::new(table);
    }
}
