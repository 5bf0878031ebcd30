//! Core types and abstractions for toolscout.
//!
//! This crate provides the tool table produced by a scan, the configuration
//! model shared by every component, and the common error type.

pub mod config;
pub mod error;
pub mod types;

pub use config::{
    CatalogConfig, GeneralConfig, LogFormat, RecommendConfig, ScanConfig, ServerConfig,
    ToolscoutConfig,
};
pub use error::{Result, ToolscoutError};
pub use types::{ToolRecord, ToolSummary, ToolTable};
