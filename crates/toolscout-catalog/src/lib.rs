//! External tool catalog for toolscout.
//!
//! The catalog is a read-only table of hosted tool definitions, fetched from
//! the Composio API or loaded from a JSON file, and consulted by the
//! recommendation service alongside the locally discovered tools.

pub mod composio;
pub mod error;
pub mod source;
pub mod types;

pub use composio::ComposioCatalog;
pub use error::{CatalogError, Result};
pub use source::{source_from_config, CatalogSource, SharedCatalog, StaticCatalog};
pub use types::{CatalogDocument, CatalogTable, CatalogTool, Toolkit};
