//! Error types shared across toolscout crates.

/// Result type alias for toolscout operations.
pub type Result<T> = std::result::Result<T, ToolscoutError>;

/// Main error type for the toolscout system.
#[derive(Debug, thiserror::Error)]
pub enum ToolscoutError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ToolscoutError {
    /// Check if this is a configuration error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
