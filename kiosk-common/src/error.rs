//! Common error types for the kiosk backend
//!
//! Resume store and catalog failures have their own enums
//! ([`crate::resume::ResumeError`], [`crate::catalog::CatalogError`]); this
//! one covers bootstrap configuration.

use thiserror::Error;

/// Common result type for kiosk operations
pub type Result<T> = std::result::Result<T, Error>;

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum Error {
    /// Config file exists but could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration parse or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
