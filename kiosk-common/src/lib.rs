//! # Kiosk Common Library
//!
//! Shared code for the kiosk playback backend:
//! - Error types
//! - Bootstrap configuration loading
//! - Resume checkpoint store
//! - Catalog model and loader

pub mod catalog;
pub mod config;
pub mod error;
pub mod resume;

pub use catalog::Catalog;
pub use error::{Error, Result};
pub use resume::{ResumeEntry, ResumeError, ResumeState, ResumeStore};
