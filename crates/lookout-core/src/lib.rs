//! # lookout-core
//!
//! Core types, errors, and utilities for the LOOKOUT detection dashboard.
//!
//! This crate provides:
//! - [`LookoutError`] - Error types for all LOOKOUT operations
//! - [`logging`] - Tracing setup and log management utilities
//! - [`alert`] - The alert record data model and entry validation
//! - [`config`] - Dashboard configuration loading and validation
//!
//! ## Example
//!
//! ```no_run
//! use lookout_core::{config::DashboardConfig, logging};
//!
//! fn main() -> lookout_core::Result<()> {
//!     // Initialize logging
//!     let _guard = logging::init_logging(None, false)?;
//!
//!     // Load configuration
//!     let config = DashboardConfig::load(None)?;
//!     tracing::info!(alerts_url = %config.alerts_url, "configured");
//!
//!     Ok(())
//! }
//! ```

pub mod alert;
pub mod config;
pub mod error;
pub mod logging;

// Re-export main types for convenience
pub use alert::{Alert, SnapshotEnvelope};
pub use config::DashboardConfig;
pub use error::{LookoutError, Result};
pub use logging::{init_logging, LogGuard};
