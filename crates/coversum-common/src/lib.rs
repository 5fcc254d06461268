//! Coversum Common Library
//!
//! Shared infrastructure for the coversum workspace.
//!
//! # Overview
//!
//! Currently this crate hosts the logging bootstrap used by the server
//! binary:
//!
//! - **Logging**: tracing-based setup with console/file output and
//!   environment-driven configuration
//!
//! # Example
//!
//! ```no_run
//! use coversum_common::logging::{init_logging, LogConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = LogConfig::from_env()?;
//!     init_logging(&config)?;
//!     tracing::info!("Application started");
//!     Ok(())
//! }
//! ```

pub mod logging;
