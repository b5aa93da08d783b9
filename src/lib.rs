//! # apigee-repack Core Library
//!
//! Repackages a deployable application archive (a ZIP-compatible `.jar`, `.war` or
//! `.zip`) so that it carries a microgateway configuration directory and, optionally,
//! a custom plugins directory. The repacked archive is what gets pushed for the
//! coresident microgateway plan.
//!
//! ## Key Modules
//!
//! - [`extract`]: Unpacks an archive into a working directory and merges auxiliary directories.
//! - [`compress`]: Writes a directory tree into a new archive, storing or deflating each file.
//! - [`copy`]: Recursive directory copy preserving permission bits.
//! - [`repack`]: The complete extract, merge and compress sequence around a scratch directory.
//!
//! ## Examples
//!
//! ```no_run
//! use apigee_repack::repack::{repack, RepackOptions};
//!
//! let options =
//!     RepackOptions::new("target/app.jar", "microgateway-config").with_plugins("plugins");
//! let repacked = repack(&options)?;
//! assert!(repacked.ends_with("apigee_app.jar"));
//! # Ok::<(), apigee_repack::RepackError>(())
//! ```

pub mod cli;
pub mod cli_runner;
pub mod common;
pub mod compress;
pub mod copy;
pub mod error;
pub mod extract;
pub mod repack;

pub use error::RepackError;

// Cross-platform filesystem wrapper
pub mod fsx;
