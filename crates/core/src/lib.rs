//! Core utilities for territory geofence tools
//!
//! This crate provides shared functionality used by the CLI and services:
//!
//! - **Error handling**: Errors with codes, context, and recovery suggestions
//! - **Configuration**: TOML-based scoring and validation settings
//!
//! # Example
//!
//! ```rust,no_run
//! use territory_core::config::Config;
//! use territory_geo::MembershipEngine;
//!
//! let config = Config::load(None).expect("Invalid configuration");
//! let engine = MembershipEngine::new(config.schema.scoring_policy())
//!     .with_strict_coordinates(config.schema.validation.strict_coordinates);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;

pub use error::{Error, ErrorCode, Result, ResultExt};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{Config, ConfigSchema};
    pub use crate::error::{exit_codes, Error, ErrorCode, Result, ResultExt};
}
