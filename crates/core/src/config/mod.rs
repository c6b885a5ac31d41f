//! Configuration loading and schema definitions
//!
//! Scoring weights and validation settings shared by every front-end.

mod loader;
mod schema;

pub use loader::{Config, CONFIG_CANDIDATES};
pub use schema::*;
