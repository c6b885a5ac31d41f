//! Terminal output for territory geofence tools
//!
//! - Status messages
//! - Distance, score, and membership formatting
//! - Spinners for long-running computations

#![warn(missing_docs)]

pub mod output;
pub mod progress;
