//! Command implementations for the `cutout` binary.

pub mod config;
pub mod options;
pub mod transform;
