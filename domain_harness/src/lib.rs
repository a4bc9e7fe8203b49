//! `domain_harness`
//!
//! Thin command layer over `domain_shared`:
//! - `init` provisions an experiment directory from a preset
//! - `show` / `validate` inspect an existing configuration file
//! - `set` applies a versioned update
//!
//! The simulation engine is not involved; it only ever sees the file path.

pub mod commands;
pub mod config;

pub use config::HarnessConfig;
