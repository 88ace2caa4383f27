//! CLI command implementations for herakles-netmon.
//!
//! This module provides implementations for the CLI subcommands:
//! - `interfaces`: Interface listing and selection preview
//! - `probe`: One-off latency probes
//! - `config`: Configuration file generation

pub mod config;
pub mod interfaces;
pub mod probe;

// Re-export command functions
pub use config::command_config;
pub use interfaces::command_interfaces;
pub use probe::command_probe;
