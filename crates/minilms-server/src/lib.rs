//! Mini LMS Server - administration binary support
//!
//! This crate wires configuration, logging and the database pool together
//! and exposes the enrollment operations as CLI commands.

pub mod command;
pub mod config;
pub mod logging;
pub mod seed;

pub use config::{Cli, Command, Configuration};
pub use logging::{LoggingConfig, LoggingGuard, init_logging};
