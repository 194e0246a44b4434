//! # CLI Layer
//!
//! One possible UI client for the card core. This is the only place that parses
//! arguments, prints to the terminal, installs a logger, or decides exit codes.
//!
//! - `setup`: clap definitions
//! - `commands`: context setup and per-command handlers
//! - `print`: terminal formatting

mod commands;
mod print;
mod setup;

pub use commands::run;
