//! Command-line front end for `kutta_core`: argument parsing, configuration
//! files, command execution and console formatting.

pub mod args;
pub mod commands;
pub mod config;
pub mod report;
