//! CLI module - argument parsing and command dispatch

pub mod args;
pub mod commands;
pub mod helpers;
pub mod output;
pub mod viz;

pub use args::{Cli, Commands, DataArgs, DatasetSpec, GlobalOpts, OutputFormat, SimulationArgs};
