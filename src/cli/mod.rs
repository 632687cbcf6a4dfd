//! Process adapter for the external storage CLI.

pub mod args;
pub mod client;
#[cfg(test)]
pub(crate) mod mock;

pub use args::CliArgs;
pub use client::{CliBackend, CliClient, locate_executable};
