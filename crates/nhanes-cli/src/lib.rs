//! CLI library components for the `nhanes` converter.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod summary;
