//! CLI subcommand implementations.

pub mod users;
pub mod webhook;
