//! Flightpath CLI library.
//!
//! Command handlers, terminal styling and output formatting for the
//! `flightpath-cli` binary.

pub mod commands;
pub mod output;
pub mod terminal;
