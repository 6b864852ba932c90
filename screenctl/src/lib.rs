//! screenctl library: subcommand orchestration and report printing
//!
//! The binary in `main.rs` is a thin shell over these modules so the
//! full update/screen pipelines stay testable without a network or TTY.

#![forbid(unsafe_code)]

pub mod commands;
pub mod report;
