//! Command-line driver for termline grammars.
//!
//! The `termline` binary compiles one grammar and answers a single command
//! about one input string. This library holds its configuration, logging and
//! command implementations so they can be tested without spawning a process.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod session;
