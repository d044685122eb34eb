//! Link lifecycle engine.
//!
//! Moves files and directories out of a working tree into a remote
//! directory, links them back (symbolic or hard links), records them in a
//! per-project `.lnkr.toml` manifest and keeps a managed block of the git
//! exclude file in step with the tracked paths.
//!
//! The public API is organised into layers:
//!
//! - **[`config`]**: global settings and path variable expansion
//! - **[`manifest`]**: the manifest model and its TOML store
//! - **[`resources`]**: filesystem primitives (links, moves, exclude file)
//! - **[`engine`]**: the lifecycle operations (`add`, `remove`, `switch`, ...)
//! - **[`commands`]**: top-level subcommand orchestration
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod resources;
