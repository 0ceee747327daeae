//! CLI module for Verdant
//!
//! Each command lives in its own module with an `*Args` struct and a `run`
//! function; `main.rs` only maps clap variants onto them.

pub mod error;
pub mod output;

pub mod apply;
pub mod measure;
pub mod simulate;
pub mod workflow;

// Configuration
pub mod config;
