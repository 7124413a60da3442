// src/lib.rs
#[macro_use]
pub mod macros;

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod core;
pub mod driver;
pub mod engine;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod progress;
pub mod report;
pub mod runner;
pub mod specs;
