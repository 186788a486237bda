//! bstore library - Local persistence for a photo gallery and per-user preferences.
//!
//! This library exposes the storage layer behind the `bstore` CLI for use in
//! tests and by other front ends.
//!
//! # Modules
//!
//! - `media`: Directory-backed image store (save, list, delete)
//! - `settings`: Username-keyed settings collection over a key-value backend
//! - `config`: Storage location resolution and config file handling
//! - `error`: Error types with user-recoverable hints
//! - `logging`: Tracing subscriber setup
#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod media;
pub mod settings;
