//! Common test utilities for bstore.
//!
//! - `cli`: CLI runner bound to an isolated data directory, with fluent assertions
//! - `fixtures`: Test image generation
#![allow(dead_code)]

pub mod cli;
pub mod fixtures;

use tracing_subscriber::EnvFilter;

pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
