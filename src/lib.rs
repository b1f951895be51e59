pub mod build;
pub mod cli;
pub mod config;
pub mod context;
pub mod domain;
pub mod error;
pub mod git;
pub mod manifest;
pub mod ui;
pub mod workflow;

pub use error::{ReleaseError, Result};
