//! Redub Core - Foundation types for the audio compositor
//!
//! This crate provides the types shared by every other redub crate:
//! - The error taxonomy (`RedubError`, `Result`)
//! - Composition settings (`MixConfig`)

pub mod config;
pub mod error;

pub use config::MixConfig;
pub use error::{RedubError, Result};
