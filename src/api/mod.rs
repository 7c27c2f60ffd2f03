//! Music box transcriber WASM API
//!
//! This module provides the JavaScript-facing API.
//!
//! # Module Structure
//!
//! - `helpers`: console logging, serialization and error conversion
//! - `core`: exported transcription functions

pub mod helpers;
pub mod core;

pub use self::core::*;
