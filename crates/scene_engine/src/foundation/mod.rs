//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Color values for schema properties
//! - Structured diagnostics
//! - Frame timing
//! - Logging utilities

pub mod color;
pub mod diagnostics;
pub mod logging;
pub mod time;
