//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Math types and operations
//! - Globally unique identifiers
//! - Time management
//! - Logging utilities

pub mod math;
pub mod guid;
pub mod time;
pub mod logging;
