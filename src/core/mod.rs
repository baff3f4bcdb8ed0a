//! Core module - Search model and the glue around the walker
//!
//! This module provides:
//! - Search request and match records
//! - Name comparison
//! - Search path resolution
//! - Output rendering and match sinks
//! - Error types

pub mod error;
pub mod model;
pub mod names;
pub mod paths;
pub mod render;
