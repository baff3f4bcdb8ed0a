//! Backends module - Filesystem traversal
//!
//! Provides:
//! - walk: thread-per-directory name search

pub mod walk;
