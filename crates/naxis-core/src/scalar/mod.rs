//! Explicit scalar arrays and their operations
//!
//! This module provides [`ScalarArray`], the leaf type every other named
//! array is built from, organized into functional sub-modules.

// Core type definition
pub mod types;

// Operation modules (organized by functionality)
mod elementwise;
mod indexing;
mod shape_ops;
mod statistics;

// Supporting modules
pub mod scalar_traits;

// Re-export the main type
pub use types::ScalarArray;
