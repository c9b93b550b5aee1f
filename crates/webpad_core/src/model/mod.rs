//! Domain model for playground projects.
//!
//! # Responsibility
//! - Define the persisted/exported project shape.
//! - Own the decoding rules for external (including legacy) project data.
//!
//! # Invariants
//! - Project text fields are always strings after normalization.
//! - Schema version and kind are constants, not per-instance data.

pub mod project;
