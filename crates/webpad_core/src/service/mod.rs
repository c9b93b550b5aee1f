//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate storage, download and workspace calls into use-case APIs.
//! - Keep host layers decoupled from storage details.

pub mod project_service;
