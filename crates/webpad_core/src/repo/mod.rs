//! Persistence and export boundaries.
//!
//! # Responsibility
//! - Define the storage and download contracts the project store writes to.
//! - Isolate SQLite and filesystem details from service orchestration.
//!
//! # Invariants
//! - Storage APIs return semantic errors (`QuotaExceeded`) in addition to DB
//!   transport errors.

pub mod download;
pub mod kv_store;
#[cfg(feature = "native")]
pub mod sqlite_kv_store;
