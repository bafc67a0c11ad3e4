//! indexsync-lib: Core types and logic for indexsync
//!
//! This crate keeps the composite indexes and field overrides of a Firestore
//! database in line with a declarative index file:
//! - `spec`: the index file model, legacy upgrade, validation and canonical form
//! - `sort`: total orders used for stable output and unordered comparisons
//! - `matcher`: equivalence between live resources and index file entries
//! - `reconcile`: the plan and the sequential apply engine
//! - `remote`: the Admin API seam and its HTTP client

pub mod api;
pub mod config;
pub mod consts;
pub mod export;
pub mod matcher;
pub mod pretty;
pub mod reconcile;
pub mod remote;
pub mod sort;
pub mod spec;
pub mod util;
