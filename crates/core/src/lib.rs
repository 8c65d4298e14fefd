//! Civic Desk Core - Shared domain library.
//!
//! This crate provides the types and rules used across all Civic Desk components:
//! - `server` - REST API for the complaint dashboard
//! - `client` - Typed REST client used by dashboards and tooling
//! - `cli` - Command-line tools for migrations, seeding and worker management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. Workflow transitions (assign, transfer, status
//! update) live here so every storage backend applies them identically.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, and the status/priority/role enums
//! - [`domain`] - Complaint, citizen and admin records plus workflow rules
//! - [`envelope`] - The `{success, data, message, error}` response wrapper
//! - [`fixtures`] - The seed data set used for demos, seeding and tests

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod domain;
pub mod envelope;
pub mod fixtures;
pub mod types;

pub use domain::*;
pub use envelope::{ApiResponse, PageRequest, Pagination, PaginationError};
pub use types::*;
