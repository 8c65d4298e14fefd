//! Core types for Civic Desk.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod department;
pub mod email;
pub mod id;
pub mod status;

pub use department::{CATEGORIES, DEPARTMENTS, is_known_department};
pub use email::{Email, EmailError};
pub use id::*;
pub use status::*;
