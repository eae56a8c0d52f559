//! Row structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A create DTO for inserts

pub mod campaign;
pub mod page;
pub mod user;
