//! CRUD execution over described tables.

mod crud;
pub use crud::{display_value, CrudExecutor, LISTING_LIMIT};
