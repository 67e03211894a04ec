//! HTTP handlers: HTML views and the JSON API.

pub mod api;
pub mod views;
pub use api::dispatch;
pub use views::{index, listing, op_view_get, op_view_post};
