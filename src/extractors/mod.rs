//! Request-level extractors and middleware.

pub mod guard;
pub use guard::{run_guards, Guards, HeaderGuard, RequestGuard};
