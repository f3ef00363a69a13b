//! ragview-common — Shared error types used across all ragview crates.

pub mod error;

pub use error::{ApiError, RagviewError, Result};
