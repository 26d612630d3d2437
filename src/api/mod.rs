//! API layer for Agri Anchor
//!
//! REST endpoints for claim filing, proof lookup and raw proof anchoring.

pub mod error;
pub mod handlers;
mod rest;
pub mod types;

pub use error::{ApiError, ErrorCode};
pub use rest::*;
