//! Domain models for Agri Anchor
//!
//! Claim records, proof receipts, and the chain primitives they carry.

mod claim;
mod proof;
mod types;

pub use claim::*;
pub use proof::*;
pub use types::*;
