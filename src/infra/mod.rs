//! Infrastructure layer for Agri Anchor
//!
//! Contains:
//! - The error taxonomy shared by every layer
//! - Trait seams for the proof ledger and claim storage
//! - The in-memory claim store

mod claim_store;
mod error;
mod traits;

pub use claim_store::InMemoryClaimStore;
pub use error::*;
pub use traits::*;
