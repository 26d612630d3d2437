//! Cryptographic utilities for Agri Anchor
//!
//! Provides canonical JSON commitments (RFC 8785 + SHA-256) used as the
//! on-chain proof keys.

mod hash;

pub use hash::*;
