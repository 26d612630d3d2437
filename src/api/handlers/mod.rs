//! REST API handlers organized by domain.

pub mod anchoring;
pub mod claims;
pub mod health;
pub mod proofs;

pub use anchoring::*;
pub use claims::*;
pub use health::*;
pub use proofs::*;
