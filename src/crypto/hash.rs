//! Proof commitments over canonical JSON
//!
//! A claim record is committed by serializing it with the RFC 8785 JSON
//! Canonicalization Scheme (JCS) and hashing the resulting bytes with
//! SHA-256. The digest is what the proof-storage contract stores as its
//! `bytes32` key.
//!
//! # RFC 8785 Compliance
//!
//! Canonicalization follows JCS:
//! - object keys are sorted lexicographically (UTF-16 code units)
//! - no insignificant whitespace is emitted
//! - floats use the ES6 shortest round-trip form
//! - strings are escaped per the JSON grammar
//!
//! Strings and floats are rendered by `serde_json_canonicalizer`. Integers
//! are written verbatim instead of going through `f64`, so values beyond
//! 2^53 keep every digit and distinct integers never share a digest.
//!
//! Field order in the input never changes the digest.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::domain::Hash256;
use crate::infra::{GatewayError, Result};

/// Canonical bytes of a record plus their SHA-256 digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofCommitment {
    canonical: String,
    digest: Hash256,
}

impl ProofCommitment {
    /// Canonical JSON text that was hashed.
    pub fn canonical_json(&self) -> &str {
        &self.canonical
    }

    /// Canonical bytes that were hashed.
    pub fn canonical_bytes(&self) -> &[u8] {
        self.canonical.as_bytes()
    }

    pub fn digest(&self) -> &Hash256 {
        &self.digest
    }

    /// Lowercase hex digest without `0x` prefix.
    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest)
    }
}

/// Commit a JSON record.
///
/// Fails with [`GatewayError::Validation`] when the record cannot be
/// canonicalized (e.g. a map with non-string keys).
pub fn commit(record: &serde_json::Value) -> Result<ProofCommitment> {
    commit_value(record)
}

/// Commit any serializable record.
pub fn commit_value<T: Serialize + ?Sized>(record: &T) -> Result<ProofCommitment> {
    let canonical = canonicalize_json(record)?;
    let digest = sha256(canonical.as_bytes());
    Ok(ProofCommitment { canonical, digest })
}

/// Convert a record to its canonical JSON text (RFC 8785).
pub fn canonicalize_json<T: Serialize + ?Sized>(record: &T) -> Result<String> {
    let value = serde_json::to_value(record)
        .map_err(|e| GatewayError::Validation(format!("record is not serializable: {}", e)))?;
    let mut out = Vec::new();
    write_canonical(&value, &mut out)?;
    String::from_utf8(out)
        .map_err(|e| GatewayError::Internal(format!("canonical JSON is not UTF-8: {}", e)))
}

fn write_canonical(value: &Value, out: &mut Vec<u8>) -> Result<()> {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => {
            out.extend_from_slice(n.to_string().as_bytes());
        }
        Value::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_canonical(item, out)?;
            }
            out.push(b']');
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.encode_utf16().cmp(b.encode_utf16()));

            out.push(b'{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_scalar(key.as_str(), out)?;
                out.push(b':');
                write_canonical(item, out)?;
            }
            out.push(b'}');
        }
        scalar => write_scalar(scalar, out)?,
    }
    Ok(())
}

fn write_scalar<T: Serialize + ?Sized>(value: &T, out: &mut Vec<u8>) -> Result<()> {
    let bytes = serde_json_canonicalizer::to_vec(&value)
        .map_err(|e| GatewayError::Validation(format!("record cannot be canonicalized: {}", e)))?;
    out.extend_from_slice(&bytes);
    Ok(())
}

/// SHA-256 of arbitrary bytes.
pub fn sha256(bytes: &[u8]) -> Hash256 {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().into()
}

/// Lowercase hex encoding of a digest, no prefix.
pub fn digest_hex(digest: &Hash256) -> String {
    hex::encode(digest)
}

/// Parse a 32-byte digest from hex, with or without a `0x` prefix.
pub fn parse_digest_hex(input: &str) -> Result<Hash256> {
    let trimmed = input.trim();
    let hex_part = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    let bytes = hex::decode(hex_part)
        .map_err(|e| GatewayError::Validation(format!("invalid digest hex: {}", e)))?;

    bytes.try_into().map_err(|bytes: Vec<u8>| {
        GatewayError::Validation(format!("digest must be 32 bytes, got {}", bytes.len()))
    })
}
