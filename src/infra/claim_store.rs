//! In-memory claim store
//!
//! Process-lifetime storage for filed claims. Keeps the per-user filing
//! order, an id index for proof lookups, and a digest index so a duplicate
//! proof can reuse the transaction of the claim that anchored it first.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ClaimRecord;

use super::{ClaimStore, GatewayError, Result};

#[derive(Default)]
struct Claims {
    by_id: HashMap<String, ClaimRecord>,
    by_user: HashMap<String, Vec<String>>,
    by_proof_hash: HashMap<String, String>,
}

/// Claim store backed by maps behind a single lock.
#[derive(Default)]
pub struct InMemoryClaimStore {
    claims: RwLock<Claims>,
}

impl InMemoryClaimStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Claims>> {
        self.claims
            .read()
            .map_err(|_| GatewayError::Internal("claim store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Claims>> {
        self.claims
            .write()
            .map_err(|_| GatewayError::Internal("claim store lock poisoned".to_string()))
    }
}

#[async_trait]
impl ClaimStore for InMemoryClaimStore {
    async fn append(&self, claim: ClaimRecord) -> Result<()> {
        let mut claims = self.write()?;

        if claims.by_id.contains_key(&claim.id) {
            return Err(GatewayError::DuplicateClaim(claim.id));
        }

        claims
            .by_user
            .entry(claim.user_id.clone())
            .or_default()
            .push(claim.id.clone());

        // First claim to anchor a digest owns it.
        if let Some(proof_hash) = &claim.proof_hash {
            claims
                .by_proof_hash
                .entry(proof_hash.clone())
                .or_insert_with(|| claim.id.clone());
        }

        debug!(claim_id = %claim.id, user_id = %claim.user_id, "claim stored");
        claims.by_id.insert(claim.id.clone(), claim);
        Ok(())
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<ClaimRecord>> {
        let claims = self.read()?;
        let Some(ids) = claims.by_user.get(user_id) else {
            return Ok(Vec::new());
        };

        Ok(ids
            .iter()
            .filter_map(|id| claims.by_id.get(id).cloned())
            .collect())
    }

    async fn find_by_id(&self, claim_id: &str) -> Result<ClaimRecord> {
        self.read()?
            .by_id
            .get(claim_id)
            .cloned()
            .ok_or_else(|| GatewayError::ClaimNotFound(claim_id.to_string()))
    }

    async fn find_by_proof_hash(&self, proof_hash: &str) -> Result<Option<ClaimRecord>> {
        let claims = self.read()?;
        Ok(claims
            .by_proof_hash
            .get(proof_hash)
            .and_then(|id| claims.by_id.get(id))
            .cloned())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.read()?.by_id.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ClaimStatus, NewClaim};
    use chrono::Utc;

    fn claim(id: &str, user_id: &str) -> ClaimRecord {
        ClaimRecord::submitted(
            id.to_string(),
            NewClaim {
                user_id: user_id.to_string(),
                crop: "rice".to_string(),
                event: "flood".to_string(),
                amount: serde_json::json!("2500.00"),
                description: "Paddy submerged for a week".to_string(),
            },
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_list_unknown_user_is_empty() {
        let store = InMemoryClaimStore::new();
        assert!(store.list_by_user("newUser").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_missing_claim_is_not_found() {
        let store = InMemoryClaimStore::new();
        let err = store.find_by_id("CLM-nonexistent").await.unwrap_err();
        assert_eq!(err, GatewayError::ClaimNotFound("CLM-nonexistent".to_string()));
    }

    #[tokio::test]
    async fn test_list_preserves_insertion_order() {
        let store = InMemoryClaimStore::new();
        store.append(claim("CLM-3", "u1")).await.unwrap();
        store.append(claim("CLM-1", "u1")).await.unwrap();
        store.append(claim("CLM-2", "u2")).await.unwrap();
        store.append(claim("CLM-0", "u1")).await.unwrap();

        let ids: Vec<String> = store
            .list_by_user("u1")
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec!["CLM-3", "CLM-1", "CLM-0"]);
        assert_eq!(store.count().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_find_by_id_across_users() {
        let store = InMemoryClaimStore::new();
        store.append(claim("CLM-a", "u1")).await.unwrap();
        store.append(claim("CLM-b", "u2")).await.unwrap();

        let found = store.find_by_id("CLM-b").await.unwrap();
        assert_eq!(found.user_id, "u2");
        assert_eq!(found.status, ClaimStatus::Submitted);
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let store = InMemoryClaimStore::new();
        store.append(claim("CLM-a", "u1")).await.unwrap();

        let err = store.append(claim("CLM-a", "u2")).await.unwrap_err();
        assert!(matches!(err, GatewayError::DuplicateClaim(_)));
        assert!(store.list_by_user("u2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_proof_hash_index_keeps_first_claim() {
        let store = InMemoryClaimStore::new();
        let digest = "cd".repeat(32);

        store
            .append(claim("CLM-a", "u1").with_proof(digest.clone(), Some("0xaa".to_string())))
            .await
            .unwrap();
        store
            .append(claim("CLM-b", "u1").with_proof(digest.clone(), None))
            .await
            .unwrap();

        let owner = store.find_by_proof_hash(&digest).await.unwrap().unwrap();
        assert_eq!(owner.id, "CLM-a");
        assert!(store.find_by_proof_hash("00").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_appends_for_new_user_are_kept() {
        let store = std::sync::Arc::new(InMemoryClaimStore::new());

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.append(claim(&format!("CLM-{i}"), "u1")).await })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.list_by_user("u1").await.unwrap().len(), 16);
    }
}
