//! Serialized nonce allocation for the operating account
//!
//! All submissions go through one mutex held from nonce read to broadcast,
//! so concurrent claims never sign two transactions with the same nonce.
//! Every reservation reads `eth_getTransactionCount(pending)` under the lock.
//! The pending count wins whenever it disagrees with the locally expected
//! nonce: a higher count means another sender used the account, a lower one
//! means an accepted transaction left the mempool and its nonce is free again.

use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::infra::{ProofLedger, Result};

#[derive(Default)]
pub struct NonceManager {
    next: Mutex<Option<u64>>,
}

impl NonceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the account's nonce slot and return the nonce to use.
    ///
    /// Other submissions wait until the returned reservation is dropped.
    pub async fn reserve(&self, ledger: &dyn ProofLedger) -> Result<NonceReservation<'_>> {
        let mut slot = self.next.lock().await;
        let pending = ledger.transaction_count().await?;

        match *slot {
            Some(expected) if expected != pending => {
                warn!(expected, pending, "nonce diverged from chain, resynchronizing");
            }
            Some(_) => {}
            None => debug!(nonce = pending, "nonce synchronized from chain"),
        }
        *slot = Some(pending);

        Ok(NonceReservation {
            slot,
            nonce: pending,
            committed: false,
        })
    }
}

/// A nonce held for one transaction.
///
/// [`commit`](Self::commit) after a successful broadcast advances the
/// expected nonce; dropping it uncommitted clears it.
pub struct NonceReservation<'a> {
    slot: MutexGuard<'a, Option<u64>>,
    nonce: u64,
    committed: bool,
}

impl NonceReservation<'_> {
    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn commit(mut self) {
        *self.slot = Some(self.nonce + 1);
        self.committed = true;
    }
}

impl Drop for NonceReservation<'_> {
    fn drop(&mut self) {
        if !self.committed {
            *self.slot = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{GatewayError, MockProofLedger};

    fn counting_ledger(counts: Vec<u64>) -> MockProofLedger {
        let mut ledger = MockProofLedger::new();
        let mut seq = mockall::Sequence::new();
        for count in counts {
            ledger
                .expect_transaction_count()
                .times(1)
                .in_sequence(&mut seq)
                .returning(move || Ok(count));
        }
        ledger
    }

    #[tokio::test]
    async fn test_reservations_follow_pending_count() {
        let ledger = counting_ledger(vec![7, 8]);
        let nonces = NonceManager::new();

        let first = nonces.reserve(&ledger).await.unwrap();
        assert_eq!(first.nonce(), 7);
        first.commit();

        let second = nonces.reserve(&ledger).await.unwrap();
        assert_eq!(second.nonce(), 8);
        second.commit();
    }

    #[tokio::test]
    async fn test_external_sends_move_nonce_forward() {
        let ledger = counting_ledger(vec![7, 12]);
        let nonces = NonceManager::new();

        nonces.reserve(&ledger).await.unwrap().commit();

        let next = nonces.reserve(&ledger).await.unwrap();
        assert_eq!(next.nonce(), 12);
    }

    #[tokio::test]
    async fn test_dropped_transaction_nonce_is_reused() {
        // 7 was broadcast, then evicted from the mempool before mining.
        let ledger = counting_ledger(vec![7, 7]);
        let nonces = NonceManager::new();

        nonces.reserve(&ledger).await.unwrap().commit();

        let next = nonces.reserve(&ledger).await.unwrap();
        assert_eq!(next.nonce(), 7);
    }

    #[tokio::test]
    async fn test_uncommitted_reservation_forces_resync() {
        let ledger = counting_ledger(vec![3, 4]);
        let nonces = NonceManager::new();

        let failed = nonces.reserve(&ledger).await.unwrap();
        assert_eq!(failed.nonce(), 3);
        drop(failed);

        let retried = nonces.reserve(&ledger).await.unwrap();
        assert_eq!(retried.nonce(), 4);
    }

    #[tokio::test]
    async fn test_sync_failure_propagates() {
        let mut ledger = MockProofLedger::new();
        ledger
            .expect_transaction_count()
            .returning(|| Err(GatewayError::Chain("connection refused".to_string())));

        let nonces = NonceManager::new();
        assert!(matches!(
            nonces.reserve(&ledger).await,
            Err(GatewayError::Chain(_))
        ));
    }
}
