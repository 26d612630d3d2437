//! alloy-backed proof ledger
//!
//! Talks JSON-RPC to an EVM node and drives the deployed `ProofStorage`
//! contract. Transactions are built with explicit nonce, gas limit, gas
//! price and chain id, signed locally with the operating key, and
//! broadcast with `eth_sendRawTransaction`.

use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes, FixedBytes};
use alloy::providers::{Provider, ProviderBuilder, RootProvider};
use alloy::signers::local::PrivateKeySigner;
use alloy::sol;
use alloy::transports::http::{reqwest, Http};
use async_trait::async_trait;
use tracing::debug;

use crate::domain::{Hash256, TxHash};
use crate::infra::{GatewayError, ProofLedger, Result, TxParams};

use super::{classify_chain_error, AnchorConfig};

// Generate contract bindings
sol! {
    #[sol(rpc)]
    interface IProofStorage {
        function storeProof(bytes32 proofHash, bytes metadata) external;

        function verifyProof(bytes32 proofHash) external view returns (bool);

        function owner() external view returns (address);
    }
}

type HttpProvider = RootProvider<Http<reqwest::Client>>;

/// Proof ledger over an HTTP JSON-RPC endpoint
pub struct EvmProofLedger {
    provider: HttpProvider,
    wallet: EthereumWallet,
    account: Address,
    contract: Address,
}

impl EvmProofLedger {
    /// Derive the operating account and bind the contract.
    ///
    /// No network traffic happens here.
    pub fn new(config: &AnchorConfig) -> Result<Self> {
        let signer: PrivateKeySigner = config
            .private_key
            .trim()
            .parse()
            .map_err(|e| GatewayError::Configuration(format!("invalid private key: {}", e)))?;
        let account = signer.address();

        let provider = ProviderBuilder::new().on_http(
            config
                .rpc_url
                .parse()
                .map_err(|e| GatewayError::Configuration(format!("invalid RPC URL: {}", e)))?,
        );

        Ok(Self {
            provider,
            wallet: EthereumWallet::from(signer),
            account,
            contract: config.contract_address,
        })
    }

    fn to_bytes32(digest: &Hash256) -> FixedBytes<32> {
        FixedBytes::from(*digest)
    }
}

fn rpc_error(err: impl std::fmt::Display) -> GatewayError {
    classify_chain_error(&err.to_string())
}

#[async_trait]
impl ProofLedger for EvmProofLedger {
    fn account(&self) -> Address {
        self.account
    }

    fn contract(&self) -> Address {
        self.contract
    }

    async fn chain_id(&self) -> Result<u64> {
        self.provider.get_chain_id().await.map_err(rpc_error)
    }

    async fn owner(&self) -> Result<Address> {
        let contract = IProofStorage::new(self.contract, &self.provider);
        let owner = contract.owner().call().await.map_err(rpc_error)?;
        Ok(owner._0)
    }

    async fn verify_proof(&self, digest: &Hash256) -> Result<bool> {
        let contract = IProofStorage::new(self.contract, &self.provider);
        let exists = contract
            .verifyProof(Self::to_bytes32(digest))
            .call()
            .await
            .map_err(rpc_error)?;
        Ok(exists._0)
    }

    async fn estimate_store_gas(&self, digest: &Hash256, metadata: &[u8]) -> Result<u64> {
        let contract = IProofStorage::new(self.contract, &self.provider);
        contract
            .storeProof(Self::to_bytes32(digest), Bytes::copy_from_slice(metadata))
            .from(self.account)
            .estimate_gas()
            .await
            .map_err(rpc_error)
    }

    async fn transaction_count(&self) -> Result<u64> {
        self.provider
            .get_transaction_count(self.account)
            .pending()
            .await
            .map_err(rpc_error)
    }

    async fn gas_price(&self) -> Result<u128> {
        self.provider.get_gas_price().await.map_err(rpc_error)
    }

    async fn send_store_proof(
        &self,
        digest: &Hash256,
        metadata: &[u8],
        params: TxParams,
    ) -> Result<TxHash> {
        let contract = IProofStorage::new(self.contract, &self.provider);

        let tx = contract
            .storeProof(Self::to_bytes32(digest), Bytes::copy_from_slice(metadata))
            .from(self.account)
            .nonce(params.nonce)
            .gas(params.gas_limit)
            .gas_price(params.gas_price)
            .into_transaction_request()
            .with_chain_id(params.chain_id);

        let envelope = tx
            .build(&self.wallet)
            .await
            .map_err(|e| GatewayError::Internal(format!("failed to sign transaction: {}", e)))?;
        debug!(nonce = params.nonce, gas_limit = params.gas_limit, "transaction signed");

        let pending = self
            .provider
            .send_tx_envelope(envelope)
            .await
            .map_err(rpc_error)?;

        Ok(pending.tx_hash().0)
    }
}
