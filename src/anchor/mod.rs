//! On-chain anchoring module
//!
//! Commits claim digests to the `ProofStorage` contract. [`AnchorService`]
//! is the single point of contact with the chain: it is built once at
//! startup and is either ENABLED (bound to a [`ProofLedger`]) or DISABLED
//! (configuration missing, key invalid, or RPC unreachable). A disabled
//! service answers every call with [`GatewayError::AnchorUnavailable`]
//! without touching the network.

pub mod evm;
mod nonce;
mod workflow;

use std::str::FromStr;
use std::sync::Arc;

use alloy::primitives::Address;
use serde::Serialize;
use tracing::{info, warn};

use crate::domain::{Hash256, TxHash};
use crate::infra::{GatewayError, ProofLedger, Result, TxParams};
use crate::metrics::{metric_names, MetricsRegistry};

pub use evm::{EvmProofLedger, IProofStorage};
pub use nonce::{NonceManager, NonceReservation};

/// Polygon Amoy testnet
pub const DEFAULT_CHAIN_ID: u64 = 80002;

/// Gas limit used when `eth_estimateGas` fails
pub const DEFAULT_FALLBACK_GAS_LIMIT: u64 = 300_000;

/// Safety multiplier applied to a successful gas estimate, as a ratio (1.2x).
const GAS_BUFFER_NUMERATOR: u64 = 12;
const GAS_BUFFER_DENOMINATOR: u64 = 10;

/// Anchor service configuration
#[derive(Clone)]
pub struct AnchorConfig {
    /// JSON-RPC endpoint
    pub rpc_url: String,
    /// Deployed ProofStorage contract
    pub contract_address: Address,
    /// Operating account key (hex)
    pub private_key: String,
    /// Chain id used when signing
    pub chain_id: u64,
    /// Gas limit used when estimation fails
    pub fallback_gas_limit: u64,
}

impl std::fmt::Debug for AnchorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnchorConfig")
            .field("rpc_url", &self.rpc_url)
            .field("contract_address", &self.contract_address)
            .field("private_key", &"<redacted>")
            .field("chain_id", &self.chain_id)
            .field("fallback_gas_limit", &self.fallback_gas_limit)
            .finish()
    }
}

impl AnchorConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| GatewayError::Configuration(format!("{} is not set", key)))
        };

        let rpc_url = required("POLYGON_AMOY_RPC_URL")?;
        let contract_address = required("PROOF_STORAGE_CONTRACT_ADDRESS")?;
        let contract_address = Address::from_str(contract_address.trim()).map_err(|e| {
            GatewayError::Configuration(format!("invalid PROOF_STORAGE_CONTRACT_ADDRESS: {}", e))
        })?;
        let private_key = required("BACKEND_WALLET_PRIVATE_KEY")?;

        let chain_id = lookup("AMOY_CHAIN_ID")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(DEFAULT_CHAIN_ID);
        let fallback_gas_limit = lookup("PROOF_GAS_FALLBACK")
            .and_then(|s| s.trim().parse().ok())
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_FALLBACK_GAS_LIMIT);

        Ok(Self {
            rpc_url,
            contract_address,
            private_key,
            chain_id,
            fallback_gas_limit,
        })
    }

    pub fn settings(&self) -> AnchorSettings {
        AnchorSettings {
            chain_id: self.chain_id,
            fallback_gas_limit: self.fallback_gas_limit,
        }
    }
}

/// Transaction settings independent of the ledger implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorSettings {
    pub chain_id: u64,
    pub fallback_gas_limit: u64,
}

impl Default for AnchorSettings {
    fn default() -> Self {
        Self {
            chain_id: DEFAULT_CHAIN_ID,
            fallback_gas_limit: DEFAULT_FALLBACK_GAS_LIMIT,
        }
    }
}

/// Result of a best-effort gas estimation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GasEstimate {
    /// Units reported by `eth_estimateGas`
    Estimated(u64),
    /// Estimation failed; the configured fallback
    Fallback(u64),
}

impl GasEstimate {
    /// Gas limit to sign with: estimates get the 1.2x buffer, the fallback is used as-is.
    pub fn gas_limit(&self) -> u64 {
        match *self {
            GasEstimate::Estimated(units) => {
                units.saturating_mul(GAS_BUFFER_NUMERATOR) / GAS_BUFFER_DENOMINATOR
            }
            GasEstimate::Fallback(units) => units,
        }
    }
}

/// Anchor service status for health and status endpoints
#[derive(Debug, Clone, Serialize)]
pub struct AnchorStatus {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract: Option<String>,
    pub chain_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

enum AnchorState {
    Enabled(Arc<dyn ProofLedger>),
    Disabled(String),
}

/// Chain client adapter
pub struct AnchorService {
    state: AnchorState,
    settings: AnchorSettings,
    nonces: NonceManager,
    metrics: Option<Arc<MetricsRegistry>>,
}

impl AnchorService {
    /// Build the service from environment configuration.
    ///
    /// Never fails: any configuration or connectivity problem yields a
    /// disabled service.
    pub async fn from_env() -> Self {
        match AnchorConfig::from_env() {
            Ok(config) => Self::connect(config).await,
            Err(e) => {
                warn!("Anchor service disabled: {}", e);
                Self::disabled(e.to_string())
            }
        }
    }

    /// Derive the account, bind the contract, and verify connectivity.
    pub async fn connect(config: AnchorConfig) -> Self {
        info!("Anchor service configured:");
        info!("  RPC URL: {}", config.rpc_url);
        info!("  Contract: {}", config.contract_address);
        info!("  Chain ID: {}", config.chain_id);

        match EvmProofLedger::new(&config) {
            Ok(ledger) => Self::with_ledger(Arc::new(ledger), config.settings()).await,
            Err(e) => {
                warn!("Anchor service disabled: {}", e);
                Self::disabled(e.to_string()).with_settings(config.settings())
            }
        }
    }

    /// Run the startup checks against a ledger.
    ///
    /// An unreachable node disables the service. A contract owner that
    /// differs from the operating account is only logged: owner-gated
    /// writes will revert, reads keep working.
    pub async fn with_ledger(ledger: Arc<dyn ProofLedger>, settings: AnchorSettings) -> Self {
        let account = ledger.account();

        match ledger.chain_id().await {
            Ok(chain_id) if chain_id != settings.chain_id => {
                warn!(
                    "Connected node reports chain id {} but {} is configured; transactions will be signed for {}",
                    chain_id, settings.chain_id, settings.chain_id
                );
            }
            Ok(chain_id) => info!("Connected to chain {}", chain_id),
            Err(e) => {
                warn!("Anchor service disabled: RPC endpoint unreachable: {}", e);
                return Self::disabled(format!("RPC endpoint unreachable: {}", e))
                    .with_settings(settings);
            }
        }

        match ledger.owner().await {
            Ok(owner) if owner == account => {
                info!("Operating account {} is the contract owner", account)
            }
            Ok(owner) => warn!(
                "Operating account {} is NOT the contract owner ({}); storeProof calls will likely revert",
                account, owner
            ),
            Err(e) => warn!("Could not verify contract owner: {}", e),
        }

        info!(
            "Anchor service enabled (account {}, contract {})",
            account,
            ledger.contract()
        );

        Self {
            state: AnchorState::Enabled(ledger),
            settings,
            nonces: NonceManager::new(),
            metrics: None,
        }
    }

    /// A service that refuses every operation.
    pub fn disabled(reason: impl Into<String>) -> Self {
        Self {
            state: AnchorState::Disabled(reason.into()),
            settings: AnchorSettings::default(),
            nonces: NonceManager::new(),
            metrics: None,
        }
    }

    pub fn with_settings(mut self, settings: AnchorSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self.state, AnchorState::Enabled(_))
    }

    pub fn status(&self) -> AnchorStatus {
        match &self.state {
            AnchorState::Enabled(ledger) => AnchorStatus {
                enabled: true,
                account: Some(ledger.account().to_string()),
                contract: Some(ledger.contract().to_string()),
                chain_id: self.settings.chain_id,
                reason: None,
            },
            AnchorState::Disabled(reason) => AnchorStatus {
                enabled: false,
                account: None,
                contract: None,
                chain_id: self.settings.chain_id,
                reason: Some(reason.clone()),
            },
        }
    }

    fn ledger(&self) -> Result<&Arc<dyn ProofLedger>> {
        match &self.state {
            AnchorState::Enabled(ledger) => Ok(ledger),
            AnchorState::Disabled(reason) => Err(GatewayError::AnchorUnavailable(reason.clone())),
        }
    }

    async fn count(&self, name: &str) {
        if let Some(metrics) = &self.metrics {
            metrics.inc_counter(name).await;
        }
    }

    /// Contract owner as reported on chain.
    pub async fn owner(&self) -> Result<Address> {
        self.ledger()?.owner().await
    }

    /// Whether the contract already holds `digest`.
    pub async fn exists(&self, digest: &Hash256) -> Result<bool> {
        self.ledger()?.verify_proof(digest).await
    }

    /// Estimate gas for `storeProof`, falling back to the configured limit.
    ///
    /// Estimation errors are logged and never returned.
    pub async fn estimate_gas(&self, digest: &Hash256, metadata: &[u8]) -> Result<GasEstimate> {
        let ledger = self.ledger()?;

        match ledger.estimate_store_gas(digest, metadata).await {
            Ok(units) => Ok(GasEstimate::Estimated(units)),
            Err(e) => {
                warn!(
                    digest = %hex::encode(digest),
                    "Gas estimation failed: {}. Using default gas limit {}",
                    e,
                    self.settings.fallback_gas_limit
                );
                self.count(metric_names::GAS_ESTIMATE_FALLBACKS).await;
                Ok(GasEstimate::Fallback(self.settings.fallback_gas_limit))
            }
        }
    }

    /// Build, sign and broadcast `storeProof(digest, metadata)`.
    ///
    /// Returns as soon as the node accepts the raw transaction; inclusion is
    /// not awaited.
    pub async fn submit(&self, digest: &Hash256, metadata: &[u8]) -> Result<TxHash> {
        let ledger = self.ledger()?;
        let gas = self.estimate_gas(digest, metadata).await?;

        let reservation = self.nonces.reserve(&**ledger).await?;
        let gas_price = ledger.gas_price().await?;

        let params = TxParams {
            chain_id: self.settings.chain_id,
            nonce: reservation.nonce(),
            gas_limit: gas.gas_limit(),
            gas_price,
        };

        let tx_hash = ledger.send_store_proof(digest, metadata, params).await?;
        reservation.commit();

        info!(
            digest = %hex::encode(digest),
            account = %ledger.account(),
            nonce = params.nonce,
            gas_limit = params.gas_limit,
            gas_price = params.gas_price,
            "Proof transaction submitted: 0x{}",
            hex::encode(tx_hash)
        );

        Ok(tx_hash)
    }
}

/// Translate node/contract error text into a gateway error category.
pub fn classify_chain_error(message: &str) -> GatewayError {
    let lower = message.to_ascii_lowercase();

    if lower.contains("insufficient funds") {
        return GatewayError::InsufficientFunds(message.to_string());
    }

    if lower.contains("revert") {
        let owner_check = ["not owner", "not the owner", "ownableunauthorizedaccount"];
        if owner_check.iter().any(|needle| lower.contains(needle)) {
            return GatewayError::Unauthorized(message.to_string());
        }
        return GatewayError::Reverted(message.to_string());
    }

    GatewayError::Chain(message.to_string())
}
