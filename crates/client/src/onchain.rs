use std::{collections::HashMap, fmt};

use alloy::{
    contract::Error as ContractError,
    network::{Ethereum, EthereumWallet},
    providers::{
        DynProvider, PendingTransactionBuilder, PendingTransactionError, Provider,
        ProviderBuilder,
    },
    rpc::types::Filter,
    transports::{http::reqwest::Url, RpcError},
};
use alloy_primitives::{Address, B256, U256};
use alloy_signer_local::PrivateKeySigner;
use alloy_sol_types::{GenericContractError, GenericRevertReason};
use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::StreamExt;
use raffle_types::{
    sol::{player_from_log, raffle_enter_topic, IRaffle},
    ContractConfig,
};
use tokio::sync::Mutex;
use tracing::debug;

use crate::{
    EntryReceipt, EntryStream, RaffleEvents, RaffleReader, RaffleWallet, TransactionFailure,
    TxStage,
};

/// Parses an RPC URL.
pub fn parse_rpc_url(rpc_url: &str) -> Result<Url> {
    rpc_url.parse().with_context(|| format!("invalid rpc url: {rpc_url}"))
}

/// Reads and watches a raffle contract over JSON-RPC.
///
/// Implements both [`RaffleReader`] and [`RaffleEvents`].
#[derive(Clone)]
pub struct OnchainRaffle {
    provider: DynProvider,
    contract: IRaffle::IRaffleInstance<DynProvider>,
    config: ContractConfig,
}

impl OnchainRaffle {
    /// Create a new [`OnchainRaffle`] for the contract at `config.address`.
    pub fn connect(rpc_url: &str, config: ContractConfig) -> Result<Self> {
        let provider = ProviderBuilder::new().on_http(parse_rpc_url(rpc_url)?).erased();
        let contract = IRaffle::new(config.address, provider.clone());
        Ok(Self { provider, contract, config })
    }
}

impl fmt::Debug for OnchainRaffle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OnchainRaffle").field("address", &self.config.address).finish()
    }
}

#[async_trait]
impl RaffleReader for OnchainRaffle {
    async fn raffle_state(&self) -> Result<u8> {
        Ok(self.contract.getRaffleState().call().await?)
    }

    async fn player_count(&self) -> Result<U256> {
        Ok(self.contract.getNumberOfPlayers().call().await?)
    }

    async fn recent_winner(&self) -> Result<Address> {
        Ok(self.contract.getRecentWinner().call().await?)
    }

    async fn interval(&self) -> Result<U256> {
        Ok(self.contract.getInterval().call().await?)
    }

    async fn entrance_fee(&self) -> Result<U256> {
        Ok(self.contract.getEntranceFee().call().await?)
    }
}

#[async_trait]
impl RaffleEvents for OnchainRaffle {
    async fn subscribe(&self) -> Result<EntryStream> {
        let filter =
            Filter::new().address(self.config.address).event_signature(raffle_enter_topic());
        let poller = self.provider.watch_logs(&filter).await?;
        debug!(contract = %self.config.address, "installed RaffleEnter log filter");
        let stream = poller
            .into_stream()
            .flat_map(futures::stream::iter)
            .map(|log| Ok(player_from_log(log.data())));
        Ok(stream.boxed())
    }
}

/// A wallet backed by a local private key.
///
/// Without a key the wallet reports itself as not connected.
pub struct LocalWallet {
    signer: Option<PrivateKeySigner>,
    contract: Option<IRaffle::IRaffleInstance<DynProvider>>,
    /// Sent entries awaiting confirmation, with the value they carry.
    pending: Mutex<HashMap<B256, (PendingTransactionBuilder<Ethereum>, U256)>>,
}

impl LocalWallet {
    /// Create a new [`LocalWallet`] sending entries to the contract at `config.address`.
    pub fn new(
        rpc_url: &str,
        config: ContractConfig,
        signer: Option<PrivateKeySigner>,
    ) -> Result<Self> {
        let contract = match &signer {
            Some(signer) => {
                let provider = ProviderBuilder::new()
                    .wallet(EthereumWallet::from(signer.clone()))
                    .on_http(parse_rpc_url(rpc_url)?)
                    .erased();
                Some(IRaffle::new(config.address, provider))
            }
            None => None,
        };
        Ok(Self { signer, contract, pending: Mutex::new(HashMap::new()) })
    }

    fn contract(
        &self,
        stage: TxStage,
    ) -> Result<&IRaffle::IRaffleInstance<DynProvider>, TransactionFailure> {
        self.contract
            .as_ref()
            .ok_or_else(|| TransactionFailure::message(stage, "wallet is not connected"))
    }
}

impl fmt::Debug for LocalWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalWallet")
            .field("signer", &self.signer.as_ref().map(PrivateKeySigner::address))
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl RaffleWallet for LocalWallet {
    fn is_connected(&self) -> bool {
        self.signer.is_some()
    }

    async fn signer(&self) -> Result<Address, TransactionFailure> {
        self.signer
            .as_ref()
            .map(PrivateKeySigner::address)
            .ok_or_else(|| TransactionFailure::message(TxStage::Signer, "wallet is not connected"))
    }

    async fn submit_entry(&self, value: U256) -> Result<B256, TransactionFailure> {
        let pending = self
            .contract(TxStage::Submission)?
            .enterRaffle()
            .value(value)
            .send()
            .await
            .map_err(|e| contract_failure(TxStage::Submission, &e))?;
        let tx_hash = *pending.tx_hash();
        self.pending.lock().await.insert(tx_hash, (pending, value));
        Ok(tx_hash)
    }

    async fn wait_for_confirmation(
        &self,
        tx_hash: B256,
    ) -> Result<EntryReceipt, TransactionFailure> {
        let (pending, value) = self.pending.lock().await.remove(&tx_hash).ok_or_else(|| {
            TransactionFailure::message(
                TxStage::Confirmation,
                format!("transaction {tx_hash} was not submitted by this wallet"),
            )
        })?;
        let receipt = pending.get_receipt().await.map_err(|e| pending_failure(&e))?;
        if !receipt.status() {
            return Err(TransactionFailure::message(
                TxStage::Confirmation,
                format!("transaction {tx_hash} reverted"),
            ));
        }
        Ok(EntryReceipt {
            tx_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            player: receipt.from,
            value,
        })
    }
}

/// Decodes the revert reason carried by revert data.
///
/// A plain `Error(string)` revert yields just its reason string; panics and raw payloads keep the
/// decoder's description.
fn revert_reason(data: &[u8]) -> Option<String> {
    match GenericRevertReason::decode(data)? {
        GenericRevertReason::ContractError(GenericContractError::Revert(revert)) => {
            Some(revert.reason)
        }
        other => Some(other.to_string()),
    }
}

/// Builds a [`TransactionFailure`] from a contract call error, decoding the revert reason from
/// the node's error response when it carries revert data.
fn contract_failure(stage: TxStage, e: &ContractError) -> TransactionFailure {
    if let ContractError::TransportError(RpcError::ErrorResp(payload)) = e {
        let reason = payload.as_revert_data().and_then(|data| revert_reason(&data));
        return TransactionFailure {
            stage,
            reason,
            message: Some(payload.message.to_string()),
        };
    }
    TransactionFailure::message(stage, e.to_string())
}

fn pending_failure(e: &PendingTransactionError) -> TransactionFailure {
    if let PendingTransactionError::TransportError(RpcError::ErrorResp(payload)) = e {
        return TransactionFailure::message(TxStage::Confirmation, payload.message.to_string());
    }
    TransactionFailure::message(TxStage::Confirmation, e.to_string())
}
