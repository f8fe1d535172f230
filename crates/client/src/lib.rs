//! Raffle Client.
//!
//! Mirrors the state of a raffle contract and enters it on behalf of a wallet. Reads and event
//! deliveries flow through a channel into a single-owner [`Synchronizer`], whose snapshots drive
//! the [view] and the entry [`Submitter`].

#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::missing_errors_doc)]

pub mod errors;
pub mod notify;
mod onchain;
mod submit;
mod subscribe;
mod sync;
pub mod view;

use std::{sync::Arc, time::Duration};

use alloy_primitives::{Address, B256, U256};
use anyhow::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
    time::sleep,
};
use tracing::info;

pub use errors::*;
pub use notify::{Notification, Notifier};
pub use onchain::*;
pub use submit::*;
pub use subscribe::*;
pub use sync::*;

/// The capacity of the update channel between the adapters and the synchronizer.
const UPDATE_CHANNEL_CAPACITY: usize = 64;

/// Read-only access to the raffle contract's view functions.
///
/// Each query is independent; none is retried by the client.
#[async_trait]
pub trait RaffleReader: Send + Sync + 'static {
    /// The raw raffle state code.
    async fn raffle_state(&self) -> Result<u8>;
    /// The number of players.
    async fn player_count(&self) -> Result<U256>;
    /// The most recent winner.
    async fn recent_winner(&self) -> Result<Address>;
    /// The round interval in seconds.
    async fn interval(&self) -> Result<U256>;
    /// The entrance fee in wei.
    async fn entrance_fee(&self) -> Result<U256>;
}

/// A stream with one item per delivered `RaffleEnter` log, carrying the player when known.
pub type EntryStream = BoxStream<'static, Result<Option<Address>>>;

/// A source of `RaffleEnter` logs.
#[async_trait]
pub trait RaffleEvents: Send + Sync + 'static {
    /// Open a new subscription.
    async fn subscribe(&self) -> Result<EntryStream>;
}

/// A wallet able to enter the raffle.
#[async_trait]
pub trait RaffleWallet: Send + Sync + 'static {
    /// Whether a wallet is connected.
    fn is_connected(&self) -> bool;
    /// Acquire the signer, returning its address.
    async fn signer(&self) -> Result<Address, TransactionFailure>;
    /// Send `enterRaffle` with `value` wei attached, returning the transaction hash.
    async fn submit_entry(&self, value: U256) -> Result<B256, TransactionFailure>;
    /// Wait until a submitted entry is included.
    async fn wait_for_confirmation(&self, tx_hash: B256)
        -> Result<EntryReceipt, TransactionFailure>;
}

/// The client for a raffle.
///
/// It consists of a reader and an event source. Running it reads the contract every
/// `poll_interval` and listens for entries, folding both into published snapshots.
#[derive(Debug)]
pub struct RaffleClient<R, E> {
    /// The reader for the contract's view functions.
    pub reader: Arc<R>,
    /// The source of `RaffleEnter` logs.
    pub events: Arc<E>,
    /// How often to re-read the contract. Zero reads only once.
    pub poll_interval: Duration,
}

impl<R, E> Clone for RaffleClient<R, E> {
    fn clone(&self) -> Self {
        Self {
            reader: self.reader.clone(),
            events: self.events.clone(),
            poll_interval: self.poll_interval,
        }
    }
}

impl<R, E> RaffleClient<R, E> {
    /// Create a new [`RaffleClient`].
    #[must_use]
    pub fn new(reader: R, events: E, poll_interval: Duration) -> Self {
        Self { reader: Arc::new(reader), events: Arc::new(events), poll_interval }
    }
}

impl<R: RaffleReader, E: RaffleEvents> RaffleClient<R, E> {
    /// Read the contract once and return the resulting snapshot.
    pub async fn fetch(&self) -> RaffleSnapshot {
        let (tx, rx) = mpsc::channel(UPDATE_CHANNEL_CAPACITY);
        let (snapshots, _) = watch::channel(RaffleSnapshot::default());
        let synchronizer = tokio::spawn(Synchronizer::new().run(rx, snapshots));
        fetch_snapshot_updates(self.reader.as_ref(), &tx).await;
        drop(tx);
        synchronizer.await.unwrap_or_default()
    }

    /// Start reading, listening, and synchronizing in background tasks.
    #[must_use]
    pub fn spawn(&self) -> RaffleHandle {
        let (tx, rx) = mpsc::channel(UPDATE_CHANNEL_CAPACITY);
        let (snapshots_tx, snapshots) = watch::channel(RaffleSnapshot::default());

        // Run the synchronizer task.
        let synchronizer = tokio::spawn(async move {
            Synchronizer::new().run(rx, snapshots_tx).await;
            Ok::<_, anyhow::Error>(())
        });

        // Run the read task.
        let reader = self.reader.clone();
        let poll_interval = self.poll_interval;
        let reads_tx = tx.clone();
        let reads = tokio::spawn(async move {
            loop {
                fetch_snapshot_updates(reader.as_ref(), &reads_tx).await;
                if poll_interval.is_zero() || reads_tx.is_closed() {
                    return Ok::<_, anyhow::Error>(());
                }
                sleep(poll_interval).await;
            }
        });

        // Run the subscription task.
        let events = self.events.clone();
        let subscription = tokio::spawn(async move {
            forward_entries(events.as_ref(), &tx, subscription_backoff()).await
        });

        info!(poll_interval = ?self.poll_interval, "Started raffle client.");
        RaffleHandle { snapshots, tasks: vec![synchronizer, reads, subscription] }
    }
}

/// The running tasks of a [`RaffleClient`].
#[derive(Debug)]
pub struct RaffleHandle {
    /// The latest published snapshot.
    pub snapshots: watch::Receiver<RaffleSnapshot>,
    tasks: Vec<JoinHandle<Result<()>>>,
}

impl RaffleHandle {
    /// Wait until every task has finished, returning the first failure.
    pub async fn join(self) -> Result<()> {
        for task in self.tasks {
            task.await??;
        }
        Ok(())
    }

    /// Abort every task and wait for them to stop.
    pub async fn shutdown(self) {
        for task in &self.tasks {
            task.abort();
        }
        for task in self.tasks {
            let _ = task.await;
        }
    }
}
