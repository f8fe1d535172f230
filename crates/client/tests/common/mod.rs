#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet, VecDeque},
    sync::{
        atomic::{AtomicU64, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use alloy_primitives::{address, Address, B256, U256};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use backoff::ExponentialBackoff;
use futures::StreamExt;
use raffle_client::{
    EntryReceipt, EntryStream, Notification, Notifier, RaffleEvents, RaffleReader,
    RaffleSnapshot, RaffleWallet, TransactionFailure,
};
use raffle_types::RaffleState;
use tokio::sync::Notify;

/// The account used by [`MockWallet`].
pub const PLAYER: Address = address!("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");

/// The hash of every transaction sent by [`MockWallet`].
pub const TX_HASH: B256 = B256::repeat_byte(0x11);

/// 0.01 ether in wei.
pub const ENTRANCE_FEE: u64 = 10_000_000_000_000_000;

/// A snapshot of an open raffle charging [`ENTRANCE_FEE`].
#[must_use]
pub fn open_snapshot() -> RaffleSnapshot {
    RaffleSnapshot {
        state: Some(RaffleState::Open),
        entrance_fee: "0.01".to_string(),
        entrance_fee_wei: Some(U256::from(ENTRANCE_FEE)),
        ..Default::default()
    }
}

/// A backoff short enough for tests.
#[must_use]
pub fn fast_backoff() -> ExponentialBackoff {
    ExponentialBackoff {
        initial_interval: Duration::from_millis(10),
        max_interval: Duration::from_millis(20),
        max_elapsed_time: None,
        ..Default::default()
    }
}

/// A contract reader returning fixed values.
///
/// Queries named in `failing` return an error; queries named in `delays` answer late. The player
/// count can be changed between reads.
#[derive(Debug)]
pub struct MockReader {
    pub state: u8,
    pub players: AtomicU64,
    pub winner: Address,
    pub interval: u64,
    pub fee: u64,
    pub failing: HashSet<&'static str>,
    pub delays: HashMap<&'static str, Duration>,
    pub reads: AtomicUsize,
}

impl Default for MockReader {
    fn default() -> Self {
        Self {
            state: 0,
            players: AtomicU64::new(2),
            winner: Address::ZERO,
            interval: 30,
            fee: ENTRANCE_FEE,
            failing: HashSet::new(),
            delays: HashMap::new(),
            reads: AtomicUsize::new(0),
        }
    }
}

impl MockReader {
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn set_players(&self, players: u64) {
        self.players.store(players, Ordering::SeqCst);
    }

    async fn read<T>(&self, query: &'static str, value: T) -> Result<T> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(query) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.contains(query) {
            return Err(anyhow!("{query} reverted"));
        }
        Ok(value)
    }
}

#[async_trait]
impl RaffleReader for MockReader {
    async fn raffle_state(&self) -> Result<u8> {
        self.read("getRaffleState", self.state).await
    }

    async fn player_count(&self) -> Result<U256> {
        self.read("getNumberOfPlayers", U256::from(self.players.load(Ordering::SeqCst))).await
    }

    async fn recent_winner(&self) -> Result<Address> {
        self.read("getRecentWinner", self.winner).await
    }

    async fn interval(&self) -> Result<U256> {
        self.read("getInterval", U256::from(self.interval)).await
    }

    async fn entrance_fee(&self) -> Result<U256> {
        self.read("getEntranceFee", U256::from(self.fee)).await
    }
}

/// One scripted subscription.
#[derive(Debug, Clone)]
pub enum Subscription {
    /// Subscribing fails with this message.
    Fail(&'static str),
    /// Subscribing succeeds and the stream yields these deliveries, then ends.
    Deliver(Vec<Delivery>),
}

/// One scripted stream item.
#[derive(Debug, Clone)]
pub enum Delivery {
    Entry(Option<Address>),
    Fail(&'static str),
}

/// An event source playing back scripted subscriptions.
///
/// Once the script runs out every subscription stays open without delivering anything. With a
/// gate, each subscription waits for one permit before it is established.
#[derive(Debug, Default)]
pub struct MockEvents {
    script: Mutex<VecDeque<Subscription>>,
    pub gate: Option<Arc<Notify>>,
    pub subscriptions: AtomicUsize,
}

impl MockEvents {
    pub fn new(script: Vec<Subscription>) -> Self {
        Self { script: Mutex::new(script.into()), ..Default::default() }
    }

    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn subscriptions(&self) -> usize {
        self.subscriptions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RaffleEvents for MockEvents {
    async fn subscribe(&self) -> Result<EntryStream> {
        self.subscriptions.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Subscription::Fail(message)) => Err(anyhow!(message)),
            Some(Subscription::Deliver(deliveries)) => {
                let items = deliveries.into_iter().map(|delivery| match delivery {
                    Delivery::Entry(player) => Ok(player),
                    Delivery::Fail(message) => Err(anyhow!(message)),
                });
                Ok(futures::stream::iter(items).boxed())
            }
            None => Ok(futures::stream::pending().boxed()),
        }
    }
}

/// A wallet recording how often each step was reached.
#[derive(Debug, Default)]
pub struct MockWallet {
    pub connected: bool,
    pub signer_failure: Option<TransactionFailure>,
    pub submit_failure: Option<TransactionFailure>,
    pub confirm_failure: Option<TransactionFailure>,
    pub signer_calls: AtomicUsize,
    pub submit_calls: AtomicUsize,
    pub confirm_calls: AtomicUsize,
    pub sent: Mutex<Option<U256>>,
}

impl MockWallet {
    pub fn connected() -> Self {
        Self { connected: true, ..Default::default() }
    }

    pub fn disconnected() -> Self {
        Self::default()
    }

    /// The number of times any wallet step was reached.
    pub fn calls(&self) -> usize {
        self.signer_calls.load(Ordering::SeqCst)
            + self.submit_calls.load(Ordering::SeqCst)
            + self.confirm_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RaffleWallet for MockWallet {
    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn signer(&self) -> Result<Address, TransactionFailure> {
        self.signer_calls.fetch_add(1, Ordering::SeqCst);
        match &self.signer_failure {
            Some(failure) => Err(failure.clone()),
            None => Ok(PLAYER),
        }
    }

    async fn submit_entry(&self, value: U256) -> Result<B256, TransactionFailure> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(failure) = &self.submit_failure {
            return Err(failure.clone());
        }
        *self.sent.lock().unwrap() = Some(value);
        Ok(TX_HASH)
    }

    async fn wait_for_confirmation(
        &self,
        tx_hash: B256,
    ) -> Result<EntryReceipt, TransactionFailure> {
        self.confirm_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(failure) = &self.confirm_failure {
            return Err(failure.clone());
        }
        let value = self.sent.lock().unwrap().unwrap_or_default();
        Ok(EntryReceipt { tx_hash, block_number: Some(7), player: PLAYER, value })
    }
}

/// A notifier keeping every notification in order.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications.lock().unwrap().push(notification);
    }
}
