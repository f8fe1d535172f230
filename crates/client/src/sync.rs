//! View-state synchronization.
//!
//! Contract reads and event deliveries are turned into [`RaffleUpdate`] messages and folded into a
//! single [`RaffleSnapshot`] by the [`Synchronizer`], which is the only owner of that state.

use alloy_primitives::{Address, U256};
use raffle_types::RaffleState;
use raffle_utils::{format_ether, short_address, NOT_AVAILABLE};
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::RaffleReader;

const SYNCHRONIZER_TAG: &str = "\x1b[36m[Synchronizer]\x1b[0m";

/// Shown while the raffle state has not been read yet.
pub const LOADING_PLACEHOLDER: &str = "Loading...";

/// Shown while the contract reports no winner.
pub const NO_WINNER_PLACEHOLDER: &str = "No winner yet";

/// A single change observed on the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaffleUpdate {
    /// The raw result of `getRaffleState`.
    State(u8),
    /// The result of `getNumberOfPlayers`.
    PlayerCount(U256),
    /// The result of `getRecentWinner`.
    RecentWinner(Address),
    /// The result of `getInterval`.
    Interval(U256),
    /// The result of `getEntranceFee`, in wei.
    EntranceFee(U256),
    /// A `RaffleEnter` log was delivered.
    PlayerEntered {
        /// The entering player, if the log carried one.
        player: Option<Address>,
    },
}

/// The locally mirrored state of the raffle, coerced for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RaffleSnapshot {
    /// The raffle state, or `None` until the first read lands.
    pub state: Option<RaffleState>,
    /// The number of players.
    pub player_count: u64,
    /// The most recent winner, or `None` if there is none yet.
    pub last_winner: Option<Address>,
    /// The round interval in seconds.
    pub interval_secs: u64,
    /// The entrance fee as a decimal ether string, or [`NOT_AVAILABLE`].
    pub entrance_fee: String,
    /// The entrance fee in wei, once known.
    pub entrance_fee_wei: Option<U256>,
}

impl Default for RaffleSnapshot {
    fn default() -> Self {
        Self {
            state: None,
            player_count: 0,
            last_winner: None,
            interval_secs: 0,
            entrance_fee: NOT_AVAILABLE.to_string(),
            entrance_fee_wei: None,
        }
    }
}

impl RaffleSnapshot {
    /// The display label of the raffle state.
    #[must_use]
    pub fn state_label(&self) -> &'static str {
        self.state.map_or(LOADING_PLACEHOLDER, RaffleState::as_str)
    }

    /// The display label of the last winner.
    #[must_use]
    pub fn winner_label(&self) -> String {
        self.last_winner.as_ref().map_or_else(|| NO_WINNER_PLACEHOLDER.to_string(), short_address)
    }
}

/// The last raw value seen from each read, used to apply a read only when it changes.
#[derive(Debug, Default)]
struct RawReads {
    state: Option<u8>,
    player_count: Option<U256>,
    recent_winner: Option<Address>,
    interval: Option<U256>,
    entrance_fee: Option<U256>,
}

/// Returns whether `value` differs from `last`, recording it if so.
fn observe<T: PartialEq + Copy>(last: &mut Option<T>, value: T) -> bool {
    if *last == Some(value) {
        return false;
    }
    *last = Some(value);
    true
}

/// Folds [`RaffleUpdate`]s into a [`RaffleSnapshot`].
///
/// Each read is applied only when its raw value differs from the previous result of the same
/// query. Every `PlayerEntered` increments the player count by one without re-reading the
/// contract, so the count may run ahead of (or, with duplicate deliveries, past) the contract's
/// until the next changed `getNumberOfPlayers` result overwrites it.
#[derive(Debug, Default)]
pub struct Synchronizer {
    snapshot: RaffleSnapshot,
    raw: RawReads,
}

impl Synchronizer {
    /// Create a new [`Synchronizer`] with every field at its placeholder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> &RaffleSnapshot {
        &self.snapshot
    }

    /// Apply an update, returning whether the snapshot changed.
    pub fn apply(&mut self, update: RaffleUpdate) -> bool {
        let snapshot = &mut self.snapshot;
        match update {
            RaffleUpdate::State(raw) => {
                if !observe(&mut self.raw.state, raw) {
                    return false;
                }
                let state = RaffleState::from(raw);
                debug!(raw = %raw, state = %state, "{SYNCHRONIZER_TAG} Raffle state updated.");
                snapshot.state = Some(state);
            }
            RaffleUpdate::PlayerCount(raw) => {
                if !observe(&mut self.raw.player_count, raw) {
                    return false;
                }
                snapshot.player_count = raw.saturating_to::<u64>();
                debug!(player_count = %snapshot.player_count, "{SYNCHRONIZER_TAG} Player count updated.");
            }
            RaffleUpdate::RecentWinner(raw) => {
                if !observe(&mut self.raw.recent_winner, raw) {
                    return false;
                }
                snapshot.last_winner = (!raw.is_zero()).then_some(raw);
                debug!(winner = %raw, "{SYNCHRONIZER_TAG} Recent winner updated.");
            }
            RaffleUpdate::Interval(raw) => {
                if !observe(&mut self.raw.interval, raw) {
                    return false;
                }
                snapshot.interval_secs = raw.saturating_to::<u64>();
                debug!(interval = %snapshot.interval_secs, "{SYNCHRONIZER_TAG} Interval updated.");
            }
            RaffleUpdate::EntranceFee(raw) => {
                if !observe(&mut self.raw.entrance_fee, raw) {
                    return false;
                }
                // A zero fee is a real fee and shows as "0.0"; only a failed conversion shows N/A.
                snapshot.entrance_fee = match format_ether(raw) {
                    Ok(fee) => fee,
                    Err(e) => {
                        warn!(wei = %raw, error = %e, "{SYNCHRONIZER_TAG} Failed to format entrance fee.");
                        NOT_AVAILABLE.to_string()
                    }
                };
                snapshot.entrance_fee_wei = Some(raw);
                debug!(fee = %snapshot.entrance_fee, "{SYNCHRONIZER_TAG} Entrance fee updated.");
            }
            RaffleUpdate::PlayerEntered { player } => {
                snapshot.player_count = snapshot.player_count.saturating_add(1);
                info!(
                    player = %player.map(|p| p.to_string()).unwrap_or_default(),
                    player_count = %snapshot.player_count,
                    "{SYNCHRONIZER_TAG} Player entered the raffle."
                );
            }
        }
        true
    }

    /// Apply updates until every sender is dropped, publishing each changed snapshot.
    pub async fn run(
        mut self,
        mut updates: mpsc::Receiver<RaffleUpdate>,
        snapshots: watch::Sender<RaffleSnapshot>,
    ) -> RaffleSnapshot {
        while let Some(update) = updates.recv().await {
            if self.apply(update) {
                snapshots.send_replace(self.snapshot.clone());
            }
        }
        debug!("{SYNCHRONIZER_TAG} Update channel closed.");
        self.snapshot
    }
}

/// Issues the five contract reads concurrently, forwarding each result as soon as it lands.
///
/// Results arrive in no particular order. A failed read is logged and forwards nothing, so the
/// synchronizer keeps its previous value.
pub async fn fetch_snapshot_updates<R: RaffleReader + ?Sized>(
    reader: &R,
    updates: &mpsc::Sender<RaffleUpdate>,
) {
    tokio::join!(
        forward(updates, "getRaffleState", async {
            reader.raffle_state().await.map(RaffleUpdate::State)
        }),
        forward(updates, "getNumberOfPlayers", async {
            reader.player_count().await.map(RaffleUpdate::PlayerCount)
        }),
        forward(updates, "getRecentWinner", async {
            reader.recent_winner().await.map(RaffleUpdate::RecentWinner)
        }),
        forward(updates, "getInterval", async {
            reader.interval().await.map(RaffleUpdate::Interval)
        }),
        forward(updates, "getEntranceFee", async {
            reader.entrance_fee().await.map(RaffleUpdate::EntranceFee)
        }),
    );
}

async fn forward(
    updates: &mpsc::Sender<RaffleUpdate>,
    query: &str,
    read: impl std::future::Future<Output = anyhow::Result<RaffleUpdate>>,
) {
    match read.await {
        Ok(update) => {
            if updates.send(update).await.is_err() {
                debug!(query = %query, "{SYNCHRONIZER_TAG} Synchronizer stopped, dropping read.");
            }
        }
        Err(e) => warn!(query = %query, error = %e, "{SYNCHRONIZER_TAG} Contract read failed."),
    }
}
