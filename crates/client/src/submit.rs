use std::{fmt, sync::Arc};

use alloy_primitives::{Address, B256, U256};
use raffle_types::RaffleState;
use raffle_utils::parse_ether;
use tracing::{debug, error, info, warn};

use crate::{
    notify::{AWAITING_CONFIRMATION_MESSAGE, ENTRY_SUCCESS_MESSAGE},
    AmountRejection, EntryError, Notifier, RaffleSnapshot, RaffleWallet, TransactionFailure,
    TxStage,
};

const SUBMITTER_TAG: &str = "\x1b[33m[Submitter]\x1b[0m";

/// The entry form as filled in by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryForm {
    /// The amount to pay, in ether.
    pub amount: String,
    /// Whether an entry is in flight.
    pub is_submitting: bool,
}

impl EntryForm {
    /// Create a form with the given amount.
    #[must_use]
    pub fn with_amount(amount: impl Into<String>) -> Self {
        Self { amount: amount.into(), is_submitting: false }
    }
}

/// A confirmed entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryReceipt {
    /// The hash of the entry transaction.
    pub tx_hash: B256,
    /// The block the transaction was included in.
    pub block_number: Option<u64>,
    /// The entering account.
    pub player: Address,
    /// The amount paid, in wei.
    pub value: U256,
}

/// The phase of an entry attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitPhase {
    /// Nothing in flight.
    Idle,
    /// Checking the preconditions.
    Validating,
    /// Acquiring a signer and sending the transaction.
    Submitting,
    /// Waiting for the transaction to be included.
    AwaitingConfirmation,
    /// The entry was confirmed.
    Success,
    /// The entry failed.
    Failed,
}

impl fmt::Display for SubmitPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Checks the entry preconditions in order, returning the amount in wei.
///
/// 1. The wallet must be connected.
/// 2. The amount must parse as ether and be at least the last-known entrance fee. While the fee is
///    unknown only the parse is checked; the contract enforces the fee regardless.
/// 3. The raffle must be open.
pub fn validate_entry(
    wallet_connected: bool,
    form: &EntryForm,
    snapshot: &RaffleSnapshot,
) -> Result<U256, EntryError> {
    if !wallet_connected {
        return Err(EntryError::WalletNotConnected);
    }

    let value = parse_ether(&form.amount).map_err(|e| EntryError::InvalidAmount {
        amount: form.amount.clone(),
        rejection: AmountRejection::Unparsable(e.to_string()),
    })?;
    if let Some(fee) = snapshot.entrance_fee_wei {
        if value < fee {
            return Err(EntryError::InvalidAmount {
                amount: form.amount.clone(),
                rejection: AmountRejection::BelowEntranceFee { value, fee },
            });
        }
    }

    if !snapshot.state.is_some_and(RaffleState::is_open) {
        return Err(EntryError::RaffleNotOpen { state: snapshot.state_label().to_string() });
    }

    Ok(value)
}

/// Enters the raffle through a wallet, reporting progress through a notifier.
///
/// Every attempt runs `Idle → Validating → Submitting → AwaitingConfirmation → {Success, Failed}`
/// and ends back in `Idle`. A failed precondition stops at `Validating` without touching the
/// wallet.
#[derive(Debug)]
pub struct Submitter<W, N> {
    wallet: Arc<W>,
    notifier: Arc<N>,
    phase: SubmitPhase,
}

impl<W: RaffleWallet, N: Notifier> Submitter<W, N> {
    /// Create a new [`Submitter`].
    #[must_use]
    pub fn new(wallet: Arc<W>, notifier: Arc<N>) -> Self {
        Self { wallet, notifier, phase: SubmitPhase::Idle }
    }

    /// The current phase.
    #[must_use]
    pub fn phase(&self) -> SubmitPhase {
        self.phase
    }

    fn transition(&mut self, phase: SubmitPhase) {
        debug!(from = %self.phase, to = %phase, "{SUBMITTER_TAG} Phase transition.");
        self.phase = phase;
    }

    /// Attempt one entry with the amount in `form`, judged against `snapshot`.
    ///
    /// Exactly one success or error notification is raised per call. On success the amount is
    /// cleared; `is_submitting` is false again on every return.
    pub async fn submit(
        &mut self,
        form: &mut EntryForm,
        snapshot: &RaffleSnapshot,
    ) -> Result<EntryReceipt, EntryError> {
        self.transition(SubmitPhase::Validating);
        let value = match validate_entry(self.wallet.is_connected(), form, snapshot) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "{SUBMITTER_TAG} Entry rejected.");
                self.notifier.error(e.user_message());
                self.transition(SubmitPhase::Idle);
                return Err(e);
            }
        };

        form.is_submitting = true;
        self.transition(SubmitPhase::Submitting);
        let mut loading = false;
        let result = self.send(value, &mut loading).await;
        if loading {
            self.notifier.dismiss();
        }

        let outcome = match result {
            Ok(receipt) => {
                self.transition(SubmitPhase::Success);
                info!(
                    tx_hash = %receipt.tx_hash,
                    block = ?receipt.block_number,
                    player = %receipt.player,
                    value = %receipt.value,
                    "{SUBMITTER_TAG} Entered the raffle."
                );
                self.notifier.success(ENTRY_SUCCESS_MESSAGE);
                form.amount.clear();
                Ok(receipt)
            }
            Err(failure) => {
                self.transition(SubmitPhase::Failed);
                error!(stage = %failure.stage, error = %failure, "{SUBMITTER_TAG} Failed to enter the raffle.");
                self.notifier.error(failure.user_message());
                Err(EntryError::Transaction(failure))
            }
        };

        form.is_submitting = false;
        self.transition(SubmitPhase::Idle);
        outcome
    }

    async fn send(
        &mut self,
        value: U256,
        loading: &mut bool,
    ) -> Result<EntryReceipt, TransactionFailure> {
        let player = self.wallet.signer().await?;
        info!(player = %player, value = %value, "{SUBMITTER_TAG} Submitting entry...");

        self.notifier.loading(AWAITING_CONFIRMATION_MESSAGE);
        *loading = true;
        let tx_hash = self.wallet.submit_entry(value).await?;
        info!(tx_hash = %tx_hash, "{SUBMITTER_TAG} Entry submitted.");

        self.transition(SubmitPhase::AwaitingConfirmation);
        let receipt = self.wallet.wait_for_confirmation(tx_hash).await?;
        if receipt.tx_hash != tx_hash {
            return Err(TransactionFailure::message(
                TxStage::Confirmation,
                format!("confirmed {} while waiting for {tx_hash}", receipt.tx_hash),
            ));
        }
        Ok(receipt)
    }
}
