//! Errors.
//!
//! This module contains the errors that can end an entry attempt.

use std::fmt;

use alloy_primitives::U256;
use thiserror::Error;

/// Shown when the wallet is not connected.
pub const WALLET_NOT_CONNECTED_MESSAGE: &str = "Please connect your wallet.";

/// Shown when the amount is missing, unparsable, or below the entrance fee.
pub const INVALID_AMOUNT_MESSAGE: &str = "Please enter a valid amount.";

/// Shown when the raffle is not accepting entries.
pub const RAFFLE_NOT_OPEN_MESSAGE: &str =
    "You can't enter in this raffle. Please wait for the result.";

/// Shown when a transaction failed without any more specific message.
pub const ENTRY_FAILED_MESSAGE: &str = "Failed to enter the raffle.";

/// The error that ends an entry attempt.
///
/// The first three variants are raised before the wallet is touched; only
/// [`EntryError::Transaction`] can follow chain interaction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EntryError {
    /// No wallet is connected.
    #[error("wallet is not connected")]
    WalletNotConnected,

    /// The amount cannot be used for an entry.
    #[error("invalid amount {amount:?}: {rejection}")]
    InvalidAmount {
        /// The amount as entered.
        amount: String,
        /// Why the amount was rejected.
        rejection: AmountRejection,
    },

    /// The raffle is not accepting entries.
    #[error("raffle is not open (state: {state})")]
    RaffleNotOpen {
        /// The display label of the current state.
        state: String,
    },

    /// Signer acquisition, submission, or confirmation failed.
    #[error(transparent)]
    Transaction(#[from] TransactionFailure),
}

impl EntryError {
    /// The message to show the user for this error.
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            EntryError::WalletNotConnected => WALLET_NOT_CONNECTED_MESSAGE,
            EntryError::InvalidAmount { .. } => INVALID_AMOUNT_MESSAGE,
            EntryError::RaffleNotOpen { .. } => RAFFLE_NOT_OPEN_MESSAGE,
            EntryError::Transaction(failure) => failure.user_message(),
        }
    }
}

/// The reason an amount was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountRejection {
    /// The amount could not be parsed as ether.
    #[error("{0}")]
    Unparsable(String),

    /// The amount is below the last-known entrance fee.
    #[error("{value} wei is below the entrance fee of {fee} wei")]
    BelowEntranceFee {
        /// The amount in wei.
        value: U256,
        /// The entrance fee in wei.
        fee: U256,
    },
}

/// The step of an entry transaction that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStage {
    /// Acquiring a signer from the wallet.
    Signer,
    /// Sending the transaction.
    Submission,
    /// Waiting for the transaction to be included.
    Confirmation,
}

impl fmt::Display for TxStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxStage::Signer => f.write_str("signer acquisition"),
            TxStage::Submission => f.write_str("submission"),
            TxStage::Confirmation => f.write_str("confirmation"),
        }
    }
}

/// A failed entry transaction.
///
/// Carries the contract's revert reason and the transport's error message separately so that
/// [`TransactionFailure::user_message`] can pick the most specific one.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{stage} failed: {}", self.user_message())]
pub struct TransactionFailure {
    /// The step that failed.
    pub stage: TxStage,
    /// The revert reason decoded from the contract, if any.
    pub reason: Option<String>,
    /// The error message reported by the wallet or provider, if any.
    pub message: Option<String>,
}

impl TransactionFailure {
    /// A failure carrying a decoded revert reason.
    pub fn revert(stage: TxStage, reason: impl Into<String>) -> Self {
        Self { stage, reason: Some(reason.into()), message: None }
    }

    /// A failure carrying only an error message.
    pub fn message(stage: TxStage, message: impl Into<String>) -> Self {
        Self { stage, reason: None, message: Some(message.into()) }
    }

    /// A failure with nothing more specific to report.
    #[must_use]
    pub fn unspecified(stage: TxStage) -> Self {
        Self { stage, reason: None, message: None }
    }

    /// Returns the revert reason, else the error message, else [`ENTRY_FAILED_MESSAGE`].
    ///
    /// Blank strings are skipped.
    #[must_use]
    pub fn user_message(&self) -> &str {
        [self.reason.as_deref(), self.message.as_deref()]
            .into_iter()
            .flatten()
            .find(|message| !message.trim().is_empty())
            .unwrap_or(ENTRY_FAILED_MESSAGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_revert_reason() {
        let failure = TransactionFailure {
            stage: TxStage::Submission,
            reason: Some("Raffle__NotOpen".to_string()),
            message: Some("execution reverted".to_string()),
        };
        assert_eq!(failure.user_message(), "Raffle__NotOpen");
    }

    #[test]
    fn test_user_message_falls_back_to_message() {
        let failure = TransactionFailure::message(TxStage::Signer, "user rejected the request");
        assert_eq!(failure.user_message(), "user rejected the request");

        let blank_reason = TransactionFailure {
            stage: TxStage::Confirmation,
            reason: Some("  ".to_string()),
            message: Some("dropped".to_string()),
        };
        assert_eq!(blank_reason.user_message(), "dropped");
    }

    #[test]
    fn test_user_message_static_fallback() {
        let failure = TransactionFailure::unspecified(TxStage::Confirmation);
        assert_eq!(failure.user_message(), ENTRY_FAILED_MESSAGE);
        assert_eq!(failure.to_string(), "confirmation failed: Failed to enter the raffle.");
    }

    #[test]
    fn test_entry_error_user_messages() {
        assert_eq!(EntryError::WalletNotConnected.user_message(), WALLET_NOT_CONNECTED_MESSAGE);
        let invalid = EntryError::InvalidAmount {
            amount: "abc".to_string(),
            rejection: AmountRejection::Unparsable("bad".to_string()),
        };
        assert_eq!(invalid.user_message(), INVALID_AMOUNT_MESSAGE);
        let closed = EntryError::RaffleNotOpen { state: "Calculating".to_string() };
        assert_eq!(closed.user_message(), RAFFLE_NOT_OPEN_MESSAGE);
        let failed = EntryError::from(TransactionFailure::revert(TxStage::Submission, "nope"));
        assert_eq!(failed.user_message(), "nope");
    }
}
