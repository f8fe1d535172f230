//! Presentation.
//!
//! Display values derived from a [`RaffleSnapshot`] and an [`EntryForm`]. Nothing here holds
//! state of its own.

use crate::{EntryForm, RaffleSnapshot};

/// The placeholder of the amount input.
pub const AMOUNT_PLACEHOLDER: &str = "Enter amount in ETH";

/// A labelled value in the raffle details panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRow {
    /// The label of the value.
    pub label: &'static str,
    /// The formatted value.
    pub value: String,
}

/// The rows of the raffle details panel, in display order.
#[must_use]
pub fn raffle_details(snapshot: &RaffleSnapshot) -> Vec<DetailRow> {
    vec![
        DetailRow { label: "Raffle State", value: snapshot.state_label().to_string() },
        DetailRow { label: "Number of Players", value: snapshot.player_count.to_string() },
        DetailRow { label: "Interval", value: format!("{} seconds", snapshot.interval_secs) },
        DetailRow { label: "Entrance Fee", value: format!("{} ETH", snapshot.entrance_fee) },
        DetailRow { label: "Last Winner", value: snapshot.winner_label() },
    ]
}

/// The entry form as displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFormView {
    /// The current amount.
    pub amount: String,
    /// The placeholder shown while the amount is empty.
    pub placeholder: &'static str,
    /// The label of the submit control.
    pub button_label: &'static str,
    /// Whether the submit control is disabled.
    pub disabled: bool,
}

impl From<&EntryForm> for EntryFormView {
    fn from(form: &EntryForm) -> Self {
        Self {
            amount: form.amount.clone(),
            placeholder: AMOUNT_PLACEHOLDER,
            button_label: if form.is_submitting { "Entering..." } else { "Enter" },
            disabled: form.is_submitting,
        }
    }
}
