use std::fmt;

use serde::Serialize;

/// The lifecycle phase of the raffle as reported by the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RaffleState {
    /// The raffle accepts entries.
    Open,
    /// A winner is being drawn; entries are rejected.
    Calculating,
    /// The contract reported a code this client does not recognize.
    Unknown,
}

impl RaffleState {
    /// Returns whether the raffle currently accepts entries.
    #[must_use]
    pub fn is_open(self) -> bool {
        self == RaffleState::Open
    }

    /// Returns the display label of the state.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RaffleState::Open => "Open",
            RaffleState::Calculating => "Calculating",
            RaffleState::Unknown => "Unknown",
        }
    }
}

impl From<u8> for RaffleState {
    fn from(raw: u8) -> Self {
        match raw {
            0 => RaffleState::Open,
            1 => RaffleState::Calculating,
            _ => RaffleState::Unknown,
        }
    }
}

impl fmt::Display for RaffleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
