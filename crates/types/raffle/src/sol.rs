//! Solidity types.
//!
//! This module contains the ABI of the raffle contract that the client reads from and enters.

use alloy::sol;
use alloy_primitives::{Address, LogData, B256};
use alloy_sol_types::SolEvent;

sol! {
    /// @notice The raffle contract.
    #[sol(rpc)]
    interface IRaffle {
        /// @notice The raw lifecycle phase of the raffle (0 = open, 1 = calculating).
        function getRaffleState() external view returns (uint8);

        /// @notice The number of players entered in the current round.
        function getNumberOfPlayers() external view returns (uint256);

        /// @notice The winner of the most recent round, or the zero address.
        function getRecentWinner() external view returns (address);

        /// @notice The length of a round in seconds.
        function getInterval() external view returns (uint256);

        /// @notice The minimum payment for an entry, in wei.
        function getEntranceFee() external view returns (uint256);

        /// @notice Enters the sender into the current round.
        function enterRaffle() external payable;

        /// @notice Emitted when a player enters the raffle.
        event RaffleEnter(address indexed player);
    }
}

/// The topic that identifies [`IRaffle::RaffleEnter`] logs.
#[must_use]
pub fn raffle_enter_topic() -> B256 {
    IRaffle::RaffleEnter::SIGNATURE_HASH
}

/// Extracts the player from a `RaffleEnter` log.
///
/// Deployments differ on whether the player is indexed, so the address is taken from the first
/// indexed topic if there is one and from the first data word otherwise.
#[must_use]
pub fn player_from_log(log: &LogData) -> Option<Address> {
    let topics = log.topics();
    if topics.first() != Some(&raffle_enter_topic()) {
        return None;
    }
    if let Some(topic) = topics.get(1) {
        return Some(Address::from_word(*topic));
    }
    if log.data.len() >= 32 {
        return Some(Address::from_word(B256::from_slice(&log.data[..32])));
    }
    None
}
