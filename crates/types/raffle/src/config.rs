use alloy_primitives::Address;
use serde::Deserialize;

/// The location of the raffle contract.
///
/// Every reader, subscriber, and wallet is constructed with one of these instead of consulting a
/// global address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ContractConfig {
    /// The address of the deployed raffle contract.
    pub address: Address,
}

impl ContractConfig {
    /// Create a new [`ContractConfig`].
    #[must_use]
    pub fn new(address: Address) -> Self {
        Self { address }
    }
}
