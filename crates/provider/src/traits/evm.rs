// This file is part of Userop.
//
// Userop is free software: you can redistribute it and/or modify it under the
// terms of the GNU Lesser General Public License as published by the Free Software
// Foundation, either version 3 of the License, or (at your option) any later version.
//
// Userop is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with Userop.
// If not, see https://www.gnu.org/licenses/.

//! Trait for interacting with chain data and contracts.

use alloy_primitives::{Address, Bytes, U256};
use alloy_rpc_types_eth::{BlockId, TransactionRequest};
#[cfg(feature = "test-utils")]
use mockall::automock;

use super::error::ProviderResult;

/// Trait for the standard `eth_` namespace calls the account and
/// middleware layers need.
#[cfg_attr(feature = "test-utils", automock)]
#[async_trait::async_trait]
pub trait EvmProvider: Send + Sync {
    /// Simulate a transaction via an eth_call
    async fn call(
        &self,
        tx: &TransactionRequest,
        block: Option<BlockId>,
    ) -> ProviderResult<Bytes>;

    /// Get the code at an address
    async fn get_code(&self, address: Address, block: Option<BlockId>) -> ProviderResult<Bytes>;

    /// Get the balance of an address
    async fn get_balance(&self, address: Address, block: Option<BlockId>) -> ProviderResult<U256>;

    /// Get the transaction count (EOA nonce) of an address
    async fn get_transaction_count(&self, address: Address) -> ProviderResult<u64>;

    /// Get the current block number
    async fn get_block_number(&self) -> ProviderResult<u64>;

    /// Get the base fee of the pending block
    async fn get_pending_base_fee(&self) -> ProviderResult<u128>;

    /// Get the max priority fee per gas estimate from the node
    async fn get_max_priority_fee(&self) -> ProviderResult<u128>;
}
