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

//! Trait for the ERC-4337 bundler RPC namespace.

use alloy_primitives::{Address, B256};
#[cfg(feature = "test-utils")]
use mockall::automock;
use userop_types::user_operation::{GasEstimate, UserOperationReceipt, UserOperationRequest};

use super::error::ProviderResult;

/// Trait for the `eth_` methods ERC-4337 adds to bundler endpoints.
#[cfg_attr(feature = "test-utils", automock)]
#[async_trait::async_trait]
pub trait BundlerProvider: Send + Sync {
    /// Estimate the gas fields of a user operation against an entry point
    async fn estimate_user_operation_gas(
        &self,
        op: &UserOperationRequest,
        entry_point: Address,
    ) -> ProviderResult<GasEstimate>;

    /// Submit a signed user operation, returning its operation hash
    async fn send_user_operation(
        &self,
        op: &UserOperationRequest,
        entry_point: Address,
    ) -> ProviderResult<B256>;

    /// Get the receipt of a user operation, or `None` while pending
    async fn get_user_operation_receipt(
        &self,
        hash: B256,
    ) -> ProviderResult<Option<UserOperationReceipt>>;

    /// Entry point addresses the bundler accepts operations for
    async fn get_supported_entry_points(&self) -> ProviderResult<Vec<Address>>;
}
