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

//! Trait for paymaster sponsorship RPC namespaces.

use alloy_primitives::Address;
#[cfg(feature = "test-utils")]
use mockall::automock;
use userop_types::{
    paymaster::{
        GasAndPaymasterAndData, GasAndPaymasterAndDataParams, PaymasterAndData,
        PaymasterAndDataParams, PaymasterData, PaymasterStubData, SponsorUserOperationParams,
        SponsoredUserOperation,
    },
    user_operation::UserOperationRequest,
};

use super::error::ProviderResult;

/// Trait for sponsorship RPCs: the ERC-7677 `pm_` pair plus the vendor
/// gas-manager variants. An endpoint typically implements one family;
/// unimplemented methods surface the server's method-not-found error.
#[cfg_attr(feature = "test-utils", automock)]
#[async_trait::async_trait]
pub trait PaymasterProvider: Send + Sync {
    /// ERC-7677 `pm_getPaymasterStubData`: placeholder paymaster fields
    /// for gas estimation
    async fn get_paymaster_stub_data(
        &self,
        op: &UserOperationRequest,
        entry_point: Address,
        chain_id: u64,
        context: Option<serde_json::Value>,
    ) -> ProviderResult<PaymasterStubData>;

    /// ERC-7677 `pm_getPaymasterData`: final sponsorship fields
    async fn get_paymaster_data(
        &self,
        op: &UserOperationRequest,
        entry_point: Address,
        chain_id: u64,
        context: Option<serde_json::Value>,
    ) -> ProviderResult<PaymasterData>;

    /// Gas-manager two-call mode: sponsorship data for an operation whose
    /// gas and fees are already estimated
    async fn request_paymaster_and_data(
        &self,
        params: &PaymasterAndDataParams,
    ) -> ProviderResult<PaymasterAndData>;

    /// Gas-manager one-call mode: gas, fees, and sponsorship data in a
    /// single combined request
    async fn request_gas_and_paymaster_and_data(
        &self,
        params: &GasAndPaymasterAndDataParams,
    ) -> ProviderResult<GasAndPaymasterAndData>;

    /// `pm_sponsorUserOperation`: combined sponsorship for v0.6 operations
    async fn sponsor_user_operation(
        &self,
        params: &SponsorUserOperationParams,
    ) -> ProviderResult<SponsoredUserOperation>;
}
