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

//! Wire types for paymaster sponsorship RPCs: the ERC-7677 pair
//! (`pm_getPaymasterStubData` / `pm_getPaymasterData`) and the vendor
//! gas-manager variants.

use alloy_primitives::{Address, Bytes, U128};
use serde::{Deserialize, Serialize};

use crate::user_operation::UserOperationRequest;

/// Result of `pm_getPaymasterStubData`: placeholder paymaster fields
/// sized like the real ones so gas estimation is accurate. Either the
/// v0.6 blob or the v0.7 decomposed fields are populated, per the entry
/// point the request named.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymasterStubData {
    /// v0.6 placeholder blob.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paymaster_and_data: Option<Bytes>,
    /// v0.7 paymaster address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paymaster: Option<Address>,
    /// v0.7 placeholder paymaster data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paymaster_data: Option<Bytes>,
    /// v0.7 paymaster verification gas.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paymaster_verification_gas_limit: Option<U128>,
    /// v0.7 paymaster post-op gas.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paymaster_post_op_gas_limit: Option<U128>,
    /// Service hint that the stub values are also the final ones, so the
    /// `pm_getPaymasterData` call can be skipped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_final: Option<bool>,
    /// Sponsor identity for display purposes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sponsor: Option<PaymasterSponsor>,
}

/// Result of `pm_getPaymasterData`: the final sponsorship fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymasterData {
    /// v0.6 blob.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paymaster_and_data: Option<Bytes>,
    /// v0.7 paymaster address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paymaster: Option<Address>,
    /// v0.7 paymaster data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paymaster_data: Option<Bytes>,
    /// v0.7 paymaster verification gas.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paymaster_verification_gas_limit: Option<U128>,
    /// v0.7 paymaster post-op gas.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paymaster_post_op_gas_limit: Option<U128>,
    /// Sponsor identity for display purposes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sponsor: Option<PaymasterSponsor>,
}

/// Sponsor identity attached to ERC-7677 responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymasterSponsor {
    /// Human-readable sponsor name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Sponsor icon URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// Parameters for the two-call gas-manager sponsorship RPC
/// (`{vendor}_requestPaymasterAndData`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymasterAndDataParams {
    /// Sponsorship policy identifier issued by the vendor dashboard.
    pub policy_id: String,
    /// Entry point the operation targets.
    pub entry_point: Address,
    /// The operation to sponsor, with estimated gas and fees populated.
    pub user_operation: UserOperationRequest,
}

/// Result of the two-call sponsorship RPC: the v0.6 blob alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymasterAndData {
    /// v0.6 paymaster address + data blob.
    pub paymaster_and_data: Bytes,
}

/// Parameters for the combined one-call sponsorship RPC
/// (`{vendor}_requestGasAndPaymasterAndData`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GasAndPaymasterAndDataParams {
    /// Sponsorship policy identifier.
    pub policy_id: String,
    /// Entry point the operation targets.
    pub entry_point: Address,
    /// The partially built operation (gas and fee fields zero).
    pub user_operation: UserOperationRequest,
    /// Dummy signature the service uses for its own gas estimation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dummy_signature: Option<Bytes>,
    /// Caller-pinned fee fields the service must not override.
    #[serde(default, skip_serializing_if = "FeeOverride::is_empty")]
    pub fee_override: FeeOverride,
}

/// Caller-pinned gas and fee values forwarded into the combined
/// sponsorship call. Empty means the service estimates everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeOverride {
    /// Pinned `maxFeePerGas`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_fee_per_gas: Option<U128>,
    /// Pinned `maxPriorityFeePerGas`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_priority_fee_per_gas: Option<U128>,
    /// Pinned `callGasLimit`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_gas_limit: Option<U128>,
    /// Pinned `verificationGasLimit`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_gas_limit: Option<U128>,
    /// Pinned `preVerificationGas`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_verification_gas: Option<U128>,
}

impl FeeOverride {
    /// True when no field is pinned.
    pub fn is_empty(&self) -> bool {
        self.max_fee_per_gas.is_none()
            && self.max_priority_fee_per_gas.is_none()
            && self.call_gas_limit.is_none()
            && self.verification_gas_limit.is_none()
            && self.pre_verification_gas.is_none()
    }
}

/// Result of the combined one-call RPC: authoritative gas, fee, and
/// paymaster fields together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasAndPaymasterAndData {
    /// Execution phase gas.
    pub call_gas_limit: U128,
    /// Verification phase gas.
    pub verification_gas_limit: U128,
    /// Bundler compensation gas.
    pub pre_verification_gas: U128,
    /// EIP-1559 max fee per gas.
    pub max_fee_per_gas: U128,
    /// EIP-1559 max priority fee per gas.
    pub max_priority_fee_per_gas: U128,
    /// v0.6 blob.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paymaster_and_data: Option<Bytes>,
    /// v0.7 paymaster address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paymaster: Option<Address>,
    /// v0.7 paymaster data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paymaster_data: Option<Bytes>,
    /// v0.7 paymaster verification gas.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paymaster_verification_gas_limit: Option<U128>,
    /// v0.7 paymaster post-op gas.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paymaster_post_op_gas_limit: Option<U128>,
}

/// Parameters for Coinbase-style `pm_sponsorUserOperation`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SponsorUserOperationParams {
    /// The operation to sponsor.
    pub user_operation: UserOperationRequest,
    /// Entry point the operation targets.
    pub entry_point: Address,
}

/// Result of `pm_sponsorUserOperation`: gas, fee, and paymaster fields
/// for a v0.6 operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SponsoredUserOperation {
    /// v0.6 paymaster blob.
    pub paymaster_and_data: Bytes,
    /// Bundler compensation gas.
    pub pre_verification_gas: U128,
    /// Verification phase gas.
    pub verification_gas_limit: U128,
    /// Execution phase gas.
    pub call_gas_limit: U128,
    /// EIP-1559 max fee per gas.
    pub max_fee_per_gas: U128,
    /// EIP-1559 max priority fee per gas.
    pub max_priority_fee_per_gas: U128,
}
