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

use alloy_primitives::{Address, Bytes, B256, U128, U256};
use serde::{Deserialize, Serialize};

use crate::{authorization::Eip7702Auth, chain::ChainSpec};

/// User operation hashing for entry point v0.6
pub mod v0_6;
/// User operation packing and hashing for entry point v0.7
pub mod v0_7;

/// ERC-4337 entry point version.
///
/// The version determines the user operation field layout, the packing
/// rules, and the signing hash.
#[derive(Debug, Clone, Copy, Eq, PartialEq, PartialOrd, Ord)]
pub enum EntryPointVersion {
    /// Version 0.6
    V0_6,
    /// Version 0.7
    V0_7,
}

impl EntryPointVersion {
    /// Canonical version string, e.g. `"0.6.0"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V0_6 => "0.6.0",
            Self::V0_7 => "0.7.0",
        }
    }
}

/// A resolved entry point deployment: address, version, and the chain it
/// lives on.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct EntryPoint {
    /// Contract address.
    pub address: Address,
    /// Entry point version.
    pub version: EntryPointVersion,
    /// Chain id the deployment is bound to.
    pub chain_id: u64,
}

impl EntryPoint {
    /// The default entry point of `version` for the given chain.
    pub fn of_chain(chain: &ChainSpec, version: EntryPointVersion) -> Self {
        let address = match version {
            EntryPointVersion::V0_6 => chain.entry_point_v0_6,
            EntryPointVersion::V0_7 => chain.entry_point_v0_7,
        };
        Self {
            address,
            version,
            chain_id: chain.id,
        }
    }
}

/// A single call an account should perform.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct UserOperationCall {
    /// Call target.
    pub target: Address,
    /// Native token value to transfer.
    pub value: U256,
    /// Calldata passed to the target.
    pub data: Bytes,
}

impl UserOperationCall {
    /// A plain call with no value transfer.
    pub fn new(target: Address, data: Bytes) -> Self {
        Self {
            target,
            value: U256::ZERO,
            data,
        }
    }
}

/// Builder-stage user operation.
///
/// Fields are populated progressively by the middleware pipeline; numeric
/// fields stay `None` until the stage that owns them has run. Packing for
/// hashing treats missing numeric fields as zero, but a struct must pass
/// [`UserOperationStruct::is_valid_request`] before it may be sent.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct UserOperationStruct {
    /// Account the operation executes from.
    pub sender: Address,
    /// Entry point nonce of the operation.
    pub nonce: U256,
    /// Factory address + calldata for first-use deployment (v0.6 layout);
    /// `0x` once deployed. Mutually exclusive with `factory`/`factory_data`.
    pub init_code: Option<Bytes>,
    /// Calldata the account executes.
    pub call_data: Bytes,
    /// Gas for the account execution phase.
    pub call_gas_limit: Option<u128>,
    /// Gas for the verification phase.
    pub verification_gas_limit: Option<u128>,
    /// Gas paid to compensate the bundler for calldata and overhead.
    pub pre_verification_gas: Option<u128>,
    /// EIP-1559 max fee per gas.
    pub max_fee_per_gas: Option<u128>,
    /// EIP-1559 max priority fee per gas.
    pub max_priority_fee_per_gas: Option<u128>,
    /// v0.6 paymaster address + data blob; `0x` when self-sponsored.
    pub paymaster_and_data: Option<Bytes>,
    /// v0.7 factory address.
    pub factory: Option<Address>,
    /// v0.7 factory calldata.
    pub factory_data: Option<Bytes>,
    /// v0.7 paymaster address.
    pub paymaster: Option<Address>,
    /// v0.7 gas for paymaster verification.
    pub paymaster_verification_gas_limit: Option<u128>,
    /// v0.7 gas for the paymaster post-op call.
    pub paymaster_post_op_gas_limit: Option<u128>,
    /// v0.7 paymaster-specific data.
    pub paymaster_data: Option<Bytes>,
    /// Signature over the operation hash; starts as a dummy value sized
    /// like a real signature so gas estimation is accurate.
    pub signature: Bytes,
    /// EIP-7702 authorization tuple, for delegated-EOA senders only.
    pub eip7702_auth: Option<Eip7702Auth>,
}

impl UserOperationStruct {
    /// Computes the canonical signing hash for the given entry point.
    pub fn hash(&self, entry_point: &EntryPoint) -> B256 {
        match entry_point.version {
            EntryPointVersion::V0_6 => {
                v0_6::hash_user_operation(self, entry_point.address, entry_point.chain_id)
            }
            EntryPointVersion::V0_7 => {
                v0_7::hash_user_operation(self, entry_point.address, entry_point.chain_id)
            }
        }
    }

    /// Whether the struct is complete enough to be sent: gas limits and
    /// max fee populated and non-zero, priority fee populated.
    pub fn is_valid_request(&self) -> bool {
        fn nonzero(field: Option<u128>) -> bool {
            field.is_some_and(|v| v != 0)
        }

        nonzero(self.call_gas_limit)
            && nonzero(self.verification_gas_limit)
            && nonzero(self.pre_verification_gas)
            && nonzero(self.max_fee_per_gas)
            && self.max_priority_fee_per_gas.is_some()
    }

    /// Serializes into the immutable wire form for the given version.
    pub fn to_request(&self, version: EntryPointVersion) -> UserOperationRequest {
        let base = UserOperationRequest {
            sender: self.sender,
            nonce: self.nonce,
            init_code: None,
            call_data: self.call_data.clone(),
            call_gas_limit: U128::from(self.call_gas_limit.unwrap_or_default()),
            verification_gas_limit: U128::from(self.verification_gas_limit.unwrap_or_default()),
            pre_verification_gas: U128::from(self.pre_verification_gas.unwrap_or_default()),
            max_fee_per_gas: U128::from(self.max_fee_per_gas.unwrap_or_default()),
            max_priority_fee_per_gas: U128::from(
                self.max_priority_fee_per_gas.unwrap_or_default(),
            ),
            paymaster_and_data: None,
            factory: None,
            factory_data: None,
            paymaster: None,
            paymaster_verification_gas_limit: None,
            paymaster_post_op_gas_limit: None,
            paymaster_data: None,
            signature: self.signature.clone(),
            eip7702_auth: None,
        };

        match version {
            EntryPointVersion::V0_6 => UserOperationRequest {
                init_code: Some(self.init_code.clone().unwrap_or_default()),
                paymaster_and_data: Some(self.paymaster_and_data.clone().unwrap_or_default()),
                ..base
            },
            EntryPointVersion::V0_7 => UserOperationRequest {
                factory: self.factory,
                factory_data: self.factory_data.clone(),
                paymaster: self.paymaster,
                paymaster_verification_gas_limit: self
                    .paymaster_verification_gas_limit
                    .map(U128::from),
                paymaster_post_op_gas_limit: self.paymaster_post_op_gas_limit.map(U128::from),
                paymaster_data: self.paymaster_data.clone(),
                eip7702_auth: self.eip7702_auth.clone(),
                ..base
            },
        }
    }
}

/// The immutable RPC-ready form of a user operation. Version-conditional
/// fields are omitted from the JSON when absent.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOperationRequest {
    /// Account the operation executes from.
    pub sender: Address,
    /// Entry point nonce.
    pub nonce: U256,
    /// v0.6 init code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init_code: Option<Bytes>,
    /// Calldata the account executes.
    pub call_data: Bytes,
    /// Gas for the account execution phase.
    pub call_gas_limit: U128,
    /// Gas for the verification phase.
    pub verification_gas_limit: U128,
    /// Bundler compensation gas.
    pub pre_verification_gas: U128,
    /// EIP-1559 max fee per gas.
    pub max_fee_per_gas: U128,
    /// EIP-1559 max priority fee per gas.
    pub max_priority_fee_per_gas: U128,
    /// v0.6 paymaster address + data blob.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paymaster_and_data: Option<Bytes>,
    /// v0.7 factory address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factory: Option<Address>,
    /// v0.7 factory calldata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factory_data: Option<Bytes>,
    /// v0.7 paymaster address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paymaster: Option<Address>,
    /// v0.7 paymaster verification gas.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paymaster_verification_gas_limit: Option<U128>,
    /// v0.7 paymaster post-op gas.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paymaster_post_op_gas_limit: Option<U128>,
    /// v0.7 paymaster data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paymaster_data: Option<Bytes>,
    /// Signature over the operation hash.
    pub signature: Bytes,
    /// EIP-7702 authorization tuple.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eip7702_auth: Option<Eip7702Auth>,
}

impl From<&UserOperationRequest> for UserOperationStruct {
    fn from(request: &UserOperationRequest) -> Self {
        UserOperationStruct {
            sender: request.sender,
            nonce: request.nonce,
            init_code: request.init_code.clone(),
            call_data: request.call_data.clone(),
            call_gas_limit: Some(request.call_gas_limit.to()),
            verification_gas_limit: Some(request.verification_gas_limit.to()),
            pre_verification_gas: Some(request.pre_verification_gas.to()),
            max_fee_per_gas: Some(request.max_fee_per_gas.to()),
            max_priority_fee_per_gas: Some(request.max_priority_fee_per_gas.to()),
            paymaster_and_data: request.paymaster_and_data.clone(),
            factory: request.factory,
            factory_data: request.factory_data.clone(),
            paymaster: request.paymaster,
            paymaster_verification_gas_limit: request
                .paymaster_verification_gas_limit
                .map(|x| x.to()),
            paymaster_post_op_gas_limit: request.paymaster_post_op_gas_limit.map(|x| x.to()),
            paymaster_data: request.paymaster_data.clone(),
            signature: request.signature.clone(),
            eip7702_auth: request.eip7702_auth.clone(),
        }
    }
}

/// Sparse caller-supplied overrides. A populated field is authoritative:
/// the owning middleware stage must pass it through untouched and skip the
/// estimation it replaces.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct UserOperationOverrides {
    /// Overrides `call_gas_limit`.
    pub call_gas_limit: Option<u128>,
    /// Overrides `verification_gas_limit`.
    pub verification_gas_limit: Option<u128>,
    /// Overrides `pre_verification_gas`.
    pub pre_verification_gas: Option<u128>,
    /// Overrides `max_fee_per_gas`.
    pub max_fee_per_gas: Option<u128>,
    /// Overrides `max_priority_fee_per_gas`.
    pub max_priority_fee_per_gas: Option<u128>,
    /// Overrides `paymaster_verification_gas_limit` (v0.7).
    pub paymaster_verification_gas_limit: Option<u128>,
    /// Bypasses the paymaster middleware entirely with a fixed blob
    /// (v0.6); `0x` opts out of sponsorship for this operation.
    pub paymaster_and_data: Option<Bytes>,
}

/// Result of `eth_estimateUserOperationGas`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasEstimate {
    /// Bundler compensation gas.
    pub pre_verification_gas: U128,
    /// Verification phase gas.
    pub verification_gas_limit: U128,
    /// Execution phase gas.
    pub call_gas_limit: U128,
    /// Paymaster verification gas (v0.7 only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paymaster_verification_gas_limit: Option<U128>,
}

/// Result of `eth_getUserOperationReceipt`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOperationReceipt {
    /// Hash of the included user operation.
    pub user_op_hash: B256,
    /// Entry point the operation went through.
    pub entry_point: Address,
    /// Account the operation executed from.
    pub sender: Address,
    /// Nonce the operation consumed.
    pub nonce: U256,
    /// Sponsoring paymaster, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paymaster: Option<Address>,
    /// Gas actually paid, in wei.
    pub actual_gas_cost: U256,
    /// Gas actually used across all phases.
    pub actual_gas_used: U256,
    /// Whether execution completed without reverting.
    pub success: bool,
    /// Revert reason when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Bundler-specific transaction receipt passthrough.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<serde_json::Value>,
    /// Bundler-specific log passthrough.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logs: Option<serde_json::Value>,
}

/// Outcome of submitting a user operation: the bundler-assigned hash and
/// the exact request that was sent, for resubmission or replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendUserOperationResult {
    /// User operation hash to poll receipts with.
    pub hash: B256,
    /// The request as sent over the wire.
    pub request: UserOperationRequest,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn populated_struct() -> UserOperationStruct {
        UserOperationStruct {
            sender: Address::repeat_byte(0x11),
            nonce: U256::from(7),
            call_data: Bytes::from_static(&[0xab, 0xcd]),
            call_gas_limit: Some(100_000),
            verification_gas_limit: Some(200_000),
            pre_verification_gas: Some(21_000),
            max_fee_per_gas: Some(1_000_000_000),
            max_priority_fee_per_gas: Some(100_000_000),
            signature: Bytes::from_static(&[0x01]),
            ..Default::default()
        }
    }

    #[test]
    fn test_validity_gate() {
        let mut uo = populated_struct();
        assert!(uo.is_valid_request());

        uo.call_gas_limit = Some(0);
        assert!(!uo.is_valid_request());

        uo.call_gas_limit = Some(1);
        uo.max_priority_fee_per_gas = None;
        assert!(!uo.is_valid_request());
    }

    #[test]
    fn test_v0_6_request_always_carries_legacy_fields() {
        let uo = populated_struct();
        let request = uo.to_request(EntryPointVersion::V0_6);
        assert_eq!(request.init_code, Some(Bytes::new()));
        assert_eq!(request.paymaster_and_data, Some(Bytes::new()));
        assert!(request.factory.is_none());

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["initCode"], "0x");
        assert_eq!(json["paymasterAndData"], "0x");
        assert!(json.get("paymaster").is_none());
    }

    #[test]
    fn test_v0_7_request_omits_absent_fields() {
        let uo = populated_struct();
        let json = serde_json::to_value(uo.to_request(EntryPointVersion::V0_7)).unwrap();
        assert!(json.get("initCode").is_none());
        assert!(json.get("paymasterAndData").is_none());
        assert!(json.get("factory").is_none());
        assert_eq!(json["maxFeePerGas"], "0x3b9aca00");
    }

    #[test]
    fn test_request_round_trips_to_struct() {
        let uo = populated_struct();
        let request = uo.to_request(EntryPointVersion::V0_7);
        let rebuilt = UserOperationStruct::from(&request);
        assert_eq!(rebuilt.sender, uo.sender);
        assert_eq!(rebuilt.nonce, uo.nonce);
        assert_eq!(rebuilt.call_gas_limit, uo.call_gas_limit);
        assert_eq!(rebuilt.max_fee_per_gas, uo.max_fee_per_gas);
        assert_eq!(rebuilt.signature, uo.signature);
    }
}
