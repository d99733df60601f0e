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

use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use alloy_sol_types::SolValue;
use userop_contracts::v0_7::PackedUserOperation;

use super::UserOperationStruct;

/// Computes the v0.7 user operation hash over the packed form, bound to
/// the entry point address and chain id with a second keccak.
pub fn hash_user_operation(
    uo: &UserOperationStruct,
    entry_point: Address,
    chain_id: u64,
) -> B256 {
    let packed = pack_user_operation(uo);
    let packed_hash = keccak256(
        (
            packed.sender,
            packed.nonce,
            keccak256(&packed.initCode),
            keccak256(&packed.callData),
            packed.accountGasLimits,
            packed.preVerificationGas,
            packed.gasFees,
            keccak256(&packed.paymasterAndData),
        )
            .abi_encode(),
    );
    keccak256((packed_hash, entry_point, U256::from(chain_id)).abi_encode())
}

/// Packs into the on-chain `PackedUserOperation` layout: gas limits and
/// fees paired into single words, factory and paymaster fields
/// concatenated into blobs.
pub fn pack_user_operation(uo: &UserOperationStruct) -> PackedUserOperation {
    let init_code = match uo.factory {
        Some(factory) => {
            let mut buf = factory.to_vec();
            if let Some(data) = &uo.factory_data {
                buf.extend_from_slice(data);
            }
            Bytes::from(buf)
        }
        None => Bytes::new(),
    };

    let paymaster_and_data = match uo.paymaster {
        Some(paymaster) => pack_paymaster_data(
            paymaster,
            uo.paymaster_verification_gas_limit.unwrap_or_default(),
            uo.paymaster_post_op_gas_limit.unwrap_or_default(),
            uo.paymaster_data.as_ref(),
        ),
        None => Bytes::new(),
    };

    PackedUserOperation {
        sender: uo.sender,
        nonce: uo.nonce,
        initCode: init_code,
        callData: uo.call_data.clone(),
        accountGasLimits: pack_gas_pair(
            uo.verification_gas_limit.unwrap_or_default(),
            uo.call_gas_limit.unwrap_or_default(),
        ),
        preVerificationGas: U256::from(uo.pre_verification_gas.unwrap_or_default()),
        gasFees: pack_gas_pair(
            uo.max_priority_fee_per_gas.unwrap_or_default(),
            uo.max_fee_per_gas.unwrap_or_default(),
        ),
        paymasterAndData: paymaster_and_data,
        signature: uo.signature.clone(),
    }
}

/// Packs two u128 gas values into one word, `high` in the upper 16 bytes.
pub fn pack_gas_pair(high: u128, low: u128) -> B256 {
    let mut packed = [0_u8; 32];
    packed[..16].copy_from_slice(&high.to_be_bytes());
    packed[16..].copy_from_slice(&low.to_be_bytes());
    B256::from(packed)
}

/// Concatenates the paymaster blob: address, two 16-byte gas limits, then
/// the paymaster-specific data.
pub fn pack_paymaster_data(
    paymaster: Address,
    verification_gas_limit: u128,
    post_op_gas_limit: u128,
    data: Option<&Bytes>,
) -> Bytes {
    let mut buf = paymaster.to_vec();
    buf.extend_from_slice(&verification_gas_limit.to_be_bytes());
    buf.extend_from_slice(&post_op_gas_limit.to_be_bytes());
    if let Some(data) = data {
        buf.extend_from_slice(data);
    }
    Bytes::from(buf)
}
