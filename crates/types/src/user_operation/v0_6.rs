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

use alloy_primitives::{keccak256, Address, B256, U256};
use alloy_sol_types::SolValue;

use super::UserOperationStruct;

/// Computes the v0.6 user operation hash: the packed operation hash bound
/// to the entry point address and chain id with a second keccak.
pub fn hash_user_operation(
    uo: &UserOperationStruct,
    entry_point: Address,
    chain_id: u64,
) -> B256 {
    keccak256(
        (
            keccak256(pack_for_hash(uo)),
            entry_point,
            U256::from(chain_id),
        )
            .abi_encode(),
    )
}

/// ABI-encodes the hashable fields of a v0.6 operation. Dynamic byte
/// fields enter as their keccak hashes; the signature is excluded.
fn pack_for_hash(uo: &UserOperationStruct) -> Vec<u8> {
    let init_code_hash = keccak256(uo.init_code.clone().unwrap_or_default());
    let call_data_hash = keccak256(&uo.call_data);
    let paymaster_and_data_hash = keccak256(uo.paymaster_and_data.clone().unwrap_or_default());

    (
        uo.sender,
        uo.nonce,
        init_code_hash,
        call_data_hash,
        U256::from(uo.call_gas_limit.unwrap_or_default()),
        U256::from(uo.verification_gas_limit.unwrap_or_default()),
        U256::from(uo.pre_verification_gas.unwrap_or_default()),
        U256::from(uo.max_fee_per_gas.unwrap_or_default()),
        U256::from(uo.max_priority_fee_per_gas.unwrap_or_default()),
        paymaster_and_data_hash,
    )
        .abi_encode()
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{address, b256, bytes, Bytes};

    use super::*;

    // Known-good vector from an operation mined on Polygon Mumbai through
    // the canonical v0.6 entry point.
    #[test]
    fn test_hash_known_vector() {
        let uo = UserOperationStruct {
            sender: address!("b856DBD4fA1A79a46D426f537455e7d3E79ab7c4"),
            nonce: U256::from(0x1f),
            init_code: Some(Bytes::new()),
            call_data: bytes!(
                "b61d27f6000000000000000000000000b856dbd4fa1a79a46d426f537455e7d3e79ab7c4000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000600000000000000000000000000000000000000000000000000000000000000000"
            ),
            call_gas_limit: Some(0x2f6c),
            verification_gas_limit: Some(0x0114c2),
            pre_verification_gas: Some(0xa890),
            max_fee_per_gas: Some(0x59682f1e),
            max_priority_fee_per_gas: Some(0x59682f00),
            paymaster_and_data: Some(Bytes::new()),
            signature: bytes!(
                "d16f93b584fbfdc03a5ee85914a1f29aa35c44fea5144c387ee1040a3c1678252bf323b7e9c3e9b4dfd91cca841fc522f4d3160a1e803f2bf14eb5fa037aae4a1b"
            ),
            ..Default::default()
        };

        let entry_point = address!("5FF137D4b0FDCD49DcA30c7CF57E578a026d2789");
        let hash = hash_user_operation(&uo, entry_point, 80001);
        assert_eq!(
            hash,
            b256!("a70d0af2ebb03a44dcd0714a8724f622e3ab876d0aa312f0ee04823285d6fb1b")
        );
    }

    #[test]
    fn test_hash_binds_entry_point_and_chain() {
        let uo = UserOperationStruct {
            sender: Address::repeat_byte(0x22),
            nonce: U256::from(1),
            call_data: bytes!("deadbeef"),
            call_gas_limit: Some(100_000),
            verification_gas_limit: Some(150_000),
            pre_verification_gas: Some(21_000),
            max_fee_per_gas: Some(2_000_000_000),
            max_priority_fee_per_gas: Some(1_000_000_000),
            ..Default::default()
        };
        let ep = address!("5FF137D4b0FDCD49DcA30c7CF57E578a026d2789");

        let base = hash_user_operation(&uo, ep, 1);
        assert_ne!(base, hash_user_operation(&uo, ep, 137));
        assert_ne!(base, hash_user_operation(&uo, Address::repeat_byte(0x01), 1));
    }
}
