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

//! 7702 authorization tuple support.

use alloy_primitives::{Address, U256, U64, U8};
use serde::{Deserialize, Serialize};

/// Signed authorization tuple attached to a user operation when the sender
/// is an EIP-7702 delegated EOA. Numeric fields serialize as hex
/// quantities, matching the bundler wire format.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Eip7702Auth {
    /// The chain ID of the authorization.
    pub chain_id: U64,
    /// The delegate implementation address.
    pub address: Address,
    /// The EOA nonce the authorization is valid for.
    pub nonce: U64,
    /// Signature yParity (0 or 1).
    pub y_parity: U8,
    /// Signature r component.
    pub r: U256,
    /// Signature s component.
    pub s: U256,
}

impl Eip7702Auth {
    /// A zeroed tuple for the given delegate, usable as a gas estimation
    /// placeholder.
    pub fn placeholder(address: Address) -> Self {
        Self {
            address,
            ..Default::default()
        }
    }
}
