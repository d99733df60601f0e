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

use alloy_primitives::{address, Address};
use serde::Deserialize;

/// Native currency metadata for a chain.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Currency {
    /// Display name, e.g. "Ether".
    pub name: &'static str,
    /// Ticker symbol, e.g. "ETH".
    pub symbol: &'static str,
    /// Number of decimals of the smallest unit.
    pub decimals: u8,
}

impl Currency {
    /// Ether with 18 decimals.
    pub const ETHER: Currency = Currency {
        name: "Ether",
        symbol: "ETH",
        decimals: 18,
    };

    /// Polygon POL with 18 decimals.
    pub const POL: Currency = Currency {
        name: "POL",
        symbol: "POL",
        decimals: 18,
    };
}

/// Entry point v0.6 address, identical across supported chains.
pub const ENTRY_POINT_V0_6_ADDRESS: Address =
    address!("5FF137D4b0FDCD49DcA30c7CF57E578a026d2789");

/// Entry point v0.7 address, identical across supported chains.
pub const ENTRY_POINT_V0_7_ADDRESS: Address =
    address!("0000000071727De22E5E9d8BAf0edAc6f37da032");

/// Default SimpleAccount factory on most mainnets.
pub const SIMPLE_ACCOUNT_FACTORY_ADDRESS: Address =
    address!("15Ba39375ee2Ab563E8873C8390be6f2E2F50232");

/// Default SimpleAccount factory used on several testnets.
pub const SIMPLE_ACCOUNT_FACTORY_TESTNET_ADDRESS: Address =
    address!("9406Cc6185a346906296840746125a0E44976454");

/// Default LightAccount factory.
pub const LIGHT_ACCOUNT_FACTORY_ADDRESS: Address =
    address!("000000893A26168158fbeaDD9335Be5bC96592E2");

/// ModularAccountV2 factory for ERC-4337 mode.
pub const MODULAR_ACCOUNT_V2_FACTORY_ADDRESS: Address =
    address!("00000000000017c61b5bEe81050EC8eFc9c6fecd");

/// ModularAccountV2 implementation contract for EIP-7702 delegation.
pub const MODULAR_ACCOUNT_V2_IMPLEMENTATION_ADDRESS: Address =
    address!("69007702764179f14F51cdce752f4f775d74E139");

/// Chain identity and the protocol defaults keyed off of it.
///
/// Unknown chains can be described by building one of these by hand; the
/// constructors below cover the chains with deployed defaults.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainSpec {
    /// Numeric chain id.
    pub id: u64,
    /// Human readable chain name.
    pub name: &'static str,
    /// Native currency.
    pub currency: Currency,
    /// Entry point v0.6 contract address.
    pub entry_point_v0_6: Address,
    /// Entry point v0.7 contract address.
    pub entry_point_v0_7: Address,
    /// Default SimpleAccount factory.
    pub simple_account_factory: Address,
    /// Default LightAccount factory.
    pub light_account_factory: Address,
    /// Default ModularAccountV2 factory.
    pub modular_account_v2_factory: Address,
    /// ModularAccountV2 implementation address for EIP-7702 delegation.
    pub modular_account_v2_implementation: Address,
    /// Floor applied to the node-reported max priority fee. Raised on
    /// rollups where the reported value underprices inclusion.
    pub min_priority_fee_per_gas: u128,
    /// Percent buffer applied on top of the pending base fee when
    /// computing `maxFeePerGas`.
    pub base_fee_buffer_percent: u32,
    /// Percent buffer applied on top of the node-reported priority fee.
    pub priority_fee_buffer_percent: u32,
}

impl Default for ChainSpec {
    fn default() -> Self {
        Self {
            id: 0,
            name: "unknown",
            currency: Currency::ETHER,
            entry_point_v0_6: ENTRY_POINT_V0_6_ADDRESS,
            entry_point_v0_7: ENTRY_POINT_V0_7_ADDRESS,
            simple_account_factory: SIMPLE_ACCOUNT_FACTORY_ADDRESS,
            light_account_factory: LIGHT_ACCOUNT_FACTORY_ADDRESS,
            modular_account_v2_factory: MODULAR_ACCOUNT_V2_FACTORY_ADDRESS,
            modular_account_v2_implementation: MODULAR_ACCOUNT_V2_IMPLEMENTATION_ADDRESS,
            min_priority_fee_per_gas: 0,
            base_fee_buffer_percent: 50,
            priority_fee_buffer_percent: 5,
        }
    }
}

impl ChainSpec {
    /// Ethereum mainnet.
    pub fn mainnet() -> Self {
        Self {
            id: 1,
            name: "Ethereum",
            ..Default::default()
        }
    }

    /// Sepolia testnet.
    pub fn sepolia() -> Self {
        Self {
            id: 11_155_111,
            name: "Sepolia",
            simple_account_factory: SIMPLE_ACCOUNT_FACTORY_TESTNET_ADDRESS,
            ..Default::default()
        }
    }

    /// Polygon PoS.
    pub fn polygon() -> Self {
        Self {
            id: 137,
            name: "Polygon",
            currency: Currency::POL,
            // Polygon's fee auction underreports; keep a 30 gwei floor.
            min_priority_fee_per_gas: 30_000_000_000,
            ..Default::default()
        }
    }

    /// OP Mainnet.
    pub fn optimism() -> Self {
        Self {
            id: 10,
            name: "OP Mainnet",
            min_priority_fee_per_gas: 100_000,
            ..Default::default()
        }
    }

    /// Arbitrum One.
    pub fn arbitrum() -> Self {
        Self {
            id: 42_161,
            name: "Arbitrum One",
            ..Default::default()
        }
    }

    /// Base.
    pub fn base() -> Self {
        Self {
            id: 8453,
            name: "Base",
            min_priority_fee_per_gas: 100_000,
            ..Default::default()
        }
    }

    /// Base Sepolia testnet.
    pub fn base_sepolia() -> Self {
        Self {
            id: 84_532,
            name: "Base Sepolia",
            min_priority_fee_per_gas: 100_000,
            ..Default::default()
        }
    }

    /// Looks up a known chain by id.
    pub fn from_id(id: u64) -> Option<Self> {
        match id {
            1 => Some(Self::mainnet()),
            10 => Some(Self::optimism()),
            137 => Some(Self::polygon()),
            8453 => Some(Self::base()),
            42_161 => Some(Self::arbitrum()),
            84_532 => Some(Self::base_sepolia()),
            11_155_111 => Some(Self::sepolia()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_id_known_chain() {
        let spec = ChainSpec::from_id(8453).unwrap();
        assert_eq!(spec.name, "Base");
        assert_eq!(spec.entry_point_v0_6, ENTRY_POINT_V0_6_ADDRESS);
        assert_eq!(spec.min_priority_fee_per_gas, 100_000);
    }

    #[test]
    fn test_from_id_unknown_chain() {
        assert!(ChainSpec::from_id(123_456).is_none());
    }
}
