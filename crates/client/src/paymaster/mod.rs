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

//! Sponsorship extensions. Each installs itself by swapping pipeline
//! stages on a [`crate::SmartAccountProvider`].

mod erc7677;
pub use erc7677::{Erc7677PaymasterData, Erc7677StubData};

mod alchemy;
pub use alchemy::{
    AlchemyGasAndPaymasterData, AlchemyGasManagerConfig, AlchemyPaymasterData,
};

mod coinbase;
pub use coinbase::CoinbaseSponsorship;
