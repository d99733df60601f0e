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

mod error;
pub use error::{ProviderError, ProviderResult};

mod evm;
pub use evm::EvmProvider;

mod bundler;
pub use bundler::BundlerProvider;

mod paymaster;
pub use paymaster::PaymasterProvider;

#[cfg(feature = "test-utils")]
pub(crate) mod test_utils;

/// Umbrella trait for an endpoint that serves node, bundler, and paymaster
/// RPC namespaces through a single connection.
pub trait SmartAccountClient: EvmProvider + BundlerProvider + PaymasterProvider {}

impl<T> SmartAccountClient for T where T: EvmProvider + BundlerProvider + PaymasterProvider {}
