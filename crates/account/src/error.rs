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

use userop_provider::ProviderError;
use userop_signer::SignerError;

/// Error enumeration for account operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// RPC failure
    #[error(transparent)]
    Provider(#[from] ProviderError),
    /// Owner signer failure
    #[error(transparent)]
    Signer(#[from] SignerError),
    /// ABI decoding of a contract response failed
    #[error("abi decoding failed: {0}")]
    AbiDecode(#[from] alloy_sol_types::Error),
    /// Counterfactual address resolution through the entry point failed
    #[error("counterfactual address resolution failed: {0}")]
    CounterfactualAddress(String),
    /// A supplied signer does not match the account's delegated EOA
    #[error("signer address does not match the delegated account address")]
    SignerMismatch,
    /// The account type does not support the requested operation
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(&'static str),
}
