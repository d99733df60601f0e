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

use alloy_primitives::B256;
use userop_account::AccountError;
use userop_provider::ProviderError;

/// Errors produced while building, signing, or sending user operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// RPC transport or node error.
    #[error(transparent)]
    Provider(#[from] ProviderError),
    /// Account-level failure (address resolution, signing, ABI decode).
    #[error(transparent)]
    Account(#[from] AccountError),
    /// The provider has no account connected.
    #[error("no account connected to provider")]
    AccountNotConnected,
    /// The middleware stack left required fields unset or zero.
    #[error("user operation has missing or zero fields: {0}")]
    InvalidRequest(String),
    /// The connected account cannot sign EIP-7702 authorizations.
    #[error("account does not support EIP-7702 delegation")]
    Eip7702NotSupported,
    /// A sponsorship response omitted a field the entry point version
    /// requires.
    #[error("paymaster response missing field: {0}")]
    MissingPaymasterField(&'static str),
    /// The operation was not mined within the polling budget.
    #[error("user operation {hash} not mined after {attempts} attempts")]
    ReceiptTimeout {
        /// Hash of the pending user operation.
        hash: B256,
        /// Number of receipt polls made.
        attempts: u32,
    },
}
