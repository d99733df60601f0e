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

use alloy_primitives::Bytes;
use alloy_transport::TransportError;

/// Error enumeration for the provider traits.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// RPC transport error, including JSON-RPC error responses
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// Internal errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ProviderError {
    /// Revert payload carried by a JSON-RPC error response, if this error
    /// is one. Callers that expect a revert decode its ABI error from this.
    pub fn revert_data(&self) -> Option<Bytes> {
        match self {
            Self::Transport(err) => err.as_error_resp().and_then(|resp| resp.as_revert_data()),
            Self::Other(_) => None,
        }
    }
}

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;
