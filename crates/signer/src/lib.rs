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

//! Signer abstraction for smart account owners.
//!
//! A [`SmartAccountSigner`] produces the owner signatures accounts embed in
//! user operations, plus EIP-7702 authorization tuples for delegated EOAs.

#![warn(missing_docs, unreachable_pub)]
#![deny(unused_must_use, rust_2018_idioms)]

use alloy_primitives::{Address, Bytes, B256};
#[cfg(feature = "test-utils")]
use mockall::automock;
use userop_types::authorization::Eip7702Auth;

mod local;
pub use local::LocalAccountSigner;

/// Error produced by signer operations.
#[derive(Debug, thiserror::Error)]
pub enum SignerError {
    /// The underlying ECDSA signer failed.
    #[error("ecdsa signing failed: {0}")]
    Ecdsa(#[from] alloy_signer::Error),
    /// The supplied private key could not be parsed.
    #[error("invalid signing key: {0}")]
    InvalidKey(#[from] alloy_signer_local::LocalSignerError),
}

/// An owner key that can sign on behalf of a smart account.
///
/// `sign_message` applies EIP-191 personal-message hashing; `sign_hash`
/// signs a 32-byte digest directly. Both return the 65-byte `r || s || v`
/// form accounts expect, with `v` in `{27, 28}`.
#[cfg_attr(feature = "test-utils", automock)]
#[async_trait::async_trait]
pub trait SmartAccountSigner: Send + Sync {
    /// Address of the signing key.
    fn address(&self) -> Address;

    /// Signs a message with the EIP-191 prefix.
    async fn sign_message(&self, message: &[u8]) -> Result<Bytes, SignerError>;

    /// Signs a raw 32-byte digest.
    async fn sign_hash(&self, hash: B256) -> Result<Bytes, SignerError>;

    /// Signs an EIP-7702 authorization designating `delegate` as this
    /// EOA's implementation at the given account `nonce`.
    async fn sign_authorization(
        &self,
        chain_id: u64,
        delegate: Address,
        nonce: u64,
    ) -> Result<Eip7702Auth, SignerError>;
}
