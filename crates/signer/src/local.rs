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

use alloy_eips::eip7702::Authorization;
use alloy_primitives::{Address, Bytes, B256, U256, U64, U8};
use alloy_signer::Signer as _;
use alloy_signer_local::PrivateKeySigner;
use userop_types::authorization::Eip7702Auth;

use crate::{SignerError, SmartAccountSigner};

/// A [`SmartAccountSigner`] backed by an in-memory secp256k1 key.
#[derive(Debug, Clone)]
pub struct LocalAccountSigner {
    signer: PrivateKeySigner,
}

impl LocalAccountSigner {
    /// Wraps an existing local signer.
    pub fn new(signer: PrivateKeySigner) -> Self {
        Self { signer }
    }

    /// Parses a hex-encoded private key, with or without a `0x` prefix.
    pub fn from_hex_key(private_key: &str) -> Result<Self, SignerError> {
        let signer = private_key
            .trim_start_matches("0x")
            .parse::<PrivateKeySigner>()?;
        Ok(Self { signer })
    }

    /// Generates a fresh random key.
    pub fn random() -> Self {
        Self {
            signer: PrivateKeySigner::random(),
        }
    }
}

#[async_trait::async_trait]
impl SmartAccountSigner for LocalAccountSigner {
    fn address(&self) -> Address {
        self.signer.address()
    }

    async fn sign_message(&self, message: &[u8]) -> Result<Bytes, SignerError> {
        let signature = self.signer.sign_message(message).await?;
        Ok(signature.as_bytes().into())
    }

    async fn sign_hash(&self, hash: B256) -> Result<Bytes, SignerError> {
        let signature = self.signer.sign_hash(&hash).await?;
        Ok(signature.as_bytes().into())
    }

    async fn sign_authorization(
        &self,
        chain_id: u64,
        delegate: Address,
        nonce: u64,
    ) -> Result<Eip7702Auth, SignerError> {
        let authorization = Authorization {
            chain_id: U256::from(chain_id),
            address: delegate,
            nonce,
        };
        let signature = self.signer.sign_hash(&authorization.signature_hash()).await?;

        Ok(Eip7702Auth {
            chain_id: U64::from(chain_id),
            address: delegate,
            nonce: U64::from(nonce),
            y_parity: U8::from(signature.v().y_parity_byte()),
            r: signature.r(),
            s: signature.s(),
        })
    }
}
