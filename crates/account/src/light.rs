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

use std::sync::Arc;

use alloy_primitives::{Address, Bytes, B256, U256};
use userop_provider::SmartAccountClient;
use userop_signer::SmartAccountSigner;
use userop_types::{
    authorization::Eip7702Auth,
    chain::ChainSpec,
    user_operation::{EntryPoint, UserOperationCall},
};

use crate::{simple::SimpleAccount, traits::AccountMode, AccountError, SmartAccount};

/// Alchemy's LightAccount: the SimpleAccount surface behind a different
/// factory, without sub-account salts.
pub struct LightAccount<S>(SimpleAccount<S>);

impl<S: SmartAccountSigner> LightAccount<S> {
    /// Creates a light account for `signer` using the canonical light
    /// account factory.
    pub fn new(client: Arc<dyn SmartAccountClient>, signer: S, chain: &ChainSpec) -> Self {
        let factory = chain.light_account_factory;
        Self(SimpleAccount::with_factory(client, signer, chain, factory))
    }
}

#[async_trait::async_trait]
impl<S: SmartAccountSigner> SmartAccount for LightAccount<S> {
    fn entry_point(&self) -> &EntryPoint {
        self.0.entry_point()
    }

    fn mode(&self) -> AccountMode {
        AccountMode::Default
    }

    fn owner(&self) -> Address {
        self.0.owner()
    }

    fn factory_address(&self) -> Option<Address> {
        self.0.factory_address()
    }

    fn implementation_address(&self) -> Option<Address> {
        None
    }

    fn dummy_signature(&self) -> Bytes {
        self.0.dummy_signature()
    }

    fn encode_execute(&self, call: &UserOperationCall) -> Bytes {
        self.0.encode_execute(call)
    }

    fn encode_batch_execute(&self, calls: &[UserOperationCall]) -> Bytes {
        self.0.encode_batch_execute(calls)
    }

    async fn address(&self) -> Result<Address, AccountError> {
        self.0.address().await
    }

    async fn init_code(&self) -> Result<Bytes, AccountError> {
        self.0.init_code().await
    }

    async fn factory_data(&self) -> Result<Option<Bytes>, AccountError> {
        self.0.factory_data().await
    }

    async fn nonce(&self) -> Result<U256, AccountError> {
        self.0.nonce().await
    }

    async fn is_deployed(&self) -> Result<bool, AccountError> {
        self.0.is_deployed().await
    }

    async fn sign_user_operation_hash(&self, hash: B256) -> Result<Bytes, AccountError> {
        self.0.sign_user_operation_hash(hash).await
    }

    async fn sign_message(&self, message: &[u8]) -> Result<Bytes, AccountError> {
        self.0.sign_message(message).await
    }

    async fn sign_authorization(&self, eoa_nonce: u64) -> Result<Eip7702Auth, AccountError> {
        self.0.sign_authorization(eoa_nonce).await
    }
}
