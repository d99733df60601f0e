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

use alloy_primitives::{aliases::U192, Address, Bytes, B256, U256};
use alloy_sol_types::SolCall;
use userop_contracts::{execution::IStandardExecutor, factory::ISimpleAccountFactory};
use userop_provider::SmartAccountClient;
use userop_signer::SmartAccountSigner;
use userop_types::{
    authorization::Eip7702Auth,
    chain::ChainSpec,
    user_operation::{EntryPoint, EntryPointVersion, UserOperationCall},
};

use crate::{
    base::AccountCore,
    traits::{ecdsa_dummy_signature, AccountMode},
    AccountError, SmartAccount,
};

/// The eth-infinitism `SimpleAccount` reference implementation, targeting
/// entry point v0.6.
pub struct SimpleAccount<S> {
    core: AccountCore,
    signer: S,
    factory_address: Address,
}

impl<S: SmartAccountSigner> SimpleAccount<S> {
    /// Creates a simple account for `signer` on the given chain, using the
    /// chain's default factory.
    pub fn new(client: Arc<dyn SmartAccountClient>, signer: S, chain: &ChainSpec) -> Self {
        Self::with_factory(client, signer, chain, chain.simple_account_factory)
    }

    /// Creates a simple account deployed through a specific factory.
    pub fn with_factory(
        client: Arc<dyn SmartAccountClient>,
        signer: S,
        chain: &ChainSpec,
        factory_address: Address,
    ) -> Self {
        let entry_point = EntryPoint::of_chain(chain, EntryPointVersion::V0_6);
        Self {
            core: AccountCore::new(client, entry_point),
            signer,
            factory_address,
        }
    }

    /// Pins a known account address, skipping counterfactual resolution.
    pub fn with_account_address(self, address: Address) -> Self {
        let Self {
            core,
            signer,
            factory_address,
        } = self;
        Self {
            core: core.with_address(Some(address)),
            signer,
            factory_address,
        }
    }

    fn account_init_code(&self) -> Bytes {
        let call = ISimpleAccountFactory::createAccountCall {
            owner: self.signer.address(),
            salt: U256::ZERO,
        };
        let mut blob = self.factory_address.to_vec();
        blob.extend_from_slice(&call.abi_encode());
        Bytes::from(blob)
    }
}

#[async_trait::async_trait]
impl<S: SmartAccountSigner> SmartAccount for SimpleAccount<S> {
    fn entry_point(&self) -> &EntryPoint {
        self.core.entry_point()
    }

    fn mode(&self) -> AccountMode {
        AccountMode::Default
    }

    fn owner(&self) -> Address {
        self.signer.address()
    }

    fn factory_address(&self) -> Option<Address> {
        Some(self.factory_address)
    }

    fn implementation_address(&self) -> Option<Address> {
        None
    }

    fn dummy_signature(&self) -> Bytes {
        ecdsa_dummy_signature()
    }

    fn encode_execute(&self, call: &UserOperationCall) -> Bytes {
        IStandardExecutor::executeCall {
            dest: call.target,
            value: call.value,
            func: call.data.clone(),
        }
        .abi_encode()
        .into()
    }

    fn encode_batch_execute(&self, calls: &[UserOperationCall]) -> Bytes {
        IStandardExecutor::executeBatchCall {
            dest: calls.iter().map(|c| c.target).collect(),
            func: calls.iter().map(|c| c.data.clone()).collect(),
        }
        .abi_encode()
        .into()
    }

    async fn address(&self) -> Result<Address, AccountError> {
        self.core.resolve_address(&self.account_init_code()).await
    }

    async fn init_code(&self) -> Result<Bytes, AccountError> {
        let address = self.address().await?;
        self.core.init_code(address, self.account_init_code()).await
    }

    async fn factory_data(&self) -> Result<Option<Bytes>, AccountError> {
        Ok(None)
    }

    async fn nonce(&self) -> Result<U256, AccountError> {
        let address = self.address().await?;
        self.core.nonce(address, U192::ZERO).await
    }

    async fn is_deployed(&self) -> Result<bool, AccountError> {
        let address = self.address().await?;
        self.core.is_deployed(address).await
    }

    async fn sign_user_operation_hash(&self, hash: B256) -> Result<Bytes, AccountError> {
        Ok(self.signer.sign_message(hash.as_slice()).await?)
    }

    async fn sign_message(&self, message: &[u8]) -> Result<Bytes, AccountError> {
        Ok(self.signer.sign_message(message).await?)
    }

    async fn sign_authorization(&self, _eoa_nonce: u64) -> Result<Eip7702Auth, AccountError> {
        Err(AccountError::UnsupportedOperation(
            "simple accounts do not delegate via EIP-7702",
        ))
    }
}
