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
use userop_contracts::{
    execution::{Call, IModularExecutor, IStandardExecutor},
    factory::ISemiModularAccountFactory,
};
use userop_provider::SmartAccountClient;
use userop_signer::SmartAccountSigner;
use userop_types::{
    authorization::Eip7702Auth,
    chain::ChainSpec,
    user_operation::{EntryPoint, EntryPointVersion, UserOperationCall},
};

use crate::{
    base::{factory_data_from_init_code, AccountCore},
    traits::{ecdsa_dummy_signature, AccountMode},
    AccountError, SmartAccount,
};

/// Signature prefix selecting the raw-ECDSA validation path for the owner
/// entity.
const RAW_SIGNATURE_PREFIX: [u8; 2] = [0xff, 0x00];

const OWNER_ENTITY_ID: u32 = 0;

/// Alchemy's ModularAccountV2 on entry point v0.7, usable either as a
/// factory-deployed semi-modular account or as an EIP-7702 delegated EOA.
pub struct ModularAccountV2<S> {
    core: AccountCore,
    signer: S,
    mode: AccountMode,
    factory_address: Address,
    implementation_address: Address,
    chain_id: u64,
}

impl<S: SmartAccountSigner> ModularAccountV2<S> {
    /// Creates a factory-deployed modular account for `signer`.
    pub fn new(client: Arc<dyn SmartAccountClient>, signer: S, chain: &ChainSpec) -> Self {
        Self::with_mode(client, signer, chain, AccountMode::Default)
    }

    /// Creates a modular account backed by the signer's own EOA through
    /// EIP-7702 delegation. The account address is the EOA address and no
    /// factory is involved.
    pub fn new_7702(client: Arc<dyn SmartAccountClient>, signer: S, chain: &ChainSpec) -> Self {
        Self::with_mode(client, signer, chain, AccountMode::Eip7702)
    }

    fn with_mode(
        client: Arc<dyn SmartAccountClient>,
        signer: S,
        chain: &ChainSpec,
        mode: AccountMode,
    ) -> Self {
        let entry_point = EntryPoint::of_chain(chain, EntryPointVersion::V0_7);
        Self {
            core: AccountCore::new(client, entry_point),
            signer,
            mode,
            factory_address: chain.modular_account_v2_factory,
            implementation_address: chain.modular_account_v2_implementation,
            chain_id: chain.id,
        }
    }

    /// Pins the account address instead of resolving it. In EIP-7702 mode
    /// the pinned address must be the signer's EOA.
    pub fn with_account_address(self, address: Address) -> Result<Self, AccountError> {
        if self.mode == AccountMode::Eip7702 && address != self.signer.address() {
            return Err(AccountError::SignerMismatch);
        }
        let Self {
            core,
            signer,
            mode,
            factory_address,
            implementation_address,
            chain_id,
        } = self;
        Ok(Self {
            core: core.with_address(Some(address)),
            signer,
            mode,
            factory_address,
            implementation_address,
            chain_id,
        })
    }

    fn account_init_code(&self) -> Bytes {
        match self.mode {
            AccountMode::Eip7702 => Bytes::new(),
            AccountMode::Default => {
                let call = ISemiModularAccountFactory::createSemiModularAccountCall {
                    owner: self.signer.address(),
                    salt: U256::ZERO,
                };
                let mut blob = self.factory_address.to_vec();
                blob.extend_from_slice(&call.abi_encode());
                Bytes::from(blob)
            }
        }
    }

    fn pack_signature(&self, signature: Bytes) -> Bytes {
        let mut packed = RAW_SIGNATURE_PREFIX.to_vec();
        packed.extend_from_slice(&signature);
        Bytes::from(packed)
    }
}

#[async_trait::async_trait]
impl<S: SmartAccountSigner> SmartAccount for ModularAccountV2<S> {
    fn entry_point(&self) -> &EntryPoint {
        self.core.entry_point()
    }

    fn mode(&self) -> AccountMode {
        self.mode
    }

    fn owner(&self) -> Address {
        self.signer.address()
    }

    fn factory_address(&self) -> Option<Address> {
        match self.mode {
            AccountMode::Default => Some(self.factory_address),
            AccountMode::Eip7702 => None,
        }
    }

    fn implementation_address(&self) -> Option<Address> {
        Some(self.implementation_address)
    }

    fn dummy_signature(&self) -> Bytes {
        self.pack_signature(ecdsa_dummy_signature())
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
        IModularExecutor::executeBatchCall {
            calls: calls
                .iter()
                .map(|c| Call {
                    target: c.target,
                    value: c.value,
                    data: c.data.clone(),
                })
                .collect(),
        }
        .abi_encode()
        .into()
    }

    async fn address(&self) -> Result<Address, AccountError> {
        match self.mode {
            AccountMode::Eip7702 => Ok(self.signer.address()),
            AccountMode::Default => self.core.resolve_address(&self.account_init_code()).await,
        }
    }

    async fn init_code(&self) -> Result<Bytes, AccountError> {
        match self.mode {
            AccountMode::Eip7702 => Ok(Bytes::new()),
            AccountMode::Default => {
                let address = self.address().await?;
                self.core.init_code(address, self.account_init_code()).await
            }
        }
    }

    async fn factory_data(&self) -> Result<Option<Bytes>, AccountError> {
        let init_code = self.init_code().await?;
        Ok(factory_data_from_init_code(&init_code))
    }

    async fn nonce(&self) -> Result<U256, AccountError> {
        let address = self.address().await?;
        let key = build_full_nonce_key(0, OWNER_ENTITY_ID, true, false);
        self.core.nonce(address, key).await
    }

    async fn is_deployed(&self) -> Result<bool, AccountError> {
        let address = self.address().await?;
        self.core.is_deployed(address).await
    }

    async fn sign_user_operation_hash(&self, hash: B256) -> Result<Bytes, AccountError> {
        let signature = self.signer.sign_message(hash.as_slice()).await?;
        Ok(self.pack_signature(signature))
    }

    async fn sign_message(&self, message: &[u8]) -> Result<Bytes, AccountError> {
        let signature = self.signer.sign_message(message).await?;
        Ok(self.pack_signature(signature))
    }

    async fn sign_authorization(&self, eoa_nonce: u64) -> Result<Eip7702Auth, AccountError> {
        Ok(self
            .signer
            .sign_authorization(self.chain_id, self.implementation_address, eoa_nonce)
            .await?)
    }
}

/// Builds the composite entry point nonce key modular accounts use:
/// the caller key in the high bits, the validation entity id in bits
/// 8..40, the deferred-action flag at bit 1, and the global-validation
/// flag at bit 0.
pub fn build_full_nonce_key(
    nonce_key: u64,
    entity_id: u32,
    is_global_validation: bool,
    is_deferred_action: bool,
) -> U192 {
    (U192::from(nonce_key) << 40)
        | (U192::from(entity_id) << 8)
        | U192::from(if is_deferred_action { 2_u8 } else { 0 })
        | U192::from(if is_global_validation { 1_u8 } else { 0 })
}

#[cfg(test)]
mod tests {
    use userop_provider::MockSmartAccountClient;
    use userop_signer::LocalAccountSigner;

    use super::*;

    const DEV_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn account(mode: AccountMode) -> ModularAccountV2<LocalAccountSigner> {
        let signer = LocalAccountSigner::from_hex_key(DEV_KEY).unwrap();
        let chain = ChainSpec::sepolia();
        match mode {
            AccountMode::Default => {
                ModularAccountV2::new(Arc::new(MockSmartAccountClient::new()), signer, &chain)
            }
            AccountMode::Eip7702 => {
                ModularAccountV2::new_7702(Arc::new(MockSmartAccountClient::new()), signer, &chain)
            }
        }
    }

    #[test]
    fn test_full_nonce_key_layout() {
        let key = build_full_nonce_key(5, 2, true, false);
        assert_eq!(key, U192::from((5_u128 << 40) + (2 << 8) + 1));

        let deferred = build_full_nonce_key(0, 0, false, true);
        assert_eq!(deferred, U192::from(2_u8));
    }

    #[test]
    fn test_dummy_signature_carries_raw_prefix() {
        let dummy = account(AccountMode::Default).dummy_signature();
        assert_eq!(dummy.len(), 67);
        assert_eq!(&dummy[..2], &[0xff, 0x00]);
    }

    #[test]
    fn test_7702_rejects_foreign_account_address() {
        let account = account(AccountMode::Eip7702);
        let result = account.with_account_address(Address::repeat_byte(0x99));
        assert!(matches!(result, Err(AccountError::SignerMismatch)));
    }

    #[tokio::test]
    async fn test_7702_address_is_the_eoa() {
        let account = account(AccountMode::Eip7702);
        let address = account.address().await.unwrap();
        assert_eq!(address, account.owner());
        assert_eq!(account.init_code().await.unwrap(), Bytes::new());
        assert!(account.factory_address().is_none());
    }

    #[test]
    fn test_default_mode_init_code_uses_semi_modular_factory() {
        let account = account(AccountMode::Default);
        let init_code = account.account_init_code();
        assert_eq!(
            &init_code[..20],
            ChainSpec::sepolia().modular_account_v2_factory.as_slice()
        );
        // createSemiModularAccount(address,uint256)
        assert_eq!(init_code.len(), 20 + 4 + 64);
    }

    #[tokio::test]
    async fn test_signature_packing_prefixes_raw_type() {
        let account = account(AccountMode::Eip7702);
        let signature = account
            .sign_user_operation_hash(B256::repeat_byte(0x42))
            .await
            .unwrap();
        assert_eq!(signature.len(), 67);
        assert_eq!(&signature[..2], &[0xff, 0x00]);
    }
}
