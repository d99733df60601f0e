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

use alloy_primitives::{bytes, Address, Bytes, B256, U256};
#[cfg(feature = "test-utils")]
use mockall::automock;
use userop_types::{
    authorization::Eip7702Auth,
    user_operation::{EntryPoint, UserOperationCall},
};

use crate::AccountError;

/// How the account exists on chain: a contract deployed through a factory,
/// or an EOA delegated to an implementation via EIP-7702.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountMode {
    /// Factory-deployed contract account.
    Default,
    /// EIP-7702 delegated EOA.
    Eip7702,
}

/// Dummy ECDSA signature that passes owner validation without recovering
/// to anything, used so gas estimation runs the real validation path.
pub(crate) fn ecdsa_dummy_signature() -> Bytes {
    bytes!("fffffffffffffffffffffffffffffff0000000000000000000000000000000007aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa1c")
}

/// A smart contract account a provider can build and sign user operations
/// for.
#[cfg_attr(feature = "test-utils", automock)]
#[async_trait::async_trait]
pub trait SmartAccount: Send + Sync {
    /// The entry point this account validates through.
    fn entry_point(&self) -> &EntryPoint;

    /// How the account exists on chain.
    fn mode(&self) -> AccountMode;

    /// Address of the owner key.
    fn owner(&self) -> Address;

    /// Factory that deploys the account, when in factory mode.
    fn factory_address(&self) -> Option<Address>;

    /// Implementation contract an EIP-7702 account delegates to.
    fn implementation_address(&self) -> Option<Address>;

    /// Signature placeholder that passes validation during gas estimation.
    fn dummy_signature(&self) -> Bytes;

    /// Encodes a single call through the account's execute function.
    fn encode_execute(&self, call: &UserOperationCall) -> Bytes;

    /// Encodes a batch of calls through the account's batch execute
    /// function.
    fn encode_batch_execute(&self, calls: &[UserOperationCall]) -> Bytes;

    /// The account address, resolved counterfactually on first use.
    async fn address(&self) -> Result<Address, AccountError>;

    /// Factory deployment blob for the operation's `initCode` field:
    /// `factory ++ createAccount calldata` until the account is deployed,
    /// `0x` afterwards.
    async fn init_code(&self) -> Result<Bytes, AccountError>;

    /// The factory calldata portion of the init code, for v0.7 requests.
    async fn factory_data(&self) -> Result<Option<Bytes>, AccountError>;

    /// The account's current entry point nonce.
    async fn nonce(&self) -> Result<U256, AccountError>;

    /// Whether account code exists on chain yet.
    async fn is_deployed(&self) -> Result<bool, AccountError>;

    /// Signs a user operation hash in the account's expected signature
    /// format.
    async fn sign_user_operation_hash(&self, hash: B256) -> Result<Bytes, AccountError>;

    /// Signs an arbitrary message with the owner key.
    async fn sign_message(&self, message: &[u8]) -> Result<Bytes, AccountError>;

    /// Signs an EIP-7702 authorization delegating the owner EOA to this
    /// account's implementation, at the given EOA nonce.
    async fn sign_authorization(&self, eoa_nonce: u64) -> Result<Eip7702Auth, AccountError>;
}
