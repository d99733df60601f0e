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

use alloy_primitives::{aliases::U192, Address, Bytes, TxKind, U256};
use alloy_rpc_types_eth::{TransactionInput, TransactionRequest};
use alloy_sol_types::{SolCall, SolError};
use parking_lot::Mutex;
use userop_contracts::entry_point::IEntryPoint;
use userop_provider::SmartAccountClient;
use userop_types::user_operation::EntryPoint;

use crate::AccountError;

/// On-chain existence of the account, probed lazily and cached. `Deployed`
/// is terminal; `NotDeployed` is re-probed since deployment may land at
/// any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeploymentState {
    Undefined,
    NotDeployed,
    Deployed,
}

/// State shared by every account implementation: the RPC connection, the
/// target entry point, and caches for the resolved address and deployment
/// probe.
pub(crate) struct AccountCore {
    client: Arc<dyn SmartAccountClient>,
    entry_point: EntryPoint,
    address: Mutex<Option<Address>>,
    deployment_state: Mutex<DeploymentState>,
}

impl AccountCore {
    pub(crate) fn new(client: Arc<dyn SmartAccountClient>, entry_point: EntryPoint) -> Self {
        Self {
            client,
            entry_point,
            address: Mutex::new(None),
            deployment_state: Mutex::new(DeploymentState::Undefined),
        }
    }

    /// Pre-seeds the address cache, skipping counterfactual resolution.
    pub(crate) fn with_address(self, address: Option<Address>) -> Self {
        *self.address.lock() = address;
        self
    }

    pub(crate) fn entry_point(&self) -> &EntryPoint {
        &self.entry_point
    }

    /// Resolves the counterfactual address via the entry point's
    /// `getSenderAddress`, which is specified to revert with the result.
    /// A non-reverting call means the entry point is broken.
    pub(crate) async fn resolve_address(
        &self,
        account_init_code: &Bytes,
    ) -> Result<Address, AccountError> {
        if let Some(address) = *self.address.lock() {
            return Ok(address);
        }

        let call = IEntryPoint::getSenderAddressCall {
            initCode: account_init_code.clone(),
        };
        let tx = call_request(self.entry_point.address, call.abi_encode());

        let err = match self.client.call(&tx, None).await {
            Ok(_) => {
                return Err(AccountError::CounterfactualAddress(
                    "getSenderAddress did not revert".to_string(),
                ))
            }
            Err(err) => err,
        };
        let revert_data = err.revert_data().ok_or_else(|| {
            AccountError::CounterfactualAddress(format!(
                "getSenderAddress revert carried no data: {err}"
            ))
        })?;
        let result = IEntryPoint::SenderAddressResult::abi_decode(&revert_data, false)?;

        tracing::debug!("resolved counterfactual address {}", result.sender);
        *self.address.lock() = Some(result.sender);
        Ok(result.sender)
    }

    /// Gates the deployment blob on the account's on-chain code: returns
    /// `account_init_code` until code exists at `address`, then `0x`
    /// forever after.
    pub(crate) async fn init_code(
        &self,
        address: Address,
        account_init_code: Bytes,
    ) -> Result<Bytes, AccountError> {
        if self.is_deployed(address).await? {
            Ok(Bytes::new())
        } else {
            Ok(account_init_code)
        }
    }

    pub(crate) async fn is_deployed(&self, address: Address) -> Result<bool, AccountError> {
        if *self.deployment_state.lock() == DeploymentState::Deployed {
            return Ok(true);
        }

        let code = self.client.get_code(address, None).await?;
        let state = if code.is_empty() {
            DeploymentState::NotDeployed
        } else {
            DeploymentState::Deployed
        };
        *self.deployment_state.lock() = state;
        Ok(state == DeploymentState::Deployed)
    }

    /// Reads the account's nonce for `key` from the entry point. An
    /// undeployed account is always at nonce zero.
    pub(crate) async fn nonce(&self, address: Address, key: U192) -> Result<U256, AccountError> {
        if !self.is_deployed(address).await? {
            return Ok(U256::ZERO);
        }

        let call = IEntryPoint::getNonceCall {
            sender: address,
            key,
        };
        let tx = call_request(self.entry_point.address, call.abi_encode());
        let out = self.client.call(&tx, None).await?;
        let ret = IEntryPoint::getNonceCall::abi_decode_returns(&out, false)?;
        Ok(ret.nonce)
    }
}

/// Splits `factory ++ calldata` init code into its calldata portion.
pub(crate) fn factory_data_from_init_code(init_code: &Bytes) -> Option<Bytes> {
    if init_code.len() < Address::len_bytes() {
        return None;
    }
    Some(Bytes::copy_from_slice(&init_code[Address::len_bytes()..]))
}

pub(crate) fn call_request(to: Address, data: Vec<u8>) -> TransactionRequest {
    TransactionRequest {
        to: Some(TxKind::Call(to)),
        input: TransactionInput::new(data.into()),
        ..Default::default()
    }
}
