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

use std::marker::PhantomData;

use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_provider::Provider as AlloyProvider;
use alloy_rpc_types_eth::{BlockId, BlockTransactionsKind, TransactionRequest};
use alloy_transport::Transport;
use anyhow::Context;
use userop_types::{
    paymaster::{
        GasAndPaymasterAndData, GasAndPaymasterAndDataParams, PaymasterAndData,
        PaymasterAndDataParams, PaymasterData, PaymasterStubData, SponsorUserOperationParams,
        SponsoredUserOperation,
    },
    user_operation::{GasEstimate, UserOperationReceipt, UserOperationRequest},
};

use crate::{BundlerProvider, EvmProvider, PaymasterProvider, ProviderResult};

/// Client implementation over [alloy-provider](https://github.com/alloy-rs/alloy).
///
/// Standard `eth_` calls go through the typed provider methods; bundler and
/// paymaster namespaces go through raw requests since alloy has no bindings
/// for them.
pub struct AlloyNodeClient<AP, T> {
    inner: AP,
    _marker: PhantomData<T>,
}

impl<AP, T> AlloyNodeClient<AP, T> {
    /// Create a new `AlloyNodeClient`
    pub fn new(inner: AP) -> Self {
        Self {
            inner,
            _marker: PhantomData,
        }
    }
}

impl<AP: Clone, T> Clone for AlloyNodeClient<AP, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _marker: PhantomData,
        }
    }
}

#[async_trait::async_trait]
impl<AP, T> EvmProvider for AlloyNodeClient<AP, T>
where
    T: Transport + Clone,
    AP: AlloyProvider<T>,
{
    async fn call(
        &self,
        tx: &TransactionRequest,
        block: Option<BlockId>,
    ) -> ProviderResult<Bytes> {
        let mut call = self.inner.call(tx);
        if let Some(block) = block {
            call = call.block(block);
        }

        Ok(call.await?)
    }

    async fn get_code(&self, address: Address, block: Option<BlockId>) -> ProviderResult<Bytes> {
        let mut call = self.inner.get_code_at(address);
        if let Some(block) = block {
            call = call.block_id(block);
        }

        Ok(call.await?)
    }

    async fn get_balance(&self, address: Address, block: Option<BlockId>) -> ProviderResult<U256> {
        let mut call = self.inner.get_balance(address);
        if let Some(block) = block {
            call = call.block_id(block);
        }

        Ok(call.await?)
    }

    async fn get_transaction_count(&self, address: Address) -> ProviderResult<u64> {
        Ok(self.inner.get_transaction_count(address).await?)
    }

    async fn get_block_number(&self) -> ProviderResult<u64> {
        Ok(self.inner.get_block_number().await?)
    }

    async fn get_pending_base_fee(&self) -> ProviderResult<u128> {
        let base_fee = self
            .inner
            .get_block(BlockId::pending(), BlockTransactionsKind::Hashes)
            .await?
            .context("pending block should exist")?
            .header
            .base_fee_per_gas
            .context("pending block should have a nonempty base fee")?;
        Ok(u128::from(base_fee))
    }

    async fn get_max_priority_fee(&self) -> ProviderResult<u128> {
        Ok(self.inner.get_max_priority_fee_per_gas().await?)
    }
}

#[async_trait::async_trait]
impl<AP, T> BundlerProvider for AlloyNodeClient<AP, T>
where
    T: Transport + Clone,
    AP: AlloyProvider<T>,
{
    async fn estimate_user_operation_gas(
        &self,
        op: &UserOperationRequest,
        entry_point: Address,
    ) -> ProviderResult<GasEstimate> {
        Ok(self
            .inner
            .raw_request(
                "eth_estimateUserOperationGas".into(),
                (op.clone(), entry_point),
            )
            .await?)
    }

    async fn send_user_operation(
        &self,
        op: &UserOperationRequest,
        entry_point: Address,
    ) -> ProviderResult<B256> {
        Ok(self
            .inner
            .raw_request("eth_sendUserOperation".into(), (op.clone(), entry_point))
            .await?)
    }

    async fn get_user_operation_receipt(
        &self,
        hash: B256,
    ) -> ProviderResult<Option<UserOperationReceipt>> {
        Ok(self
            .inner
            .raw_request("eth_getUserOperationReceipt".into(), (hash,))
            .await?)
    }

    async fn get_supported_entry_points(&self) -> ProviderResult<Vec<Address>> {
        Ok(self
            .inner
            .raw_request("eth_supportedEntryPoints".into(), ())
            .await?)
    }
}

#[async_trait::async_trait]
impl<AP, T> PaymasterProvider for AlloyNodeClient<AP, T>
where
    T: Transport + Clone,
    AP: AlloyProvider<T>,
{
    async fn get_paymaster_stub_data(
        &self,
        op: &UserOperationRequest,
        entry_point: Address,
        chain_id: u64,
        context: Option<serde_json::Value>,
    ) -> ProviderResult<PaymasterStubData> {
        Ok(self
            .inner
            .raw_request(
                "pm_getPaymasterStubData".into(),
                (
                    op.clone(),
                    entry_point,
                    format!("0x{chain_id:x}"),
                    context.unwrap_or(serde_json::Value::Null),
                ),
            )
            .await?)
    }

    async fn get_paymaster_data(
        &self,
        op: &UserOperationRequest,
        entry_point: Address,
        chain_id: u64,
        context: Option<serde_json::Value>,
    ) -> ProviderResult<PaymasterData> {
        Ok(self
            .inner
            .raw_request(
                "pm_getPaymasterData".into(),
                (
                    op.clone(),
                    entry_point,
                    format!("0x{chain_id:x}"),
                    context.unwrap_or(serde_json::Value::Null),
                ),
            )
            .await?)
    }

    async fn request_paymaster_and_data(
        &self,
        params: &PaymasterAndDataParams,
    ) -> ProviderResult<PaymasterAndData> {
        Ok(self
            .inner
            .raw_request("alchemy_requestPaymasterAndData".into(), (params.clone(),))
            .await?)
    }

    async fn request_gas_and_paymaster_and_data(
        &self,
        params: &GasAndPaymasterAndDataParams,
    ) -> ProviderResult<GasAndPaymasterAndData> {
        Ok(self
            .inner
            .raw_request(
                "alchemy_requestGasAndPaymasterAndData".into(),
                (params.clone(),),
            )
            .await?)
    }

    async fn sponsor_user_operation(
        &self,
        params: &SponsorUserOperationParams,
    ) -> ProviderResult<SponsoredUserOperation> {
        Ok(self
            .inner
            .raw_request(
                "pm_sponsorUserOperation".into(),
                (params.user_operation.clone(), params.entry_point),
            )
            .await?)
    }
}
