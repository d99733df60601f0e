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

use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_rpc_types_eth::{BlockId, TransactionRequest};
use userop_types::{
    paymaster::{
        GasAndPaymasterAndData, GasAndPaymasterAndDataParams, PaymasterAndData,
        PaymasterAndDataParams, PaymasterData, PaymasterStubData, SponsorUserOperationParams,
        SponsoredUserOperation,
    },
    user_operation::{GasEstimate, UserOperationReceipt, UserOperationRequest},
};

use crate::{BundlerProvider, EvmProvider, PaymasterProvider, ProviderResult};

mockall::mock! {
    /// A mock endpoint serving all three RPC namespaces, for use where a
    /// full [`crate::SmartAccountClient`] is expected.
    pub SmartAccountClient {}

    #[async_trait::async_trait]
    impl EvmProvider for SmartAccountClient {
        async fn call(
            &self,
            tx: &TransactionRequest,
            block: Option<BlockId>,
        ) -> ProviderResult<Bytes>;
        async fn get_code(&self, address: Address, block: Option<BlockId>)
            -> ProviderResult<Bytes>;
        async fn get_balance(&self, address: Address, block: Option<BlockId>)
            -> ProviderResult<U256>;
        async fn get_transaction_count(&self, address: Address) -> ProviderResult<u64>;
        async fn get_block_number(&self) -> ProviderResult<u64>;
        async fn get_pending_base_fee(&self) -> ProviderResult<u128>;
        async fn get_max_priority_fee(&self) -> ProviderResult<u128>;
    }

    #[async_trait::async_trait]
    impl BundlerProvider for SmartAccountClient {
        async fn estimate_user_operation_gas(
            &self,
            op: &UserOperationRequest,
            entry_point: Address,
        ) -> ProviderResult<GasEstimate>;
        async fn send_user_operation(
            &self,
            op: &UserOperationRequest,
            entry_point: Address,
        ) -> ProviderResult<B256>;
        async fn get_user_operation_receipt(
            &self,
            hash: B256,
        ) -> ProviderResult<Option<UserOperationReceipt>>;
        async fn get_supported_entry_points(&self) -> ProviderResult<Vec<Address>>;
    }

    #[async_trait::async_trait]
    impl PaymasterProvider for SmartAccountClient {
        async fn get_paymaster_stub_data(
            &self,
            op: &UserOperationRequest,
            entry_point: Address,
            chain_id: u64,
            context: Option<serde_json::Value>,
        ) -> ProviderResult<PaymasterStubData>;
        async fn get_paymaster_data(
            &self,
            op: &UserOperationRequest,
            entry_point: Address,
            chain_id: u64,
            context: Option<serde_json::Value>,
        ) -> ProviderResult<PaymasterData>;
        async fn request_paymaster_and_data(
            &self,
            params: &PaymasterAndDataParams,
        ) -> ProviderResult<PaymasterAndData>;
        async fn request_gas_and_paymaster_and_data(
            &self,
            params: &GasAndPaymasterAndDataParams,
        ) -> ProviderResult<GasAndPaymasterAndData>;
        async fn sponsor_user_operation(
            &self,
            params: &SponsorUserOperationParams,
        ) -> ProviderResult<SponsoredUserOperation>;
    }
}
