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

//! Default pipeline stages: bundler-backed gas estimation, buffered fee
//! estimation, and the no-sponsorship paymaster stages.

use std::sync::Arc;

use alloy_primitives::Bytes;
use userop_account::AccountMode;
use userop_types::{
    user_operation::{EntryPointVersion, UserOperationOverrides, UserOperationStruct},
    Eip7702Auth,
};
use userop_utils::math;

use super::{ClientMiddleware, MiddlewareContext};
use crate::error::ClientError;

/// Placeholder paymaster stage. v0.6 requests carry `paymasterAndData`
/// even when unsponsored, so gas estimation needs the empty blob in
/// place; v0.7 leaves the decomposed fields unset.
#[derive(Debug, Default)]
pub struct DummyPaymasterData;

#[async_trait::async_trait]
impl ClientMiddleware for DummyPaymasterData {
    async fn apply(
        &self,
        ctx: &MiddlewareContext<'_>,
        uo: &mut UserOperationStruct,
        _overrides: &UserOperationOverrides,
    ) -> Result<(), ClientError> {
        if ctx.entry_point.version == EntryPointVersion::V0_6 {
            uo.paymaster_and_data = Some(Bytes::new());
        }
        Ok(())
    }
}

/// Final paymaster stage when no sponsorship is configured: the
/// operation pays its own gas.
#[derive(Debug, Default)]
pub struct DefaultPaymasterData;

#[async_trait::async_trait]
impl ClientMiddleware for DefaultPaymasterData {
    async fn apply(
        &self,
        ctx: &MiddlewareContext<'_>,
        uo: &mut UserOperationStruct,
        _overrides: &UserOperationOverrides,
    ) -> Result<(), ClientError> {
        if ctx.entry_point.version == EntryPointVersion::V0_6 {
            uo.paymaster_and_data = Some(Bytes::new());
        }
        Ok(())
    }
}

/// Paymaster stage used when the caller supplied `paymasterAndData`
/// directly: the override replaces whatever the configured sponsorship
/// stage would have produced.
#[derive(Debug, Default)]
pub struct OverridePaymasterData;

#[async_trait::async_trait]
impl ClientMiddleware for OverridePaymasterData {
    async fn apply(
        &self,
        _ctx: &MiddlewareContext<'_>,
        uo: &mut UserOperationStruct,
        overrides: &UserOperationOverrides,
    ) -> Result<(), ClientError> {
        uo.paymaster_and_data = Some(overrides.paymaster_and_data.clone().unwrap_or_default());
        Ok(())
    }
}

/// EIP-1559 fee stage. The priority fee is the node's suggestion plus
/// the chain's buffer, floored at the chain minimum; the max fee is the
/// buffered pending base fee plus the priority fee. Either field can be
/// pinned by an override, which also skips the corresponding RPC.
#[derive(Debug, Default)]
pub struct DefaultFeeDataGetter;

#[async_trait::async_trait]
impl ClientMiddleware for DefaultFeeDataGetter {
    async fn apply(
        &self,
        ctx: &MiddlewareContext<'_>,
        uo: &mut UserOperationStruct,
        overrides: &UserOperationOverrides,
    ) -> Result<(), ClientError> {
        let max_priority_fee = match overrides.max_priority_fee_per_gas {
            Some(fee) => fee,
            None => {
                let suggested = ctx.client.get_max_priority_fee().await?;
                math::increase_by_percent(suggested, ctx.chain.priority_fee_buffer_percent)
                    .max(ctx.chain.min_priority_fee_per_gas)
            }
        };
        let max_fee = match overrides.max_fee_per_gas {
            Some(fee) => fee,
            None => {
                let base_fee = ctx.client.get_pending_base_fee().await?;
                math::increase_by_percent(base_fee, ctx.chain.base_fee_buffer_percent)
                    + max_priority_fee
            }
        };

        uo.max_fee_per_gas = Some(max_fee);
        uo.max_priority_fee_per_gas = Some(max_priority_fee);
        Ok(())
    }
}

/// Gas stage backed by `eth_estimateUserOperationGas`. The bundler is
/// only consulted when at least one estimated field is not pinned by an
/// override; pinned fields always win over the estimate.
#[derive(Debug, Default)]
pub struct DefaultGasEstimator;

#[async_trait::async_trait]
impl ClientMiddleware for DefaultGasEstimator {
    async fn apply(
        &self,
        ctx: &MiddlewareContext<'_>,
        uo: &mut UserOperationStruct,
        overrides: &UserOperationOverrides,
    ) -> Result<(), ClientError> {
        let version = ctx.entry_point.version;
        let needs_estimate = overrides.call_gas_limit.is_none()
            || overrides.verification_gas_limit.is_none()
            || overrides.pre_verification_gas.is_none()
            || (version == EntryPointVersion::V0_7
                && overrides.paymaster_verification_gas_limit.is_none());

        let estimate = if needs_estimate {
            let request = uo.to_request(version);
            Some(
                ctx.client
                    .estimate_user_operation_gas(&request, ctx.entry_point.address)
                    .await?,
            )
        } else {
            None
        };

        uo.call_gas_limit = overrides
            .call_gas_limit
            .or_else(|| estimate.as_ref().map(|e| e.call_gas_limit.to::<u128>()));
        uo.verification_gas_limit = overrides
            .verification_gas_limit
            .or_else(|| estimate.as_ref().map(|e| e.verification_gas_limit.to::<u128>()));
        uo.pre_verification_gas = overrides
            .pre_verification_gas
            .or_else(|| estimate.as_ref().map(|e| e.pre_verification_gas.to::<u128>()));

        if version == EntryPointVersion::V0_7 {
            uo.paymaster_verification_gas_limit =
                overrides.paymaster_verification_gas_limit.or_else(|| {
                    estimate
                        .as_ref()
                        .and_then(|e| e.paymaster_verification_gas_limit)
                        .map(|v| v.to::<u128>())
                });
            // Sponsored operations need a post-op budget even when the
            // service left it out; unsponsored ones must leave it unset.
            if uo.paymaster_post_op_gas_limit.is_none() && uo.paymaster.is_some() {
                uo.paymaster_post_op_gas_limit = Some(0);
            }
        }

        Ok(())
    }
}

/// Gas stage for accounts that may run as EIP-7702 delegated EOAs. The
/// bundler simulates the delegation during estimation, so the request
/// carries a placeholder authorization tuple; the real tuple is signed
/// at send time.
pub struct Default7702GasEstimator {
    inner: Arc<dyn ClientMiddleware>,
}

impl Default7702GasEstimator {
    /// Wraps a gas estimation stage.
    pub fn new(inner: Arc<dyn ClientMiddleware>) -> Self {
        Self { inner }
    }
}

impl Default for Default7702GasEstimator {
    fn default() -> Self {
        Self::new(Arc::new(DefaultGasEstimator))
    }
}

#[async_trait::async_trait]
impl ClientMiddleware for Default7702GasEstimator {
    async fn apply(
        &self,
        ctx: &MiddlewareContext<'_>,
        uo: &mut UserOperationStruct,
        overrides: &UserOperationOverrides,
    ) -> Result<(), ClientError> {
        if ctx.entry_point.version == EntryPointVersion::V0_7
            && ctx.account.mode() == AccountMode::Eip7702
            && uo.eip7702_auth.is_none()
        {
            let implementation = ctx
                .account
                .implementation_address()
                .ok_or(ClientError::Eip7702NotSupported)?;
            uo.eip7702_auth = Some(Eip7702Auth::placeholder(implementation));
        }
        self.inner.apply(ctx, uo, overrides).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicBool;

    use alloy_primitives::{address, U128};
    use userop_account::MockSmartAccount;
    use userop_provider::MockSmartAccountClient;
    use userop_types::{
        user_operation::{EntryPoint, GasEstimate},
        ChainSpec,
    };

    use super::*;

    fn ctx<'a>(
        client: &'a MockSmartAccountClient,
        account: &'a MockSmartAccount,
        chain: &'a ChainSpec,
        entry_point: &'a EntryPoint,
    ) -> MiddlewareContext<'a> {
        MiddlewareContext {
            client,
            paymaster_client: client,
            account,
            chain,
            entry_point,
            sponsorship_final: AtomicBool::new(false),
        }
    }

    fn test_chain() -> ChainSpec {
        ChainSpec {
            min_priority_fee_per_gas: 100,
            base_fee_buffer_percent: 50,
            priority_fee_buffer_percent: 5,
            ..ChainSpec::mainnet()
        }
    }

    #[tokio::test]
    async fn test_fee_getter_buffers_node_values() {
        let mut client = MockSmartAccountClient::new();
        client
            .expect_get_max_priority_fee()
            .returning(|| Ok(1_000));
        client.expect_get_pending_base_fee().returning(|| Ok(10_000));
        let account = MockSmartAccount::new();
        let chain = test_chain();
        let entry_point = EntryPoint::of_chain(&chain, EntryPointVersion::V0_6);

        let mut uo = UserOperationStruct::default();
        DefaultFeeDataGetter
            .apply(
                &ctx(&client, &account, &chain, &entry_point),
                &mut uo,
                &UserOperationOverrides::default(),
            )
            .await
            .unwrap();

        // priority: 1000 * 105% = 1050; max: 10000 * 150% + 1050
        assert_eq!(uo.max_priority_fee_per_gas, Some(1_050));
        assert_eq!(uo.max_fee_per_gas, Some(16_050));
    }

    #[tokio::test]
    async fn test_fee_getter_applies_chain_floor() {
        let mut client = MockSmartAccountClient::new();
        client.expect_get_max_priority_fee().returning(|| Ok(10));
        client.expect_get_pending_base_fee().returning(|| Ok(0));
        let account = MockSmartAccount::new();
        let chain = test_chain();
        let entry_point = EntryPoint::of_chain(&chain, EntryPointVersion::V0_6);

        let mut uo = UserOperationStruct::default();
        DefaultFeeDataGetter
            .apply(
                &ctx(&client, &account, &chain, &entry_point),
                &mut uo,
                &UserOperationOverrides::default(),
            )
            .await
            .unwrap();

        assert_eq!(uo.max_priority_fee_per_gas, Some(100));
    }

    #[tokio::test]
    async fn test_fee_overrides_skip_node_calls() {
        // No expectations set: any RPC call would panic the mock.
        let client = MockSmartAccountClient::new();
        let account = MockSmartAccount::new();
        let chain = test_chain();
        let entry_point = EntryPoint::of_chain(&chain, EntryPointVersion::V0_6);

        let overrides = UserOperationOverrides {
            max_fee_per_gas: Some(777),
            max_priority_fee_per_gas: Some(42),
            ..Default::default()
        };
        let mut uo = UserOperationStruct::default();
        DefaultFeeDataGetter
            .apply(&ctx(&client, &account, &chain, &entry_point), &mut uo, &overrides)
            .await
            .unwrap();

        assert_eq!(uo.max_fee_per_gas, Some(777));
        assert_eq!(uo.max_priority_fee_per_gas, Some(42));
    }

    #[tokio::test]
    async fn test_gas_overrides_skip_bundler_estimate() {
        let client = MockSmartAccountClient::new();
        let account = MockSmartAccount::new();
        let chain = test_chain();
        let entry_point = EntryPoint::of_chain(&chain, EntryPointVersion::V0_6);

        let overrides = UserOperationOverrides {
            call_gas_limit: Some(1),
            verification_gas_limit: Some(2),
            pre_verification_gas: Some(3),
            ..Default::default()
        };
        let mut uo = UserOperationStruct::default();
        DefaultGasEstimator
            .apply(&ctx(&client, &account, &chain, &entry_point), &mut uo, &overrides)
            .await
            .unwrap();

        assert_eq!(uo.call_gas_limit, Some(1));
        assert_eq!(uo.verification_gas_limit, Some(2));
        assert_eq!(uo.pre_verification_gas, Some(3));
    }

    #[tokio::test]
    async fn test_gas_estimator_fills_unpinned_fields() {
        let mut client = MockSmartAccountClient::new();
        client
            .expect_estimate_user_operation_gas()
            .returning(|_, _| {
                Ok(GasEstimate {
                    pre_verification_gas: U128::from(50_000u64),
                    verification_gas_limit: U128::from(150_000u64),
                    call_gas_limit: U128::from(90_000u64),
                    paymaster_verification_gas_limit: None,
                })
            });
        let account = MockSmartAccount::new();
        let chain = test_chain();
        let entry_point = EntryPoint::of_chain(&chain, EntryPointVersion::V0_6);

        let overrides = UserOperationOverrides {
            call_gas_limit: Some(123),
            ..Default::default()
        };
        let mut uo = UserOperationStruct::default();
        DefaultGasEstimator
            .apply(&ctx(&client, &account, &chain, &entry_point), &mut uo, &overrides)
            .await
            .unwrap();

        assert_eq!(uo.call_gas_limit, Some(123));
        assert_eq!(uo.verification_gas_limit, Some(150_000));
        assert_eq!(uo.pre_verification_gas, Some(50_000));
    }

    #[tokio::test]
    async fn test_gas_estimator_post_op_defaults_with_paymaster() {
        let mut client = MockSmartAccountClient::new();
        client
            .expect_estimate_user_operation_gas()
            .returning(|_, _| {
                Ok(GasEstimate {
                    pre_verification_gas: U128::from(1u64),
                    verification_gas_limit: U128::from(2u64),
                    call_gas_limit: U128::from(3u64),
                    paymaster_verification_gas_limit: Some(U128::from(4u64)),
                })
            });
        let account = MockSmartAccount::new();
        let chain = test_chain();
        let entry_point = EntryPoint::of_chain(&chain, EntryPointVersion::V0_7);

        let mut uo = UserOperationStruct {
            paymaster: Some(address!("c03aac639bb21233e0139381970328db8bceeb67")),
            ..Default::default()
        };
        DefaultGasEstimator
            .apply(
                &ctx(&client, &account, &chain, &entry_point),
                &mut uo,
                &UserOperationOverrides::default(),
            )
            .await
            .unwrap();

        assert_eq!(uo.paymaster_verification_gas_limit, Some(4));
        assert_eq!(uo.paymaster_post_op_gas_limit, Some(0));

        // No paymaster: post-op stays unset.
        let mut unsponsored = UserOperationStruct::default();
        DefaultGasEstimator
            .apply(
                &ctx(&client, &account, &chain, &entry_point),
                &mut unsponsored,
                &UserOperationOverrides::default(),
            )
            .await
            .unwrap();
        assert_eq!(unsponsored.paymaster_post_op_gas_limit, None);
    }

    #[tokio::test]
    async fn test_7702_estimator_sets_placeholder_auth() {
        let implementation = address!("69007702764179f14F51cdce752f4f775d74e139");
        let mut client = MockSmartAccountClient::new();
        client
            .expect_estimate_user_operation_gas()
            .returning(|_, _| {
                Ok(GasEstimate {
                    pre_verification_gas: U128::from(1u64),
                    verification_gas_limit: U128::from(2u64),
                    call_gas_limit: U128::from(3u64),
                    paymaster_verification_gas_limit: None,
                })
            });
        let mut account = MockSmartAccount::new();
        account.expect_mode().return_const(AccountMode::Eip7702);
        account
            .expect_implementation_address()
            .return_const(Some(implementation));
        let chain = test_chain();
        let entry_point = EntryPoint::of_chain(&chain, EntryPointVersion::V0_7);

        let mut uo = UserOperationStruct::default();
        Default7702GasEstimator::default()
            .apply(
                &ctx(&client, &account, &chain, &entry_point),
                &mut uo,
                &UserOperationOverrides::default(),
            )
            .await
            .unwrap();

        assert_eq!(uo.eip7702_auth, Some(Eip7702Auth::placeholder(implementation)));
    }

    #[tokio::test]
    async fn test_dummy_paymaster_sets_empty_blob_for_v0_6_only() {
        let client = MockSmartAccountClient::new();
        let account = MockSmartAccount::new();
        let chain = test_chain();

        let v0_6 = EntryPoint::of_chain(&chain, EntryPointVersion::V0_6);
        let mut uo = UserOperationStruct::default();
        DummyPaymasterData
            .apply(
                &ctx(&client, &account, &chain, &v0_6),
                &mut uo,
                &UserOperationOverrides::default(),
            )
            .await
            .unwrap();
        assert_eq!(uo.paymaster_and_data, Some(Bytes::new()));

        let v0_7 = EntryPoint::of_chain(&chain, EntryPointVersion::V0_7);
        let mut uo = UserOperationStruct::default();
        DummyPaymasterData
            .apply(
                &ctx(&client, &account, &chain, &v0_7),
                &mut uo,
                &UserOperationOverrides::default(),
            )
            .await
            .unwrap();
        assert_eq!(uo.paymaster_and_data, None);
    }
}
