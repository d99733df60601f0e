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

//! Alchemy Gas Manager sponsorship.
//!
//! The one-call mode asks `alchemy_requestGasAndPaymasterAndData` for
//! gas, fees, and paymaster data together, so the default estimation
//! stages are bypassed. The two-call mode keeps local estimation and
//! only fetches `alchemy_requestPaymasterAndData`.

use std::sync::Arc;

use alloy_primitives::{bytes, Bytes, U128};
use userop_account::AccountMode;
use userop_types::{
    paymaster::{FeeOverride, GasAndPaymasterAndDataParams, PaymasterAndDataParams},
    user_operation::{EntryPointVersion, UserOperationOverrides, UserOperationStruct},
};

use crate::{
    error::ClientError,
    middleware::{ClientMiddleware, Default7702GasEstimator, DefaultFeeDataGetter, MiddlewareContext},
    SmartAccountProvider,
};

/// Gas Manager settings.
#[derive(Debug, Clone)]
pub struct AlchemyGasManagerConfig {
    /// Sponsorship policy identifier from the Gas Manager dashboard.
    pub policy_id: String,
    /// Use the two-call mode: estimate gas and fees locally and only
    /// fetch paymaster data from the service.
    pub gas_estimation_disabled: bool,
}

impl AlchemyGasManagerConfig {
    /// One-call mode under the given policy.
    pub fn new(policy_id: impl Into<String>) -> Self {
        Self {
            policy_id: policy_id.into(),
            gas_estimation_disabled: false,
        }
    }
}

/// Placeholder blob sized like the Gas Manager's real `paymasterAndData`,
/// so estimation accounts for the sponsored validation path. The
/// paymaster contract differs between the initial deployment chains and
/// the rest.
fn dummy_paymaster_and_data(chain_id: u64) -> Bytes {
    match chain_id {
        // mainnet, optimism, polygon, arbitrum
        1 | 10 | 137 | 42161 => bytes!(
            "4fd9098af9ddcb41da48a1d78f91f1398965addcfffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff0000000000000000000000000000000007aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa1c"
        ),
        _ => bytes!(
            "c03aac639bb21233e0139381970328db8bceeb67fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff0000000000000000000000000000000007aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa1c"
        ),
    }
}

/// Dummy stage: installs the per-chain placeholder blob.
struct AlchemyDummyPaymasterData;

#[async_trait::async_trait]
impl ClientMiddleware for AlchemyDummyPaymasterData {
    async fn apply(
        &self,
        ctx: &MiddlewareContext<'_>,
        uo: &mut UserOperationStruct,
        _overrides: &UserOperationOverrides,
    ) -> Result<(), ClientError> {
        uo.paymaster_and_data = Some(dummy_paymaster_and_data(ctx.chain.id));
        Ok(())
    }
}

/// Fee stage for the one-call mode. Fees come back from the combined
/// request, so this normally just pins zeros for the interim wire
/// encoding. The exception is a caller bypassing sponsorship with an
/// empty `paymasterAndData` override: the combined call never runs then,
/// so fall back to real fee estimation.
struct AlchemyFeeDataGetter {
    fallback: Arc<dyn ClientMiddleware>,
}

#[async_trait::async_trait]
impl ClientMiddleware for AlchemyFeeDataGetter {
    async fn apply(
        &self,
        ctx: &MiddlewareContext<'_>,
        uo: &mut UserOperationStruct,
        overrides: &UserOperationOverrides,
    ) -> Result<(), ClientError> {
        let mut max_fee = uo.max_fee_per_gas.unwrap_or_default();
        let mut max_priority_fee = uo.max_priority_fee_per_gas.unwrap_or_default();

        if matches!(&overrides.paymaster_and_data, Some(data) if data.is_empty()) {
            self.fallback.apply(ctx, uo, overrides).await?;
            max_fee = uo.max_fee_per_gas.unwrap_or(max_fee);
            max_priority_fee = uo.max_priority_fee_per_gas.unwrap_or(max_priority_fee);
        }

        uo.max_fee_per_gas = Some(max_fee);
        uo.max_priority_fee_per_gas = Some(max_priority_fee);
        Ok(())
    }
}

/// Gas stage for the one-call mode. v0.6 accounts still estimate
/// through the bundler; v0.7 accounts defer to the combined call, except
/// EIP-7702 ones, which estimate locally with a placeholder
/// authorization so delegation cost is included.
struct AlchemyGasEstimator {
    inner: Arc<dyn ClientMiddleware>,
}

#[async_trait::async_trait]
impl ClientMiddleware for AlchemyGasEstimator {
    async fn apply(
        &self,
        ctx: &MiddlewareContext<'_>,
        uo: &mut UserOperationStruct,
        overrides: &UserOperationOverrides,
    ) -> Result<(), ClientError> {
        if ctx.entry_point.version == EntryPointVersion::V0_7
            && ctx.account.mode() == AccountMode::Default
        {
            return Ok(());
        }
        self.inner.apply(ctx, uo, overrides).await
    }
}

/// Paymaster stage for the two-call mode:
/// `alchemy_requestPaymasterAndData` over the locally estimated
/// operation.
pub struct AlchemyPaymasterData {
    policy_id: String,
}

impl AlchemyPaymasterData {
    /// Creates the stage for the given sponsorship policy.
    pub fn new(policy_id: impl Into<String>) -> Self {
        Self {
            policy_id: policy_id.into(),
        }
    }
}

#[async_trait::async_trait]
impl ClientMiddleware for AlchemyPaymasterData {
    async fn apply(
        &self,
        ctx: &MiddlewareContext<'_>,
        uo: &mut UserOperationStruct,
        _overrides: &UserOperationOverrides,
    ) -> Result<(), ClientError> {
        let params = PaymasterAndDataParams {
            policy_id: self.policy_id.clone(),
            entry_point: ctx.entry_point.address,
            user_operation: uo.to_request(ctx.entry_point.version),
        };
        let result = ctx
            .paymaster_client
            .request_paymaster_and_data(&params)
            .await?;
        uo.paymaster_and_data = Some(result.paymaster_and_data);
        Ok(())
    }
}

/// Paymaster stage for the one-call mode:
/// `alchemy_requestGasAndPaymasterAndData` returns gas, fees, and
/// paymaster fields together, with caller overrides forwarded as pinned
/// values the service must honor.
pub struct AlchemyGasAndPaymasterData {
    policy_id: String,
}

impl AlchemyGasAndPaymasterData {
    /// Creates the stage for the given sponsorship policy.
    pub fn new(policy_id: impl Into<String>) -> Self {
        Self {
            policy_id: policy_id.into(),
        }
    }
}

#[async_trait::async_trait]
impl ClientMiddleware for AlchemyGasAndPaymasterData {
    async fn apply(
        &self,
        ctx: &MiddlewareContext<'_>,
        uo: &mut UserOperationStruct,
        overrides: &UserOperationOverrides,
    ) -> Result<(), ClientError> {
        let user_operation = uo.to_request(ctx.entry_point.version);
        let fee_override = FeeOverride {
            max_fee_per_gas: overrides.max_fee_per_gas.map(U128::from),
            max_priority_fee_per_gas: overrides.max_priority_fee_per_gas.map(U128::from),
            call_gas_limit: overrides.call_gas_limit.map(U128::from),
            verification_gas_limit: overrides.verification_gas_limit.map(U128::from),
            pre_verification_gas: overrides.pre_verification_gas.map(U128::from),
        };
        let params = GasAndPaymasterAndDataParams {
            policy_id: self.policy_id.clone(),
            entry_point: ctx.entry_point.address,
            dummy_signature: Some(user_operation.signature.clone()),
            user_operation,
            fee_override,
        };
        let result = ctx
            .paymaster_client
            .request_gas_and_paymaster_and_data(&params)
            .await?;

        uo.call_gas_limit = Some(result.call_gas_limit.to::<u128>());
        uo.verification_gas_limit = Some(result.verification_gas_limit.to::<u128>());
        uo.pre_verification_gas = Some(result.pre_verification_gas.to::<u128>());
        uo.max_fee_per_gas = Some(result.max_fee_per_gas.to::<u128>());
        uo.max_priority_fee_per_gas = Some(result.max_priority_fee_per_gas.to::<u128>());
        uo.paymaster_and_data = result.paymaster_and_data;
        uo.paymaster = result.paymaster;
        uo.paymaster_data = result.paymaster_data;
        uo.paymaster_verification_gas_limit = result
            .paymaster_verification_gas_limit
            .map(|v| v.to::<u128>());
        uo.paymaster_post_op_gas_limit =
            result.paymaster_post_op_gas_limit.map(|v| v.to::<u128>());
        Ok(())
    }
}

impl SmartAccountProvider {
    /// Sponsors operations through the Alchemy Gas Manager, in one-call
    /// or two-call mode per the config.
    pub fn with_alchemy_gas_manager(self, config: AlchemyGasManagerConfig) -> Self {
        let provider = self.with_dummy_paymaster_middleware(Arc::new(AlchemyDummyPaymasterData));
        if config.gas_estimation_disabled {
            provider
                .with_paymaster_middleware(Arc::new(AlchemyPaymasterData::new(config.policy_id)))
        } else {
            provider
                .with_fee_data_middleware(Arc::new(AlchemyFeeDataGetter {
                    fallback: Arc::new(DefaultFeeDataGetter),
                }))
                .with_gas_estimation_middleware(Arc::new(AlchemyGasEstimator {
                    inner: Arc::new(Default7702GasEstimator::default()),
                }))
                .with_paymaster_middleware(Arc::new(AlchemyGasAndPaymasterData::new(
                    config.policy_id,
                )))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicBool;

    use alloy_primitives::{address, U128};
    use userop_account::MockSmartAccount;
    use userop_provider::MockSmartAccountClient;
    use userop_types::{
        paymaster::GasAndPaymasterAndData,
        user_operation::EntryPoint,
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

    #[test]
    fn test_dummy_blob_varies_by_chain() {
        let mainnet = dummy_paymaster_and_data(1);
        let base = dummy_paymaster_and_data(8453);
        assert_eq!(
            &mainnet[..20],
            address!("4Fd9098af9ddcB41DA48A1d78F91F1398965addc").as_slice()
        );
        assert_eq!(
            &base[..20],
            address!("c03aac639bb21233e0139381970328db8bceeb67").as_slice()
        );
        assert_eq!(mainnet.len(), base.len());
        assert_eq!(dummy_paymaster_and_data(137), mainnet);
    }

    #[tokio::test]
    async fn test_combined_call_applies_all_fields_and_pins_overrides() {
        let paymaster = address!("4Fd9098af9ddcB41DA48A1d78F91F1398965addc");
        let mut client = MockSmartAccountClient::new();
        client
            .expect_request_gas_and_paymaster_and_data()
            .withf(|params| {
                params.policy_id == "policy-1"
                    && params.dummy_signature == Some(params.user_operation.signature.clone())
                    && params.fee_override.max_fee_per_gas == Some(U128::from(999u64))
                    && params.fee_override.call_gas_limit.is_none()
            })
            .returning(move |_| {
                Ok(GasAndPaymasterAndData {
                    call_gas_limit: U128::from(90_000u64),
                    verification_gas_limit: U128::from(150_000u64),
                    pre_verification_gas: U128::from(50_000u64),
                    max_fee_per_gas: U128::from(999u64),
                    max_priority_fee_per_gas: U128::from(10u64),
                    paymaster_and_data: None,
                    paymaster: Some(paymaster),
                    paymaster_data: Some(alloy_primitives::bytes!("1234")),
                    paymaster_verification_gas_limit: Some(U128::from(60_000u64)),
                    paymaster_post_op_gas_limit: Some(U128::from(1u64)),
                })
            });
        let account = MockSmartAccount::new();
        let chain = ChainSpec::mainnet();
        let entry_point = EntryPoint::of_chain(&chain, EntryPointVersion::V0_7);

        let overrides = UserOperationOverrides {
            max_fee_per_gas: Some(999),
            ..Default::default()
        };
        let mut uo = UserOperationStruct::default();
        AlchemyGasAndPaymasterData::new("policy-1")
            .apply(&ctx(&client, &account, &chain, &entry_point), &mut uo, &overrides)
            .await
            .unwrap();

        assert_eq!(uo.call_gas_limit, Some(90_000));
        assert_eq!(uo.max_fee_per_gas, Some(999));
        assert_eq!(uo.paymaster, Some(paymaster));
        assert_eq!(uo.paymaster_verification_gas_limit, Some(60_000));
        assert_eq!(uo.paymaster_post_op_gas_limit, Some(1));
    }

    #[tokio::test]
    async fn test_one_call_fee_stage_pins_zeros_without_bypass() {
        // No node expectations: the combined call provides the fees.
        let client = MockSmartAccountClient::new();
        let account = MockSmartAccount::new();
        let chain = ChainSpec::mainnet();
        let entry_point = EntryPoint::of_chain(&chain, EntryPointVersion::V0_6);

        let stage = AlchemyFeeDataGetter {
            fallback: Arc::new(DefaultFeeDataGetter),
        };
        let mut uo = UserOperationStruct::default();
        stage
            .apply(
                &ctx(&client, &account, &chain, &entry_point),
                &mut uo,
                &Default::default(),
            )
            .await
            .unwrap();
        assert_eq!(uo.max_fee_per_gas, Some(0));
        assert_eq!(uo.max_priority_fee_per_gas, Some(0));
    }

    #[tokio::test]
    async fn test_one_call_fee_stage_falls_back_on_sponsorship_bypass() {
        let mut client = MockSmartAccountClient::new();
        client.expect_get_max_priority_fee().returning(|| Ok(1_000));
        client
            .expect_get_pending_base_fee()
            .returning(|| Ok(10_000));
        let account = MockSmartAccount::new();
        let chain = ChainSpec::mainnet();
        let entry_point = EntryPoint::of_chain(&chain, EntryPointVersion::V0_6);

        let stage = AlchemyFeeDataGetter {
            fallback: Arc::new(DefaultFeeDataGetter),
        };
        let overrides = UserOperationOverrides {
            paymaster_and_data: Some(Bytes::new()),
            ..Default::default()
        };
        let mut uo = UserOperationStruct::default();
        stage
            .apply(&ctx(&client, &account, &chain, &entry_point), &mut uo, &overrides)
            .await
            .unwrap();
        assert!(uo.max_fee_per_gas.unwrap() > 0);
    }

    #[tokio::test]
    async fn test_two_call_stage_sets_blob() {
        let mut client = MockSmartAccountClient::new();
        client
            .expect_request_paymaster_and_data()
            .withf(|params| params.policy_id == "policy-2")
            .returning(|_| {
                Ok(userop_types::paymaster::PaymasterAndData {
                    paymaster_and_data: alloy_primitives::bytes!("c0ffee"),
                })
            });
        let account = MockSmartAccount::new();
        let chain = ChainSpec::mainnet();
        let entry_point = EntryPoint::of_chain(&chain, EntryPointVersion::V0_6);

        let mut uo = UserOperationStruct::default();
        AlchemyPaymasterData::new("policy-2")
            .apply(
                &ctx(&client, &account, &chain, &entry_point),
                &mut uo,
                &Default::default(),
            )
            .await
            .unwrap();
        assert_eq!(uo.paymaster_and_data, Some(alloy_primitives::bytes!("c0ffee")));
    }
}
