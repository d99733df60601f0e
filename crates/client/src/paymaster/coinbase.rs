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

//! Coinbase paymaster sponsorship via `pm_sponsorUserOperation`, which
//! returns gas limits and the v0.6 blob together.

use std::sync::Arc;

use alloy_primitives::{bytes, Bytes};
use userop_types::{
    paymaster::SponsorUserOperationParams,
    user_operation::{UserOperationOverrides, UserOperationStruct},
};

use crate::{
    error::ClientError,
    middleware::{ClientMiddleware, MiddlewareContext},
    SmartAccountProvider,
};

/// Placeholder blob used while the sponsorship call is pending.
fn dummy_paymaster_and_data() -> Bytes {
    bytes!(
        "c03aac639bb21233e0139381970328db8bceeb67fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff0000000000000000000000000000000007aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa1c"
    )
}

struct CoinbaseDummyPaymasterData;

#[async_trait::async_trait]
impl ClientMiddleware for CoinbaseDummyPaymasterData {
    async fn apply(
        &self,
        _ctx: &MiddlewareContext<'_>,
        uo: &mut UserOperationStruct,
        _overrides: &UserOperationOverrides,
    ) -> Result<(), ClientError> {
        uo.paymaster_and_data = Some(dummy_paymaster_and_data());
        Ok(())
    }
}

/// Gas stage: the sponsorship call estimates, so only caller overrides
/// are carried, everything else stays zero until the paymaster stage.
struct CoinbaseGasEstimator;

#[async_trait::async_trait]
impl ClientMiddleware for CoinbaseGasEstimator {
    async fn apply(
        &self,
        _ctx: &MiddlewareContext<'_>,
        uo: &mut UserOperationStruct,
        overrides: &UserOperationOverrides,
    ) -> Result<(), ClientError> {
        uo.call_gas_limit = Some(overrides.call_gas_limit.unwrap_or_default());
        uo.pre_verification_gas = Some(overrides.pre_verification_gas.unwrap_or_default());
        uo.verification_gas_limit = Some(overrides.verification_gas_limit.unwrap_or_default());
        Ok(())
    }
}

/// Paymaster stage: applies caller overrides, and asks the service to
/// sponsor and estimate whenever any of the four fields is not pinned.
pub struct CoinbaseSponsorship;

#[async_trait::async_trait]
impl ClientMiddleware for CoinbaseSponsorship {
    async fn apply(
        &self,
        ctx: &MiddlewareContext<'_>,
        uo: &mut UserOperationStruct,
        overrides: &UserOperationOverrides,
    ) -> Result<(), ClientError> {
        uo.call_gas_limit = overrides.call_gas_limit;
        uo.pre_verification_gas = overrides.pre_verification_gas;
        uo.verification_gas_limit = overrides.verification_gas_limit;
        uo.paymaster_and_data = Some(overrides.paymaster_and_data.clone().unwrap_or_default());

        let fully_pinned = overrides.call_gas_limit.is_some()
            && overrides.pre_verification_gas.is_some()
            && overrides.verification_gas_limit.is_some()
            && overrides.paymaster_and_data.is_some();
        if fully_pinned {
            return Ok(());
        }

        let params = SponsorUserOperationParams {
            user_operation: uo.to_request(ctx.entry_point.version),
            entry_point: ctx.entry_point.address,
        };
        let result = ctx.paymaster_client.sponsor_user_operation(&params).await?;

        uo.call_gas_limit = Some(result.call_gas_limit.to::<u128>());
        uo.pre_verification_gas = Some(result.pre_verification_gas.to::<u128>());
        uo.verification_gas_limit = Some(result.verification_gas_limit.to::<u128>());
        uo.paymaster_and_data = Some(result.paymaster_and_data);
        Ok(())
    }
}

impl SmartAccountProvider {
    /// Sponsors operations through the Coinbase paymaster.
    pub fn with_coinbase_gas_manager(self) -> Self {
        self.with_gas_estimation_middleware(Arc::new(CoinbaseGasEstimator))
            .with_dummy_paymaster_middleware(Arc::new(CoinbaseDummyPaymasterData))
            .with_paymaster_middleware(Arc::new(CoinbaseSponsorship))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicBool;

    use alloy_primitives::U128;
    use userop_account::MockSmartAccount;
    use userop_provider::MockSmartAccountClient;
    use userop_types::{
        paymaster::SponsoredUserOperation,
        user_operation::{EntryPoint, EntryPointVersion},
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

    #[tokio::test]
    async fn test_sponsorship_fills_unpinned_fields() {
        let mut client = MockSmartAccountClient::new();
        client.expect_sponsor_user_operation().returning(|_| {
            Ok(SponsoredUserOperation {
                paymaster_and_data: bytes!("c0ffee"),
                pre_verification_gas: U128::from(50_000u64),
                verification_gas_limit: U128::from(150_000u64),
                call_gas_limit: U128::from(90_000u64),
                max_fee_per_gas: U128::from(1u64),
                max_priority_fee_per_gas: U128::from(1u64),
            })
        });
        let account = MockSmartAccount::new();
        let chain = ChainSpec::base();
        let entry_point = EntryPoint::of_chain(&chain, EntryPointVersion::V0_6);

        let mut uo = UserOperationStruct::default();
        CoinbaseSponsorship
            .apply(
                &ctx(&client, &account, &chain, &entry_point),
                &mut uo,
                &Default::default(),
            )
            .await
            .unwrap();

        assert_eq!(uo.paymaster_and_data, Some(bytes!("c0ffee")));
        assert_eq!(uo.call_gas_limit, Some(90_000));
        assert_eq!(uo.verification_gas_limit, Some(150_000));
        assert_eq!(uo.pre_verification_gas, Some(50_000));
    }

    #[tokio::test]
    async fn test_fully_pinned_skips_sponsorship_call() {
        // No expectations: a sponsorship call would panic the mock.
        let client = MockSmartAccountClient::new();
        let account = MockSmartAccount::new();
        let chain = ChainSpec::base();
        let entry_point = EntryPoint::of_chain(&chain, EntryPointVersion::V0_6);

        let overrides = UserOperationOverrides {
            call_gas_limit: Some(1),
            verification_gas_limit: Some(2),
            pre_verification_gas: Some(3),
            paymaster_and_data: Some(bytes!("c0ffee")),
            ..Default::default()
        };
        let mut uo = UserOperationStruct::default();
        CoinbaseSponsorship
            .apply(&ctx(&client, &account, &chain, &entry_point), &mut uo, &overrides)
            .await
            .unwrap();

        assert_eq!(uo.call_gas_limit, Some(1));
        assert_eq!(uo.paymaster_and_data, Some(bytes!("c0ffee")));
    }

    #[tokio::test]
    async fn test_gas_estimator_zeros_unpinned() {
        let client = MockSmartAccountClient::new();
        let account = MockSmartAccount::new();
        let chain = ChainSpec::base();
        let entry_point = EntryPoint::of_chain(&chain, EntryPointVersion::V0_6);

        let overrides = UserOperationOverrides {
            call_gas_limit: Some(7),
            ..Default::default()
        };
        let mut uo = UserOperationStruct::default();
        CoinbaseGasEstimator
            .apply(&ctx(&client, &account, &chain, &entry_point), &mut uo, &overrides)
            .await
            .unwrap();

        assert_eq!(uo.call_gas_limit, Some(7));
        assert_eq!(uo.verification_gas_limit, Some(0));
        assert_eq!(uo.pre_verification_gas, Some(0));
    }
}
