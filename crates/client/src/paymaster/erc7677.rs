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

//! ERC-7677 sponsorship: `pm_getPaymasterStubData` during estimation,
//! `pm_getPaymasterData` for the final fields.

use std::sync::{atomic::Ordering, Arc};

use userop_types::user_operation::{
    EntryPointVersion, UserOperationOverrides, UserOperationStruct,
};

use crate::{
    error::ClientError,
    middleware::{ClientMiddleware, MiddlewareContext},
    SmartAccountProvider,
};

/// Dummy-stage replacement: fetches placeholder paymaster fields sized
/// like the real ones, so gas estimation simulates the sponsored path.
/// An `isFinal` stub response raises the context's sponsorship flag.
pub struct Erc7677StubData {
    context: Option<serde_json::Value>,
}

/// Paymaster-stage replacement: fetches the final sponsorship fields,
/// unless this run's stub response declared itself final.
pub struct Erc7677PaymasterData {
    context: Option<serde_json::Value>,
}

impl Erc7677StubData {
    /// Creates the stub stage. The `context` value is forwarded verbatim
    /// as the fourth RPC parameter.
    pub fn new(context: Option<serde_json::Value>) -> Self {
        Self { context }
    }
}

impl Erc7677PaymasterData {
    /// Creates the final-data stage with the same `context` as the stub.
    pub fn new(context: Option<serde_json::Value>) -> Self {
        Self { context }
    }
}

#[async_trait::async_trait]
impl ClientMiddleware for Erc7677StubData {
    async fn apply(
        &self,
        ctx: &MiddlewareContext<'_>,
        uo: &mut UserOperationStruct,
        _overrides: &UserOperationOverrides,
    ) -> Result<(), ClientError> {
        let version = ctx.entry_point.version;

        // Gas and fee fields are estimated after this stage; the stub
        // request carries explicit zeros.
        uo.max_fee_per_gas = Some(0);
        uo.max_priority_fee_per_gas = Some(0);
        uo.call_gas_limit = Some(0);
        uo.verification_gas_limit = Some(0);
        uo.pre_verification_gas = Some(0);
        if version == EntryPointVersion::V0_7 {
            uo.paymaster_verification_gas_limit = Some(0);
            uo.paymaster_post_op_gas_limit = Some(0);
        }

        let request = uo.to_request(version);
        let stub = ctx
            .paymaster_client
            .get_paymaster_stub_data(
                &request,
                ctx.entry_point.address,
                ctx.entry_point.chain_id,
                self.context.clone(),
            )
            .await?;
        ctx.sponsorship_final
            .store(stub.is_final.unwrap_or(false), Ordering::SeqCst);

        match version {
            EntryPointVersion::V0_6 => {
                uo.paymaster_and_data = Some(
                    stub.paymaster_and_data
                        .ok_or(ClientError::MissingPaymasterField("paymasterAndData"))?,
                );
            }
            EntryPointVersion::V0_7 => {
                uo.paymaster = Some(
                    stub.paymaster
                        .ok_or(ClientError::MissingPaymasterField("paymaster"))?,
                );
                uo.paymaster_data = stub.paymaster_data;
                uo.paymaster_verification_gas_limit = stub
                    .paymaster_verification_gas_limit
                    .map(|v| v.to::<u128>());
                uo.paymaster_post_op_gas_limit =
                    stub.paymaster_post_op_gas_limit.map(|v| v.to::<u128>());
            }
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ClientMiddleware for Erc7677PaymasterData {
    async fn apply(
        &self,
        ctx: &MiddlewareContext<'_>,
        uo: &mut UserOperationStruct,
        _overrides: &UserOperationOverrides,
    ) -> Result<(), ClientError> {
        if ctx.sponsorship_final.load(Ordering::SeqCst) {
            // Stub values double as the final ones.
            return Ok(());
        }

        let version = ctx.entry_point.version;
        let request = uo.to_request(version);
        let data = ctx
            .paymaster_client
            .get_paymaster_data(
                &request,
                ctx.entry_point.address,
                ctx.entry_point.chain_id,
                self.context.clone(),
            )
            .await?;

        match version {
            EntryPointVersion::V0_6 => {
                uo.paymaster_and_data = Some(
                    data.paymaster_and_data
                        .ok_or(ClientError::MissingPaymasterField("paymasterAndData"))?,
                );
            }
            EntryPointVersion::V0_7 => {
                uo.paymaster = Some(
                    data.paymaster
                        .ok_or(ClientError::MissingPaymasterField("paymaster"))?,
                );
                uo.paymaster_data = data.paymaster_data;
                if let Some(gas) = data.paymaster_verification_gas_limit {
                    uo.paymaster_verification_gas_limit = Some(gas.to::<u128>());
                }
                if let Some(gas) = data.paymaster_post_op_gas_limit {
                    uo.paymaster_post_op_gas_limit = Some(gas.to::<u128>());
                }
            }
        }
        Ok(())
    }
}

impl SmartAccountProvider {
    /// Sponsors operations through an ERC-7677 paymaster service under
    /// the given policy.
    pub fn with_erc7677_paymaster(self, policy_id: &str) -> Self {
        let context = Some(serde_json::json!({ "policyId": policy_id }));
        self.with_dummy_paymaster_middleware(Arc::new(Erc7677StubData::new(context.clone())))
            .with_paymaster_middleware(Arc::new(Erc7677PaymasterData::new(context)))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicBool;

    use alloy_primitives::{address, bytes, U128};
    use userop_account::MockSmartAccount;
    use userop_provider::MockSmartAccountClient;
    use userop_types::{
        paymaster::{PaymasterData, PaymasterStubData},
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

    #[tokio::test]
    async fn test_stub_applies_v0_6_blob() {
        let mut client = MockSmartAccountClient::new();
        client
            .expect_get_paymaster_stub_data()
            .returning(|_, _, _, _| {
                Ok(PaymasterStubData {
                    paymaster_and_data: Some(bytes!("c0ffee")),
                    ..Default::default()
                })
            });
        let account = MockSmartAccount::new();
        let chain = ChainSpec::mainnet();
        let entry_point = EntryPoint::of_chain(&chain, EntryPointVersion::V0_6);

        let stub = Erc7677StubData::new(None);
        let mut uo = UserOperationStruct::default();
        stub.apply(
            &ctx(&client, &account, &chain, &entry_point),
            &mut uo,
            &Default::default(),
        )
        .await
        .unwrap();

        assert_eq!(uo.paymaster_and_data, Some(bytes!("c0ffee")));
        assert_eq!(uo.call_gas_limit, Some(0));
    }

    #[tokio::test]
    async fn test_stub_applies_v0_7_fields_and_final_skips_data_call() {
        let paymaster = address!("c03aac639bb21233e0139381970328db8bceeb67");
        let mut client = MockSmartAccountClient::new();
        client
            .expect_get_paymaster_stub_data()
            .returning(move |_, _, _, _| {
                Ok(PaymasterStubData {
                    paymaster: Some(paymaster),
                    paymaster_data: Some(bytes!("1234")),
                    paymaster_verification_gas_limit: Some(U128::from(777u64)),
                    paymaster_post_op_gas_limit: Some(U128::from(9u64)),
                    is_final: Some(true),
                    ..Default::default()
                })
            });
        // No expect_get_paymaster_data: a second call would panic.
        let account = MockSmartAccount::new();
        let chain = ChainSpec::mainnet();
        let entry_point = EntryPoint::of_chain(&chain, EntryPointVersion::V0_7);

        let stub = Erc7677StubData::new(None);
        let data = Erc7677PaymasterData::new(None);
        let mut uo = UserOperationStruct::default();
        let test_ctx = ctx(&client, &account, &chain, &entry_point);
        stub.apply(&test_ctx, &mut uo, &Default::default())
            .await
            .unwrap();
        data.apply(&test_ctx, &mut uo, &Default::default())
            .await
            .unwrap();

        assert_eq!(uo.paymaster, Some(paymaster));
        assert_eq!(uo.paymaster_data, Some(bytes!("1234")));
        assert_eq!(uo.paymaster_verification_gas_limit, Some(777));
        assert_eq!(uo.paymaster_post_op_gas_limit, Some(9));
    }

    #[tokio::test]
    async fn test_data_stage_fetches_final_fields() {
        let paymaster = address!("c03aac639bb21233e0139381970328db8bceeb67");
        let mut client = MockSmartAccountClient::new();
        client
            .expect_get_paymaster_stub_data()
            .returning(move |_, _, _, _| {
                Ok(PaymasterStubData {
                    paymaster: Some(paymaster),
                    paymaster_data: Some(bytes!("00")),
                    is_final: Some(false),
                    ..Default::default()
                })
            });
        client
            .expect_get_paymaster_data()
            .returning(move |_, _, _, _| {
                Ok(PaymasterData {
                    paymaster: Some(paymaster),
                    paymaster_data: Some(bytes!("deadbeef")),
                    ..Default::default()
                })
            });
        let account = MockSmartAccount::new();
        let chain = ChainSpec::mainnet();
        let entry_point = EntryPoint::of_chain(&chain, EntryPointVersion::V0_7);

        let stub = Erc7677StubData::new(None);
        let data = Erc7677PaymasterData::new(None);
        let mut uo = UserOperationStruct::default();
        let test_ctx = ctx(&client, &account, &chain, &entry_point);
        stub.apply(&test_ctx, &mut uo, &Default::default())
            .await
            .unwrap();
        data.apply(&test_ctx, &mut uo, &Default::default())
            .await
            .unwrap();

        assert_eq!(uo.paymaster_data, Some(bytes!("deadbeef")));
    }

    #[tokio::test]
    async fn test_final_hint_does_not_leak_across_runs() {
        let paymaster = address!("c03aac639bb21233e0139381970328db8bceeb67");
        let mut client = MockSmartAccountClient::new();
        client
            .expect_get_paymaster_stub_data()
            .returning(move |_, _, _, _| {
                Ok(PaymasterStubData {
                    paymaster: Some(paymaster),
                    paymaster_data: Some(bytes!("00")),
                    is_final: Some(true),
                    ..Default::default()
                })
            });
        // A later run without a final stub must still fetch real data,
        // even though the same stage objects saw `isFinal` before.
        client
            .expect_get_paymaster_data()
            .times(1)
            .returning(move |_, _, _, _| {
                Ok(PaymasterData {
                    paymaster: Some(paymaster),
                    paymaster_data: Some(bytes!("deadbeef")),
                    ..Default::default()
                })
            });
        let account = MockSmartAccount::new();
        let chain = ChainSpec::mainnet();
        let entry_point = EntryPoint::of_chain(&chain, EntryPointVersion::V0_7);

        let stub = Erc7677StubData::new(None);
        let data = Erc7677PaymasterData::new(None);

        let first = ctx(&client, &account, &chain, &entry_point);
        let mut uo = UserOperationStruct::default();
        stub.apply(&first, &mut uo, &Default::default()).await.unwrap();
        data.apply(&first, &mut uo, &Default::default()).await.unwrap();
        assert_eq!(uo.paymaster_data, Some(bytes!("00")));

        let second = ctx(&client, &account, &chain, &entry_point);
        let mut other = UserOperationStruct::default();
        data.apply(&second, &mut other, &Default::default())
            .await
            .unwrap();
        assert_eq!(other.paymaster_data, Some(bytes!("deadbeef")));
    }
}
