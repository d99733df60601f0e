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

//! The [`SmartAccountProvider`] orchestrator: runs the middleware
//! pipeline over a connected account and talks to the bundler.

use std::{
    sync::{atomic::AtomicBool, Arc},
    time::Duration,
};

use alloy_primitives::{Address, Bytes, B256};
use rand::Rng;
use userop_account::SmartAccount;
use userop_provider::{new_alloy_client, Connection, SmartAccountClient};
use userop_types::{
    user_operation::{
        EntryPoint, EntryPointVersion, SendUserOperationResult, UserOperationCall,
        UserOperationOverrides, UserOperationReceipt, UserOperationRequest, UserOperationStruct,
    },
    ChainSpec,
};
use userop_utils::math;

use crate::{
    error::ClientError,
    middleware::{
        ClientMiddleware, Default7702GasEstimator, Default7702UserOpSigner, DefaultFeeDataGetter,
        DefaultPaymasterData, DummyPaymasterData, MiddlewareContext, OverridePaymasterData,
    },
};

/// Receipt polling behavior.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProviderOpts {
    /// Number of receipt polls before giving up.
    pub tx_max_retries: u32,
    /// Base delay between polls, in milliseconds.
    pub tx_retry_interval_ms: u64,
    /// Exponential backoff multiplier applied per attempt.
    pub tx_retry_multiplier: f64,
}

impl Default for ProviderOpts {
    fn default() -> Self {
        Self {
            tx_max_retries: 5,
            tx_retry_interval_ms: 2_000,
            tx_retry_multiplier: 1.5,
        }
    }
}

/// Backoff delay before receipt poll `attempt`, with caller-supplied
/// jitter in milliseconds.
fn retry_delay_ms(opts: &ProviderOpts, attempt: u32, jitter_ms: f64) -> u64 {
    (opts.tx_retry_interval_ms as f64 * opts.tx_retry_multiplier.powi(attempt as i32) + jitter_ms)
        as u64
}

/// Builds, sponsors, signs, and sends user operations for one connected
/// smart account.
///
/// Construction stages run in a fixed order over a
/// [`UserOperationStruct`]: dummy paymaster data, fee estimation, gas
/// estimation, then paymaster data; signing happens at send time, after
/// the completed struct passes a validity gate. Each stage can be
/// replaced through the `with_*` builders, which is how the sponsorship
/// extensions in [`crate::paymaster`] install themselves.
pub struct SmartAccountProvider {
    client: Arc<dyn SmartAccountClient>,
    paymaster_client: Option<Arc<dyn SmartAccountClient>>,
    chain: ChainSpec,
    account: Option<Arc<dyn SmartAccount>>,
    entry_point_address: Option<Address>,
    opts: ProviderOpts,
    dummy_paymaster_middleware: Arc<dyn ClientMiddleware>,
    fee_data_middleware: Arc<dyn ClientMiddleware>,
    gas_estimation_middleware: Arc<dyn ClientMiddleware>,
    paymaster_middleware: Arc<dyn ClientMiddleware>,
    signer_middleware: Arc<dyn ClientMiddleware>,
}

impl SmartAccountProvider {
    /// Creates a provider over an existing client with the default
    /// middleware stack.
    pub fn new(client: Arc<dyn SmartAccountClient>, chain: ChainSpec) -> Self {
        Self {
            client,
            paymaster_client: None,
            chain,
            account: None,
            entry_point_address: None,
            opts: ProviderOpts::default(),
            dummy_paymaster_middleware: Arc::new(DummyPaymasterData),
            fee_data_middleware: Arc::new(DefaultFeeDataGetter),
            gas_estimation_middleware: Arc::new(Default7702GasEstimator::default()),
            paymaster_middleware: Arc::new(DefaultPaymasterData),
            signer_middleware: Arc::new(Default7702UserOpSigner::default()),
        }
    }

    /// Creates a provider by opening an RPC connection.
    pub fn from_connection(connection: &Connection, chain: ChainSpec) -> anyhow::Result<Self> {
        let client = new_alloy_client(connection)?;
        Ok(Self::new(Arc::new(client), chain))
    }

    /// Binds an account to the provider. Operations are built for and
    /// signed by this account until another is connected.
    pub fn connect(mut self, account: Arc<dyn SmartAccount>) -> Self {
        self.account = Some(account);
        self
    }

    /// Whether an account is connected.
    pub fn is_connected(&self) -> bool {
        self.account.is_some()
    }

    /// Replaces the receipt polling options.
    pub fn with_opts(mut self, opts: ProviderOpts) -> Self {
        self.opts = opts;
        self
    }

    /// Overrides the entry point address while keeping the connected
    /// account's version and chain binding.
    pub fn with_entry_point_address(mut self, address: Address) -> Self {
        self.entry_point_address = Some(address);
        self
    }

    /// Routes the paymaster stages through a dedicated client, typically
    /// a sponsorship service on a different URL than the node.
    pub fn with_paymaster_client(mut self, client: Arc<dyn SmartAccountClient>) -> Self {
        self.paymaster_client = Some(client);
        self
    }

    /// Like [`Self::with_paymaster_client`], opening the connection here.
    pub fn with_paymaster_connection(self, connection: &Connection) -> anyhow::Result<Self> {
        let client = new_alloy_client(connection)?;
        Ok(self.with_paymaster_client(Arc::new(client)))
    }

    /// Replaces the dummy paymaster data stage.
    pub fn with_dummy_paymaster_middleware(
        mut self,
        middleware: Arc<dyn ClientMiddleware>,
    ) -> Self {
        self.dummy_paymaster_middleware = middleware;
        self
    }

    /// Replaces the fee estimation stage.
    pub fn with_fee_data_middleware(mut self, middleware: Arc<dyn ClientMiddleware>) -> Self {
        self.fee_data_middleware = middleware;
        self
    }

    /// Replaces the gas estimation stage.
    pub fn with_gas_estimation_middleware(mut self, middleware: Arc<dyn ClientMiddleware>) -> Self {
        self.gas_estimation_middleware = middleware;
        self
    }

    /// Replaces the paymaster data stage.
    pub fn with_paymaster_middleware(mut self, middleware: Arc<dyn ClientMiddleware>) -> Self {
        self.paymaster_middleware = middleware;
        self
    }

    /// Replaces the signing stage.
    pub fn with_user_operation_signer(mut self, middleware: Arc<dyn ClientMiddleware>) -> Self {
        self.signer_middleware = middleware;
        self
    }

    /// The chain this provider targets.
    pub fn chain(&self) -> &ChainSpec {
        &self.chain
    }

    fn account(&self) -> Result<&Arc<dyn SmartAccount>, ClientError> {
        self.account.as_ref().ok_or(ClientError::AccountNotConnected)
    }

    /// The entry point operations are sent to: the connected account's,
    /// unless the address was overridden.
    pub fn entry_point(&self) -> Result<EntryPoint, ClientError> {
        let mut entry_point = *self.account()?.entry_point();
        if let Some(address) = self.entry_point_address {
            entry_point.address = address;
        }
        Ok(entry_point)
    }

    /// The connected account's address, resolving it counterfactually if
    /// needed.
    pub async fn get_address(&self) -> Result<Address, ClientError> {
        Ok(self.account()?.address().await?)
    }

    /// Builds an unsigned operation for the given calls by running the
    /// construction stages. A single call encodes through `execute`,
    /// several through the account's batch variant.
    pub async fn build_user_operation(
        &self,
        calls: &[UserOperationCall],
        overrides: &UserOperationOverrides,
    ) -> Result<UserOperationStruct, ClientError> {
        let account = self.account()?;
        let entry_point = self.entry_point()?;

        let call_data = match calls {
            [call] => account.encode_execute(call),
            _ => account.encode_batch_execute(calls),
        };
        let mut uo = UserOperationStruct {
            sender: account.address().await?,
            nonce: account.nonce().await?,
            call_data,
            signature: account.dummy_signature(),
            ..Default::default()
        };

        let init_code = account.init_code().await?;
        match entry_point.version {
            EntryPointVersion::V0_6 => uo.init_code = Some(init_code),
            EntryPointVersion::V0_7 => {
                if !init_code.is_empty() {
                    uo.factory = account.factory_address();
                    uo.factory_data = account.factory_data().await?;
                }
            }
        }

        self.run_middleware_stack(&mut uo, overrides).await?;
        Ok(uo)
    }

    /// Builds, signs, and submits an operation to the bundler.
    pub async fn send_user_operation(
        &self,
        calls: &[UserOperationCall],
        overrides: &UserOperationOverrides,
    ) -> Result<SendUserOperationResult, ClientError> {
        let uo = self.build_user_operation(calls, overrides).await?;
        self.sign_and_send(uo, overrides).await
    }

    /// Re-submits a previously sent operation with fees raised enough to
    /// replace it in the mempool: each fee becomes the maximum of a
    /// fresh estimate and 110% of the prior value.
    pub async fn drop_and_replace_user_operation(
        &self,
        prior: &UserOperationRequest,
        overrides: &UserOperationOverrides,
    ) -> Result<SendUserOperationResult, ClientError> {
        let entry_point = self.entry_point()?;

        // Only the identity of the prior operation carries over; gas,
        // fees, and sponsorship are re-derived.
        let mut uo = UserOperationStruct {
            sender: prior.sender,
            nonce: prior.nonce,
            init_code: prior.init_code.clone(),
            factory: prior.factory,
            factory_data: prior.factory_data.clone(),
            call_data: prior.call_data.clone(),
            signature: prior.signature.clone(),
            paymaster_and_data: (entry_point.version == EntryPointVersion::V0_6)
                .then(Bytes::new),
            ..Default::default()
        };
        self.run_middleware_stack(&mut uo, overrides).await?;

        let replace_overrides = UserOperationOverrides {
            max_fee_per_gas: Some(
                uo.max_fee_per_gas
                    .unwrap_or_default()
                    .max(math::increase_by_percent(
                        prior.max_fee_per_gas.to::<u128>(),
                        10,
                    )),
            ),
            max_priority_fee_per_gas: Some(
                uo.max_priority_fee_per_gas
                    .unwrap_or_default()
                    .max(math::increase_by_percent(
                        prior.max_priority_fee_per_gas.to::<u128>(),
                        10,
                    )),
            ),
            ..overrides.clone()
        };
        self.run_middleware_stack(&mut uo, &replace_overrides).await?;
        self.sign_and_send(uo, &replace_overrides).await
    }

    /// Polls for the operation's receipt with jittered exponential
    /// backoff, per [`ProviderOpts`].
    pub async fn wait_for_user_operation_transaction(
        &self,
        hash: B256,
    ) -> Result<UserOperationReceipt, ClientError> {
        for attempt in 0..self.opts.tx_max_retries {
            let jitter = rand::thread_rng().gen_range(0.0..100.0);
            let delay = retry_delay_ms(&self.opts, attempt, jitter);
            tokio::time::sleep(Duration::from_millis(delay)).await;

            match self.client.get_user_operation_receipt(hash).await {
                Ok(Some(receipt)) => return Ok(receipt),
                Ok(None) => {}
                // Transient poll errors are retried; the last attempt's
                // error propagates.
                Err(err) if attempt + 1 < self.opts.tx_max_retries => {
                    tracing::warn!(%hash, %err, "receipt poll failed, retrying");
                }
                Err(err) => return Err(err.into()),
            }
        }
        Err(ClientError::ReceiptTimeout {
            hash,
            attempts: self.opts.tx_max_retries,
        })
    }

    async fn run_middleware_stack(
        &self,
        uo: &mut UserOperationStruct,
        overrides: &UserOperationOverrides,
    ) -> Result<(), ClientError> {
        let account = self.account()?;
        let entry_point = self.entry_point()?;
        let paymaster_client = self.paymaster_client.as_ref().unwrap_or(&self.client);
        let ctx = MiddlewareContext {
            client: self.client.as_ref(),
            paymaster_client: paymaster_client.as_ref(),
            account: account.as_ref(),
            chain: &self.chain,
            entry_point: &entry_point,
            sponsorship_final: AtomicBool::new(false),
        };

        self.dummy_paymaster_middleware.apply(&ctx, uo, overrides).await?;
        self.fee_data_middleware.apply(&ctx, uo, overrides).await?;
        self.gas_estimation_middleware.apply(&ctx, uo, overrides).await?;
        if overrides.paymaster_and_data.is_some() {
            OverridePaymasterData.apply(&ctx, uo, overrides).await?;
        } else {
            self.paymaster_middleware.apply(&ctx, uo, overrides).await?;
        }
        Ok(())
    }

    async fn sign_and_send(
        &self,
        mut uo: UserOperationStruct,
        overrides: &UserOperationOverrides,
    ) -> Result<SendUserOperationResult, ClientError> {
        let account = self.account()?;
        let entry_point = self.entry_point()?;

        if !uo.is_valid_request() {
            return Err(ClientError::InvalidRequest(format!(
                "{} in {uo:?}",
                missing_request_fields(&uo).join(", ")
            )));
        }

        let paymaster_client = self.paymaster_client.as_ref().unwrap_or(&self.client);
        let ctx = MiddlewareContext {
            client: self.client.as_ref(),
            paymaster_client: paymaster_client.as_ref(),
            account: account.as_ref(),
            chain: &self.chain,
            entry_point: &entry_point,
            sponsorship_final: AtomicBool::new(false),
        };
        self.signer_middleware.apply(&ctx, &mut uo, overrides).await?;

        let request = uo.to_request(entry_point.version);
        let hash = self
            .client
            .send_user_operation(&request, entry_point.address)
            .await?;
        tracing::debug!(%hash, sender = %request.sender, "user operation sent");
        Ok(SendUserOperationResult { hash, request })
    }
}

/// Names the required fields that are unset or zero, for error messages.
fn missing_request_fields(uo: &UserOperationStruct) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if uo.call_gas_limit.unwrap_or_default() == 0 {
        missing.push("callGasLimit");
    }
    if uo.verification_gas_limit.unwrap_or_default() == 0 {
        missing.push("verificationGasLimit");
    }
    if uo.pre_verification_gas.unwrap_or_default() == 0 {
        missing.push("preVerificationGas");
    }
    if uo.max_fee_per_gas.unwrap_or_default() == 0 {
        missing.push("maxFeePerGas");
    }
    if uo.max_priority_fee_per_gas.is_none() {
        missing.push("maxPriorityFeePerGas");
    }
    missing
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{address, b256, bytes, U128, U256};
    use userop_account::{AccountMode, MockSmartAccount};
    use userop_provider::MockSmartAccountClient;
    use userop_types::user_operation::GasEstimate;

    use super::*;

    const SENDER: Address = address!("b856DBD4fA1A79a46D426f537455e7d3E79ab7c4");

    fn test_chain() -> ChainSpec {
        ChainSpec {
            min_priority_fee_per_gas: 0,
            base_fee_buffer_percent: 50,
            priority_fee_buffer_percent: 5,
            ..ChainSpec::mainnet()
        }
    }

    fn mock_account(version: EntryPointVersion) -> MockSmartAccount {
        let chain = test_chain();
        let entry_point = EntryPoint::of_chain(&chain, version);
        let mut account = MockSmartAccount::new();
        account.expect_entry_point().return_const(entry_point);
        account.expect_mode().return_const(AccountMode::Default);
        account.expect_address().returning(|| Ok(SENDER));
        account.expect_nonce().returning(|| Ok(U256::from(3)));
        account.expect_init_code().returning(|| Ok(Bytes::new()));
        account
            .expect_dummy_signature()
            .return_const(bytes!("aaaa"));
        account
            .expect_encode_execute()
            .returning(|call| call.data.clone());
        account
            .expect_sign_user_operation_hash()
            .returning(|_| Ok(bytes!("5151ed")));
        account
    }

    fn mock_node(client: &mut MockSmartAccountClient) {
        client.expect_get_max_priority_fee().returning(|| Ok(1_000));
        client
            .expect_get_pending_base_fee()
            .returning(|| Ok(10_000));
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
    }

    #[test]
    fn test_retry_delay_backoff_bounds() {
        let opts = ProviderOpts::default();
        for attempt in 0..5u32 {
            let base = 2_000.0 * 1.5f64.powi(attempt as i32);
            assert_eq!(retry_delay_ms(&opts, attempt, 0.0), base as u64);
            let with_jitter = retry_delay_ms(&opts, attempt, 99.9);
            assert!(with_jitter >= base as u64 && with_jitter <= (base + 100.0) as u64);
        }
    }

    #[tokio::test]
    async fn test_unconnected_provider_rejects() {
        let provider =
            SmartAccountProvider::new(Arc::new(MockSmartAccountClient::new()), test_chain());
        let result = provider
            .build_user_operation(&[], &Default::default())
            .await;
        assert!(matches!(result, Err(ClientError::AccountNotConnected)));
    }

    #[tokio::test]
    async fn test_build_runs_full_pipeline() {
        let mut client = MockSmartAccountClient::new();
        mock_node(&mut client);
        let account = mock_account(EntryPointVersion::V0_6);

        let provider = SmartAccountProvider::new(Arc::new(client), test_chain())
            .connect(Arc::new(account));

        let call = UserOperationCall::new(SENDER, bytes!("deadbeef"));
        let uo = provider
            .build_user_operation(std::slice::from_ref(&call), &Default::default())
            .await
            .unwrap();

        assert_eq!(uo.sender, SENDER);
        assert_eq!(uo.nonce, U256::from(3));
        assert_eq!(uo.call_data, bytes!("deadbeef"));
        assert_eq!(uo.init_code, Some(Bytes::new()));
        assert_eq!(uo.paymaster_and_data, Some(Bytes::new()));
        assert_eq!(uo.call_gas_limit, Some(90_000));
        assert_eq!(uo.verification_gas_limit, Some(150_000));
        assert_eq!(uo.pre_verification_gas, Some(50_000));
        assert_eq!(uo.max_priority_fee_per_gas, Some(1_050));
        assert_eq!(uo.max_fee_per_gas, Some(16_050));
        assert!(uo.is_valid_request());
    }

    #[tokio::test]
    async fn test_send_signs_and_submits() {
        let hash = b256!("00000000000000000000000000000000000000000000000000000000000051ed");
        let mut client = MockSmartAccountClient::new();
        mock_node(&mut client);
        client
            .expect_send_user_operation()
            .withf(|request, _| request.signature == bytes!("5151ed"))
            .returning(move |_, _| Ok(hash));
        let account = mock_account(EntryPointVersion::V0_6);

        let provider = SmartAccountProvider::new(Arc::new(client), test_chain())
            .connect(Arc::new(account));

        let call = UserOperationCall::new(SENDER, bytes!("deadbeef"));
        let result = provider
            .send_user_operation(std::slice::from_ref(&call), &Default::default())
            .await
            .unwrap();
        assert_eq!(result.hash, hash);
        assert_eq!(result.request.signature, bytes!("5151ed"));
    }

    #[tokio::test]
    async fn test_paymaster_override_bypasses_paymaster_stage() {
        struct PanickingPaymaster;
        #[async_trait::async_trait]
        impl ClientMiddleware for PanickingPaymaster {
            async fn apply(
                &self,
                _ctx: &MiddlewareContext<'_>,
                _uo: &mut UserOperationStruct,
                _overrides: &UserOperationOverrides,
            ) -> Result<(), ClientError> {
                panic!("paymaster stage must not run when overridden");
            }
        }

        let mut client = MockSmartAccountClient::new();
        mock_node(&mut client);
        let account = mock_account(EntryPointVersion::V0_6);

        let provider = SmartAccountProvider::new(Arc::new(client), test_chain())
            .connect(Arc::new(account))
            .with_paymaster_middleware(Arc::new(PanickingPaymaster));

        let overrides = UserOperationOverrides {
            paymaster_and_data: Some(bytes!("c0ffee")),
            ..Default::default()
        };
        let call = UserOperationCall::new(SENDER, bytes!("deadbeef"));
        let uo = provider
            .build_user_operation(std::slice::from_ref(&call), &overrides)
            .await
            .unwrap();
        assert_eq!(uo.paymaster_and_data, Some(bytes!("c0ffee")));
    }

    #[tokio::test]
    async fn test_drop_and_replace_bumps_fees_over_prior() {
        let prior_fee = 1_000_000u128;
        let prior_priority = 500_000u128;

        let mut client = MockSmartAccountClient::new();
        // Fresh estimates far below the prior fees.
        mock_node(&mut client);
        client
            .expect_send_user_operation()
            .withf(move |request, _| {
                request.max_fee_per_gas == U128::from(prior_fee * 110 / 100)
                    && request.max_priority_fee_per_gas == U128::from(prior_priority * 110 / 100)
            })
            .returning(|_, _| Ok(B256::ZERO));
        let account = mock_account(EntryPointVersion::V0_6);

        let provider = SmartAccountProvider::new(Arc::new(client), test_chain())
            .connect(Arc::new(account));

        let prior = UserOperationRequest {
            sender: SENDER,
            nonce: U256::from(3),
            init_code: Some(Bytes::new()),
            call_data: bytes!("deadbeef"),
            call_gas_limit: U128::from(90_000u64),
            verification_gas_limit: U128::from(150_000u64),
            pre_verification_gas: U128::from(50_000u64),
            max_fee_per_gas: U128::from(prior_fee),
            max_priority_fee_per_gas: U128::from(prior_priority),
            paymaster_and_data: Some(Bytes::new()),
            factory: None,
            factory_data: None,
            paymaster: None,
            paymaster_verification_gas_limit: None,
            paymaster_post_op_gas_limit: None,
            paymaster_data: None,
            signature: bytes!("aaaa"),
            eip7702_auth: None,
        };
        let result = provider
            .drop_and_replace_user_operation(&prior, &Default::default())
            .await
            .unwrap();
        assert_eq!(
            result.request.max_fee_per_gas,
            U128::from(prior_fee * 110 / 100)
        );
    }

    #[tokio::test]
    async fn test_wait_times_out_after_max_retries() {
        let mut client = MockSmartAccountClient::new();
        let polls = std::sync::Arc::new(std::sync::atomic::AtomicU32::new(0));
        let counter = polls.clone();
        client.expect_get_user_operation_receipt().returning(move |_| {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(None)
        });
        let account = mock_account(EntryPointVersion::V0_6);

        let opts = ProviderOpts {
            tx_max_retries: 3,
            tx_retry_interval_ms: 1,
            tx_retry_multiplier: 1.0,
        };
        let provider = SmartAccountProvider::new(Arc::new(client), test_chain())
            .connect(Arc::new(account))
            .with_opts(opts);

        let result = provider
            .wait_for_user_operation_transaction(B256::ZERO)
            .await;
        assert!(matches!(
            result,
            Err(ClientError::ReceiptTimeout { attempts: 3, .. })
        ));
        assert_eq!(polls.load(std::sync::atomic::Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_wait_propagates_last_attempt_error() {
        let mut client = MockSmartAccountClient::new();
        client
            .expect_get_user_operation_receipt()
            .returning(|_| Err(userop_provider::ProviderError::Other(anyhow::anyhow!("node down"))));
        let account = mock_account(EntryPointVersion::V0_6);

        let opts = ProviderOpts {
            tx_max_retries: 2,
            tx_retry_interval_ms: 1,
            tx_retry_multiplier: 1.0,
        };
        let provider = SmartAccountProvider::new(Arc::new(client), test_chain())
            .connect(Arc::new(account))
            .with_opts(opts);

        let result = provider
            .wait_for_user_operation_transaction(B256::ZERO)
            .await;
        assert!(matches!(result, Err(ClientError::Provider(_))));
    }
}
