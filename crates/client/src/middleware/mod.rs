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

//! Middleware stages a provider runs over a partially built user
//! operation. Stages run in a fixed order: dummy paymaster data, fee
//! estimation, gas estimation, paymaster data, and finally signing at
//! send time.

use std::sync::atomic::AtomicBool;

use userop_account::SmartAccount;
use userop_provider::SmartAccountClient;
use userop_types::{
    user_operation::{EntryPoint, UserOperationOverrides, UserOperationStruct},
    ChainSpec,
};

use crate::error::ClientError;

mod defaults;
pub use defaults::{
    Default7702GasEstimator, DefaultFeeDataGetter, DefaultGasEstimator, DefaultPaymasterData,
    DummyPaymasterData, OverridePaymasterData,
};

mod signer;
pub use signer::{Default7702UserOpSigner, DefaultUserOpSigner};

/// Everything a middleware stage can reach: the node client, the
/// sponsorship endpoint (which may be a different connection), the
/// connected account, and the chain and entry point being targeted.
pub struct MiddlewareContext<'a> {
    /// Node and bundler RPC client.
    pub client: &'a dyn SmartAccountClient,
    /// Client the paymaster stages call. Defaults to [`Self::client`]
    /// unless the provider was given a dedicated sponsorship connection.
    pub paymaster_client: &'a dyn SmartAccountClient,
    /// The connected account.
    pub account: &'a dyn SmartAccount,
    /// Chain parameters, including fee buffers.
    pub chain: &'a ChainSpec,
    /// Entry point the operation targets.
    pub entry_point: &'a EntryPoint,
    /// Set by a sponsorship stub stage whose response is already final;
    /// the paymaster stage then skips its second RPC. Scoped to one
    /// pipeline run, so concurrent builds cannot see each other's hint.
    pub sponsorship_final: AtomicBool,
}

/// One stage of the user operation pipeline. A stage reads the fields
/// earlier stages populated and the caller's overrides, and writes its
/// own fields into the struct.
#[async_trait::async_trait]
pub trait ClientMiddleware: Send + Sync {
    /// Runs the stage over the operation under construction.
    async fn apply(
        &self,
        ctx: &MiddlewareContext<'_>,
        uo: &mut UserOperationStruct,
        overrides: &UserOperationOverrides,
    ) -> Result<(), ClientError>;
}
