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

//! Signing stages, run once the rest of the pipeline has produced a
//! complete operation.

use std::sync::Arc;

use alloy_primitives::Address;
use userop_account::AccountMode;
use userop_types::user_operation::{UserOperationOverrides, UserOperationStruct};

use super::{ClientMiddleware, MiddlewareContext};
use crate::error::ClientError;

/// Signs the operation hash with the connected account.
#[derive(Debug, Default)]
pub struct DefaultUserOpSigner;

#[async_trait::async_trait]
impl ClientMiddleware for DefaultUserOpSigner {
    async fn apply(
        &self,
        ctx: &MiddlewareContext<'_>,
        uo: &mut UserOperationStruct,
        _overrides: &UserOperationOverrides,
    ) -> Result<(), ClientError> {
        let hash = uo.hash(ctx.entry_point);
        uo.signature = ctx.account.sign_user_operation_hash(hash).await?;
        Ok(())
    }
}

/// The code an EOA carries once delegated to `implementation` under
/// EIP-7702.
fn delegation_code(implementation: Address) -> [u8; 23] {
    let mut code = [0u8; 23];
    code[..3].copy_from_slice(&[0xef, 0x01, 0x00]);
    code[3..].copy_from_slice(implementation.as_slice());
    code
}

/// Signing stage for accounts that may run as EIP-7702 delegated EOAs.
/// Signs the hash as usual, then probes the sender's code: an already
/// delegated EOA needs no authorization tuple, anything else gets one
/// signed against the EOA's current transaction nonce.
pub struct Default7702UserOpSigner {
    inner: Arc<dyn ClientMiddleware>,
}

impl Default7702UserOpSigner {
    /// Wraps a signing stage.
    pub fn new(inner: Arc<dyn ClientMiddleware>) -> Self {
        Self { inner }
    }
}

impl Default for Default7702UserOpSigner {
    fn default() -> Self {
        Self::new(Arc::new(DefaultUserOpSigner))
    }
}

#[async_trait::async_trait]
impl ClientMiddleware for Default7702UserOpSigner {
    async fn apply(
        &self,
        ctx: &MiddlewareContext<'_>,
        uo: &mut UserOperationStruct,
        overrides: &UserOperationOverrides,
    ) -> Result<(), ClientError> {
        self.inner.apply(ctx, uo, overrides).await?;

        if ctx.account.mode() != AccountMode::Eip7702 {
            return Ok(());
        }

        let implementation = ctx
            .account
            .implementation_address()
            .ok_or(ClientError::Eip7702NotSupported)?;
        let sender = ctx.account.address().await?;
        let code = ctx.client.get_code(sender, None).await?;
        if code.as_ref() == delegation_code(implementation) {
            // Delegation already active on chain.
            uo.eip7702_auth = None;
            return Ok(());
        }

        let eoa_nonce = ctx.client.get_transaction_count(sender).await?;
        uo.eip7702_auth = Some(ctx.account.sign_authorization(eoa_nonce).await?);
        tracing::debug!(%sender, eoa_nonce, "attached EIP-7702 authorization");
        Ok(())
    }
}
