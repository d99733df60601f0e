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

#![warn(missing_docs, unreachable_pub)]
#![deny(unused_must_use, rust_2018_idioms)]

//! RPC client traits for smart account infrastructure.
//!
//! A node RPC, a bundler RPC, and an optional paymaster RPC each get their
//! own trait; [`SmartAccountClient`] bundles the three for endpoints that
//! serve all of them through one URL.

mod alloy;
pub use alloy::{new_alloy_client, AlloyNodeClient, Connection};

mod traits;
// re-export alloy RPC types used in trait signatures
pub use alloy_rpc_types_eth::{BlockId, BlockNumberOrTag, TransactionRequest};
#[cfg(feature = "test-utils")]
pub use traits::test_utils::*;
pub use traits::*;
