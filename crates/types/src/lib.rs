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

//! Userop common types: chains, entry points, user operations and their
//! packing/hashing rules, and vendor paymaster wire types.

/// Chain identity and per-chain protocol defaults
pub mod chain;
pub use chain::{ChainSpec, Currency};

/// EIP-7702 authorization tuples
pub mod authorization;
pub use authorization::Eip7702Auth;

/// User operations, entry points, and version-specific packing
pub mod user_operation;
pub use user_operation::{
    v0_6, v0_7, EntryPoint, EntryPointVersion, GasEstimate, SendUserOperationResult,
    UserOperationCall, UserOperationOverrides, UserOperationReceipt, UserOperationRequest,
    UserOperationStruct,
};

/// Vendor paymaster RPC payloads
pub mod paymaster;
