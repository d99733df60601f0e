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

//! Smart contract account abstractions.
//!
//! Each account type knows its factory, its execute-call encoding, its
//! dummy signature, and how its owner signs operation hashes. Addresses
//! are resolved counterfactually through the entry point, so an account
//! is usable before it is deployed.

mod base;

mod error;
pub use error::AccountError;

mod traits;
#[cfg(feature = "test-utils")]
pub use traits::MockSmartAccount;
pub use traits::{AccountMode, SmartAccount};

mod simple;
pub use simple::SimpleAccount;

mod light;
pub use light::LightAccount;

mod modular_v2;
pub use modular_v2::{build_full_nonce_key, ModularAccountV2};
