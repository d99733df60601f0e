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

//! High-level ERC-4337 client: builds user operations through a
//! middleware pipeline, signs them with a connected smart account, and
//! submits them to a bundler. Sponsorship is layered in through
//! replaceable paymaster stages.

mod error;
pub use error::ClientError;

/// Pipeline stages and their default implementations
pub mod middleware;
pub use middleware::{ClientMiddleware, MiddlewareContext};

mod provider;
pub use provider::{ProviderOpts, SmartAccountProvider};

/// Sponsorship extensions: ERC-7677 and vendor gas managers
pub mod paymaster;
