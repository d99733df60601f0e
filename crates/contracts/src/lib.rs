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

//! ABI bindings for the fixed set of contract calls the client needs:
//! entry point reads, account factories, and account execution functions.

#![deny(unused_must_use, rust_2018_idioms)]

/// Entry point contract interface, shared by v0.6 and v0.7.
#[allow(missing_docs)]
pub mod entry_point;

/// Account factory interfaces.
#[allow(missing_docs)]
pub mod factory;

/// Smart account execution interfaces.
#[allow(missing_docs)]
pub mod execution;

/// Entry point v0.7 packed user operation layout.
#[allow(missing_docs)]
pub mod v0_7;
