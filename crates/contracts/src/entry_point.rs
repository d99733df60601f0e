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

// Interfaces from https://github.com/eth-infinitism/account-abstraction
// Only the read/predict surface the client uses; bundle execution is the
// bundler's job, not ours.

use alloy_sol_macro::sol;

sol!(
    #[allow(missing_docs)]
    #[derive(Debug, PartialEq, Eq)]
    interface IEntryPoint {
        /// Returns the next nonce for the given sender and 192-bit key.
        function getNonce(address sender, uint192 key)
            external
            view
            returns (uint256 nonce);

        /// Computes the counterfactual sender address for `initCode`.
        ///
        /// Always reverts with `SenderAddressResult`; the address must be
        /// recovered from the revert data.
        function getSenderAddress(bytes initCode) external;

        /// Revert payload of `getSenderAddress`.
        error SenderAddressResult(address sender);
    }
);
