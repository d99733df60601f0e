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

use alloy_sol_macro::sol;

sol!(
    /// Execution surface of SimpleAccount/LightAccount style accounts.
    /// Batch form takes parallel target/calldata arrays.
    #[allow(missing_docs)]
    #[derive(Debug, PartialEq, Eq)]
    interface IStandardExecutor {
        function execute(address dest, uint256 value, bytes func) external;

        function executeBatch(address[] dest, bytes[] func) external;
    }

    /// Execution surface of modular (ERC-6900 style) accounts. Batch form
    /// takes an array of (target, value, data) tuples.
    #[allow(missing_docs)]
    #[derive(Debug, PartialEq, Eq)]
    struct Call {
        address target;
        uint256 value;
        bytes data;
    }

    #[allow(missing_docs)]
    #[derive(Debug, PartialEq, Eq)]
    interface IModularExecutor {
        function executeBatch(Call[] calls) external;
    }
);
