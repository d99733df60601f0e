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
    #[allow(missing_docs)]
    #[derive(Debug, PartialEq, Eq)]
    interface ISimpleAccountFactory {
        function createAccount(address owner, uint256 salt)
            external
            returns (address account);
    }

    #[allow(missing_docs)]
    #[derive(Debug, PartialEq, Eq)]
    interface ISemiModularAccountFactory {
        function createSemiModularAccount(address owner, uint256 salt)
            external
            returns (address account);
    }
);
