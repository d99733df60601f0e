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

//! Math utilities

/// Increases a value by a percentage
pub fn increase_by_percent(n: u128, percent: u32) -> u128 {
    n * (100 + u128::from(percent)) / 100
}

/// Takes a percentage of a value
pub fn percent(n: u128, percent: u32) -> u128 {
    n * u128::from(percent) / 100
}
