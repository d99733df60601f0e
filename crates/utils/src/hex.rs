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

//! Hex string helpers for JSON-RPC quantity and data fields.

use alloy_primitives::U256;

/// Errors produced when parsing hex quantities or data.
#[derive(Debug, thiserror::Error)]
pub enum HexError {
    /// Value is missing the `0x` prefix.
    #[error("hex value must start with 0x: {0}")]
    MissingPrefix(String),
    /// Value contains non-hex characters or is too large.
    #[error("invalid hex quantity: {0}")]
    InvalidQuantity(String),
    /// Data payload is not valid hex.
    #[error(transparent)]
    InvalidData(#[from] const_hex::FromHexError),
}

/// Concatenates hex strings byte-wise: strips every `0x` prefix and rejoins
/// the nibbles under a single `0x`.
pub fn concat_hex<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::from("0x");
    for part in parts {
        out.push_str(part.as_ref().trim_start_matches("0x"));
    }
    out
}

/// Encodes an unsigned integer as a minimal `0x`-prefixed hex quantity.
/// Zero encodes as `0x0`.
pub fn encode_quantity(value: U256) -> String {
    format!("0x{:x}", value)
}

/// Decodes a `0x`-prefixed hex quantity. Inverse of [`encode_quantity`].
pub fn decode_quantity(value: &str) -> Result<U256, HexError> {
    let digits = value
        .strip_prefix("0x")
        .ok_or_else(|| HexError::MissingPrefix(value.to_string()))?;
    if digits.is_empty() {
        return Err(HexError::InvalidQuantity(value.to_string()));
    }
    U256::from_str_radix(digits, 16).map_err(|_| HexError::InvalidQuantity(value.to_string()))
}

/// Decodes a `0x`-prefixed hex data payload into raw bytes.
pub fn decode_data(value: &str) -> Result<Vec<u8>, HexError> {
    let digits = value
        .strip_prefix("0x")
        .ok_or_else(|| HexError::MissingPrefix(value.to_string()))?;
    Ok(const_hex::decode(digits)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concat_hex() {
        assert_eq!(
            concat_hex(["0xdead", "0xbeef"]),
            "0xdeadbeef".to_string()
        );
        assert_eq!(concat_hex(["0x"]), "0x".to_string());
        assert_eq!(concat_hex(Vec::<&str>::new()), "0x".to_string());
    }

    #[test]
    fn test_quantity_round_trip() {
        for value in [
            U256::ZERO,
            U256::from(1),
            U256::from(0x59682f1eu64),
            U256::MAX,
        ] {
            let encoded = encode_quantity(value);
            assert_eq!(decode_quantity(&encoded).unwrap(), value);
        }
    }

    #[test]
    fn test_zero_encodes_as_0x0() {
        assert_eq!(encode_quantity(U256::ZERO), "0x0");
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert!(decode_quantity("1f").is_err());
        assert!(decode_quantity("0x").is_err());
        assert!(decode_quantity("0xzz").is_err());
    }
}
