// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Hex dumps of packets on the command line

use hex::FromHexError;

#[derive(Debug, thiserror::Error, PartialEq)]
#[error("Invalid packet '{packet}': {source}")]
pub struct HexError {
    packet: String,
    #[source]
    source: FromHexError,
}

fn is_separator(c: char) -> bool {
    c.is_ascii_whitespace() || matches!(c, ':' | '-')
}

/// Decode octets written as hex digits. Separators are ignored.
pub fn decode(packet: &str) -> Result<Vec<u8>, HexError> {
    let digits: String = packet.chars().filter(|c| !is_separator(*c)).collect();
    hex::decode(digits).map_err(|source| HexError {
        packet: packet.to_string(),
        source,
    })
}

/// Encode octets as lowercase hex digits, one space between octets.
pub fn encode(data: &[u8]) -> String {
    data.iter()
        .map(|octet| hex::encode([*octet]))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::packet_hex::{decode, encode};
    use hex::FromHexError;
    use pretty_assertions::assert_eq;

    #[test]
    fn decode_with_separators() {
        assert_eq!(decode("45 00:1f-90").unwrap(), vec![0x45, 0x00, 0x1f, 0x90]);
        assert_eq!(decode("45001F90").unwrap(), vec![0x45, 0x00, 0x1f, 0x90]);
        assert_eq!(decode("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn decode_errors() {
        assert_eq!(decode("450").unwrap_err().source, FromHexError::OddLength);
        assert!(matches!(
            decode("45 zz").unwrap_err().source,
            FromHexError::InvalidHexCharacter { c: 'z', .. }
        ));
        assert_eq!(
            decode("450").unwrap_err().to_string(),
            "Invalid packet '450': Odd number of digits"
        );
    }

    #[test]
    fn encode_octets() {
        assert_eq!(encode(&[0x45, 0x00, 0xff]), "45 00 ff");
        assert_eq!(encode(&[]), "");
    }
}
