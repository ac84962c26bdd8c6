// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Syntactic checks for bridge addresses and access tokens.

use crate::error::ProtocolError;

/// Returns `true` if `address` is a dotted-quad IPv4 address.
///
/// Each of the four octets must be one to three decimal digits with a value
/// of at most 255. Leading zeros are accepted (`"010.0.0.1"`), host names and
/// ports are not.
///
/// # Examples
///
/// ```
/// use bondfan_lib::types::is_valid_ipv4;
///
/// assert!(is_valid_ipv4("192.168.1.20"));
/// assert!(!is_valid_ipv4("192.168.1.256"));
/// assert!(!is_valid_ipv4("bridge.local"));
/// ```
#[must_use]
pub fn is_valid_ipv4(address: &str) -> bool {
    let mut octets = 0;
    for part in address.split('.') {
        octets += 1;
        if part.is_empty() || part.len() > 3 || !part.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
        match part.parse::<u16>() {
            Ok(value) if value <= 255 => {}
            _ => return false,
        }
    }
    octets == 4
}

/// Checks the address and token before any network call.
///
/// # Errors
///
/// Returns `ProtocolError::InvalidAddress` if the address is not IPv4, or
/// `ProtocolError::InvalidToken` if the token is empty.
pub fn check_credentials(address: &str, token: &str) -> Result<(), ProtocolError> {
    if !is_valid_ipv4(address) {
        return Err(ProtocolError::InvalidAddress(address.to_string()));
    }
    if token.is_empty() {
        return Err(ProtocolError::InvalidToken);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_dotted_quads() {
        for addr in ["0.0.0.0", "10.0.0.1", "192.168.1.20", "255.255.255.255", "01.002.3.4"] {
            assert!(is_valid_ipv4(addr), "{addr} should be valid");
        }
    }

    #[test]
    fn rejects_malformed_addresses() {
        for addr in [
            "",
            "192.168.1",
            "192.168.1.1.1",
            "192.168.1.256",
            "192.168..1",
            "192.168.1.1:80",
            " 192.168.1.1",
            "1000.1.1.1",
            "a.b.c.d",
            "+1.1.1.1",
            "http://192.168.1.1",
        ] {
            assert!(!is_valid_ipv4(addr), "{addr:?} should be invalid");
        }
    }

    #[test]
    fn check_credentials_order() {
        assert!(matches!(
            check_credentials("nope", ""),
            Err(ProtocolError::InvalidAddress(_))
        ));
        assert!(matches!(
            check_credentials("192.168.1.2", ""),
            Err(ProtocolError::InvalidToken)
        ));
        assert!(check_credentials("192.168.1.2", "abc").is_ok());
    }
}
