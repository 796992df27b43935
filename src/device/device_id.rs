// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device identifier type.

use std::fmt;
use std::str::FromStr;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE;
use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::error::ValueError;

/// Number of characters in a [`DeviceId`].
pub const DEVICE_ID_LEN: usize = 6;

/// Short, stable identifier of a UPS.
///
/// Derived from where the device lives and what it is, so the same UPS on
/// the same daemon gets the same identifier across restarts. Six characters
/// of URL-safe base64 leave room for collisions; callers that key devices by
/// identifier must handle them.
///
/// # Examples
///
/// ```
/// use nutwatch::device::DeviceId;
///
/// let id = DeviceId::derive("nas.local:3493", "su700", "0002", "051d");
/// assert_eq!(id, DeviceId::derive("nas.local:3493", "su700", "0002", "051d"));
/// assert_eq!(id.to_string().len(), 6);
///
/// let parsed: DeviceId = id.to_string().parse().unwrap();
/// assert_eq!(parsed, id);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId([u8; DEVICE_ID_LEN]);

impl DeviceId {
    /// Derives the identifier from the daemon address and the device's
    /// name, product ID and vendor ID. Empty parts contribute nothing.
    #[must_use]
    pub fn derive(server: &str, name: &str, product_id: &str, vendor_id: &str) -> Self {
        let mut hasher = Sha256::new();
        for part in [server, name, product_id, vendor_id] {
            hasher.update(part.as_bytes());
        }
        let encoded = URL_SAFE.encode(hasher.finalize());

        let mut id = [0u8; DEVICE_ID_LEN];
        id.copy_from_slice(&encoded.as_bytes()[..DEVICE_ID_LEN]);
        Self(id)
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        // Only ever built from URL-safe base64 characters.
        std::str::from_utf8(&self.0).unwrap_or_default()
    }
}

impl fmt::Debug for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeviceId({})", self.as_str())
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceId {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        let valid = bytes.len() == DEVICE_ID_LEN
            && bytes
                .iter()
                .all(|b| b.is_ascii_alphanumeric() || *b == b'-' || *b == b'_');
        if !valid {
            return Err(ValueError::InvalidDeviceId(s.to_string()));
        }

        let mut id = [0u8; DEVICE_ID_LEN];
        id.copy_from_slice(bytes);
        Ok(Self(id))
    }
}

impl Serialize for DeviceId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: (&str, &str, &str, &str) = ("192.168.1.10:3493", "su700", "0002", "051d");

    fn fixture_id() -> DeviceId {
        let (server, name, product, vendor) = FIXTURE;
        DeviceId::derive(server, name, product, vendor)
    }

    #[test]
    fn derivation_is_deterministic() {
        assert_eq!(fixture_id(), fixture_id());
    }

    #[test]
    fn has_six_url_safe_characters() {
        let id = fixture_id().to_string();
        assert_eq!(id.len(), DEVICE_ID_LEN);
        assert!(
            id.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn every_input_matters() {
        let (server, name, product, vendor) = FIXTURE;
        let base = fixture_id();
        assert_ne!(base, DeviceId::derive("192.168.1.11:3493", name, product, vendor));
        assert_ne!(base, DeviceId::derive(server, "su701", product, vendor));
        assert_ne!(base, DeviceId::derive(server, name, "0003", vendor));
        assert_ne!(base, DeviceId::derive(server, name, product, "051e"));
    }

    #[test]
    fn empty_parts_contribute_nothing() {
        assert_eq!(
            DeviceId::derive("host:3493", "ups", "", ""),
            DeviceId::derive("host:3493ups", "", "", "")
        );
    }

    #[test]
    fn display_round_trips_through_from_str() {
        let id = fixture_id();
        assert_eq!(id.to_string().parse::<DeviceId>().unwrap(), id);
        assert_eq!(id.as_str(), id.to_string());
    }

    #[test]
    fn rejects_malformed_strings() {
        assert!("abc".parse::<DeviceId>().is_err());
        assert!("abcdefg".parse::<DeviceId>().is_err());
        assert!("ab+/cd".parse::<DeviceId>().is_err());
        assert!("abc-_9".parse::<DeviceId>().is_ok());
    }

    #[test]
    fn serializes_as_string() {
        let id: DeviceId = "Ab3-_z".parse().unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"Ab3-_z\"");
    }
}
