// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device event types.

use serde::Serialize;

use crate::device::DeviceId;

/// Events emitted by the monitor and its pollers.
///
/// Every event names the device it concerns. Session-level events
/// (reconnects) are reported against the device whose poller triggered them.
///
/// # Examples
///
/// ```
/// use nutwatch::device::DeviceId;
/// use nutwatch::event::DeviceEvent;
///
/// let device_id: DeviceId = "Qx8_a1".parse().unwrap();
///
/// let refreshed = DeviceEvent::VariablesRefreshed { device_id, count: 42 };
/// assert!(!refreshed.is_failure());
///
/// let failed = DeviceEvent::poll_failed(device_id, "request timed out after 5000 ms");
/// assert!(failed.is_failure());
/// assert_eq!(failed.device_id(), device_id);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeviceEvent {
    /// A device finished bootstrapping and is now monitored.
    DeviceDiscovered {
        /// The ID of the device.
        device_id: DeviceId,
        /// The UPS name on the daemon.
        name: String,
        /// The daemon address as `host:port`.
        server: String,
    },

    /// A poll replaced the device's variables.
    VariablesRefreshed {
        /// The ID of the device.
        device_id: DeviceId,
        /// Number of variables in the new snapshot.
        count: usize,
    },

    /// Fetching variables failed; the previous snapshot is kept.
    PollFailed {
        /// The ID of the device.
        device_id: DeviceId,
        /// Description of the failure.
        error: String,
    },

    /// The session was re-established after a failed poll.
    SessionReconnected {
        /// The ID of the device whose poll triggered the reconnect.
        device_id: DeviceId,
    },

    /// Re-establishing the session failed.
    ReconnectFailed {
        /// The ID of the device whose poll triggered the reconnect.
        device_id: DeviceId,
        /// Description of the failure.
        error: String,
    },
}

impl DeviceEvent {
    /// Returns the device ID associated with this event.
    #[must_use]
    pub fn device_id(&self) -> DeviceId {
        match self {
            Self::DeviceDiscovered { device_id, .. }
            | Self::VariablesRefreshed { device_id, .. }
            | Self::PollFailed { device_id, .. }
            | Self::SessionReconnected { device_id }
            | Self::ReconnectFailed { device_id, .. } => *device_id,
        }
    }

    /// Returns `true` if this event reports a failure.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::PollFailed { .. } | Self::ReconnectFailed { .. })
    }

    /// Creates a poll failure event.
    #[must_use]
    pub fn poll_failed(device_id: DeviceId, error: impl Into<String>) -> Self {
        Self::PollFailed {
            device_id,
            error: error.into(),
        }
    }

    /// Creates a reconnect failure event.
    #[must_use]
    pub fn reconnect_failed(device_id: DeviceId, error: impl Into<String>) -> Self {
        Self::ReconnectFailed {
            device_id,
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id() -> DeviceId {
        DeviceId::derive("localhost:3493", "ups", "", "")
    }

    #[test]
    fn device_id_extraction() {
        let device_id = id();

        let discovered = DeviceEvent::DeviceDiscovered {
            device_id,
            name: "ups".to_string(),
            server: "localhost:3493".to_string(),
        };
        assert_eq!(discovered.device_id(), device_id);
        assert_eq!(DeviceEvent::SessionReconnected { device_id }.device_id(), device_id);
        assert_eq!(DeviceEvent::reconnect_failed(device_id, "x").device_id(), device_id);
    }

    #[test]
    fn failure_events() {
        let device_id = id();
        assert!(DeviceEvent::poll_failed(device_id, "timeout").is_failure());
        assert!(DeviceEvent::reconnect_failed(device_id, "refused").is_failure());
        assert!(!DeviceEvent::SessionReconnected { device_id }.is_failure());
        assert!(!DeviceEvent::VariablesRefreshed { device_id, count: 1 }.is_failure());
    }

    #[test]
    fn serializes_with_type_tag() {
        let event = DeviceEvent::VariablesRefreshed {
            device_id: "abcdef".parse().unwrap(),
            count: 3,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "variables_refreshed");
        assert_eq!(json["device_id"], "abcdef");
        assert_eq!(json["count"], 3);
    }
}
