// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Serializable snapshot of a device.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Battery, DeviceId, Load};
use crate::types::{InstantCommand, Status, Variable};

/// Point-in-time copy of everything known about a device.
///
/// This is what dashboards and other consumers render; it holds no
/// reference back to the live device.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceView {
    /// Derived identifier.
    pub id: DeviceId,
    /// UPS name on the daemon.
    pub name: String,
    /// Daemon address as `host:port`.
    pub server: String,
    /// Description from `ups.conf`.
    pub description: String,
    /// `ups.mfr`.
    pub manufacturer: String,
    /// `ups.model`.
    pub model: String,
    /// `ups.vendorid`.
    pub vendor_id: String,
    /// `ups.productid`.
    pub product_id: String,
    /// Decoded `ups.status`.
    pub status: Status,
    /// True if the status contains `OL`.
    pub online: bool,
    /// True if the status contains `OB`.
    pub on_battery: bool,
    /// Battery reading.
    pub battery: Battery,
    /// Load reading.
    pub load: Load,
    /// Remaining runtime in seconds, if reported.
    pub runtime: Option<i64>,
    /// Addresses of clients attached to the UPS.
    pub clients: Vec<String>,
    /// Supported instant commands.
    pub commands: Vec<InstantCommand>,
    /// Variables as of the last refresh.
    pub variables: Vec<Variable>,
    /// Time of the last successful variable fetch.
    pub last_refreshed: DateTime<Utc>,
}
