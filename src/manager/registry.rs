// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Discovery of the devices behind one daemon.

use std::collections::HashMap;
use std::sync::Arc;

use crate::command::ListCommand;
use crate::device::{Device, DeviceId};
use crate::error::Error;
use crate::protocol::Session;
use crate::response::parse_ups_line;

/// The devices a daemon exposes, discovered once.
///
/// Devices are keyed by their derived identifier. If two devices derive the
/// same identifier the first one discovered is kept and the other is
/// dropped with a warning.
#[derive(Debug)]
pub struct DeviceRegistry {
    session: Arc<Session>,
    devices: Vec<Arc<Device>>,
    by_id: HashMap<DeviceId, Arc<Device>>,
}

impl DeviceRegistry {
    /// Lists the daemon's UPSes and bootstraps each one.
    ///
    /// A device that fails to bootstrap is logged and left out. If the
    /// failure cost the session its connection, one reconnect is attempted
    /// before moving on; if that fails too, discovery stops with the devices
    /// found so far.
    ///
    /// # Errors
    ///
    /// Returns an error only if `LIST UPS` itself fails. Lines that cannot be
    /// parsed are logged and skipped.
    pub async fn discover(session: Arc<Session>) -> Result<Self, Error> {
        let server = session.address();
        let lines = session.send(&ListCommand::Ups).await?.into_list()?;

        let mut entries = Vec::with_capacity(lines.len());
        for line in &lines {
            match parse_ups_line(line) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    tracing::warn!(%server, %line, error = %e, "Skipping unparseable UPS line");
                }
            }
        }

        let mut registry = Self {
            session,
            devices: Vec::with_capacity(entries.len()),
            by_id: HashMap::with_capacity(entries.len()),
        };

        for entry in entries {
            match Device::bootstrap(Arc::clone(&registry.session), &entry.name).await {
                Ok(device) => registry.insert(device),
                Err(e) => {
                    tracing::warn!(
                        %server,
                        ups = %entry.name,
                        error = %e,
                        "Excluding device that failed to bootstrap"
                    );
                    if e.is_transport()
                        && let Err(e) = registry.session.reconnect().await
                    {
                        tracing::error!(%server, error = %e, "Reconnect during discovery failed");
                        break;
                    }
                }
            }
        }

        tracing::info!(%server, devices = registry.len(), "Discovery finished");
        Ok(registry)
    }

    fn insert(&mut self, device: Device) {
        let id = device.id();
        if let Some(existing) = self.by_id.get(&id) {
            tracing::warn!(
                device_id = %id,
                kept = %existing.name(),
                dropped = %device.name(),
                "Device identifier collision"
            );
            return;
        }

        tracing::info!(
            device_id = %id,
            ups = %device.name(),
            server = %device.server(),
            "Device discovered"
        );
        let device = Arc::new(device);
        self.by_id.insert(id, Arc::clone(&device));
        self.devices.push(device);
    }

    /// Returns the session shared by all devices of this daemon.
    #[must_use]
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Returns the devices in discovery order.
    #[must_use]
    pub fn devices(&self) -> &[Arc<Device>] {
        &self.devices
    }

    /// Returns the device with the given identifier.
    #[must_use]
    pub fn get(&self, id: &DeviceId) -> Option<&Arc<Device>> {
        self.by_id.get(id)
    }

    /// Returns the number of devices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Returns true if no device was discovered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}
