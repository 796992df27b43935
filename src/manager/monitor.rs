// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Orchestration of many daemons and their devices.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::DeviceRegistry;
use crate::device::{Device, DeviceId, DeviceView};
use crate::error::Error;
use crate::event::{DEFAULT_CHANNEL_CAPACITY, DeviceEvent, EventBus};
use crate::poller::Poller;
use crate::protocol::{ServerConfig, Session};

// ============================================================================
// MonitorConfig
// ============================================================================

/// The daemons to monitor.
///
/// # Examples
///
/// ```
/// use nutwatch::manager::MonitorConfig;
/// use nutwatch::protocol::ServerConfig;
///
/// let config = MonitorConfig::new()
///     .with_server(ServerConfig::new("nas.local"))
///     .with_server(ServerConfig::new("10.0.0.5").with_credentials("monuser", "secret"))
///     .with_event_capacity(1024);
/// assert_eq!(config.servers().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    servers: Vec<ServerConfig>,
    event_capacity: usize,
}

impl MonitorConfig {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            servers: Vec::new(),
            event_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    /// Adds a daemon.
    #[must_use]
    pub fn with_server(mut self, server: ServerConfig) -> Self {
        self.servers.push(server);
        self
    }

    /// Adds several daemons.
    #[must_use]
    pub fn with_servers(mut self, servers: impl IntoIterator<Item = ServerConfig>) -> Self {
        self.servers.extend(servers);
        self
    }

    /// Sets the capacity of the event bus.
    #[must_use]
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Returns the configured daemons.
    #[must_use]
    pub fn servers(&self) -> &[ServerConfig] {
        &self.servers
    }

    /// Returns the event bus capacity.
    #[must_use]
    pub fn event_capacity(&self) -> usize {
        self.event_capacity
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Fleet summary
// ============================================================================

/// Aggregate power state of all monitored devices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FleetStatus {
    /// Every device with a known state is online.
    Up,
    /// Every device with a known state is on battery.
    Down,
    /// Some devices are online and some on battery.
    Degraded,
    /// No device reports either state.
    #[default]
    Unknown,
}

impl FleetStatus {
    /// Folds one device's status into the aggregate.
    #[must_use]
    fn fold(self, online: bool, on_battery: bool) -> Self {
        match (self, online, on_battery) {
            (Self::Unknown, true, _) => Self::Up,
            (Self::Down, true, _) | (Self::Up, false, true) => Self::Degraded,
            (Self::Unknown, false, true) => Self::Down,
            (current, _, _) => current,
        }
    }
}

/// Summary of the whole fleet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FleetSummary {
    /// Aggregate status.
    pub status: FleetStatus,
    /// Sum of the power drawn by every device, in watts.
    pub total_power: i64,
    /// Number of monitored devices.
    pub devices: usize,
}

/// Outcome of [`Monitor::shutdown`].
#[derive(Debug, Default)]
pub struct ShutdownReport {
    /// Number of sessions logged out cleanly.
    pub disconnected: usize,
    /// Sessions whose logout failed, by address.
    pub failures: Vec<(String, Error)>,
}

impl ShutdownReport {
    /// Returns true if every session logged out cleanly.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

// ============================================================================
// Monitor
// ============================================================================

/// Monitors every UPS on a set of NUT daemons.
///
/// Starting the monitor connects to each daemon, discovers its devices and
/// spawns one poller per device. Consumers then read the in-memory state
/// through [`list_devices`](Self::list_devices) and
/// [`get_device`](Self::get_device), or subscribe to events.
///
/// # Examples
///
/// ```no_run
/// use nutwatch::manager::{Monitor, MonitorConfig};
/// use nutwatch::protocol::ServerConfig;
///
/// #[tokio::main]
/// async fn main() -> nutwatch::Result<()> {
///     let config = MonitorConfig::new().with_server(ServerConfig::new("192.168.1.10"));
///     let monitor = Monitor::start(config).await?;
///
///     for device in monitor.list_devices() {
///         println!("{} {}: {}", device.id, device.name, device.status);
///     }
///
///     let summary = monitor.summary();
///     println!("{:?}, {} W", summary.status, summary.total_power);
///
///     monitor.shutdown().await;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct Monitor {
    registries: Vec<DeviceRegistry>,
    order: Vec<DeviceId>,
    devices: HashMap<DeviceId, Arc<Device>>,
    events: EventBus,
    cancel: CancellationToken,
    pollers: Mutex<Vec<JoinHandle<()>>>,
}

impl Monitor {
    /// Connects to every configured daemon and starts polling.
    ///
    /// # Errors
    ///
    /// Returns `Error::NoServersConfigured` if the configuration lists no
    /// daemon. Daemons that cannot be reached are logged and skipped.
    pub async fn start(config: MonitorConfig) -> Result<Self, Error> {
        let events = EventBus::with_capacity(config.event_capacity());
        Self::start_with_events(config, events).await
    }

    /// Like [`start`](Self::start), publishing on an existing bus so that
    /// subscribers see discovery events.
    ///
    /// # Errors
    ///
    /// Returns `Error::NoServersConfigured` if the configuration lists no
    /// daemon.
    pub async fn start_with_events(config: MonitorConfig, events: EventBus) -> Result<Self, Error> {
        if config.servers().is_empty() {
            return Err(Error::NoServersConfigured);
        }

        let mut monitor = Self {
            registries: Vec::with_capacity(config.servers().len()),
            order: Vec::new(),
            devices: HashMap::new(),
            events,
            cancel: CancellationToken::new(),
            pollers: Mutex::new(Vec::new()),
        };

        for server in config.servers {
            let address = server.address();
            match connect_and_discover(server).await {
                Ok(registry) => monitor.adopt(registry),
                Err(e) => {
                    tracing::warn!(server = %address, error = %e, "Skipping NUT server");
                }
            }
        }

        if monitor.registries.is_empty() {
            tracing::warn!("No NUT server could be reached");
        }
        Ok(monitor)
    }

    fn adopt(&mut self, registry: DeviceRegistry) {
        let mut pollers = Vec::with_capacity(registry.len());
        for device in registry.devices() {
            let id = device.id();
            if let Some(existing) = self.devices.get(&id) {
                tracing::warn!(
                    device_id = %id,
                    kept = %existing.server(),
                    dropped = %device.server(),
                    "Device identifier collision across servers"
                );
                continue;
            }

            self.events.publish(DeviceEvent::DeviceDiscovered {
                device_id: id,
                name: device.name().to_string(),
                server: device.server(),
            });
            self.order.push(id);
            self.devices.insert(id, Arc::clone(device));

            let poller = Poller::new(Arc::clone(device), self.events.clone());
            pollers.push(poller.spawn(self.cancel.child_token()));
        }
        self.pollers.lock().extend(pollers);
        self.registries.push(registry);
    }

    // =========================================================================
    // Read API
    // =========================================================================

    /// Returns a snapshot of every device, in discovery order.
    #[must_use]
    pub fn list_devices(&self) -> Vec<DeviceView> {
        self.order
            .iter()
            .filter_map(|id| self.devices.get(id))
            .map(|device| device.view())
            .collect()
    }

    /// Returns a snapshot of one device.
    ///
    /// # Errors
    ///
    /// Returns `Error::DeviceNotFound` for an unknown identifier.
    pub fn get_device(&self, id: &DeviceId) -> Result<DeviceView, Error> {
        self.devices
            .get(id)
            .map(|device| device.view())
            .ok_or(Error::DeviceNotFound)
    }

    /// Returns the live device, for mutations.
    #[must_use]
    pub fn device(&self, id: &DeviceId) -> Option<Arc<Device>> {
        self.devices.get(id).cloned()
    }

    /// Returns the number of monitored devices.
    #[must_use]
    pub fn device_count(&self) -> usize {
        self.order.len()
    }

    /// Returns the sessions of every reachable daemon.
    #[must_use]
    pub fn sessions(&self) -> Vec<Arc<Session>> {
        self.registries
            .iter()
            .map(|registry| Arc::clone(registry.session()))
            .collect()
    }

    /// Aggregates the status and power of all devices.
    #[must_use]
    pub fn summary(&self) -> FleetSummary {
        let mut summary = FleetSummary::default();
        for device in self.order.iter().filter_map(|id| self.devices.get(id)) {
            let status = device.status();
            summary.status = summary
                .status
                .fold(status.is_online(), status.is_on_battery());
            summary.total_power = summary.total_power.saturating_add(device.load().power);
            summary.devices += 1;
        }
        summary
    }

    // =========================================================================
    // Subscription
    // =========================================================================

    /// Subscribes to device events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DeviceEvent> {
        self.events.subscribe()
    }

    /// Returns the event bus.
    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    // =========================================================================
    // Shutdown
    // =========================================================================

    /// Stops every poller, then logs out of every daemon.
    ///
    /// A failed logout is logged and reported but does not stop the others.
    pub async fn shutdown(&self) -> ShutdownReport {
        self.cancel.cancel();
        let pollers = std::mem::take(&mut *self.pollers.lock());
        for handle in pollers {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "Poller task ended abnormally");
            }
        }

        let mut report = ShutdownReport::default();
        for session in self.sessions() {
            let address = session.address();
            if !session.is_connected() {
                tracing::debug!(server = %address, "Session already closed");
                continue;
            }
            match session.disconnect().await {
                Ok(()) => report.disconnected += 1,
                Err(e) => {
                    tracing::error!(server = %address, error = %e, "Logout failed");
                    report.failures.push((address, e));
                }
            }
        }
        report
    }
}

async fn connect_and_discover(server: ServerConfig) -> Result<DeviceRegistry, Error> {
    let session = Arc::new(Session::connect(server).await?);
    DeviceRegistry::discover(session).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fleet_status_folding() {
        let fold = |states: &[(bool, bool)]| {
            states
                .iter()
                .fold(FleetStatus::Unknown, |acc, (ol, ob)| acc.fold(*ol, *ob))
        };

        assert_eq!(fold(&[]), FleetStatus::Unknown);
        assert_eq!(fold(&[(true, false), (true, false)]), FleetStatus::Up);
        assert_eq!(fold(&[(false, true)]), FleetStatus::Down);
        assert_eq!(fold(&[(true, false), (false, true)]), FleetStatus::Degraded);
        assert_eq!(fold(&[(false, true), (true, false)]), FleetStatus::Degraded);
        assert_eq!(fold(&[(false, false), (true, false)]), FleetStatus::Up);
        assert_eq!(fold(&[(true, false), (false, false)]), FleetStatus::Up);
    }

    #[test]
    fn degraded_is_sticky() {
        let status = FleetStatus::Degraded.fold(true, false).fold(false, true);
        assert_eq!(status, FleetStatus::Degraded);
    }

    #[test]
    fn fleet_status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&FleetStatus::Degraded).unwrap(), "\"degraded\"");
    }

    #[test]
    fn config_defaults() {
        let config = MonitorConfig::default();
        assert!(config.servers().is_empty());
        assert_eq!(config.event_capacity(), DEFAULT_CHANNEL_CAPACITY);
    }

    #[tokio::test]
    async fn empty_config_is_rejected() {
        let result = Monitor::start(MonitorConfig::new()).await;
        assert!(matches!(result, Err(Error::NoServersConfigured)));
    }
}
