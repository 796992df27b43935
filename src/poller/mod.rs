// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Background refresh of one device's variables.
//!
//! Each cycle moves through a small state machine:
//!
//! ```text
//! Idle --tick--> Polling --ok--> Idle
//!                   |
//!                 error
//!                   v
//!               Recovering --reconnect ok--> retry once --> Idle
//!                   |
//!            reconnect failed --> Idle
//! ```
//!
//! A failed cycle never stops the loop; only cancellation does.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::device::Device;
use crate::event::{DeviceEvent, EventBus};

/// Shortest interval a poller accepts.
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Where a poller is in its cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PollState {
    /// Waiting for the next tick.
    #[default]
    Idle,
    /// Fetching variables.
    Polling,
    /// Reconnecting the session and retrying after a failed fetch.
    Recovering,
}

/// Result of one poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The first fetch succeeded.
    Refreshed,
    /// The fetch failed, the session reconnected and the retry succeeded.
    Recovered,
    /// The session reconnected but the retry failed too.
    RetryFailed,
    /// The session could not be re-established.
    ReconnectFailed,
}

/// Periodically refreshes a device.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use nutwatch::device::Device;
/// use nutwatch::event::EventBus;
/// use nutwatch::poller::Poller;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example(device: Arc<Device>) {
/// let cancel = CancellationToken::new();
/// let handle = Poller::new(device, EventBus::new()).spawn(cancel.clone());
///
/// // ... later
/// cancel.cancel();
/// handle.await.ok();
/// # }
/// ```
#[derive(Debug)]
pub struct Poller {
    device: Arc<Device>,
    events: EventBus,
    state: Mutex<PollState>,
}

impl Poller {
    /// Creates a poller that publishes its outcomes on `events`.
    #[must_use]
    pub fn new(device: Arc<Device>, events: EventBus) -> Self {
        Self {
            device,
            events,
            state: Mutex::new(PollState::Idle),
        }
    }

    /// Returns the device being polled.
    #[must_use]
    pub fn device(&self) -> &Arc<Device> {
        &self.device
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> PollState {
        *self.state.lock()
    }

    fn set_state(&self, state: PollState) {
        *self.state.lock() = state;
    }

    /// Runs one refresh cycle, including recovery on failure.
    ///
    /// Recovery is one reconnect followed by at most one retry. The poller is
    /// back in [`PollState::Idle`] when this returns.
    pub async fn poll_once(&self) -> PollOutcome {
        let device_id = self.device.id();
        tracing::debug!(%device_id, ups = %self.device.name(), "Polling variables");

        self.set_state(PollState::Polling);
        let outcome = match self.device.refresh_variables().await {
            Ok(()) => {
                self.refreshed();
                PollOutcome::Refreshed
            }
            Err(e) => {
                tracing::warn!(%device_id, ups = %self.device.name(), error = %e, "Poll failed");
                self.events.publish(DeviceEvent::poll_failed(device_id, e.to_string()));
                self.set_state(PollState::Recovering);
                self.recover().await
            }
        };
        self.set_state(PollState::Idle);
        outcome
    }

    async fn recover(&self) -> PollOutcome {
        let device_id = self.device.id();

        if let Err(e) = self.device.session().reconnect().await {
            tracing::error!(
                %device_id,
                server = %self.device.server(),
                error = %e,
                "Reconnect failed"
            );
            self.events.publish(DeviceEvent::reconnect_failed(device_id, e.to_string()));
            return PollOutcome::ReconnectFailed;
        }
        self.events.publish(DeviceEvent::SessionReconnected { device_id });

        match self.device.refresh_variables().await {
            Ok(()) => {
                self.refreshed();
                PollOutcome::Recovered
            }
            Err(e) => {
                tracing::warn!(%device_id, error = %e, "Retry after reconnect failed");
                self.events.publish(DeviceEvent::poll_failed(device_id, e.to_string()));
                PollOutcome::RetryFailed
            }
        }
    }

    fn refreshed(&self) {
        self.events.publish(DeviceEvent::VariablesRefreshed {
            device_id: self.device.id(),
            count: self.device.variable_count(),
        });
    }

    /// Polls every `poll_interval` until `cancel` fires.
    ///
    /// The first refresh happens one interval after the call, since the
    /// device was just bootstrapped.
    pub async fn run(self, cancel: CancellationToken) {
        let period = self.device.poll_interval().max(MIN_POLL_INTERVAL);
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval.tick().await;

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = interval.tick() => {
                    self.poll_once().await;
                }
            }
        }

        tracing::debug!(device_id = %self.device.id(), "Poller stopped");
    }

    /// Spawns [`run`](Self::run) on the current runtime.
    #[must_use]
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }
}
