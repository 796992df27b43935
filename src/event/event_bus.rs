// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fan-out of poller and discovery activity.

use tokio::sync::broadcast;

use super::DeviceEvent;

/// Events a [`EventBus`] buffers per subscriber before the slowest one lags.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Where pollers and the monitor announce what happened to each UPS.
///
/// Every poller holds a clone; all clones feed the same channel. A receiver
/// only sees events published after [`subscribe`](Self::subscribe) returned,
/// so subscribe before `Monitor::start_with_events` to catch discoveries.
///
/// A receiver more than `capacity` events behind skips ahead and gets
/// `RecvError::Lagged` with the number of events it missed. Pollers never
/// wait on subscribers.
///
/// # Examples
///
/// ```
/// use nutwatch::device::DeviceId;
/// use nutwatch::event::{DeviceEvent, EventBus};
///
/// let bus = EventBus::new();
/// let mut dashboard = bus.subscribe();
///
/// let device_id: DeviceId = "Qx8_a1".parse().unwrap();
/// bus.publish(DeviceEvent::SessionReconnected { device_id });
///
/// assert_eq!(dashboard.try_recv().unwrap().device_id(), device_id);
/// ```
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<DeviceEvent>,
}

impl EventBus {
    /// Bus holding [`DEFAULT_CHANNEL_CAPACITY`] events per subscriber.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Bus holding `capacity` events per subscriber, at least one.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Opens a new receiver.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DeviceEvent> {
        self.sender.subscribe()
    }

    /// Live receivers across all clones.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Hands `event` to every live receiver; dropped when there are none.
    pub fn publish(&self, event: DeviceEvent) {
        if self.sender.send(event).is_err() {
            tracing::trace!("Event dropped, nobody is listening");
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::TryRecvError;

    use crate::device::DeviceId;

    fn su700() -> DeviceId {
        DeviceId::derive("localhost:3493", "su700", "2", "051d")
    }

    #[test]
    fn receivers_are_counted_across_clones() {
        let bus = EventBus::new();
        let poller_side = bus.clone();
        assert_eq!(bus.subscriber_count(), 0);

        let first = bus.subscribe();
        let _second = poller_side.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        drop(first);
        assert_eq!(poller_side.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn every_receiver_gets_each_event() {
        let bus = EventBus::new();
        let mut dashboard = bus.subscribe();
        let mut alerter = bus.subscribe();

        bus.publish(DeviceEvent::poll_failed(su700(), "timed out after 5000 ms"));

        for rx in [&mut dashboard, &mut alerter] {
            let event = rx.recv().await.unwrap();
            assert_eq!(event.device_id(), su700());
            assert!(event.is_failure());
        }
    }

    #[test]
    fn late_receiver_misses_earlier_events() {
        let bus = EventBus::new();
        let _early = bus.subscribe();
        bus.publish(DeviceEvent::SessionReconnected { device_id: su700() });

        let mut late = bus.subscribe();
        assert!(matches!(late.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn publishing_with_no_receivers_is_harmless() {
        let bus = EventBus::with_capacity(4);
        bus.publish(DeviceEvent::SessionReconnected { device_id: su700() });
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn slow_receiver_lags() {
        let bus = EventBus::with_capacity(2);
        let mut rx = bus.subscribe();
        for count in 0..4 {
            bus.publish(DeviceEvent::VariablesRefreshed { device_id: su700(), count });
        }

        assert!(matches!(rx.try_recv(), Err(TryRecvError::Lagged(2))));
        assert!(matches!(
            rx.try_recv(),
            Ok(DeviceEvent::VariablesRefreshed { count: 2, .. })
        ));
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let bus = EventBus::with_capacity(0);
        let mut rx = bus.subscribe();
        bus.publish(DeviceEvent::SessionReconnected { device_id: su700() });
        assert!(rx.try_recv().is_ok());
    }
}
