// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event system for monitoring activity.
//!
//! The [`EventBus`] broadcasts [`DeviceEvent`]s (discoveries, refreshes,
//! poll failures and reconnects) to any number of subscribers.
//!
//! # Examples
//!
//! ```
//! use nutwatch::device::DeviceId;
//! use nutwatch::event::{DeviceEvent, EventBus};
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! let device_id = DeviceId::derive("nas:3493", "su700", "", "");
//! bus.publish(DeviceEvent::VariablesRefreshed { device_id, count: 12 });
//! assert_eq!(rx.try_recv().unwrap().device_id(), device_id);
//! ```

mod device_event;
mod event_bus;

pub use device_event::DeviceEvent;
pub use event_bus::{DEFAULT_CHANNEL_CAPACITY, EventBus};
