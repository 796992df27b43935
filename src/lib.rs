// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `nutwatch` - A Rust library to monitor UPS devices through Network UPS Tools.
//!
//! This library speaks the NUT network protocol to one or more `upsd`
//! daemons, discovers the UPSes they expose and keeps each device's
//! variables fresh in the background.
//!
//! # Supported Features
//!
//! - **Sessions**: authentication, version negotiation, serialized commands,
//!   reconnect and logout
//! - **Discovery**: description, clients, instant commands and every variable
//!   with its declared type
//! - **Readings**: status, battery, load and runtime derived from variables
//! - **Control**: `SET VAR`, `INSTCMD` and `FSD`
//! - **Polling**: periodic refresh with one reconnect and one retry on failure
//! - **Events**: broadcast notifications of refreshes, failures and reconnects
//!
//! # Quick Start
//!
//! ## Monitoring a Fleet
//!
//! ```no_run
//! use nutwatch::{Monitor, MonitorConfig, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> nutwatch::Result<()> {
//!     let config = MonitorConfig::new()
//!         .with_server(ServerConfig::new("192.168.1.10"))
//!         .with_server(ServerConfig::new("nas.local").with_credentials("monuser", "secret"));
//!
//!     let monitor = Monitor::start(config).await?;
//!
//!     for ups in monitor.list_devices() {
//!         println!(
//!             "{} {}: {} ({}% battery, {} W)",
//!             ups.id, ups.name, ups.status, ups.battery.charge, ups.load.power
//!         );
//!     }
//!
//!     monitor.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Controlling a Device
//!
//! ```no_run
//! use nutwatch::{DeviceId, Monitor};
//!
//! # async fn example(monitor: &Monitor, id: DeviceId) -> nutwatch::Result<()> {
//! if let Some(ups) = monitor.device(&id) {
//!     ups.set_variable("input.transfer.low", "95").await?;
//!     ups.send_command("test.battery.start").await?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Talking to a Daemon Directly
//!
//! ```no_run
//! use std::sync::Arc;
//! use nutwatch::{Device, ServerConfig, Session};
//! use nutwatch::command::ListCommand;
//!
//! # async fn example() -> nutwatch::Result<()> {
//! let session = Arc::new(Session::connect(ServerConfig::new("localhost")).await?);
//! let names = session.send(&ListCommand::Ups).await?.into_list()?;
//! println!("{names:?}");
//!
//! let ups = Device::bootstrap(Arc::clone(&session), "su700").await?;
//! println!("{}", ups.status());
//! # Ok(())
//! # }
//! ```
//!
//! # Logging
//!
//! The library logs through [`tracing`] and installs no subscriber.

pub mod command;
pub mod device;
pub mod error;
pub mod event;
pub mod manager;
pub mod poller;
pub mod protocol;
pub mod response;
pub mod types;

pub use command::{ActionCommand, Command, GetCommand, ListCommand, SessionCommand};
pub use device::{Battery, Device, DeviceId, DeviceView, Load};
pub use error::{DeviceError, Error, ParseError, ProtocolError, Result, ValueError};
pub use event::{DeviceEvent, EventBus};
pub use manager::{DeviceRegistry, FleetStatus, FleetSummary, Monitor, MonitorConfig};
pub use poller::{PollOutcome, PollState, Poller};
pub use protocol::{ServerConfig, Session};
pub use response::Response;
pub use types::{
    DeclaredType, InstantCommand, ServerErrorCode, Status, StatusCode, Value, ValueKind, Variable,
};
