// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A single UPS exposed by a NUT daemon.
//!
//! A [`Device`] is created by bootstrapping: it asks the daemon for the
//! description, attached clients, supported instant commands and every
//! variable with its description and type. After that only the variables
//! change, replaced wholesale on each [`Device::refresh_variables`].
//!
//! Derived readings ([`Device::status`], [`Device::battery`],
//! [`Device::load`], [`Device::runtime`]) are computed from the current
//! snapshot on each call.
//!
//! ```no_run
//! use std::sync::Arc;
//! use nutwatch::device::Device;
//! use nutwatch::protocol::{ServerConfig, Session};
//!
//! # async fn example() -> nutwatch::Result<()> {
//! let session = Arc::new(Session::connect(ServerConfig::new("192.168.1.10")).await?);
//! let device = Device::bootstrap(session, "su700").await?;
//!
//! println!("{} ({}): {}", device.name(), device.id(), device.status());
//! device.send_command("test.battery.start").await?;
//! # Ok(())
//! # }
//! ```

mod device_id;
mod readings;
mod view;

pub use device_id::{DEVICE_ID_LEN, DeviceId};
pub use readings::{Battery, Load};
pub use view::DeviceView;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::command::{ActionCommand, Command, GetCommand, ListCommand};
use crate::error::{DeviceError, Error, ValueError};
use crate::protocol::Session;
use crate::response::{
    Response, parse_client_line, parse_cmd_line, parse_command_description, parse_type_info,
    parse_ups_description, parse_var_line, parse_variable_description,
};
use crate::types::{InstantCommand, Status, Variable};

#[derive(Debug)]
struct Snapshot {
    variables: Vec<Variable>,
    refreshed_at: DateTime<Utc>,
}

/// A UPS on a NUT daemon.
///
/// Devices are shared (`Arc<Device>`) between the registry, the poller and
/// consumers. All commands go through the daemon's [`Session`].
#[derive(Debug)]
pub struct Device {
    id: DeviceId,
    name: String,
    description: String,
    manufacturer: String,
    model: String,
    vendor_id: String,
    product_id: String,
    clients: Vec<String>,
    commands: Vec<InstantCommand>,
    session: Arc<Session>,
    snapshot: RwLock<Snapshot>,
}

impl Device {
    /// Fetches everything about the UPS called `name` and derives its
    /// identifier.
    ///
    /// # Errors
    ///
    /// Returns the first protocol or parse error; a device that fails to
    /// bootstrap is unusable.
    pub async fn bootstrap(session: Arc<Session>, name: &str) -> Result<Self, Error> {
        let ups = name.to_string();

        let line = session
            .send(&GetCommand::UpsDesc { ups: ups.clone() })
            .await?
            .into_line()?;
        let description = parse_ups_description(name, &line)?;

        let clients = session
            .send(&ListCommand::Client { ups: ups.clone() })
            .await?
            .into_list()?
            .iter()
            .map(|line| parse_client_line(name, line))
            .collect::<Result<Vec<_>, _>>()?;

        let commands = fetch_commands(&session, name).await?;
        let variables = fetch_variables(&session, name).await?;

        let text = |var: &str| {
            variables
                .iter()
                .find(|v| v.name() == var)
                .map(|v| v.value().to_string())
                .unwrap_or_default()
        };
        let manufacturer = text("ups.mfr");
        let model = text("ups.model");
        let vendor_id = text("ups.vendorid");
        let product_id = text("ups.productid");

        let id = DeviceId::derive(&session.address(), name, &product_id, &vendor_id);

        tracing::debug!(
            %id,
            ups = %name,
            variables = variables.len(),
            commands = commands.len(),
            "Device bootstrapped"
        );

        Ok(Self {
            id,
            name: ups,
            description,
            manufacturer,
            model,
            vendor_id,
            product_id,
            clients,
            commands,
            session,
            snapshot: RwLock::new(Snapshot {
                variables,
                refreshed_at: Utc::now(),
            }),
        })
    }

    // ========== Identity ==========

    /// Returns the derived identifier.
    #[must_use]
    pub fn id(&self) -> DeviceId {
        self.id
    }

    /// Returns the UPS name on the daemon.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description from `ups.conf`.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns `ups.mfr` as of bootstrap.
    #[must_use]
    pub fn manufacturer(&self) -> &str {
        &self.manufacturer
    }

    /// Returns `ups.model` as of bootstrap.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns `ups.vendorid` as of bootstrap.
    #[must_use]
    pub fn vendor_id(&self) -> &str {
        &self.vendor_id
    }

    /// Returns `ups.productid` as of bootstrap.
    #[must_use]
    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    /// Returns the daemon address as `host:port`.
    #[must_use]
    pub fn server(&self) -> String {
        self.session.address()
    }

    /// Returns the interval at which the poller refreshes this device.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        self.session.config().poll_interval()
    }

    /// Returns the session this device talks through.
    #[must_use]
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Returns the client addresses seen at bootstrap.
    #[must_use]
    pub fn clients(&self) -> &[String] {
        &self.clients
    }

    /// Returns the supported instant commands.
    #[must_use]
    pub fn commands(&self) -> &[InstantCommand] {
        &self.commands
    }

    // ========== Variables ==========

    /// Fetches all variables and replaces the snapshot.
    ///
    /// On error the previous snapshot is kept.
    ///
    /// # Errors
    ///
    /// Returns the first protocol or parse error.
    pub async fn refresh_variables(&self) -> Result<(), Error> {
        let variables = fetch_variables(&self.session, &self.name).await?;
        let mut snapshot = self.snapshot.write();
        snapshot.variables = variables;
        snapshot.refreshed_at = Utc::now();
        Ok(())
    }

    /// Returns a copy of the current variables, in the order the daemon
    /// listed them.
    #[must_use]
    pub fn variables(&self) -> Vec<Variable> {
        self.snapshot.read().variables.clone()
    }

    /// Returns the number of variables in the current snapshot.
    #[must_use]
    pub fn variable_count(&self) -> usize {
        self.snapshot.read().variables.len()
    }

    /// Returns one variable by name.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::VariableNotFound` if the UPS does not report it.
    pub fn variable(&self, name: &str) -> Result<Variable, DeviceError> {
        self.snapshot
            .read()
            .variables
            .iter()
            .find(|v| v.name() == name)
            .cloned()
            .ok_or_else(|| DeviceError::VariableNotFound(name.to_string()))
    }

    /// Returns the time of the last successful variable fetch.
    #[must_use]
    pub fn last_refreshed(&self) -> DateTime<Utc> {
        self.snapshot.read().refreshed_at
    }

    // ========== Readings ==========

    /// Returns the decoded `ups.status`.
    #[must_use]
    pub fn status(&self) -> Status {
        readings::status(&self.snapshot.read().variables)
    }

    /// Returns the battery reading.
    #[must_use]
    pub fn battery(&self) -> Battery {
        readings::battery(&self.snapshot.read().variables)
    }

    /// Returns the load reading.
    #[must_use]
    pub fn load(&self) -> Load {
        readings::load(&self.snapshot.read().variables)
    }

    /// Returns `battery.runtime` in seconds.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::VariableNotFound` if the UPS does not report it.
    pub fn runtime(&self) -> Result<i64, DeviceError> {
        readings::runtime(&self.snapshot.read().variables)
    }

    /// Returns a serializable snapshot of the device.
    #[must_use]
    pub fn view(&self) -> DeviceView {
        let snapshot = self.snapshot.read();
        let status = readings::status(&snapshot.variables);

        DeviceView {
            id: self.id,
            name: self.name.clone(),
            server: self.server(),
            description: self.description.clone(),
            manufacturer: self.manufacturer.clone(),
            model: self.model.clone(),
            vendor_id: self.vendor_id.clone(),
            product_id: self.product_id.clone(),
            online: status.is_online(),
            on_battery: status.is_on_battery(),
            status,
            battery: readings::battery(&snapshot.variables),
            load: readings::load(&snapshot.variables),
            runtime: readings::runtime(&snapshot.variables).ok(),
            clients: self.clients.clone(),
            commands: self.commands.clone(),
            variables: snapshot.variables.clone(),
            last_refreshed: snapshot.refreshed_at,
        }
    }

    // ========== Mutations ==========

    /// Sets a writeable variable.
    ///
    /// # Errors
    ///
    /// - `ValueError::InvalidArgument` if `variable` is not a single word
    /// - `ProtocolError::ServerRejected` if the daemon answers `ERR`
    /// - `DeviceError::CommandRejected` for any reply other than `OK`
    pub async fn set_variable(&self, variable: &str, value: &str) -> Result<(), Error> {
        let command = ActionCommand::SetVar {
            ups: self.name.clone(),
            var: single_word(variable)?,
            value: value.to_string(),
        };
        self.perform(command).await
    }

    /// Runs an instant command such as `test.battery.start`.
    ///
    /// # Errors
    ///
    /// - `ValueError::InvalidArgument` if `command` is not a single word
    /// - `ProtocolError::ServerRejected` if the daemon answers `ERR`
    /// - `DeviceError::CommandRejected` for any reply other than `OK`
    pub async fn send_command(&self, command: &str) -> Result<(), Error> {
        let command = ActionCommand::InstCmd {
            ups: self.name.clone(),
            cmd: single_word(command)?,
        };
        self.perform(command).await
    }

    /// Sets the forced shutdown flag on the UPS.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::ServerRejected` if the daemon answers `ERR`
    /// - `DeviceError::CommandRejected` for any reply other than `OK FSD-SET`
    pub async fn force_shutdown(&self) -> Result<(), Error> {
        let command = ActionCommand::ForcedShutdown {
            ups: self.name.clone(),
        };
        self.perform(command).await
    }

    async fn perform(&self, command: ActionCommand) -> Result<(), Error> {
        match self.session.send(&command).await? {
            Response::Line(line) if line == command.expected_reply() => {
                tracing::info!(
                    device_id = %self.id,
                    ups = %self.name,
                    command = %command.encode(),
                    "Command accepted"
                );
                Ok(())
            }
            Response::Line(line) => Err(DeviceError::CommandRejected {
                command: command.encode(),
                response: line,
            }
            .into()),
            Response::List(lines) => Err(DeviceError::CommandRejected {
                command: command.encode(),
                response: lines.join("\n"),
            }
            .into()),
        }
    }
}

/// Accepts names that can go on the wire unquoted.
fn single_word(name: &str) -> Result<String, ValueError> {
    if name.is_empty() || name.chars().any(|c| c.is_whitespace() || c == '"' || c == '\\') {
        Err(ValueError::InvalidArgument(name.to_string()))
    } else {
        Ok(name.to_string())
    }
}

async fn fetch_commands(session: &Session, name: &str) -> Result<Vec<InstantCommand>, Error> {
    let lines = session
        .send(&ListCommand::Cmd {
            ups: name.to_string(),
        })
        .await?
        .into_list()?;

    let mut commands = Vec::with_capacity(lines.len());
    for line in lines {
        let cmd = parse_cmd_line(name, &line)?;
        let reply = session
            .send(&GetCommand::CmdDesc {
                ups: name.to_string(),
                cmd: cmd.clone(),
            })
            .await?
            .into_line()?;
        let description = parse_command_description(name, &cmd, &reply)?;
        commands.push(InstantCommand {
            name: cmd,
            description,
        });
    }
    Ok(commands)
}

/// Lists variables, then asks for each one's description and type.
async fn fetch_variables(session: &Session, name: &str) -> Result<Vec<Variable>, Error> {
    let lines = session
        .send(&ListCommand::Var {
            ups: name.to_string(),
        })
        .await?
        .into_list()?;

    let mut variables = Vec::with_capacity(lines.len());
    for line in lines {
        let entry = match parse_var_line(name, &line) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(ups = %name, line = %line, error = %e, "Skipping unparseable variable");
                continue;
            }
        };

        let reply = session
            .send(&GetCommand::Desc {
                ups: name.to_string(),
                var: entry.name.clone(),
            })
            .await?
            .into_line()?;
        let description = parse_variable_description(name, &entry.name, &reply)?;

        let reply = session
            .send(&GetCommand::Type {
                ups: name.to_string(),
                var: entry.name.clone(),
            })
            .await?
            .into_line()?;
        let type_info = parse_type_info(name, &entry.name, &reply)?;

        variables.push(
            Variable::new(entry.name, entry.value)
                .with_description(description)
                .with_type_info(type_info),
        );
    }
    Ok(variables)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_word_validation() {
        assert_eq!(single_word("load.off").unwrap(), "load.off");
        assert!(single_word("").is_err());
        assert!(single_word("load off").is_err());
        assert!(single_word("a\"b").is_err());
    }
}
