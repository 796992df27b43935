// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Commands that change device state.

use super::{Command, quote};

/// Mutating commands, each acknowledged with a fixed reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionCommand {
    /// `SET VAR <ups> <var> "<value>"`, acknowledged with `OK`.
    SetVar {
        /// The UPS name.
        ups: String,
        /// The variable name.
        var: String,
        /// The new value, quoted on the wire.
        value: String,
    },
    /// `INSTCMD <ups> <cmd>`, acknowledged with `OK`.
    InstCmd {
        /// The UPS name.
        ups: String,
        /// The instant command name.
        cmd: String,
    },
    /// `FSD <ups>`, acknowledged with `OK FSD-SET`.
    ForcedShutdown {
        /// The UPS name.
        ups: String,
    },
}

impl ActionCommand {
    /// Returns the reply that signals success.
    #[must_use]
    pub const fn expected_reply(&self) -> &'static str {
        match self {
            Self::SetVar { .. } | Self::InstCmd { .. } => "OK",
            Self::ForcedShutdown { .. } => "OK FSD-SET",
        }
    }
}

impl Command for ActionCommand {
    fn encode(&self) -> String {
        match self {
            Self::SetVar { ups, var, value } => format!("SET VAR {ups} {var} {}", quote(value)),
            Self::InstCmd { ups, cmd } => format!("INSTCMD {ups} {cmd}"),
            Self::ForcedShutdown { ups } => format!("FSD {ups}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_set_var_quoted() {
        let cmd = ActionCommand::SetVar {
            ups: "su700".into(),
            var: "input.transfer.low".into(),
            value: "95".into(),
        };
        assert_eq!(cmd.encode(), "SET VAR su700 input.transfer.low \"95\"");
        assert_eq!(cmd.expected_reply(), "OK");
    }

    #[test]
    fn encodes_fsd() {
        let cmd = ActionCommand::ForcedShutdown { ups: "su700".into() };
        assert_eq!(cmd.encode(), "FSD su700");
        assert_eq!(cmd.expected_reply(), "OK FSD-SET");
    }

    #[test]
    fn encodes_instcmd() {
        let cmd = ActionCommand::InstCmd {
            ups: "su700".into(),
            cmd: "test.battery.start".into(),
        };
        assert_eq!(cmd.encode(), "INSTCMD su700 test.battery.start");
    }
}
