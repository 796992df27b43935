// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Read-only query commands.

use super::Command;

/// `LIST` commands, answered with a `BEGIN` / `END` framed block.
///
/// # Examples
///
/// ```
/// use nutwatch::command::{Command, ListCommand};
///
/// assert_eq!(ListCommand::Ups.encode(), "LIST UPS");
/// assert_eq!(ListCommand::Client { ups: "su700".into() }.encode(), "LIST CLIENT su700");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListCommand {
    /// `LIST UPS`: every UPS the daemon serves.
    Ups,
    /// `LIST VAR <ups>`: every variable with its value.
    Var {
        /// The UPS name.
        ups: String,
    },
    /// `LIST CMD <ups>`: supported instant commands.
    Cmd {
        /// The UPS name.
        ups: String,
    },
    /// `LIST CLIENT <ups>`: addresses of clients logged in to the UPS.
    Client {
        /// The UPS name.
        ups: String,
    },
}

impl Command for ListCommand {
    fn encode(&self) -> String {
        match self {
            Self::Ups => "LIST UPS".to_string(),
            Self::Var { ups } => format!("LIST VAR {ups}"),
            Self::Cmd { ups } => format!("LIST CMD {ups}"),
            Self::Client { ups } => format!("LIST CLIENT {ups}"),
        }
    }
}

/// `GET` commands, answered with one line echoing the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GetCommand {
    /// `GET UPSDESC <ups>`
    UpsDesc {
        /// The UPS name.
        ups: String,
    },
    /// `GET DESC <ups> <var>`
    Desc {
        /// The UPS name.
        ups: String,
        /// The variable name.
        var: String,
    },
    /// `GET CMDDESC <ups> <cmd>`
    CmdDesc {
        /// The UPS name.
        ups: String,
        /// The instant command name.
        cmd: String,
    },
    /// `GET TYPE <ups> <var>`
    Type {
        /// The UPS name.
        ups: String,
        /// The variable name.
        var: String,
    },
}

impl Command for GetCommand {
    fn encode(&self) -> String {
        match self {
            Self::UpsDesc { ups } => format!("GET UPSDESC {ups}"),
            Self::Desc { ups, var } => format!("GET DESC {ups} {var}"),
            Self::CmdDesc { ups, cmd } => format!("GET CMDDESC {ups} {cmd}"),
            Self::Type { ups, var } => format!("GET TYPE {ups} {var}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_lists() {
        assert_eq!(ListCommand::Var { ups: "a".into() }.encode(), "LIST VAR a");
        assert_eq!(ListCommand::Cmd { ups: "a".into() }.encode(), "LIST CMD a");
    }

    #[test]
    fn encodes_gets() {
        let cmd = GetCommand::Type {
            ups: "su700".into(),
            var: "input.transfer.low".into(),
        };
        assert_eq!(cmd.encode(), "GET TYPE su700 input.transfer.low");

        let cmd = GetCommand::CmdDesc {
            ups: "su700".into(),
            cmd: "load.off".into(),
        };
        assert_eq!(cmd.encode(), "GET CMDDESC su700 load.off");
    }
}
