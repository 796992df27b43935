// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Connection-level commands.

use std::fmt;

use super::{Command, word};

/// Commands that manage the session rather than a specific UPS.
///
/// # Examples
///
/// ```
/// use nutwatch::command::{Command, SessionCommand};
///
/// assert_eq!(SessionCommand::Username("upsmon".into()).encode(), "USERNAME upsmon");
/// assert_eq!(SessionCommand::NetworkVersion.encode(), "NETVER");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// `USERNAME <name>`
    Username(String),
    /// `PASSWORD <secret>`
    Password(String),
    /// `VER`: server version string.
    Version,
    /// `NETVER`: network protocol version.
    NetworkVersion,
    /// `HELP`: list of supported commands.
    Help,
    /// `LOGOUT`
    Logout,
}

impl Command for SessionCommand {
    fn encode(&self) -> String {
        match self {
            Self::Username(name) => format!("USERNAME {}", word(name)),
            Self::Password(secret) => format!("PASSWORD {}", word(secret)),
            Self::Version => "VER".to_string(),
            Self::NetworkVersion => "NETVER".to_string(),
            Self::Help => "HELP".to_string(),
            Self::Logout => "LOGOUT".to_string(),
        }
    }
}

// Keeps passwords out of logs.
impl fmt::Debug for SessionCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Username(name) => f.debug_tuple("Username").field(name).finish(),
            Self::Password(_) => f.write_str("Password(***)"),
            Self::Version => f.write_str("Version"),
            Self::NetworkVersion => f.write_str("NetworkVersion"),
            Self::Help => f.write_str("Help"),
            Self::Logout => f.write_str("Logout"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_login() {
        assert_eq!(SessionCommand::Password("s3cret".into()).encode(), "PASSWORD s3cret");
        assert_eq!(
            SessionCommand::Password("with space".into()).encode(),
            "PASSWORD \"with space\""
        );
    }

    #[test]
    fn debug_hides_password() {
        let debug = format!("{:?}", SessionCommand::Password("s3cret".into()));
        assert!(!debug.contains("s3cret"));
    }

    #[test]
    fn encodes_bare_commands() {
        assert_eq!(SessionCommand::Version.encode(), "VER");
        assert_eq!(SessionCommand::Help.encode(), "HELP");
        assert_eq!(SessionCommand::Logout.encode(), "LOGOUT");
    }
}
