// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error codes carried by `ERR` replies.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// The token following `ERR` in a daemon reply.
///
/// Codes this library does not know are preserved in [`ServerErrorCode::Other`].
///
/// # Examples
///
/// ```
/// use nutwatch::types::ServerErrorCode;
///
/// let code: ServerErrorCode = "ACCESS-DENIED".parse().unwrap();
/// assert_eq!(code, ServerErrorCode::AccessDenied);
/// assert_eq!(code.to_string(), "ACCESS-DENIED");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ServerErrorCode {
    AccessDenied,
    UnknownUps,
    VarNotSupported,
    CmdNotSupported,
    InvalidArgument,
    InstcmdFailed,
    SetFailed,
    Readonly,
    TooLong,
    FeatureNotSupported,
    FeatureNotConfigured,
    AlreadySslMode,
    DriverNotConnected,
    DataStale,
    AlreadyLoggedIn,
    InvalidPassword,
    AlreadySetPassword,
    InvalidUsername,
    AlreadySetUsername,
    UsernameRequired,
    PasswordRequired,
    UnknownCommand,
    InvalidValue,
    /// Any code not listed above.
    Other(String),
}

impl ServerErrorCode {
    /// Returns the code as transmitted.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::AccessDenied => "ACCESS-DENIED",
            Self::UnknownUps => "UNKNOWN-UPS",
            Self::VarNotSupported => "VAR-NOT-SUPPORTED",
            Self::CmdNotSupported => "CMD-NOT-SUPPORTED",
            Self::InvalidArgument => "INVALID-ARGUMENT",
            Self::InstcmdFailed => "INSTCMD-FAILED",
            Self::SetFailed => "SET-FAILED",
            Self::Readonly => "READONLY",
            Self::TooLong => "TOO-LONG",
            Self::FeatureNotSupported => "FEATURE-NOT-SUPPORTED",
            Self::FeatureNotConfigured => "FEATURE-NOT-CONFIGURED",
            Self::AlreadySslMode => "ALREADY-SSL-MODE",
            Self::DriverNotConnected => "DRIVER-NOT-CONNECTED",
            Self::DataStale => "DATA-STALE",
            Self::AlreadyLoggedIn => "ALREADY-LOGGED-IN",
            Self::InvalidPassword => "INVALID-PASSWORD",
            Self::AlreadySetPassword => "ALREADY-SET-PASSWORD",
            Self::InvalidUsername => "INVALID-USERNAME",
            Self::AlreadySetUsername => "ALREADY-SET-USERNAME",
            Self::UsernameRequired => "USERNAME-REQUIRED",
            Self::PasswordRequired => "PASSWORD-REQUIRED",
            Self::UnknownCommand => "UNKNOWN-COMMAND",
            Self::InvalidValue => "INVALID-VALUE",
            Self::Other(code) => code,
        }
    }
}

impl FromStr for ServerErrorCode {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "ACCESS-DENIED" => Self::AccessDenied,
            "UNKNOWN-UPS" => Self::UnknownUps,
            "VAR-NOT-SUPPORTED" => Self::VarNotSupported,
            "CMD-NOT-SUPPORTED" => Self::CmdNotSupported,
            "INVALID-ARGUMENT" => Self::InvalidArgument,
            "INSTCMD-FAILED" => Self::InstcmdFailed,
            "SET-FAILED" => Self::SetFailed,
            "READONLY" => Self::Readonly,
            "TOO-LONG" => Self::TooLong,
            "FEATURE-NOT-SUPPORTED" => Self::FeatureNotSupported,
            "FEATURE-NOT-CONFIGURED" => Self::FeatureNotConfigured,
            "ALREADY-SSL-MODE" => Self::AlreadySslMode,
            "DRIVER-NOT-CONNECTED" => Self::DriverNotConnected,
            "DATA-STALE" => Self::DataStale,
            "ALREADY-LOGGED-IN" => Self::AlreadyLoggedIn,
            "INVALID-PASSWORD" => Self::InvalidPassword,
            "ALREADY-SET-PASSWORD" => Self::AlreadySetPassword,
            "INVALID-USERNAME" => Self::InvalidUsername,
            "ALREADY-SET-USERNAME" => Self::AlreadySetUsername,
            "USERNAME-REQUIRED" => Self::UsernameRequired,
            "PASSWORD-REQUIRED" => Self::PasswordRequired,
            "UNKNOWN-COMMAND" => Self::UnknownCommand,
            "INVALID-VALUE" => Self::InvalidValue,
            other => Self::Other(other.to_string()),
        })
    }
}

impl From<&str> for ServerErrorCode {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(code) => code,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for ServerErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes() {
        assert_eq!(ServerErrorCode::from("UNKNOWN-UPS"), ServerErrorCode::UnknownUps);
        assert_eq!(ServerErrorCode::from("DATA-STALE"), ServerErrorCode::DataStale);
        assert_eq!(ServerErrorCode::Readonly.as_str(), "READONLY");
    }

    #[test]
    fn unknown_code_is_preserved() {
        let code = ServerErrorCode::from("SOMETHING-NEW");
        assert_eq!(code, ServerErrorCode::Other("SOMETHING-NEW".to_string()));
        assert_eq!(code.to_string(), "SOMETHING-NEW");
    }
}
