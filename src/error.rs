// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `nutwatch` library.
//!
//! Failures are grouped by where they originate: the TCP conversation with
//! the daemon ([`ProtocolError`]), the shape of a reply ([`ParseError`]),
//! device-level semantics ([`DeviceError`]) and value validation
//! ([`ValueError`]).

use thiserror::Error;

use crate::types::ServerErrorCode;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error occurred while talking to the NUT daemon.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// A reply from the daemon could not be understood.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Error occurred during device operations.
    #[error("device error: {0}")]
    Device(#[from] DeviceError),

    /// No device with the requested identifier is known.
    #[error("device not found")]
    DeviceNotFound,

    /// The monitor was started without any daemon to talk to.
    #[error("no NUT server configured")]
    NoServersConfigured,
}

impl Error {
    /// Returns true if the error came from the transport rather than from
    /// the content of a reply.
    ///
    /// Transport failures leave the session without a usable connection, so
    /// callers use this to decide whether a reconnect is worth attempting.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Protocol(e) if e.is_transport())
    }

    /// Returns the server error code if the daemon answered with `ERR`.
    #[must_use]
    pub fn server_error(&self) -> Option<&ServerErrorCode> {
        match self {
            Self::Protocol(ProtocolError::ServerRejected(code)) => Some(code),
            _ => None,
        }
    }
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A device identifier string is not six URL-safe base64 characters.
    #[error("invalid device id: {0:?}")]
    InvalidDeviceId(String),

    /// A command argument contains characters that cannot be sent.
    #[error("invalid argument {0:?}: must be a single non-empty word")]
    InvalidArgument(String),
}

/// Errors related to the TCP conversation with a NUT daemon.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Underlying socket I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Resolving or dialing the daemon failed.
    #[error("connection to {address} failed: {reason}")]
    ConnectionFailed {
        /// The `host:port` that was dialed.
        address: String,
        /// Description of the failure.
        reason: String,
    },

    /// No reply line arrived in time.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// The daemon closed the connection while a reply was expected.
    #[error("connection closed by server")]
    ConnectionClosed,

    /// The session has no live connection (never connected or dropped after
    /// a transport failure).
    #[error("session is not connected")]
    NotConnected,

    /// `USERNAME` or `PASSWORD` was not acknowledged with `OK`.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The daemon answered with `ERR <code>`.
    #[error("server rejected command: {0}")]
    ServerRejected(ServerErrorCode),

    /// The reply did not have the shape the command calls for.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// The command text cannot be put on the wire as a single line.
    #[error("invalid command: {0:?}")]
    InvalidCommand(String),

    /// A received line exceeded the codec limit.
    #[error("response line longer than {0} bytes")]
    LineTooLong(usize),
}

impl ProtocolError {
    /// Returns true for failures that leave the connection unusable.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Io(_)
                | Self::ConnectionFailed { .. }
                | Self::Timeout(_)
                | Self::ConnectionClosed
                | Self::NotConnected
                | Self::LineTooLong(_)
        )
    }
}

/// Errors related to parsing NUT replies.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Expected field is missing from the reply.
    #[error("missing field in response: {0}")]
    MissingField(String),

    /// Unexpected reply format.
    #[error("unexpected response format: {0}")]
    UnexpectedFormat(String),

    /// Failed to parse a specific value.
    #[error("failed to parse {field}: {message}")]
    InvalidValue {
        /// The field that failed to parse.
        field: String,
        /// Description of the parsing failure.
        message: String,
    },
}

/// Errors related to device operations.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// A variable that the operation depends on is not reported by the UPS.
    #[error("variable {0} not found")]
    VariableNotFound(String),

    /// A mutating command got a reply other than the expected acknowledgement.
    #[error("command {command:?} rejected: {response}")]
    CommandRejected {
        /// The command line that was sent.
        command: String,
        /// The raw reply line.
        response: String,
    },
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_error_display() {
        let err = ValueError::InvalidDeviceId("abc".to_string());
        assert_eq!(err.to_string(), "invalid device id: \"abc\"");
    }

    #[test]
    fn error_from_protocol_error() {
        let err: Error = ProtocolError::Timeout(5000).into();
        assert!(matches!(err, Error::Protocol(ProtocolError::Timeout(5000))));
        assert!(err.is_transport());
    }

    #[test]
    fn server_rejection_is_not_transport() {
        let err: Error = ProtocolError::ServerRejected(ServerErrorCode::UnknownUps).into();
        assert!(!err.is_transport());
        assert_eq!(err.server_error(), Some(&ServerErrorCode::UnknownUps));
    }

    #[test]
    fn parse_error_display() {
        let err = ParseError::MissingField("ups.status".to_string());
        assert_eq!(err.to_string(), "missing field in response: ups.status");
    }

    #[test]
    fn device_error_display() {
        let err = DeviceError::VariableNotFound("battery.runtime".to_string());
        assert_eq!(err.to_string(), "variable battery.runtime not found");

        let err = DeviceError::CommandRejected {
            command: "FSD ups".to_string(),
            response: "OK".to_string(),
        };
        assert_eq!(err.to_string(), "command \"FSD ups\" rejected: OK");
    }
}
