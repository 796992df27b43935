// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! One TCP session with a NUT daemon.
//!
//! A [`Session`] owns a single connection. The protocol has no request IDs,
//! so replies are matched to commands purely by order; every exchange
//! therefore runs under an async mutex that is held from the write until the
//! last reply line has been read.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures_util::SinkExt;
use parking_lot::RwLock;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_util::codec::Framed;

use crate::command::{Command, SessionCommand};
use crate::error::{Error, ProtocolError};
use crate::protocol::ServerConfig;
use crate::protocol::codec::{Framing, NutCodec, read_response};
use crate::response::Response;

// ============================================================================
// Connection - one dialed socket
// ============================================================================

#[derive(Debug)]
struct Connection {
    transport: Framed<TcpStream, NutCodec>,
    remote: SocketAddr,
    /// Set from the write until the reply has been read. Still set when a
    /// caller abandoned the exchange, so the stream position is unknown.
    in_flight: bool,
}

impl Connection {
    async fn open(config: &ServerConfig) -> Result<Self, ProtocolError> {
        let address = config.address();
        let dial = TcpStream::connect((config.host(), config.port()));

        let stream = match tokio::time::timeout(config.connect_timeout(), dial).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                return Err(ProtocolError::ConnectionFailed {
                    address,
                    reason: e.to_string(),
                });
            }
            Err(_) => {
                return Err(ProtocolError::ConnectionFailed {
                    address,
                    reason: format!("no answer within {:?}", config.connect_timeout()),
                });
            }
        };

        stream.set_nodelay(true)?;
        let remote = stream.peer_addr()?;

        Ok(Self {
            transport: Framed::new(stream, NutCodec::new()),
            remote,
            in_flight: false,
        })
    }

    /// Writes one command and reads its complete reply.
    async fn exchange(&mut self, line: String, timeout: Duration) -> Result<Response, ProtocolError> {
        let framing = Framing::for_command(&line);
        tracing::debug!(remote = %self.remote, command = %redacted(&line), "Sending NUT command");

        self.in_flight = true;
        self.transport.send(line).await?;
        let response = read_response(&mut self.transport, &framing, timeout).await;
        self.in_flight = false;
        let response = response?;

        tracing::debug!(remote = %self.remote, response = ?response, "Received NUT reply");
        Ok(response)
    }

    async fn close(self) {
        let remote = self.remote;
        let mut stream = self.transport.into_inner();
        if let Err(e) = stream.shutdown().await {
            tracing::debug!(%remote, error = %e, "Ignoring error while closing connection");
        }
    }
}

/// Marks the session disconnected if a [`Session::send`] future is dropped
/// mid-exchange.
struct Pending<'a> {
    connected: &'a AtomicBool,
    armed: bool,
}

impl<'a> Pending<'a> {
    fn new(connected: &'a AtomicBool) -> Self {
        Self {
            connected,
            armed: true,
        }
    }

    fn finish(mut self) {
        self.armed = false;
    }
}

impl Drop for Pending<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.connected.store(false, Ordering::Release);
        }
    }
}

/// Hides the secret of a `PASSWORD` line in logs.
fn redacted(line: &str) -> &str {
    if line.starts_with("PASSWORD") {
        "PASSWORD ****"
    } else {
        line
    }
}

// ============================================================================
// Session
// ============================================================================

#[derive(Debug, Default, Clone)]
struct ServerInfo {
    remote: Option<SocketAddr>,
    server_version: String,
    protocol_version: String,
}

/// An authenticated, version-negotiated connection to a NUT daemon.
///
/// Commands sent concurrently from several tasks are serialized: each call to
/// [`send`](Self::send) holds the connection for one full write and read.
///
/// A transport failure (I/O error, timeout, closed stream) drops the
/// connection because unread reply bytes would otherwise be mistaken for the
/// reply to the next command. So does dropping a `send` future after the
/// command went out but before its reply was read. Later calls fail with
/// [`ProtocolError::NotConnected`] until [`reconnect`](Self::reconnect)
/// succeeds.
///
/// # Examples
///
/// ```no_run
/// use nutwatch::protocol::{ServerConfig, Session};
///
/// # async fn example() -> nutwatch::Result<()> {
/// let session = Session::connect(ServerConfig::new("192.168.1.10")).await?;
/// println!("{} speaks protocol {}", session.server_version(), session.protocol_version());
///
/// let reply = session.send("LIST UPS").await?;
/// println!("{reply:?}");
///
/// session.disconnect().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Session {
    config: ServerConfig,
    connection: Mutex<Option<Connection>>,
    connected: AtomicBool,
    info: RwLock<ServerInfo>,
}

impl Session {
    /// Dials the daemon, authenticates if credentials are configured and
    /// negotiates versions.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::ConnectionFailed` if the daemon cannot be reached
    /// - `ProtocolError::AuthenticationFailed` if the credentials are refused
    /// - any protocol error raised by `VER` or `NETVER`
    pub async fn connect(config: ServerConfig) -> Result<Self, Error> {
        let (connection, info) = establish(&config).await?;

        tracing::info!(
            server = %config.address(),
            version = %info.server_version,
            protocol = %info.protocol_version,
            "NUT session established"
        );

        Ok(Self {
            config,
            connection: Mutex::new(Some(connection)),
            connected: AtomicBool::new(true),
            info: RwLock::new(info),
        })
    }

    /// Sends a command and returns its reply.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::NotConnected` if the connection was dropped
    /// - `ProtocolError::ServerRejected` if the daemon answers `ERR`
    /// - a transport error, after which the connection is dropped
    ///
    /// # Cancel safety
    ///
    /// Dropping the future after the command was written costs the
    /// connection: the session reports disconnected and later calls fail
    /// with `NotConnected` until [`reconnect`](Self::reconnect).
    pub async fn send<C>(&self, command: &C) -> Result<Response, Error>
    where
        C: Command + Sync + ?Sized,
    {
        let line = command.encode();
        let mut guard = self.connection.lock().await;
        self.discard_abandoned(&mut guard).await;
        let connection = guard.as_mut().ok_or(ProtocolError::NotConnected)?;

        let pending = Pending::new(&self.connected);
        let result = connection.exchange(line, self.config.read_timeout()).await;
        pending.finish();

        match result {
            Ok(response) => Ok(response),
            Err(e) => {
                if e.is_transport() {
                    tracing::warn!(
                        server = %self.config.address(),
                        error = %e,
                        "Dropping NUT connection after transport failure"
                    );
                    if let Some(connection) = guard.take() {
                        self.connected.store(false, Ordering::Release);
                        connection.close().await;
                    }
                }
                Err(e.into())
            }
        }
    }

    /// Replaces the connection with a freshly authenticated one.
    ///
    /// Devices already discovered stay valid; nothing is re-enumerated.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`connect`](Self::connect). On failure the
    /// session is left disconnected.
    pub async fn reconnect(&self) -> Result<(), Error> {
        let mut guard = self.connection.lock().await;
        if let Some(old) = guard.take() {
            self.connected.store(false, Ordering::Release);
            old.close().await;
        }

        let (connection, info) = establish(&self.config).await?;
        *self.info.write() = info;
        *guard = Some(connection);
        self.connected.store(true, Ordering::Release);

        tracing::info!(server = %self.config.address(), "NUT session reconnected");
        Ok(())
    }

    /// Sends `LOGOUT` and closes the connection.
    ///
    /// The connection is dropped whatever the daemon answers.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::NotConnected` if there is no connection
    /// - `ProtocolError::UnexpectedResponse` if the reply is neither
    ///   `OK Goodbye` nor `Goodbye...`
    pub async fn disconnect(&self) -> Result<(), Error> {
        let mut guard = self.connection.lock().await;
        self.discard_abandoned(&mut guard).await;
        let Some(mut connection) = guard.take() else {
            return Err(ProtocolError::NotConnected.into());
        };
        self.connected.store(false, Ordering::Release);

        let reply = connection
            .exchange(SessionCommand::Logout.encode(), self.config.read_timeout())
            .await;
        connection.close().await;

        match reply? {
            Response::Line(line) if line == "OK Goodbye" || line == "Goodbye..." => {
                tracing::info!(server = %self.config.address(), "NUT session closed");
                Ok(())
            }
            other => Err(ProtocolError::UnexpectedResponse(format!(
                "LOGOUT answered with {other:?}"
            ))
            .into()),
        }
    }

    /// Closes a connection whose last exchange was cancelled before its reply
    /// was read. The unread reply would otherwise answer the next command.
    async fn discard_abandoned(&self, slot: &mut Option<Connection>) {
        if slot.as_ref().is_some_and(|c| c.in_flight) {
            tracing::warn!(
                server = %self.config.address(),
                "Dropping NUT connection left mid-exchange by a cancelled command"
            );
            self.connected.store(false, Ordering::Release);
            if let Some(connection) = slot.take() {
                connection.close().await;
            }
        }
    }

    /// Returns the daemon's `HELP` line.
    ///
    /// # Errors
    ///
    /// Returns any error from [`send`](Self::send).
    pub async fn help(&self) -> Result<String, Error> {
        Ok(self.send(&SessionCommand::Help).await?.into_line()?)
    }

    /// Returns the configuration this session was created with.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the configured address as `host:port`.
    #[must_use]
    pub fn address(&self) -> String {
        self.config.address()
    }

    /// Returns the resolved peer address of the current connection.
    #[must_use]
    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.info.read().remote
    }

    /// Returns the reply to `VER`.
    #[must_use]
    pub fn server_version(&self) -> String {
        self.info.read().server_version.clone()
    }

    /// Returns the reply to `NETVER`.
    #[must_use]
    pub fn protocol_version(&self) -> String {
        self.info.read().protocol_version.clone()
    }

    /// Returns true while the session holds a live connection.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }
}

/// Dials, authenticates and negotiates.
async fn establish(config: &ServerConfig) -> Result<(Connection, ServerInfo), Error> {
    let mut connection = Connection::open(config).await?;
    let timeout = config.read_timeout();

    if let Some((username, password)) = config.credentials() {
        authenticate(&mut connection, SessionCommand::Username(username.to_string()), timeout)
            .await?;
        authenticate(&mut connection, SessionCommand::Password(password.to_string()), timeout)
            .await?;
    }

    let server_version = connection
        .exchange(SessionCommand::Version.encode(), timeout)
        .await?
        .into_line()?;
    let protocol_version = connection
        .exchange(SessionCommand::NetworkVersion.encode(), timeout)
        .await?
        .into_line()?;

    let info = ServerInfo {
        remote: Some(connection.remote),
        server_version,
        protocol_version,
    };
    Ok((connection, info))
}

async fn authenticate(
    connection: &mut Connection,
    command: SessionCommand,
    timeout: Duration,
) -> Result<(), ProtocolError> {
    match connection.exchange(command.encode(), timeout).await {
        Ok(Response::Line(line)) if line == "OK" => Ok(()),
        Ok(other) => Err(ProtocolError::AuthenticationFailed(format!(
            "unexpected reply {other:?}"
        ))),
        Err(ProtocolError::ServerRejected(code)) => {
            Err(ProtocolError::AuthenticationFailed(code.to_string()))
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_is_redacted() {
        assert_eq!(redacted("PASSWORD hunter2"), "PASSWORD ****");
        assert_eq!(redacted("USERNAME admin"), "USERNAME admin");
    }

    #[tokio::test]
    async fn connect_to_closed_port_fails() {
        // Bind then drop to get a port nobody listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let config = ServerConfig::new("127.0.0.1").with_port(port);
        let result = Session::connect(config).await;
        assert!(matches!(
            result,
            Err(Error::Protocol(ProtocolError::ConnectionFailed { .. }))
        ));
    }
}
