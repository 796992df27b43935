// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Connection settings for one NUT daemon.

use std::fmt;
use std::time::Duration;

// ============================================================================
// ServerConfig
// ============================================================================

/// Configuration for a NUT daemon (`upsd`).
///
/// Holds the address, optional credentials and the timing used by the
/// session and the pollers of every device the daemon exposes.
///
/// # Examples
///
/// ```
/// use nutwatch::protocol::ServerConfig;
/// use std::time::Duration;
///
/// // Anonymous, default port
/// let config = ServerConfig::new("192.168.1.10");
/// assert_eq!(config.address(), "192.168.1.10:3493");
///
/// // With all options
/// let config = ServerConfig::new("nas.local")
///     .with_port(3494)
///     .with_credentials("upsmon", "secret")
///     .with_poll_interval(Duration::from_secs(30))
///     .with_read_timeout(Duration::from_secs(2));
/// assert_eq!(config.credentials(), Some(("upsmon", "secret")));
/// ```
#[derive(Clone)]
pub struct ServerConfig {
    host: String,
    port: u16,
    credentials: Option<(String, String)>,
    poll_interval: Duration,
    read_timeout: Duration,
    connect_timeout: Duration,
}

impl ServerConfig {
    /// Default `upsd` port.
    pub const DEFAULT_PORT: u16 = 3493;
    /// Default interval between variable refreshes.
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);
    /// Default timeout for each reply line.
    pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(5);
    /// Default timeout for establishing the TCP connection.
    pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

    /// Creates a configuration for the specified host.
    ///
    /// # Arguments
    ///
    /// * `host` - Hostname or IP address of the daemon
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: Self::DEFAULT_PORT,
            credentials: None,
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            read_timeout: Self::DEFAULT_READ_TIMEOUT,
            connect_timeout: Self::DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Sets a custom port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the `USERNAME` / `PASSWORD` pair sent after connecting.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    /// Sets the interval between variable refreshes.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the timeout for each reply line.
    #[must_use]
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Sets the timeout for establishing the TCP connection.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Returns the host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the credentials if set.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        self.credentials
            .as_ref()
            .map(|(u, p)| (u.as_str(), p.as_str()))
    }

    /// Returns the poll interval.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Returns the read timeout.
    #[must_use]
    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    /// Returns the connect timeout.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Returns the configured address as `host:port`.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.credentials.as_ref().map(|(u, _)| u))
            .field("poll_interval", &self.poll_interval)
            .field("read_timeout", &self.read_timeout)
            .field("connect_timeout", &self.connect_timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ServerConfig::new("localhost");
        assert_eq!(config.port(), 3493);
        assert!(config.credentials().is_none());
        assert_eq!(config.poll_interval(), Duration::from_secs(10));
        assert_eq!(config.read_timeout(), Duration::from_secs(5));
        assert_eq!(config.connect_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn address_includes_port() {
        let config = ServerConfig::new("10.0.0.2").with_port(4000);
        assert_eq!(config.address(), "10.0.0.2:4000");
    }

    #[test]
    fn debug_hides_password() {
        let config = ServerConfig::new("h").with_credentials("admin", "hunter2");
        let debug = format!("{config:?}");
        assert!(debug.contains("admin"));
        assert!(!debug.contains("hunter2"));
    }
}
