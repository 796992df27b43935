// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Line codec and reply framing for the NUT network protocol.
//!
//! Every command is one `\n`-terminated line. How much to read back depends
//! on the command:
//!
//! ```text
//! USERNAME / PASSWORD / SET   -> lines until "OK"
//! LIST <what>                 -> "BEGIN LIST <what>" ... "END LIST <what>"
//! anything else               -> exactly one line
//! ```
//!
//! A first line starting with `ERR ` is always a failure.

use std::time::Duration;

use bytes::BytesMut;
use futures_util::{Stream, StreamExt};
use tokio_util::codec::{Decoder, Encoder, LinesCodec, LinesCodecError};

use crate::error::ProtocolError;
use crate::response::Response;

/// Longest reply line accepted, in bytes.
pub const MAX_LINE_LENGTH: usize = 4096;

/// How the reply to a command is delimited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Framing {
    /// Read until the literal line `OK`.
    UntilOk,
    /// Read a `BEGIN <command>` ... `END <command>` block.
    List {
        /// The command text as sent, e.g. `LIST VAR su700`.
        command: String,
    },
    /// Read exactly one line.
    SingleLine,
}

impl Framing {
    /// Selects the framing for a command line.
    ///
    /// # Examples
    ///
    /// ```
    /// use nutwatch::protocol::Framing;
    ///
    /// assert_eq!(Framing::for_command("PASSWORD x"), Framing::UntilOk);
    /// assert_eq!(Framing::for_command("VER"), Framing::SingleLine);
    /// assert_eq!(
    ///     Framing::for_command("LIST UPS"),
    ///     Framing::List { command: "LIST UPS".into() }
    /// );
    /// ```
    #[must_use]
    pub fn for_command(line: &str) -> Self {
        match line.split_whitespace().next() {
            Some("USERNAME" | "PASSWORD" | "SET") => Self::UntilOk,
            Some("LIST") => Self::List {
                command: line.to_string(),
            },
            _ => Self::SingleLine,
        }
    }
}

/// Newline-delimited UTF-8 codec for a NUT connection.
///
/// Wraps [`LinesCodec`] with a line length limit and refuses to encode a
/// command that would span more than one line.
#[derive(Debug)]
pub struct NutCodec {
    lines: LinesCodec,
}

impl NutCodec {
    /// Creates a codec with the default line length limit.
    #[must_use]
    pub fn new() -> Self {
        Self {
            lines: LinesCodec::new_with_max_length(MAX_LINE_LENGTH),
        }
    }
}

impl Default for NutCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for NutCodec {
    type Item = String;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        self.lines.decode(src).map_err(from_lines_error)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        self.lines.decode_eof(src).map_err(from_lines_error)
    }
}

impl Encoder<String> for NutCodec {
    type Error = ProtocolError;

    fn encode(&mut self, item: String, dst: &mut BytesMut) -> Result<(), Self::Error> {
        if item.is_empty() || item.contains(['\r', '\n']) {
            return Err(ProtocolError::InvalidCommand(item));
        }
        self.lines.encode(item, dst).map_err(from_lines_error)
    }
}

fn from_lines_error(err: LinesCodecError) -> ProtocolError {
    match err {
        LinesCodecError::MaxLineLengthExceeded => ProtocolError::LineTooLong(MAX_LINE_LENGTH),
        LinesCodecError::Io(e) => ProtocolError::Io(e),
    }
}

/// Reads one reply from `stream` according to `framing`.
///
/// Each line must arrive within `timeout`.
///
/// # Errors
///
/// - `ProtocolError::ServerRejected` if the daemon answers `ERR <code>`
/// - `ProtocolError::Timeout` if a line does not arrive in time
/// - `ProtocolError::ConnectionClosed` if the stream ends mid-reply
/// - `ProtocolError::UnexpectedResponse` if a list reply lacks its `BEGIN` line
pub async fn read_response<S>(
    stream: &mut S,
    framing: &Framing,
    timeout: Duration,
) -> Result<Response, ProtocolError>
where
    S: Stream<Item = Result<String, ProtocolError>> + Unpin,
{
    let first = next_line(stream, timeout).await?;
    reject_error(&first)?;

    match framing {
        Framing::SingleLine => Ok(Response::Line(first)),
        Framing::UntilOk => {
            let mut line = first;
            while line != "OK" {
                tracing::debug!(line = %line, "Discarding line while waiting for OK");
                line = next_line(stream, timeout).await?;
                reject_error(&line)?;
            }
            Ok(Response::Line(line))
        }
        Framing::List { command } => {
            if first.strip_prefix("BEGIN ") != Some(command.as_str()) {
                return Err(ProtocolError::UnexpectedResponse(format!(
                    "expected \"BEGIN {command}\", got {first:?}"
                )));
            }

            let end = format!("END {command}");
            let mut items = Vec::new();
            loop {
                let line = next_line(stream, timeout).await?;
                if line == end {
                    break;
                }
                items.push(line);
            }
            Ok(Response::List(items))
        }
    }
}

async fn next_line<S>(stream: &mut S, timeout: Duration) -> Result<String, ProtocolError>
where
    S: Stream<Item = Result<String, ProtocolError>> + Unpin,
{
    match tokio::time::timeout(timeout, stream.next()).await {
        Ok(Some(line)) => line,
        Ok(None) => Err(ProtocolError::ConnectionClosed),
        Err(_) => Err(ProtocolError::Timeout(
            u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        )),
    }
}

/// Turns an `ERR <code> [detail]` line into an error.
fn reject_error(line: &str) -> Result<(), ProtocolError> {
    match line.strip_prefix("ERR ") {
        Some(rest) => {
            let code = rest.split_whitespace().next().unwrap_or_default();
            Err(ProtocolError::ServerRejected(code.into()))
        }
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use futures_util::stream;

    use super::*;
    use crate::types::ServerErrorCode;

    const TIMEOUT: Duration = Duration::from_secs(1);

    fn lines(items: &[&str]) -> impl Stream<Item = Result<String, ProtocolError>> + Unpin {
        stream::iter(
            items
                .iter()
                .map(|s| Ok(s.to_string()))
                .collect::<Vec<Result<String, ProtocolError>>>(),
        )
    }

    #[test]
    fn framing_selection() {
        assert_eq!(Framing::for_command("USERNAME upsmon"), Framing::UntilOk);
        assert_eq!(Framing::for_command("SET VAR a b \"1\""), Framing::UntilOk);
        assert_eq!(Framing::for_command("NETVER"), Framing::SingleLine);
        assert_eq!(Framing::for_command("HELP"), Framing::SingleLine);
        assert_eq!(Framing::for_command("GET TYPE a b"), Framing::SingleLine);
        assert_eq!(Framing::for_command("FSD a"), Framing::SingleLine);
    }

    #[test]
    fn encoder_appends_newline() {
        let mut codec = NutCodec::new();
        let mut buf = BytesMut::new();
        codec.encode("LIST UPS".to_string(), &mut buf).unwrap();
        assert_eq!(&buf[..], b"LIST UPS\n");
    }

    #[test]
    fn encoder_rejects_embedded_newline() {
        let mut codec = NutCodec::new();
        let mut buf = BytesMut::new();
        let result = codec.encode("SET VAR a b \"x\nLOGOUT\"".to_string(), &mut buf);
        assert!(matches!(result, Err(ProtocolError::InvalidCommand(_))));
        assert!(buf.is_empty());
    }

    #[test]
    fn decoder_splits_lines_and_strips_cr() {
        let mut codec = NutCodec::new();
        let mut buf = BytesMut::from(&b"OK\r\nBEGIN LIST UPS\npartial"[..]);
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("OK".to_string()));
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("BEGIN LIST UPS".to_string()));
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
    }

    #[test]
    fn decoder_limits_line_length() {
        let mut codec = NutCodec::new();
        let mut buf = BytesMut::from(vec![b'x'; MAX_LINE_LENGTH + 10].as_slice());
        assert!(matches!(codec.decode(&mut buf), Err(ProtocolError::LineTooLong(_))));
    }

    #[tokio::test]
    async fn list_returns_interior_lines_in_order() {
        let mut stream = lines(&[
            "BEGIN LIST UPS",
            "UPS a \"first\"",
            "UPS b \"second\"",
            "UPS c \"third\"",
            "END LIST UPS",
            "NEXT",
        ]);
        let framing = Framing::for_command("LIST UPS");
        let response = read_response(&mut stream, &framing, TIMEOUT).await.unwrap();
        assert_eq!(
            response,
            Response::List(vec![
                "UPS a \"first\"".to_string(),
                "UPS b \"second\"".to_string(),
                "UPS c \"third\"".to_string(),
            ])
        );

        // The line after END is left for the next reply.
        let next = read_response(&mut stream, &Framing::SingleLine, TIMEOUT).await.unwrap();
        assert_eq!(next, Response::Line("NEXT".to_string()));
    }

    #[tokio::test]
    async fn empty_list() {
        let mut stream = lines(&["BEGIN LIST CMD su700", "END LIST CMD su700"]);
        let framing = Framing::for_command("LIST CMD su700");
        let response = read_response(&mut stream, &framing, TIMEOUT).await.unwrap();
        assert_eq!(response, Response::List(vec![]));
    }

    #[tokio::test]
    async fn end_of_other_list_does_not_terminate() {
        let mut stream = lines(&[
            "BEGIN LIST VAR a",
            "END LIST VAR b",
            "END LIST VAR a",
        ]);
        let framing = Framing::for_command("LIST VAR a");
        let response = read_response(&mut stream, &framing, TIMEOUT).await.unwrap();
        assert_eq!(response, Response::List(vec!["END LIST VAR b".to_string()]));
    }

    #[tokio::test]
    async fn list_without_begin_is_unexpected() {
        let mut stream = lines(&["UPS a \"x\"", "END LIST UPS"]);
        let framing = Framing::for_command("LIST UPS");
        let result = read_response(&mut stream, &framing, TIMEOUT).await;
        assert!(matches!(result, Err(ProtocolError::UnexpectedResponse(_))));
    }

    #[tokio::test]
    async fn err_reply_surfaces_token() {
        let mut stream = lines(&["ERR UNKNOWN-UPS"]);
        let framing = Framing::for_command("LIST VAR nope");
        let result = read_response(&mut stream, &framing, TIMEOUT).await;
        assert!(matches!(
            result,
            Err(ProtocolError::ServerRejected(ServerErrorCode::UnknownUps))
        ));
    }

    #[tokio::test]
    async fn err_with_detail_keeps_second_field() {
        let mut stream = lines(&["ERR ACCESS-DENIED extra words"]);
        let result = read_response(&mut stream, &Framing::SingleLine, TIMEOUT).await;
        assert!(matches!(
            result,
            Err(ProtocolError::ServerRejected(ServerErrorCode::AccessDenied))
        ));
    }

    #[tokio::test]
    async fn until_ok_skips_noise() {
        let mut stream = lines(&["noise", "OK"]);
        let response = read_response(&mut stream, &Framing::UntilOk, TIMEOUT).await.unwrap();
        assert_eq!(response, Response::Line("OK".to_string()));
    }

    #[tokio::test]
    async fn until_ok_stops_on_err() {
        let mut stream = lines(&["ERR INVALID-PASSWORD"]);
        let result = read_response(&mut stream, &Framing::UntilOk, TIMEOUT).await;
        assert!(matches!(
            result,
            Err(ProtocolError::ServerRejected(ServerErrorCode::InvalidPassword))
        ));
    }

    #[tokio::test]
    async fn closed_stream_mid_list() {
        let mut stream = lines(&["BEGIN LIST UPS", "UPS a \"x\""]);
        let framing = Framing::for_command("LIST UPS");
        let result = read_response(&mut stream, &framing, TIMEOUT).await;
        assert!(matches!(result, Err(ProtocolError::ConnectionClosed)));
    }

    #[tokio::test(start_paused = true)]
    async fn silent_stream_times_out() {
        let mut stream = stream::pending::<Result<String, ProtocolError>>();
        let result = read_response(&mut stream, &Framing::SingleLine, Duration::from_secs(5)).await;
        assert!(matches!(result, Err(ProtocolError::Timeout(5000))));
    }
}
