// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reply types and parsers for the NUT network protocol.
//!
//! A daemon answers every command either with a single line or, for `LIST`
//! commands, with a block framed by `BEGIN LIST ...` and `END LIST ...`.
//! [`Response`] carries either shape; the parsers in this module decode the
//! individual lines.

mod get;
mod list;

pub use get::{
    parse_command_description, parse_type_info, parse_ups_description, parse_variable_description,
};
pub use list::{
    UpsEntry, VarEntry, parse_client_line, parse_cmd_line, parse_ups_line, parse_var_line,
};

use crate::error::ParseError;

/// A decoded reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// A single reply line.
    Line(String),
    /// The interior lines of a `LIST` reply, without the `BEGIN` and `END`
    /// framing, in the order received.
    List(Vec<String>),
}

impl Response {
    /// Returns the line of a single-line reply.
    #[must_use]
    pub fn as_line(&self) -> Option<&str> {
        match self {
            Self::Line(line) => Some(line),
            Self::List(_) => None,
        }
    }

    /// Consumes the reply, expecting a single line.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::UnexpectedFormat` for a list reply.
    pub fn into_line(self) -> Result<String, ParseError> {
        match self {
            Self::Line(line) => Ok(line),
            Self::List(_) => Err(ParseError::UnexpectedFormat(
                "expected a single line, got a list".to_string(),
            )),
        }
    }

    /// Consumes the reply, expecting a list.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::UnexpectedFormat` for a single-line reply.
    pub fn into_list(self) -> Result<Vec<String>, ParseError> {
        match self {
            Self::List(lines) => Ok(lines),
            Self::Line(line) => Err(ParseError::UnexpectedFormat(format!(
                "expected a list, got {line:?}"
            ))),
        }
    }
}

/// Splits a reply line into words, honouring double quotes and backslash
/// escapes inside them.
///
/// # Errors
///
/// Returns `ParseError::UnexpectedFormat` if a quoted word is not closed.
///
/// # Examples
///
/// ```
/// use nutwatch::response::tokenize;
///
/// let words = tokenize(r#"VAR su700 ups.mfr "American \"Power\"""#).unwrap();
/// assert_eq!(words, ["VAR", "su700", "ups.mfr", r#"American "Power""#]);
/// ```
pub fn tokenize(line: &str) -> Result<Vec<String>, ParseError> {
    let mut words = Vec::new();
    let mut chars = line.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let mut word = String::new();
        if c == '"' {
            chars.next();
            let mut closed = false;
            while let Some(c) = chars.next() {
                match c {
                    '\\' => {
                        if let Some(escaped) = chars.next() {
                            word.push(escaped);
                        }
                    }
                    '"' => {
                        closed = true;
                        break;
                    }
                    _ => word.push(c),
                }
            }
            if !closed {
                return Err(ParseError::UnexpectedFormat(format!(
                    "unterminated quote in {line:?}"
                )));
            }
        } else {
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                word.push(c);
                chars.next();
            }
        }
        words.push(word);
    }

    Ok(words)
}

/// Checks that `words` starts with `echo` and returns the remainder.
fn strip_echo<'a>(words: &'a [String], echo: &[&str], line: &str) -> Result<&'a [String], ParseError> {
    let matches = words.len() >= echo.len()
        && words.iter().zip(echo).all(|(word, expected)| word == expected);

    if matches {
        Ok(&words[echo.len()..])
    } else {
        Err(ParseError::UnexpectedFormat(format!(
            "expected {:?}, got {line:?}",
            echo.join(" ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_bare_words() {
        assert_eq!(tokenize("CMD su700 load.off").unwrap(), ["CMD", "su700", "load.off"]);
    }

    #[test]
    fn tokenize_keeps_empty_quoted_word() {
        assert_eq!(tokenize(r#"VAR su700 ups.id """#).unwrap(), ["VAR", "su700", "ups.id", ""]);
    }

    #[test]
    fn tokenize_unescapes_backslash() {
        assert_eq!(tokenize(r#""a\\b""#).unwrap(), [r"a\b"]);
    }

    #[test]
    fn tokenize_rejects_unterminated_quote() {
        assert!(tokenize(r#"UPSDESC su700 "oops"#).is_err());
    }

    #[test]
    fn response_shape_accessors() {
        assert_eq!(Response::Line("OK".into()).as_line(), Some("OK"));
        assert!(Response::Line("OK".into()).into_list().is_err());
        assert!(Response::List(vec![]).into_line().is_err());
    }

    #[test]
    fn strip_echo_checks_prefix() {
        let words = tokenize("DESC su700 ups.load \"Load\"").unwrap();
        let rest = strip_echo(&words, &["DESC", "su700", "ups.load"], "").unwrap();
        assert_eq!(rest, ["Load"]);
        assert!(strip_echo(&words, &["DESC", "other"], "").is_err());
    }
}
