// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parsers for the interior lines of `LIST` replies.

use crate::error::ParseError;

use super::{strip_echo, tokenize};

/// One `UPS <name> "<description>"` line of `LIST UPS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsEntry {
    /// The UPS name used in every per-device command.
    pub name: String,
    /// The description from `ups.conf`.
    pub description: String,
}

/// One `VAR <ups> <var> "<value>"` line of `LIST VAR`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarEntry {
    /// The variable name.
    pub name: String,
    /// The unquoted payload.
    pub value: String,
}

/// Parses a `LIST UPS` line.
///
/// # Errors
///
/// Returns `ParseError` if the line is not `UPS <name> ["<description>"]`.
pub fn parse_ups_line(line: &str) -> Result<UpsEntry, ParseError> {
    let words = tokenize(line)?;
    match strip_echo(&words, &["UPS"], line)? {
        [name] => Ok(UpsEntry {
            name: name.clone(),
            description: String::new(),
        }),
        [name, description, ..] => Ok(UpsEntry {
            name: name.clone(),
            description: description.clone(),
        }),
        [] => Err(ParseError::MissingField("UPS name".to_string())),
    }
}

/// Parses a `LIST VAR <ups>` line.
///
/// # Errors
///
/// Returns `ParseError` if the line does not echo `VAR <ups>` or lacks a
/// name and value.
pub fn parse_var_line(ups: &str, line: &str) -> Result<VarEntry, ParseError> {
    let words = tokenize(line)?;
    match strip_echo(&words, &["VAR", ups], line)? {
        [name, value] => Ok(VarEntry {
            name: name.clone(),
            value: value.clone(),
        }),
        _ => Err(ParseError::UnexpectedFormat(format!(
            "expected VAR {ups} <name> \"<value>\", got {line:?}"
        ))),
    }
}

/// Parses a `LIST CMD <ups>` line into the command name.
///
/// # Errors
///
/// Returns `ParseError` if the line is not `CMD <ups> <cmd>`.
pub fn parse_cmd_line(ups: &str, line: &str) -> Result<String, ParseError> {
    single_field(&["CMD", ups], line)
}

/// Parses a `LIST CLIENT <ups>` line into the client address.
///
/// # Errors
///
/// Returns `ParseError` if the line is not `CLIENT <ups> <address>`.
pub fn parse_client_line(ups: &str, line: &str) -> Result<String, ParseError> {
    single_field(&["CLIENT", ups], line)
}

fn single_field(echo: &[&str], line: &str) -> Result<String, ParseError> {
    let words = tokenize(line)?;
    match strip_echo(&words, echo, line)? {
        [field] => Ok(field.clone()),
        _ => Err(ParseError::UnexpectedFormat(format!(
            "expected {} <value>, got {line:?}",
            echo.join(" ")
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ups_line_with_description() {
        let entry = parse_ups_line(r#"UPS su700 "Development box""#).unwrap();
        assert_eq!(entry.name, "su700");
        assert_eq!(entry.description, "Development box");
    }

    #[test]
    fn ups_line_without_description() {
        let entry = parse_ups_line("UPS eaton").unwrap();
        assert_eq!(entry.name, "eaton");
        assert_eq!(entry.description, "");
    }

    #[test]
    fn ups_line_wrong_keyword() {
        assert!(parse_ups_line("VAR su700 x \"1\"").is_err());
    }

    #[test]
    fn var_line() {
        let entry = parse_var_line("su700", r#"VAR su700 ups.status "OL CHRG""#).unwrap();
        assert_eq!(entry.name, "ups.status");
        assert_eq!(entry.value, "OL CHRG");
    }

    #[test]
    fn var_line_for_other_ups_is_rejected() {
        assert!(parse_var_line("su700", r#"VAR other ups.load "10""#).is_err());
    }

    #[test]
    fn var_line_missing_value() {
        assert!(parse_var_line("su700", "VAR su700 ups.load").is_err());
    }

    #[test]
    fn cmd_and_client_lines() {
        assert_eq!(parse_cmd_line("su700", "CMD su700 load.on").unwrap(), "load.on");
        assert_eq!(
            parse_client_line("su700", "CLIENT su700 192.168.1.20").unwrap(),
            "192.168.1.20"
        );
        assert!(parse_client_line("su700", "CLIENT su700").is_err());
    }
}
