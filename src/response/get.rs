// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parsers for `GET` replies.
//!
//! Each reply echoes the query without the `GET` keyword, followed by the
//! answer, e.g. `DESC su700 ups.load "Load on UPS (percent)"`.

use crate::error::ParseError;
use crate::types::{DeclaredType, TypeInfo};

use super::{strip_echo, tokenize};

/// Parses `UPSDESC <ups> "<description>"`.
///
/// # Errors
///
/// Returns `ParseError` if the echo does not match or the text is missing.
pub fn parse_ups_description(ups: &str, line: &str) -> Result<String, ParseError> {
    description(&["UPSDESC", ups], line)
}

/// Parses `DESC <ups> <var> "<description>"`.
///
/// # Errors
///
/// Returns `ParseError` if the echo does not match or the text is missing.
pub fn parse_variable_description(ups: &str, var: &str, line: &str) -> Result<String, ParseError> {
    description(&["DESC", ups, var], line)
}

/// Parses `CMDDESC <ups> <cmd> "<description>"`.
///
/// # Errors
///
/// Returns `ParseError` if the echo does not match or the text is missing.
pub fn parse_command_description(ups: &str, cmd: &str, line: &str) -> Result<String, ParseError> {
    description(&["CMDDESC", ups, cmd], line)
}

/// Parses `TYPE <ups> <var> [RW] <type>...`.
///
/// `RW` marks the variable writeable. The first other token is the declared
/// type; `STRING:<n>` carries the maximum length `n`.
///
/// # Errors
///
/// Returns `ParseError` if the echo does not match or the length suffix is
/// not a number.
///
/// # Examples
///
/// ```
/// use nutwatch::response::parse_type_info;
/// use nutwatch::types::DeclaredType;
///
/// let info = parse_type_info("su700", "ups.id", "TYPE su700 ups.id RW STRING:63").unwrap();
/// assert!(info.writeable);
/// assert_eq!(info.declared_type, DeclaredType::String);
/// assert_eq!(info.max_length, Some(63));
/// ```
pub fn parse_type_info(ups: &str, var: &str, line: &str) -> Result<TypeInfo, ParseError> {
    let words = tokenize(line)?;
    let flags = strip_echo(&words, &["TYPE", ups, var], line)?;

    let writeable = flags.iter().any(|flag| flag == "RW");
    let Some(token) = flags.iter().find(|flag| *flag != "RW") else {
        return Ok(TypeInfo {
            declared_type: DeclaredType::Unknown("UNKNOWN".to_string()),
            writeable,
            max_length: None,
        });
    };

    let max_length = match token.split_once(':') {
        Some((_, len)) => Some(len.parse().map_err(|e| ParseError::InvalidValue {
            field: format!("{var} type length"),
            message: format!("{len:?}: {e}"),
        })?),
        None => None,
    };

    Ok(TypeInfo {
        declared_type: DeclaredType::from_token(token),
        writeable,
        max_length,
    })
}

fn description(echo: &[&str], line: &str) -> Result<String, ParseError> {
    let words = tokenize(line)?;
    match strip_echo(&words, echo, line)? {
        [text, ..] => Ok(text.clone()),
        [] => Err(ParseError::MissingField(format!("{} description", echo[0]))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ups_description() {
        let desc = parse_ups_description("su700", r#"UPSDESC su700 "Rack UPS""#).unwrap();
        assert_eq!(desc, "Rack UPS");
    }

    #[test]
    fn variable_description() {
        let line = r#"DESC su700 ups.load "Load on UPS (percent of full)""#;
        let desc = parse_variable_description("su700", "ups.load", line).unwrap();
        assert_eq!(desc, "Load on UPS (percent of full)");
    }

    #[test]
    fn command_description_for_wrong_command() {
        let line = r#"CMDDESC su700 load.on "Turn on the load""#;
        assert!(parse_command_description("su700", "load.off", line).is_err());
    }

    #[test]
    fn missing_description() {
        assert!(parse_ups_description("su700", "UPSDESC su700").is_err());
    }

    #[test]
    fn read_only_number() {
        let info = parse_type_info("su700", "ups.load", "TYPE su700 ups.load NUMBER").unwrap();
        assert!(!info.writeable);
        assert_eq!(info.declared_type, DeclaredType::Number);
        assert_eq!(info.max_length, None);
    }

    #[test]
    fn writeable_enum() {
        let line = "TYPE su700 input.transfer.low RW ENUM";
        let info = parse_type_info("su700", "input.transfer.low", line).unwrap();
        assert!(info.writeable);
        assert_eq!(info.declared_type, DeclaredType::Enum);
    }

    #[test]
    fn bad_string_length() {
        let line = "TYPE su700 ups.id RW STRING:abc";
        assert!(matches!(
            parse_type_info("su700", "ups.id", line),
            Err(ParseError::InvalidValue { .. })
        ));
    }

    #[test]
    fn empty_type_is_unknown() {
        let info = parse_type_info("su700", "x", "TYPE su700 x").unwrap();
        assert_eq!(info.declared_type, DeclaredType::Unknown("UNKNOWN".to_string()));
    }
}
