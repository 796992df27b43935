// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! NUT command definitions.
//!
//! This module provides typed representations of the `upsd` network protocol
//! commands this library issues.
//!
//! # Available Commands
//!
//! | Command Type | Purpose | Example |
//! |-------------|---------|---------|
//! | [`SessionCommand`] | Login, version negotiation, logout | `USERNAME upsmon`, `NETVER` |
//! | [`ListCommand`] | Multi-line enumerations | `LIST VAR myups` |
//! | [`GetCommand`] | Single metadata lookups | `GET TYPE myups ups.id` |
//! | [`ActionCommand`] | Mutations | `INSTCMD myups test.battery.start` |
//!
//! # Examples
//!
//! ```
//! use nutwatch::command::{ActionCommand, Command, ListCommand};
//!
//! let list = ListCommand::Var { ups: "myups".into() };
//! assert_eq!(list.encode(), "LIST VAR myups");
//!
//! let set = ActionCommand::SetVar {
//!     ups: "myups".into(),
//!     var: "ups.id".into(),
//!     value: r#"rack "A""#.into(),
//! };
//! assert_eq!(set.encode(), r#"SET VAR myups ups.id "rack \"A\"""#);
//! ```

mod action;
mod query;
mod session;

pub use action::ActionCommand;
pub use query::{GetCommand, ListCommand};
pub use session::SessionCommand;

/// A command that can be sent to a NUT daemon.
pub trait Command {
    /// Returns the command text, without the trailing newline.
    fn encode(&self) -> String;
}

impl Command for str {
    fn encode(&self) -> String {
        self.to_string()
    }
}

impl Command for String {
    fn encode(&self) -> String {
        self.clone()
    }
}

/// Wraps an argument in double quotes, escaping `\` and `"`.
pub(crate) fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if matches!(c, '"' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Quotes an argument only if it would not survive as a single bare word.
pub(crate) fn word(value: &str) -> String {
    if value.is_empty() || value.chars().any(|c| c.is_whitespace() || c == '"' || c == '\\') {
        quote(value)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_escapes_backslash_and_quote() {
        assert_eq!(quote("plain"), "\"plain\"");
        assert_eq!(quote(r#"a"b"#), r#""a\"b""#);
        assert_eq!(quote(r"a\b"), r#""a\\b""#);
    }

    #[test]
    fn word_only_quotes_when_needed() {
        assert_eq!(word("upsmon"), "upsmon");
        assert_eq!(word("two words"), "\"two words\"");
        assert_eq!(word(""), "\"\"");
    }

    #[test]
    fn raw_strings_are_commands() {
        assert_eq!("VER".encode(), "VER");
        assert_eq!(String::from("HELP").encode(), "HELP");
    }
}
