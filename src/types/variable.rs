// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device variables and instant commands.

use std::fmt;

use serde::Serialize;

use super::{Value, ValueKind};

/// The type a daemon declares for a variable in its `GET TYPE` reply.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeclaredType {
    /// `STRING` or `STRING:<n>`.
    String,
    /// `NUMBER`.
    Number,
    /// `ENUM`: the value is one of a fixed set.
    Enum,
    /// `RANGE`: the value lies within server-provided bounds.
    Range,
    /// Anything else, kept verbatim.
    Unknown(String),
}

impl DeclaredType {
    /// Decodes a type token, ignoring any `:<n>` length suffix.
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        let base = token.split_once(':').map_or(token, |(base, _)| base);
        match base {
            "STRING" => Self::String,
            "NUMBER" => Self::Number,
            "ENUM" => Self::Enum,
            "RANGE" => Self::Range,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Returns the type as transmitted, without a length suffix.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::String => "STRING",
            Self::Number => "NUMBER",
            Self::Enum => "ENUM",
            Self::Range => "RANGE",
            Self::Unknown(other) => other,
        }
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named attribute of a UPS, as of the last successful poll.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variable {
    name: String,
    raw: String,
    value: Value,
    declared_type: DeclaredType,
    description: String,
    writeable: bool,
    max_length: Option<usize>,
}

impl Variable {
    /// Creates a variable, inferring its value from the raw payload.
    ///
    /// Surrounding whitespace is ignored for inference; [`Self::raw`] keeps it.
    #[must_use]
    pub fn new(name: impl Into<String>, raw: impl Into<String>) -> Self {
        let raw = raw.into();
        Self {
            name: name.into(),
            value: Value::infer(raw.trim()),
            raw,
            declared_type: DeclaredType::Unknown("UNKNOWN".to_string()),
            description: String::new(),
            writeable: false,
            max_length: None,
        }
    }

    /// Sets the human description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the server-declared type information.
    #[must_use]
    pub fn with_type_info(mut self, info: TypeInfo) -> Self {
        self.declared_type = info.declared_type;
        self.writeable = info.writeable;
        self.max_length = info.max_length;
        self
    }

    /// Returns the variable name, e.g. `battery.charge`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the payload exactly as received.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Returns the inferred value.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Returns the inferred kind, which is authoritative for [`Self::value`].
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        self.value.kind()
    }

    /// Returns the type the daemon declared.
    #[must_use]
    pub fn declared_type(&self) -> &DeclaredType {
        &self.declared_type
    }

    /// Returns the human description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns true if the daemon accepts `SET VAR` for this variable.
    #[must_use]
    pub fn is_writeable(&self) -> bool {
        self.writeable
    }

    /// Returns the maximum length of a `STRING:<n>` variable.
    #[must_use]
    pub fn max_length(&self) -> Option<usize> {
        self.max_length
    }
}

/// Decoded `GET TYPE` reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
    /// The declared type.
    pub declared_type: DeclaredType,
    /// Whether the reply carried the `RW` flag.
    pub writeable: bool,
    /// The `n` of `STRING:<n>`.
    pub max_length: Option<usize>,
}

/// An instant command a UPS supports, e.g. `test.battery.start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstantCommand {
    /// The command name.
    pub name: String,
    /// The daemon's description of the command.
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_type_strips_length() {
        assert_eq!(DeclaredType::from_token("STRING:64"), DeclaredType::String);
        assert_eq!(DeclaredType::from_token("NUMBER"), DeclaredType::Number);
        assert_eq!(
            DeclaredType::from_token("FLAGS"),
            DeclaredType::Unknown("FLAGS".to_string())
        );
    }

    #[test]
    fn inferred_kind_overrides_declared_type() {
        let var = Variable::new("battery.charge", "100").with_type_info(TypeInfo {
            declared_type: DeclaredType::String,
            writeable: false,
            max_length: None,
        });
        assert_eq!(var.kind(), ValueKind::Integer);
        assert_eq!(var.declared_type(), &DeclaredType::String);
        assert_eq!(var.raw(), "100");
    }

    #[test]
    fn padded_payload_is_trimmed_for_inference() {
        let var = Variable::new("battery.charge", "100 ");
        assert_eq!(var.value(), &Value::Integer(100));
        assert_eq!(var.raw(), "100 ");

        let var = Variable::new("battery.voltage", " 13.60\t");
        assert_eq!(var.kind(), ValueKind::Float);

        let var = Variable::new("ups.beeper.status", "enabled ");
        assert_eq!(var.value(), &Value::Boolean(true));
    }
}
