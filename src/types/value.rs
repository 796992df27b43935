// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed variable values.
//!
//! NUT transmits every variable as a quoted string. [`Value::infer`] turns
//! that payload into the narrowest matching type so that readings such as
//! battery charge can be consumed as numbers.

use std::fmt;

use serde::Serialize;

/// The value of a UPS variable, typed by inference from its raw string.
///
/// # Examples
///
/// ```
/// use nutwatch::types::Value;
///
/// assert_eq!(Value::infer("100"), Value::Integer(100));
/// assert_eq!(Value::infer("13.6"), Value::Float(13.6));
/// assert_eq!(Value::infer("enabled"), Value::Boolean(true));
/// assert_eq!(Value::infer("OL CHRG"), Value::String("OL CHRG".into()));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Free-form text.
    String(String),
    /// Whole number, from a payload matching `^-?\d+$`.
    Integer(i64),
    /// Decimal number, from a payload matching `^-?\d+\.\d+$`.
    Float(f64),
    /// `enabled` / `disabled`.
    Boolean(bool),
}

impl Value {
    /// Infers a typed value from a raw payload.
    ///
    /// Precedence: `enabled`/`disabled`, then decimal, then integer, then
    /// string. Numbers that do not fit the target type stay strings.
    #[must_use]
    pub fn infer(raw: &str) -> Self {
        match raw {
            "enabled" => return Self::Boolean(true),
            "disabled" => return Self::Boolean(false),
            _ => {}
        }

        match numeric_shape(raw) {
            Some(NumericShape::Decimal) => raw
                .parse()
                .map_or_else(|_| Self::String(raw.to_string()), Self::Float),
            Some(NumericShape::Whole) => raw
                .parse()
                .map_or_else(|_| Self::String(raw.to_string()), Self::Integer),
            None => Self::String(raw.to_string()),
        }
    }

    /// Returns the kind of this value.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::String(_) => ValueKind::String,
            Self::Integer(_) => ValueKind::Integer,
            Self::Float(_) => ValueKind::Float,
            Self::Boolean(_) => ValueKind::Boolean,
        }
    }

    /// Returns the text if this is a string value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the number if this is an integer value.
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the number if this is a float value.
    #[must_use]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the flag if this is a boolean value.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Boolean(true) => f.write_str("enabled"),
            Self::Boolean(false) => f.write_str("disabled"),
        }
    }
}

/// The locally inferred type of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueKind {
    /// Free-form text.
    String,
    /// Whole number.
    Integer,
    /// Decimal number.
    #[serde(rename = "FLOAT_64")]
    Float,
    /// Boolean flag.
    Boolean,
}

impl ValueKind {
    /// Returns the display name of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::String => "STRING",
            Self::Integer => "INTEGER",
            Self::Float => "FLOAT_64",
            Self::Boolean => "BOOLEAN",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

enum NumericShape {
    Whole,
    Decimal,
}

/// Matches `^-?\d+(\.\d+)?$`.
fn numeric_shape(raw: &str) -> Option<NumericShape> {
    let digits = raw.strip_prefix('-').unwrap_or(raw);
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

    match digits.split_once('.') {
        None if all_digits(digits) => Some(NumericShape::Whole),
        Some((int, frac)) if all_digits(int) && all_digits(frac) => Some(NumericShape::Decimal),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_integers() {
        assert_eq!(Value::infer("0"), Value::Integer(0));
        assert_eq!(Value::infer("42"), Value::Integer(42));
        assert_eq!(Value::infer("-7"), Value::Integer(-7));
        assert_eq!(Value::infer("0764"), Value::Integer(764));
    }

    #[test]
    fn infers_floats() {
        assert_eq!(Value::infer("13.6"), Value::Float(13.6));
        assert_eq!(Value::infer("-0.5"), Value::Float(-0.5));
        assert_eq!(Value::infer("230.0"), Value::Float(230.0));
    }

    #[test]
    fn infers_booleans() {
        assert_eq!(Value::infer("enabled"), Value::Boolean(true));
        assert_eq!(Value::infer("disabled"), Value::Boolean(false));
        assert_eq!(Value::infer("Enabled"), Value::String("Enabled".into()));
    }

    #[test]
    fn everything_else_is_a_string() {
        for raw in ["", "-", ".5", "5.", "1.2.3", "1e3", "+4", " 4", "OL", "12a"] {
            assert_eq!(Value::infer(raw), Value::String(raw.into()), "{raw:?}");
        }
    }

    #[test]
    fn overflowing_integer_stays_string() {
        let raw = "99999999999999999999";
        assert_eq!(Value::infer(raw), Value::String(raw.into()));
    }

    #[test]
    fn accessors_fail_closed() {
        let v = Value::infer("50");
        assert_eq!(v.as_i64(), Some(50));
        assert_eq!(v.as_f64(), None);
        assert_eq!(v.as_str(), None);
        assert_eq!(v.as_bool(), None);
        assert_eq!(v.kind(), ValueKind::Integer);
    }

    #[test]
    fn display_round_trips_booleans() {
        assert_eq!(Value::Boolean(true).to_string(), "enabled");
        assert_eq!(Value::Integer(764).to_string(), "764");
    }

    #[test]
    fn serializes_untagged() {
        let json = serde_json::to_string(&Value::Float(13.5)).unwrap();
        assert_eq!(json, "13.5");
    }

    #[test]
    fn kind_serializes_as_its_display_name() {
        for kind in [
            ValueKind::String,
            ValueKind::Integer,
            ValueKind::Float,
            ValueKind::Boolean,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{kind}\""));
        }
    }
}
