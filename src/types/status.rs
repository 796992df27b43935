// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! UPS status flags as reported in `ups.status`.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// One flag of the whitespace-separated `ups.status` variable.
///
/// # Examples
///
/// ```
/// use nutwatch::types::StatusCode;
///
/// let code: StatusCode = "OB".parse().unwrap();
/// assert_eq!(code, StatusCode::OnBattery);
/// assert_eq!(code.description(), "On Battery");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    /// `OL`
    Online,
    /// `OB`
    OnBattery,
    /// `LB`
    LowBattery,
    /// `RB`
    ReplaceBattery,
    /// `CHRG`
    Charging,
    /// `DISCHRG`
    Discharging,
    /// `BYPASS`
    Bypass,
    /// `CAL`
    Calibrating,
    /// `OFF`
    Offline,
    /// `OVER`
    Overload,
    /// `TRIM`
    Trim,
    /// `BOOST`
    Boost,
    /// `FSD`
    ForcedShutdown,
    /// `ALARM`
    Alarm,
    /// `TEST`
    Test,
    /// `COMM`
    CommunicationLost,
}

impl StatusCode {
    /// Returns the flag as transmitted by the daemon.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "OL",
            Self::OnBattery => "OB",
            Self::LowBattery => "LB",
            Self::ReplaceBattery => "RB",
            Self::Charging => "CHRG",
            Self::Discharging => "DISCHRG",
            Self::Bypass => "BYPASS",
            Self::Calibrating => "CAL",
            Self::Offline => "OFF",
            Self::Overload => "OVER",
            Self::Trim => "TRIM",
            Self::Boost => "BOOST",
            Self::ForcedShutdown => "FSD",
            Self::Alarm => "ALARM",
            Self::Test => "TEST",
            Self::CommunicationLost => "COMM",
        }
    }

    /// Returns the human-readable description of the flag.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Online => "Online",
            Self::OnBattery => "On Battery",
            Self::LowBattery => "Low Battery",
            Self::ReplaceBattery => "Replace Battery",
            Self::Charging => "Charging",
            Self::Discharging => "Discharging",
            Self::Bypass => "Bypass Active",
            Self::Calibrating => "Calibrating",
            Self::Offline => "Offline",
            Self::Overload => "Overload",
            Self::Trim => "SmartTrim",
            Self::Boost => "SmartBoost",
            Self::ForcedShutdown => "Forced Shutdown",
            Self::Alarm => "Alarm",
            Self::Test => "Self Test",
            Self::CommunicationLost => "Communication Lost",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a status flag is not in the known table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatusCode;

impl FromStr for StatusCode {
    type Err = UnknownStatusCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "OL" => Self::Online,
            "OB" => Self::OnBattery,
            "LB" => Self::LowBattery,
            "RB" => Self::ReplaceBattery,
            "CHRG" => Self::Charging,
            "DISCHRG" => Self::Discharging,
            "BYPASS" => Self::Bypass,
            "CAL" => Self::Calibrating,
            "OFF" => Self::Offline,
            "OVER" => Self::Overload,
            "TRIM" => Self::Trim,
            "BOOST" => Self::Boost,
            "FSD" => Self::ForcedShutdown,
            "ALARM" => Self::Alarm,
            "TEST" => Self::Test,
            "COMM" => Self::CommunicationLost,
            _ => return Err(UnknownStatusCode),
        })
    }
}

/// Decoded `ups.status`: the human-readable summary and the raw flags.
///
/// # Examples
///
/// ```
/// use nutwatch::types::Status;
///
/// let status = Status::from_raw("OL CHRG");
/// assert_eq!(status.description(), "Online, charging");
/// assert_eq!(status.raw(), "OL CHRG");
/// assert!(status.is_online());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Status {
    description: String,
    raw: String,
}

impl Status {
    /// Decodes a raw status string.
    ///
    /// The first word keeps its capitalisation, later words are lower-cased,
    /// and unknown flags render as `Unknown`.
    #[must_use]
    pub fn from_raw(raw: &str) -> Self {
        let description = raw
            .split_whitespace()
            .enumerate()
            .map(|(i, flag)| match flag.parse::<StatusCode>() {
                Ok(code) if i > 0 => code.description().to_lowercase(),
                Ok(code) => code.description().to_string(),
                Err(UnknownStatusCode) => "Unknown".to_string(),
            })
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            description,
            raw: raw.to_string(),
        }
    }

    /// Returns the human-readable summary.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the status string exactly as reported.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Returns the known flags, skipping unrecognised ones.
    pub fn codes(&self) -> impl Iterator<Item = StatusCode> + '_ {
        self.raw.split_whitespace().filter_map(|s| s.parse().ok())
    }

    /// Returns true if the raw status contains `OL`.
    #[must_use]
    pub fn is_online(&self) -> bool {
        self.raw.contains("OL")
    }

    /// Returns true if the raw status contains `OB`.
    #[must_use]
    pub fn is_on_battery(&self) -> bool {
        self.raw.contains("OB")
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}
