// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Readings derived from a variable snapshot.
//!
//! Each reading looks at a handful of well-known variables. A variable that
//! is missing or of the wrong kind reads as zero, except for the runtime,
//! which has no meaningful default.

use serde::Serialize;

use crate::error::DeviceError;
use crate::types::{Status, Value, Variable};

/// Battery state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Battery {
    /// `battery.charge`, in percent.
    pub charge: i64,
    /// `battery.charge.low`, the charge at which the UPS reports low battery.
    pub low: i64,
    /// `battery.voltage`, in volts.
    pub voltage: f64,
}

/// Output load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Load {
    /// `ups.load`, in percent of capacity.
    pub load: i64,
    /// Real power drawn, in watts.
    pub power: i64,
}

fn lookup<'a>(variables: &'a [Variable], name: &str) -> Option<&'a Value> {
    variables.iter().find(|v| v.name() == name).map(Variable::value)
}

fn integer(variables: &[Variable], name: &str) -> Option<i64> {
    lookup(variables, name).and_then(Value::as_i64)
}

/// Decodes `ups.status`; a missing status decodes as empty.
pub(crate) fn status(variables: &[Variable]) -> Status {
    let raw = lookup(variables, "ups.status")
        .and_then(Value::as_str)
        .unwrap_or_default();
    Status::from_raw(raw)
}

pub(crate) fn battery(variables: &[Variable]) -> Battery {
    Battery {
        charge: integer(variables, "battery.charge").unwrap_or(0),
        low: integer(variables, "battery.charge.low").unwrap_or(0),
        voltage: lookup(variables, "battery.voltage")
            .and_then(Value::as_f64)
            .unwrap_or(0.0),
    }
}

/// Power is `ups.realpower` when reported, otherwise the load share of the
/// nominal rating.
pub(crate) fn load(variables: &[Variable]) -> Load {
    let load = integer(variables, "ups.load").unwrap_or(0);
    let power = integer(variables, "ups.realpower").unwrap_or_else(|| {
        let nominal = integer(variables, "ups.realpower.nominal")
            .or_else(|| integer(variables, "ups.power.nominal"))
            .unwrap_or(0);
        load.saturating_mul(nominal) / 100
    });
    Load { load, power }
}

/// Remaining runtime on battery, in seconds.
pub(crate) fn runtime(variables: &[Variable]) -> Result<i64, DeviceError> {
    integer(variables, "battery.runtime")
        .ok_or_else(|| DeviceError::VariableNotFound("battery.runtime".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(pairs: &[(&str, &str)]) -> Vec<Variable> {
        pairs
            .iter()
            .map(|(name, raw)| Variable::new(*name, *raw))
            .collect()
    }

    #[test]
    fn load_from_nominal_rating() {
        let vars = snapshot(&[("ups.load", "50"), ("ups.realpower.nominal", "800")]);
        assert_eq!(load(&vars), Load { load: 50, power: 400 });
    }

    #[test]
    fn load_prefers_real_power() {
        let vars = snapshot(&[
            ("ups.load", "50"),
            ("ups.realpower", "123"),
            ("ups.realpower.nominal", "800"),
        ]);
        assert_eq!(load(&vars).power, 123);
    }

    #[test]
    fn load_falls_back_to_power_nominal() {
        let vars = snapshot(&[("ups.load", "25"), ("ups.power.nominal", "1000")]);
        assert_eq!(load(&vars).power, 250);
    }

    #[test]
    fn load_without_any_rating() {
        let vars = snapshot(&[("ups.load", "25")]);
        assert_eq!(load(&vars), Load { load: 25, power: 0 });
    }

    #[test]
    fn battery_reads_and_defaults() {
        let vars = snapshot(&[("battery.charge", "97"), ("battery.voltage", "13.6")]);
        let battery = battery(&vars);
        assert_eq!(battery.charge, 97);
        assert_eq!(battery.low, 0);
        assert!((battery.voltage - 13.6).abs() < f64::EPSILON);
    }

    #[test]
    fn mismatched_kind_reads_as_zero() {
        // A whole-number voltage is inferred as an integer, not a float.
        let vars = snapshot(&[("battery.voltage", "13"), ("battery.charge", "97.5")]);
        assert_eq!(battery(&vars), Battery::default());
    }

    #[test]
    fn status_decoding() {
        let vars = snapshot(&[("ups.status", "OL CHRG")]);
        let status = status(&vars);
        assert_eq!(status.description(), "Online, charging");
        assert_eq!(status.raw(), "OL CHRG");
    }

    #[test]
    fn missing_status_is_empty() {
        let status = status(&[]);
        assert_eq!(status.raw(), "");
        assert!(!status.is_online());
    }

    #[test]
    fn runtime_requires_variable() {
        let vars = snapshot(&[("battery.runtime", "1800")]);
        assert_eq!(runtime(&vars).unwrap(), 1800);
        assert!(matches!(
            runtime(&[]),
            Err(DeviceError::VariableNotFound(name)) if name == "battery.runtime"
        ));
    }
}
