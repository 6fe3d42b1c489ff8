// Copyright 2025 The EMachine Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Conversion between the physical units carried by field data.
//!
//! A unit string is either a known base unit (`"m"`, `"T"`, `"deg"`, ...)
//! or a known base unit with a single SI prefix (`"mm"`, `"kA"`, `"mT"`).
//! Compound units are only convertible to themselves.

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::common::{Error, ErrorCode, ErrorKind, Result};

/// A parsed unit: the physical dimension it measures and its scale
/// relative to the SI unit of that dimension.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Unit {
    pub dimension: &'static str,
    pub scale: f64,
}

lazy_static! {
    static ref BASE_UNITS: HashMap<&'static str, Unit> = {
        let mut units = HashMap::new();
        let mut add = |name: &'static str, dimension: &'static str, scale: f64| {
            units.insert(name, Unit { dimension, scale });
        };
        add("", "dimensionless", 1.0);
        add("m", "length", 1.0);
        add("s", "time", 1.0);
        add("Hz", "frequency", 1.0);
        add("rpm", "frequency", 1.0 / 60.0);
        add("T", "flux_density", 1.0);
        add("Wb", "flux", 1.0);
        add("A", "current", 1.0);
        add("V", "voltage", 1.0);
        add("N", "force", 1.0);
        add("Nm", "torque", 1.0);
        add("W", "power", 1.0);
        add("Pa", "pressure", 1.0);
        add("rad", "angle", 1.0);
        add("deg", "angle", std::f64::consts::PI / 180.0);
        units
    };
    static ref PREFIXES: Vec<(&'static str, f64)> = vec![
        ("G", 1e9),
        ("M", 1e6),
        ("k", 1e3),
        ("c", 1e-2),
        ("m", 1e-3),
        ("u", 1e-6),
        ("µ", 1e-6),
        ("n", 1e-9),
    ];
}

fn unknown_unit(unit: &str) -> Error {
    Error::new(
        ErrorKind::Data,
        ErrorCode::UnknownUnit,
        Some(format!("unknown unit '{unit}'")),
    )
}

/// Parse a unit string into its dimension and SI scale.
pub fn parse_unit(unit: &str) -> Result<Unit> {
    let unit = unit.trim();
    if let Some(base) = BASE_UNITS.get(unit) {
        return Ok(*base);
    }

    for (prefix, factor) in PREFIXES.iter() {
        if let Some(rest) = unit.strip_prefix(prefix) {
            // prefixes only apply to non-empty, non-angle base units
            if rest.is_empty() || rest == "deg" || rest == "rpm" {
                continue;
            }
            if let Some(base) = BASE_UNITS.get(rest) {
                return Ok(Unit {
                    dimension: base.dimension,
                    scale: base.scale * factor,
                });
            }
        }
    }

    Err(unknown_unit(unit))
}

/// The factor `k` such that a value `x` expressed in `from` equals `k * x`
/// expressed in `to`.
pub fn conversion_factor(from: &str, to: &str) -> Result<f64> {
    if from.trim() == to.trim() {
        return Ok(1.0);
    }
    let src = parse_unit(from)?;
    let dst = parse_unit(to)?;
    if src.dimension != dst.dimension {
        return Err(Error::new(
            ErrorKind::Data,
            ErrorCode::UnitMismatch,
            Some(format!(
                "cannot convert '{from}' ({}) to '{to}' ({})",
                src.dimension, dst.dimension
            )),
        ));
    }

    Ok(src.scale / dst.scale)
}

pub fn convert(value: f64, from: &str, to: &str) -> Result<f64> {
    Ok(value * conversion_factor(from, to)?)
}
