// Copyright 2025 The EMachine Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::common::Result;
use crate::data_err;

/// Relative tolerance on sample spacing for an axis to count as uniform.
const UNIFORM_TOLERANCE: f64 = 1e-6;

/// Positions along an axis: numeric coordinates, or symbolic labels for a
/// components axis (e.g. phase names).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisValues {
    Numeric(Array1<f64>),
    Components(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub name: String,
    pub unit: String,
    pub values: AxisValues,
}

impl Axis {
    pub fn numeric(name: &str, unit: &str, values: Array1<f64>) -> Self {
        Axis {
            name: name.to_owned(),
            unit: unit.to_owned(),
            values: AxisValues::Numeric(values),
        }
    }

    pub fn components(name: &str, labels: &[&str]) -> Self {
        Axis {
            name: name.to_owned(),
            unit: String::new(),
            values: AxisValues::Components(labels.iter().map(|s| (*s).to_owned()).collect()),
        }
    }

    pub fn len(&self) -> usize {
        match &self.values {
            AxisValues::Numeric(values) => values.len(),
            AxisValues::Components(labels) => labels.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_components(&self) -> bool {
        matches!(self.values, AxisValues::Components(_))
    }

    pub fn labels(&self) -> Option<&[String]> {
        match &self.values {
            AxisValues::Components(labels) => Some(labels),
            AxisValues::Numeric(_) => None,
        }
    }

    pub fn numeric_values(&self) -> Result<&Array1<f64>> {
        match &self.values {
            AxisValues::Numeric(values) => Ok(values),
            AxisValues::Components(_) => data_err!(
                BadRequest,
                format!("{} is a components axis", self.name)
            ),
        }
    }
}

/// Sample spacing of a uniformly sampled, increasing axis.
pub fn uniform_step(values: &Array1<f64>) -> Result<f64> {
    if values.len() < 2 {
        return data_err!(EmptyAxis, "a spacing needs at least two samples".to_owned());
    }
    let step = values[1] - values[0];
    if step <= 0.0 {
        return data_err!(NonUniformAxis, "axis values must increase".to_owned());
    }
    let uniform = values
        .windows(2)
        .into_iter()
        .all(|pair| ((pair[1] - pair[0]) - step).abs() <= UNIFORM_TOLERANCE * step);
    if !uniform {
        return data_err!(NonUniformAxis, "axis is not uniformly sampled".to_owned());
    }
    Ok(step)
}

/// Numeric coordinates must be finite and strictly increasing.
pub fn check_increasing(name: &str, values: &Array1<f64>) -> Result<()> {
    if let Some(x) = values.iter().find(|x| !x.is_finite()) {
        return data_err!(NonUniformAxis, format!("{name}: coordinate {x} is not finite"));
    }
    let increasing = values
        .windows(2)
        .into_iter()
        .all(|pair| pair[1] > pair[0]);
    if !increasing {
        return data_err!(NonUniformAxis, format!("{name}: coordinates must increase"));
    }
    Ok(())
}

/// Bracketing indices and weight of `x` on an increasing axis, such that
/// the interpolated value is `y[lo] * (1 - t) + y[hi] * t`.
pub fn bracket(values: &Array1<f64>, x: f64) -> Result<(usize, usize, f64)> {
    let n = values.len();
    if n == 0 {
        return data_err!(EmptyAxis);
    }
    let first = values[0];
    let last = values[n - 1];
    if !(first..=last).contains(&x) {
        return data_err!(
            ValueOutOfRange,
            format!("{x} is outside [{first}, {last}]")
        );
    }
    if n == 1 {
        return Ok((0, 0, 0.0));
    }
    let hi = values
        .iter()
        .position(|v| *v >= x)
        .unwrap_or(n - 1)
        .max(1);
    let lo = hi - 1;
    let span = values[hi] - values[lo];
    let t = if span > 0.0 {
        (x - values[lo]) / span
    } else {
        0.0
    };
    Ok((lo, hi, t))
}

/// Piecewise-linear resampling of `ys`, defined on `xs`, onto `x_new`.
/// Points outside `xs` take the nearest end value.
pub fn interp(xs: &Array1<f64>, ys: ArrayView1<f64>, x_new: &Array1<f64>) -> Result<Array1<f64>> {
    let n = xs.len();
    if n == 0 || n != ys.len() {
        return data_err!(
            ShapeMismatch,
            format!("cannot interpolate {} values on {} points", ys.len(), n)
        );
    }
    check_increasing("interpolation grid", xs)?;
    let first = xs[0];
    let last = xs[n - 1];
    x_new
        .iter()
        .map(|&x| {
            if x.is_nan() {
                return data_err!(ValueOutOfRange, "cannot interpolate at NaN".to_owned());
            }
            let (lo, hi, t) = bracket(xs, x.max(first).min(last))?;
            Ok(ys[lo] * (1.0 - t) + ys[hi] * t)
        })
        .collect::<Result<Vec<f64>>>()
        .map(Array1::from)
}
