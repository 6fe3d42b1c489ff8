// Copyright 2025 The EMachine Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::collections::BTreeMap;

use ndarray::{Array1, ArrayD, Axis as NdAxis};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::axis::{Axis, bracket, check_increasing};
use super::request::{AxisRequest, Selection};
use crate::common::Result;
use crate::data_err;

/// A sampled field quantity and the named axes it is sampled along.  The
/// shape of `values` always matches the axis lengths, in axis order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldData {
    pub name: String,
    pub symbol: String,
    pub unit: String,
    pub axes: Vec<Axis>,
    pub values: ArrayD<f64>,
    /// Named scalars an axis may be expressed relative to, e.g. the
    /// fundamental frequency under `"elec_order"`.
    #[serde(default)]
    pub normalizations: BTreeMap<String, f64>,
}

/// Values pulled out along a main axis: rank 1, or rank 2 with the
/// components kept as the second dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    pub axis: Array1<f64>,
    pub values: ArrayD<f64>,
}

impl FieldData {
    pub fn new(
        name: &str,
        symbol: &str,
        unit: &str,
        axes: Vec<Axis>,
        values: ArrayD<f64>,
    ) -> Result<Self> {
        let expected: Vec<usize> = axes.iter().map(Axis::len).collect();
        if values.shape() != expected.as_slice() {
            return data_err!(
                ShapeMismatch,
                format!(
                    "{name}: values have shape {:?}, axes give {:?}",
                    values.shape(),
                    expected
                )
            );
        }
        for axis in &axes {
            if !axis.is_components() {
                check_increasing(&axis.name, axis.numeric_values()?)?;
            }
        }
        Ok(FieldData {
            name: name.to_owned(),
            symbol: symbol.to_owned(),
            unit: unit.to_owned(),
            axes,
            values,
            normalizations: BTreeMap::new(),
        })
    }

    pub fn with_normalization(mut self, name: &str, value: f64) -> Self {
        self.normalizations.insert(name.to_owned(), value);
        self
    }

    pub fn axis(&self, name: &str) -> Result<(usize, &Axis)> {
        match self.axes.iter().enumerate().find(|(_, axis)| axis.name == name) {
            Some(found) => Ok(found),
            None => data_err!(
                UnknownAxis,
                format!("{} has no {} axis", self.name, name)
            ),
        }
    }

    pub fn has_axis(&self, name: &str) -> bool {
        self.axes.iter().any(|axis| axis.name == name)
    }

    pub fn components_axis(&self) -> Option<&Axis> {
        self.axes.iter().find(|axis| axis.is_components())
    }

    pub fn normalization(&self, name: &str) -> Result<f64> {
        match self.normalizations.get(name) {
            Some(&value) if value != 0.0 => Ok(value),
            Some(_) => data_err!(
                ZeroNormalization,
                format!("{}: normalization {} is zero", self.name, name)
            ),
            None => data_err!(
                MissingNormalization,
                format!("{} has no {} normalization", self.name, name)
            ),
        }
    }

    /// Numeric coordinates of an axis, divided by the requested
    /// normalization if any.
    fn coordinates(&self, axis: &Axis, request: &AxisRequest) -> Result<Array1<f64>> {
        let values = axis.numeric_values()?;
        match &request.normalization {
            Some(norm) => Ok(values / self.normalization(norm)?),
            None => Ok(values.clone()),
        }
    }

    /// Slice every axis but `main` per `slices` and return the values along
    /// `main`.  Axes without a request keep all their components, or are
    /// dropped when they have a single position.
    pub fn get_along(&self, main: &AxisRequest, slices: &[AxisRequest]) -> Result<Extracted> {
        let (main_index, main_axis) = self.axis(&main.name)?;
        if !matches!(main.selection, Selection::Whole | Selection::Range(_, _)) {
            return data_err!(
                BadRequest,
                format!("main axis {} must be taken whole or by range", main.name)
            );
        }
        for request in slices {
            self.axis(&request.name)?;
            if request.name == main.name {
                return data_err!(
                    BadRequest,
                    format!("{} is both the main axis and a slice", main.name)
                );
            }
        }

        let mut main_values = self.coordinates(main_axis, main)?;
        let mut values = self.values.clone();
        let mut kept: Vec<usize> = Vec::new();

        // back to front, so removing an axis leaves earlier indices valid
        for (i, axis) in self.axes.iter().enumerate().rev() {
            let request = if i == main_index {
                Some(main)
            } else {
                slices.iter().find(|r| r.name == axis.name)
            };
            let selection = match request {
                Some(request) => request.selection.clone(),
                None if axis.is_components() => Selection::Whole,
                None if axis.len() == 1 => Selection::Index(0),
                None => {
                    return data_err!(
                        AmbiguousAxis,
                        format!(
                            "{}: say which {} to take ({} positions)",
                            self.name,
                            axis.name,
                            axis.len()
                        )
                    );
                }
            };

            let ax = NdAxis(i);
            match selection {
                Selection::Whole => kept.push(i),
                Selection::Index(index) => {
                    if index >= axis.len() {
                        return data_err!(
                            IndexOutOfRange,
                            format!("{}[{}] is out of range ({})", axis.name, index, axis.len())
                        );
                    }
                    values = values.index_axis_move(ax, index);
                }
                Selection::Indices(indices) => {
                    if let Some(bad) = indices.iter().find(|&&index| index >= axis.len()) {
                        return data_err!(
                            IndexOutOfRange,
                            format!("{}[{}] is out of range ({})", axis.name, bad, axis.len())
                        );
                    }
                    values = values.select(ax, &indices);
                    kept.push(i);
                }
                Selection::Value(x) => {
                    let coords = match request {
                        Some(request) => self.coordinates(axis, request)?,
                        None => axis.numeric_values()?.clone(),
                    };
                    let (lo, hi, t) = bracket(&coords, x)?;
                    let below = values.index_axis(ax, lo).to_owned();
                    let above = values.index_axis(ax, hi).to_owned();
                    values = below * (1.0 - t) + above * t;
                }
                Selection::Range(min, max) => {
                    let coords = if i == main_index {
                        main_values.clone()
                    } else {
                        match request {
                            Some(request) => self.coordinates(axis, request)?,
                            None => axis.numeric_values()?.clone(),
                        }
                    };
                    let inside: Vec<usize> = coords
                        .iter()
                        .enumerate()
                        .filter(|(_, v)| (min..=max).contains(*v))
                        .map(|(k, _)| k)
                        .collect();
                    if inside.is_empty() {
                        return data_err!(
                            ValueOutOfRange,
                            format!("no {} in [{}, {}]", axis.name, min, max)
                        );
                    }
                    values = values.select(ax, &inside);
                    if i == main_index {
                        main_values = coords.select(NdAxis(0), &inside);
                    }
                    kept.push(i);
                }
            }
        }

        // kept was filled back to front
        kept.reverse();
        match kept.as_slice() {
            [_] => {}
            [first, _] => {
                if *first != main_index {
                    values = values.reversed_axes();
                }
            }
            _ => {
                return data_err!(
                    BadRequest,
                    format!(
                        "{}: extraction along {} leaves {} axes",
                        self.name,
                        main.name,
                        kept.len()
                    )
                );
            }
        }

        debug!(
            field = %self.name,
            main = %main,
            shape = ?values.shape(),
            "extracted field data"
        );
        Ok(Extracted {
            axis: main_values,
            values,
        })
    }
}
