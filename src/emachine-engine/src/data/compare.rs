// Copyright 2025 The EMachine Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use emachine_core::units::conversion_factor;
use ndarray::{Array1, ArrayD, ArrayView1, Axis as NdAxis};
use tracing::{debug, warn};

use super::axis::interp;
use super::field::{Extracted, FieldData};
use super::request::{AxisRequest, Selection};
use super::SI;
use crate::common::{Error, ErrorCode, ErrorKind, Result};
use crate::data_err;
use crate::fft::magnitude_spectrum;

/// Split an extracted array into one series per kept component, in the
/// order the components were requested.  A rank 1 array is a single series.
pub fn demultiplex(values: &ArrayD<f64>) -> Vec<Array1<f64>> {
    if values.ndim() == 0 {
        return vec![values.iter().copied().collect()];
    }
    values
        .lanes(NdAxis(0))
        .into_iter()
        .map(|lane| lane.to_owned())
        .collect()
}

/// Apply `f` to each series along the first dimension, keeping the rank.
fn map_lanes(
    values: &ArrayD<f64>,
    mut f: impl FnMut(ArrayView1<f64>) -> Result<Array1<f64>>,
) -> Result<ArrayD<f64>> {
    let columns = values
        .lanes(NdAxis(0))
        .into_iter()
        .map(&mut f)
        .collect::<Result<Vec<Array1<f64>>>>()?;
    if values.ndim() == 1 {
        if let Some(column) = columns.into_iter().next() {
            return Ok(column.into_dyn());
        }
        return data_err!(EmptyAxis);
    }
    let views: Vec<ArrayView1<f64>> = columns.iter().map(Array1::view).collect();
    ndarray::stack(NdAxis(1), &views)
        .map(|stacked| stacked.into_dyn())
        .map_err(|err| Error::new(ErrorKind::Data, ErrorCode::ShapeMismatch, Some(err.to_string())))
}

fn same_grid(a: &Array1<f64>, b: &Array1<f64>) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b.iter())
            .all(|(x, y)| (x - y).abs() <= 1e-9 * x.abs().max(1.0))
}

/// Bring a peer's extraction onto the reference grid.
fn align(peer: &FieldData, extracted: Extracted, axis: &Array1<f64>) -> Result<ArrayD<f64>> {
    if same_grid(&extracted.axis, axis) {
        return Ok(extracted.values);
    }
    warn!(
        field = %peer.name,
        from = extracted.axis.len(),
        to = axis.len(),
        "peer sampled on another grid, interpolating"
    );
    map_lanes(&extracted.values, |lane| interp(&extracted.axis, lane, axis))
}

/// Factor taking `data` values to `unit`; `"SI"` keeps the native unit.
fn unit_factor(data: &FieldData, unit: &str) -> Result<f64> {
    if unit == SI || unit == data.unit {
        Ok(1.0)
    } else {
        conversion_factor(&data.unit, unit)
    }
}

/// Divide every series by its first sample.
fn normalize(values: &mut ArrayD<f64>, name: &str) -> Result<()> {
    for mut lane in values.lanes_mut(NdAxis(0)) {
        let Some(&first) = lane.iter().next() else {
            return data_err!(EmptyAxis, format!("{name}: nothing to normalize"));
        };
        if first == 0.0 {
            return data_err!(
                ZeroNormalization,
                format!("{name}: first sample is zero, cannot normalize")
            );
        }
        lane.mapv_inplace(|v| v / first);
    }
    Ok(())
}

fn parse_all(slices: &[&str]) -> Result<Vec<AxisRequest>> {
    slices.iter().map(|s| s.parse()).collect()
}

/// Unit conversion and normalization, the same for every container.
fn finish(
    containers: &[&FieldData],
    mut series: Vec<ArrayD<f64>>,
    unit: &str,
    is_norm: bool,
) -> Result<Vec<ArrayD<f64>>> {
    for (data, values) in containers.iter().zip(series.iter_mut()) {
        let factor = unit_factor(data, unit)?;
        if factor != 1.0 {
            values.mapv_inplace(|v| v * factor);
        }
        if is_norm {
            normalize(values, &data.name)?;
        }
    }
    Ok(series)
}

impl FieldData {
    /// Values along `main` for this container and each of `data_list`,
    /// after slicing the other axes per `slices`.  Peers are resampled on
    /// this container's grid.  Each returned array is rank 1, or rank 2
    /// with one column per kept component.
    pub fn compare_along(
        &self,
        main: &str,
        slices: &[&str],
        data_list: &[&FieldData],
        unit: &str,
        is_norm: bool,
    ) -> Result<(Array1<f64>, Vec<ArrayD<f64>>)> {
        let main: AxisRequest = main.parse()?;
        let slices = parse_all(slices)?;
        debug!(field = %self.name, main = %main, peers = data_list.len(), "compare along");

        let reference = self.get_along(&main, &slices)?;
        let axis = reference.axis;
        let mut series = vec![reference.values];
        for peer in data_list {
            let extracted = peer.get_along(&main, &slices)?;
            series.push(align(peer, extracted, &axis)?);
        }

        let mut containers = vec![self];
        containers.extend_from_slice(data_list);
        Ok((axis, finish(&containers, series, unit, is_norm)?))
    }

    /// Like [`FieldData::compare_along`] over frequencies, returning
    /// magnitude spectra.  `freqs` names the `"freqs"` axis with an optional
    /// range and normalization, e.g. `"freqs=[0,20]{elec_order}"`.
    pub fn compare_magnitude_along(
        &self,
        freqs: &str,
        slices: &[&str],
        data_list: &[&FieldData],
        unit: &str,
        is_norm: bool,
    ) -> Result<(Array1<f64>, Vec<ArrayD<f64>>)> {
        let freqs: AxisRequest = freqs.parse()?;
        if freqs.name != "freqs" {
            return data_err!(
                BadRequest,
                format!("a spectrum is taken along freqs, not {}", freqs.name)
            );
        }
        let slices = parse_all(slices)?;
        debug!(field = %self.name, freqs = %freqs, peers = data_list.len(), "compare magnitude along");

        let reference = self.magnitude_along(&freqs, &slices)?;
        let axis = reference.axis;
        let mut series = vec![reference.values];
        for peer in data_list {
            let extracted = peer.magnitude_along(&freqs, &slices)?;
            series.push(align(peer, extracted, &axis)?);
        }

        let mut containers = vec![self];
        containers.extend_from_slice(data_list);
        Ok((axis, finish(&containers, series, unit, is_norm)?))
    }

    /// Magnitudes along frequency: read from a `"freqs"` axis when the
    /// container has one, otherwise transformed from its `"time"` axis.
    fn magnitude_along(&self, freqs: &AxisRequest, slices: &[AxisRequest]) -> Result<Extracted> {
        if self.has_axis("freqs") {
            let mut extracted = self.get_along(freqs, slices)?;
            extracted.values.mapv_inplace(f64::abs);
            return Ok(extracted);
        }

        let time = self.get_along(&AxisRequest::whole("time"), slices)?;
        let mut hz = None;
        let mags = map_lanes(&time.values, |lane| {
            let (bins, mags) = magnitude_spectrum(&time.axis, lane)?;
            if hz.is_none() {
                hz = Some(bins);
            }
            Ok(mags)
        })?;
        let Some(hz) = hz else {
            return data_err!(EmptyAxis, format!("{}: nothing to transform", self.name));
        };

        let coords = match &freqs.normalization {
            Some(norm) => hz / self.normalization(norm)?,
            None => hz,
        };
        match freqs.selection {
            Selection::Whole => Ok(Extracted {
                axis: coords,
                values: mags,
            }),
            Selection::Range(min, max) => {
                let inside: Vec<usize> = coords
                    .iter()
                    .enumerate()
                    .filter(|(_, f)| (min..=max).contains(*f))
                    .map(|(k, _)| k)
                    .collect();
                if inside.is_empty() {
                    return data_err!(
                        ValueOutOfRange,
                        format!("no frequency in [{min}, {max}]")
                    );
                }
                Ok(Extracted {
                    axis: coords.select(NdAxis(0), &inside),
                    values: mags.select(NdAxis(0), &inside),
                })
            }
            _ => data_err!(
                BadRequest,
                format!("freqs must be taken whole or by range, not {freqs}")
            ),
        }
    }
}
