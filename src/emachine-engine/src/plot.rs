// Copyright 2025 The EMachine Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Render-ready descriptions of field-over-time figures.  Drawing them is
//! left to whoever consumes the serialized panels.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::colors::{Color, gen_color};
use crate::common::{Error, ErrorCode, ErrorKind, Result};
use crate::data::{AxisRequest, ELEC_ORDER, FieldData, SI, demultiplex};
use crate::data_err;

/// Spectrum bins at or below this magnitude get no tick of their own.
pub const SIGNIFICANT_MAGNITUDE: f64 = 0.01;
pub const DEFAULT_FREQ_MAX: f64 = 20000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimePlotOptions {
    /// Positions to take from a components axis.
    pub index_list: Vec<usize>,
    /// Angle to slice at; takes precedence over `alpha_index`.
    pub alpha: Option<f64>,
    pub alpha_index: usize,
    /// Add a spectrum panel below the time panel.
    pub is_fft: bool,
    /// Spectrum against electrical order instead of Hz.
    pub is_elecorder: bool,
    /// Upper bound of the spectrum [Hz].
    pub freq_max: f64,
    pub is_norm: bool,
    pub unit: String,
    /// One legend per container, reference first; defaults to their names.
    pub legend_list: Vec<String>,
    pub color_list: Vec<Color>,
    pub y_min: Option<f64>,
    pub y_max: Option<f64>,
    /// Upper bound of the spectrum panel's y axis.
    pub mag_max: Option<f64>,
}

impl Default for TimePlotOptions {
    fn default() -> Self {
        TimePlotOptions {
            index_list: vec![0],
            alpha: None,
            alpha_index: 0,
            is_fft: false,
            is_elecorder: false,
            freq_max: DEFAULT_FREQ_MAX,
            is_norm: false,
            unit: SI.to_owned(),
            legend_list: vec![],
            color_list: vec![],
            y_min: None,
            y_max: None,
            mag_max: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelKind {
    Curve,
    Bargraph,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub legend: String,
    pub color: Color,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub title: String,
    pub xlabel: String,
    pub ylabel: String,
    pub kind: PanelKind,
    pub x: Vec<f64>,
    pub series: Vec<Series>,
    pub y_min: Option<f64>,
    pub y_max: Option<f64>,
    pub xticks: Option<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimePlot {
    pub time: Panel,
    pub fft: Option<Panel>,
}

impl TimePlot {
    pub fn write_json(&self, writer: impl Write) -> Result<()> {
        serde_json::to_writer_pretty(writer, self).map_err(|err| {
            Error::new(
                ErrorKind::Import,
                ErrorCode::Generic,
                Some(format!("failed to write plot JSON: {err}")),
            )
        })
    }

    /// Persist the figure description at `path` as JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|err| {
            Error::new(
                ErrorKind::Import,
                ErrorCode::Generic,
                Some(format!("failed to create {}: {err}", path.display())),
            )
        })?;
        self.write_json(BufWriter::new(file))
    }
}

/// Bins worth a tick: bin 0, then every bin above
/// [`SIGNIFICANT_MAGNITUDE`] in any spectrum, in first-seen order.
pub fn significant_ticks(spectra: &[Array1<f64>]) -> Vec<usize> {
    let mut ticks = vec![0];
    for spectrum in spectra {
        for (k, y) in spectrum.iter().enumerate() {
            if y.abs() > SIGNIFICANT_MAGNITUDE && !ticks.contains(&k) {
                ticks.push(k);
            }
        }
    }
    ticks
}

fn build_series(legends: &[String], colors: &[Color], values: Vec<Array1<f64>>) -> Result<Vec<Series>> {
    if values.len() != legends.len() {
        return data_err!(
            ShapeMismatch,
            format!("{} series for {} legends", values.len(), legends.len())
        );
    }
    Ok(legends
        .iter()
        .zip(values)
        .enumerate()
        .map(|(k, (legend, values))| Series {
            legend: legend.clone(),
            color: colors[k % colors.len()],
            values: values.to_vec(),
        })
        .collect())
}

/// Describe `data` (and the peers in `data_list`) over time at one angle,
/// with an optional spectrum panel.
pub fn plot_a_time(
    data: &FieldData,
    data_list: &[&FieldData],
    options: &TimePlotOptions,
) -> Result<TimePlot> {
    let mut all = vec![data];
    all.extend_from_slice(data_list);

    let legend_list: Vec<String> = if options.legend_list.is_empty() {
        all.iter().map(|d| d.name.clone()).collect()
    } else {
        options.legend_list.clone()
    };
    if legend_list.len() < all.len() {
        return data_err!(
            BadRequest,
            format!("{} legends for {} containers", legend_list.len(), all.len())
        );
    }

    let mut legends = Vec::new();
    let mut components = None;
    for (d, legend) in all.iter().zip(legend_list.iter()) {
        let Some(axis) = d.components_axis() else {
            legends.push(legend.clone());
            continue;
        };
        let labels = axis.labels().unwrap_or_default();
        for &j in &options.index_list {
            let Some(label) = labels.get(j) else {
                return data_err!(
                    IndexOutOfRange,
                    format!("{}[{}] is out of range ({})", axis.name, j, labels.len())
                );
            };
            legends.push(format!("{legend}: {label}"));
        }
        if components.is_none() {
            components = Some(axis.name.clone());
        }
    }

    let colors = if options.color_list.is_empty() {
        gen_color(legends.len())
    } else {
        options.color_list.clone()
    };

    let unit = if options.unit == SI {
        data.unit.clone()
    } else {
        options.unit.clone()
    };

    let ylabel = if options.is_norm {
        format!(r"$\frac{{{0}}}{{{0}_0}}\, [{1}]$", data.symbol, unit)
    } else {
        format!(r"${}\, [{}]$", data.symbol, unit)
    };

    let angle = match options.alpha {
        Some(alpha) => AxisRequest::at_value("angle", alpha),
        None => AxisRequest::at_index("angle", options.alpha_index),
    };
    let mut slices = Vec::new();
    let at = if data.has_axis(&angle.name) {
        slices.push(angle.to_string());
        format!(" at {angle}")
    } else {
        String::new()
    };
    if let Some(name) = &components {
        slices.push(AxisRequest::indices(name, &options.index_list).to_string());
    }
    let slices: Vec<&str> = slices.iter().map(String::as_str).collect();

    let title = if data_list.is_empty() {
        format!("{} over time{at}", data.name)
    } else {
        format!("Comparison over time{at}")
    };

    debug!(field = %data.name, peers = data_list.len(), slices = ?slices, "plot over time");
    let (time, ydatas) = data.compare_along("time", &slices, data_list, &unit, options.is_norm)?;
    let ydata: Vec<Array1<f64>> = ydatas.iter().flat_map(demultiplex).collect();

    let time_panel = Panel {
        title,
        xlabel: "Time [s]".to_owned(),
        ylabel,
        kind: PanelKind::Curve,
        x: time.to_vec(),
        series: build_series(&legends, &colors, ydata)?,
        y_min: options.y_min,
        y_max: options.y_max,
        xticks: None,
    };

    let fft_panel = if options.is_fft {
        Some(fft_panel(data, data_list, options, &slices, &unit, &legends, &colors)?)
    } else {
        None
    };

    Ok(TimePlot {
        time: time_panel,
        fft: fft_panel,
    })
}

fn fft_panel(
    data: &FieldData,
    data_list: &[&FieldData],
    options: &TimePlotOptions,
    slices: &[&str],
    unit: &str,
    legends: &[String],
    colors: &[Color],
) -> Result<Panel> {
    let title = if data_list.is_empty() {
        format!("FFT of {}", data.name)
    } else {
        "Comparison of FFT".to_owned()
    };
    let ylabel = if data.symbol == "Magnitude" {
        format!("Magnitude [{unit}]")
    } else {
        format!(r"$|\widehat{{{}}}|\, [{}]$", data.symbol, unit)
    };

    let (freqs, xlabel) = if options.is_elecorder {
        let elec_max = options.freq_max / data.normalization(ELEC_ORDER)?;
        (
            AxisRequest::range("freqs", 0.0, elec_max).normalized(ELEC_ORDER),
            "Electrical order []",
        )
    } else {
        (
            AxisRequest::range("freqs", 0.0, options.freq_max),
            "Frequency [Hz]",
        )
    };

    let (freqs, ydatas) =
        data.compare_magnitude_along(&freqs.to_string(), slices, data_list, unit, false)?;
    let ydata: Vec<Array1<f64>> = ydatas.iter().flat_map(demultiplex).collect();
    let xticks = significant_ticks(&ydata)
        .into_iter()
        .map(|k| freqs[k])
        .collect();

    Ok(Panel {
        title,
        xlabel: xlabel.to_owned(),
        ylabel,
        kind: PanelKind::Bargraph,
        x: freqs.to_vec(),
        series: build_series(legends, colors, ydata)?,
        y_min: None,
        y_max: options.mag_max,
        xticks: Some(xticks),
    })
}
