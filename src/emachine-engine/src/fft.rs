// Copyright 2025 The EMachine Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use ndarray::{Array1, ArrayView1};
use num_complex::Complex64;
use rustfft::FftPlanner;

use crate::common::Result;
use crate::data::axis::uniform_step;
use crate::data_err;

/// Single-sided amplitude spectrum of a real signal sampled on a uniform
/// time axis.  Returns the bin frequencies [Hz] and amplitudes, so a
/// sinusoid of amplitude `A` shows up as `A` in its bin.
pub fn magnitude_spectrum(
    time: &Array1<f64>,
    signal: ArrayView1<f64>,
) -> Result<(Array1<f64>, Array1<f64>)> {
    let n = signal.len();
    if n == 0 {
        return data_err!(EmptyAxis, "cannot transform an empty signal".to_owned());
    }
    if time.len() != n {
        return data_err!(
            ShapeMismatch,
            format!("{} samples on a {} point time axis", n, time.len())
        );
    }
    if n == 1 {
        return Ok((Array1::zeros(1), Array1::from(vec![signal[0].abs()])));
    }
    let dt = uniform_step(time)?;

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(n);
    let mut buf: Vec<Complex64> = signal.iter().map(|&x| Complex64::new(x, 0.0)).collect();
    fft.process(&mut buf);

    let nbins = n / 2 + 1;
    let scale = n as f64;
    let freqs = Array1::from_shape_fn(nbins, |k| k as f64 / (scale * dt));
    let mags = Array1::from_shape_fn(nbins, |k| {
        // DC and, for even lengths, the Nyquist bin have no mirror image
        if k == 0 || 2 * k == n {
            buf[k].norm() / scale
        } else {
            2.0 * buf[k].norm() / scale
        }
    });
    Ok((freqs, mags))
}
