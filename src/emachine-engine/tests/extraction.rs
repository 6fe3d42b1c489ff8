// Copyright 2025 The EMachine Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Extraction of comparable series from field containers, the time plot
//! built on top of it, and the checks run on laminations before use.

use std::f64::consts::PI;

use float_cmp::approx_eq;
use ndarray::{Array, Array1, IxDyn, array};

use emachine_engine::check::{check_lamination, check_magnet};
use emachine_engine::data::{Axis, AxisRequest, FieldData, demultiplex};
use emachine_engine::plot::{PanelKind, TimePlotOptions, plot_a_time, significant_ticks};
use emachine_engine::{
    AnyLamination, AnyMagnet, AnySlot, ErrorCode, LamSlot, LamSlotWind, Lamination, MagnetType10,
    SlotW26,
};

const N: usize = 64;
const DT: f64 = 1e-3;

/// Three phase currents at 125 Hz, sampled at two angular positions; the
/// second position lags by a quarter period.
fn currents(name: &str, amplitude: f64) -> FieldData {
    let time = Array1::from_shape_fn(N, |i| i as f64 * DT);
    let values = Array::from_shape_fn(IxDyn(&[N, 2, 3]), |ix| {
        let shift = 2.0 * PI * ix[2] as f64 / 3.0 + PI / 2.0 * ix[1] as f64;
        amplitude * (2.0 * PI * 125.0 * time[ix[0]] - shift).cos() + 0.5
    });
    FieldData::new(
        name,
        "I",
        "A",
        vec![
            Axis::numeric("time", "s", time),
            Axis::numeric("angle", "rad", array![0.0, PI]),
            Axis::components("phase", &["A", "B", "C"]),
        ],
        values,
    )
    .unwrap()
    .with_normalization("elec_order", 125.0)
}

#[test]
fn normalized_comparison_starts_at_one() {
    let a = currents("Ia", 2.0);
    let b = currents("Ib", 3.0);
    let (time, series) = a
        .compare_along("time", &["angle[0]", "phase[0, 1, 2]"], &[&b], "SI", true)
        .unwrap();
    assert_eq!(N, time.len());
    for values in &series {
        for lane in demultiplex(values) {
            assert_eq!(1.0, lane[0]);
        }
    }
}

#[test]
fn angle_slice_by_value_interpolates() {
    let a = currents("Ia", 2.0);
    let at_zero = a.get_along(
        &AxisRequest::whole("time"),
        &[AxisRequest::at_value("angle", 0.0), AxisRequest::at_index("phase", 0)],
    );
    let at_zero = at_zero.unwrap();
    assert_eq!(&[N], at_zero.values.shape());
    assert!(approx_eq!(f64, 2.5, at_zero.values[[0]], epsilon = 1e-12));

    let err = a
        .get_along(
            &AxisRequest::whole("time"),
            &[AxisRequest::at_value("angle", 7.0), AxisRequest::at_index("phase", 0)],
        )
        .unwrap_err();
    assert_eq!(ErrorCode::ValueOutOfRange, err.code);
}

#[test]
fn unsliced_axes_must_be_explicit() {
    let a = currents("Ia", 2.0);
    let err = a.compare_along("time", &["phase[0]"], &[], "SI", false).unwrap_err();
    assert_eq!(ErrorCode::AmbiguousAxis, err.code);

    let err = a
        .compare_along("time", &["angle[0]", "phase[3]"], &[], "SI", false)
        .unwrap_err();
    assert_eq!(ErrorCode::IndexOutOfRange, err.code);
}

#[test]
fn peer_on_a_descending_grid_is_an_error() {
    let a = FieldData::new(
        "a",
        "x",
        "",
        vec![Axis::numeric("time", "s", array![0.0, 1.0, 2.0])],
        array![1.0, 2.0, 3.0].into_dyn(),
    )
    .unwrap();
    let descending = Axis::numeric("time", "s", array![3.0, 2.0, 1.0, 0.0]);
    let err = FieldData::new(
        "b",
        "x",
        "",
        vec![descending.clone()],
        array![0.0, 1.0, 2.0, 3.0].into_dyn(),
    )
    .unwrap_err();
    assert_eq!(ErrorCode::NonUniformAxis, err.code);

    // a container deserialized without validation still fails cleanly
    let mut b = FieldData::new(
        "b",
        "x",
        "",
        vec![Axis::numeric("time", "s", array![0.0, 1.0, 2.0, 3.0])],
        array![0.0, 1.0, 2.0, 3.0].into_dyn(),
    )
    .unwrap();
    b.axes = vec![descending];
    let err = a.compare_along("time", &[], &[&b], "SI", false).unwrap_err();
    assert_eq!(ErrorCode::NonUniformAxis, err.code);
}

#[test]
fn ticks_only_for_significant_bins() {
    assert_eq!(vec![0, 2], significant_ticks(&[array![0.5, 0.005, 0.02, 0.0]]));
}

#[test]
fn time_plot_of_one_container() {
    let a = currents("Ia", 2.0);
    let options = TimePlotOptions {
        index_list: vec![0, 2],
        is_fft: true,
        ..Default::default()
    };
    let plot = plot_a_time(&a, &[], &options).unwrap();

    let time = &plot.time;
    assert_eq!("Ia over time at angle[0]", time.title);
    assert_eq!("Time [s]", time.xlabel);
    assert_eq!(r"$I\, [A]$", time.ylabel);
    assert_eq!(PanelKind::Curve, time.kind);
    let legends: Vec<&str> = time.series.iter().map(|s| s.legend.as_str()).collect();
    assert_eq!(vec!["Ia: A", "Ia: C"], legends);
    assert_ne!(time.series[0].color, time.series[1].color);
    assert_eq!(N, time.series[1].values.len());

    let fft = plot.fft.unwrap();
    assert_eq!("FFT of Ia", fft.title);
    assert_eq!("Frequency [Hz]", fft.xlabel);
    assert_eq!(PanelKind::Bargraph, fft.kind);
    assert_eq!(2, fft.series.len());
    let ticks = fft.xticks.unwrap();
    assert_eq!(2, ticks.len());
    assert_eq!(0.0, ticks[0]);
    assert!(approx_eq!(f64, 125.0, ticks[1], epsilon = 1e-9));
}

#[test]
fn time_plot_comparison_in_electrical_orders() {
    let a = currents("Ia", 2.0);
    let b = currents("Ib", 3.0);
    let options = TimePlotOptions {
        alpha: Some(PI),
        is_fft: true,
        is_elecorder: true,
        freq_max: 250.0,
        is_norm: true,
        legend_list: vec!["ref".to_owned(), "new".to_owned()],
        ..Default::default()
    };
    let plot = plot_a_time(&a, &[&b], &options).unwrap();

    assert!(plot.time.title.starts_with("Comparison over time at angle="));
    assert_eq!(r"$\frac{I}{I_0}\, [A]$", plot.time.ylabel);
    let legends: Vec<&str> = plot.time.series.iter().map(|s| s.legend.as_str()).collect();
    assert_eq!(vec!["ref: A", "new: A"], legends);

    let fft = plot.fft.unwrap();
    assert_eq!("Comparison of FFT", fft.title);
    assert_eq!("Electrical order []", fft.xlabel);
    // orders up to 250 / 125 = 2
    let last = fft.x[fft.x.len() - 1];
    assert!(last <= 2.0 + 1e-9);
    let ticks = fft.xticks.unwrap();
    assert!(ticks.iter().any(|t| approx_eq!(f64, 1.0, *t, epsilon = 1e-9)));
}

#[test]
fn containers_without_angle_or_components() {
    let time = Array1::from_shape_fn(8, |i| i as f64 * DT);
    let torque = FieldData::new(
        "Tem",
        "T_{em}",
        "Nm",
        vec![Axis::numeric("time", "s", time)],
        array![1.0, 2.0, 3.0, 4.0, 4.0, 3.0, 2.0, 1.0].into_dyn(),
    )
    .unwrap();
    let plot = plot_a_time(&torque, &[], &TimePlotOptions::default()).unwrap();
    assert_eq!("Tem over time", plot.time.title);
    assert_eq!(1, plot.time.series.len());
    assert_eq!("Tem", plot.time.series[0].legend);
    assert!(plot.fft.is_none());

    let mut buf = Vec::new();
    plot.write_json(&mut buf).unwrap();
    let doc: serde_json::Value = serde_json::from_slice(&buf).unwrap();
    assert_eq!("curve", doc["time"]["kind"]);
    assert_eq!("#1f77b4", doc["time"]["series"][0]["color"]);
    assert!(doc["fft"].is_null());
}

#[test]
fn plot_options_reject_missing_legends() {
    let a = currents("Ia", 2.0);
    let b = currents("Ib", 3.0);
    let options = TimePlotOptions {
        legend_list: vec!["only one".to_owned()],
        ..Default::default()
    };
    let err = plot_a_time(&a, &[&b], &options).unwrap_err();
    assert_eq!(ErrorCode::BadRequest, err.code);
}

fn stator(slot: SlotW26) -> AnyLamination {
    AnyLamination::from(LamSlotWind {
        parent: LamSlot {
            parent: Lamination {
                rint: Some(0.1),
                rext: Some(0.2),
                is_internal: Some(false),
                ..Default::default()
            },
            slot: AnySlot::from(slot),
        },
        ..Default::default()
    })
}

#[test]
fn lamination_check_messages() {
    assert_eq!(None, check_lamination(&stator(SlotW26::default())));

    let missing = SlotW26 {
        r2: None,
        ..Default::default()
    };
    assert_eq!(
        Some("You must set R2 !".to_owned()),
        check_lamination(&stator(missing))
    );

    let wide = SlotW26 {
        w0: Some(0.01),
        ..Default::default()
    };
    assert_eq!(
        Some("You must have W0 < 2*R1".to_owned()),
        check_lamination(&stator(wide))
    );

    let deep = SlotW26 {
        h1: Some(0.2),
        ..Default::default()
    };
    assert_eq!(
        Some("The slot height is greater than the lamination !".to_owned()),
        check_lamination(&stator(deep))
    );
}

#[test]
fn magnet_check_messages() {
    assert_eq!(None, check_magnet(&AnyMagnet::from(MagnetType10::default())));
    let magnet = MagnetType10 {
        h_mag: None,
        ..Default::default()
    };
    assert_eq!(
        Some("You must set Hmag !".to_owned()),
        check_magnet(&AnyMagnet::from(magnet))
    );
}
