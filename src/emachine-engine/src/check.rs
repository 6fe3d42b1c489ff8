// Copyright 2025 The EMachine Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Validation run before a setup page lets the user move on.  Each check
//! returns `None` when the part is usable, or the message to show.

use crate::lamination::AnyLamination;
use crate::magnet::AnyMagnet;

fn first_missing(fields: &[(&'static str, Option<f64>)]) -> Option<String> {
    fields
        .iter()
        .find(|(_, value)| value.is_none())
        .map(|(key, _)| format!("You must set {key} !"))
}

/// Required fields of the slot, of each hole, then of each axial vent in
/// their declared order,
/// then the geometric constraints, then a positive yoke height.
pub fn check_lamination(lamination: &AnyLamination) -> Option<String> {
    if let Some(slot) = lamination.slot() {
        if let Some(msg) = first_missing(&slot.required_fields()) {
            return Some(msg);
        }
    }
    let vents = &lamination.as_lamination().axial_vent;
    for hole in lamination.holes().iter().chain(vents) {
        if let Some(msg) = first_missing(&hole.required_fields()) {
            return Some(msg);
        }
    }

    if let Err(err) = lamination.check() {
        return Some(err.message());
    }

    match lamination.comp_height_yoke() {
        Err(err) => Some(format!("Unable to compute yoke height:{}", err.message())),
        Ok(yoke) if yoke <= 0.0 => {
            Some("The slot height is greater than the lamination !".to_owned())
        }
        Ok(_) => None,
    }
}

pub fn check_magnet(magnet: &AnyMagnet) -> Option<String> {
    if let Some(msg) = first_missing(&magnet.required_fields()) {
        return Some(msg);
    }
    magnet.check().err().map(|err| err.message())
}
