// Copyright 2025 The EMachine Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use ndarray::Array2;

use crate::{declare_entity, declare_family};

declare_entity! {
    /// Winding parameters common to every winding layout.
    pub struct Winding {
        is_reverse_wind ("is_reverse_wind"): Option<bool> = Some(false),
        /// Slot shift of the whole winding
        nslot_shift_wind ("Nslot_shift_wind"): Option<i64> = Some(0),
        /// Number of phases
        qs ("qs"): Option<i64> = Some(3),
        /// Turns per coil
        ntcoil ("Ntcoil"): Option<i64> = Some(7),
        /// Parallel circuits per phase
        npcpp ("Npcpp"): Option<i64> = Some(2),
        /// 0 star, 1 triangle
        type_connection ("type_connection"): Option<i64> = Some(0),
        /// Pole pair number
        p ("p"): Option<i64> = Some(3),
        /// End winding length [m]
        lewout ("Lewout"): Option<f64> = Some(0.015),
    }
}

declare_entity! {
    /// Distributed single-layer winding.
    pub struct WindingDW1L: Winding {
        /// Coil span in slots
        coil_pitch ("coil_pitch"): Option<i64> = Some(5),
    }
}

declare_entity! {
    /// Winding given by an explicit slot/phase matrix.
    pub struct WindingUD: Winding {
        user_wind_mat ("user_wind_mat"): Option<Array2<f64>> = None,
    }
}

declare_family! {
    /// Any winding class.
    pub enum AnyWinding(Winding) {
        Winding,
        WindingDW1L,
        WindingUD,
    }
}

impl AnyWinding {
    pub fn p(&self) -> Option<i64> {
        match self {
            AnyWinding::Winding(w) => w.p,
            AnyWinding::WindingDW1L(w) => w.p,
            AnyWinding::WindingUD(w) => w.p,
        }
    }

    pub fn qs(&self) -> Option<i64> {
        match self {
            AnyWinding::Winding(w) => w.qs,
            AnyWinding::WindingDW1L(w) => w.qs,
            AnyWinding::WindingUD(w) => w.qs,
        }
    }

    /// Coil span in slots, for layouts that define one.
    pub fn coil_pitch(&self) -> Option<i64> {
        match self {
            AnyWinding::WindingDW1L(w) => w.coil_pitch,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::entity::{Dict, Schema};

    fn dict(value: serde_json::Value) -> Dict {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn user_matrix_loads() {
        let w = WindingUD::from_dict(&dict(json!({
            "user_wind_mat": [[1, 0, -1], [0, 1, 0]],
            "p": 2,
        })))
        .unwrap();
        assert_eq!(Some(2), w.p);
        assert_eq!((2, 3), w.user_wind_mat.as_ref().unwrap().dim());
    }

    #[test]
    fn family_accessors() {
        let w = AnyWinding::from(WindingDW1L::default());
        assert_eq!(Some(3), w.p());
        assert_eq!(Some(5), w.coil_pitch());
        assert_eq!(None, AnyWinding::default().coil_pitch());
    }
}
