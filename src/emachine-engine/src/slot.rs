// Copyright 2025 The EMachine Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use crate::common::{Result, require};
use crate::magnet::{AnyMagnet, MagnetType14};
use crate::{constraint_err, declare_entity, declare_family};

declare_entity! {
    /// A slot shape repeated around a lamination.
    pub struct Slot {
        /// Number of slots
        zs ("Zs"): Option<i64> = Some(36),
    }
}

declare_entity! {
    /// Winding slot with a round bottom and a round top joined by a
    /// straight section, behind a rectangular opening.
    pub struct SlotW26: Slot {
        /// Slot isthmus width [m]
        w0 ("W0"): Option<f64> = Some(0.004),
        /// Slot isthmus height [m]
        h0 ("H0"): Option<f64> = Some(0.001),
        /// Height between the two circle centers [m]
        h1 ("H1"): Option<f64> = Some(0.003),
        /// Bottom circle radius [m]
        r1 ("R1"): Option<f64> = Some(0.003),
        /// Top circle radius [m]
        r2 ("R2"): Option<f64> = Some(0.003),
    }
}

declare_entity! {
    /// Slot holding surface magnets.
    pub struct SlotMag: Slot {
        /// Angle between two magnets of the same slot [rad]
        w3 ("W3"): Option<f64> = Some(0.0),
        magnet ("magnet"): Vec<AnyMagnet> = vec![AnyMagnet::from(MagnetType14::default())],
    }
}

declare_entity! {
    /// Polar magnet slot.
    pub struct SlotMPolar: SlotMag {
        /// Slot opening [rad]
        w0 ("W0"): Option<f64> = Some(0.314),
        /// Slot depth [m]
        h0 ("H0"): Option<f64> = Some(0.0),
    }
}

declare_family! {
    /// Any slot class.
    pub enum AnySlot(Slot) {
        Slot,
        SlotW26,
        SlotMag,
        SlotMPolar,
    }
}

impl SlotW26 {
    pub fn check(&self) -> Result<()> {
        let w0 = require(self.w0, "W0")?;
        let r1 = require(self.r1, "R1")?;
        if 2.0 * r1 <= w0 {
            return constraint_err!(SlotGeometry, "You must have W0 < 2*R1".to_owned());
        }
        Ok(())
    }

    /// Radial height from the bore to the top of the upper circle.
    pub fn comp_height(&self) -> Result<f64> {
        self.check()?;
        let w0 = require(self.w0, "W0")?;
        let h0 = require(self.h0, "H0")?;
        let h1 = require(self.h1, "H1")?;
        let r1 = require(self.r1, "R1")?;
        let r2 = require(self.r2, "R2")?;
        Ok(h0 + (r1 * r1 - w0 * w0 / 4.0).sqrt() + h1 + r2)
    }
}

impl SlotMPolar {
    pub fn check(&self) -> Result<()> {
        let w0 = require(self.w0, "W0")?;
        let w3 = require(self.w3, "W3")?;
        if w3 < 0.0 {
            return constraint_err!(SlotGeometry, "You must have W3 >= 0".to_owned());
        }
        let mut total = 0.0;
        for magnet in self.magnet.iter() {
            if !magnet.is_polar() {
                return constraint_err!(
                    SlotGeometry,
                    format!("SlotMPolar cannot hold a {}", magnet.class_name())
                );
            }
            magnet.check()?;
            total += magnet.width().unwrap_or(0.0);
        }
        let gaps = self.magnet.len().saturating_sub(1) as f64 * w3;
        if total + gaps > w0 {
            return constraint_err!(
                SlotGeometry,
                "The magnets and the gaps between them must fit in W0".to_owned()
            );
        }
        Ok(())
    }

    pub fn comp_height(&self) -> Result<f64> {
        require(self.h0, "H0")
    }
}

impl AnySlot {
    pub fn zs(&self) -> Option<i64> {
        match self {
            AnySlot::Slot(s) => s.zs,
            AnySlot::SlotW26(s) => s.zs,
            AnySlot::SlotMag(s) => s.zs,
            AnySlot::SlotMPolar(s) => s.zs,
        }
    }

    /// The geometric fields a setup page must see filled, in the order it
    /// checks them.
    pub fn required_fields(&self) -> Vec<(&'static str, Option<f64>)> {
        match self {
            AnySlot::SlotW26(s) => vec![
                ("W0", s.w0),
                ("H0", s.h0),
                ("H1", s.h1),
                ("R1", s.r1),
                ("R2", s.r2),
            ],
            AnySlot::SlotMPolar(s) => vec![("W0", s.w0), ("H0", s.h0), ("W3", s.w3)],
            AnySlot::Slot(_) | AnySlot::SlotMag(_) => vec![],
        }
    }

    /// The slot's own geometric constraints.
    pub fn check(&self) -> Result<()> {
        match self {
            AnySlot::SlotW26(s) => s.check(),
            AnySlot::SlotMPolar(s) => s.check(),
            AnySlot::Slot(_) | AnySlot::SlotMag(_) => Ok(()),
        }
    }

    pub fn comp_height(&self) -> Result<f64> {
        match self {
            AnySlot::SlotW26(s) => s.comp_height(),
            AnySlot::SlotMPolar(s) => s.comp_height(),
            AnySlot::Slot(_) | AnySlot::SlotMag(_) => constraint_err!(
                NotImplemented,
                format!("{} has no geometry", self.class_name())
            ),
        }
    }

    pub fn magnets(&self) -> &[AnyMagnet] {
        match self {
            AnySlot::SlotMag(s) => &s.magnet,
            AnySlot::SlotMPolar(s) => &s.magnet,
            AnySlot::Slot(_) | AnySlot::SlotW26(_) => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;

    use super::*;
    use crate::common::ErrorCode;
    use crate::magnet::MagnetType10;

    #[test]
    fn slot_w26_height() {
        let slot = SlotW26 {
            w0: Some(0.006),
            h0: Some(0.001),
            h1: Some(0.002),
            r1: Some(0.005),
            r2: Some(0.003),
            ..Default::default()
        };
        // sqrt(0.005^2 - 0.003^2) = 0.004
        assert!(approx_eq!(
            f64,
            0.010,
            slot.comp_height().unwrap(),
            epsilon = 1e-12
        ));
    }

    #[test]
    fn slot_w26_opening_must_fit_bottom_circle() {
        let slot = SlotW26 {
            w0: Some(0.01),
            r1: Some(0.005),
            ..Default::default()
        };
        let err = slot.check().unwrap_err();
        assert_eq!(ErrorCode::SlotGeometry, err.code);
        assert_eq!("You must have W0 < 2*R1", err.message());
        assert!(slot.comp_height().is_err());
    }

    #[test]
    fn abstract_slot_has_no_height() {
        let err = AnySlot::default().comp_height().unwrap_err();
        assert_eq!(ErrorCode::NotImplemented, err.code);
        assert!(AnySlot::default().check().is_ok());
    }

    #[test]
    fn polar_slot_rejects_flat_magnets() {
        let slot = SlotMPolar {
            parent: SlotMag {
                magnet: vec![AnyMagnet::from(MagnetType10::default())],
                ..Default::default()
            },
            ..Default::default()
        };
        let err = slot.check().unwrap_err();
        assert_eq!("SlotMPolar cannot hold a MagnetType10", err.message());
    }

    #[test]
    fn polar_slot_magnets_must_fit() {
        let mut slot = SlotMPolar::default();
        assert!(slot.check().is_ok());
        slot.w0 = Some(0.001);
        assert!(slot.check().is_err());

        slot.w0 = Some(1.0);
        slot.w3 = Some(-0.1);
        assert_eq!("You must have W3 >= 0", slot.check().unwrap_err().message());
    }

    #[test]
    fn required_fields_order() {
        let keys: Vec<&str> = AnySlot::from(SlotW26::default())
            .required_fields()
            .into_iter()
            .map(|(key, _)| key)
            .collect();
        assert_eq!(vec!["W0", "H0", "H1", "R1", "R2"], keys);
    }
}
