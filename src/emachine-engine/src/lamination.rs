// Copyright 2025 The EMachine Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::f64::consts::PI;

use crate::common::{Result, require};
use crate::hole::{AnyHole, HoleM53};
use crate::slot::{AnySlot, SlotMPolar};
use crate::winding::AnyWinding;
use crate::{constraint_err, declare_entity, declare_family};

declare_entity! {
    /// A stack of magnetic sheets, rotor or stator.
    pub struct Lamination {
        /// Lamination stack length [m]
        l1 ("L1"): Option<f64> = Some(0.35),
        /// Number of radial ventilation ducts
        nrvd ("Nrvd"): Option<i64> = Some(0),
        /// Radial ventilation duct width [m]
        wrvd ("Wrvd"): Option<f64> = Some(0.0),
        /// Stacking factor
        kf1 ("Kf1"): Option<f64> = Some(0.95),
        is_internal ("is_internal"): Option<bool> = Some(true),
        /// Inner radius [m]
        rint ("Rint"): Option<f64> = Some(0.0),
        /// Outer radius [m]
        rext ("Rext"): Option<f64> = Some(1.0),
        is_stator ("is_stator"): Option<bool> = Some(true),
        axial_vent ("axial_vent"): Vec<AnyHole> = vec![],
    }
}

declare_entity! {
    /// Lamination with slots.
    pub struct LamSlot: Lamination {
        slot ("slot"): AnySlot = AnySlot::default(),
    }
}

declare_entity! {
    /// Slotted lamination carrying a winding.
    pub struct LamSlotWind: LamSlot {
        /// Slot fill factor
        ksfill ("Ksfill"): Option<f64> = None,
        winding ("winding"): AnyWinding = AnyWinding::default(),
    }
}

declare_entity! {
    /// Slotted lamination with surface magnets in its slots.
    pub struct LamSlotMag: LamSlot (LamSlot {
        parent: Lamination {
            is_stator: Some(false),
            ..Default::default()
        },
        slot: AnySlot::from(SlotMPolar::default()),
    }) {}
}

declare_entity! {
    /// Lamination with holes, usually holding buried magnets.
    pub struct LamHole: Lamination (Lamination {
        is_stator: Some(false),
        ..Default::default()
    }) {
        hole ("hole"): Vec<AnyHole> = vec![AnyHole::from(HoleM53::default())],
    }
}

declare_family! {
    /// Any lamination class.
    pub enum AnyLamination(Lamination) {
        Lamination,
        LamSlot,
        LamSlotWind,
        LamSlotMag,
        LamHole,
    }
}

impl Lamination {
    /// Bore radius: the radius facing the airgap.
    #[allow(non_snake_case)]
    pub fn get_Rbo(&self) -> Result<f64> {
        if self.is_internal.unwrap_or(true) {
            require(self.rext, "Rext")
        } else {
            require(self.rint, "Rint")
        }
    }

    fn radial_span(&self) -> Result<f64> {
        Ok(require(self.rext, "Rext")? - require(self.rint, "Rint")?)
    }
}

impl AnyLamination {
    pub fn as_lamination(&self) -> &Lamination {
        match self {
            AnyLamination::Lamination(l) => l,
            AnyLamination::LamSlot(l) => &l.parent,
            AnyLamination::LamSlotWind(l) => &l.parent.parent,
            AnyLamination::LamSlotMag(l) => &l.parent.parent,
            AnyLamination::LamHole(l) => &l.parent,
        }
    }

    pub fn as_lamination_mut(&mut self) -> &mut Lamination {
        match self {
            AnyLamination::Lamination(l) => l,
            AnyLamination::LamSlot(l) => &mut l.parent,
            AnyLamination::LamSlotWind(l) => &mut l.parent.parent,
            AnyLamination::LamSlotMag(l) => &mut l.parent.parent,
            AnyLamination::LamHole(l) => &mut l.parent,
        }
    }

    pub fn slot(&self) -> Option<&AnySlot> {
        match self {
            AnyLamination::LamSlot(l) => Some(&l.slot),
            AnyLamination::LamSlotWind(l) => Some(&l.slot),
            AnyLamination::LamSlotMag(l) => Some(&l.slot),
            AnyLamination::Lamination(_) | AnyLamination::LamHole(_) => None,
        }
    }

    pub fn holes(&self) -> &[AnyHole] {
        match self {
            AnyLamination::LamHole(l) => &l.hole,
            _ => &[],
        }
    }

    pub fn winding(&self) -> Option<&AnyWinding> {
        match self {
            AnyLamination::LamSlotWind(l) => Some(&l.winding),
            _ => None,
        }
    }

    pub fn is_internal(&self) -> bool {
        self.as_lamination().is_internal.unwrap_or(true)
    }

    #[allow(non_snake_case)]
    pub fn get_Rbo(&self) -> Result<f64> {
        self.as_lamination().get_Rbo()
    }

    /// Radial height of the lamination left once slots or holes are cut out.
    pub fn comp_height_yoke(&self) -> Result<f64> {
        let span = self.as_lamination().radial_span()?;
        if let Some(slot) = self.slot() {
            return Ok(span - slot.comp_height()?);
        }
        let mut deepest = 0.0_f64;
        for hole in self.holes() {
            deepest = deepest.max(hole.comp_height()?);
        }
        Ok(span - deepest)
    }

    pub fn get_pole_pair_number(&self) -> Result<i64> {
        let p = match self {
            AnyLamination::LamSlotWind(l) => l.winding.p(),
            AnyLamination::LamSlotMag(l) => l.slot.zs().map(|zs| zs / 2),
            AnyLamination::LamHole(l) => l.hole.first().and_then(AnyHole::zh).map(|zh| zh / 2),
            AnyLamination::Lamination(_) | AnyLamination::LamSlot(_) => {
                return constraint_err!(
                    NotImplemented,
                    format!("{} has no pole pairs", self.class_name())
                );
            }
        };
        match p {
            Some(p) => Ok(p),
            None => constraint_err!(
                MissingField,
                "pole pair number is not set".to_owned()
            ),
        }
    }

    /// Angular position of the first d-axis [rad].  Magnet laminations put
    /// their first pole at 0; a wound lamination's d-axis sits half a coil
    /// span away from the first slot.
    pub fn comp_angle_d_axis(&self) -> Result<f64> {
        let AnyLamination::LamSlotWind(l) = self else {
            return Ok(0.0);
        };
        let zs = match l.slot.zs() {
            Some(zs) if zs > 0 => zs as f64,
            _ => return constraint_err!(MissingField, "Zs is not set".to_owned()),
        };
        let pitch = match l.winding.coil_pitch() {
            Some(pitch) => pitch as f64,
            None => zs / (2.0 * self.get_pole_pair_number()? as f64),
        };
        Ok(PI * pitch / zs)
    }

    /// Geometric constraints of the slot or of every hole.
    pub fn check(&self) -> Result<()> {
        if let Some(slot) = self.slot() {
            slot.check()?;
        }
        for hole in self.holes().iter().chain(self.as_lamination().axial_vent.iter()) {
            hole.check()?;
        }
        Ok(())
    }
}
