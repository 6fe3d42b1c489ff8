// Copyright 2025 The EMachine Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use crate::common::{Result, require};
use crate::magnet::{AnyMagnet, MagnetType10};
use crate::{constraint_err, declare_entity, declare_family};

declare_entity! {
    /// A hole pattern repeated around a lamination.
    pub struct Hole {
        /// Number of holes
        zh ("Zh"): Option<i64> = Some(36),
    }
}

declare_entity! {
    /// Holes that may receive magnets.
    pub struct HoleMag: Hole {}
}

declare_entity! {
    /// V-shaped pair of magnet holes.
    pub struct HoleM53: HoleMag {
        /// Distance from the bore to the top of the hole [m]
        h0 ("H0"): Option<f64> = Some(0.003),
        /// Hole depth [m]
        h1 ("H1"): Option<f64> = Some(0.01),
        /// Width of the bridge between the two holes [m]
        w1 ("W1"): Option<f64> = Some(0.013),
        /// Magnet offset inside the hole [m]
        w2 ("W2"): Option<f64> = Some(0.0),
        /// Magnet height [m]
        h2 ("H2"): Option<f64> = Some(0.008),
        /// Hole width [m]
        w3 ("W3"): Option<f64> = Some(0.03),
        /// Magnet width [m]
        w4 ("W4"): Option<f64> = Some(0.025),
        magnet_0 ("magnet_0"): Option<AnyMagnet> = Some(AnyMagnet::from(MagnetType10::default())),
        magnet_1 ("magnet_1"): Option<AnyMagnet> = Some(AnyMagnet::from(MagnetType10::default())),
    }
}

declare_entity! {
    /// Circular axial cooling duct.
    pub struct VentilationCirc: Hole {
        /// Angular position of the first duct [rad]
        alpha0 ("Alpha0"): Option<f64> = Some(0.0),
        /// Duct diameter [m]
        d0 ("D0"): Option<f64> = Some(0.01),
        /// Radius of the duct centers [m]
        h0 ("H0"): Option<f64> = Some(0.1),
    }
}

declare_family! {
    /// Any hole class.
    pub enum AnyHole(Hole) {
        Hole,
        HoleMag,
        HoleM53,
        VentilationCirc,
    }
}

impl HoleM53 {
    pub fn has_magnet(&self) -> bool {
        self.magnet_0.is_some() || self.magnet_1.is_some()
    }

    pub fn check(&self) -> Result<()> {
        let h1 = require(self.h1, "H1")?;
        let h2 = require(self.h2, "H2")?;
        let w2 = require(self.w2, "W2")?;
        let w3 = require(self.w3, "W3")?;
        let w4 = require(self.w4, "W4")?;
        if h2 > h1 {
            return constraint_err!(HoleGeometry, "You must have H2 <= H1".to_owned());
        }
        if w2 + w4 > w3 {
            return constraint_err!(HoleGeometry, "You must have W2 + W4 <= W3".to_owned());
        }
        for magnet in self.magnet_0.iter().chain(self.magnet_1.iter()) {
            magnet.check()?;
        }
        Ok(())
    }

    /// Radial extent from the bore to the bottom of the hole.
    pub fn comp_height(&self) -> Result<f64> {
        Ok(require(self.h0, "H0")? + require(self.h1, "H1")?)
    }
}

impl AnyHole {
    pub fn zh(&self) -> Option<i64> {
        match self {
            AnyHole::Hole(h) => h.zh,
            AnyHole::HoleMag(h) => h.zh,
            AnyHole::HoleM53(h) => h.zh,
            AnyHole::VentilationCirc(h) => h.zh,
        }
    }

    /// True when at least one magnet slot of the hole is filled.
    pub fn has_magnet(&self) -> bool {
        match self {
            AnyHole::HoleM53(h) => h.has_magnet(),
            _ => false,
        }
    }

    pub fn required_fields(&self) -> Vec<(&'static str, Option<f64>)> {
        match self {
            AnyHole::HoleM53(h) => vec![
                ("H0", h.h0),
                ("H1", h.h1),
                ("W1", h.w1),
                ("W2", h.w2),
                ("H2", h.h2),
                ("W3", h.w3),
                ("W4", h.w4),
            ],
            AnyHole::VentilationCirc(h) => vec![("Alpha0", h.alpha0), ("D0", h.d0), ("H0", h.h0)],
            AnyHole::Hole(_) | AnyHole::HoleMag(_) => vec![],
        }
    }

    pub fn check(&self) -> Result<()> {
        match self {
            AnyHole::HoleM53(h) => h.check(),
            AnyHole::VentilationCirc(h) => {
                if require(h.d0, "D0")? <= 0.0 {
                    return constraint_err!(HoleGeometry, "You must have D0 > 0".to_owned());
                }
                Ok(())
            }
            AnyHole::Hole(_) | AnyHole::HoleMag(_) => Ok(()),
        }
    }

    /// Radial space the hole takes out of the yoke.
    pub fn comp_height(&self) -> Result<f64> {
        match self {
            AnyHole::HoleM53(h) => h.comp_height(),
            AnyHole::VentilationCirc(h) => require(h.d0, "D0"),
            AnyHole::Hole(_) | AnyHole::HoleMag(_) => constraint_err!(
                NotImplemented,
                format!("{} has no geometry", self.class_name())
            ),
        }
    }

    pub fn magnets(&self) -> Vec<&AnyMagnet> {
        match self {
            AnyHole::HoleM53(h) => h.magnet_0.iter().chain(h.magnet_1.iter()).collect(),
            _ => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;

    use super::*;
    use crate::common::ErrorCode;
    use crate::entity::{Entity, Schema};

    #[test]
    fn has_magnet_follows_the_magnet_slots() {
        let mut hole = HoleM53::default();
        assert!(hole.has_magnet());
        hole.magnet_0 = None;
        assert!(hole.has_magnet());
        hole.magnet_1 = None;
        assert!(!hole.has_magnet());
        assert!(!AnyHole::from(VentilationCirc::default()).has_magnet());
    }

    #[test]
    fn reset_keeps_nested_magnets_but_empties_them() {
        let mut hole = HoleM53::default();
        hole.set_none();
        assert_eq!(None, hole.h0);
        assert_eq!(None, hole.zh);
        let magnet = hole.magnet_0.as_ref().unwrap();
        assert_eq!("MagnetType10", magnet.class_name());
        assert_eq!(None, magnet.height());
    }

    #[test]
    fn m53_constraints() {
        let hole = HoleM53 {
            h2: Some(0.02),
            ..Default::default()
        };
        assert_eq!("You must have H2 <= H1", hole.check().unwrap_err().message());

        let hole = HoleM53 {
            w4: Some(0.04),
            ..Default::default()
        };
        let err = hole.check().unwrap_err();
        assert_eq!(ErrorCode::HoleGeometry, err.code);
        assert_eq!("You must have W2 + W4 <= W3", err.message());

        assert!(HoleM53::default().check().is_ok());
        let height = HoleM53::default().comp_height().unwrap();
        assert!(approx_eq!(f64, 0.013, height, epsilon = 1e-12));
    }

    #[test]
    fn m53_keys() {
        assert_eq!(
            vec![
                "Zh", "H0", "H1", "W1", "W2", "H2", "W3", "W4", "magnet_0", "magnet_1"
            ],
            HoleM53::keys()
        );
    }
}
