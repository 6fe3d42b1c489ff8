// Copyright 2025 The EMachine Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use crate::common::Result;
use crate::{constraint_err, declare_entity, declare_family};

declare_entity! {
    /// A permanent magnet, independent of its shape.
    pub struct Magnet {
        /// Axial length [m]
        l_mag ("Lmag"): Option<f64> = Some(0.95),
        /// 0 radial, 1 parallel, 2 Halbach
        type_magnetization ("type_magnetization"): Option<i64> = Some(0),
    }
}

declare_entity! {
    /// Magnets with a flat (rectangular) cross-section.
    pub struct MagnetFlat: Magnet {}
}

declare_entity! {
    /// Magnets whose sides follow the polar directions.
    pub struct MagnetPolar: Magnet {}
}

declare_entity! {
    /// Rectangular magnet.
    pub struct MagnetType10: MagnetFlat {
        /// Magnet height [m]
        h_mag ("Hmag"): Option<f64> = Some(0.008),
        /// Magnet width [m]
        w_mag ("Wmag"): Option<f64> = Some(0.025),
    }
}

declare_entity! {
    /// Polar magnet with a circular top.
    pub struct MagnetType14: MagnetPolar {
        /// Magnet radial height [m]
        h_mag ("Hmag"): Option<f64> = Some(0.001),
        /// Magnet bottom width [rad]
        w_mag ("Wmag"): Option<f64> = Some(0.002),
        /// Radius of the circular top shape [m]
        r_topm ("Rtopm"): Option<f64> = Some(0.04),
    }
}

declare_family! {
    /// Any magnet class.
    pub enum AnyMagnet(Magnet) {
        Magnet,
        MagnetFlat,
        MagnetPolar,
        MagnetType10,
        MagnetType14,
    }
}

fn check_non_negative(fields: &[(&str, Option<f64>)]) -> Result<()> {
    for (key, value) in fields {
        if value.is_some_and(|value| value < 0.0) {
            return constraint_err!(MagnetGeometry, format!("You must have {key} >= 0"));
        }
    }
    Ok(())
}

impl AnyMagnet {
    /// The geometric fields a setup page must see filled, in the order it
    /// checks them.
    pub fn required_fields(&self) -> Vec<(&'static str, Option<f64>)> {
        match self {
            AnyMagnet::MagnetType10(m) => vec![("Hmag", m.h_mag), ("Wmag", m.w_mag)],
            AnyMagnet::MagnetType14(m) => vec![
                ("Hmag", m.h_mag),
                ("Wmag", m.w_mag),
                ("Rtopm", m.r_topm),
            ],
            AnyMagnet::Magnet(_) | AnyMagnet::MagnetFlat(_) | AnyMagnet::MagnetPolar(_) => vec![],
        }
    }

    /// Dimensions may not be negative.
    pub fn check(&self) -> Result<()> {
        check_non_negative(&self.required_fields())
    }

    pub fn is_polar(&self) -> bool {
        matches!(self, AnyMagnet::MagnetPolar(_) | AnyMagnet::MagnetType14(_))
    }

    /// Radial height, when the shape defines one.
    pub fn height(&self) -> Option<f64> {
        match self {
            AnyMagnet::MagnetType10(m) => m.h_mag,
            AnyMagnet::MagnetType14(m) => m.h_mag,
            _ => None,
        }
    }

    /// Width: meters for flat magnets, radians for polar ones.
    pub fn width(&self) -> Option<f64> {
        match self {
            AnyMagnet::MagnetType10(m) => m.w_mag,
            AnyMagnet::MagnetType14(m) => m.w_mag,
            _ => None,
        }
    }

    pub fn l_mag(&self) -> Option<f64> {
        match self {
            AnyMagnet::Magnet(m) => m.l_mag,
            AnyMagnet::MagnetFlat(m) => m.l_mag,
            AnyMagnet::MagnetPolar(m) => m.l_mag,
            AnyMagnet::MagnetType10(m) => m.l_mag,
            AnyMagnet::MagnetType14(m) => m.l_mag,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ErrorCode;
    use crate::entity::{Entity, Schema};

    #[test]
    fn type14_inherits_magnet_fields() {
        let mag = MagnetType14::default();
        assert_eq!(Some(0.95), mag.l_mag);
        assert_eq!(
            vec!["Lmag", "type_magnetization", "Hmag", "Wmag", "Rtopm"],
            MagnetType14::keys()
        );
        assert_eq!("MagnetType14", mag.class_name());
    }

    #[test]
    fn negative_dimensions_fail_the_check() {
        let mag = AnyMagnet::from(MagnetType14 {
            w_mag: Some(-0.1),
            ..Default::default()
        });
        let err = mag.check().unwrap_err();
        assert_eq!(ErrorCode::MagnetGeometry, err.code);
        assert_eq!(Some("You must have Wmag >= 0".to_owned()), err.details);

        assert!(AnyMagnet::default().check().is_ok());
    }

    #[test]
    fn shape_accessors() {
        let flat = AnyMagnet::from(MagnetType10::default());
        assert!(!flat.is_polar());
        assert_eq!(Some(0.008), flat.height());
        let polar = AnyMagnet::from(MagnetType14::default());
        assert!(polar.is_polar());
        assert_eq!(Some(0.002), polar.width());
        assert_eq!(None, AnyMagnet::default().width());
    }
}
