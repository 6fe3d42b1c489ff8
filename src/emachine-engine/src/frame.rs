// Copyright 2025 The EMachine Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use crate::common::{Result, require};
use crate::{declare_entity, impl_nested_field};

declare_entity! {
    /// Housing around the outer lamination.
    pub struct Frame {
        /// Frame length [m]
        lfra ("Lfra"): Option<f64> = Some(0.35),
        /// Frame internal radius [m]
        rint ("Rint"): Option<f64> = Some(0.2),
        /// Frame external radius [m]
        rext ("Rext"): Option<f64> = Some(0.2),
    }
}

declare_entity! {
    pub struct Shaft {
        /// Shaft length [m]
        lshaft ("Lshaft"): Option<f64> = Some(0.442),
        /// Shaft diameter [m]
        drsh ("Drsh"): Option<f64> = Some(0.045),
    }
}

impl_nested_field!(Frame);
impl_nested_field!(Shaft);

impl Frame {
    pub fn comp_height_frame(&self) -> Result<f64> {
        Ok(require(self.rext, "Rext")? - require(self.rint, "Rint")?)
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;

    use super::*;

    #[test]
    fn frame_height() {
        assert_eq!(Ok(0.0), Frame::default().comp_height_frame());
        let frame = Frame {
            rext: Some(0.25),
            ..Default::default()
        };
        assert!(approx_eq!(
            f64,
            0.05,
            frame.comp_height_frame().unwrap(),
            epsilon = 1e-12
        ));
        let frame = Frame {
            rint: None,
            ..Default::default()
        };
        assert!(frame.comp_height_frame().is_err());
    }
}
