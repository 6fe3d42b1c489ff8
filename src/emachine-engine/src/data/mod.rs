// Copyright 2025 The EMachine Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Sampled field quantities with named, unit-aware axes, and the
//! extraction of comparable series from several of them.

pub mod axis;
mod compare;
pub mod field;
pub mod request;

pub use axis::{Axis, AxisValues};
pub use compare::demultiplex;
pub use field::{Extracted, FieldData};
pub use request::{AxisRequest, Selection};

/// Normalization key for frequencies expressed as electrical orders.
pub const ELEC_ORDER: &str = "elec_order";

/// Target unit meaning "the container's own unit".
pub const SI: &str = "SI";
