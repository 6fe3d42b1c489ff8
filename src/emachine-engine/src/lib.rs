// Copyright 2025 The EMachine Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

#![forbid(unsafe_code)]

pub mod check;
pub mod colors;
pub mod common;
pub mod data;
pub mod entity;
pub mod fft;
pub mod frame;
pub mod hole;
pub mod json;
pub mod lamination;
pub mod machine;
pub mod magnet;
pub mod plot;
pub mod registry;
pub mod slot;
pub mod winding;

pub use self::common::{Error, ErrorCode, ErrorKind, Result};
pub use self::entity::{CLASS_KEY, Dict, Entity, Field, Init, Schema};
pub use self::frame::{Frame, Shaft};
pub use self::hole::{AnyHole, Hole, HoleM53, HoleMag, VentilationCirc};
pub use self::lamination::{AnyLamination, LamHole, LamSlot, LamSlotMag, LamSlotWind, Lamination};
pub use self::machine::{AnyMachine, Machine, MachineAsync, MachineIPMSM, MachineSIPMSM, MachineSync};
pub use self::magnet::{AnyMagnet, Magnet, MagnetFlat, MagnetPolar, MagnetType10, MagnetType14};
pub use self::slot::{AnySlot, Slot, SlotMPolar, SlotMag, SlotW26};
pub use self::winding::{AnyWinding, Winding, WindingDW1L, WindingUD};
