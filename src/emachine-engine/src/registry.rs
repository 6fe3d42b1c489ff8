// Copyright 2025 The EMachine Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Class-name to constructor lookup, used to rebuild an entity of the right
//! concrete type from a dictionary carrying a `__class__` discriminator.

use std::collections::HashMap;

use lazy_static::lazy_static;
use serde_json::Value;
use tracing::debug;

use crate::class_err;
use crate::common::Result;
use crate::entity::{Dict, Entity, Schema, class_tag, type_error};
use crate::frame::{Frame, Shaft};
use crate::hole::{Hole, HoleM53, HoleMag, VentilationCirc};
use crate::lamination::{LamHole, LamSlot, LamSlotMag, LamSlotWind, Lamination};
use crate::machine::{Machine, MachineAsync, MachineIPMSM, MachineSIPMSM, MachineSync};
use crate::magnet::{Magnet, MagnetFlat, MagnetPolar, MagnetType10, MagnetType14};
use crate::schema_err;
use crate::slot::{Slot, SlotMPolar, SlotMag, SlotW26};
use crate::winding::{Winding, WindingDW1L, WindingUD};

pub type Constructor = fn(&Dict) -> Result<Box<dyn Entity>>;

fn construct<T: Schema>(dict: &Dict) -> Result<Box<dyn Entity>> {
    Ok(Box::new(T::from_dict(dict)?))
}

macro_rules! register {
    ($map:ident, $($class:ident),+ $(,)?) => {
        $( $map.insert(<$class as Schema>::CLASS_NAME, construct::<$class> as Constructor); )+
    };
}

lazy_static! {
    static ref CLASSES: HashMap<&'static str, Constructor> = {
        let mut m = HashMap::new();
        register!(
            m,
            Machine,
            MachineSync,
            MachineAsync,
            MachineSIPMSM,
            MachineIPMSM,
            Lamination,
            LamSlot,
            LamSlotWind,
            LamSlotMag,
            LamHole,
            Slot,
            SlotW26,
            SlotMag,
            SlotMPolar,
            Hole,
            HoleMag,
            HoleM53,
            VentilationCirc,
            Magnet,
            MagnetFlat,
            MagnetPolar,
            MagnetType10,
            MagnetType14,
            Winding,
            WindingDW1L,
            WindingUD,
            Frame,
            Shaft,
        );
        m
    };
}

/// The constructor registered under `class_name`.
pub fn resolve(class_name: &str) -> Result<Constructor> {
    match CLASSES.get(class_name) {
        Some(constructor) => {
            debug!(class_name, "resolved entity class");
            Ok(*constructor)
        }
        None => class_err!(format!("{class_name} is not a known class")),
    }
}

pub fn is_registered(class_name: &str) -> bool {
    CLASSES.contains_key(class_name)
}

/// Every registered class name, sorted.
pub fn class_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = CLASSES.keys().copied().collect();
    names.sort_unstable();
    names
}

/// Build the entity a dictionary describes.  The dictionary must carry its
/// class name.
pub fn load(dict: &Dict) -> Result<Box<dyn Entity>> {
    match class_tag(dict)? {
        Some(class_name) => resolve(class_name)?(dict),
        None => schema_err!(
            MissingClassTag,
            "dictionary has no __class__ key".to_owned()
        ),
    }
}

/// Like [`load`], reading an untagged dictionary as `default_class`.
pub fn load_or(dict: &Dict, default_class: &str) -> Result<Box<dyn Entity>> {
    let class_name = class_tag(dict)?.unwrap_or(default_class);
    resolve(class_name)?(dict)
}

/// Build the entity a JSON value describes; the value must be an object.
pub fn load_value(value: &Value) -> Result<Box<dyn Entity>> {
    match value {
        Value::Object(dict) => load(dict),
        other => {
            let err = type_error("entity", "a dict", other);
            schema_err!(NotADict, err.message())
        }
    }
}

/// A default instance of the named class.
pub fn default_instance(class_name: &str) -> Result<Box<dyn Entity>> {
    resolve(class_name)?(&Dict::new())
}
