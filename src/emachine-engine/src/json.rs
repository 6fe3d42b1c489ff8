// Copyright 2025 The EMachine Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::io::{Read, Write};

use serde_json::Value;

use crate::common::{Error, ErrorCode, ErrorKind, Result};
use crate::entity::{Entity, Schema, type_error};
use crate::registry;

fn import_err(what: &str, err: impl std::fmt::Display) -> Error {
    Error::new(
        ErrorKind::Import,
        ErrorCode::Generic,
        Some(format!("failed to parse {what}: {err}")),
    )
}

pub fn to_value(entity: &dyn Entity) -> Value {
    Value::Object(entity.as_dict())
}

pub fn to_json(entity: &dyn Entity) -> String {
    to_value(entity).to_string()
}

pub fn to_json_pretty(entity: &dyn Entity) -> String {
    format!("{:#}", to_value(entity))
}

/// Rebuild a tagged entity from JSON text.
pub fn from_json(text: &str) -> Result<Box<dyn Entity>> {
    let value: Value = serde_json::from_str(text).map_err(|err| import_err("entity JSON", err))?;
    registry::load_value(&value)
}

pub fn from_reader(reader: impl Read) -> Result<Box<dyn Entity>> {
    let value: Value =
        serde_json::from_reader(reader).map_err(|err| import_err("entity JSON", err))?;
    registry::load_value(&value)
}

pub fn save(entity: &dyn Entity, mut writer: impl Write) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, &to_value(entity)).map_err(|err| {
        Error::new(
            ErrorKind::Import,
            ErrorCode::Generic,
            Some(format!("failed to write entity JSON: {err}")),
        )
    })
}

/// Rebuild an entity of a known concrete type from JSON text.  Untagged
/// objects are accepted; a tag naming another class is not.
pub fn load_as<T: Schema>(text: &str) -> Result<T> {
    let value: Value = serde_json::from_str(text).map_err(|err| import_err("entity JSON", err))?;
    match value {
        Value::Object(dict) => T::from_dict(&dict),
        other => Err(type_error(T::CLASS_NAME, "a dict", &other)),
    }
}
