// Copyright 2025 The EMachine Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! The contract every machine component shares.
//!
//! Each component type has a fixed schema of named fields.  A type that
//! refines another embeds its parent as a `parent` field and dereferences to
//! it, so inherited fields read naturally (`machine_sync.rotor`).  The
//! [`declare_entity!`] macro writes the schema plumbing (dictionary loading,
//! dumping and resetting, field by field, parent first) and the
//! [`declare_family!`] macro writes the closed set of classes a nested field
//! accepts.
//!
//! Serialized form is a JSON object of `key -> value` with a `__class__`
//! discriminator holding the most derived class name.  Absent values are
//! written as `null`, never omitted.

use std::any::Any;
use std::fmt;

use ndarray::Array2;
use serde_json::{Map, Number, Value};

use crate::common::{Error, ErrorCode, ErrorKind, Result};

/// A serialized entity.
pub type Dict = Map<String, Value>;

/// Key holding the discriminator in a serialized entity.
pub const CLASS_KEY: &str = "__class__";

/// Object-safe view of an entity, used by the registry and by code that
/// handles entities without knowing their concrete type.
pub trait Entity: fmt::Debug + 'static {
    /// The most derived class name, used as the discriminator.
    fn class_name(&self) -> &'static str;
    /// Every inherited and local field plus the discriminator.
    fn as_dict(&self) -> Dict;
    /// Reset every field to its empty value, keeping type and identity.
    fn set_none(&mut self);
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
    fn clone_entity(&self) -> Box<dyn Entity>;
    /// Structural equality; false whenever the concrete types differ.
    fn eq_entity(&self, other: &dyn Entity) -> bool;
}

impl PartialEq for dyn Entity {
    fn eq(&self, other: &Self) -> bool {
        self.eq_entity(other)
    }
}

impl Clone for Box<dyn Entity> {
    fn clone(&self) -> Self {
        self.clone_entity()
    }
}

/// Static side of the entity contract: the schema and how to fill it.
pub trait Schema: Entity + Default + Clone + PartialEq + Sized {
    const CLASS_NAME: &'static str;

    /// Push every accepted key, inherited keys first.
    fn collect_keys(keys: &mut Vec<&'static str>);
    /// Overwrite fields whose key is present in `dict`.
    fn load_fields(&mut self, dict: &Dict) -> Result<()>;
    fn dump_fields(&self, dict: &mut Dict);
    fn reset_fields(&mut self);

    fn keys() -> Vec<&'static str> {
        let mut keys = Vec::new();
        Self::collect_keys(&mut keys);
        keys
    }

    /// Build an instance from a serialized dictionary.  Keys outside the
    /// schema abort construction; omitted keys keep their default.
    fn from_dict(dict: &Dict) -> Result<Self> {
        check_class_tag(dict, Self::CLASS_NAME)?;
        check_init_dict(dict, Self::CLASS_NAME, &Self::keys())?;
        let mut entity = Self::default();
        entity.load_fields(dict)?;
        Ok(entity)
    }
}

/// Fail with a schema error listing every key of `dict` that is neither in
/// `expected` nor the discriminator.
pub fn check_init_dict(dict: &Dict, class_name: &str, expected: &[&str]) -> Result<()> {
    let unexpected: Vec<String> = dict
        .keys()
        .filter(|key| key.as_str() != CLASS_KEY && !expected.contains(&key.as_str()))
        .map(|key| format!("'{key}'"))
        .collect();

    if unexpected.is_empty() {
        return Ok(());
    }

    Err(Error::new(
        ErrorKind::Schema,
        ErrorCode::UnexpectedKey,
        Some(format!(
            "{class_name}: unexpected key(s) {}",
            unexpected.join(", ")
        )),
    ))
}

fn check_class_tag(dict: &Dict, class_name: &str) -> Result<()> {
    match dict.get(CLASS_KEY) {
        None => Ok(()),
        Some(Value::String(tag)) if tag == class_name => Ok(()),
        Some(Value::String(tag)) => Err(Error::new(
            ErrorKind::Schema,
            ErrorCode::ClassMismatch,
            Some(format!("expected a {class_name} dict, got a {tag} dict")),
        )),
        Some(other) => Err(type_error(CLASS_KEY, "a class name", other)),
    }
}

/// The class name a serialized entity claims, if any.
pub fn class_tag(dict: &Dict) -> Result<Option<&str>> {
    match dict.get(CLASS_KEY) {
        None => Ok(None),
        Some(Value::String(tag)) => Ok(Some(tag.as_str())),
        Some(other) => Err(type_error(CLASS_KEY, "a class name", other)),
    }
}

#[doc(hidden)]
pub fn type_error(key: &str, expected: &str, value: &Value) -> Error {
    let got = match value {
        Value::Null => "null",
        Value::Bool(_) => "a bool",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a dict",
    };
    Error::new(
        ErrorKind::Schema,
        ErrorCode::BadFieldType,
        Some(format!("{key}: expected {expected}, got {got}")),
    )
}

/// Prefix an error raised while loading a nested entity with the key it
/// was found under, so errors deep in a tree name their path.
#[doc(hidden)]
pub fn nested_error(key: &str, err: Error) -> Error {
    let details = match err.details {
        Some(details) => format!("{key}.{details}"),
        None => key.to_owned(),
    };
    Error::new(err.kind, err.code, Some(details))
}

/// How a single field travels to and from its serialized form.
pub trait Field: Sized {
    fn load(key: &str, value: &Value) -> Result<Self>;
    fn dump(&self) -> Value;
    /// Put the field in its empty state.
    fn reset(&mut self);
}

const INFINITY: &str = "Infinity";
const NEG_INFINITY: &str = "-Infinity";
const NAN: &str = "NaN";

/// JSON numbers cannot hold non-finite floats; those are written as the
/// tokens `"Infinity"`, `"-Infinity"` and `"NaN"`.
fn number(value: f64) -> Value {
    match Number::from_f64(value) {
        Some(n) => Value::Number(n),
        None if value.is_nan() => Value::String(NAN.to_owned()),
        None if value > 0.0 => Value::String(INFINITY.to_owned()),
        None => Value::String(NEG_INFINITY.to_owned()),
    }
}

fn float(key: &str, value: &Value) -> Result<f64> {
    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| type_error(key, "a number", value)),
        Value::String(s) if s == INFINITY => Ok(f64::INFINITY),
        Value::String(s) if s == NEG_INFINITY => Ok(f64::NEG_INFINITY),
        Value::String(s) if s == NAN => Ok(f64::NAN),
        _ => Err(type_error(key, "a number", value)),
    }
}

impl Field for Option<f64> {
    fn load(key: &str, value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => float(key, other).map(Some),
        }
    }

    fn dump(&self) -> Value {
        self.map_or(Value::Null, number)
    }

    fn reset(&mut self) {
        *self = None;
    }
}

/// 2^63: every integral float in `[-2^63, 2^63)` fits an `i64`.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

impl Field for Option<i64> {
    fn load(key: &str, value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            Value::Number(n) => {
                if let Some(n) = n.as_i64() {
                    return Ok(Some(n));
                }
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && (-I64_BOUND..I64_BOUND).contains(&f) => {
                        Ok(Some(f as i64))
                    }
                    _ => Err(type_error(key, "an integer", value)),
                }
            }
            _ => Err(type_error(key, "an integer", value)),
        }
    }

    fn dump(&self) -> Value {
        self.map_or(Value::Null, Value::from)
    }

    fn reset(&mut self) {
        *self = None;
    }
}

impl Field for Option<bool> {
    fn load(key: &str, value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            Value::Bool(b) => Ok(Some(*b)),
            _ => Err(type_error(key, "a bool", value)),
        }
    }

    fn dump(&self) -> Value {
        self.map_or(Value::Null, Value::Bool)
    }

    fn reset(&mut self) {
        *self = None;
    }
}

impl Field for Option<String> {
    fn load(key: &str, value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s.clone())),
            _ => Err(type_error(key, "a string", value)),
        }
    }

    fn dump(&self) -> Value {
        match self {
            Some(s) => Value::String(s.clone()),
            None => Value::Null,
        }
    }

    fn reset(&mut self) {
        *self = None;
    }
}

/// Matrices accept a list of equal-length numeric rows, or a flat numeric
/// list taken as a single row.
impl Field for Option<Array2<f64>> {
    fn load(key: &str, value: &Value) -> Result<Self> {
        let rows = match value {
            Value::Null => return Ok(None),
            Value::Array(rows) => rows,
            _ => return Err(type_error(key, "a matrix", value)),
        };

        let as_row = |row: &[Value]| -> Result<Vec<f64>> {
            row.iter().map(|x| float(key, x)).collect()
        };

        let rows: Vec<Vec<f64>> = if !rows.iter().any(Value::is_array) {
            vec![as_row(rows)?]
        } else {
            rows.iter()
                .map(|row| match row {
                    Value::Array(row) => as_row(row),
                    other => Err(type_error(key, "a list of rows", other)),
                })
                .collect::<Result<_>>()?
        };

        let ncols = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|row| row.len() != ncols) {
            return Err(Error::new(
                ErrorKind::Schema,
                ErrorCode::BadFieldType,
                Some(format!("{key}: matrix rows have different lengths")),
            ));
        }
        let nrows = rows.len();
        let flat: Vec<f64> = rows.into_iter().flatten().collect();
        Array2::from_shape_vec((nrows, ncols), flat)
            .map(Some)
            .map_err(|err| {
                Error::new(
                    ErrorKind::Schema,
                    ErrorCode::BadFieldType,
                    Some(format!("{key}: {err}")),
                )
            })
    }

    fn dump(&self) -> Value {
        match self {
            Some(matrix) => Value::Array(
                matrix
                    .rows()
                    .into_iter()
                    .map(|row| Value::Array(row.iter().map(|x| number(*x)).collect()))
                    .collect(),
            ),
            None => Value::Null,
        }
    }

    fn reset(&mut self) {
        *self = None;
    }
}

/// Explicit constructor argument for a nested entity, replacing magic
/// sentinel values: keep the declared default, leave the field absent, or
/// use a given value.
#[derive(Debug, Clone, PartialEq)]
pub enum Init<T> {
    Default,
    Absent,
    Value(T),
}

impl<T> Default for Init<T> {
    fn default() -> Self {
        Init::Default
    }
}

impl<T> From<T> for Init<T> {
    fn from(value: T) -> Self {
        Init::Value(value)
    }
}

impl<T: Default> Init<T> {
    /// Resolve for a field that may be absent.
    pub fn into_option(self) -> Option<T> {
        match self {
            Init::Default => Some(T::default()),
            Init::Absent => None,
            Init::Value(value) => Some(value),
        }
    }

    /// Resolve for a field that always holds a value; absent falls back to
    /// the default.
    pub fn or_default(self) -> T {
        self.into_option().unwrap_or_default()
    }
}

impl<T: Field> Init<T> {
    /// Apply to a field that already holds its declared default: keep it,
    /// empty it in place, or replace it.
    pub fn apply(self, field: &mut T) {
        match self {
            Init::Default => {}
            Init::Absent => field.reset(),
            Init::Value(value) => *field = value,
        }
    }
}

/// Write the entity trait implementation for a type that implements
/// [`Schema`].
#[macro_export]
macro_rules! impl_entity {
    ($name:ident) => {
        impl $crate::entity::Entity for $name {
            fn class_name(&self) -> &'static str {
                <$name as $crate::entity::Schema>::CLASS_NAME
            }

            fn as_dict(&self) -> $crate::entity::Dict {
                let mut dict = $crate::entity::Dict::new();
                $crate::entity::Schema::dump_fields(self, &mut dict);
                // overwrite whatever an ancestor wrote
                dict.insert(
                    $crate::entity::CLASS_KEY.to_owned(),
                    ::serde_json::Value::String(
                        <$name as $crate::entity::Schema>::CLASS_NAME.to_owned(),
                    ),
                );
                dict
            }

            fn set_none(&mut self) {
                $crate::entity::Schema::reset_fields(self)
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn into_any(self: Box<Self>) -> Box<dyn ::std::any::Any> {
                self
            }

            fn clone_entity(&self) -> Box<dyn $crate::entity::Entity> {
                Box::new(self.clone())
            }

            fn eq_entity(&self, other: &dyn $crate::entity::Entity) -> bool {
                other
                    .as_any()
                    .downcast_ref::<$name>()
                    .is_some_and(|other| self == other)
            }
        }
    };
}

/// Declare an entity type.  A root type lists its fields; a derived type
/// names its parent (optionally with a parent value to start from) and
/// lists only the fields it adds:
///
/// ```ignore
/// declare_entity! {
///     pub struct SlotW26: Slot {
///         w0 ("W0"): Option<f64> = Some(0.004),
///     }
/// }
/// ```
#[macro_export]
macro_rules! declare_entity {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $( $(#[$fmeta:meta])* $field:ident ($key:literal): $fty:ty = $default:expr ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            $( $(#[$fmeta])* pub $field: $fty, )*
        }

        impl Default for $name {
            fn default() -> Self {
                $name {
                    $( $field: $default, )*
                }
            }
        }

        impl $crate::entity::Schema for $name {
            const CLASS_NAME: &'static str = stringify!($name);

            fn collect_keys(keys: &mut Vec<&'static str>) {
                $( keys.push($key); )*
            }

            #[allow(unused_variables)]
            fn load_fields(&mut self, dict: &$crate::entity::Dict) -> $crate::common::Result<()> {
                $(
                    if let Some(value) = dict.get($key) {
                        self.$field = $crate::entity::Field::load($key, value)?;
                    }
                )*
                Ok(())
            }

            #[allow(unused_variables)]
            fn dump_fields(&self, dict: &mut $crate::entity::Dict) {
                $( dict.insert($key.to_owned(), $crate::entity::Field::dump(&self.$field)); )*
            }

            fn reset_fields(&mut self) {
                $( $crate::entity::Field::reset(&mut self.$field); )*
            }
        }

        $crate::impl_entity!($name);
    };
    (
        $(#[$meta:meta])*
        pub struct $name:ident: $parent:ident $(($pdefault:expr))? {
            $( $(#[$fmeta:meta])* $field:ident ($key:literal): $fty:ty = $default:expr ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            pub parent: $parent,
            $( $(#[$fmeta])* pub $field: $fty, )*
        }

        impl Default for $name {
            fn default() -> Self {
                $name {
                    parent: $crate::declare_entity!(@parent $parent $(, $pdefault)?),
                    $( $field: $default, )*
                }
            }
        }

        impl ::std::ops::Deref for $name {
            type Target = $parent;

            fn deref(&self) -> &$parent {
                &self.parent
            }
        }

        impl ::std::ops::DerefMut for $name {
            fn deref_mut(&mut self) -> &mut $parent {
                &mut self.parent
            }
        }

        impl $crate::entity::Schema for $name {
            const CLASS_NAME: &'static str = stringify!($name);

            fn collect_keys(keys: &mut Vec<&'static str>) {
                <$parent as $crate::entity::Schema>::collect_keys(keys);
                $( keys.push($key); )*
            }

            fn load_fields(&mut self, dict: &$crate::entity::Dict) -> $crate::common::Result<()> {
                $crate::entity::Schema::load_fields(&mut self.parent, dict)?;
                $(
                    if let Some(value) = dict.get($key) {
                        self.$field = $crate::entity::Field::load($key, value)?;
                    }
                )*
                Ok(())
            }

            fn dump_fields(&self, dict: &mut $crate::entity::Dict) {
                $crate::entity::Schema::dump_fields(&self.parent, dict);
                $( dict.insert($key.to_owned(), $crate::entity::Field::dump(&self.$field)); )*
            }

            fn reset_fields(&mut self) {
                $crate::entity::Schema::reset_fields(&mut self.parent);
                $( $crate::entity::Field::reset(&mut self.$field); )*
            }
        }

        $crate::impl_entity!($name);
    };
    (@parent $parent:ident) => {
        <$parent as Default>::default()
    };
    (@parent $parent:ident, $pdefault:expr) => {
        $pdefault
    };
}

/// Declare the closed set of classes a nested field of some family accepts,
/// the family's base class first.  Nested dictionaries are routed through
/// the registry and must resolve to one of the listed classes; a nested
/// dictionary without a discriminator is read as the base class.
#[macro_export]
macro_rules! declare_family {
    (
        $(#[$meta:meta])*
        pub enum $name:ident($base:ident) {
            $( $variant:ident ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub enum $name {
            $( $variant($variant), )+
        }

        impl $name {
            pub const FAMILY: &'static str = stringify!($base);
            pub const CLASSES: &'static [&'static str] = &[$( stringify!($variant), )+];

            pub fn as_entity(&self) -> &dyn $crate::entity::Entity {
                match self {
                    $( $name::$variant(x) => x, )+
                }
            }

            pub fn as_entity_mut(&mut self) -> &mut dyn $crate::entity::Entity {
                match self {
                    $( $name::$variant(x) => x, )+
                }
            }

            pub fn class_name(&self) -> &'static str {
                $crate::entity::Entity::class_name(self.as_entity())
            }

            pub fn as_dict(&self) -> $crate::entity::Dict {
                $crate::entity::Entity::as_dict(self.as_entity())
            }

            pub fn set_none(&mut self) {
                $crate::entity::Entity::set_none(self.as_entity_mut())
            }

            pub fn from_dict(dict: &$crate::entity::Dict) -> $crate::common::Result<Self> {
                let entity = $crate::registry::load_or(dict, Self::FAMILY)?;
                Self::try_from(entity)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$base(<$base as Default>::default())
            }
        }

        $(
            impl From<$variant> for $name {
                fn from(x: $variant) -> Self {
                    $name::$variant(x)
                }
            }
        )+

        impl TryFrom<Box<dyn $crate::entity::Entity>> for $name {
            type Error = $crate::common::Error;

            fn try_from(entity: Box<dyn $crate::entity::Entity>) -> $crate::common::Result<Self> {
                let class_name = $crate::entity::Entity::class_name(entity.as_ref());
                let any = $crate::entity::Entity::into_any(entity);
                $(
                    let any = match any.downcast::<$variant>() {
                        Ok(x) => return Ok($name::$variant(*x)),
                        Err(any) => any,
                    };
                )+
                drop(any);
                $crate::schema_err!(
                    UnexpectedClass,
                    format!("{} is not a {}", class_name, Self::FAMILY)
                )
            }
        }

        impl $crate::entity::Field for $name {
            fn load(key: &str, value: &::serde_json::Value) -> $crate::common::Result<Self> {
                match value {
                    ::serde_json::Value::Null => Ok(Self::default()),
                    ::serde_json::Value::Object(dict) => {
                        Self::from_dict(dict).map_err(|err| $crate::entity::nested_error(key, err))
                    }
                    other => Err($crate::entity::type_error(key, "a dict", other)),
                }
            }

            fn dump(&self) -> ::serde_json::Value {
                ::serde_json::Value::Object(self.as_dict())
            }

            fn reset(&mut self) {
                self.set_none()
            }
        }

        impl $crate::entity::Field for Option<$name> {
            fn load(key: &str, value: &::serde_json::Value) -> $crate::common::Result<Self> {
                match value {
                    ::serde_json::Value::Null => Ok(None),
                    other => <$name as $crate::entity::Field>::load(key, other).map(Some),
                }
            }

            fn dump(&self) -> ::serde_json::Value {
                match self {
                    Some(x) => ::serde_json::Value::Object(x.as_dict()),
                    None => ::serde_json::Value::Null,
                }
            }

            fn reset(&mut self) {
                if let Some(x) = self {
                    x.set_none()
                }
            }
        }

        impl $crate::entity::Field for Vec<$name> {
            fn load(key: &str, value: &::serde_json::Value) -> $crate::common::Result<Self> {
                match value {
                    ::serde_json::Value::Null => Ok(Vec::new()),
                    ::serde_json::Value::Array(items) => items
                        .iter()
                        .enumerate()
                        .map(|(i, item)| {
                            <$name as $crate::entity::Field>::load(&format!("{key}[{i}]"), item)
                        })
                        .collect(),
                    other => Err($crate::entity::type_error(key, "a list", other)),
                }
            }

            fn dump(&self) -> ::serde_json::Value {
                ::serde_json::Value::Array(
                    self.iter()
                        .map(|x| ::serde_json::Value::Object(x.as_dict()))
                        .collect(),
                )
            }

            fn reset(&mut self) {
                self.clear()
            }
        }
    };
}

/// Let a concrete entity type with no subclasses be used directly as a
/// nested field.  Its dictionary still goes through the registry, so a
/// dictionary tagged with any other class is rejected.
#[macro_export]
macro_rules! impl_nested_field {
    ($name:ident) => {
        impl $crate::entity::Field for $name {
            fn load(key: &str, value: &::serde_json::Value) -> $crate::common::Result<Self> {
                let dict = match value {
                    ::serde_json::Value::Null => return Ok(<$name as Default>::default()),
                    ::serde_json::Value::Object(dict) => dict,
                    other => return Err($crate::entity::type_error(key, "a dict", other)),
                };
                let entity = $crate::registry::load_or(dict, stringify!($name))
                    .map_err(|err| $crate::entity::nested_error(key, err))?;
                let class_name = $crate::entity::Entity::class_name(entity.as_ref());
                match $crate::entity::Entity::into_any(entity).downcast::<$name>() {
                    Ok(x) => Ok(*x),
                    Err(_) => $crate::schema_err!(
                        UnexpectedClass,
                        format!("{}: {} is not a {}", key, class_name, stringify!($name))
                    ),
                }
            }

            fn dump(&self) -> ::serde_json::Value {
                ::serde_json::Value::Object($crate::entity::Entity::as_dict(self))
            }

            fn reset(&mut self) {
                $crate::entity::Entity::set_none(self)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    declare_entity! {
        /// Minimal root type exercising each scalar codec.
        pub struct Widget {
            length ("L"): Option<f64> = Some(0.5),
            count ("N"): Option<i64> = Some(3),
            enabled ("is_on"): Option<bool> = Some(true),
            label ("name"): Option<String> = Some("widget".to_owned()),
            table ("table"): Option<Array2<f64>> = None,
        }
    }

    declare_entity! {
        pub struct WidgetChild: Widget {
            extra ("extra"): Option<f64> = None,
        }
    }

    fn dict(value: Value) -> Dict {
        match value {
            Value::Object(dict) => dict,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn keys_include_parent_first() {
        assert_eq!(
            vec!["L", "N", "is_on", "name", "table", "extra"],
            WidgetChild::keys()
        );
    }

    #[test]
    fn from_dict_overrides_present_keys_only() {
        let widget = Widget::from_dict(&dict(json!({"L": 2.0, "name": null}))).unwrap();
        assert_eq!(Some(2.0), widget.length);
        assert_eq!(Some(3), widget.count);
        assert_eq!(None, widget.label);
    }

    #[test]
    fn unexpected_keys_are_all_named() {
        let err = Widget::from_dict(&dict(json!({"L": 1.0, "bogus": 1, "also": 2}))).unwrap_err();
        assert_eq!(ErrorKind::Schema, err.kind);
        assert_eq!(ErrorCode::UnexpectedKey, err.code);
        let details = err.details.unwrap();
        assert!(details.contains("'bogus'"), "{details}");
        assert!(details.contains("'also'"), "{details}");
    }

    #[test]
    fn wrong_value_types_are_rejected() {
        let err = Widget::from_dict(&dict(json!({"L": "long"}))).unwrap_err();
        assert_eq!(ErrorCode::BadFieldType, err.code);
        let err = Widget::from_dict(&dict(json!({"N": 1.5}))).unwrap_err();
        assert_eq!(ErrorCode::BadFieldType, err.code);
        // integral floats are fine for integer fields
        let widget = Widget::from_dict(&dict(json!({"N": 4.0}))).unwrap();
        assert_eq!(Some(4), widget.count);
        // but not past the integer range
        let err = Widget::from_dict(&dict(json!({"N": 1e300}))).unwrap_err();
        assert_eq!(ErrorCode::BadFieldType, err.code);
        let err = Widget::from_dict(&dict(json!({"N": 9223372036854775808.0}))).unwrap_err();
        assert_eq!(ErrorCode::BadFieldType, err.code);
        let widget = Widget::from_dict(&dict(json!({"N": -9223372036854775808.0}))).unwrap();
        assert_eq!(Some(i64::MIN), widget.count);
        let err = Widget::from_dict(&dict(json!({"L": "Infinite"}))).unwrap_err();
        assert_eq!(ErrorCode::BadFieldType, err.code);
    }

    #[test]
    fn non_finite_floats_survive_a_dump() {
        let widget = Widget {
            length: Some(f64::INFINITY),
            table: Some(ndarray::array![[f64::NEG_INFINITY, 1.0]]),
            ..Default::default()
        };
        let dumped = widget.as_dict();
        assert_eq!(Some(&json!("Infinity")), dumped.get("L"));
        assert_eq!(Some(&json!([["-Infinity", 1.0]])), dumped.get("table"));
        assert_eq!(widget, Widget::from_dict(&dumped).unwrap());

        let nan = Widget::from_dict(&dict(json!({"L": "NaN"}))).unwrap();
        assert!(nan.length.is_some_and(f64::is_nan));
        assert_eq!(Some(&json!("NaN")), nan.as_dict().get("L"));
    }

    #[test]
    fn class_tag_must_match() {
        assert!(Widget::from_dict(&dict(json!({"__class__": "Widget"}))).is_ok());
        let err = Widget::from_dict(&dict(json!({"__class__": "WidgetChild"}))).unwrap_err();
        assert_eq!(ErrorCode::ClassMismatch, err.code);
    }

    #[test]
    fn as_dict_writes_nulls_and_most_derived_tag() {
        let child = WidgetChild::default();
        let d = child.as_dict();
        assert_eq!(Some(&json!("WidgetChild")), d.get(CLASS_KEY));
        assert_eq!(Some(&Value::Null), d.get("extra"));
        assert_eq!(Some(&Value::Null), d.get("table"));
        assert_eq!(Some(&json!(0.5)), d.get("L"));
    }

    #[test]
    fn matrix_accepts_rows_or_flat_lists() {
        let widget = Widget::from_dict(&dict(json!({"table": [[1, 2], [3, 4]]}))).unwrap();
        let table = widget.table.unwrap();
        assert_eq!((2, 2), table.dim());
        assert_eq!(3.0, table[(1, 0)]);

        let widget = Widget::from_dict(&dict(json!({"table": [1, 2, 3]}))).unwrap();
        assert_eq!((1, 3), widget.table.unwrap().dim());

        let err = Widget::from_dict(&dict(json!({"table": [[1, 2], [3]]}))).unwrap_err();
        assert_eq!(ErrorCode::BadFieldType, err.code);
    }

    #[test]
    fn inherited_fields_deref_and_reset() {
        let mut child = WidgetChild {
            extra: Some(1.0),
            ..Default::default()
        };
        child.length = Some(7.0);
        assert_eq!(Some(7.0), child.parent.length);

        child.set_none();
        assert_eq!(None, child.extra);
        assert_eq!(None, child.length);
        assert_eq!(None, child.label);
        assert_eq!("WidgetChild", child.class_name());
    }

    #[test]
    fn entity_equality_is_typed() {
        let a = Widget::default();
        let b = WidgetChild::default();
        assert!(!a.eq_entity(&b));
        assert!(a.eq_entity(&Widget::default()));

        let boxed: Box<dyn Entity> = Box::new(b.clone());
        assert!(boxed.clone() == boxed);
    }

    #[test]
    fn init_marker() {
        let absent: Init<Widget> = Init::Absent;
        assert_eq!(None, absent.into_option());
        assert_eq!(Some(Widget::default()), Init::<Widget>::Default.into_option());
        let custom = Widget {
            length: Some(9.0),
            ..Default::default()
        };
        assert_eq!(custom.clone(), Init::from(custom).or_default());

        let mut length = Some(0.5);
        Init::Default.apply(&mut length);
        assert_eq!(Some(0.5), length);
        Init::Absent.apply(&mut length);
        assert_eq!(None, length);
        Init::Value(Some(2.0)).apply(&mut length);
        assert_eq!(Some(2.0), length);
    }
}
