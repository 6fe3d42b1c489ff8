// Copyright 2025 The EMachine Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::fmt;
use std::{error, result};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Generic,
    // schema
    UnexpectedKey,
    BadFieldType,
    ClassMismatch,
    UnexpectedClass,
    MissingClassTag,
    NotADict,
    // registry
    UnknownClass,
    // constraints
    SlotGeometry,
    HoleGeometry,
    MagnetGeometry,
    MissingField,
    NotImplemented,
    // data containers
    ShapeMismatch,
    UnknownAxis,
    IndexOutOfRange,
    ValueOutOfRange,
    AmbiguousAxis,
    BadRequest,
    UnitMismatch,
    UnknownUnit,
    ZeroNormalization,
    MissingNormalization,
    NonUniformAxis,
    EmptyAxis,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use ErrorCode::*;
        let name = match self {
            Generic => "generic",
            UnexpectedKey => "unexpected_key",
            BadFieldType => "bad_field_type",
            ClassMismatch => "class_mismatch",
            UnexpectedClass => "unexpected_class",
            MissingClassTag => "missing_class_tag",
            NotADict => "not_a_dict",
            UnknownClass => "unknown_class",
            SlotGeometry => "slot_geometry",
            HoleGeometry => "hole_geometry",
            MagnetGeometry => "magnet_geometry",
            MissingField => "missing_field",
            NotImplemented => "not_implemented",
            ShapeMismatch => "shape_mismatch",
            UnknownAxis => "unknown_axis",
            IndexOutOfRange => "index_out_of_range",
            ValueOutOfRange => "value_out_of_range",
            AmbiguousAxis => "ambiguous_axis",
            BadRequest => "bad_request",
            UnitMismatch => "unit_mismatch",
            UnknownUnit => "unknown_unit",
            ZeroNormalization => "zero_normalization",
            MissingNormalization => "missing_normalization",
            NonUniformAxis => "non_uniform_axis",
            EmptyAxis => "empty_axis",
        };

        write!(f, "{name}")
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// A dictionary did not match the schema of the class it was meant for.
    Schema,
    /// A discriminator tag has no registered constructor.
    Registry,
    /// An entity's own geometric or logical invariants are violated.
    Constraint,
    /// A field-data container or extraction request is inconsistent.
    Data,
    /// Serialized text could not be parsed at all.
    Import,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    pub kind: ErrorKind,
    pub code: ErrorCode,
    pub details: Option<String>,
}

impl Error {
    pub fn new(kind: ErrorKind, code: ErrorCode, details: Option<String>) -> Self {
        Error {
            kind,
            code,
            details,
        }
    }

    /// The human-readable part of the error, falling back to the code name.
    pub fn message(&self) -> String {
        match self.details {
            Some(ref details) => details.clone(),
            None => self.code.to_string(),
        }
    }

    pub fn is_schema(&self) -> bool {
        self.kind == ErrorKind::Schema
    }

    pub fn is_unknown_type(&self) -> bool {
        self.kind == ErrorKind::Registry && self.code == ErrorCode::UnknownClass
    }

    pub fn is_constraint(&self) -> bool {
        self.kind == ErrorKind::Constraint
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let kind = match self.kind {
            ErrorKind::Schema => "SchemaError",
            ErrorKind::Registry => "UnknownTypeError",
            ErrorKind::Constraint => "ConstraintError",
            ErrorKind::Data => "DataError",
            ErrorKind::Import => "ImportError",
        };
        match self.details {
            Some(ref details) => write!(f, "{}{{{}: {}}}", kind, self.code, details),
            None => write!(f, "{}{{{}}}", kind, self.code),
        }
    }
}

impl error::Error for Error {}

pub type Result<T> = result::Result<T, Error>;

#[test]
fn test_error_display() {
    let err = Error::new(
        ErrorKind::Schema,
        ErrorCode::UnexpectedKey,
        Some("Machine: unexpected key 'foo'".to_owned()),
    );
    assert_eq!(
        "SchemaError{unexpected_key: Machine: unexpected key 'foo'}",
        format!("{err}")
    );
    assert!(err.is_schema());
    assert!(!err.is_constraint());

    let err = Error::new(ErrorKind::Registry, ErrorCode::UnknownClass, None);
    assert_eq!("UnknownTypeError{unknown_class}", format!("{err}"));
    assert!(err.is_unknown_type());
    assert_eq!("unknown_class", err.message());
}

#[test]
fn test_error_message_prefers_details() {
    let err = Error::new(
        ErrorKind::Constraint,
        ErrorCode::SlotGeometry,
        Some("You must have W0 < 2*R1".to_owned()),
    );
    assert_eq!("You must have W0 < 2*R1", err.message());
    assert!(err.is_constraint());
}
