// Copyright 2025 The EMachine Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

// Re-export all common types from emachine-core
pub use emachine_core::common::*;

#[macro_export]
macro_rules! schema_err {
    ($code:tt, $str:expr) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(ErrorKind::Schema, ErrorCode::$code, Some($str)))
    }};
}

#[macro_export]
macro_rules! class_err {
    ($str:expr) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(
            ErrorKind::Registry,
            ErrorCode::UnknownClass,
            Some($str),
        ))
    }};
}

#[macro_export]
macro_rules! constraint_err {
    ($code:tt, $str:expr) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(ErrorKind::Constraint, ErrorCode::$code, Some($str)))
    }};
}

#[macro_export]
macro_rules! data_err {
    ($code:tt, $str:expr) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(ErrorKind::Data, ErrorCode::$code, Some($str)))
    }};
    ($code:tt) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(ErrorKind::Data, ErrorCode::$code, None))
    }};
}

/// Unwrap a required scalar field, failing with a constraint error that
/// names the serialized key when it is absent.
pub fn require(value: Option<f64>, key: &str) -> Result<f64> {
    match value {
        Some(value) => Ok(value),
        None => Err(Error::new(
            ErrorKind::Constraint,
            ErrorCode::MissingField,
            Some(format!("{key} is not set")),
        )),
    }
}

#[test]
fn test_macros_build_errors() {
    let err: Result<()> = schema_err!(UnexpectedKey, "bad".to_owned());
    let err = err.unwrap_err();
    assert_eq!(ErrorKind::Schema, err.kind);
    assert_eq!(ErrorCode::UnexpectedKey, err.code);

    let err: Result<()> = class_err!("Nope".to_owned());
    assert!(err.unwrap_err().is_unknown_type());

    let err: Result<()> = data_err!(EmptyAxis);
    assert_eq!(None, err.unwrap_err().details);
}

#[test]
fn test_require() {
    assert_eq!(Ok(1.5), require(Some(1.5), "W0"));
    let err = require(None, "R2").unwrap_err();
    assert_eq!(ErrorCode::MissingField, err.code);
    assert_eq!(Some("R2 is not set".to_owned()), err.details);
}
