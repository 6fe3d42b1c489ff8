// Copyright 2025 The EMachine Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Textual axis requests, e.g. `"time"`, `"angle=0.5"`, `"angle[3]"`,
//! `"phase[0, 2]"` or `"freqs=[0,2000]{elec_order}"`.

use std::fmt;
use std::str::FromStr;

use crate::common::{Error, ErrorCode, ErrorKind, Result};

/// What to take from one axis.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// Keep the whole axis.
    Whole,
    /// Interpolate at a coordinate; removes the axis.
    Value(f64),
    /// Take one position; removes the axis.
    Index(usize),
    /// Take several positions in the given order; keeps the axis.
    Indices(Vec<usize>),
    /// Keep the positions whose coordinate lies in a closed interval.
    Range(f64, f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AxisRequest {
    pub name: String,
    pub selection: Selection,
    /// Key of the container's normalization table the axis coordinates
    /// are divided by before selecting.
    pub normalization: Option<String>,
}

fn bad_request(text: &str, why: &str) -> Error {
    Error::new(
        ErrorKind::Data,
        ErrorCode::BadRequest,
        Some(format!("'{text}': {why}")),
    )
}

fn parse_f64(text: &str, s: &str) -> Result<f64> {
    s.trim()
        .parse::<f64>()
        .map_err(|_| bad_request(text, &format!("{} is not a number", s.trim())))
}

impl AxisRequest {
    pub fn whole(name: &str) -> Self {
        AxisRequest {
            name: name.to_owned(),
            selection: Selection::Whole,
            normalization: None,
        }
    }

    pub fn at_value(name: &str, value: f64) -> Self {
        AxisRequest {
            selection: Selection::Value(value),
            ..Self::whole(name)
        }
    }

    pub fn at_index(name: &str, index: usize) -> Self {
        AxisRequest {
            selection: Selection::Index(index),
            ..Self::whole(name)
        }
    }

    /// A single index removes the axis, like [`AxisRequest::at_index`].
    pub fn indices(name: &str, indices: &[usize]) -> Self {
        let selection = match indices {
            [index] => Selection::Index(*index),
            _ => Selection::Indices(indices.to_vec()),
        };
        AxisRequest {
            selection,
            ..Self::whole(name)
        }
    }

    pub fn range(name: &str, min: f64, max: f64) -> Self {
        AxisRequest {
            selection: Selection::Range(min, max),
            ..Self::whole(name)
        }
    }

    pub fn normalized(mut self, normalization: &str) -> Self {
        self.normalization = Some(normalization.to_owned());
        self
    }

    /// Whether the selection leaves the axis in the extracted array.
    pub fn keeps_axis(&self) -> bool {
        matches!(
            self.selection,
            Selection::Whole | Selection::Indices(_) | Selection::Range(_, _)
        )
    }
}

impl FromStr for AxisRequest {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self> {
        let mut body = text.trim();

        let mut normalization = None;
        if let Some(open) = body.rfind('{') {
            let Some(inner) = body[open..].strip_prefix('{').and_then(|s| s.strip_suffix('}')) else {
                return Err(bad_request(text, "unterminated normalization"));
            };
            if inner.trim().is_empty() {
                return Err(bad_request(text, "empty normalization"));
            }
            normalization = Some(inner.trim().to_owned());
            body = body[..open].trim_end();
        }

        let (name, selection) = if let Some((name, rhs)) = body.split_once('=') {
            let rhs = rhs.trim();
            let selection = match rhs.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
                Some(bounds) => {
                    let bounds: Vec<&str> = bounds.split(',').collect();
                    let [min, max] = bounds.as_slice() else {
                        return Err(bad_request(text, "a range needs two bounds"));
                    };
                    let (min, max) = (parse_f64(text, min)?, parse_f64(text, max)?);
                    if min > max {
                        return Err(bad_request(text, "range bounds are reversed"));
                    }
                    Selection::Range(min, max)
                }
                None => Selection::Value(parse_f64(text, rhs)?),
            };
            (name, selection)
        } else if let Some(open) = body.find('[') {
            let Some(inner) = body[open..].strip_prefix('[').and_then(|s| s.strip_suffix(']')) else {
                return Err(bad_request(text, "unterminated index list"));
            };
            let indices = inner
                .split(',')
                .map(|s| {
                    s.trim()
                        .parse::<usize>()
                        .map_err(|_| bad_request(text, &format!("{} is not an index", s.trim())))
                })
                .collect::<Result<Vec<usize>>>()?;
            let selection = match indices.as_slice() {
                [index] => Selection::Index(*index),
                _ => Selection::Indices(indices),
            };
            (&body[..open], selection)
        } else {
            (body, Selection::Whole)
        };

        let name = name.trim();
        if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(bad_request(text, "missing or invalid axis name"));
        }

        Ok(AxisRequest {
            name: name.to_owned(),
            selection,
            normalization,
        })
    }
}

impl fmt::Display for AxisRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        match &self.selection {
            Selection::Whole => {}
            Selection::Value(value) => write!(f, "={value}")?,
            Selection::Index(index) => write!(f, "[{index}]")?,
            Selection::Indices(indices) => {
                let list: Vec<String> = indices.iter().map(usize::to_string).collect();
                write!(f, "[{}]", list.join(", "))?
            }
            Selection::Range(min, max) => write!(f, "=[{min},{max}]")?,
        }
        if let Some(normalization) = &self.normalization {
            write!(f, "{{{normalization}}}")?;
        }
        Ok(())
    }
}
