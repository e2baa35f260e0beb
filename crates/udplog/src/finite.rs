// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Pre-pass over a `Serialize` value that finds floats JSON cannot carry.
//!
//! `serde_json` writes `NaN` and the infinities as `null`, and once a value
//! has been lowered to `serde_json::Value` the difference is gone. This
//! serializer produces nothing; it walks the value and stops at the first
//! non-finite float.

use std::fmt;

use serde::ser::{self, Serialize};

#[derive(Debug)]
pub(crate) enum CheckError {
    NonFinite(f64),
    // Errors raised by the value's own `Serialize` impl. The real serializer
    // reports those properly, so the caller ignores this variant.
    Custom,
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckError::NonFinite(v) => write!(f, "non-finite float {v}"),
            CheckError::Custom => f.write_str("value failed to serialize"),
        }
    }
}

impl std::error::Error for CheckError {}

impl ser::Error for CheckError {
    fn custom<T: fmt::Display>(_msg: T) -> Self {
        CheckError::Custom
    }
}

/// Returns the first non-finite float inside `value`, if any.
pub(crate) fn find_non_finite<T>(value: &T) -> Option<f64>
where
    T: Serialize + ?Sized,
{
    match value.serialize(FiniteCheck) {
        Err(CheckError::NonFinite(v)) => Some(v),
        Ok(()) | Err(CheckError::Custom) => None,
    }
}

#[derive(Clone, Copy)]
struct FiniteCheck;

type Res = Result<(), CheckError>;

impl ser::Serializer for FiniteCheck {
    type Ok = ();
    type Error = CheckError;
    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = Self;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    fn serialize_bool(self, _v: bool) -> Res {
        Ok(())
    }
    fn serialize_i8(self, _v: i8) -> Res {
        Ok(())
    }
    fn serialize_i16(self, _v: i16) -> Res {
        Ok(())
    }
    fn serialize_i32(self, _v: i32) -> Res {
        Ok(())
    }
    fn serialize_i64(self, _v: i64) -> Res {
        Ok(())
    }
    fn serialize_i128(self, _v: i128) -> Res {
        Ok(())
    }
    fn serialize_u8(self, _v: u8) -> Res {
        Ok(())
    }
    fn serialize_u16(self, _v: u16) -> Res {
        Ok(())
    }
    fn serialize_u32(self, _v: u32) -> Res {
        Ok(())
    }
    fn serialize_u64(self, _v: u64) -> Res {
        Ok(())
    }
    fn serialize_u128(self, _v: u128) -> Res {
        Ok(())
    }

    fn serialize_f32(self, v: f32) -> Res {
        if v.is_finite() {
            Ok(())
        } else {
            Err(CheckError::NonFinite(f64::from(v)))
        }
    }

    fn serialize_f64(self, v: f64) -> Res {
        if v.is_finite() {
            Ok(())
        } else {
            Err(CheckError::NonFinite(v))
        }
    }

    fn serialize_char(self, _v: char) -> Res {
        Ok(())
    }
    fn serialize_str(self, _v: &str) -> Res {
        Ok(())
    }
    fn serialize_bytes(self, _v: &[u8]) -> Res {
        Ok(())
    }
    fn serialize_none(self) -> Res {
        Ok(())
    }
    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Res {
        value.serialize(self)
    }
    fn serialize_unit(self) -> Res {
        Ok(())
    }
    fn serialize_unit_struct(self, _name: &'static str) -> Res {
        Ok(())
    }
    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
    ) -> Res {
        Ok(())
    }
    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Res {
        value.serialize(self)
    }
    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        value: &T,
    ) -> Res {
        value.serialize(self)
    }
    fn serialize_seq(self, _len: Option<usize>) -> Result<Self, CheckError> {
        Ok(self)
    }
    fn serialize_tuple(self, _len: usize) -> Result<Self, CheckError> {
        Ok(self)
    }
    fn serialize_tuple_struct(self, _name: &'static str, _len: usize) -> Result<Self, CheckError> {
        Ok(self)
    }
    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self, CheckError> {
        Ok(self)
    }
    fn serialize_map(self, _len: Option<usize>) -> Result<Self, CheckError> {
        Ok(self)
    }
    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self, CheckError> {
        Ok(self)
    }
    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self, CheckError> {
        Ok(self)
    }
}

impl ser::SerializeSeq for FiniteCheck {
    type Ok = ();
    type Error = CheckError;
    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Res {
        value.serialize(*self)
    }
    fn end(self) -> Res {
        Ok(())
    }
}

impl ser::SerializeTuple for FiniteCheck {
    type Ok = ();
    type Error = CheckError;
    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Res {
        value.serialize(*self)
    }
    fn end(self) -> Res {
        Ok(())
    }
}

impl ser::SerializeTupleStruct for FiniteCheck {
    type Ok = ();
    type Error = CheckError;
    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Res {
        value.serialize(*self)
    }
    fn end(self) -> Res {
        Ok(())
    }
}

impl ser::SerializeTupleVariant for FiniteCheck {
    type Ok = ();
    type Error = CheckError;
    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Res {
        value.serialize(*self)
    }
    fn end(self) -> Res {
        Ok(())
    }
}

impl ser::SerializeMap for FiniteCheck {
    type Ok = ();
    type Error = CheckError;
    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Res {
        key.serialize(*self)
    }
    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Res {
        value.serialize(*self)
    }
    fn end(self) -> Res {
        Ok(())
    }
}

impl ser::SerializeStruct for FiniteCheck {
    type Ok = ();
    type Error = CheckError;
    fn serialize_field<T: ?Sized + Serialize>(&mut self, _key: &'static str, value: &T) -> Res {
        value.serialize(*self)
    }
    fn end(self) -> Res {
        Ok(())
    }
}

impl ser::SerializeStructVariant for FiniteCheck {
    type Ok = ();
    type Error = CheckError;
    fn serialize_field<T: ?Sized + Serialize>(&mut self, _key: &'static str, value: &T) -> Res {
        value.serialize(*self)
    }
    fn end(self) -> Res {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use std::collections::BTreeMap;

    #[derive(Serialize)]
    struct Reading {
        sensor: &'static str,
        values: Vec<Option<f32>>,
    }

    #[derive(Serialize)]
    enum Sample {
        Point { x: f64 },
    }

    #[test]
    fn test_finite_values_pass() {
        assert_eq!(find_non_finite(&1.5f64), None);
        assert_eq!(
            find_non_finite(&vec![0.0, -0.0, f64::MAX, f64::MIN_POSITIVE]),
            None
        );
        assert_eq!(find_non_finite("text"), None);
        assert_eq!(
            find_non_finite(&Reading {
                sensor: "a",
                values: vec![Some(1.0), None],
            }),
            None
        );
    }

    #[test]
    fn test_nested_non_finite_found() {
        assert!(find_non_finite(&f64::NAN).is_some_and(f64::is_nan));
        assert_eq!(
            find_non_finite(&vec![1.0, f64::INFINITY]),
            Some(f64::INFINITY)
        );
        assert_eq!(
            find_non_finite(&Reading {
                sensor: "a",
                values: vec![None, Some(f32::NEG_INFINITY)],
            }),
            Some(f64::NEG_INFINITY)
        );
        assert_eq!(
            find_non_finite(&Sample::Point { x: f64::INFINITY }),
            Some(f64::INFINITY)
        );

        let mut map = BTreeMap::new();
        map.insert("k", (1u8, f64::NEG_INFINITY));
        assert_eq!(find_non_finite(&map), Some(f64::NEG_INFINITY));
    }
}
