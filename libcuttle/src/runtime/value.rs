//
// runtime/value.rs
// The Cuttle Compiler
//
// Created by the Cuttle Contributors
// on 05/03/2024
//

use std::convert::TryFrom;
use super::{ Error, Result };


/// A single SQL value, as passed to or returned from a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL `NULL`.
    Null,
    /// A signed 64-bit integer. Booleans are stored as 0 or 1.
    Integer(i64),
    /// A double precision float.
    Real(f64),
    /// UTF-8 text.
    Text(String),
    /// Raw bytes.
    Blob(Vec<u8>),
}

impl Value {
    /// Human-readable name of the kind of this value.
    pub fn kind_name(&self) -> &'static str {
        match *self {
            Value::Null       => "null",
            Value::Integer(_) => "integer",
            Value::Real(_)    => "real",
            Value::Text(_)    => "text",
            Value::Blob(_)    => "blob",
        }
    }

    fn mismatch<T>(&self, expected: &'static str) -> Result<T> {
        Err(Error::Decode { expected, found: self.kind_name() })
    }
}

/// Conversion of statement arguments into `Value`s.
pub trait ToValue {
    /// Converts `self` into a `Value`.
    fn to_value(&self) -> Value;
}

/// Conversion of result columns out of `Value`s.
pub trait FromValue: Sized {
    /// Converts `value`, failing with `Error::Decode` on a type mismatch.
    fn from_value(value: &Value) -> Result<Self>;
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self> {
        Ok(value.clone())
    }
}

impl ToValue for i64 {
    fn to_value(&self) -> Value {
        Value::Integer(*self)
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self> {
        match *value {
            Value::Integer(i) => Ok(i),
            ref other => other.mismatch("i64"),
        }
    }
}

impl ToValue for i32 {
    fn to_value(&self) -> Value {
        Value::Integer(i64::from(*self))
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> Result<Self> {
        match *value {
            Value::Integer(i) => i32::try_from(i).or_else(|_| value.mismatch("i32")),
            ref other => other.mismatch("i32"),
        }
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Integer(i64::from(*self))
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self> {
        match *value {
            Value::Integer(0) => Ok(false),
            Value::Integer(1) => Ok(true),
            ref other => other.mismatch("bool"),
        }
    }
}

impl ToValue for f64 {
    fn to_value(&self) -> Value {
        Value::Real(*self)
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self> {
        match *value {
            Value::Real(r) => Ok(r),
            ref other => other.mismatch("f64"),
        }
    }
}

impl ToValue for str {
    fn to_value(&self) -> Value {
        Value::Text(self.to_owned())
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self> {
        match *value {
            Value::Text(ref s) => Ok(s.clone()),
            ref other => other.mismatch("String"),
        }
    }
}

impl ToValue for [u8] {
    fn to_value(&self) -> Value {
        Value::Blob(self.to_vec())
    }
}

impl ToValue for Vec<u8> {
    fn to_value(&self) -> Value {
        Value::Blob(self.clone())
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: &Value) -> Result<Self> {
        match *value {
            Value::Blob(ref b) => Ok(b.clone()),
            ref other => other.mismatch("Vec<u8>"),
        }
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        match *self {
            Some(ref v) => v.to_value(),
            None        => Value::Null,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self> {
        match *value {
            Value::Null => Ok(None),
            ref other   => T::from_value(other).map(Some),
        }
    }
}
