//! Value type definitions for sqlkv.
//!
//! This module defines the `Value` enum which represents anything the codec
//! can place in a key or a value: scalar cells plus small fixed-size tuples.

use core::hash::{Hash, Hasher};

/// A value that can be encoded into the store.
#[derive(Clone, Debug)]
pub enum Value {
    /// Absent value
    Nil,
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point
    Float(f64),
    /// Byte sequence, including text
    Blob(Vec<u8>),
    /// Fixed-size array
    Array(Vec<Value>),
    /// Fixed-size map, entries kept in insertion order
    Map(Vec<(Value, Value)>),
}

impl Value {
    /// Returns true if this value is Nil.
    #[inline]
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Returns the i64 value if this is an Int, None otherwise.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the f64 value if this is a Float, None otherwise.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the bytes if this is a Blob, None otherwise.
    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            Value::Blob(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// Returns the blob as UTF-8 text, None if not a Blob or not UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        self.as_blob().and_then(|b| core::str::from_utf8(b).ok())
    }

    /// Returns the elements if this is an Array, None otherwise.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(v) => Some(v.as_slice()),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => {
                if a.is_nan() && b.is_nan() {
                    a.is_sign_negative() == b.is_sign_negative()
                } else {
                    a == b
                }
            }
            (Value::Blob(a), Value::Blob(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);
        match self {
            Value::Nil => {}
            Value::Int(i) => i.hash(state),
            // Values that compare equal must hash equal: both zeros, and NaNs
            // of the same sign.
            Value::Float(f) => {
                let bits = if f.is_nan() {
                    f.is_sign_negative() as u64
                } else if *f == 0.0 {
                    0
                } else {
                    f.to_bits()
                };
                bits.hash(state)
            }
            Value::Blob(b) => b.hash(state),
            Value::Array(a) => a.hash(state),
            Value::Map(m) => m.hash(state),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Blob(v.as_bytes().to_vec())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Blob(v.into_bytes())
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Blob(v.to_vec())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Blob(v)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Value::Nil,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::Int(100).as_int(), Some(100));
        assert_eq!(Value::Float(2.5).as_float(), Some(2.5));
        assert_eq!(Value::from("hello").as_str(), Some("hello"));
        assert_eq!(Value::Blob(vec![1, 2, 3]).as_blob(), Some(&[1, 2, 3][..]));
        assert_eq!(Value::Blob(vec![0xff]).as_str(), None);
        assert!(Value::Nil.is_nil());
        assert_eq!(
            Value::Array(vec![Value::Nil]).as_array(),
            Some(&[Value::Nil][..])
        );
    }

    #[test]
    fn test_value_equality() {
        assert_eq!(Value::Float(-0.0), Value::Float(0.0));
        assert_eq!(Value::Float(f64::NAN), Value::Float(f64::NAN));
        assert_ne!(Value::Float(f64::NAN), Value::Float(-f64::NAN));
        assert_ne!(Value::Int(1), Value::Float(1.0));
        assert_eq!(
            Value::Map(vec![(Value::from("k"), Value::Int(1))]),
            Value::Map(vec![(Value::from("k"), Value::Int(1))])
        );
    }

    #[test]
    fn test_value_from_impls() {
        let v: Value = 42i32.into();
        assert_eq!(v.as_int(), Some(42));

        let v: Value = String::from("abc").into();
        assert_eq!(v.as_str(), Some("abc"));

        let v: Value = Some(7i64).into();
        assert_eq!(v.as_int(), Some(7));

        let v: Value = None::<i64>.into();
        assert!(v.is_nil());
    }
}
