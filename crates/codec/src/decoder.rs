//! Decoder for order-preserving keys and values.

use super::{Tag, MAX_DEPTH};
use sqlkv_core::{Error, Result, Value};

const SIGN_BIT: u64 = 1 << 63;

/// Cursor over a sequence of encoded items.
pub struct Decoder<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    /// Creates a decoder at the start of `bytes`.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Returns true when every byte has been consumed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    /// Returns the unread bytes.
    #[inline]
    pub fn remaining(&self) -> &'a [u8] {
        &self.bytes[self.pos..]
    }

    /// Returns the current offset.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Decodes the next item.
    pub fn next_value(&mut self) -> Result<Value> {
        self.read_item(0)
    }

    /// Decodes the next item, which must be an Int.
    pub fn next_int(&mut self) -> Result<i64> {
        let offset = self.pos;
        match self.next_value()? {
            Value::Int(v) => Ok(v),
            other => Err(Error::malformed(offset, format!("expected int, found {:?}", other))),
        }
    }

    /// Decodes the next item, which must be a Blob.
    pub fn next_blob(&mut self) -> Result<Vec<u8>> {
        let offset = self.pos;
        match self.next_value()? {
            Value::Blob(v) => Ok(v),
            other => Err(Error::malformed(offset, format!("expected blob, found {:?}", other))),
        }
    }

    /// Decodes the next item, which must be a UTF-8 Blob.
    pub fn next_string(&mut self) -> Result<String> {
        let offset = self.pos;
        String::from_utf8(self.next_blob()?)
            .map_err(|_| Error::malformed(offset, "blob is not valid UTF-8"))
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| {
                Error::malformed(
                    self.pos,
                    format!("need {} bytes, {} left", len, self.bytes.len() - self.pos),
                )
            })?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn take_u64(&mut self) -> Result<u64> {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(self.take(8)?);
        Ok(u64::from_be_bytes(raw))
    }

    fn read_item(&mut self, depth: usize) -> Result<Value> {
        let offset = self.pos;
        let byte = *self
            .bytes
            .get(offset)
            .ok_or_else(|| Error::malformed(offset, "unexpected end of input"))?;
        let tag = Tag::from_byte(byte)
            .ok_or_else(|| Error::malformed(offset, format!("unknown tag 0x{:02x}", byte)))?;
        self.pos += 1;

        match tag {
            Tag::Nil => Ok(Value::Nil),
            Tag::Int => {
                let bits = self.take_u64()?;
                Ok(Value::Int((bits ^ SIGN_BIT) as i64))
            }
            Tag::Float => {
                let bits = self.take_u64()?;
                let raw = if bits & SIGN_BIT != 0 {
                    bits & !SIGN_BIT
                } else {
                    !bits
                };
                Ok(Value::Float(f64::from_bits(raw)))
            }
            Tag::BoundedBlob(len) => Ok(Value::Blob(self.take(len as usize)?.to_vec())),
            Tag::UnboundedBlob => {
                let rest = self.remaining().to_vec();
                self.pos = self.bytes.len();
                Ok(Value::Blob(rest))
            }
            Tag::FixArray(n) => {
                check_depth(offset, depth)?;
                let mut items = Vec::with_capacity(n as usize);
                for _ in 0..n {
                    items.push(self.read_item(depth + 1)?);
                }
                Ok(Value::Array(items))
            }
            Tag::FixMap(n) => {
                check_depth(offset, depth)?;
                let mut entries = Vec::with_capacity(n as usize);
                for _ in 0..n {
                    let key = self.read_item(depth + 1)?;
                    let val = self.read_item(depth + 1)?;
                    entries.push((key, val));
                }
                Ok(Value::Map(entries))
            }
        }
    }
}

#[inline]
fn check_depth(offset: usize, depth: usize) -> Result<()> {
    if depth >= MAX_DEPTH {
        return Err(Error::malformed(offset, "nesting too deep"));
    }
    Ok(())
}

/// Decodes exactly one value; trailing bytes are malformed.
pub fn decode(bytes: &[u8]) -> Result<Value> {
    let mut decoder = Decoder::new(bytes);
    let value = decoder.next_value()?;
    if !decoder.is_empty() {
        return Err(Error::malformed(
            decoder.position(),
            format!("{} trailing bytes", decoder.remaining().len()),
        ));
    }
    Ok(value)
}

/// Decodes a composite key back into its column values.
pub fn decode_key(bytes: &[u8]) -> Result<Vec<Value>> {
    let mut decoder = Decoder::new(bytes);
    let mut values = Vec::new();
    while !decoder.is_empty() {
        values.push(decoder.next_value()?);
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{encode_key_to_vec, encode_to_vec};

    fn roundtrip(value: Value) {
        let bytes = encode_to_vec(&value).unwrap();
        assert_eq!(decode(&bytes).unwrap(), value);
    }

    #[test]
    fn test_scalar_roundtrip() {
        roundtrip(Value::Nil);
        roundtrip(Value::Int(i64::MIN));
        roundtrip(Value::Int(-1));
        roundtrip(Value::Int(0));
        roundtrip(Value::Int(i64::MAX));
        roundtrip(Value::Float(-1.5));
        roundtrip(Value::Float(f64::INFINITY));
        roundtrip(Value::Float(f64::NEG_INFINITY));
        roundtrip(Value::Float(f64::NAN));
        roundtrip(Value::Float(-f64::NAN));
        roundtrip(Value::from(""));
        roundtrip(Value::Blob(vec![0xff; 1000]));
    }

    #[test]
    fn test_negative_zero_decodes_as_zero() {
        let bytes = encode_to_vec(&Value::Float(-0.0)).unwrap();
        let value = decode(&bytes).unwrap().as_float().unwrap();
        assert_eq!(value, 0.0);
        assert!(value.is_sign_positive());
    }

    #[test]
    fn test_nested_roundtrip() {
        let inner = Value::Map(vec![
            (Value::from("a"), Value::Int(1)),
            (Value::Int(2), Value::Array(vec![Value::Float(0.5), Value::Nil])),
        ]);
        let full: Vec<Value> = (0..15).map(Value::Int).collect();
        roundtrip(Value::Array(vec![inner.clone(), Value::from("x"), inner]));
        roundtrip(Value::Array(full));
        roundtrip(Value::Array(vec![]));
        roundtrip(Value::Map(vec![]));
    }

    #[test]
    fn test_key_roundtrip() {
        let values = vec![Value::from("users"), Value::Int(-3), Value::Blob(vec![9; 400])];
        let bytes = encode_key_to_vec(&values).unwrap();
        assert_eq!(decode_key(&bytes).unwrap(), values);
        assert!(decode_key(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_truncated_input() {
        let bytes = encode_to_vec(&Value::Int(42)).unwrap();
        for len in 0..bytes.len() {
            assert!(matches!(
                decode(&bytes[..len]),
                Err(Error::MalformedEncoding { .. })
            ));
        }

        // Bounded blob claims 5 bytes, only 2 follow.
        assert!(decode(&[0x05, b'a', b'b']).is_err());
        // Array claims 2 elements, only 1 follows.
        assert!(decode(&[0x92, 0xc0]).is_err());
    }

    #[test]
    fn test_unknown_tags() {
        for byte in [0xa1u8, 0xb1, 0xb9, 0xc1, 0xff] {
            match decode(&[byte]) {
                Err(Error::MalformedEncoding { offset, .. }) => assert_eq!(offset, 0),
                other => panic!("expected malformed, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_trailing_bytes() {
        assert!(matches!(
            decode(&[0xc0, 0xc0]),
            Err(Error::MalformedEncoding { offset: 1, .. })
        ));
    }

    #[test]
    fn test_unbounded_inside_array_swallows_siblings() {
        // An unbounded blob that is not last leaves the array short.
        assert!(decode(&[0x92, 0xa0, b'x', 0xc0]).is_err());
    }

    #[test]
    fn test_depth_limit() {
        let deep = vec![0x91u8; MAX_DEPTH + 1];
        assert!(matches!(
            decode(&deep),
            Err(Error::MalformedEncoding { .. })
        ));
    }

    #[test]
    fn test_typed_reads() {
        let bytes = encode_key_to_vec(&[Value::Int(7), Value::from("name"), Value::Nil]).unwrap();
        let mut decoder = Decoder::new(&bytes);
        assert_eq!(decoder.next_int().unwrap(), 7);
        assert_eq!(decoder.next_string().unwrap(), "name");
        assert!(decoder.next_int().is_err());
        assert!(decoder.is_empty());
    }
}
