//! Encoder for order-preserving keys and values.
//!
//! Every function appends to the caller's buffer. On failure the buffer is
//! cut back to the length it had on entry, so earlier content is never
//! touched.

use super::{tags, MAX_BOUNDED_LEN, MAX_DEPTH, MAX_FIXED_ENTRIES};
use sqlkv_core::{Error, Result, Value};

const SIGN_BIT: u64 = 1 << 63;

/// Maps an i64 onto a u64 whose unsigned order matches signed order.
#[inline]
pub fn int_sort_bits(value: i64) -> u64 {
    (value as u64) ^ SIGN_BIT
}

/// Maps an f64 onto a u64 whose unsigned order is the total order
/// `-NaN < -Inf < .. < -0 == +0 < .. < +Inf < +NaN`.
///
/// Negative zero is folded into positive zero and every NaN into the
/// canonical NaN of its sign first.
#[inline]
pub fn float_sort_bits(value: f64) -> u64 {
    let value = if value == 0.0 {
        0.0
    } else if value.is_nan() {
        f64::NAN.copysign(value)
    } else {
        value
    };
    let bits = value.to_bits();
    if bits & SIGN_BIT != 0 {
        !bits
    } else {
        bits | SIGN_BIT
    }
}

/// Appends the encoding of a single value.
///
/// The value is the tail of the buffer's encoding, so a blob takes the
/// unbounded form.
pub fn encode(buffer: &mut Vec<u8>, value: &Value) -> Result<()> {
    let start = buffer.len();
    encode_item(buffer, value, true, 0).inspect_err(|_| buffer.truncate(start))
}

/// Encodes a single value into a fresh buffer.
pub fn encode_to_vec(value: &Value) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    encode(&mut buffer, value)?;
    Ok(buffer)
}

/// Appends a composite key: each value in order, the last one as the tail.
pub fn encode_key(buffer: &mut Vec<u8>, values: &[Value]) -> Result<()> {
    let start = buffer.len();
    let last = values.len().saturating_sub(1);
    for (i, value) in values.iter().enumerate() {
        if let Err(e) = encode_item(buffer, value, i == last, 0) {
            buffer.truncate(start);
            return Err(e);
        }
    }
    Ok(())
}

/// Encodes a composite key into a fresh buffer.
pub fn encode_key_to_vec(values: &[Value]) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    encode_key(&mut buffer, values)?;
    Ok(buffer)
}

/// Appends leading key columns exactly as they appear inside a longer key.
///
/// Nothing is written in tail form, so the result is a byte prefix of every
/// key whose first columns equal `values`.
pub fn encode_prefix(buffer: &mut Vec<u8>, values: &[Value]) -> Result<()> {
    let start = buffer.len();
    for value in values {
        if let Err(e) = encode_item(buffer, value, false, 0) {
            buffer.truncate(start);
            return Err(e);
        }
    }
    Ok(())
}

/// Appends the start of a tail blob, matching every tail blob that begins
/// with `partial`.
pub fn encode_blob_prefix(buffer: &mut Vec<u8>, partial: &[u8]) {
    buffer.push(tags::UNB_STR);
    buffer.extend_from_slice(partial);
}

fn encode_item(buffer: &mut Vec<u8>, value: &Value, tail: bool, depth: usize) -> Result<()> {
    match value {
        Value::Nil => buffer.push(tags::NIL),
        Value::Int(v) => {
            buffer.push(tags::FIX_INT);
            buffer.extend_from_slice(&int_sort_bits(*v).to_be_bytes());
        }
        Value::Float(v) => {
            buffer.push(tags::FIX_FLT);
            buffer.extend_from_slice(&float_sort_bits(*v).to_be_bytes());
        }
        Value::Blob(bytes) => {
            if tail {
                buffer.push(tags::UNB_STR);
            } else if bytes.len() <= MAX_BOUNDED_LEN {
                buffer.push(bytes.len() as u8);
            } else {
                return Err(Error::overflow(format!(
                    "blob of {} bytes exceeds {} outside the tail position",
                    bytes.len(),
                    MAX_BOUNDED_LEN
                )));
            }
            buffer.extend_from_slice(bytes);
        }
        Value::Array(items) => {
            check_nesting(depth)?;
            check_entries("array", items.len())?;
            buffer.push(tags::FIX_ARR | items.len() as u8);
            let last = items.len().saturating_sub(1);
            for (i, item) in items.iter().enumerate() {
                encode_item(buffer, item, tail && i == last, depth + 1)?;
            }
        }
        Value::Map(entries) => {
            check_nesting(depth)?;
            check_entries("map", entries.len())?;
            buffer.push(tags::FIX_MAP | entries.len() as u8);
            let last = entries.len().saturating_sub(1);
            for (i, (key, val)) in entries.iter().enumerate() {
                encode_item(buffer, key, false, depth + 1)?;
                encode_item(buffer, val, tail && i == last, depth + 1)?;
            }
        }
    }
    Ok(())
}

#[inline]
fn check_nesting(depth: usize) -> Result<()> {
    if depth >= MAX_DEPTH {
        return Err(Error::overflow(format!(
            "nesting deeper than {} arrays or maps",
            MAX_DEPTH
        )));
    }
    Ok(())
}

#[inline]
fn check_entries(kind: &str, len: usize) -> Result<()> {
    if len > MAX_FIXED_ENTRIES {
        return Err(Error::overflow(format!(
            "{} of {} entries exceeds {}",
            kind, len, MAX_FIXED_ENTRIES
        )));
    }
    Ok(())
}
