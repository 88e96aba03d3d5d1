//! Order-preserving binary codec for keys and values.
//!
//! Encoded bytes compare (unsigned, lexicographically) in the same order as
//! the values they encode, so range and prefix scans can run directly on
//! the store's keys. The design borrows msgpack's tag layout, but a string
//! never carries a length prefix in a position where prefix search matters.
//!
//! ## Tag Layout
//!
//! ```text
//! 0x00 - 0x7f   bounded blob, tag = length (0..=127), payload follows
//! 0x80 - 0x8f   fixed map, tag & 0x0f = entry count (0..=15)
//! 0x90 - 0x9f   fixed array, tag & 0x0f = element count (0..=15)
//! 0xa0          unbounded blob, every remaining byte is payload
//! 0xb0          i64, big-endian, sign bit flipped
//! 0xb8          f64, big-endian, folded into a total order
//! 0xc0          nil
//! ```
//!
//! A blob in the last position of an encoding (the tail) always takes the
//! unbounded form and orders purely lexicographically. Anywhere else it must
//! fit the bounded form and orders by (length, bytes).

mod decoder;
mod encoder;

pub use decoder::{decode, decode_key, Decoder};
pub use encoder::{
    encode, encode_blob_prefix, encode_key, encode_key_to_vec, encode_prefix, encode_to_vec,
    float_sort_bits, int_sort_bits,
};

/// Longest blob that can be written in the bounded form.
pub const MAX_BOUNDED_LEN: usize = 0x7f;

/// Most entries a fixed array or map can hold.
pub const MAX_FIXED_ENTRIES: usize = 0x0f;

/// Deepest nesting of arrays and maps the decoder accepts.
pub const MAX_DEPTH: usize = 64;

/// Tag byte values.
pub mod tags {
    pub const FIX_MAP: u8 = 0x80;
    pub const FIX_ARR: u8 = 0x90;
    pub const UNB_STR: u8 = 0xa0;
    pub const FIX_INT: u8 = 0xb0;
    pub const FIX_FLT: u8 = 0xb8;
    pub const NIL: u8 = 0xc0;
}

/// Item kind selected by a tag byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    /// Bounded blob of the given length.
    BoundedBlob(u8),
    /// Fixed map with the given entry count.
    FixMap(u8),
    /// Fixed array with the given element count.
    FixArray(u8),
    /// Blob running to the end of the buffer.
    UnboundedBlob,
    /// 64-bit signed integer.
    Int,
    /// 64-bit float.
    Float,
    /// Nil.
    Nil,
}

impl Tag {
    /// Classifies a tag byte, None for bytes outside every tag range.
    pub fn from_byte(byte: u8) -> Option<Tag> {
        match byte {
            0x00..=0x7f => Some(Tag::BoundedBlob(byte)),
            0x80..=0x8f => Some(Tag::FixMap(byte & 0x0f)),
            0x90..=0x9f => Some(Tag::FixArray(byte & 0x0f)),
            tags::UNB_STR => Some(Tag::UnboundedBlob),
            tags::FIX_INT => Some(Tag::Int),
            tags::FIX_FLT => Some(Tag::Float),
            tags::NIL => Some(Tag::Nil),
            _ => None,
        }
    }

    /// Returns the tag byte.
    pub fn to_byte(self) -> u8 {
        match self {
            Tag::BoundedBlob(len) => len,
            Tag::FixMap(n) => tags::FIX_MAP | n,
            Tag::FixArray(n) => tags::FIX_ARR | n,
            Tag::UnboundedBlob => tags::UNB_STR,
            Tag::Int => tags::FIX_INT,
            Tag::Float => tags::FIX_FLT,
            Tag::Nil => tags::NIL,
        }
    }
}

/// Returns the smallest key greater than every key starting with `prefix`,
/// or None when no such key exists (empty or all-0xff prefix).
pub fn prefix_successor(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut end = prefix.to_vec();
    while let Some(last) = end.pop() {
        if last < 0xff {
            end.push(last + 1);
            return Some(end);
        }
    }
    None
}
