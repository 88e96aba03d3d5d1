//! Column type definitions for sqlkv.
//!
//! This module defines the closed set of types a table column can hold.

/// Supported column types.
///
/// Only `Int` and `AutoInt` are used directly as a primary key. A declared
/// `Blob` key is kept as a unique index behind a hidden key, and `Float`
/// never keys a row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// 64-bit signed integer
    Int,
    /// 64-bit signed integer assigned by the store, primary key only
    AutoInt,
    /// 64-bit IEEE floating point number
    Float,
    /// Byte sequence, including text
    Blob,
}

impl ColumnType {
    /// Returns the stable code used when a schema is persisted.
    pub fn code(&self) -> i64 {
        match self {
            ColumnType::Int => 0,
            ColumnType::AutoInt => 1,
            ColumnType::Float => 2,
            ColumnType::Blob => 3,
        }
    }

    /// Returns the type for a persisted code.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(ColumnType::Int),
            1 => Some(ColumnType::AutoInt),
            2 => Some(ColumnType::Float),
            3 => Some(ColumnType::Blob),
            _ => None,
        }
    }

    /// Returns whether a column of this type can back the row key directly.
    pub fn is_direct_primary_key(&self) -> bool {
        matches!(self, ColumnType::Int | ColumnType::AutoInt)
    }
}
