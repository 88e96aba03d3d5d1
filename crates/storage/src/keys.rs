//! Key layout inside the default namespace.
//!
//! Every key starts with a one-byte key space tag followed by codec items.
//! Names are written in the bounded blob form, so one table's key space is
//! never a byte prefix of another's.

use redb::TableDefinition;
use sqlkv_codec::{encode_key, encode_prefix};
use sqlkv_core::{Result, Value};

/// The default namespace every sqlkv key lives in.
pub const NAMESPACE: TableDefinition<&[u8], &[u8]> = TableDefinition::new("sqlkv");

/// Table catalog entries.
pub const TABLE_META: u8 = 0x01;
/// Index catalog entries.
pub const INDEX_META: u8 = 0x02;
/// AutoInt sequences.
pub const SEQUENCE: u8 = 0x03;
/// Row data. Reserved, nothing is written here yet.
pub const ROW_DATA: u8 = 0x10;
/// Index entries.
pub const INDEX_DATA: u8 = 0x11;

fn names(space: u8, parts: &[&str]) -> Result<Vec<u8>> {
    let mut key = vec![space];
    let values: Vec<Value> = parts.iter().map(|p| Value::from(*p)).collect();
    encode_prefix(&mut key, &values)?;
    Ok(key)
}

/// Key of a table's catalog entry.
pub fn table_meta(table: &str) -> Result<Vec<u8>> {
    names(TABLE_META, &[table])
}

/// Prefix shared by every table catalog entry.
pub fn table_meta_prefix() -> Vec<u8> {
    vec![TABLE_META]
}

/// Key of one index catalog entry.
pub fn index_meta(table: &str, index: &str) -> Result<Vec<u8>> {
    names(INDEX_META, &[table, index])
}

/// Prefix shared by a table's index catalog entries.
pub fn index_meta_prefix(table: &str) -> Result<Vec<u8>> {
    names(INDEX_META, &[table])
}

/// Key of a table's AutoInt sequence.
pub fn sequence(table: &str) -> Result<Vec<u8>> {
    names(SEQUENCE, &[table])
}

/// Prefix shared by every entry of one index.
pub fn index_data_prefix(table: &str, index: &str) -> Result<Vec<u8>> {
    names(INDEX_DATA, &[table, index])
}

/// Key of a unique index entry: the column values, last one as the tail.
pub fn unique_entry(table: &str, index: &str, values: &[Value]) -> Result<Vec<u8>> {
    let mut key = index_data_prefix(table, index)?;
    encode_key(&mut key, values)?;
    Ok(key)
}

/// Prefix shared by every plain index entry holding these column values.
pub fn plain_entry_prefix(table: &str, index: &str, values: &[Value]) -> Result<Vec<u8>> {
    let mut key = index_data_prefix(table, index)?;
    encode_prefix(&mut key, values)?;
    Ok(key)
}

/// Key of a plain index entry: the column values followed by the row key.
pub fn plain_entry(table: &str, index: &str, values: &[Value], pk: &Value) -> Result<Vec<u8>> {
    let mut key = plain_entry_prefix(table, index, values)?;
    encode_key(&mut key, core::slice::from_ref(pk))?;
    Ok(key)
}
