//! Persisted table and index definitions.
//!
//! A table entry holds the row key, the columns and the number of indices.
//! Each index has its own entry carrying its declaration ordinal, so a
//! loaded schema lists indices in the order they were declared.

use crate::environment::Environment;
use sqlkv_codec::{encode_key_to_vec, Decoder};
use sqlkv_core::schema::{Column, Index, IndexKind, PrimaryKey, SchemaBuilder, TableSchema};
use sqlkv_core::{ColumnType, Error, Result, Value};

/// Persists a validated [`SchemaBuilder`] into an environment.
pub trait SchemaBuilderExt {
    /// Validates the declaration and commits its catalog entries.
    ///
    /// Validation failures are returned before the environment is looked
    /// at. An invalid environment yields `DbNotValid`, an existing table
    /// `TableExists`. Nothing is written on any failure.
    fn build(&self, env: &Environment) -> Result<TableSchema>;
}

impl SchemaBuilderExt for SchemaBuilder {
    fn build(&self, env: &Environment) -> Result<TableSchema> {
        let schema = self.validate()?;
        env.create_table(&schema)?;
        Ok(schema)
    }
}

pub(crate) fn encode_table(schema: &TableSchema) -> Result<Vec<u8>> {
    let pk = schema.primary_key();
    let mut items = vec![
        Value::from(pk.name()),
        Value::Int(pk.column_type().code()),
        Value::Int(pk.is_hidden() as i64),
        Value::Int(schema.columns().len() as i64),
    ];
    for column in schema.columns() {
        items.push(Value::from(column.name()));
        items.push(Value::Int(column.column_type().code()));
    }
    items.push(Value::Int(schema.indices().len() as i64));
    encode_key_to_vec(&items)
}

/// Decodes a table entry, returning the schema without indices and the
/// number of indices it expects.
pub(crate) fn decode_table(name: &str, bytes: &[u8]) -> Result<(TableSchema, usize)> {
    let mut decoder = Decoder::new(bytes);
    let pk_name = decoder.next_string()?;
    let pk_type = next_type(&mut decoder)?;
    let primary_key = match decoder.next_int()? {
        0 => PrimaryKey::new(pk_name, pk_type),
        _ => PrimaryKey::hidden(),
    };
    let ncols = next_count(&mut decoder)?;
    let mut columns = Vec::with_capacity(ncols);
    for _ in 0..ncols {
        let column_name = decoder.next_string()?;
        columns.push(Column::new(column_name, next_type(&mut decoder)?));
    }
    let nindices = next_count(&mut decoder)?;
    expect_end(&decoder)?;
    Ok((TableSchema::restore(name, columns, primary_key, Vec::new()), nindices))
}

pub(crate) fn encode_index(ordinal: usize, index: &Index) -> Result<Vec<u8>> {
    let mut items = vec![
        Value::Int(ordinal as i64),
        Value::Int(index.get_kind().code()),
        Value::Int(index.columns().len() as i64),
    ];
    items.extend(index.columns().iter().map(|c| Value::from(c.as_str())));
    encode_key_to_vec(&items)
}

/// Decodes an index entry into its ordinal and definition.
pub(crate) fn decode_index(table: &str, name: &str, bytes: &[u8]) -> Result<(i64, Index)> {
    let mut decoder = Decoder::new(bytes);
    let ordinal = decoder.next_int()?;
    let offset = decoder.position();
    let kind = IndexKind::from_code(decoder.next_int()?)
        .ok_or_else(|| Error::malformed(offset, "unknown index kind"))?;
    let ncols = next_count(&mut decoder)?;
    let mut columns = Vec::with_capacity(ncols);
    for _ in 0..ncols {
        columns.push(decoder.next_string()?);
    }
    expect_end(&decoder)?;
    Ok((ordinal, Index::new(name, table, columns).kind(kind)))
}

fn next_type(decoder: &mut Decoder<'_>) -> Result<ColumnType> {
    let offset = decoder.position();
    ColumnType::from_code(decoder.next_int()?)
        .ok_or_else(|| Error::malformed(offset, "unknown column type"))
}

fn next_count(decoder: &mut Decoder<'_>) -> Result<usize> {
    let offset = decoder.position();
    usize::try_from(decoder.next_int()?).map_err(|_| Error::malformed(offset, "negative count"))
}

fn expect_end(decoder: &Decoder<'_>) -> Result<()> {
    if decoder.is_empty() {
        Ok(())
    } else {
        Err(Error::malformed(decoder.position(), "trailing catalog bytes"))
    }
}
