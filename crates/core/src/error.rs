//! Error types for sqlkv.

use thiserror::Error;

/// Result type alias for sqlkv operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Error types for sqlkv operations.
///
/// The `Schema*` family is produced by pure validation and never leaves
/// anything behind in the store.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// Column type list and column name list have different lengths.
    #[error("Schema mismatch: {types} column types for {names} column names")]
    SchemaMismatchColumns { types: usize, names: usize },
    /// A column name appears more than once.
    #[error("Duplicate column name: {column}")]
    SchemaColumnNameDuplicate { column: String },
    /// A declared primary key column does not exist.
    #[error("Primary key column not found: {column}")]
    SchemaPkNotFound { column: String },
    /// AutoInt columns and the declared primary key disagree.
    #[error("Invalid AutoInt primary key: {message}")]
    SchemaAutoIntPk { message: String },
    /// Invalid schema definition (naming rules, reserved names, indices).
    #[error("Invalid schema: {message}")]
    InvalidSchema { message: String },
    /// The environment was never initialized or failed to initialize.
    #[error("Database environment is not valid")]
    DbNotValid,
    /// A table with this name is already stored.
    #[error("Table already exists: {name}")]
    TableExists { name: String },
    /// Truncated or tag-inconsistent encoded bytes.
    #[error("Malformed encoding at offset {offset}: {message}")]
    MalformedEncoding { offset: usize, message: String },
    /// A value does not fit the fixed-size tag space it must be written in.
    #[error("Encoding overflow: {message}")]
    EncodingOverflow { message: String },
    /// An index entry was given the wrong number of column values.
    #[error("Index {index} expects {expected} values, got {got}")]
    IndexArity {
        index: String,
        expected: usize,
        got: usize,
    },
    /// A unique index already maps the key to another primary key.
    #[error("Unique constraint violation on index {table}.{index}")]
    UniqueViolation { table: String, index: String },
    /// A write was attempted on a read-only transaction.
    #[error("Transaction is read-only")]
    ReadOnlyTransaction,
    /// Failure surfaced by the underlying key-value engine.
    #[error("Store error: {message}")]
    Store { message: String },
}

impl Error {
    /// Creates a schema mismatch error.
    pub fn schema_mismatch(types: usize, names: usize) -> Self {
        Error::SchemaMismatchColumns { types, names }
    }

    /// Creates a duplicate column error.
    pub fn duplicate_column(column: impl Into<String>) -> Self {
        Error::SchemaColumnNameDuplicate {
            column: column.into(),
        }
    }

    /// Creates a primary key not found error.
    pub fn pk_not_found(column: impl Into<String>) -> Self {
        Error::SchemaPkNotFound {
            column: column.into(),
        }
    }

    /// Creates an AutoInt primary key error.
    pub fn auto_int_pk(message: impl Into<String>) -> Self {
        Error::SchemaAutoIntPk {
            message: message.into(),
        }
    }

    /// Creates an invalid schema error.
    pub fn invalid_schema(message: impl Into<String>) -> Self {
        Error::InvalidSchema {
            message: message.into(),
        }
    }

    /// Creates a table exists error.
    pub fn table_exists(name: impl Into<String>) -> Self {
        Error::TableExists { name: name.into() }
    }

    /// Creates a malformed encoding error.
    pub fn malformed(offset: usize, message: impl Into<String>) -> Self {
        Error::MalformedEncoding {
            offset,
            message: message.into(),
        }
    }

    /// Creates an encoding overflow error.
    pub fn overflow(message: impl Into<String>) -> Self {
        Error::EncodingOverflow {
            message: message.into(),
        }
    }

    /// Creates a unique violation error.
    pub fn unique_violation(table: impl Into<String>, index: impl Into<String>) -> Self {
        Error::UniqueViolation {
            table: table.into(),
            index: index.into(),
        }
    }

    /// Creates an index arity error.
    pub fn index_arity(index: impl Into<String>, expected: usize, got: usize) -> Self {
        Error::IndexArity {
            index: index.into(),
            expected,
            got,
        }
    }

    /// Creates a store error from any engine error.
    pub fn store(err: impl core::fmt::Display) -> Self {
        Error::Store {
            message: err.to_string(),
        }
    }

    /// Returns true for errors raised by schema validation.
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            Error::SchemaMismatchColumns { .. }
                | Error::SchemaColumnNameDuplicate { .. }
                | Error::SchemaPkNotFound { .. }
                | Error::SchemaAutoIntPk { .. }
                | Error::InvalidSchema { .. }
        )
    }
}
