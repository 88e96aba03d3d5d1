//! Schema module for sqlkv.
//!
//! This module contains the table, column and index definitions together
//! with the builder that validates a declaration into a [`TableSchema`].

mod column;
mod index;
mod table;

pub use column::Column;
pub use index::{Index, IndexKind, PK_INDEX_NAME};
pub use table::{PrimaryKey, SchemaBuilder, TableSchema, HIDDEN_PK_NAME, MAX_NAME_LEN};
