//! sqlkv Core - Core types and schema definitions for sqlkv.
//!
//! This crate provides the foundational types shared by the codec and the
//! storage layer:
//!
//! - `ColumnType`: Supported column types (Int, AutoInt, Float, Blob)
//! - `Value`: Values that can be encoded into keys and values
//! - `schema`: Schema definitions (Column, TableSchema, Index, SchemaBuilder)
//! - `Error`: Error types for every fallible operation
//!
//! # Example
//!
//! ```rust
//! use sqlkv_core::ColumnType;
//! use sqlkv_core::schema::{SchemaBuilder, HIDDEN_PK_NAME};
//!
//! let table = SchemaBuilder::new("a")
//!     .columns(
//!         &[ColumnType::Int, ColumnType::Float, ColumnType::Blob],
//!         &["c", "d", "e"],
//!     )
//!     .primary_key(&["c", "e"])
//!     .validate()
//!     .unwrap();
//!
//! // A composite key is kept as a unique index behind a hidden row key.
//! assert_eq!(table.primary_key().name(), HIDDEN_PK_NAME);
//! assert_eq!(table.pk_index().unwrap().columns(), ["c", "e"]);
//! ```

mod error;
pub mod schema;
mod types;
mod value;

pub use error::{Error, Result};
pub use types::ColumnType;
pub use value::Value;
