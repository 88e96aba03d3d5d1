//! sqlkv Storage - Transactional storage layer over an embedded KV store.
//!
//! This crate maps validated schemas onto a single ordered namespace:
//!
//! - `Environment`: Store lifetime, transactions and the table catalog
//! - `Transaction`: Scoped reads and writes, index entries, AutoInt sequences
//! - `CheckedResult`: Outcome slot that refuses to lose an unread failure
//! - `SchemaBuilderExt`: Commits a `SchemaBuilder` declaration
//!
//! # Example
//!
//! ```rust
//! use sqlkv_core::ColumnType;
//! use sqlkv_core::schema::SchemaBuilder;
//! use sqlkv_storage::{EnvConfig, Environment, SchemaBuilderExt, TxnMode};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let env = Environment::open(dir.path().join("db.redb"), EnvConfig::default()).unwrap();
//!
//! let users = SchemaBuilder::new("users")
//!     .columns(&[ColumnType::AutoInt, ColumnType::Blob], &["id", "email"])
//!     .primary_key(&["id"])
//!     .add_index("by_email", &["email"], true)
//!     .build(&env)
//!     .unwrap();
//! assert_eq!(env.load_table("users").unwrap(), Some(users.clone()));
//!
//! let mut tx = env.begin_transaction(TxnMode::ReadWrite).unwrap();
//! let id = tx.next_auto_int("users").unwrap();
//! let by_email = users.get_index("by_email").unwrap();
//! tx.put_index_entry(by_email, &["a@example.com".into()], &id.into()).unwrap();
//! assert!(tx.commit().is_ok());
//! ```

mod catalog;
mod checked;
mod config;
mod environment;
pub mod keys;
mod transaction;

pub use catalog::SchemaBuilderExt;
pub use checked::{CheckedResult, UNCHECKED_ERROR_DISCARDED};
pub use config::{EnvConfig, TxnMode, DEFAULT_INITIAL_SIZE};
pub use environment::Environment;
pub use transaction::{Transaction, TransactionId};
