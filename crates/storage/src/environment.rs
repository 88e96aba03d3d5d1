//! Environment - owner of the store handle.
//!
//! An `Environment` opens (or creates) the store file, makes sure the
//! default namespace exists, and hands out transactions that borrow it.
//! It also reads and writes the table catalog.

use crate::catalog;
use crate::checked::CheckedResult;
use crate::config::{EnvConfig, TxnMode};
use crate::keys::{self, NAMESPACE};
use crate::transaction::Transaction;
use redb::{Builder, Database};
use sqlkv_codec::{decode_key, encode_to_vec};
use sqlkv_core::schema::TableSchema;
use sqlkv_core::{Error, Result, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Owner of an open store.
///
/// A fresh environment is not valid until [`Environment::init`] succeeds.
#[derive(Default)]
pub struct Environment {
    db: Option<Database>,
    path: Option<PathBuf>,
    config: EnvConfig,
}

impl Environment {
    /// Creates an environment with no store behind it.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a store, returning the environment or the first failure.
    pub fn open(path: impl AsRef<Path>, config: EnvConfig) -> Result<Self> {
        let mut env = Self::new();
        env.init(path, config).into_result()?;
        Ok(env)
    }

    /// Opens or creates the store at `path` and bootstraps the default
    /// namespace.
    ///
    /// A failure leaves the environment invalid. Any store opened by an
    /// earlier `init` is closed first.
    pub fn init(&mut self, path: impl AsRef<Path>, config: EnvConfig) -> CheckedResult {
        self.close();
        let path = path.as_ref();
        let outcome = bootstrap(path, &config);
        match outcome {
            Ok(db) => {
                info!(path = %path.display(), read_only = config.read_only, "environment opened");
                self.db = Some(db);
                self.path = Some(path.to_path_buf());
                self.config = config;
                CheckedResult::ok()
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "environment open failed");
                CheckedResult::new(Err(err))
            }
        }
    }

    /// Returns true once the store is open.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.db.is_some()
    }

    /// Returns the store path of a valid environment.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns the configuration the store was opened with.
    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    /// Closes the store. The environment becomes invalid.
    pub fn close(&mut self) {
        if self.db.take().is_some() {
            debug!(path = ?self.path, "environment closed");
        }
        self.path = None;
    }

    fn db(&self) -> Result<&Database> {
        self.db.as_ref().ok_or(Error::DbNotValid)
    }

    /// Starts a transaction. A read-only environment refuses `ReadWrite`.
    pub fn begin_transaction(&self, mode: TxnMode) -> Result<Transaction<'_>> {
        let db = self.db()?;
        match mode {
            TxnMode::ReadOnly => Ok(Transaction::read(db.begin_read().map_err(Error::store)?)),
            TxnMode::ReadWrite if self.config.read_only => Err(Error::ReadOnlyTransaction),
            TxnMode::ReadWrite => Ok(Transaction::write(db.begin_write().map_err(Error::store)?)),
        }
    }

    /// Commits the catalog entries of a validated schema.
    pub fn create_table(&self, schema: &TableSchema) -> Result<()> {
        let name = schema.name();
        let mut txn = self.begin_transaction(TxnMode::ReadWrite)?;

        let meta_key = keys::table_meta(name)?;
        if txn.get(&meta_key)?.is_some() {
            return Err(Error::table_exists(name));
        }
        txn.put(&meta_key, &catalog::encode_table(schema)?)?;
        for (ordinal, index) in schema.indices().iter().enumerate() {
            let key = keys::index_meta(name, index.name())?;
            txn.put(&key, &catalog::encode_index(ordinal, index)?)?;
        }
        if schema.primary_key().is_auto_int() {
            txn.put(&keys::sequence(name)?, &encode_to_vec(&Value::Int(1))?)?;
        }
        txn.commit().into_result()?;

        info!(
            table = name,
            columns = schema.columns().len(),
            indices = schema.indices().len(),
            "table created"
        );
        Ok(())
    }

    /// Reads a committed table definition back from the catalog.
    pub fn load_table(&self, name: &str) -> Result<Option<TableSchema>> {
        let txn = self.begin_transaction(TxnMode::ReadOnly)?;
        let Some(bytes) = txn.get(&keys::table_meta(name)?)? else {
            return Ok(None);
        };
        let (table, nindices) = catalog::decode_table(name, &bytes)?;

        let prefix = keys::index_meta_prefix(name)?;
        let mut indices = Vec::with_capacity(nindices);
        for (key, value) in txn.scan_prefix(&prefix)? {
            let index_name = name_at(&key, 1)?;
            indices.push(catalog::decode_index(name, &index_name, &value)?);
        }
        if indices.len() != nindices {
            return Err(Error::malformed(
                0,
                format!("table {} lists {} indices, found {}", name, nindices, indices.len()),
            ));
        }
        indices.sort_by_key(|(ordinal, _)| *ordinal);

        Ok(Some(TableSchema::restore(
            table.name(),
            table.columns().to_vec(),
            table.primary_key().clone(),
            indices.into_iter().map(|(_, index)| index).collect(),
        )))
    }

    /// Lists committed tables in key order.
    pub fn table_names(&self) -> Result<Vec<String>> {
        let txn = self.begin_transaction(TxnMode::ReadOnly)?;
        txn.scan_prefix(&keys::table_meta_prefix())?
            .into_iter()
            .map(|(key, _)| name_at(&key, 0))
            .collect()
    }
}

impl core::fmt::Debug for Environment {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Environment")
            .field("path", &self.path)
            .field("valid", &self.is_valid())
            .field("config", &self.config)
            .finish()
    }
}

fn bootstrap(path: &Path, config: &EnvConfig) -> Result<Database> {
    let mut builder = Builder::new();
    builder.set_cache_size(config.initial_size);
    let db = if config.create_if_missing && !config.read_only {
        builder.create(path)
    } else {
        builder.open(path)
    }
    .map_err(Error::store)?;

    if config.read_only {
        let txn = db.begin_read().map_err(Error::store)?;
        txn.open_table(NAMESPACE).map_err(Error::store)?;
    } else {
        let txn = db.begin_write().map_err(Error::store)?;
        txn.open_table(NAMESPACE).map_err(Error::store)?;
        txn.commit().map_err(Error::store)?;
    }
    Ok(db)
}

/// Returns the name stored at `position` after a catalog key's space byte.
fn name_at(key: &[u8], position: usize) -> Result<String> {
    let values = decode_key(key.get(1..).unwrap_or_default())?;
    values
        .get(position)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| Error::malformed(0, "catalog key without a name"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_invalid() {
        let env = Environment::new();
        assert!(!env.is_valid());
        assert!(env.path().is_none());
        assert!(matches!(
            env.begin_transaction(TxnMode::ReadOnly),
            Err(Error::DbNotValid)
        ));
        assert_eq!(env.table_names(), Err(Error::DbNotValid));
    }

    #[test]
    fn test_init_and_close() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("env.redb");
        let mut env = Environment::new();
        let result = env.init(&path, EnvConfig::default());
        assert!(result.is_ok());
        assert!(env.is_valid());
        assert_eq!(env.path(), Some(path.as_path()));
        assert!(env.table_names().unwrap().is_empty());

        env.close();
        assert!(!env.is_valid());
    }

    #[test]
    fn test_init_missing_without_create() {
        let dir = tempfile::tempdir().unwrap();
        let mut env = Environment::new();
        let result = env.init(
            dir.path().join("missing.redb"),
            EnvConfig::default().create_if_missing(false),
        );
        assert!(result.is_err());
        assert!(!env.is_valid());
    }

    #[test]
    fn test_read_only_refuses_writer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ro.redb");
        drop(Environment::open(&path, EnvConfig::default()).unwrap());

        let env = Environment::open(&path, EnvConfig::default().read_only(true)).unwrap();
        assert!(matches!(
            env.begin_transaction(TxnMode::ReadWrite),
            Err(Error::ReadOnlyTransaction)
        ));
        assert!(env.begin_transaction(TxnMode::ReadOnly).is_ok());
    }

    #[test]
    fn test_name_at() {
        let key = keys::index_meta("users", "by_name").unwrap();
        assert_eq!(name_at(&key, 0).unwrap(), "users");
        assert_eq!(name_at(&key, 1).unwrap(), "by_name");
        assert!(name_at(&key, 2).is_err());
        assert!(name_at(&[], 0).is_err());
    }
}
