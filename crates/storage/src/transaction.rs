//! Scoped transactions over the default namespace.
//!
//! A `Transaction` borrows its [`Environment`](crate::Environment) and is
//! consumed by `commit` or `abort`. Dropping an active write transaction
//! aborts it.

use crate::checked::CheckedResult;
use crate::config::TxnMode;
use crate::keys::{self, NAMESPACE};
use core::marker::PhantomData;
use core::sync::atomic::{AtomicU64, Ordering};
use redb::{ReadTransaction, ReadableTable, WriteTransaction};
use sqlkv_codec::{decode, encode_to_vec, prefix_successor};
use sqlkv_core::schema::Index;
use sqlkv_core::{Error, Result, Value};
use tracing::{debug, warn};

/// Global transaction ID counter.
static NEXT_TX_ID: AtomicU64 = AtomicU64::new(1);

/// Transaction ID type.
pub type TransactionId = u64;

type Entry = (Vec<u8>, Vec<u8>);

enum Inner {
    Read(ReadTransaction),
    Write(WriteTransaction),
}

/// A unit of work against the store.
pub struct Transaction<'env> {
    id: TransactionId,
    inner: Option<Inner>,
    _env: PhantomData<&'env ()>,
}

impl<'env> Transaction<'env> {
    pub(crate) fn read(txn: ReadTransaction) -> Self {
        Self::begin(Inner::Read(txn))
    }

    pub(crate) fn write(txn: WriteTransaction) -> Self {
        Self::begin(Inner::Write(txn))
    }

    fn begin(inner: Inner) -> Self {
        let id = NEXT_TX_ID.fetch_add(1, Ordering::SeqCst);
        debug!(tx = id, read_only = matches!(inner, Inner::Read(_)), "begin transaction");
        Self {
            id,
            inner: Some(inner),
            _env: PhantomData,
        }
    }

    /// Returns the transaction ID.
    pub fn id(&self) -> TransactionId {
        self.id
    }

    /// Returns the access mode.
    pub fn mode(&self) -> TxnMode {
        match self.inner {
            Some(Inner::Write(_)) => TxnMode::ReadWrite,
            _ => TxnMode::ReadOnly,
        }
    }

    fn inner(&self) -> Result<&Inner> {
        self.inner
            .as_ref()
            .ok_or_else(|| Error::store("transaction already finished"))
    }

    fn writer(&self) -> Result<&WriteTransaction> {
        match self.inner()? {
            Inner::Write(txn) => Ok(txn),
            Inner::Read(_) => Err(Error::ReadOnlyTransaction),
        }
    }

    /// Reads the value stored under `key`.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        match self.inner()? {
            Inner::Read(txn) => get_in(&txn.open_table(NAMESPACE).map_err(Error::store)?, key),
            Inner::Write(txn) => get_in(&txn.open_table(NAMESPACE).map_err(Error::store)?, key),
        }
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        let mut table = self.writer()?.open_table(NAMESPACE).map_err(Error::store)?;
        table.insert(key, value).map_err(Error::store)?;
        Ok(())
    }

    /// Removes `key`, returning whether it was present.
    pub fn delete(&mut self, key: &[u8]) -> Result<bool> {
        let mut table = self.writer()?.open_table(NAMESPACE).map_err(Error::store)?;
        let removed = table.remove(key).map_err(Error::store)?;
        Ok(removed.is_some())
    }

    /// Returns every entry whose key starts with `prefix`, in key order.
    pub fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        match self.inner()? {
            Inner::Read(txn) => scan_in(&txn.open_table(NAMESPACE).map_err(Error::store)?, prefix),
            Inner::Write(txn) => scan_in(&txn.open_table(NAMESPACE).map_err(Error::store)?, prefix),
        }
    }

    /// Hands out the next AutoInt key for `table`. Sequences start at 1.
    pub fn next_auto_int(&mut self, table: &str) -> Result<i64> {
        let key = keys::sequence(table)?;
        let next = match self.get(&key)? {
            Some(bytes) => decode(&bytes)?
                .as_int()
                .ok_or_else(|| Error::malformed(0, "sequence value is not an int"))?,
            None => 1,
        };
        let after = next
            .checked_add(1)
            .ok_or_else(|| Error::overflow(format!("AutoInt sequence of {} exhausted", table)))?;
        self.put(&key, &encode_to_vec(&Value::Int(after))?)?;
        Ok(next)
    }

    /// Maps the index columns `values` to the row key `pk`.
    ///
    /// A unique index refuses an entry already held by a different row key.
    pub fn put_index_entry(&mut self, index: &Index, values: &[Value], pk: &Value) -> Result<()> {
        check_arity(index, values)?;
        let pk_bytes = encode_to_vec(pk)?;
        let key = if index.is_unique() {
            let key = keys::unique_entry(index.table_name(), index.name(), values)?;
            if let Some(existing) = self.get(&key)? {
                if decode(&existing)? != *pk {
                    return Err(Error::unique_violation(index.table_name(), index.name()));
                }
            }
            key
        } else {
            keys::plain_entry(index.table_name(), index.name(), values, pk)?
        };
        self.put(&key, &pk_bytes)
    }

    /// Removes the entry mapping `values` to `pk`, returning whether it existed.
    pub fn delete_index_entry(&mut self, index: &Index, values: &[Value], pk: &Value) -> Result<bool> {
        check_arity(index, values)?;
        if index.is_unique() {
            let key = keys::unique_entry(index.table_name(), index.name(), values)?;
            match self.get(&key)? {
                Some(existing) if decode(&existing)? == *pk => self.delete(&key),
                _ => Ok(false),
            }
        } else {
            let key = keys::plain_entry(index.table_name(), index.name(), values, pk)?;
            self.delete(&key)
        }
    }

    /// Returns the row key a unique index holds for `values`.
    pub fn lookup_unique(&self, index: &Index, values: &[Value]) -> Result<Option<Value>> {
        if !index.is_unique() {
            return Err(Error::invalid_schema(format!(
                "index {} is not unique",
                index.name()
            )));
        }
        check_arity(index, values)?;
        let key = keys::unique_entry(index.table_name(), index.name(), values)?;
        self.get(&key)?.map(|bytes| decode(&bytes)).transpose()
    }

    /// Returns the row keys whose leading index columns equal `values`,
    /// in index order.
    pub fn index_scan(&self, index: &Index, values: &[Value]) -> Result<Vec<Value>> {
        let arity = index.columns().len();
        if values.len() > arity {
            return Err(Error::index_arity(index.name(), arity, values.len()));
        }
        if index.is_unique() && values.len() == arity {
            return Ok(self.lookup_unique(index, values)?.into_iter().collect());
        }
        let prefix = keys::plain_entry_prefix(index.table_name(), index.name(), values)?;
        self.scan_prefix(&prefix)?
            .into_iter()
            .map(|(_, pk)| decode(&pk))
            .collect()
    }

    /// Makes every write visible atomically.
    pub fn commit(mut self) -> CheckedResult {
        let outcome = match self.inner.take() {
            Some(Inner::Write(txn)) => txn.commit().map_err(Error::store),
            Some(Inner::Read(_)) | None => Ok(()),
        };
        match &outcome {
            Ok(()) => debug!(tx = self.id, "commit"),
            Err(err) => warn!(tx = self.id, error = %err, "commit failed"),
        }
        CheckedResult::new(outcome)
    }

    /// Discards every write.
    pub fn abort(mut self) -> CheckedResult {
        let outcome = match self.inner.take() {
            Some(Inner::Write(txn)) => txn.abort().map_err(Error::store),
            Some(Inner::Read(_)) | None => Ok(()),
        };
        debug!(tx = self.id, "abort");
        CheckedResult::new(outcome)
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if let Some(Inner::Write(txn)) = self.inner.take() {
            debug!(tx = self.id, "aborting dropped transaction");
            if let Err(err) = txn.abort() {
                warn!(tx = self.id, error = %err, "abort of dropped transaction failed");
            }
        }
    }
}

impl core::fmt::Debug for Transaction<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Transaction")
            .field("id", &self.id)
            .field("mode", &self.mode())
            .finish()
    }
}

fn check_arity(index: &Index, values: &[Value]) -> Result<()> {
    let expected = index.columns().len();
    if values.len() != expected {
        return Err(Error::index_arity(index.name(), expected, values.len()));
    }
    Ok(())
}

fn get_in<T>(table: &T, key: &[u8]) -> Result<Option<Vec<u8>>>
where
    T: ReadableTable<&'static [u8], &'static [u8]>,
{
    let guard = table.get(key).map_err(Error::store)?;
    Ok(guard.map(|value| value.value().to_vec()))
}

fn scan_in<T>(table: &T, prefix: &[u8]) -> Result<Vec<Entry>>
where
    T: ReadableTable<&'static [u8], &'static [u8]>,
{
    let end = prefix_successor(prefix);
    let range = match &end {
        Some(end) => table.range::<&[u8]>(prefix..end.as_slice()),
        None => table.range::<&[u8]>(prefix..),
    }
    .map_err(Error::store)?;
    range
        .map(|entry| {
            let (key, value) = entry.map_err(Error::store)?;
            Ok((key.value().to_vec(), value.value().to_vec()))
        })
        .collect()
}
