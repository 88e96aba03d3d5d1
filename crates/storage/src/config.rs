//! Environment and transaction configuration.

use serde::{Deserialize, Serialize};

/// Initial size budget handed to the store when it is opened.
pub const DEFAULT_INITIAL_SIZE: usize = 10_485_760;

/// Options for opening an [`Environment`](crate::Environment).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    /// Initial size budget in bytes. Not a ceiling, the store grows.
    pub initial_size: usize,
    /// Create the store file when it does not exist.
    pub create_if_missing: bool,
    /// Refuse write transactions.
    pub read_only: bool,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            initial_size: DEFAULT_INITIAL_SIZE,
            create_if_missing: true,
            read_only: false,
        }
    }
}

impl EnvConfig {
    /// Sets the initial size budget.
    pub fn initial_size(mut self, bytes: usize) -> Self {
        self.initial_size = bytes;
        self
    }

    /// Sets whether a missing store is created.
    pub fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    /// Sets whether the environment is read-only.
    pub fn read_only(mut self, value: bool) -> Self {
        self.read_only = value;
        self
    }
}

/// Access mode of a transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TxnMode {
    /// The single writer.
    #[default]
    ReadWrite,
    /// A snapshot reader.
    ReadOnly,
}
