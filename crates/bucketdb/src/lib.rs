//! Ordered, bucketed key-value storage with update transactions.
//!
//! Every bucket is a redb table keyed and valued by raw bytes. Buckets are
//! created the first time a transaction asks for them, and all work happens
//! inside [`Database::update`], which commits when the closure returns `Ok`
//! and rolls back otherwise.

mod error;

use std::path::Path;
use std::sync::Arc;

use redb::{ReadableTable, TableDefinition, WriteTransaction};

pub use error::{Error, Result};

/// A `(key, value)` pair yielded by a prefix scan.
pub type Entry = (Vec<u8>, Vec<u8>);

/// Shared handle to a single database file.
///
/// Cloning is cheap; every clone talks to the same file. The engine allows
/// one write transaction at a time, so concurrent `update` calls queue up
/// behind each other.
#[derive(Clone)]
pub struct Database {
    inner: Arc<redb::Database>,
}

impl Database {
    /// Open the database at `path`, creating the file if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = redb::Database::create(path.as_ref())?;
        Ok(Self {
            inner: Arc::new(db),
        })
    }

    /// Run `f` inside one read-write transaction.
    ///
    /// If `f` returns `Err`, nothing it wrote is kept and the error is handed
    /// back unchanged.
    pub fn update<T, E, F>(&self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&Tx<'_>) -> std::result::Result<T, E>,
        E: From<Error>,
    {
        let txn = self.inner.begin_write().map_err(Error::from)?;
        let outcome = {
            let tx = Tx { txn: &txn };
            f(&tx)
        };
        match outcome {
            Ok(value) => {
                txn.commit().map_err(Error::from)?;
                Ok(value)
            }
            // dropping an uncommitted write transaction rolls it back
            Err(err) => Err(err),
        }
    }
}

/// An open read-write transaction.
pub struct Tx<'txn> {
    txn: &'txn WriteTransaction,
}

impl<'txn> Tx<'txn> {
    /// Open bucket `name`, creating it if it does not exist yet.
    ///
    /// A bucket may only be open once per transaction at a time.
    pub fn bucket(&self, name: &str) -> Result<Bucket<'txn>> {
        let definition: TableDefinition<&'static [u8], &'static [u8]> = TableDefinition::new(name);
        let table = self.txn.open_table(definition)?;
        Ok(Bucket { table })
    }
}

pub struct Bucket<'txn> {
    table: redb::Table<'txn, &'static [u8], &'static [u8]>,
}

impl Bucket<'_> {
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.table.get(key)?.map(|value| value.value().to_vec()))
    }

    pub fn contains(&self, key: &[u8]) -> Result<bool> {
        Ok(self.table.get(key)?.is_some())
    }

    pub fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.table.insert(key, value)?;
        Ok(())
    }

    /// Remove `key`. Returns whether it was present; removing a missing key
    /// is not an error.
    pub fn delete(&mut self, key: &[u8]) -> Result<bool> {
        Ok(self.table.remove(key)?.is_some())
    }

    /// Walk forward from `prefix` in ascending key order, stopping at the
    /// first key that does not start with `prefix`.
    pub fn scan_prefix<'a>(
        &'a self,
        prefix: &'a [u8],
    ) -> Result<impl Iterator<Item = Result<Entry>> + 'a> {
        let range = self.table.range(prefix..)?;
        Ok(range
            .map(|entry| {
                entry
                    .map(|(key, value)| (key.value().to_vec(), value.value().to_vec()))
                    .map_err(Error::from)
            })
            .take_while(move |entry| match entry {
                Ok((key, _)) => key.starts_with(prefix),
                Err(_) => true,
            }))
    }
}
