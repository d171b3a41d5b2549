//! LMDB implementation of LockStore.
//!
//! Key format: `LockKey::to_bytes()` (kind tag byte ++ payload). Values are
//! the bincode-encoded `RequestLock`. LMDB allows a single writer per
//! environment, across processes, so check-and-insert inside one write
//! transaction is atomic.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};
use uuid::Uuid;

use bnms_store::{LockKey, LockStore, RequestLock, StoreError};

use crate::LmdbError;

pub struct LmdbLockStore {
    pub(crate) env: Arc<Env>,
    pub(crate) locks_db: Database<Bytes, Bytes>,
}

impl LockStore for LmdbLockStore {
    fn insert_if_absent(&self, lock: &RequestLock) -> Result<bool, StoreError> {
        let key = lock.key().to_bytes();
        let bytes = bincode::serialize(lock).map_err(LmdbError::from)?;
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let held = self
            .locks_db
            .get(&wtxn, &key)
            .map_err(LmdbError::from)?
            .is_some();
        if held {
            return Ok(false);
        }
        self.locks_db
            .put(&mut wtxn, &key, &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(true)
    }

    fn delete(&self, key: &LockKey) -> Result<bool, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let removed = self
            .locks_db
            .delete(&mut wtxn, &key.to_bytes())
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(removed)
    }

    fn delete_if_owned(&self, key: &LockKey, id: Uuid) -> Result<bool, StoreError> {
        let key = key.to_bytes();
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let owned = match self.locks_db.get(&wtxn, &key).map_err(LmdbError::from)? {
            Some(bytes) => {
                let held: RequestLock = bincode::deserialize(bytes).map_err(LmdbError::from)?;
                held.id == id
            }
            None => false,
        };
        if !owned {
            return Ok(false);
        }
        self.locks_db
            .delete(&mut wtxn, &key)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(true)
    }

    fn get(&self, key: &LockKey) -> Result<Option<RequestLock>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let val = self
            .locks_db
            .get(&rtxn, &key.to_bytes())
            .map_err(LmdbError::from)?;
        match val {
            Some(bytes) => {
                let lock: RequestLock = bincode::deserialize(bytes).map_err(LmdbError::from)?;
                Ok(Some(lock))
            }
            None => Ok(None),
        }
    }

    fn list(&self) -> Result<Vec<RequestLock>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let iter = self.locks_db.iter(&rtxn).map_err(LmdbError::from)?;
        let mut locks = Vec::new();
        for entry in iter {
            let (_key, val) = entry.map_err(LmdbError::from)?;
            let lock: RequestLock = bincode::deserialize(val).map_err(LmdbError::from)?;
            locks.push(lock);
        }
        Ok(locks)
    }
}
