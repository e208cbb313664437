//! In-memory repository.

use std::collections::BTreeMap;

use tokio::sync::RwLock;

use crate::{Record, Repository, StoreError};

/// A [`Repository`] backed by a `BTreeMap` behind a Tokio `RwLock`.
///
/// Reads take the shared lock; saves and deletes take the exclusive one,
/// so each individual call is atomic. Nothing spans calls: sequencing
/// several calls is the caller's job.
pub struct MemoryRepository<R: Record> {
    records: RwLock<BTreeMap<R::Id, R>>,
}

impl<R: Record> MemoryRepository<R> {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl<R: Record> Default for MemoryRepository<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> Repository<R> for MemoryRepository<R> {
    async fn find(&self, id: &R::Id) -> Result<Option<R>, StoreError> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<R>, StoreError> {
        Ok(self.records.read().await.values().cloned().collect())
    }

    async fn find_by<F>(&self, predicate: F) -> Result<Vec<R>, StoreError>
    where
        F: Fn(&R) -> bool + Send,
    {
        let records = self.records.read().await;
        Ok(records.values().filter(|r| predicate(r)).cloned().collect())
    }

    async fn save(&self, record: R) -> Result<R, StoreError> {
        let mut records = self.records.write().await;
        check_unique(&records, &record)?;
        records.insert(record.id(), record.clone());
        Ok(record)
    }

    async fn modify<F, E>(&self, id: &R::Id, edit: F) -> Result<Option<R>, E>
    where
        F: FnOnce(&mut R) -> Result<(), E> + Send,
        E: From<StoreError> + Send,
    {
        let mut records = self.records.write().await;
        let Some(current) = records.get(id) else {
            return Ok(None);
        };

        let mut edited = current.clone();
        edit(&mut edited)?;
        check_unique(&records, &edited)?;

        records.insert(id.clone(), edited.clone());
        Ok(Some(edited))
    }

    async fn delete(&self, id: &R::Id) -> Result<bool, StoreError> {
        Ok(self.records.write().await.remove(id).is_some())
    }

    async fn delete_if<F, E>(&self, id: &R::Id, check: F) -> Result<Option<R>, E>
    where
        F: FnOnce(&R) -> Result<(), E> + Send,
        E: From<StoreError> + Send,
    {
        let mut records = self.records.write().await;
        let Some(current) = records.get(id) else {
            return Ok(None);
        };
        check(current)?;
        Ok(records.remove(id))
    }

    async fn delete_by<F>(&self, predicate: F) -> Result<usize, StoreError>
    where
        F: Fn(&R) -> bool + Send,
    {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, r| !predicate(r));
        Ok(before - records.len())
    }
}

/// Fails if another record already holds `record`'s unique key.
fn check_unique<R: Record>(records: &BTreeMap<R::Id, R>, record: &R) -> Result<(), StoreError> {
    let Some(key) = record.unique_key() else {
        return Ok(());
    };
    let id = record.id();
    let taken = records
        .values()
        .any(|other| other.id() != id && other.unique_key().as_ref() == Some(&key));
    if taken {
        tracing::debug!(collection = R::COLLECTION, %key, "unique key conflict");
        return Err(StoreError::Conflict {
            collection: R::COLLECTION,
            key,
        });
    }
    Ok(())
}
