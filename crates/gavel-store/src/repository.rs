//! The [`Repository`] trait.

use std::future::Future;

use crate::{Record, StoreError};

/// Find/list/save/delete for one record type.
///
/// Methods return `impl Future + Send` (rather than being `async fn`) so
/// generic callers can hold the futures across `tokio::spawn`.
pub trait Repository<R: Record>: Send + Sync + 'static {
    /// Looks a record up by id.
    fn find(&self, id: &R::Id) -> impl Future<Output = Result<Option<R>, StoreError>> + Send;

    /// Every record, in id order.
    fn find_all(&self) -> impl Future<Output = Result<Vec<R>, StoreError>> + Send;

    /// Every record matching `predicate`, in id order.
    fn find_by<F>(&self, predicate: F) -> impl Future<Output = Result<Vec<R>, StoreError>> + Send
    where
        F: Fn(&R) -> bool + Send;

    /// Inserts or replaces the record with the same id.
    ///
    /// # Errors
    /// [`StoreError::Conflict`] if another record already holds the same
    /// [`unique_key`](Record::unique_key).
    fn save(&self, record: R) -> impl Future<Output = Result<R, StoreError>> + Send;

    /// Edits a record in place, atomically with respect to other calls.
    ///
    /// `edit` runs on the current copy under the write lock; if it fails,
    /// nothing is written and its error is returned. `Ok(None)` means no
    /// record has this id.
    ///
    /// # Errors
    /// Whatever `edit` returns, or [`StoreError::Conflict`] if the edit
    /// would give the record a taken unique key.
    fn modify<F, E>(
        &self,
        id: &R::Id,
        edit: F,
    ) -> impl Future<Output = Result<Option<R>, E>> + Send
    where
        F: FnOnce(&mut R) -> Result<(), E> + Send,
        E: From<StoreError> + Send;

    /// Removes a record. Returns `false` if there was nothing to remove.
    fn delete(&self, id: &R::Id) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Removes a record if `check` accepts it, atomically with respect to
    /// other calls. Returns the removed record, or `Ok(None)` if no record
    /// has this id.
    ///
    /// # Errors
    /// Whatever `check` returns; the record stays in that case.
    fn delete_if<F, E>(
        &self,
        id: &R::Id,
        check: F,
    ) -> impl Future<Output = Result<Option<R>, E>> + Send
    where
        F: FnOnce(&R) -> Result<(), E> + Send,
        E: From<StoreError> + Send;

    /// Removes every record matching `predicate`. Returns how many went.
    fn delete_by<F>(&self, predicate: F) -> impl Future<Output = Result<usize, StoreError>> + Send
    where
        F: Fn(&R) -> bool + Send;
}
