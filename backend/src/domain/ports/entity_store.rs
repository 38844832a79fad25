//! Driven port for single-collection document stores.
//!
//! One store instance serves one entity type. Every operation touches a
//! single document; there are no multi-document transactions. Not-found is
//! signalled as `None`, never as an error.

use async_trait::async_trait;

use crate::domain::{Entity, Error};

use super::define_port_error;

define_port_error! {
    /// Failures raised by entity store adapters.
    pub enum StoreError {
        /// The backing store could not be reached.
        Connection { message: String } => "entity store connection failed: {message}",
        /// A query or mutation failed during execution.
        Query { message: String } => "entity store query failed: {message}",
        /// A write clashed with a unique key.
        Conflict { message: String } => "entity store conflict: {message}",
    }
}

/// Generic CRUD over one collection, returning full documents.
#[async_trait]
pub trait EntityStore<E: Entity>: Send + Sync {
    /// Fetch one document; `None` when no document has `id`.
    async fn get_by_id(&self, id: E::Id) -> Result<Option<E>, StoreError>;

    /// Every document in the collection, in creation order where the
    /// adapter can provide one.
    async fn list(&self) -> Result<Vec<E>, StoreError>;

    /// Insert a new document with a freshly assigned id.
    ///
    /// Fails with [`StoreError::Conflict`] when a unique key is taken.
    async fn create(&self, draft: E::Draft) -> Result<E, StoreError>;

    /// Apply direct field updates and return the updated document.
    async fn update_by_id(&self, id: E::Id, patch: E::Patch) -> Result<Option<E>, StoreError>;

    /// Delete a document and return it as it was before deletion.
    async fn delete_by_id(&self, id: E::Id) -> Result<Option<E>, StoreError>;

    /// Documents matching a unique-key filter, so at most one.
    async fn find_by(&self, filter: E::Filter) -> Result<Vec<E>, StoreError>;

    /// Append one identifier to a relation list and return the updated
    /// document. The append happens in place; the list is not read back and
    /// rewritten by the caller.
    async fn push_relation(&self, id: E::Id, relation: E::Relation)
    -> Result<Option<E>, StoreError>;

    /// Remove every occurrence of one identifier from a relation list and
    /// return the updated document.
    async fn pull_relation(&self, id: E::Id, relation: E::Relation)
    -> Result<Option<E>, StoreError>;
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Connection { message } => {
                Error::service_unavailable(format!("entity store unavailable: {message}"))
            }
            StoreError::Query { message } => {
                Error::internal(format!("entity store error: {message}"))
            }
            StoreError::Conflict { message } => Error::conflict(message),
        }
    }
}
