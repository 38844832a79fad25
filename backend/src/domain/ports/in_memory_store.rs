//! Process-local entity store.
//!
//! Serves as the store when no database is configured and backs the domain
//! service tests. Documents are kept in insertion order.

use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use tracing::debug;

use crate::domain::{Entity, EntityId};

use super::{EntityStore, StoreError};

/// In-memory [`EntityStore`] for a single entity type.
#[derive(Debug)]
pub struct InMemoryEntityStore<E: Entity> {
    documents: RwLock<Vec<E>>,
}

impl<E: Entity> Default for InMemoryEntityStore<E> {
    fn default() -> Self {
        Self {
            documents: RwLock::new(Vec::new()),
        }
    }
}

fn poisoned<T>(_: PoisonError<T>) -> StoreError {
    StoreError::query("in-memory store lock poisoned")
}

impl<E: Entity> InMemoryEntityStore<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing documents, bypassing unique-key checks.
    pub fn with_documents(documents: impl IntoIterator<Item = E>) -> Self {
        Self {
            documents: RwLock::new(documents.into_iter().collect()),
        }
    }

    fn mutate(
        &self,
        id: E::Id,
        apply: impl FnOnce(&mut E),
    ) -> Result<Option<E>, StoreError> {
        let mut documents = self.documents.write().map_err(poisoned)?;
        Ok(documents
            .iter_mut()
            .find(|doc| doc.id() == id)
            .map(|doc| {
                apply(doc);
                doc.clone()
            }))
    }

    fn ensure_unique(documents: &[E], candidate: &E) -> Result<(), StoreError> {
        let keys = candidate.unique_keys();
        let clash = documents
            .iter()
            .filter(|doc| doc.id() != candidate.id())
            .flat_map(Entity::unique_keys)
            .find(|existing| keys.contains(existing));
        match clash {
            Some(key) => Err(StoreError::conflict(format!(
                "{} with {} `{}` already exists",
                E::KIND,
                key.field,
                key.value
            ))),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl<E: Entity> EntityStore<E> for InMemoryEntityStore<E> {
    async fn get_by_id(&self, id: E::Id) -> Result<Option<E>, StoreError> {
        let documents = self.documents.read().map_err(poisoned)?;
        Ok(documents.iter().find(|doc| doc.id() == id).cloned())
    }

    async fn list(&self) -> Result<Vec<E>, StoreError> {
        let documents = self.documents.read().map_err(poisoned)?;
        Ok(documents.clone())
    }

    async fn create(&self, draft: E::Draft) -> Result<E, StoreError> {
        let document = E::from_draft(E::Id::random(), draft);
        let mut documents = self.documents.write().map_err(poisoned)?;
        Self::ensure_unique(&documents, &document)?;
        documents.push(document.clone());
        debug!(kind = %E::KIND, id = %document.id(), "document created");
        Ok(document)
    }

    async fn update_by_id(&self, id: E::Id, patch: E::Patch) -> Result<Option<E>, StoreError> {
        let mut documents = self.documents.write().map_err(poisoned)?;
        let Some(position) = documents.iter().position(|doc| doc.id() == id) else {
            return Ok(None);
        };
        let mut updated = documents
            .get(position)
            .cloned()
            .ok_or_else(|| StoreError::query("document vanished during update"))?;
        updated.apply_patch(patch);
        Self::ensure_unique(&documents, &updated)?;
        if let Some(slot) = documents.get_mut(position) {
            *slot = updated.clone();
        }
        Ok(Some(updated))
    }

    async fn delete_by_id(&self, id: E::Id) -> Result<Option<E>, StoreError> {
        let mut documents = self.documents.write().map_err(poisoned)?;
        let removed = documents
            .iter()
            .position(|doc| doc.id() == id)
            .map(|position| documents.remove(position));
        Ok(removed)
    }

    async fn find_by(&self, filter: E::Filter) -> Result<Vec<E>, StoreError> {
        let documents = self.documents.read().map_err(poisoned)?;
        Ok(documents
            .iter()
            .filter(|doc| doc.matches(&filter))
            .cloned()
            .collect())
    }

    async fn push_relation(
        &self,
        id: E::Id,
        relation: E::Relation,
    ) -> Result<Option<E>, StoreError> {
        debug!(kind = %E::KIND, %id, ?relation, "push relation");
        self.mutate(id, |doc| doc.push_relation(relation))
    }

    async fn pull_relation(
        &self,
        id: E::Id,
        relation: E::Relation,
    ) -> Result<Option<E>, StoreError> {
        debug!(kind = %E::KIND, %id, ?relation, "pull relation");
        self.mutate(id, |doc| doc.pull_relation(relation))
    }
}
