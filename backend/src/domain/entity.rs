//! Shared shape of documents kept in an entity store.
//!
//! Each collection holds a single entity type. The associated types describe
//! what a caller may hand the store: a draft to create, a patch of direct
//! field updates, a typed lookup filter, and the relation values that can be
//! pushed onto or pulled from the entity's identifier lists.

use std::fmt;

use super::ids::EntityId;

/// Which collection an entity belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Beer,
    Pub,
    User,
}

impl EntityKind {
    /// Lowercase label used in messages and error detail codes.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Beer => "beer",
            Self::Pub => "pub",
            Self::User => "user",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field value that must be unique across one collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UniqueKey {
    pub field: &'static str,
    pub value: String,
}

impl UniqueKey {
    pub fn new(field: &'static str, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }
}

/// A document stored in an entity collection.
pub trait Entity: Clone + fmt::Debug + Send + Sync + 'static {
    type Id: EntityId;
    type Draft: fmt::Debug + Send + Sync + 'static;
    type Patch: fmt::Debug + Send + Sync + 'static;
    type Filter: fmt::Debug + Send + Sync + 'static;
    type Relation: Copy + PartialEq + fmt::Debug + Send + Sync + 'static;

    const KIND: EntityKind;

    fn id(&self) -> Self::Id;

    /// Build a new document from a draft and a freshly assigned id.
    fn from_draft(id: Self::Id, draft: Self::Draft) -> Self;

    fn apply_patch(&mut self, patch: Self::Patch);

    fn matches(&self, filter: &Self::Filter) -> bool;

    fn has_relation(&self, relation: Self::Relation) -> bool;

    /// Append the relation's identifier to its list.
    fn push_relation(&mut self, relation: Self::Relation);

    /// Remove every occurrence of the relation's identifier from its list.
    fn pull_relation(&mut self, relation: Self::Relation);

    fn unique_keys(&self) -> Vec<UniqueKey>;
}

/// Remove every occurrence of `id` from `list`.
pub(crate) fn pull_all<T: PartialEq>(list: &mut Vec<T>, id: &T) {
    list.retain(|existing| existing != id);
}
