//! User history rules and writes.

use std::sync::Arc;

use super::entity::{Entity, EntityKind};
use super::ids::UserId;
use super::ports::EntityStore;
use super::relationship_error::{EntityRef, RelationKind, RelationshipError, store_failure};
use super::user::{User, UserRelation};

/// Keeps a user's tasted-beer and visited-pub lists free of duplicates.
/// History lists have no capacity ceiling.
pub struct HistoryManager<U: ?Sized> {
    users: Arc<U>,
}

impl<U: ?Sized> Clone for HistoryManager<U> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
        }
    }
}

fn relation_kind(relation: UserRelation) -> RelationKind {
    match relation {
        UserRelation::Tasted(_) => RelationKind::Tasted,
        UserRelation::Visited(_) => RelationKind::Visited,
    }
}

fn related_ref(relation: UserRelation) -> EntityRef {
    match relation {
        UserRelation::Tasted(beer_id) => EntityRef::new(EntityKind::Beer, beer_id),
        UserRelation::Visited(pub_id) => EntityRef::new(EntityKind::Pub, pub_id),
    }
}

impl<U: ?Sized> HistoryManager<U>
where
    U: EntityStore<User>,
{
    /// Manager writing histories through `users`.
    pub fn new(users: Arc<U>) -> Self {
        Self { users }
    }

    /// Validate recording `relation` on a loaded user; a beer already
    /// tasted or a pub already visited is a duplicate.
    pub fn check_add(user: &User, relation: UserRelation) -> Result<(), RelationshipError> {
        if user.has_relation(relation) {
            return Err(RelationshipError::Duplicate {
                relation: relation_kind(relation),
                primary: EntityRef::new(EntityKind::User, user.id),
                related: related_ref(relation),
            });
        }
        Ok(())
    }

    /// Validate forgetting `relation`; it must be present in the history.
    pub fn check_remove(user: &User, relation: UserRelation) -> Result<(), RelationshipError> {
        if !user.has_relation(relation) {
            return Err(RelationshipError::Missing {
                relation: relation_kind(relation),
                primary: EntityRef::new(EntityKind::User, user.id),
                related: related_ref(relation),
            });
        }
        Ok(())
    }

    /// Append the related id to the user's history list.
    ///
    /// A user deleted since it was loaded yields `UpdateFailed`.
    pub async fn record(
        &self,
        user_id: UserId,
        relation: UserRelation,
    ) -> Result<User, RelationshipError> {
        let kind = relation_kind(relation);
        let updated = self
            .users
            .push_relation(user_id, relation)
            .await
            .map_err(store_failure(User::KIND, kind))?;
        written(updated, user_id, kind)
    }

    /// Remove the related id from the user's history list.
    pub async fn forget(
        &self,
        user_id: UserId,
        relation: UserRelation,
    ) -> Result<User, RelationshipError> {
        let kind = relation_kind(relation);
        let updated = self
            .users
            .pull_relation(user_id, relation)
            .await
            .map_err(store_failure(User::KIND, kind))?;
        written(updated, user_id, kind)
    }
}

fn written(
    updated: Option<User>,
    user_id: UserId,
    relation: RelationKind,
) -> Result<User, RelationshipError> {
    updated.ok_or_else(|| RelationshipError::UpdateFailed {
        entity: EntityRef::new(EntityKind::User, user_id),
        relation,
    })
}
