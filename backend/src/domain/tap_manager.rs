//! Pub tap list rules and writes.

use std::sync::Arc;

use super::entity::{Entity, EntityKind};
use super::ids::{BeerId, PubId};
use super::ports::EntityStore;
use super::pubs::{Pub, PubRelation};
use super::relationship_error::{EntityRef, RelationKind, RelationshipError, store_failure};

/// Enforces tap capacity and duplicate-free tap lists.
pub struct TapManager<P: ?Sized> {
    pubs: Arc<P>,
}

impl<P: ?Sized> Clone for TapManager<P> {
    fn clone(&self) -> Self {
        Self {
            pubs: Arc::clone(&self.pubs),
        }
    }
}

impl<P: ?Sized> TapManager<P>
where
    P: EntityStore<Pub>,
{
    /// Manager writing tap lists through `pubs`.
    pub fn new(pubs: Arc<P>) -> Self {
        Self { pubs }
    }

    /// Validate adding `beer_id` to a loaded pub.
    ///
    /// Duplicates are reported before capacity so a full pub asked to add a
    /// beer it already serves answers "already on tap".
    pub fn check_add(pub_: &Pub, beer_id: BeerId) -> Result<(), RelationshipError> {
        if pub_.is_on_tap(beer_id) {
            return Err(RelationshipError::Duplicate {
                relation: RelationKind::Tap,
                primary: EntityRef::new(EntityKind::Pub, pub_.id),
                related: EntityRef::new(EntityKind::Beer, beer_id),
            });
        }
        if pub_.is_full() {
            return Err(RelationshipError::CapacityExceeded {
                pub_id: pub_.id,
                taps: pub_.taps,
                on_tap: pub_.beers.len(),
            });
        }
        Ok(())
    }

    /// Validate removing `beer_id` from a loaded pub. Capacity is not
    /// consulted, so over-capacity pubs can always shed beers.
    pub fn check_remove(pub_: &Pub, beer_id: BeerId) -> Result<(), RelationshipError> {
        if pub_.is_on_tap(beer_id) {
            Ok(())
        } else {
            Err(RelationshipError::Missing {
                relation: RelationKind::Tap,
                primary: EntityRef::new(EntityKind::Pub, pub_.id),
                related: EntityRef::new(EntityKind::Beer, beer_id),
            })
        }
    }

    /// Append `beer_id` to the pub's tap list.
    pub async fn put_on_tap(
        &self,
        pub_id: PubId,
        beer_id: BeerId,
    ) -> Result<Pub, RelationshipError> {
        let updated = self
            .pubs
            .push_relation(pub_id, PubRelation::OnTap(beer_id))
            .await
            .map_err(store_failure(Pub::KIND, RelationKind::Tap))?;
        written(updated, pub_id)
    }

    /// Remove `beer_id` from the pub's tap list.
    pub async fn take_off_tap(
        &self,
        pub_id: PubId,
        beer_id: BeerId,
    ) -> Result<Pub, RelationshipError> {
        let updated = self
            .pubs
            .pull_relation(pub_id, PubRelation::OnTap(beer_id))
            .await
            .map_err(store_failure(Pub::KIND, RelationKind::Tap))?;
        written(updated, pub_id)
    }
}

fn written(updated: Option<Pub>, pub_id: PubId) -> Result<Pub, RelationshipError> {
    updated.ok_or_else(|| RelationshipError::UpdateFailed {
        entity: EntityRef::new(EntityKind::Pub, pub_id),
        relation: RelationKind::Tap,
    })
}
