//! Relationship orchestration across the beer, pub and user stores.
//!
//! Each operation loads both entities concurrently, validates in a fixed
//! order (primary exists, related exists, duplicate or missing, capacity),
//! and only then writes: the primary list first, the back reference second.
//! The stores offer no multi-document transaction. When the back reference
//! cannot be written the operation still succeeds, reporting
//! [`Consistency::Partial`] alongside the primary entity.
//!
//! There is no cross-operation locking. Two concurrent additions to the same
//! pub can both pass the capacity check and overfill it.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::join;
use tracing::{info, warn};

use super::beer::{Beer, BeerRelation};
use super::beer_relationships::BeerRelationships;
use super::entity::{Entity, EntityKind};
use super::history_manager::HistoryManager;
use super::ids::{BeerId, PubId, UserId};
use super::ports::{
    EntityStore, HistoryCommand, TapCommand, TapOutcome, TastedOutcome, VisitedOutcome,
};
use super::pubs::Pub;
use super::relationship_error::{
    Consistency, EntityRef, EntityRole, RelationKind, RelationshipError, RelationshipOutcome,
    store_failure,
};
use super::tap_manager::TapManager;
use super::user::{User, UserRelation};

/// Implements [`TapCommand`] and [`HistoryCommand`] over three entity stores.
pub struct RelationshipService<B: ?Sized, P: ?Sized, U: ?Sized> {
    beers: Arc<B>,
    pubs: Arc<P>,
    users: Arc<U>,
    taps: TapManager<P>,
    history: HistoryManager<U>,
    beer_links: BeerRelationships<B>,
}

impl<B: ?Sized, P: ?Sized, U: ?Sized> Clone for RelationshipService<B, P, U> {
    fn clone(&self) -> Self {
        Self {
            beers: Arc::clone(&self.beers),
            pubs: Arc::clone(&self.pubs),
            users: Arc::clone(&self.users),
            taps: self.taps.clone(),
            history: self.history.clone(),
            beer_links: self.beer_links.clone(),
        }
    }
}

impl<B: ?Sized, P: ?Sized, U: ?Sized> RelationshipService<B, P, U>
where
    B: EntityStore<Beer>,
    P: EntityStore<Pub>,
    U: EntityStore<User>,
{
    pub fn new(beers: Arc<B>, pubs: Arc<P>, users: Arc<U>) -> Self {
        Self {
            taps: TapManager::new(Arc::clone(&pubs)),
            history: HistoryManager::new(Arc::clone(&users)),
            beer_links: BeerRelationships::new(Arc::clone(&beers)),
            beers,
            pubs,
            users,
        }
    }
}

/// Load the primary and related entity concurrently.
///
/// Results are inspected primary first, so a missing primary is reported
/// even when the related entity is missing too.
async fn load_both<PE, RE, PS, RS>(
    primary_store: &PS,
    primary_id: PE::Id,
    related_store: &RS,
    related_id: RE::Id,
    relation: RelationKind,
) -> Result<(PE, RE), RelationshipError>
where
    PE: Entity,
    RE: Entity,
    PS: EntityStore<PE> + ?Sized,
    RS: EntityStore<RE> + ?Sized,
{
    let (primary, related) = join(
        primary_store.get_by_id(primary_id),
        related_store.get_by_id(related_id),
    )
    .await;

    let primary = primary
        .map_err(store_failure(PE::KIND, relation))?
        .ok_or_else(|| RelationshipError::NotFound {
            role: EntityRole::Primary,
            entity: EntityRef::new(PE::KIND, primary_id),
            relation,
        })?;
    let related = related
        .map_err(store_failure(RE::KIND, relation))?
        .ok_or_else(|| RelationshipError::NotFound {
            role: EntityRole::Related,
            entity: EntityRef::new(RE::KIND, related_id),
            relation,
        })?;
    Ok((primary, related))
}

/// Combine the primary write with the back reference result.
fn settle<PE, RE>(
    primary: PE,
    back_reference: Result<RE, RelationshipError>,
    entity: EntityRef,
) -> RelationshipOutcome<PE, RE> {
    match back_reference {
        Ok(related) => RelationshipOutcome {
            primary,
            related: Some(related),
            consistency: Consistency::Synchronized,
        },
        Err(err) => {
            warn!(
                entity = %entity,
                relation = %err.relation(),
                error = %err,
                "back reference not written; relationship left partially consistent"
            );
            RelationshipOutcome {
                primary,
                related: None,
                consistency: Consistency::Partial {
                    entity,
                    reason: err.to_string(),
                },
            }
        }
    }
}

#[async_trait]
impl<B: ?Sized, P: ?Sized, U: ?Sized> TapCommand for RelationshipService<B, P, U>
where
    B: EntityStore<Beer> + 'static,
    P: EntityStore<Pub> + 'static,
    U: EntityStore<User> + 'static,
{
    async fn add_beer_to_tap(
        &self,
        pub_id: PubId,
        beer_id: BeerId,
    ) -> Result<TapOutcome, RelationshipError> {
        let (pub_, beer): (Pub, Beer) = load_both(
            self.pubs.as_ref(),
            pub_id,
            self.beers.as_ref(),
            beer_id,
            RelationKind::Tap,
        )
        .await?;
        TapManager::<P>::check_add(&pub_, beer_id)?;

        let updated = self.taps.put_on_tap(pub_id, beer_id).await?;
        info!(%pub_id, %beer_id, on_tap = updated.beers.len(), "beer put on tap");

        let back_reference = self
            .beer_links
            .link(&beer, BeerRelation::ServedAt(pub_id))
            .await;
        Ok(settle(
            updated,
            back_reference,
            EntityRef::new(EntityKind::Beer, beer_id),
        ))
    }

    async fn remove_beer_from_tap(
        &self,
        pub_id: PubId,
        beer_id: BeerId,
    ) -> Result<TapOutcome, RelationshipError> {
        let (pub_, beer): (Pub, Beer) = load_both(
            self.pubs.as_ref(),
            pub_id,
            self.beers.as_ref(),
            beer_id,
            RelationKind::Tap,
        )
        .await?;
        TapManager::<P>::check_remove(&pub_, beer_id)?;

        let updated = self.taps.take_off_tap(pub_id, beer_id).await?;
        info!(%pub_id, %beer_id, on_tap = updated.beers.len(), "beer taken off tap");

        let back_reference = self
            .beer_links
            .unlink(&beer, BeerRelation::ServedAt(pub_id))
            .await;
        Ok(settle(
            updated,
            back_reference,
            EntityRef::new(EntityKind::Beer, beer_id),
        ))
    }
}

#[async_trait]
impl<B: ?Sized, P: ?Sized, U: ?Sized> HistoryCommand for RelationshipService<B, P, U>
where
    B: EntityStore<Beer> + 'static,
    P: EntityStore<Pub> + 'static,
    U: EntityStore<User> + 'static,
{
    async fn add_tasted_beer(
        &self,
        user_id: UserId,
        beer_id: BeerId,
    ) -> Result<TastedOutcome, RelationshipError> {
        let (user, beer): (User, Beer) = load_both(
            self.users.as_ref(),
            user_id,
            self.beers.as_ref(),
            beer_id,
            RelationKind::Tasted,
        )
        .await?;
        let relation = UserRelation::Tasted(beer_id);
        HistoryManager::<U>::check_add(&user, relation)?;

        let updated = self.history.record(user_id, relation).await?;
        info!(%user_id, %beer_id, "beer marked as tasted");

        let back_reference = self
            .beer_links
            .link(&beer, BeerRelation::TastedBy(user_id))
            .await;
        Ok(settle(
            updated,
            back_reference,
            EntityRef::new(EntityKind::Beer, beer_id),
        ))
    }

    async fn remove_tasted_beer(
        &self,
        user_id: UserId,
        beer_id: BeerId,
    ) -> Result<TastedOutcome, RelationshipError> {
        let (user, beer): (User, Beer) = load_both(
            self.users.as_ref(),
            user_id,
            self.beers.as_ref(),
            beer_id,
            RelationKind::Tasted,
        )
        .await?;
        let relation = UserRelation::Tasted(beer_id);
        HistoryManager::<U>::check_remove(&user, relation)?;

        let updated = self.history.forget(user_id, relation).await?;
        info!(%user_id, %beer_id, "beer removed from tasted");

        let back_reference = self
            .beer_links
            .unlink(&beer, BeerRelation::TastedBy(user_id))
            .await;
        Ok(settle(
            updated,
            back_reference,
            EntityRef::new(EntityKind::Beer, beer_id),
        ))
    }

    async fn add_visited_pub(
        &self,
        user_id: UserId,
        pub_id: PubId,
    ) -> Result<VisitedOutcome, RelationshipError> {
        let (user, _pub): (User, Pub) = load_both(
            self.users.as_ref(),
            user_id,
            self.pubs.as_ref(),
            pub_id,
            RelationKind::Visited,
        )
        .await?;
        let relation = UserRelation::Visited(pub_id);
        HistoryManager::<U>::check_add(&user, relation)?;

        let updated = self.history.record(user_id, relation).await?;
        info!(%user_id, %pub_id, "pub marked as visited");
        Ok(RelationshipOutcome {
            primary: updated,
            related: None,
            consistency: Consistency::Synchronized,
        })
    }

    async fn remove_visited_pub(
        &self,
        user_id: UserId,
        pub_id: PubId,
    ) -> Result<VisitedOutcome, RelationshipError> {
        let (user, _pub): (User, Pub) = load_both(
            self.users.as_ref(),
            user_id,
            self.pubs.as_ref(),
            pub_id,
            RelationKind::Visited,
        )
        .await?;
        let relation = UserRelation::Visited(pub_id);
        HistoryManager::<U>::check_remove(&user, relation)?;

        let updated = self.history.forget(user_id, relation).await?;
        info!(%user_id, %pub_id, "pub removed from visited");
        Ok(RelationshipOutcome {
            primary: updated,
            related: None,
            consistency: Consistency::Synchronized,
        })
    }
}

#[cfg(test)]
#[path = "relationship_service_tests.rs"]
mod tests;
