//! Back references held on beers: where a beer is served and who tasted it.

use std::sync::Arc;

use tracing::debug;

use super::beer::{Beer, BeerRelation};
use super::entity::{Entity, EntityKind};
use super::ports::EntityStore;
use super::relationship_error::{EntityRef, RelationKind, RelationshipError, store_failure};

/// Writes `Beer::pubs` and `Beer::tasted_by`.
///
/// Writes are skipped when the loaded beer is already in the desired state,
/// which keeps both lists free of duplicates.
pub struct BeerRelationships<B: ?Sized> {
    beers: Arc<B>,
}

impl<B: ?Sized> Clone for BeerRelationships<B> {
    fn clone(&self) -> Self {
        Self {
            beers: Arc::clone(&self.beers),
        }
    }
}

fn relation_kind(relation: BeerRelation) -> RelationKind {
    match relation {
        BeerRelation::ServedAt(_) => RelationKind::Tap,
        BeerRelation::TastedBy(_) => RelationKind::Tasted,
    }
}

impl<B: ?Sized> BeerRelationships<B>
where
    B: EntityStore<Beer>,
{
    pub fn new(beers: Arc<B>) -> Self {
        Self { beers }
    }

    /// Ensure `beer` carries `relation`.
    pub async fn link(
        &self,
        beer: &Beer,
        relation: BeerRelation,
    ) -> Result<Beer, RelationshipError> {
        if beer.has_relation(relation) {
            debug!(beer_id = %beer.id, ?relation, "back reference already present");
            return Ok(beer.clone());
        }
        let kind = relation_kind(relation);
        let updated = self
            .beers
            .push_relation(beer.id, relation)
            .await
            .map_err(store_failure(Beer::KIND, kind))?;
        written(updated, beer, kind)
    }

    /// Ensure `beer` no longer carries `relation`.
    pub async fn unlink(
        &self,
        beer: &Beer,
        relation: BeerRelation,
    ) -> Result<Beer, RelationshipError> {
        if !beer.has_relation(relation) {
            debug!(beer_id = %beer.id, ?relation, "back reference already absent");
            return Ok(beer.clone());
        }
        let kind = relation_kind(relation);
        let updated = self
            .beers
            .pull_relation(beer.id, relation)
            .await
            .map_err(store_failure(Beer::KIND, kind))?;
        written(updated, beer, kind)
    }
}

fn written(
    updated: Option<Beer>,
    beer: &Beer,
    relation: RelationKind,
) -> Result<Beer, RelationshipError> {
    updated.ok_or_else(|| RelationshipError::UpdateFailed {
        entity: EntityRef::new(EntityKind::Beer, beer.id),
        relation,
    })
}
