//! Catalogue service: creating, browsing and deleting beers and pubs.
//!
//! Relation lists are resolved to full documents only here, at read time.
//! Identifiers that no longer resolve are skipped.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::try_join_all;
use tracing::{info, warn};

use super::beer::{Beer, BeerDraft, BeerFilter};
use super::entity::Entity;
use super::error::Error;
use super::ids::{BeerId, PubId, UserId};
use super::ports::{
    BeerDetails, CatalogueCommand, CatalogueQuery, EntityStore, ImageStore, NewBeer, NewPub,
    PubDetails, StoreError,
};
use super::pubs::{MAX_TAPS, Pub, PubDraft, PubFilter};

/// Resolve `ids` against `store`, dropping ids with no document.
pub(crate) async fn resolve_references<E, S>(
    store: &S,
    ids: &[E::Id],
) -> Result<Vec<E>, StoreError>
where
    E: Entity,
    S: EntityStore<E> + ?Sized,
{
    let found = try_join_all(ids.iter().map(|id| store.get_by_id(*id))).await?;
    Ok(ids
        .iter()
        .zip(found)
        .filter_map(|(id, document)| {
            if document.is_none() {
                warn!(kind = %E::KIND, %id, "skipping dangling reference");
            }
            document
        })
        .collect())
}

fn require_text(field: &str, value: &str) -> Result<String, Error> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid_request(format!("{field} must not be empty"))
            .with_details(serde_json::json!({ "field": field, "code": "empty" })));
    }
    Ok(trimmed.to_owned())
}

fn require_tap_count(taps: u32) -> Result<u32, Error> {
    if taps > MAX_TAPS {
        return Err(
            Error::invalid_request(format!("taps must be at most {MAX_TAPS}"))
                .with_details(serde_json::json!({ "field": "taps", "code": "out_of_range" })),
        );
    }
    Ok(taps)
}

/// Implements the catalogue driving ports over the beer and pub stores.
pub struct CatalogueService<B: ?Sized, P: ?Sized, I: ?Sized> {
    beers: Arc<B>,
    pubs: Arc<P>,
    images: Arc<I>,
}

impl<B: ?Sized, P: ?Sized, I: ?Sized> Clone for CatalogueService<B, P, I> {
    fn clone(&self) -> Self {
        Self {
            beers: Arc::clone(&self.beers),
            pubs: Arc::clone(&self.pubs),
            images: Arc::clone(&self.images),
        }
    }
}

impl<B: ?Sized, P: ?Sized, I: ?Sized> CatalogueService<B, P, I>
where
    B: EntityStore<Beer>,
    P: EntityStore<Pub>,
    I: ImageStore,
{
    pub fn new(beers: Arc<B>, pubs: Arc<P>, images: Arc<I>) -> Self {
        Self {
            beers,
            pubs,
            images,
        }
    }

    /// Remove an uploaded image whose document could not be written.
    async fn discard_image(&self, public_id: &str) {
        if let Err(err) = self.images.delete_image(public_id).await {
            warn!(%public_id, error = %err, "failed to discard orphaned image");
        }
    }
}

#[async_trait]
impl<B: ?Sized, P: ?Sized, I: ?Sized> CatalogueCommand for CatalogueService<B, P, I>
where
    B: EntityStore<Beer> + 'static,
    P: EntityStore<Pub> + 'static,
    I: ImageStore + 'static,
{
    async fn create_beer(&self, author: UserId, request: NewBeer) -> Result<Beer, Error> {
        let name = require_text("name", &request.name)?;
        let brewer = require_text("brewer", &request.brewer)?;
        let style = require_text("style", &request.style)?;
        let alcohol = require_text("alcohol", &request.alcohol)?;

        let taken = self.beers.find_by(BeerFilter::Name(name.clone())).await?;
        if !taken.is_empty() {
            return Err(Error::conflict(format!("a beer named `{name}` already exists")));
        }

        let image = self.images.upload_image(&request.image_path).await?;
        let public_id = image.public_id.clone();
        let draft = BeerDraft {
            name,
            brewer,
            style,
            alcohol,
            image,
            author,
        };
        match self.beers.create(draft).await {
            Ok(beer) => {
                info!(beer_id = %beer.id, name = %beer.name, "beer created");
                Ok(beer)
            }
            Err(err) => {
                self.discard_image(&public_id).await;
                Err(err.into())
            }
        }
    }

    async fn create_pub(&self, request: NewPub) -> Result<Pub, Error> {
        let name = require_text("name", &request.name)?;
        let address = require_text("address", &request.address)?;
        let owner = require_text("owner", &request.owner)?;
        let taps = require_tap_count(request.taps)?;

        let taken = self.pubs.find_by(PubFilter::Name(name.clone())).await?;
        if !taken.is_empty() {
            return Err(Error::conflict(format!("a pub named `{name}` already exists")));
        }

        let logo = self.images.upload_image(&request.logo_path).await?;
        let public_id = logo.public_id.clone();
        let draft = PubDraft {
            name,
            logo,
            address,
            owner,
            taps,
        };
        match self.pubs.create(draft).await {
            Ok(pub_) => {
                info!(pub_id = %pub_.id, name = %pub_.name, taps = pub_.taps, "pub created");
                Ok(pub_)
            }
            Err(err) => {
                self.discard_image(&public_id).await;
                Err(err.into())
            }
        }
    }

    async fn delete_beer(&self, beer_id: BeerId) -> Result<Beer, Error> {
        let deleted = self
            .beers
            .delete_by_id(beer_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("beer {beer_id} not found")))?;
        info!(%beer_id, "beer deleted");
        self.discard_image(&deleted.image.public_id).await;
        Ok(deleted)
    }

    async fn delete_pub(&self, pub_id: PubId) -> Result<Pub, Error> {
        let deleted = self
            .pubs
            .delete_by_id(pub_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("pub {pub_id} not found")))?;
        info!(%pub_id, "pub deleted");
        self.discard_image(&deleted.logo.public_id).await;
        Ok(deleted)
    }
}

#[async_trait]
impl<B: ?Sized, P: ?Sized, I: ?Sized> CatalogueQuery for CatalogueService<B, P, I>
where
    B: EntityStore<Beer> + 'static,
    P: EntityStore<Pub> + 'static,
    I: ImageStore + 'static,
{
    async fn list_beers(&self) -> Result<Vec<Beer>, Error> {
        Ok(self.beers.list().await?)
    }

    async fn get_beer(&self, beer_id: BeerId) -> Result<BeerDetails, Error> {
        let beer = self
            .beers
            .get_by_id(beer_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("beer {beer_id} not found")))?;
        let pubs = resolve_references(self.pubs.as_ref(), &beer.pubs).await?;
        Ok(BeerDetails { beer, pubs })
    }

    async fn list_pubs(&self) -> Result<Vec<Pub>, Error> {
        Ok(self.pubs.list().await?)
    }

    async fn get_pub(&self, pub_id: PubId) -> Result<PubDetails, Error> {
        let pub_ = self
            .pubs
            .get_by_id(pub_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("pub {pub_id} not found")))?;
        let beers = resolve_references(self.beers.as_ref(), &pub_.beers).await?;
        Ok(PubDetails { pub_, beers })
    }
}

#[cfg(test)]
#[path = "catalogue_service_tests.rs"]
mod tests;
