//! Driving ports for browsing and curating beers and pubs.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::domain::{Beer, BeerId, Error, Pub, PubId, UserId};

/// Request to add a beer to the catalogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBeer {
    pub name: String,
    pub brewer: String,
    pub style: String,
    pub alcohol: String,
    /// Server-side path of the staged label image.
    pub image_path: PathBuf,
}

/// Request to add a pub to the catalogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPub {
    pub name: String,
    pub address: String,
    pub owner: String,
    pub taps: u32,
    /// Server-side path of the staged logo.
    pub logo_path: PathBuf,
}

/// A beer with the pubs serving it resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeerDetails {
    pub beer: Beer,
    pub pubs: Vec<Pub>,
}

/// A pub with its tap list resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PubDetails {
    pub pub_: Pub,
    pub beers: Vec<Beer>,
}

/// Catalogue writes. Callers enforce the admin role before calling.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogueCommand: Send + Sync {
    /// Upload the label and create the beer, authored by `author`.
    async fn create_beer(&self, author: UserId, request: NewBeer) -> Result<Beer, Error>;

    /// Upload the logo and create the pub with an empty tap list.
    async fn create_pub(&self, request: NewPub) -> Result<Pub, Error>;

    /// Delete a beer. References held by pubs and users are left in place
    /// and skipped when read.
    async fn delete_beer(&self, beer_id: BeerId) -> Result<Beer, Error>;

    async fn delete_pub(&self, pub_id: PubId) -> Result<Pub, Error>;
}

/// Catalogue reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogueQuery: Send + Sync {
    async fn list_beers(&self) -> Result<Vec<Beer>, Error>;

    async fn get_beer(&self, beer_id: BeerId) -> Result<BeerDetails, Error>;

    async fn list_pubs(&self) -> Result<Vec<Pub>, Error>;

    async fn get_pub(&self, pub_id: PubId) -> Result<PubDetails, Error>;
}
