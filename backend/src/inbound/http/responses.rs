//! Response bodies shared by the catalogue and account handlers.
//!
//! Identifiers are rendered as UUID strings under `id`. Relation lists stay
//! as id lists on plain records; the detail views add resolved documents
//! alongside them.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::ports::{BeerDetails, PubDetails, UserProfile};
use crate::domain::{Beer, ImageDescriptor, Pub, User};

fn ids<I: ToString>(list: &[I]) -> Vec<String> {
    list.iter().map(ToString::to_string).collect()
}

/// Uploaded image metadata.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageResponse {
    #[schema(example = "/images/0d4c3b1e-6a7f-4a53-9c44-2b61a7b4b0a9.png")]
    pub url: String,
    pub public_id: String,
    pub size: u64,
    #[schema(example = "png")]
    pub format: String,
}

impl From<ImageDescriptor> for ImageResponse {
    fn from(value: ImageDescriptor) -> Self {
        Self {
            url: value.url,
            public_id: value.public_id,
            size: value.size,
            format: value.format,
        }
    }
}

/// A beer as stored.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BeerResponse {
    pub id: String,
    #[schema(example = "Estrella Galicia")]
    pub name: String,
    pub brewer: String,
    pub style: String,
    #[schema(example = "5.5%")]
    pub alcohol: String,
    pub image: ImageResponse,
    pub author: String,
    /// Pubs with this beer on tap.
    pub pubs: Vec<String>,
    /// Users who have tasted this beer.
    pub tasted_by: Vec<String>,
}

impl From<Beer> for BeerResponse {
    fn from(value: Beer) -> Self {
        Self {
            id: value.id.to_string(),
            pubs: ids(&value.pubs),
            tasted_by: ids(&value.tasted_by),
            author: value.author.to_string(),
            image: value.image.into(),
            name: value.name,
            brewer: value.brewer,
            style: value.style,
            alcohol: value.alcohol,
        }
    }
}

/// A pub as stored.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PubResponse {
    pub id: String,
    #[schema(example = "La Taberna del Puerto")]
    pub name: String,
    pub logo: ImageResponse,
    pub address: String,
    pub owner: String,
    /// Tap capacity.
    pub taps: u32,
    /// Beers currently on tap.
    pub beers: Vec<String>,
}

impl From<Pub> for PubResponse {
    fn from(value: Pub) -> Self {
        Self {
            id: value.id.to_string(),
            beers: ids(&value.beers),
            logo: value.logo.into(),
            name: value.name,
            address: value.address,
            owner: value.owner,
            taps: value.taps,
        }
    }
}

/// A beer with the pubs serving it.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BeerDetailsResponse {
    #[serde(flatten)]
    pub beer: BeerResponse,
    pub served_at: Vec<PubResponse>,
}

impl From<BeerDetails> for BeerDetailsResponse {
    fn from(value: BeerDetails) -> Self {
        Self {
            beer: value.beer.into(),
            served_at: value.pubs.into_iter().map(Into::into).collect(),
        }
    }
}

/// A pub with its beers on tap.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PubDetailsResponse {
    #[serde(flatten)]
    pub pub_: PubResponse,
    pub on_tap: Vec<BeerResponse>,
}

impl From<PubDetails> for PubDetailsResponse {
    fn from(value: PubDetails) -> Self {
        Self {
            pub_: value.pub_.into(),
            on_tap: value.beers.into_iter().map(Into::into).collect(),
        }
    }
}

/// A user without credentials.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub surname: String,
    pub age: u8,
    pub username: String,
    pub email: String,
    #[schema(example = "user")]
    pub role: String,
    /// Beers this user has tasted.
    pub tasted: Vec<String>,
    /// Pubs this user has visited.
    pub visited: Vec<String>,
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        Self {
            id: value.id.to_string(),
            role: value.role.to_string(),
            tasted: ids(&value.tasted),
            visited: ids(&value.visited),
            name: value.name,
            surname: value.surname,
            age: value.age,
            username: value.username,
            email: value.email,
        }
    }
}

/// The caller's account with resolved history.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub tasted_beers: Vec<BeerResponse>,
    pub visited_pubs: Vec<PubResponse>,
}

impl From<UserProfile> for ProfileResponse {
    fn from(value: UserProfile) -> Self {
        Self {
            user: value.user.into(),
            tasted_beers: value.tasted.into_iter().map(Into::into).collect(),
            visited_pubs: value.visited.into_iter().map(Into::into).collect(),
        }
    }
}
