//! Diesel row structs and their conversions to domain documents.
//!
//! Rows are internal to the persistence layer. Read rows derive both
//! `Queryable` for the query builder and `QueryableByName` for the raw
//! relation updates that return `*`.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::ports::StoreError;
use crate::domain::{
    Beer, BeerDraft, BeerId, BeerPatch, EntityId, EntityKind, ImageDescriptor, PasswordHash, Pub,
    PubDraft, PubId, PubPatch, Role, User, UserDraft, UserId, UserPatch,
};

use super::diesel_error_mapping::corrupt_row;
use super::schema::{beers, pubs, users};

fn image_to_json(
    kind: EntityKind,
    image: &ImageDescriptor,
) -> Result<serde_json::Value, StoreError> {
    serde_json::to_value(image).map_err(|err| corrupt_row(kind, "image", err))
}

fn image_from_json(
    kind: EntityKind,
    column: &str,
    value: serde_json::Value,
) -> Result<ImageDescriptor, StoreError> {
    serde_json::from_value(value).map_err(|err| corrupt_row(kind, column, err))
}

fn ids<I: EntityId>(raw: Vec<Uuid>) -> Vec<I> {
    raw.into_iter().map(I::from_uuid).collect()
}

fn taps_column(taps: u32) -> Result<i32, StoreError> {
    i32::try_from(taps).map_err(|err| corrupt_row(EntityKind::Pub, "taps", err))
}

// ---------------------------------------------------------------------------
// Beers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, QueryableByName, Selectable)]
#[diesel(table_name = beers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BeerRow {
    pub id: Uuid,
    pub name: String,
    pub brewer: String,
    pub style: String,
    pub alcohol: String,
    pub image: serde_json::Value,
    pub author: Uuid,
    pub pubs: Vec<Uuid>,
    pub tasted_by: Vec<Uuid>,
    #[expect(dead_code, reason = "ordering column, read for completeness")]
    pub created_at: DateTime<Utc>,
}

impl TryFrom<BeerRow> for Beer {
    type Error = StoreError;

    fn try_from(row: BeerRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: BeerId::from_uuid(row.id),
            name: row.name,
            brewer: row.brewer,
            style: row.style,
            alcohol: row.alcohol,
            image: image_from_json(EntityKind::Beer, "image", row.image)?,
            author: UserId::from_uuid(row.author),
            pubs: ids(row.pubs),
            tasted_by: ids(row.tasted_by),
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = beers)]
pub(crate) struct NewBeerRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub brewer: &'a str,
    pub style: &'a str,
    pub alcohol: &'a str,
    pub image: serde_json::Value,
    pub author: Uuid,
}

impl<'a> NewBeerRow<'a> {
    pub fn new(id: BeerId, draft: &'a BeerDraft) -> Result<Self, StoreError> {
        Ok(Self {
            id: *id.as_uuid(),
            name: &draft.name,
            brewer: &draft.brewer,
            style: &draft.style,
            alcohol: &draft.alcohol,
            image: image_to_json(EntityKind::Beer, &draft.image)?,
            author: *draft.author.as_uuid(),
        })
    }
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = beers)]
pub(crate) struct BeerChangeset<'a> {
    pub name: Option<&'a str>,
    pub brewer: Option<&'a str>,
    pub style: Option<&'a str>,
    pub alcohol: Option<&'a str>,
    pub image: Option<serde_json::Value>,
}

impl<'a> BeerChangeset<'a> {
    pub fn new(patch: &'a BeerPatch) -> Result<Self, StoreError> {
        Ok(Self {
            name: patch.name.as_deref(),
            brewer: patch.brewer.as_deref(),
            style: patch.style.as_deref(),
            alcohol: patch.alcohol.as_deref(),
            image: patch
                .image
                .as_ref()
                .map(|image| image_to_json(EntityKind::Beer, image))
                .transpose()?,
        })
    }

    /// Diesel refuses an `UPDATE` with no columns.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.brewer.is_none()
            && self.style.is_none()
            && self.alcohol.is_none()
            && self.image.is_none()
    }
}

// ---------------------------------------------------------------------------
// Pubs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, QueryableByName, Selectable)]
#[diesel(table_name = pubs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PubRow {
    pub id: Uuid,
    pub name: String,
    pub logo: serde_json::Value,
    pub address: String,
    pub owner: String,
    pub taps: i32,
    pub beers: Vec<Uuid>,
    #[expect(dead_code, reason = "ordering column, read for completeness")]
    pub created_at: DateTime<Utc>,
}

impl TryFrom<PubRow> for Pub {
    type Error = StoreError;

    fn try_from(row: PubRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: PubId::from_uuid(row.id),
            name: row.name,
            logo: image_from_json(EntityKind::Pub, "logo", row.logo)?,
            address: row.address,
            owner: row.owner,
            taps: u32::try_from(row.taps).map_err(|err| corrupt_row(EntityKind::Pub, "taps", err))?,
            beers: ids(row.beers),
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = pubs)]
pub(crate) struct NewPubRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub logo: serde_json::Value,
    pub address: &'a str,
    pub owner: &'a str,
    pub taps: i32,
}

impl<'a> NewPubRow<'a> {
    pub fn new(id: PubId, draft: &'a PubDraft) -> Result<Self, StoreError> {
        Ok(Self {
            id: *id.as_uuid(),
            name: &draft.name,
            logo: image_to_json(EntityKind::Pub, &draft.logo)?,
            address: &draft.address,
            owner: &draft.owner,
            taps: taps_column(draft.taps)?,
        })
    }
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = pubs)]
pub(crate) struct PubChangeset<'a> {
    pub name: Option<&'a str>,
    pub logo: Option<serde_json::Value>,
    pub address: Option<&'a str>,
    pub owner: Option<&'a str>,
    pub taps: Option<i32>,
}

impl<'a> PubChangeset<'a> {
    pub fn new(patch: &'a PubPatch) -> Result<Self, StoreError> {
        Ok(Self {
            name: patch.name.as_deref(),
            logo: patch
                .logo
                .as_ref()
                .map(|logo| image_to_json(EntityKind::Pub, logo))
                .transpose()?,
            address: patch.address.as_deref(),
            owner: patch.owner.as_deref(),
            taps: patch.taps.map(taps_column).transpose()?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.logo.is_none()
            && self.address.is_none()
            && self.owner.is_none()
            && self.taps.is_none()
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, QueryableByName, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub surname: String,
    pub age: i16,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub tasted: Vec<Uuid>,
    pub visited: Vec<Uuid>,
    #[expect(dead_code, reason = "ordering column, read for completeness")]
    pub created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: UserId::from_uuid(row.id),
            name: row.name,
            surname: row.surname,
            age: u8::try_from(row.age).map_err(|err| corrupt_row(EntityKind::User, "age", err))?,
            username: row.username,
            email: row.email,
            password_hash: PasswordHash::new(row.password_hash),
            role: row
                .role
                .parse::<Role>()
                .map_err(|err| corrupt_row(EntityKind::User, "role", err))?,
            tasted: ids(row.tasted),
            visited: ids(row.visited),
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub surname: &'a str,
    pub age: i16,
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: &'static str,
}

impl<'a> NewUserRow<'a> {
    pub fn new(id: UserId, draft: &'a UserDraft) -> Self {
        Self {
            id: *id.as_uuid(),
            name: &draft.name,
            surname: &draft.surname,
            age: i16::from(draft.age),
            username: &draft.username,
            email: &draft.email,
            password_hash: draft.password_hash.as_str(),
            role: draft.role.as_str(),
        }
    }
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserChangeset<'a> {
    pub name: Option<&'a str>,
    pub surname: Option<&'a str>,
    pub age: Option<i16>,
    pub username: Option<&'a str>,
    pub email: Option<&'a str>,
    pub password_hash: Option<&'a str>,
    pub role: Option<&'static str>,
}

impl<'a> From<&'a UserPatch> for UserChangeset<'a> {
    fn from(patch: &'a UserPatch) -> Self {
        Self {
            name: patch.name.as_deref(),
            surname: patch.surname.as_deref(),
            age: patch.age.map(i16::from),
            username: patch.username.as_deref(),
            email: patch.email.as_deref(),
            password_hash: patch.password_hash.as_ref().map(PasswordHash::as_str),
            role: patch.role.map(Role::as_str),
        }
    }
}

impl UserChangeset<'_> {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.surname.is_none()
            && self.age.is_none()
            && self.username.is_none()
            && self.email.is_none()
            && self.password_hash.is_none()
            && self.role.is_none()
    }
}
