//! Beer documents.

use super::entity::{Entity, EntityKind, UniqueKey, pull_all};
use super::ids::{BeerId, PubId, UserId};
use super::image::ImageDescriptor;

/// A beer in the catalogue.
///
/// `pubs` lists the pubs currently serving the beer and mirrors
/// `Pub::beers`. `tasted_by` is the back reference of `User::tasted`.
/// Both lists are maintained by the relationship service; nothing else
/// writes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Beer {
    pub id: BeerId,
    pub name: String,
    pub brewer: String,
    pub style: String,
    /// Free-form strength, for example `"5.2%"`.
    pub alcohol: String,
    pub image: ImageDescriptor,
    pub author: UserId,
    pub pubs: Vec<PubId>,
    pub tasted_by: Vec<UserId>,
}

impl Beer {
    pub fn is_served_at(&self, pub_id: PubId) -> bool {
        self.pubs.contains(&pub_id)
    }

    pub fn is_tasted_by(&self, user_id: UserId) -> bool {
        self.tasted_by.contains(&user_id)
    }
}

/// Values required to create a beer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeerDraft {
    pub name: String,
    pub brewer: String,
    pub style: String,
    pub alcohol: String,
    pub image: ImageDescriptor,
    pub author: UserId,
}

/// Direct field updates. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BeerPatch {
    pub name: Option<String>,
    pub brewer: Option<String>,
    pub style: Option<String>,
    pub alcohol: Option<String>,
    pub image: Option<ImageDescriptor>,
}

/// Lookup keys supported by beer stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BeerFilter {
    Name(String),
    Brewer(String),
    Style(String),
    Author(UserId),
    ServedAt(PubId),
    TastedBy(UserId),
}

/// Identifier lists on a beer that relationship writes touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeerRelation {
    ServedAt(PubId),
    TastedBy(UserId),
}

impl Entity for Beer {
    type Id = BeerId;
    type Draft = BeerDraft;
    type Patch = BeerPatch;
    type Filter = BeerFilter;
    type Relation = BeerRelation;

    const KIND: EntityKind = EntityKind::Beer;

    fn id(&self) -> BeerId {
        self.id
    }

    fn from_draft(id: BeerId, draft: BeerDraft) -> Self {
        Self {
            id,
            name: draft.name,
            brewer: draft.brewer,
            style: draft.style,
            alcohol: draft.alcohol,
            image: draft.image,
            author: draft.author,
            pubs: Vec::new(),
            tasted_by: Vec::new(),
        }
    }

    fn apply_patch(&mut self, patch: BeerPatch) {
        let BeerPatch {
            name,
            brewer,
            style,
            alcohol,
            image,
        } = patch;
        if let Some(name) = name {
            self.name = name;
        }
        if let Some(brewer) = brewer {
            self.brewer = brewer;
        }
        if let Some(style) = style {
            self.style = style;
        }
        if let Some(alcohol) = alcohol {
            self.alcohol = alcohol;
        }
        if let Some(image) = image {
            self.image = image;
        }
    }

    fn matches(&self, filter: &BeerFilter) -> bool {
        match filter {
            BeerFilter::Name(name) => &self.name == name,
            BeerFilter::Brewer(brewer) => &self.brewer == brewer,
            BeerFilter::Style(style) => &self.style == style,
            BeerFilter::Author(author) => &self.author == author,
            BeerFilter::ServedAt(pub_id) => self.is_served_at(*pub_id),
            BeerFilter::TastedBy(user_id) => self.is_tasted_by(*user_id),
        }
    }

    fn has_relation(&self, relation: BeerRelation) -> bool {
        match relation {
            BeerRelation::ServedAt(pub_id) => self.is_served_at(pub_id),
            BeerRelation::TastedBy(user_id) => self.is_tasted_by(user_id),
        }
    }

    fn push_relation(&mut self, relation: BeerRelation) {
        match relation {
            BeerRelation::ServedAt(pub_id) => self.pubs.push(pub_id),
            BeerRelation::TastedBy(user_id) => self.tasted_by.push(user_id),
        }
    }

    fn pull_relation(&mut self, relation: BeerRelation) {
        match relation {
            BeerRelation::ServedAt(pub_id) => pull_all(&mut self.pubs, &pub_id),
            BeerRelation::TastedBy(user_id) => pull_all(&mut self.tasted_by, &user_id),
        }
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::new("name", self.name.as_str())]
    }
}
