//! Pub documents and their tap list.

use super::entity::{Entity, EntityKind, UniqueKey, pull_all};
use super::ids::{BeerId, PubId};
use super::image::ImageDescriptor;

/// Largest tap count a pub may be created with; stores keep it as a signed
/// 32-bit integer.
pub const MAX_TAPS: u32 = i32::MAX.unsigned_abs();

/// A pub with a fixed number of taps.
///
/// ## Invariants
/// - `beers` holds no duplicate ids.
/// - Every state produced by adding a beer satisfies `beers.len() <= taps`.
///   Lowering `taps` directly may leave a pub over capacity; such a pub stays
///   readable and accepts removals but refuses additions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pub {
    pub id: PubId,
    pub name: String,
    pub logo: ImageDescriptor,
    pub address: String,
    /// Display name of the owner.
    pub owner: String,
    pub taps: u32,
    pub beers: Vec<BeerId>,
}

impl Pub {
    pub fn is_on_tap(&self, beer_id: BeerId) -> bool {
        self.beers.contains(&beer_id)
    }

    /// Whether every tap is taken (or more, after `taps` was lowered).
    ///
    /// # Examples
    /// ```
    /// use taplist::domain::{BeerId, EntityId, Pub, PubId};
    ///
    /// let mut pub_ = Pub {
    ///     id: PubId::random(),
    ///     name: "La Cueva".into(),
    ///     logo: Default::default(),
    ///     address: "Calle Mayor 1".into(),
    ///     owner: "Ana".into(),
    ///     taps: 1,
    ///     beers: Vec::new(),
    /// };
    /// assert!(!pub_.is_full());
    /// pub_.beers.push(BeerId::random());
    /// assert!(pub_.is_full());
    /// ```
    pub fn is_full(&self) -> bool {
        self.beers.len() >= self.taps_usize()
    }

    fn taps_usize(&self) -> usize {
        usize::try_from(self.taps).unwrap_or(usize::MAX)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PubDraft {
    pub name: String,
    pub logo: ImageDescriptor,
    pub address: String,
    pub owner: String,
    pub taps: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PubPatch {
    pub name: Option<String>,
    pub logo: Option<ImageDescriptor>,
    pub address: Option<String>,
    pub owner: Option<String>,
    pub taps: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PubFilter {
    Name(String),
    Owner(String),
    Serving(BeerId),
}

/// The tap list is the only relation list on a pub.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PubRelation {
    OnTap(BeerId),
}

impl Entity for Pub {
    type Id = PubId;
    type Draft = PubDraft;
    type Patch = PubPatch;
    type Filter = PubFilter;
    type Relation = PubRelation;

    const KIND: EntityKind = EntityKind::Pub;

    fn id(&self) -> PubId {
        self.id
    }

    fn from_draft(id: PubId, draft: PubDraft) -> Self {
        Self {
            id,
            name: draft.name,
            logo: draft.logo,
            address: draft.address,
            owner: draft.owner,
            taps: draft.taps,
            beers: Vec::new(),
        }
    }

    fn apply_patch(&mut self, patch: PubPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(logo) = patch.logo {
            self.logo = logo;
        }
        if let Some(address) = patch.address {
            self.address = address;
        }
        if let Some(owner) = patch.owner {
            self.owner = owner;
        }
        if let Some(taps) = patch.taps {
            self.taps = taps;
        }
    }

    fn matches(&self, filter: &PubFilter) -> bool {
        match filter {
            PubFilter::Name(name) => &self.name == name,
            PubFilter::Owner(owner) => &self.owner == owner,
            PubFilter::Serving(beer_id) => self.is_on_tap(*beer_id),
        }
    }

    fn has_relation(&self, relation: PubRelation) -> bool {
        let PubRelation::OnTap(beer_id) = relation;
        self.is_on_tap(beer_id)
    }

    fn push_relation(&mut self, relation: PubRelation) {
        let PubRelation::OnTap(beer_id) = relation;
        self.beers.push(beer_id);
    }

    fn pull_relation(&mut self, relation: PubRelation) {
        let PubRelation::OnTap(beer_id) = relation;
        pull_all(&mut self.beers, &beer_id);
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::new("name", self.name.as_str())]
    }
}
