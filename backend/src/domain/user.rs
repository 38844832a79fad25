//! User documents, roles and stored password hashes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityKind, UniqueKey, pull_all};
use super::ids::{BeerId, PubId, UserId};

/// Access level granted to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a stored or submitted role is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role `{}`", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            _ => Err(UnknownRole(s.to_owned())),
        }
    }
}

/// Encoded password hash as produced by a password hasher.
///
/// The encoded form is opaque to the domain. `Debug` output is redacted so
/// hashes never reach logs.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

/// A registered user.
///
/// `tasted` and `visited` are the user's history lists. Neither holds
/// duplicates. `tasted` is mirrored by `Beer::tasted_by`; `visited` has no
/// back reference on the pub side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub surname: String,
    pub age: u8,
    pub username: String,
    pub email: String,
    pub password_hash: PasswordHash,
    pub role: Role,
    pub tasted: Vec<BeerId>,
    pub visited: Vec<PubId>,
}

impl User {
    pub fn has_tasted(&self, beer_id: BeerId) -> bool {
        self.tasted.contains(&beer_id)
    }

    pub fn has_visited(&self, pub_id: PubId) -> bool {
        self.visited.contains(&pub_id)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDraft {
    pub name: String,
    pub surname: String,
    pub age: u8,
    pub username: String,
    pub email: String,
    pub password_hash: PasswordHash,
    pub role: Role,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub age: Option<u8>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<PasswordHash>,
    pub role: Option<Role>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserFilter {
    Email(String),
    Username(String),
    Role(Role),
    Tasted(BeerId),
    Visited(PubId),
}

/// History lists on a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRelation {
    Tasted(BeerId),
    Visited(PubId),
}

impl Entity for User {
    type Id = UserId;
    type Draft = UserDraft;
    type Patch = UserPatch;
    type Filter = UserFilter;
    type Relation = UserRelation;

    const KIND: EntityKind = EntityKind::User;

    fn id(&self) -> UserId {
        self.id
    }

    fn from_draft(id: UserId, draft: UserDraft) -> Self {
        Self {
            id,
            name: draft.name,
            surname: draft.surname,
            age: draft.age,
            username: draft.username,
            email: draft.email,
            password_hash: draft.password_hash,
            role: draft.role,
            tasted: Vec::new(),
            visited: Vec::new(),
        }
    }

    fn apply_patch(&mut self, patch: UserPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(surname) = patch.surname {
            self.surname = surname;
        }
        if let Some(age) = patch.age {
            self.age = age;
        }
        if let Some(username) = patch.username {
            self.username = username;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(password_hash) = patch.password_hash {
            self.password_hash = password_hash;
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
    }

    fn matches(&self, filter: &UserFilter) -> bool {
        match filter {
            UserFilter::Email(email) => &self.email == email,
            UserFilter::Username(username) => &self.username == username,
            UserFilter::Role(role) => &self.role == role,
            UserFilter::Tasted(beer_id) => self.has_tasted(*beer_id),
            UserFilter::Visited(pub_id) => self.has_visited(*pub_id),
        }
    }

    fn has_relation(&self, relation: UserRelation) -> bool {
        match relation {
            UserRelation::Tasted(beer_id) => self.has_tasted(beer_id),
            UserRelation::Visited(pub_id) => self.has_visited(pub_id),
        }
    }

    fn push_relation(&mut self, relation: UserRelation) {
        match relation {
            UserRelation::Tasted(beer_id) => self.tasted.push(beer_id),
            UserRelation::Visited(pub_id) => self.visited.push(pub_id),
        }
    }

    fn pull_relation(&mut self, relation: UserRelation) {
        match relation {
            UserRelation::Tasted(beer_id) => pull_all(&mut self.tasted, &beer_id),
            UserRelation::Visited(pub_id) => pull_all(&mut self.visited, &pub_id),
        }
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![
            UniqueKey::new("email", self.email.as_str()),
            UniqueKey::new("username", self.username.as_str()),
        ]
    }
}
