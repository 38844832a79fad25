//! Domain primitives, services and ports.
//!
//! Purpose: define the beer, pub and user documents, the rules that keep
//! their relation lists consistent, and the services that implement the
//! driving ports. Nothing here depends on actix, Diesel or OpenAPI tooling.
//!
//! Public surface:
//! - Error / ErrorCode: transport agnostic failure payload.
//! - Beer, Pub, User: stored documents and their drafts, patches, filters
//!   and relation values.
//! - RelationshipService: tap list and user history changes.
//! - CatalogueService, AccountService: catalogue curation and accounts.

pub mod account_service;
pub mod auth;
pub mod beer;
pub mod beer_relationships;
pub mod catalogue_service;
pub mod entity;
pub mod error;
pub mod history_manager;
pub mod ids;
pub mod image;
pub mod ports;
pub mod pubs;
pub mod relationship_error;
pub mod relationship_service;
pub mod tap_manager;
pub mod trace_id;
pub mod user;

pub use self::account_service::UserAccountService;
pub use self::auth::{
    LoginCredentials, LoginValidationError, Registration, RegistrationInput,
    RegistrationValidationError,
};
pub use self::beer::{Beer, BeerDraft, BeerFilter, BeerPatch, BeerRelation};
pub use self::beer_relationships::BeerRelationships;
pub use self::catalogue_service::CatalogueService;
pub use self::entity::{Entity, EntityKind, UniqueKey};
pub use self::error::{Error, ErrorCode, TRACE_ID_HEADER};
pub use self::history_manager::HistoryManager;
pub use self::ids::{BeerId, EntityId, IdValidationError, PubId, UserId};
pub use self::image::ImageDescriptor;
pub use self::pubs::{MAX_TAPS, Pub, PubDraft, PubFilter, PubPatch, PubRelation};
pub use self::relationship_error::{
    Consistency, EntityRef, EntityRole, RelationKind, RelationshipError, RelationshipOutcome,
};
pub use self::relationship_service::RelationshipService;
pub use self::tap_manager::TapManager;
pub use self::trace_id::TraceId;
pub use self::user::{
    PasswordHash, Role, UnknownRole, User, UserDraft, UserFilter, UserPatch, UserRelation,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use taplist::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
