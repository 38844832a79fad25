//! Driving ports for relationship changes.
//!
//! Inbound adapters call these to change a pub's tap list or a user's
//! history without knowing which stores back them.

use async_trait::async_trait;

use crate::domain::{
    Beer, BeerId, Pub, PubId, RelationshipError, RelationshipOutcome, User, UserId,
};

/// Tap change result: the pub plus the beer whose `pubs` list was updated.
pub type TapOutcome = RelationshipOutcome<Pub, Beer>;
/// Tasted change result: the user plus the beer whose `tasted_by` list was
/// updated.
pub type TastedOutcome = RelationshipOutcome<User, Beer>;
/// Visited change result. Pubs do not track visitors, so `related` is
/// always `None`.
pub type VisitedOutcome = RelationshipOutcome<User, Pub>;

/// Tap list use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TapCommand: Send + Sync {
    /// Put a beer on tap at a pub.
    async fn add_beer_to_tap(
        &self,
        pub_id: PubId,
        beer_id: BeerId,
    ) -> Result<TapOutcome, RelationshipError>;

    /// Take a beer off tap at a pub.
    async fn remove_beer_from_tap(
        &self,
        pub_id: PubId,
        beer_id: BeerId,
    ) -> Result<TapOutcome, RelationshipError>;
}

/// User history use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HistoryCommand: Send + Sync {
    async fn add_tasted_beer(
        &self,
        user_id: UserId,
        beer_id: BeerId,
    ) -> Result<TastedOutcome, RelationshipError>;

    async fn remove_tasted_beer(
        &self,
        user_id: UserId,
        beer_id: BeerId,
    ) -> Result<TastedOutcome, RelationshipError>;

    async fn add_visited_pub(
        &self,
        user_id: UserId,
        pub_id: PubId,
    ) -> Result<VisitedOutcome, RelationshipError>;

    async fn remove_visited_pub(
        &self,
        user_id: UserId,
        pub_id: PubId,
    ) -> Result<VisitedOutcome, RelationshipError>;
}
