//! Relationship core of a beer-tasting backend: pubs, beers, drinkers and the
//! tap lists and tasting history that tie them together.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
