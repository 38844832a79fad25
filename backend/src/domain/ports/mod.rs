//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod accounts;
mod catalogue;
mod entity_store;
mod image_store;
mod in_memory_store;
mod password_hasher;
mod relationships;

#[cfg(test)]
pub use accounts::MockAccountService;
pub use accounts::{AccountService, UserProfile};
#[cfg(test)]
pub use catalogue::{MockCatalogueCommand, MockCatalogueQuery};
pub use catalogue::{BeerDetails, CatalogueCommand, CatalogueQuery, NewBeer, NewPub, PubDetails};
pub use entity_store::{EntityStore, StoreError};
#[cfg(test)]
pub use image_store::MockImageStore;
pub use image_store::{ImageStore, ImageStoreError};
pub use in_memory_store::InMemoryEntityStore;
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHasher, PasswordHasherError};
#[cfg(test)]
pub use relationships::{MockHistoryCommand, MockTapCommand};
pub use relationships::{HistoryCommand, TapCommand, TapOutcome, TastedOutcome, VisitedOutcome};
