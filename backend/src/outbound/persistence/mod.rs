//! PostgreSQL entity stores using Diesel with `diesel-async` and bb8.
//!
//! Each store implements `EntityStore<E>` for one collection and only
//! translates between Diesel rows and domain documents. Relation pushes and
//! pulls are single `UPDATE ... RETURNING *` statements using
//! `array_append` and `array_remove`, so concurrent writers never overwrite
//! each other's list changes.
//!
//! ```no_run
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! use taplist::outbound::persistence::{DbPool, DieselPubStore, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/taplist")).await?;
//! let pubs = DieselPubStore::new(pool);
//! # let _ = pubs;
//! # Ok(())
//! # }
//! ```

mod diesel_beer_store;
mod diesel_error_mapping;
mod diesel_pub_store;
mod diesel_user_store;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_beer_store::DieselBeerStore;
pub use diesel_pub_store::DieselPubStore;
pub use diesel_user_store::DieselUserStore;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
