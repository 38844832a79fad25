//! Driven adapters implementing the domain ports.
//!
//! - **persistence**: PostgreSQL entity stores over Diesel.
//! - **images**: local filesystem image store.
//! - **security**: password hashing.
//!
//! Adapters translate between domain values and infrastructure; they hold no
//! relationship rules.

pub mod images;
pub mod persistence;
pub mod security;
