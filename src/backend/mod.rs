//! PocketBase REST backend.
//!
//! [`PocketBaseClient`] implements the adapter's backend traits over
//! `reqwest`. Its admin session lives in an [`AuthStore`] shared by all
//! clones of the client.

pub mod auth_store;
pub mod client;

pub use auth_store::AuthStore;
pub use client::{AdminAuthEndpoint, PocketBaseClient};
