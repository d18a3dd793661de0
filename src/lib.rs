//! Movies Search - A movie search server with a cached title search
//!
//! Title searches are served through an in-process LRU cache that fills
//! itself asynchronously from an in-memory document store.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod movies;
pub mod store;

pub use api::AppState;
pub use config::Config;
