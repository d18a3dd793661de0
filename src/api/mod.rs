//! API Module
//!
//! HTTP handlers and routing for the search server REST API.
//!
//! # Endpoints
//! - `GET /api/movies/:id` - Fetch a movie by id
//! - `GET /api/search/movies?query=` - Search movies by title
//! - `GET /stats` - Search cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
