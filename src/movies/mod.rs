//! Movies Module
//!
//! Movie model, data access, import with geocoding and the cached search
//! service.

mod dao;
mod geocode;
pub mod import;
mod model;
mod service;

pub use dao::MoviesDao;
pub use geocode::Geocoder;
pub use model::{Location, Movie};
pub use service::{sanitize_input, MoviesService, SearchCache};
