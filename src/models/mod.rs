//! Request and Response models for the search server API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP requests and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::SearchParams;
pub use responses::{ErrorResponse, HealthResponse, StatsResponse};
