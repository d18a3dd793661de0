//! Movie Model
//!
//! Public shape of a movie document.

use serde::{Deserialize, Serialize};

// == Location ==
/// Filming location of a movie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

impl Location {
    /// Creates a location known only by its address.
    pub fn from_address(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            lat: None,
            lng: None,
        }
    }
}

// == Movie ==
/// A movie as returned by the API.
///
/// Every field but the title is optional so that projected search results
/// deserialize into the same type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    /// Public identifier, empty until the movie is stored
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_year: Option<u16>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fun_facts: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub production_company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distributor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub writer: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actors: Vec<String>,
    /// Text search relevance, only set on search results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}
