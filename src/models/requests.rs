//! Request DTOs for the search server API
//!
//! Defines the structure of incoming query strings.

use serde::Deserialize;

/// Query string of the search endpoint (GET /api/search/movies)
///
/// # Fields
/// - `query`: Free text matched against movie titles
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    /// The search text, required
    #[serde(default)]
    pub query: Option<String>,
}

impl SearchParams {
    /// Returns the trimmed search text, or an error message if it is missing.
    pub fn search_text(&self) -> Result<&str, String> {
        self.query
            .as_deref()
            .map(str::trim)
            .ok_or_else(|| "Missing argument query".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_params_deserialize() {
        let json = r#"{"query": "  copycat "}"#;
        let params: SearchParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.search_text(), Ok("copycat"));
    }

    #[test]
    fn test_missing_query() {
        let params: SearchParams = serde_json::from_str("{}").unwrap();
        assert!(params.search_text().is_err());
    }

    #[test]
    fn test_empty_query_is_allowed() {
        let params = SearchParams {
            query: Some(String::new()),
        };
        assert_eq!(params.search_text(), Ok(""));
    }
}
