//! Movies Service
//!
//! Business operations on movies. Title searches go through an LRU cache
//! keyed by the sanitized search text.

use std::num::NonZeroUsize;

use crate::cache::{CacheStats, LruCache};
use crate::error::{AppError, Result};
use crate::movies::{MoviesDao, Movie};

/// Cache of title search results keyed by sanitized search text.
pub type SearchCache = LruCache<String, Vec<Movie>, AppError>;

// == Movies Service ==
#[derive(Debug)]
pub struct MoviesService {
    dao: MoviesDao,
    search_cache: SearchCache,
}

impl MoviesService {
    // == Constructor ==
    /// Creates the service with a search cache of `cache_capacity` entries
    /// backed by `dao`.
    pub fn new(dao: MoviesDao, cache_capacity: NonZeroUsize) -> Self {
        let search_dao = dao.clone();
        let search_cache = LruCache::new(cache_capacity, move |text: String| {
            let dao = search_dao.clone();
            async move { dao.search_by_title(&text).await }
        });

        Self { dao, search_cache }
    }

    // == Get ==
    /// Returns a movie given its id.
    pub async fn get(&self, movie_id: &str) -> Result<Option<Movie>> {
        self.dao.find_by_id(movie_id).await
    }

    // == Search By Title ==
    /// Returns the movies matching the search text.
    ///
    /// Text that is empty once sanitized yields no movies without a lookup.
    pub async fn search_by_title(&self, search_text: &str) -> Result<Vec<Movie>> {
        let search_text = sanitize_input(search_text);

        if search_text.is_empty() {
            return Ok(Vec::new());
        }

        self.search_cache.get(search_text).await
    }

    /// Statistics of the search cache.
    pub fn cache_stats(&self) -> CacheStats {
        self.search_cache.stats()
    }

    pub fn search_cache(&self) -> &SearchCache {
        &self.search_cache
    }
}

// == Sanitize Input ==
/// Keeps only ASCII letters, digits and spaces.
pub fn sanitize_input(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .collect()
}
