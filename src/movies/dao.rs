//! Movies DAO
//!
//! Reads movies out of the document store.

use serde_json::Value;

use crate::error::{Result, StoreError};
use crate::movies::Movie;
use crate::store::{
    Criteria, Document, ObjectId, Projection, Query, SharedCollection, SortOrder, SCORE_FIELD,
};

/// Movie fields returned by a title search
const SEARCH_FIELDS: [&str; 3] = ["title", "release_year", SCORE_FIELD];

// == Movies DAO ==
/// Access to the movies collection.
#[derive(Debug, Clone)]
pub struct MoviesDao {
    collection: SharedCollection,
    /// Maximum number of movies returned by a search
    max_movies_per_search: usize,
}

impl MoviesDao {
    pub fn new(collection: SharedCollection, max_movies_per_search: usize) -> Self {
        Self {
            collection,
            max_movies_per_search,
        }
    }

    // == Find By Id ==
    /// Retrieves a movie by its id.
    ///
    /// Malformed ids are treated like unknown ones.
    pub async fn find_by_id(&self, movie_id: &str) -> Result<Option<Movie>> {
        let Some(id) = ObjectId::parse(movie_id) else {
            return Ok(None);
        };

        Query::new(self.collection.clone())
            .filter(Criteria::Id(id))
            .find_one()
            .await?
            .map(to_movie)
            .transpose()
    }

    // == Search By Title ==
    /// Retrieves the movies whose title matches `title_text`, most relevant
    /// first.
    pub async fn search_by_title(&self, title_text: &str) -> Result<Vec<Movie>> {
        Query::new(self.collection.clone())
            .filter(Criteria::TitleSearch(title_text.to_string()))
            .select(Projection::include(SEARCH_FIELDS))
            .sort(SortOrder::TextScore)
            .limit(self.max_movies_per_search)
            .find()
            .await?
            .into_iter()
            .map(to_movie)
            .collect()
    }
}

fn to_movie(document: Document) -> Result<Movie> {
    serde_json::from_value(Value::Object(document))
        .map_err(|err| StoreError::Json(err).into())
}
