//! API Handlers
//!
//! HTTP request handlers for each search server endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::info;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{HealthResponse, SearchParams, StatsResponse};
use crate::movies::{Movie, MoviesDao, MoviesService};
use crate::store::SharedCollection;

/// Application state shared across all handlers.
///
/// Holds the movies service, which owns the search cache.
#[derive(Clone, Debug)]
pub struct AppState {
    pub movies: Arc<MoviesService>,
}

impl AppState {
    /// Creates a new AppState with the given service.
    pub fn new(movies: MoviesService) -> Self {
        Self {
            movies: Arc::new(movies),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Builds the movies service on top of `collection` with the configured
    /// cache capacity and search limit.
    pub fn from_config(config: &Config, collection: SharedCollection) -> Self {
        let dao = MoviesDao::new(collection, config.max_movies_per_search);
        Self::new(MoviesService::new(dao, config.search_cache_capacity))
    }
}

/// Handler for GET /api/movies/:id
///
/// Returns a movie given its id, 404 if it is unknown or malformed.
pub async fn get_movie_handler(
    State(state): State<AppState>,
    Path(movie_id): Path<String>,
) -> Result<Json<Movie>> {
    info!("Processing request /api/movies/{}", movie_id);

    state
        .movies
        .get(&movie_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Movie '{}'", movie_id)))
}

/// Handler for GET /api/search/movies?query=
///
/// Returns the movies whose title matches `query`, 400 if it is missing.
pub async fn search_movies_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Movie>>> {
    let search_text = params.search_text().map_err(AppError::InvalidRequest)?;
    info!(
        "Processing request /api/search/movies with query \"{}\"",
        search_text
    );

    let movies = state.movies.search_by_title(search_text).await?;
    Ok(Json(movies))
}

/// Handler for GET /stats
///
/// Returns search cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let cache = state.movies.search_cache();
    Json(StatsResponse::new(&cache.stats(), cache.capacity()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
