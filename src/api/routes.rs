//! API Routes
//!
//! Configures the Axum router with all search server endpoints.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    get_movie_handler, health_handler, search_movies_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /api/movies/:id` - Fetch a movie by id
/// - `GET /api/search/movies?query=` - Search movies by title
/// - `GET /stats` - Search cache statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/movies/:id", get(get_movie_handler))
        .route("/api/search/movies", get(search_movies_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::store::{Collection, Query};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    async fn create_test_app() -> Router {
        let collection = Collection::new("movies_test").into_shared();
        Query::new(collection.clone()).ensure_indexes().await;
        let state = AppState::from_config(&Config::default(), collection);
        create_router(state)
    }

    async fn status_of(uri: &str) -> StatusCode {
        create_test_app()
            .await
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        assert_eq!(status_of("/health").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        assert_eq!(status_of("/stats").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_search_endpoint() {
        assert_eq!(status_of("/api/search/movies?query=a").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_search_without_query() {
        assert_eq!(
            status_of("/api/search/movies").await,
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_movie_not_found() {
        assert_eq!(
            status_of("/api/movies/aaaaaaaaaaaaaaaaaaaaaaaa").await,
            StatusCode::NOT_FOUND
        );
    }
}
