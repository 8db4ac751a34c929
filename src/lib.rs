pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod models;
pub mod query;
pub mod relations;
pub mod repository;
pub mod routes;
mod search;

use std::sync::Arc;

use axum::{Router, http::StatusCode, routing::get};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{config::Config, repository::Repository};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub repo: Repository,
}

impl AppState {
    pub async fn connect(config: Config) -> error::AppResult<Self> {
        let db = db::connect_and_migrate(&config.database_url, config.db_max_connections).await?;
        let repo = Repository::new(db, config.db_timeout, config.load_strategy);
        Ok(Self { config: Arc::new(config), repo })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let request_timeout = state.config.request_timeout;

    Router::new()
        .route("/actors", get(routes::list_actors).post(routes::create_actor))
        .route("/actors/search", get(routes::search_actors))
        .route(
            "/actors/{id}",
            get(routes::get_actor).put(routes::update_actor).delete(routes::delete_actor),
        )
        .route("/movies", get(routes::list_movies).post(routes::create_movie))
        .route("/movies/search", get(routes::search_movies))
        .route(
            "/movies/{id}",
            get(routes::get_movie).put(routes::update_movie).delete(routes::delete_movie),
        )
        .with_state(state)
        .layer(TimeoutLayer::with_status_code(StatusCode::INTERNAL_SERVER_ERROR, request_timeout))
        .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}
