use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;

use crate::{
    AppState,
    error::{AppError, AppResult},
    models::{Actor, Movie, NewActor, NewMovie},
    query::{ActorQuery, MovieQuery},
};

type Body<T> = WithRejection<Json<T>, AppError>;
type Id = WithRejection<Path<i64>, AppError>;

#[derive(Debug, Default, Deserialize)]
pub struct ListMoviesParams {
    sort_by: Option<String>,
    sort_order: Option<String>,
    title: Option<String>,
    actor: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchMoviesParams {
    title: Option<String>,
    actor: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchActorsParams {
    name: Option<String>,
}

pub async fn create_actor(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(input), _): Body<NewActor>,
) -> AppResult<Json<Actor>> {
    Ok(Json(state.repo.create_actor(&input).await?))
}

pub async fn get_actor(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): Id,
) -> AppResult<Json<Actor>> {
    Ok(Json(state.repo.get_actor(id).await?))
}

pub async fn update_actor(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): Id,
    WithRejection(Json(input), _): Body<NewActor>,
) -> AppResult<Json<Actor>> {
    Ok(Json(state.repo.update_actor(id, &input).await?))
}

pub async fn delete_actor(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): Id,
) -> AppResult<()> {
    state.repo.delete_actor(id).await
}

pub async fn list_actors(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Actor>>> {
    Ok(Json(state.repo.list_actors(&ActorQuery::default()).await?))
}

pub async fn search_actors(
    State(state): State<Arc<AppState>>,
    Query(q): Query<SearchActorsParams>,
) -> AppResult<Json<Vec<Actor>>> {
    Ok(Json(state.repo.search_actors(q.name.as_deref()).await?))
}

pub async fn create_movie(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(input), _): Body<NewMovie>,
) -> AppResult<Json<Movie>> {
    Ok(Json(state.repo.create_movie(&input).await?))
}

pub async fn get_movie(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): Id,
) -> AppResult<Json<Movie>> {
    Ok(Json(state.repo.get_movie(id).await?))
}

pub async fn update_movie(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): Id,
    WithRejection(Json(input), _): Body<NewMovie>,
) -> AppResult<Json<Movie>> {
    Ok(Json(state.repo.update_movie(id, &input).await?))
}

pub async fn delete_movie(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): Id,
) -> AppResult<()> {
    state.repo.delete_movie(id).await
}

pub async fn list_movies(
    State(state): State<Arc<AppState>>,
    Query(q): Query<ListMoviesParams>,
) -> AppResult<Json<Vec<Movie>>> {
    let query = MovieQuery::from_params(
        q.sort_by.as_deref(),
        q.sort_order.as_deref(),
        q.title.as_deref(),
        q.actor.as_deref(),
    )?;
    Ok(Json(state.repo.list_movies(&query).await?))
}

pub async fn search_movies(
    State(state): State<Arc<AppState>>,
    Query(q): Query<SearchMoviesParams>,
) -> AppResult<Json<Vec<Movie>>> {
    Ok(Json(state.repo.search_movies(q.title.as_deref(), q.actor.as_deref()).await?))
}
