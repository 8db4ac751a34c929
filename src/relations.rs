//! Materializes the movie/actor many-to-many relationship.
//!
//! `Joined` resolves a whole batch with a single join query. `PerRow`
//! issues one query for each entity's join rows and then one query per
//! linked row. Both abort on the first read error.

use std::{collections::HashMap, str::FromStr};

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use tracing::debug;

use crate::{
    entities::{actor, movie, movie_actor},
    error::{AppError, AppResult},
    models::{Actor, Movie},
};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LoadStrategy {
    #[default]
    Joined,
    PerRow,
}

impl FromStr for LoadStrategy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "joined" => Ok(LoadStrategy::Joined),
            "per_row" | "per-row" => Ok(LoadStrategy::PerRow),
            other => Err(AppError::Validation(format!("unknown load strategy `{other}`"))),
        }
    }
}

pub async fn movies_with_actors<C: ConnectionTrait>(
    conn: &C,
    strategy: LoadStrategy,
    rows: Vec<movie::Model>,
) -> AppResult<Vec<Movie>> {
    let mut movies = rows.into_iter().map(Movie::from_model).collect::<AppResult<Vec<_>>>()?;

    match strategy {
        LoadStrategy::Joined => {
            let ids: Vec<i64> = movies.iter().map(|m| m.id).collect();
            let mut by_movie = actors_by_movie(conn, &ids).await?;
            for movie in &mut movies {
                movie.actors = by_movie.remove(&movie.id).unwrap_or_default();
            }
        },
        LoadStrategy::PerRow => {
            for movie in &mut movies {
                movie.actors = actors_of_movie(conn, movie.id).await?;
            }
        },
    }

    debug!(movies = movies.len(), strategy = ?strategy, "loaded movie actors");
    Ok(movies)
}

pub async fn movie_with_actors<C: ConnectionTrait>(
    conn: &C,
    strategy: LoadStrategy,
    row: movie::Model,
) -> AppResult<Movie> {
    let id = row.id;
    movies_with_actors(conn, strategy, vec![row])
        .await?
        .pop()
        .ok_or_else(|| AppError::not_found("movie", id))
}

pub async fn actors_with_movies<C: ConnectionTrait>(
    conn: &C,
    strategy: LoadStrategy,
    rows: Vec<actor::Model>,
) -> AppResult<Vec<Actor>> {
    let mut actors = rows.into_iter().map(Actor::from_model).collect::<AppResult<Vec<_>>>()?;

    match strategy {
        LoadStrategy::Joined => {
            let ids: Vec<i64> = actors.iter().map(|a| a.id).collect();
            let mut by_actor = movies_by_actor(conn, &ids).await?;
            for actor in &mut actors {
                actor.movies = by_actor.remove(&actor.id).unwrap_or_default();
            }
        },
        LoadStrategy::PerRow => {
            for actor in &mut actors {
                actor.movies = movies_of_actor(conn, actor.id).await?;
            }
        },
    }

    debug!(actors = actors.len(), strategy = ?strategy, "loaded actor movies");
    Ok(actors)
}

pub async fn actor_with_movies<C: ConnectionTrait>(
    conn: &C,
    strategy: LoadStrategy,
    row: actor::Model,
) -> AppResult<Actor> {
    let id = row.id;
    actors_with_movies(conn, strategy, vec![row])
        .await?
        .pop()
        .ok_or_else(|| AppError::not_found("actor", id))
}

async fn actors_by_movie<C: ConnectionTrait>(
    conn: &C,
    movie_ids: &[i64],
) -> AppResult<HashMap<i64, Vec<Actor>>> {
    let mut grouped: HashMap<i64, Vec<Actor>> = HashMap::new();
    if movie_ids.is_empty() {
        return Ok(grouped);
    }

    let rows = movie_actor::Entity::find()
        .filter(movie_actor::Column::MovieId.is_in(movie_ids.iter().copied()))
        .find_also_related(actor::Entity)
        .all(conn)
        .await?;

    for (link, row) in rows {
        let row = row.ok_or(AppError::DanglingAssociation {
            entity: "movie",
            owner_id: link.movie_id,
            missing_id: link.actor_id,
        })?;
        grouped.entry(link.movie_id).or_default().push(Actor::from_model(row)?);
    }
    Ok(grouped)
}

async fn movies_by_actor<C: ConnectionTrait>(
    conn: &C,
    actor_ids: &[i64],
) -> AppResult<HashMap<i64, Vec<Movie>>> {
    let mut grouped: HashMap<i64, Vec<Movie>> = HashMap::new();
    if actor_ids.is_empty() {
        return Ok(grouped);
    }

    let rows = movie_actor::Entity::find()
        .filter(movie_actor::Column::ActorId.is_in(actor_ids.iter().copied()))
        .find_also_related(movie::Entity)
        .all(conn)
        .await?;

    for (link, row) in rows {
        let row = row.ok_or(AppError::DanglingAssociation {
            entity: "actor",
            owner_id: link.actor_id,
            missing_id: link.movie_id,
        })?;
        grouped.entry(link.actor_id).or_default().push(Movie::from_model(row)?);
    }
    Ok(grouped)
}

async fn actors_of_movie<C: ConnectionTrait>(conn: &C, movie_id: i64) -> AppResult<Vec<Actor>> {
    let links = movie_actor::Entity::find()
        .filter(movie_actor::Column::MovieId.eq(movie_id))
        .all(conn)
        .await?;

    let mut actors = Vec::with_capacity(links.len());
    for link in links {
        let row = actor::Entity::find_by_id(link.actor_id).one(conn).await?.ok_or(
            AppError::DanglingAssociation {
                entity: "movie",
                owner_id: movie_id,
                missing_id: link.actor_id,
            },
        )?;
        actors.push(Actor::from_model(row)?);
    }
    Ok(actors)
}

async fn movies_of_actor<C: ConnectionTrait>(conn: &C, actor_id: i64) -> AppResult<Vec<Movie>> {
    let links = movie_actor::Entity::find()
        .filter(movie_actor::Column::ActorId.eq(actor_id))
        .all(conn)
        .await?;

    let mut movies = Vec::with_capacity(links.len());
    for link in links {
        let row = movie::Entity::find_by_id(link.movie_id).one(conn).await?.ok_or(
            AppError::DanglingAssociation {
                entity: "actor",
                owner_id: actor_id,
                missing_id: link.movie_id,
            },
        )?;
        movies.push(Movie::from_model(row)?);
    }
    Ok(movies)
}
