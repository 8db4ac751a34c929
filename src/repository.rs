use std::{future::Future, time::Duration};

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, Set, TransactionTrait,
};
use tracing::{debug, warn};

use crate::{
    entities::{actor, movie, movie_actor},
    error::{AppError, AppResult},
    models::{Actor, Movie, NewActor, NewMovie},
    query::{ActorQuery, MovieQuery, fold},
    relations::{self, LoadStrategy},
};

/// Movie and actor persistence. Every operation runs under `timeout`, and
/// every operation touching more than one row runs in a single transaction.
#[derive(Clone)]
pub struct Repository {
    db: DatabaseConnection,
    timeout: Duration,
    strategy: LoadStrategy,
}

impl Repository {
    pub fn new(db: DatabaseConnection, timeout: Duration, strategy: LoadStrategy) -> Self {
        Self { db, timeout, strategy }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    // Dropping the timed-out future drops its transaction, which rolls it back.
    async fn bounded<T>(
        &self,
        op: &'static str,
        fut: impl Future<Output = AppResult<T>>,
    ) -> AppResult<T> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                let timeout_ms = self.timeout.as_millis() as u64;
                warn!(op, timeout_ms, "storage deadline exceeded");
                Err(AppError::Timeout)
            },
        }
    }

    pub async fn create_actor(&self, input: &NewActor) -> AppResult<Actor> {
        self.bounded("create_actor", async {
            let row = actor_model(None, input).insert(&self.db).await?;
            debug!(actor_id = row.id, "created actor");
            Actor::from_model(row)
        })
        .await
    }

    pub async fn update_actor(&self, id: i64, input: &NewActor) -> AppResult<Actor> {
        self.bounded("update_actor", async {
            let txn = self.db.begin().await?;
            let row = actor_model(Some(id), input)
                .update(&txn)
                .await
                .map_err(|err| not_updated(err, "actor", id))?;
            let actor = relations::actor_with_movies(&txn, self.strategy, row).await?;
            txn.commit().await?;
            debug!(actor_id = id, "updated actor");
            Ok(actor)
        })
        .await
    }

    pub async fn delete_actor(&self, id: i64) -> AppResult<()> {
        self.bounded("delete_actor", async {
            let txn = self.db.begin().await?;
            let unlinked = movie_actor::Entity::delete_many()
                .filter(movie_actor::Column::ActorId.eq(id))
                .exec(&txn)
                .await?
                .rows_affected;
            let deleted = actor::Entity::delete_by_id(id).exec(&txn).await?.rows_affected;
            if deleted == 0 {
                return Err(AppError::not_found("actor", id));
            }
            txn.commit().await?;
            debug!(actor_id = id, unlinked, "deleted actor");
            Ok(())
        })
        .await
    }

    pub async fn get_actor(&self, id: i64) -> AppResult<Actor> {
        self.bounded("get_actor", async {
            let row = actor::Entity::find_by_id(id)
                .one(&self.db)
                .await?
                .ok_or_else(|| AppError::not_found("actor", id))?;
            relations::actor_with_movies(&self.db, self.strategy, row).await
        })
        .await
    }

    pub async fn list_actors(&self, query: &ActorQuery) -> AppResult<Vec<Actor>> {
        self.bounded("list_actors", async {
            let rows = query.select().all(&self.db).await?;
            relations::actors_with_movies(&self.db, self.strategy, rows).await
        })
        .await
    }

    pub async fn create_movie(&self, input: &NewMovie) -> AppResult<Movie> {
        self.bounded("create_movie", async {
            let txn = self.db.begin().await?;
            let row = movie_model(None, input).insert(&txn).await?;
            let actor_ids = input.distinct_actor_ids();
            link_actors(&txn, row.id, &actor_ids).await?;
            let movie = relations::movie_with_actors(&txn, self.strategy, row).await?;
            txn.commit().await?;
            debug!(movie_id = movie.id, actors = actor_ids.len(), "created movie");
            Ok(movie)
        })
        .await
    }

    /// Replaces the scalar fields and the whole actor set of a movie.
    pub async fn update_movie(&self, id: i64, input: &NewMovie) -> AppResult<Movie> {
        self.bounded("update_movie", async {
            let txn = self.db.begin().await?;
            let row = movie_model(Some(id), input)
                .update(&txn)
                .await
                .map_err(|err| not_updated(err, "movie", id))?;
            movie_actor::Entity::delete_many()
                .filter(movie_actor::Column::MovieId.eq(id))
                .exec(&txn)
                .await?;
            let actor_ids = input.distinct_actor_ids();
            link_actors(&txn, id, &actor_ids).await?;
            let movie = relations::movie_with_actors(&txn, self.strategy, row).await?;
            txn.commit().await?;
            debug!(movie_id = id, actors = actor_ids.len(), "updated movie");
            Ok(movie)
        })
        .await
    }

    pub async fn delete_movie(&self, id: i64) -> AppResult<()> {
        self.bounded("delete_movie", async {
            let txn = self.db.begin().await?;
            let unlinked = movie_actor::Entity::delete_many()
                .filter(movie_actor::Column::MovieId.eq(id))
                .exec(&txn)
                .await?
                .rows_affected;
            let deleted = movie::Entity::delete_by_id(id).exec(&txn).await?.rows_affected;
            if deleted == 0 {
                return Err(AppError::not_found("movie", id));
            }
            txn.commit().await?;
            debug!(movie_id = id, unlinked, "deleted movie");
            Ok(())
        })
        .await
    }

    pub async fn get_movie(&self, id: i64) -> AppResult<Movie> {
        self.bounded("get_movie", async {
            let row = movie::Entity::find_by_id(id)
                .one(&self.db)
                .await?
                .ok_or_else(|| AppError::not_found("movie", id))?;
            relations::movie_with_actors(&self.db, self.strategy, row).await
        })
        .await
    }

    pub async fn list_movies(&self, query: &MovieQuery) -> AppResult<Vec<Movie>> {
        self.bounded("list_movies", async {
            let rows = query.select().all(&self.db).await?;
            relations::movies_with_actors(&self.db, self.strategy, rows).await
        })
        .await
    }
}

async fn link_actors<C: ConnectionTrait>(
    conn: &C,
    movie_id: i64,
    actor_ids: &[i64],
) -> AppResult<()> {
    if actor_ids.is_empty() {
        return Ok(());
    }
    let links = actor_ids.iter().map(|&actor_id| movie_actor::ActiveModel {
        movie_id: Set(movie_id),
        actor_id: Set(actor_id),
    });
    movie_actor::Entity::insert_many(links).exec_without_returning(conn).await?;
    Ok(())
}

fn actor_model(id: Option<i64>, input: &NewActor) -> actor::ActiveModel {
    actor::ActiveModel {
        id: id.map(Set).unwrap_or_default(),
        name: Set(input.name.clone()),
        name_folded: Set(fold(&input.name)),
        gender: Set(input.gender.clone()),
        date_of_birth: Set(input.date_of_birth.to_string()),
    }
}

fn movie_model(id: Option<i64>, input: &NewMovie) -> movie::ActiveModel {
    movie::ActiveModel {
        id: id.map(Set).unwrap_or_default(),
        name: Set(input.name.clone()),
        name_folded: Set(fold(&input.name)),
        description: Set(input.description.clone()),
        release_date: Set(input.release_date.to_string()),
        rating: Set(input.rating),
    }
}

fn not_updated(err: DbErr, entity: &'static str, id: i64) -> AppError {
    match err {
        DbErr::RecordNotUpdated => AppError::not_found(entity, id),
        other => other.into(),
    }
}
