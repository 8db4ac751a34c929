#![allow(dead_code)]

use std::time::Duration;

use filmoteka::{
    config::Config,
    db,
    models::{ActorRef, Movie, NewActor, NewMovie},
    relations::LoadStrategy,
    repository::Repository,
};
use jiff::civil::date;

pub const MEMORY_URL: &str = "sqlite::memory:";

pub async fn repo() -> Repository {
    repo_with(LoadStrategy::Joined).await
}

pub async fn repo_with(strategy: LoadStrategy) -> Repository {
    let db = db::connect_and_migrate(MEMORY_URL, 1).await.unwrap();
    Repository::new(db, Duration::from_secs(5), strategy)
}

/// The in-memory pool has one connection, so a transaction held by the test
/// stalls every repository call until it ends.
pub async fn repo_with_timeout(timeout: Duration) -> Repository {
    let db = db::connect_and_migrate(MEMORY_URL, 1).await.unwrap();
    Repository::new(db, timeout, LoadStrategy::Joined)
}

pub fn config() -> Config {
    Config {
        addr: "127.0.0.1:0".parse().unwrap(),
        database_url: MEMORY_URL.to_string(),
        db_max_connections: 1,
        db_timeout: Duration::from_secs(5),
        request_timeout: Duration::from_secs(10),
        load_strategy: LoadStrategy::Joined,
    }
}

pub fn new_actor(name: &str) -> NewActor {
    NewActor {
        name: name.to_string(),
        gender: "female".to_string(),
        date_of_birth: date(1970, 1, 1),
    }
}

pub fn new_movie(name: &str, actor_ids: &[i64]) -> NewMovie {
    NewMovie {
        name: name.to_string(),
        description: format!("{name} description"),
        release_date: date(1999, 3, 31),
        rating: 7,
        actors: actor_ids.iter().map(|&id| ActorRef { id }).collect(),
    }
}

pub fn actor_ids(movie: &Movie) -> Vec<i64> {
    movie.actors.iter().map(|a| a.id).collect()
}

pub fn sorted(mut ids: Vec<i64>) -> Vec<i64> {
    ids.sort_unstable();
    ids
}
