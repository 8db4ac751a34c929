use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::{
    entities::{actor, movie},
    error::AppResult,
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: i64,
    pub name: String,
    pub gender: String,
    pub date_of_birth: Date,
    #[serde(default)]
    pub movies: Vec<Movie>,
}

impl Actor {
    pub fn from_model(model: actor::Model) -> AppResult<Self> {
        Ok(Self {
            id: model.id,
            date_of_birth: model.date_of_birth.parse()?,
            name: model.name,
            gender: model.gender,
            movies: Vec::new(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub release_date: Date,
    pub rating: i64,
    #[serde(default)]
    pub actors: Vec<Actor>,
}

impl Movie {
    pub fn from_model(model: movie::Model) -> AppResult<Self> {
        Ok(Self {
            id: model.id,
            release_date: model.release_date.parse()?,
            name: model.name,
            description: model.description,
            rating: model.rating,
            actors: Vec::new(),
        })
    }
}

/// Body of `POST /actors` and `PUT /actors/{id}`.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NewActor {
    pub name: String,
    pub gender: String,
    pub date_of_birth: Date,
}

/// An actor referenced by id from a movie payload. Other actor fields are ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ActorRef {
    pub id: i64,
}

/// Body of `POST /movies` and `PUT /movies/{id}`.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NewMovie {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub release_date: Date,
    pub rating: i64,
    #[serde(default)]
    pub actors: Vec<ActorRef>,
}

impl NewMovie {
    /// Referenced actor ids in payload order, first occurrence wins.
    pub fn distinct_actor_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = Vec::with_capacity(self.actors.len());
        for actor in &self.actors {
            if !ids.contains(&actor.id) {
                ids.push(actor.id);
            }
        }
        ids
    }
}
