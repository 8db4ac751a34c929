use crate::{
    error::AppResult,
    models::{Actor, Movie},
    query::{ActorQuery, MovieFilter, MovieQuery},
    repository::Repository,
};

impl Repository {
    /// Movies whose title, or else one of whose actors' names, contains the
    /// given text. Default sort. No filter when both are empty.
    pub async fn search_movies(
        &self,
        title: Option<&str>,
        actor: Option<&str>,
    ) -> AppResult<Vec<Movie>> {
        let query = MovieQuery::filtered(MovieFilter::from_params(title, actor));
        self.list_movies(&query).await
    }

    pub async fn search_actors(&self, name: Option<&str>) -> AppResult<Vec<Actor>> {
        self.list_actors(&ActorQuery::by_name(name)).await
    }
}
