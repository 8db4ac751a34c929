mod common;

use std::time::Duration;

use common::{actor_ids, new_actor, new_movie, repo, repo_with, repo_with_timeout, sorted};
use filmoteka::{
    entities::{movie, movie_actor},
    error::AppError,
    query::{MovieQuery, SortColumn, SortOrder},
    relations::LoadStrategy,
};
use jiff::civil::date;
use sea_orm::{EntityTrait, PaginatorTrait, TransactionTrait};

#[tokio::test]
async fn create_then_read_movie_without_actors() {
    let repo = repo().await;
    let input = new_movie("Solaris", &[]);

    let created = repo.create_movie(&input).await.unwrap();
    assert!(created.id > 0);

    let loaded = repo.get_movie(created.id).await.unwrap();
    assert_eq!(loaded.id, created.id);
    assert_eq!(loaded.name, input.name);
    assert_eq!(loaded.description, input.description);
    assert_eq!(loaded.release_date, input.release_date);
    assert_eq!(loaded.rating, input.rating);
    assert!(loaded.actors.is_empty());
}

#[tokio::test]
async fn create_movie_links_both_sides() {
    let repo = repo().await;
    let keanu = repo.create_actor(&new_actor("Keanu Reeves")).await.unwrap();
    let carrie = repo.create_actor(&new_actor("Carrie-Anne Moss")).await.unwrap();

    let movie = repo.create_movie(&new_movie("The Matrix", &[keanu.id, carrie.id])).await.unwrap();
    assert_eq!(sorted(actor_ids(&movie)), sorted(vec![keanu.id, carrie.id]));
    let cast = movie.actors.iter().find(|a| a.id == keanu.id).unwrap();
    assert_eq!(cast.name, "Keanu Reeves");
    assert_eq!(cast.date_of_birth, date(1970, 1, 1));

    let keanu = repo.get_actor(keanu.id).await.unwrap();
    assert_eq!(keanu.movies.len(), 1);
    assert_eq!(keanu.movies[0].id, movie.id);
    assert_eq!(keanu.movies[0].name, "The Matrix");
}

#[tokio::test]
async fn update_movie_is_idempotent() {
    let repo = repo().await;
    let a = repo.create_actor(&new_actor("A")).await.unwrap();
    let movie = repo.create_movie(&new_movie("Draft", &[])).await.unwrap();

    let mut update = new_movie("Final", &[a.id]);
    update.rating = 9;

    let once = repo.update_movie(movie.id, &update).await.unwrap();
    let twice = repo.update_movie(movie.id, &update).await.unwrap();
    assert_eq!(once, twice);
    assert_eq!(repo.get_movie(movie.id).await.unwrap(), twice);
    assert_eq!(twice.rating, 9);
    assert_eq!(movie_actor::Entity::find().count(repo.db()).await.unwrap(), 1);
}

#[tokio::test]
async fn update_replaces_whole_actor_set() {
    let repo = repo().await;
    let a = repo.create_actor(&new_actor("A")).await.unwrap();
    let b = repo.create_actor(&new_actor("B")).await.unwrap();
    let c = repo.create_actor(&new_actor("C")).await.unwrap();
    let movie = repo.create_movie(&new_movie("Ensemble", &[a.id, b.id])).await.unwrap();

    repo.update_movie(movie.id, &new_movie("Ensemble", &[b.id, c.id])).await.unwrap();

    let loaded = repo.get_movie(movie.id).await.unwrap();
    assert_eq!(sorted(actor_ids(&loaded)), sorted(vec![b.id, c.id]));
    assert!(repo.get_actor(a.id).await.unwrap().movies.is_empty());
}

#[tokio::test]
async fn duplicate_actor_refs_are_stored_once() {
    let repo = repo().await;
    let a = repo.create_actor(&new_actor("A")).await.unwrap();

    let movie = repo.create_movie(&new_movie("Twice", &[a.id, a.id])).await.unwrap();
    assert_eq!(actor_ids(&movie), vec![a.id]);
    assert_eq!(movie_actor::Entity::find().count(repo.db()).await.unwrap(), 1);
}

#[tokio::test]
async fn missing_actor_rolls_back_create() {
    let repo = repo().await;

    let err = repo.create_movie(&new_movie("Ghost cast", &[404])).await.unwrap_err();
    assert!(matches!(err, AppError::Storage(_)), "{err:?}");
    assert_eq!(movie::Entity::find().count(repo.db()).await.unwrap(), 0);
    assert_eq!(movie_actor::Entity::find().count(repo.db()).await.unwrap(), 0);
}

#[tokio::test]
async fn failed_update_keeps_previous_state() {
    let repo = repo().await;
    let a = repo.create_actor(&new_actor("A")).await.unwrap();
    let movie = repo.create_movie(&new_movie("Stable", &[a.id])).await.unwrap();

    let err = repo.update_movie(movie.id, &new_movie("Broken", &[a.id, 404])).await.unwrap_err();
    assert!(matches!(err, AppError::Storage(_)), "{err:?}");

    let loaded = repo.get_movie(movie.id).await.unwrap();
    assert_eq!(loaded, movie);
}

#[tokio::test]
async fn delete_movie_removes_associations() {
    let repo = repo().await;
    let a = repo.create_actor(&new_actor("A")).await.unwrap();
    let b = repo.create_actor(&new_actor("B")).await.unwrap();
    let movie = repo.create_movie(&new_movie("Gone", &[a.id, b.id])).await.unwrap();

    repo.delete_movie(movie.id).await.unwrap();

    assert_eq!(movie_actor::Entity::find().count(repo.db()).await.unwrap(), 0);
    assert!(matches!(repo.get_movie(movie.id).await, Err(AppError::NotFound { .. })));
    assert!(repo.get_actor(a.id).await.unwrap().movies.is_empty());
}

#[tokio::test]
async fn delete_actor_removes_associations() {
    let repo = repo().await;
    let a = repo.create_actor(&new_actor("A")).await.unwrap();
    let b = repo.create_actor(&new_actor("B")).await.unwrap();
    let movie = repo.create_movie(&new_movie("Duo", &[a.id, b.id])).await.unwrap();

    repo.delete_actor(a.id).await.unwrap();

    let loaded = repo.get_movie(movie.id).await.unwrap();
    assert_eq!(actor_ids(&loaded), vec![b.id]);
    assert_eq!(movie_actor::Entity::find().count(repo.db()).await.unwrap(), 1);
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let repo = repo().await;

    assert!(matches!(repo.get_movie(9).await, Err(AppError::NotFound { .. })));
    assert!(matches!(repo.get_actor(9).await, Err(AppError::NotFound { .. })));
    assert!(matches!(
        repo.update_movie(9, &new_movie("Nope", &[])).await,
        Err(AppError::NotFound { .. })
    ));
    assert!(matches!(
        repo.update_actor(9, &new_actor("Nobody")).await,
        Err(AppError::NotFound { .. })
    ));
    assert!(matches!(repo.delete_movie(9).await, Err(AppError::NotFound { .. })));
    assert!(matches!(repo.delete_actor(9).await, Err(AppError::NotFound { .. })));
}

#[tokio::test]
async fn update_actor_replaces_scalars_and_keeps_links() {
    let repo = repo().await;
    let a = repo.create_actor(&new_actor("Old Name")).await.unwrap();
    let movie = repo.create_movie(&new_movie("Credits", &[a.id])).await.unwrap();

    let mut input = new_actor("New Name");
    input.gender = "male".to_string();
    let updated = repo.update_actor(a.id, &input).await.unwrap();

    assert_eq!(updated.name, "New Name");
    assert_eq!(updated.gender, "male");
    assert_eq!(updated.movies.len(), 1);
    assert_eq!(repo.get_movie(movie.id).await.unwrap().actors[0].name, "New Name");
}

#[tokio::test]
async fn listing_includes_movies_without_actors_once() {
    let repo = repo().await;
    let a = repo.create_actor(&new_actor("A")).await.unwrap();
    let b = repo.create_actor(&new_actor("B")).await.unwrap();
    repo.create_movie(&new_movie("Crowded", &[a.id, b.id])).await.unwrap();
    repo.create_movie(&new_movie("Empty", &[])).await.unwrap();

    let movies = repo.list_movies(&MovieQuery::default()).await.unwrap();
    let names: Vec<&str> = movies.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Crowded", "Empty"]);
    assert_eq!(movies[0].actors.len(), 2);
}

#[tokio::test]
async fn listing_sorts_by_validated_column() {
    let repo = repo().await;
    for (name, rating, year) in [("B", 5, 2001), ("A", 9, 1999), ("C", 7, 2010)] {
        let mut input = new_movie(name, &[]);
        input.rating = rating;
        input.release_date = date(year, 6, 1);
        repo.create_movie(&input).await.unwrap();
    }

    let by_rating = MovieQuery { sort: SortColumn::Rating, order: SortOrder::Desc, filter: None };
    let names: Vec<String> =
        repo.list_movies(&by_rating).await.unwrap().into_iter().map(|m| m.name).collect();
    assert_eq!(names, vec!["A", "C", "B"]);

    let by_date = MovieQuery::from_params(Some("release_date"), None, None, None).unwrap();
    let names: Vec<String> =
        repo.list_movies(&by_date).await.unwrap().into_iter().map(|m| m.name).collect();
    assert_eq!(names, vec!["A", "B", "C"]);

    let by_name_desc = MovieQuery::from_params(None, Some("desc"), None, None).unwrap();
    let names: Vec<String> =
        repo.list_movies(&by_name_desc).await.unwrap().into_iter().map(|m| m.name).collect();
    assert_eq!(names, vec!["C", "B", "A"]);
}

#[tokio::test]
async fn per_row_and_joined_loading_agree() {
    let joined = repo_with(LoadStrategy::Joined).await;
    let per_row = repo_with(LoadStrategy::PerRow).await;

    for repo in [&joined, &per_row] {
        let a = repo.create_actor(&new_actor("A")).await.unwrap();
        let b = repo.create_actor(&new_actor("B")).await.unwrap();
        repo.create_movie(&new_movie("First", &[a.id, b.id])).await.unwrap();
        repo.create_movie(&new_movie("Second", &[b.id])).await.unwrap();
        repo.create_movie(&new_movie("Third", &[])).await.unwrap();
    }

    let normalize = |mut movies: Vec<filmoteka::models::Movie>| {
        for movie in &mut movies {
            movie.actors.sort_by_key(|a| a.id);
        }
        movies
    };
    let lhs = normalize(joined.list_movies(&MovieQuery::default()).await.unwrap());
    let rhs = normalize(per_row.list_movies(&MovieQuery::default()).await.unwrap());
    assert_eq!(lhs, rhs);

    let lhs = joined.list_actors(&Default::default()).await.unwrap();
    let rhs = per_row.list_actors(&Default::default()).await.unwrap();
    assert_eq!(lhs.len(), 2);
    for (l, r) in lhs.iter().zip(&rhs) {
        assert_eq!(l.name, r.name);
        assert_eq!(
            sorted(l.movies.iter().map(|m| m.id).collect()),
            sorted(r.movies.iter().map(|m| m.id).collect())
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_updates_settle_on_one_list() {
    let repo = repo().await;
    let mut ids = Vec::new();
    for name in ["A", "B", "C", "D"] {
        ids.push(repo.create_actor(&new_actor(name)).await.unwrap().id);
    }
    let movie = repo.create_movie(&new_movie("Contested", &[])).await.unwrap();

    let lists = vec![vec![ids[0], ids[1]], vec![ids[2], ids[3]], vec![ids[1], ids[2]]];
    let mut tasks = Vec::new();
    for list in &lists {
        let repo = repo.clone();
        let input = new_movie("Contested", list);
        let id = movie.id;
        tasks.push(tokio::spawn(async move { repo.update_movie(id, &input).await }));
    }
    for result in futures::future::join_all(tasks).await {
        result.unwrap().unwrap();
    }

    let actual = sorted(actor_ids(&repo.get_movie(movie.id).await.unwrap()));
    let settled = lists.iter().any(|list| sorted(list.clone()) == actual);
    assert!(settled, "interleaved state {actual:?}");
}

#[tokio::test]
async fn stalled_storage_times_out_without_writing() {
    let repo = repo_with_timeout(Duration::from_millis(100)).await;
    let actor = repo.create_actor(&new_actor("Keanu Reeves")).await.unwrap();

    let held = repo.db().begin().await.unwrap();
    let err = repo.create_movie(&new_movie("Speed", &[actor.id])).await.unwrap_err();
    assert!(matches!(err, AppError::Timeout), "{err:?}");
    let err = repo.get_actor(actor.id).await.unwrap_err();
    assert!(matches!(err, AppError::Timeout), "{err:?}");
    held.rollback().await.unwrap();

    assert_eq!(movie::Entity::find().count(repo.db()).await.unwrap(), 0);
    assert_eq!(movie_actor::Entity::find().count(repo.db()).await.unwrap(), 0);
    assert!(repo.get_actor(actor.id).await.unwrap().movies.is_empty());
}
