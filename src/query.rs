//! Listing queries built from untrusted request parameters.
//!
//! Filter values only ever travel as bound parameters. Sort columns and
//! directions are parsed into closed enums before they reach a query.

use std::str::FromStr;

use sea_orm::{
    ColumnTrait, DbBackend, EntityTrait, QueryFilter, QueryOrder, QueryTrait, Select, Statement,
    sea_query::{Expr, LikeExpr, Order, Query, SimpleExpr},
};

use crate::{
    entities::{actor, movie, movie_actor},
    error::{AppError, AppResult},
};

/// Columns a movie listing may be ordered by.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SortColumn {
    Id,
    #[default]
    Name,
    Description,
    ReleaseDate,
    Rating,
}

impl SortColumn {
    fn column(self) -> movie::Column {
        match self {
            SortColumn::Id => movie::Column::Id,
            SortColumn::Name => movie::Column::Name,
            SortColumn::Description => movie::Column::Description,
            SortColumn::ReleaseDate => movie::Column::ReleaseDate,
            SortColumn::Rating => movie::Column::Rating,
        }
    }
}

impl FromStr for SortColumn {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "name" => Ok(SortColumn::Name),
            "id" => Ok(SortColumn::Id),
            "description" => Ok(SortColumn::Description),
            "release_date" => Ok(SortColumn::ReleaseDate),
            "rating" => Ok(SortColumn::Rating),
            other => Err(AppError::Validation(format!("unsupported sort column `{other}`"))),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    fn order(self) -> Order {
        match self {
            SortOrder::Asc => Order::Asc,
            SortOrder::Desc => Order::Desc,
        }
    }
}

impl FromStr for SortOrder {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(AppError::Validation(format!("unsupported sort order `{other}`"))),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MovieFilter {
    /// Substring of the movie name.
    Title(String),
    /// Substring of the name of any actor in the movie.
    ActorName(String),
}

impl MovieFilter {
    /// Picks at most one filter. A non-empty title wins over an actor name.
    pub fn from_params(title: Option<&str>, actor: Option<&str>) -> Option<Self> {
        let present =
            |v: Option<&str>| v.map(str::trim).filter(|v| !v.is_empty()).map(String::from);
        present(title)
            .map(MovieFilter::Title)
            .or_else(|| present(actor).map(MovieFilter::ActorName))
    }

    fn condition(&self) -> SimpleExpr {
        match self {
            MovieFilter::Title(value) => {
                Expr::col((movie::Entity, movie::Column::NameFolded)).like(contains(value))
            },
            MovieFilter::ActorName(value) => movie::Column::Id.in_subquery(
                Query::select()
                    .column((movie_actor::Entity, movie_actor::Column::MovieId))
                    .from(movie_actor::Entity)
                    .inner_join(
                        actor::Entity,
                        Expr::col((actor::Entity, actor::Column::Id))
                            .equals((movie_actor::Entity, movie_actor::Column::ActorId)),
                    )
                    .and_where(
                        Expr::col((actor::Entity, actor::Column::NameFolded))
                            .like(contains(value)),
                    )
                    .to_owned(),
            ),
        }
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MovieQuery {
    pub filter: Option<MovieFilter>,
    pub sort: SortColumn,
    pub order: SortOrder,
}

impl MovieQuery {
    pub fn from_params(
        sort_by: Option<&str>,
        sort_order: Option<&str>,
        title: Option<&str>,
        actor: Option<&str>,
    ) -> AppResult<Self> {
        Ok(Self {
            filter: MovieFilter::from_params(title, actor),
            sort: sort_by.unwrap_or_default().parse()?,
            order: sort_order.unwrap_or_default().parse()?,
        })
    }

    pub fn filtered(filter: Option<MovieFilter>) -> Self {
        Self { filter, ..Self::default() }
    }

    pub fn select(&self) -> Select<movie::Entity> {
        let mut select = movie::Entity::find();
        if let Some(filter) = &self.filter {
            select = select.filter(filter.condition());
        }
        select = select.order_by(self.sort.column(), self.order.order());
        if self.sort != SortColumn::Id {
            select = select.order_by_asc(movie::Column::Id);
        }
        select
    }

    /// The rendered SQL with its positional values.
    pub fn build(&self, backend: DbBackend) -> Statement {
        self.select().build(backend)
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ActorQuery {
    pub name: Option<String>,
}

impl ActorQuery {
    pub fn by_name(name: Option<&str>) -> Self {
        let name = name.map(str::trim).filter(|n| !n.is_empty()).map(String::from);
        Self { name }
    }

    pub fn select(&self) -> Select<actor::Entity> {
        let mut select = actor::Entity::find();
        if let Some(name) = &self.name {
            select = select
                .filter(Expr::col((actor::Entity, actor::Column::NameFolded)).like(contains(name)));
        }
        select.order_by_asc(actor::Column::Name).order_by_asc(actor::Column::Id)
    }
}

/// Case folding shared by stored `name_folded` columns and filter patterns.
/// SQLite's `LOWER` and `LIKE` only fold ASCII, so both sides are folded here.
pub fn fold(value: &str) -> String {
    value.to_lowercase()
}

/// `%value%` with LIKE wildcards in the value escaped, folded.
fn contains(value: &str) -> LikeExpr {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for c in fold(value).chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    LikeExpr::new(pattern).escape('\\')
}
