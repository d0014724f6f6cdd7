//! Account, interaction and traversal endpoints used by the MovieTime clients

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};

use crate::db::{Actor, ItemKind, Movie, TvShow};
use crate::error::{ApiError, ApiResult};
use crate::services::RegisterInput;
use crate::AppState;

// ============================================================================
// Account
// ============================================================================

async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterInput>, JsonRejection>,
) -> ApiResult<&'static str> {
    let Json(input) = body?;
    state.auth.register(input).await?;
    Ok("Registration is successful")
}

async fn login(
    State(state): State<AppState>,
    Path((email, password)): Path<(String, String)>,
) -> ApiResult<String> {
    state.auth.login(&email, &password).await
}

// ============================================================================
// Favorites and ratings
// ============================================================================

async fn add_favorite(state: &AppState, kind: ItemKind, item: &str, email: &str) -> ApiResult<String> {
    state.interactions.add_favorite(kind, item, email).await?;
    Ok(format!(
        "{} has been successfully added to the favorites",
        kind.display_name()
    ))
}

async fn add_favorite_movie(
    State(state): State<AppState>,
    Path((movie_name, user_email)): Path<(String, String)>,
) -> ApiResult<String> {
    add_favorite(&state, ItemKind::Movie, &movie_name, &user_email).await
}

async fn add_favorite_show(
    State(state): State<AppState>,
    Path((show_name, user_email)): Path<(String, String)>,
) -> ApiResult<String> {
    add_favorite(&state, ItemKind::TvShow, &show_name, &user_email).await
}

async fn rate(
    state: &AppState,
    kind: ItemKind,
    (item, email, score, feedback): (String, String, String, String),
) -> ApiResult<String> {
    let score = score
        .trim()
        .parse::<f64>()
        .map_err(|_| ApiError::validation("Score must be between 0 and 10."))?;
    state
        .interactions
        .rate_item(kind, &item, &email, score, &feedback)
        .await?;
    Ok(format!("{} has been successfully rated", kind.display_name()))
}

async fn rate_movie(
    State(state): State<AppState>,
    Path(params): Path<(String, String, String, String)>,
) -> ApiResult<String> {
    rate(&state, ItemKind::Movie, params).await
}

async fn rate_show(
    State(state): State<AppState>,
    Path(params): Path<(String, String, String, String)>,
) -> ApiResult<String> {
    rate(&state, ItemKind::TvShow, params).await
}

// ============================================================================
// Traversals
// ============================================================================

async fn movies_with_actor(
    State(state): State<AppState>,
    Path((first_name, last_name)): Path<(String, String)>,
) -> ApiResult<Json<Vec<Movie>>> {
    Ok(Json(state.catalog.movies_by_actor(&first_name, &last_name).await?))
}

async fn shows_with_actor(
    State(state): State<AppState>,
    Path((first_name, last_name)): Path<(String, String)>,
) -> ApiResult<Json<Vec<TvShow>>> {
    Ok(Json(state.catalog.shows_by_actor(&first_name, &last_name).await?))
}

async fn actors_from_movie(
    State(state): State<AppState>,
    Path(movie_name): Path<String>,
) -> ApiResult<Json<Vec<Actor>>> {
    Ok(Json(state.catalog.actors_in_movie(&movie_name).await?))
}

async fn actors_from_show(
    State(state): State<AppState>,
    Path(show_name): Path<String>,
) -> ApiResult<Json<Vec<Actor>>> {
    Ok(Json(state.catalog.actors_in_show(&show_name).await?))
}

async fn favorite_movies(
    State(state): State<AppState>,
    Path(user_email): Path<String>,
) -> ApiResult<Json<Vec<Movie>>> {
    Ok(Json(state.catalog.favorite_movies(&user_email).await?))
}

async fn favorite_shows(
    State(state): State<AppState>,
    Path(user_email): Path<String>,
) -> ApiResult<Json<Vec<TvShow>>> {
    Ok(Json(state.catalog.favorite_shows(&user_email).await?))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/Register", post(register))
        .route("/Login/{email}/{password}", post(login))
        .route("/AddFavoriteMovie/{movieName}/{userEmail}", post(add_favorite_movie))
        .route("/AddFavoriteTVShow/{showName}/{userEmail}", post(add_favorite_show))
        .route(
            "/RateMovie/{movieName}/{userEmail}/{score}/{feedback}",
            post(rate_movie),
        )
        .route(
            "/RateTVShow/{showName}/{userEmail}/{score}/{feedback}",
            post(rate_show),
        )
        .route("/GetMoviesWithActor/{firstName}/{lastName}", get(movies_with_actor))
        .route("/GetTVShowsWithActor/{firstName}/{lastName}", get(shows_with_actor))
        .route("/GetActorsFromMovie/{movieName}", get(actors_from_movie))
        .route("/GetActorsFromTVShow/{showName}", get(actors_from_show))
        .route("/GetFavoriteMovies/{userEmail}", get(favorite_movies))
        .route("/GetFavoriteTVShows/{userEmail}", get(favorite_shows))
}
