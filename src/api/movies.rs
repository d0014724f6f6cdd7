//! Movie administration endpoints

use axum::{
    extract::{Multipart, Path, State},
    routing::{delete, get, post, put},
    Json, Router,
};

use super::forms::read_item_form;
use super::parse_page;
use crate::db::{ItemKind, Movie};
use crate::error::ApiResult;
use crate::AppState;

async fn add_movie(State(state): State<AppState>, multipart: Multipart) -> ApiResult<&'static str> {
    let form = read_item_form(ItemKind::Movie, multipart).await?;
    state.catalog.add_item(ItemKind::Movie, form).await?;
    Ok("Movie has been successfully added")
}

async fn update_movie(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<&'static str> {
    let form = read_item_form(ItemKind::Movie, multipart).await?;
    state.catalog.update_item(ItemKind::Movie, form).await?;
    Ok("Movie has been successfully updated")
}

async fn delete_movie(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<&'static str> {
    state.catalog.delete_item(ItemKind::Movie, &name).await?;
    Ok("Movie has been successfully deleted")
}

async fn page_movies(
    State(state): State<AppState>,
    Path(page): Path<String>,
) -> ApiResult<Json<Vec<Movie>>> {
    Ok(Json(state.catalog.items_page(parse_page(&page)?).await?))
}

async fn get_movie(State(state): State<AppState>, Path(name): Path<String>) -> ApiResult<Json<Movie>> {
    Ok(Json(state.catalog.item(&name).await?))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/AddMovie", post(add_movie))
        .route("/UpdateMovie", put(update_movie))
        .route("/DeleteMovie/{name}", delete(delete_movie))
        .route("/GetPageMovies/{page}", get(page_movies))
        .route("/GetMovie/{name}", get(get_movie))
}
