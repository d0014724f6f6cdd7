//! TV show administration endpoints

use axum::{
    extract::{Multipart, Path, State},
    routing::{delete, get, post, put},
    Json, Router,
};

use super::forms::read_item_form;
use super::parse_page;
use crate::db::{ItemKind, TvShow};
use crate::error::ApiResult;
use crate::AppState;

async fn add_show(State(state): State<AppState>, multipart: Multipart) -> ApiResult<&'static str> {
    let form = read_item_form(ItemKind::TvShow, multipart).await?;
    state.catalog.add_item(ItemKind::TvShow, form).await?;
    Ok("TV show has been successfully added")
}

async fn update_show(State(state): State<AppState>, multipart: Multipart) -> ApiResult<&'static str> {
    let form = read_item_form(ItemKind::TvShow, multipart).await?;
    state.catalog.update_item(ItemKind::TvShow, form).await?;
    Ok("TV show has been successfully updated")
}

async fn delete_show(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<&'static str> {
    state.catalog.delete_item(ItemKind::TvShow, &name).await?;
    Ok("TV show has been successfully deleted")
}

async fn page_shows(
    State(state): State<AppState>,
    Path(page): Path<String>,
) -> ApiResult<Json<Vec<TvShow>>> {
    Ok(Json(state.catalog.items_page(parse_page(&page)?).await?))
}

async fn get_show(State(state): State<AppState>, Path(name): Path<String>) -> ApiResult<Json<TvShow>> {
    Ok(Json(state.catalog.item(&name).await?))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/AddTVShow", post(add_show))
        .route("/UpdateTVShow", put(update_show))
        .route("/DeleteTVShow/{name}", delete(delete_show))
        .route("/GetPageTVShows/{page}", get(page_shows))
        .route("/GetTVShow/{name}", get(get_show))
}
