//! Actor administration endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{delete, post},
    Json, Router,
};

use crate::db::{ActorInput, ItemKind};
use crate::error::ApiResult;
use crate::AppState;

async fn add_actor(
    State(state): State<AppState>,
    body: Result<Json<ActorInput>, JsonRejection>,
) -> ApiResult<&'static str> {
    let Json(actor) = body?;
    state.catalog.add_actor(actor).await?;
    Ok("Actor has been successfully added")
}

async fn delete_actor(
    State(state): State<AppState>,
    Path((first_name, last_name)): Path<(String, String)>,
) -> ApiResult<&'static str> {
    state.catalog.delete_actor(&first_name, &last_name).await?;
    Ok("Actor has been successfully deleted")
}

async fn add_actor_to_movie(
    State(state): State<AppState>,
    Path((first_name, last_name, movie_name)): Path<(String, String, String)>,
) -> ApiResult<&'static str> {
    state
        .catalog
        .link_actor(&first_name, &last_name, ItemKind::Movie, &movie_name)
        .await?;
    Ok("Actor has been successfully added to the movie")
}

async fn add_actor_to_show(
    State(state): State<AppState>,
    Path((first_name, last_name, show_name)): Path<(String, String, String)>,
) -> ApiResult<&'static str> {
    state
        .catalog
        .link_actor(&first_name, &last_name, ItemKind::TvShow, &show_name)
        .await?;
    Ok("Actor has been successfully added to the TV show")
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/AddActor", post(add_actor))
        .route("/DeleteActor/{firstName}/{lastName}", delete(delete_actor))
        .route(
            "/AddActorToMovie/{firstName}/{lastName}/{movieName}",
            post(add_actor_to_movie),
        )
        .route(
            "/AddActorToTVShow/{firstName}/{lastName}/{showName}",
            post(add_actor_to_show),
        )
}
