//! Application state and HTTP router construction.
//!
//! Used by the binary and by the integration tests to build the Axum app.

use std::sync::Arc;

use axum::{middleware, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::config::Config;
use crate::db::Database;
use crate::services::{
    images::PUBLIC_PREFIX, AuthConfig, AuthService, CatalogService, ImageStore,
    InteractionService,
};

/// Shared state for HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Database,
    pub auth: AuthService,
    pub interactions: InteractionService,
    pub catalog: CatalogService,
}

impl AppState {
    /// Wire every service to the given store
    pub fn new(config: Config, db: Database) -> Self {
        let images = ImageStore::new(config.images_path.clone());
        Self {
            auth: AuthService::new(db.clone(), AuthConfig::from(&config)),
            interactions: InteractionService::new(db.clone()),
            catalog: CatalogService::new(db.clone(), images, config.page_size),
            config: Arc::new(config),
            db,
        }
    }
}

/// Build the full Axum router with user, admin, health and image routes.
/// Returns Router<()> (state fully applied) for use with axum::serve.
pub fn build_app(state: AppState) -> Router<()> {
    let admin = Router::new()
        .nest("/Movie", api::movies::router())
        .nest("/TVShow", api::tv_shows::router())
        .nest("/Actor", api::actors::router())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth::require_admin,
        ));

    Router::new()
        .merge(api::health::router())
        .merge(api::users::router())
        .nest("/User", api::users::router())
        .merge(admin)
        .nest_service(PUBLIC_PREFIX, ServeDir::new(&state.config.images_path))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
