use crate::state::AppState;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer, limit::RequestBodyLimitLayer, map_response_body::MapResponseBodyLayer,
    trace::TraceLayer,
};

mod accounts;
mod files;
mod health;
mod trash;

pub fn router(state: AppState) -> Router {
    let max_request_size = state.config.uploads.max_request_size;

    let accounts = Router::new()
        .route("/register", post(accounts::register))
        .route("/login", post(accounts::login))
        .route("/users", get(accounts::list_users));

    let files = Router::new()
        .route("/file", post(files::upload))
        .route(
            "/file/{key}",
            get(files::get_file)
                .patch(files::update)
                .delete(files::send_to_trash),
        )
        .route("/file/{key}/download", get(files::download))
        .route("/file/{key}/send_to_trash", patch(files::send_to_trash))
        .route("/file/{key}/share", post(files::share))
        .route("/file/{key}/rename", patch(files::rename))
        .route("/file/{key}/change_owner", patch(files::change_owner))
        .route("/file/{key}/stop_seeing", delete(files::stop_seeing))
        .route("/files", get(files::list_files))
        .route("/files/owned", get(files::list_owned))
        .route("/files/shared", get(files::list_shared));

    let trash = Router::new()
        .route("/trash", get(trash::list_trash))
        .route(
            "/trash/{key}",
            patch(trash::restore).delete(trash::permanent_delete),
        );

    Router::new()
        .route("/health", get(health::health_check))
        .merge(accounts)
        .merge(files)
        .merge(trash)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::disable())
                .layer(MapResponseBodyLayer::new(axum::body::Body::new))
                .layer(RequestBodyLimitLayer::new(max_request_size)),
        )
        .with_state(state)
}
