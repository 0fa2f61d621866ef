use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{admins, genres, songs, users};
use crate::state::AppState;

/// Route map: public reads and auth endpoints at the root, everything that
/// requires a token under `/api`. Role checks live in the handler extractors.
pub fn router(state: AppState) -> Router {
  let public = Router::new()
    .route("/", get(health))
    .route("/songs", get(songs::list))
    .route("/songs/{id}", get(songs::show))
    .route("/genres", get(genres::list))
    .route("/register", post(users::register))
    .route("/login", post(users::login))
    .route("/logout", post(users::logout))
    .route("/admin/login", post(admins::login))
    .route("/admin/logout", post(admins::logout));

  let api = Router::new()
    .route("/auth", get(users::auth_check))
    .route("/profile", get(users::profile).put(users::update_profile))
    .route("/songs", post(songs::create_multipart))
    .route("/songs/json", post(songs::create_json))
    .route(
      "/songs/{id}",
      axum::routing::put(songs::update_multipart)
        .patch(songs::update_json)
        .delete(songs::remove),
    )
    .route("/genres", post(genres::create))
    .route("/genres/{id}", axum::routing::put(genres::update).delete(genres::remove))
    .route("/users", get(users::list))
    .route("/users/{id}", get(users::show).put(users::update).delete(users::remove))
    .route("/admins", get(admins::list).post(admins::create))
    .route("/admins/{id}", get(admins::show).put(admins::update).delete(admins::remove));

  Router::new()
    .merge(public)
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
    .layer(CorsLayer::permissive())
    .with_state(state)
}

async fn health() -> &'static str {
  "ok"
}
