use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, put},
};

/// Public Router Module
///
/// Endpoints reachable without a token: the liveness probe, profile save (which is
/// how a client obtains its token), and every read of posts, comments and likes.
///
/// `GET /users` is unscoped: any client may enumerate every profile.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /
        // Liveness text for monitoring.
        .route("/", get(handlers::liveness))
        // PUT /user/{email}
        // Upserts the profile and returns `{result, token}`.
        .route("/user/{email}", put(handlers::save_user))
        // GET /users
        .route("/users", get(handlers::list_users))
        // GET /posts
        .route("/posts", get(handlers::list_posts))
        // GET /post/{id}
        .route("/post/{id}", get(handlers::get_post))
        // GET /comment/{id}
        // Comments targeting post `{id}`.
        .route("/comment/{id}", get(handlers::list_comments))
        // GET /likes/{id}
        // Likes targeting post `{id}`.
        .route("/likes/{id}", get(handlers::list_likes))
}
