use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get, post, put},
};

/// Authenticated Router Module
///
/// Every route here sits behind `auth_middleware`: a request without an
/// `Authorization` header is answered 401 and a bad token 403, before any handler
/// or store code runs.
///
/// Ownership Strategy:
/// Only the two email-scoped reads compare the caller with the resource owner.
/// Post updates and like removal accept any authenticated caller.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /user/{email}
        // The caller's own profile. Ownership: token email == {email}.
        .route("/user/{email}", get(handlers::get_user))
        // GET /posts/{email}
        // The caller's own posts (seller.email == {email}).
        .route("/posts/{email}", get(handlers::list_seller_posts))
        // POST /posts
        .route("/posts", post(handlers::create_post))
        // PUT /post/{id}
        // Shallow patch. Always answers 200 with `{success, message|error}`.
        .route("/post/{id}", put(handlers::update_post))
        // POST /comments
        .route("/comments", post(handlers::add_comment))
        // POST /likes
        .route("/likes", post(handlers::add_like))
        // DELETE /likes/{id}
        // Removes a single like targeting post {id}.
        .route("/likes/{id}", delete(handlers::remove_like))
}
