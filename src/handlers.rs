use crate::{
    AppState,
    auth::{AuthUser, require_ownership},
    error::ApiError,
    models::{
        Comment, DeleteResult, Document, EngagementPayload, InsertResult, Like, Post,
        SaveUserResponse, UpdateOutcome, User,
    },
};
use axum::{
    Json,
    extract::{Path, State},
};

/// Body of the liveness probe.
pub const LIVENESS_MESSAGE: &str = "Friendkit server is running...";

// --- Handlers ---

/// liveness
///
/// [Public Route] Plain-text probe for load balancers and humans.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Server is up", body = String))
)]
pub async fn liveness() -> &'static str {
    LIVENESS_MESSAGE
}

// --- User Directory ---

/// save_user
///
/// [Public Route] Creates or fully replaces the profile stored under `email` and mints
/// a session token for it. Signing happens first so a caller never ends up with a
/// saved profile but no token.
#[utoipa::path(
    put,
    path = "/user/{email}",
    params(("email" = String, Path, description = "Profile email (identity key)")),
    request_body = User,
    responses((status = 200, description = "Saved", body = SaveUserResponse))
)]
pub async fn save_user(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Json(profile): Json<Document>,
) -> Result<Json<SaveUserResponse>, ApiError> {
    let user = User::new(email, profile);
    let token = state.tokens.issue(&user)?;
    let result = state.repo.upsert_user(user).await?;

    tracing::info!(?result, "user profile saved");
    Ok(Json(SaveUserResponse { result, token }))
}

/// list_users
///
/// [Public Route] Enumerates every stored profile. There is no ownership scoping here.
#[utoipa::path(
    get,
    path = "/users",
    responses((status = 200, description = "All users", body = [User]))
)]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(state.repo.list_users().await?))
}

/// get_user
///
/// [Authenticated Route] Returns the caller's own profile, or `null` if it was never saved.
///
/// *Ownership*: the token's email must equal `{email}` exactly.
#[utoipa::path(
    get,
    path = "/user/{email}",
    params(("email" = String, Path, description = "Profile email")),
    responses(
        (status = 200, description = "Profile (null when absent)", body = User),
        (status = 401, description = "No Authorization header"),
        (status = 403, description = "Invalid token or not the owner")
    )
)]
pub async fn get_user(
    identity: AuthUser,
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<Option<User>>, ApiError> {
    require_ownership(&identity, &email)?;
    Ok(Json(state.repo.get_user(&email).await?))
}

// --- Content Store ---

/// list_posts
///
/// [Public Route] Every post, in creation order.
#[utoipa::path(
    get,
    path = "/posts",
    responses((status = 200, description = "All posts", body = [Post]))
)]
pub async fn list_posts(State(state): State<AppState>) -> Result<Json<Vec<Post>>, ApiError> {
    Ok(Json(state.repo.list_posts().await?))
}

/// list_seller_posts
///
/// [Authenticated Route] Posts whose `seller.email` equals `{email}`.
///
/// *Ownership*: only the seller may list their own posts.
#[utoipa::path(
    get,
    path = "/posts/{email}",
    params(("email" = String, Path, description = "Seller email")),
    responses(
        (status = 200, description = "Seller's posts", body = [Post]),
        (status = 401, description = "No Authorization header"),
        (status = 403, description = "Invalid token or not the seller")
    )
)]
pub async fn list_seller_posts(
    identity: AuthUser,
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<Vec<Post>>, ApiError> {
    require_ownership(&identity, &email)?;
    Ok(Json(state.repo.list_posts_by_seller(&email).await?))
}

/// create_post
///
/// [Authenticated Route] Stores the body as a new post under a store-assigned id.
/// `seller.email` is taken from the body as-is.
#[utoipa::path(
    post,
    path = "/posts",
    request_body = Post,
    responses((status = 200, description = "Created", body = InsertResult))
)]
pub async fn create_post(
    AuthUser { email, .. }: AuthUser,
    State(state): State<AppState>,
    Json(fields): Json<Document>,
) -> Result<Json<InsertResult>, ApiError> {
    let result = state.repo.create_post(fields).await?;
    tracing::info!(caller = %email, post_id = %result.inserted_id, "post created");
    Ok(Json(result))
}

/// get_post
///
/// [Public Route] A single post, or `null` if no post has that id.
#[utoipa::path(
    get,
    path = "/post/{id}",
    params(("id" = String, Path, description = "Post id")),
    responses((status = 200, description = "Post (null when absent)", body = Post))
)]
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Option<Post>>, ApiError> {
    Ok(Json(state.repo.get_post(&id).await?))
}

/// update_post
///
/// [Authenticated Route] Merges the body's top-level fields into the post.
///
/// *Authorization*: any authenticated caller may patch any post; the post's seller
/// is not compared with the caller. A miss and a store failure both come back as
/// `{success: false, error}` with status 200.
#[utoipa::path(
    put,
    path = "/post/{id}",
    params(("id" = String, Path, description = "Post id")),
    request_body = Post,
    responses((status = 200, description = "Update outcome", body = UpdateOutcome))
)]
pub async fn update_post(
    AuthUser { email, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<Document>,
) -> Json<UpdateOutcome> {
    let outcome = match state.repo.update_post(&id, patch).await {
        Ok(result) => {
            tracing::info!(caller = %email, post_id = %id, ?result, "post update");
            UpdateOutcome::from(result)
        }
        Err(e) => {
            tracing::error!(post_id = %id, error = %e, "post update failed");
            UpdateOutcome::failed(e.to_string())
        }
    };
    Json(outcome)
}

// --- Engagement Store ---

/// add_comment
///
/// [Authenticated Route] Appends a comment. The body's `_id` names the target post;
/// the post's existence is not checked.
#[utoipa::path(
    post,
    path = "/comments",
    request_body = EngagementPayload,
    responses((status = 200, description = "Comment stored", body = InsertResult))
)]
pub async fn add_comment(
    AuthUser { email, .. }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<EngagementPayload>,
) -> Result<Json<InsertResult>, ApiError> {
    let post_id = payload.post_id.clone();
    let result = state.repo.add_comment(payload).await?;
    tracing::info!(caller = %email, %post_id, "comment added");
    Ok(Json(result))
}

/// list_comments
///
/// [Public Route] Comments whose target post id is `{id}`.
#[utoipa::path(
    get,
    path = "/comment/{id}",
    params(("id" = String, Path, description = "Target post id")),
    responses((status = 200, description = "Comments", body = [Comment]))
)]
pub async fn list_comments(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    Ok(Json(state.repo.list_comments(&post_id).await?))
}

/// add_like
///
/// [Authenticated Route] Appends a like. Same shape and rules as `add_comment`;
/// liking twice stores two likes.
#[utoipa::path(
    post,
    path = "/likes",
    request_body = EngagementPayload,
    responses((status = 200, description = "Like stored", body = InsertResult))
)]
pub async fn add_like(
    AuthUser { email, .. }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<EngagementPayload>,
) -> Result<Json<InsertResult>, ApiError> {
    let post_id = payload.post_id.clone();
    let result = state.repo.add_like(payload).await?;
    tracing::info!(caller = %email, %post_id, "like added");
    Ok(Json(result))
}

/// list_likes
///
/// [Public Route] Likes whose target post id is `{id}`.
#[utoipa::path(
    get,
    path = "/likes/{id}",
    params(("id" = String, Path, description = "Target post id")),
    responses((status = 200, description = "Likes", body = [Like]))
)]
pub async fn list_likes(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<Json<Vec<Like>>, ApiError> {
    Ok(Json(state.repo.list_likes(&post_id).await?))
}

/// remove_like
///
/// [Authenticated Route] Removes one like targeting `{id}`, whoever created it.
/// With no likes on the post this is a no-op reporting `deletedCount: 0`.
#[utoipa::path(
    delete,
    path = "/likes/{id}",
    params(("id" = String, Path, description = "Target post id")),
    responses((status = 200, description = "Delete report", body = DeleteResult))
)]
pub async fn remove_like(
    AuthUser { email, .. }: AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<Json<DeleteResult>, ApiError> {
    let result = state.repo.remove_like(&post_id).await?;
    tracing::info!(caller = %email, %post_id, deleted = result.deleted_count, "like removed");
    Ok(Json(result))
}
