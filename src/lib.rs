use axum::{
    Router,
    extract::{FromRef, Request},
    http::{HeaderName, StatusCode},
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod token;

// Routing segregated by access requirement (public, authenticated).
pub mod routes;
use auth::AuthUser;
use routes::{authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use repository::{InMemoryRepository, PostgresRepository, RepositoryState};
pub use token::TokenService;

/// ApiDoc
///
/// OpenAPI document for every route, served at `/api-docs/openapi.json` with a
/// Swagger UI at `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::liveness, handlers::save_user, handlers::list_users, handlers::get_user,
        handlers::list_posts, handlers::list_seller_posts, handlers::create_post,
        handlers::get_post, handlers::update_post, handlers::add_comment,
        handlers::list_comments, handlers::add_like, handlers::list_likes,
        handlers::remove_like
    ),
    components(
        schemas(
            models::User, models::Post, models::EngagementPayload, models::Comment,
            models::Like, models::InsertResult, models::UpsertResult, models::UpdateResult,
            models::DeleteResult, models::SaveUserResponse, models::UpdateOutcome,
        )
    ),
    tags(
        (name = "friendkit", description = "Friendkit social content API")
    )
)]
pub struct ApiDoc;

/// AppState
///
/// The single immutable container of everything a request needs: the store handle,
/// the token service and the loaded configuration. Built once in `main` and cloned
/// cheaply into every request.
#[derive(Clone)]
pub struct AppState {
    /// Document store shared by all in-flight requests. No application-level locking.
    pub repo: RepositoryState,
    /// Issues and verifies identity tokens.
    pub tokens: TokenService,
    /// Settings loaded at startup. Read-only for the life of the process.
    pub config: AppConfig,
}

impl AppState {
    /// Builds the state around a store, deriving the token service from the config's secret.
    pub fn new(repo: RepositoryState, config: AppConfig) -> Self {
        Self {
            repo,
            tokens: TokenService::new(&config.jwt_secret),
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for TokenService {
    fn from_ref(app_state: &AppState) -> TokenService {
        app_state.tokens.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Guards the authenticated router. Extracting `AuthUser` verifies the bearer token;
/// on failure the extractor's rejection (401 or 403) is returned and the handler never
/// runs. On success the identity is already stored in the request extensions, so the
/// handler's own `AuthUser` argument does not verify the token a second time.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the routing tree, applies the authentication layer to the protected
/// routes, and wraps everything in the observability, timeout and CORS layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");
    let request_timeout = state.config.request_timeout;

    let mut router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        // Merged method routers keep the guarded fallback, so an unsupported method
        // would otherwise answer 401 instead of 405.
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(state);

    // Unbounded unless configured.
    if let Some(timeout) = request_timeout {
        router = router.layer(TimeoutLayer::new(timeout));
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

async fn method_not_allowed() -> StatusCode {
    StatusCode::METHOD_NOT_ALLOWED
}

/// trace_span_logger
///
/// Opens the per-request span. Carries the `x-request-id` set by `SetRequestIdLayer`
/// so every log line of one request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
