use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, post, MethodRouter},
    Json, Router,
};
use serde::de::DeserializeOwned;
use unistate::users::{ApiResponse, NewUser, UserKey, UserUpdate};

use crate::{
    config::{ConfigError, ServerConfig},
    db::UserRepository,
    error::{Operation, UsersError},
    service,
};

const ALLOW_HEADERS: &str =
    "Content-Type, Access-Control-Allow-Headers, Authorization, X-Requested-With";
const ALLOW_METHODS: &str = "GET, POST, OPTIONS";

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<UserRepository>,
    pub allow_origin: HeaderValue,
}

impl AppState {
    pub fn new(repo: UserRepository, config: &ServerConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            repo: Arc::new(repo),
            allow_origin: config.allow_origin_header()?,
        })
    }
}

/// Builds the router.
///
/// Each endpoint is served both with and without a `.php` suffix.
pub fn build_router(state: AppState) -> Router {
    let endpoints: [(&str, MethodRouter<AppState>); 4] = [
        ("all-users", get(all_users).post(all_users)),
        ("add-user", post(add_user)),
        ("update-user", post(update_user)),
        ("delete-user", post(delete_user)),
    ];
    let mut router = Router::new();
    for (name, route) in endpoints {
        let route = route.options(preflight);
        router = router
            .route(&format!("/{name}"), route.clone())
            .route(&format!("/{name}.php"), route);
    }
    router
        .layer(middleware::map_response_with_state(state.clone(), cors))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

async fn cors(State(state): State<AppState>, mut res: Response) -> Response {
    let headers = res.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, state.allow_origin);
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    res
}

async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let res = next.run(req).await;
    tracing::info!(%method, %uri, status = %res.status(), "request");
    res
}

async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Parses a JSON body. A missing or malformed body is treated as an empty object.
fn parse_body<T: DeserializeOwned + Default>(body: &Bytes) -> T {
    serde_json::from_slice(body).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "unreadable request body");
        T::default()
    })
}

/// Runs `f` against the repository on the blocking thread pool.
async fn blocking<T: Send + 'static>(
    state: &AppState,
    op: Operation,
    f: impl FnOnce(&UserRepository) -> Result<T, UsersError> + Send + 'static,
) -> Result<T, UsersError> {
    let repo = state.repo.clone();
    tokio::task::spawn_blocking(move || f(&repo))
        .await
        .map_err(UsersError::task(op))?
}

async fn all_users(State(state): State<AppState>) -> Result<Json<ApiResponse>, UsersError> {
    blocking(&state, Operation::List, service::all_users)
        .await
        .map(Json)
}

async fn add_user(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ApiResponse>, UsersError> {
    let user = parse_body::<NewUser>(&body);
    blocking(&state, Operation::Insert, move |repo| {
        service::add_user(repo, &user)
    })
    .await
    .map(Json)
}

async fn update_user(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ApiResponse>, UsersError> {
    let user = parse_body::<UserUpdate>(&body);
    blocking(&state, Operation::Update, move |repo| {
        service::update_user(repo, &user)
    })
    .await
    .map(Json)
}

async fn delete_user(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ApiResponse>, UsersError> {
    let key = parse_body::<UserKey>(&body);
    blocking(&state, Operation::Delete, move |repo| {
        service::delete_user(repo, &key)
    })
    .await
    .map(Json)
}
