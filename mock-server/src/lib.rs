//! In-memory implementation of the profile REST API.
//!
//! Profiles live in a `Vec` so listing returns them in insertion order.
//! Uploaded files are kept in a map and served back under `/uploads`.

use std::{collections::HashMap, env, net::SocketAddr, sync::Arc};

use axum::{
    extract::{DefaultBodyLimit, Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use uuid::Uuid;

pub mod error;
pub mod upload;

use error::{ServerError, ServerResult};
use upload::StoredUpload;

pub use upload::UploadResponse;

/// Public URL used for upload links when the router is built without a
/// listener, as in `oneshot` tests.
pub const DEFAULT_PUBLIC_URL: &str = "http://localhost:3001";

/// Multipart bodies are allowed past the upload limit so the handler can
/// answer 413 itself.
const BODY_LIMIT: usize = 10 * 1024 * 1024;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(rename = "_id")]
    pub id: String,
    pub full_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProfile {
    pub full_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub country: Option<String>,
    pub avatar_url: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfile {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub country: Option<String>,
    pub avatar_url: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Clone)]
pub struct AppState {
    profiles: Arc<RwLock<Vec<UserProfile>>>,
    uploads: Arc<RwLock<HashMap<String, StoredUpload>>>,
    public_url: Arc<str>,
}

impl AppState {
    pub fn new(public_url: &str) -> Self {
        Self {
            profiles: Arc::new(RwLock::new(Vec::new())),
            uploads: Arc::new(RwLock::new(HashMap::new())),
            public_url: Arc::from(public_url.trim_end_matches('/')),
        }
    }
}

/// Listener settings read from `HOST`, `PORT` and `PUBLIC_URL`.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origin used in upload links. Derived from the bound address when
    /// unset.
    pub public_url: Option<String>,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3001);
        let public_url = env::var("PUBLIC_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());
        Self {
            host,
            port,
            public_url,
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

pub fn app() -> Router {
    router(AppState::new(DEFAULT_PUBLIC_URL))
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/profiles", get(list_profiles).post(create_profile))
        .route("/profiles/{id}", patch(update_profile).delete(delete_profile))
        .route("/upload", post(upload::upload_file));

    Router::new()
        .nest("/api", api)
        .route("/uploads/{key}", get(upload::get_upload))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Origin a client can reach for a listener bound to `addr`. A wildcard
/// bind is not a usable host, so it is reported as `localhost`.
pub fn public_url_for(addr: SocketAddr) -> String {
    if addr.ip().is_unspecified() {
        format!("http://localhost:{}", addr.port())
    } else {
        format!("http://{addr}")
    }
}

/// Serves the API on `listener`; upload URLs point at its local address.
pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    let public_url = public_url_for(listener.local_addr()?);
    serve(listener, &public_url).await
}

/// Serves the API on `listener` with upload URLs under `public_url`.
pub async fn serve(listener: TcpListener, public_url: &str) -> Result<(), std::io::Error> {
    info!(%public_url, addr = %listener.local_addr()?, "profile API listening");
    axum::serve(listener, router(AppState::new(public_url))).await
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

async fn list_profiles(State(state): State<AppState>) -> Json<Vec<UserProfile>> {
    Json(state.profiles.read().await.clone())
}

async fn create_profile(
    State(state): State<AppState>,
    Json(input): Json<CreateProfile>,
) -> ServerResult<(StatusCode, Json<UserProfile>)> {
    if input.full_name.is_empty() || input.email.is_empty() {
        return Err(ServerError::BadRequest(
            "fullName and email are required".to_string(),
        ));
    }
    let timestamp = now();
    let profile = UserProfile {
        id: Uuid::new_v4().to_string(),
        full_name: input.full_name,
        email: input.email,
        phone_number: input.phone_number,
        country: input.country,
        avatar_url: input.avatar_url,
        is_active: input.is_active,
        created_at: timestamp.clone(),
        updated_at: timestamp,
    };
    info!(id = %profile.id, "created profile");
    state.profiles.write().await.push(profile.clone());
    Ok((StatusCode::CREATED, Json(profile)))
}

async fn update_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateProfile>,
) -> ServerResult<Json<UserProfile>> {
    let mut profiles = state.profiles.write().await;
    let profile = profiles
        .iter_mut()
        .find(|p| p.id == id)
        .ok_or(ServerError::NotFound)?;
    if let Some(full_name) = input.full_name {
        profile.full_name = full_name;
    }
    if let Some(email) = input.email {
        profile.email = email;
    }
    if let Some(phone_number) = input.phone_number {
        profile.phone_number = Some(phone_number);
    }
    if let Some(country) = input.country {
        profile.country = Some(country);
    }
    if let Some(avatar_url) = input.avatar_url {
        // An empty URL clears the avatar.
        profile.avatar_url = Some(avatar_url).filter(|url| !url.is_empty());
    }
    if let Some(is_active) = input.is_active {
        profile.is_active = is_active;
    }
    profile.updated_at = now();
    info!(%id, "updated profile");
    Ok(Json(profile.clone()))
}

async fn delete_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ServerResult<StatusCode> {
    let mut profiles = state.profiles.write().await;
    let index = profiles
        .iter()
        .position(|p| p.id == id)
        .ok_or(ServerError::NotFound)?;
    profiles.remove(index);
    info!(%id, "deleted profile");
    Ok(StatusCode::NO_CONTENT)
}
