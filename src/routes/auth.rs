use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;

use crate::db::{auth_db, store};
use crate::models::identity::{Identity, IdentityMetadata};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    #[serde(rename = "redirectUrl")]
    pub redirect_url: Option<String>,
    #[serde(rename = "applicationId")]
    pub application_id: Option<String>,
}

/// Magic-link login. Mints an access/refresh token pair and emits the
/// callback link through the log; delivering it by mail is the platform's
/// concern, not this service's.
async fn login(State(state): State<AppState>, Json(req): Json<LoginRequest>) -> impl IntoResponse {
    let Some(email) = req.email.filter(|e| !e.is_empty()) else {
        return (StatusCode::BAD_REQUEST, "Email not provided in request").into_response();
    };

    if req.application_id.as_deref() != Some(state.config.application_id.as_str()) {
        return (StatusCode::BAD_REQUEST, "Unknown application").into_response();
    }

    let access = store::new_guid();
    let refresh = store::new_guid();

    for (token, kind) in [(&access, auth_db::KIND_ACCESS), (&refresh, auth_db::KIND_REFRESH)] {
        if let Err(e) = auth_db::insert_token(&state.db, token, &email, kind).await {
            tracing::error!("Failed to store login token: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    }

    let redirect_url = req.redirect_url.unwrap_or_default();
    tracing::info!(
        "Magic link for {}: {}#token={}&refresh={}",
        email,
        redirect_url,
        access,
        refresh
    );

    Json(json!({ "message": "Check your email for a magic link to sign in!" })).into_response()
}

/// Extracts the credential from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
}

async fn whoami(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let Some(token) = bearer_token(&headers) else {
        return (StatusCode::UNAUTHORIZED, "Missing bearer token").into_response();
    };

    match auth_db::email_for_token(&state.db, token).await {
        Ok(Some(email)) => Json(Identity {
            id: email.clone(),
            metadata: IdentityMetadata { email },
        })
        .into_response(),
        Ok(None) => (StatusCode::UNAUTHORIZED, "Invalid or expired token").into_response(),
        Err(e) => {
            tracing::error!("Failed to resolve token: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/identity/whoami", get(whoami))
}
