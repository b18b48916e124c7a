use std::sync::Arc;
use std::time::Duration;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::LoginService;
use crate::http::response::ApiError;
use crate::resilience::{CircuitState, RequestContext};
use crate::users_api::TokenMinter;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub login: Arc<LoginService>,
    pub minter: TokenMinter,
    pub request_timeout: Duration,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(rename = "accessToken")]
    pub access_token: String,
}

#[derive(Debug, Serialize)]
pub struct BreakerStatus {
    pub name: String,
    pub state: CircuitState,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub breaker: BreakerStatus,
}

/// `POST /login`
pub async fn login_handler(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    // Dropping the handler (client went away) cancels the users API call.
    let ctx = RequestContext::with_timeout(state.request_timeout);
    let _cancel_on_drop = ctx.cancellation_token().clone().drop_guard();

    let identity = state
        .login
        .login(&ctx, &request.username, &request.password)
        .await?;

    let access_token = state.minter.mint_access_token(&identity).map_err(|e| {
        tracing::error!(error = %e, "Failed to mint access token");
        ApiError::Internal
    })?;

    Ok(Json(LoginResponse { access_token }))
}

/// `GET /health`
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let breaker = state.login.breaker();
    Json(HealthResponse {
        status: "ok",
        breaker: BreakerStatus {
            name: breaker.name().to_string(),
            state: breaker.state(),
        },
    })
}
