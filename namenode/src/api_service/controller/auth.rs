use std::sync::Arc;

use chrono::{DateTime, Utc};
use rocket::{State, post, serde::json::Json};
use serde::{Deserialize, Serialize};
use utilities::logger::{info, instrument, tracing};

use crate::{
    api_service::{SharedRecorder, middleware::auth::AuthenticatedUser},
    error::NamenodeError,
    ledger::recorder::Recorder,
    namenode_state::NamenodeState,
};

#[derive(Clone, Deserialize)]
pub struct Credentials {
    username: String,
    password: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct RegisterResponse {
    pub username: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LoginResponse {
    pub username: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LogoutResponse {
    pub logged_out: bool,
}

#[post("/register", data = "<body>")]
#[instrument(name = "api_register_user", skip_all, fields(username = %body.username))]
pub async fn register(
    body: Json<Credentials>,
    state: &State<Arc<NamenodeState>>,
    ledger: &State<SharedRecorder>,
) -> Result<Json<RegisterResponse>, NamenodeError> {
    state.register_user(&body.username, &body.password).await?;
    ledger.register_user(&body.username).await;
    info!("User registered");
    Ok(Json(RegisterResponse {
        username: body.into_inner().username,
    }))
}

#[post("/login", data = "<body>")]
#[instrument(name = "api_login", skip_all, fields(username = %body.username))]
pub async fn login(
    body: Json<Credentials>,
    state: &State<Arc<NamenodeState>>,
    ledger: &State<SharedRecorder>,
) -> Result<Json<LoginResponse>, NamenodeError> {
    let session = state.login(&body.username, &body.password).await?;
    ledger.login(&body.username).await;
    Ok(Json(LoginResponse {
        username: body.into_inner().username,
        token: session.token,
        expires_at: session.expires_at,
    }))
}

#[post("/logout")]
pub async fn logout(
    user: AuthenticatedUser,
    state: &State<Arc<NamenodeState>>,
) -> Json<LogoutResponse> {
    Json(LogoutResponse {
        logged_out: state.logout(&user.token).await,
    })
}
