use std::sync::Arc;

use rocket::{State, get, serde::json::Json};
use serde::Serialize;

use crate::{
    api_service::middleware::auth::AuthenticatedUser,
    namenode_state::{NamenodeState, state_snapshot::SystemStatus},
};

#[derive(Debug, Serialize)]
pub struct NamenodeInfo {
    pub status: String,
    pub datanodes: Vec<String>,
    pub total_files: usize,
    pub total_users: usize,
}

#[get("/")]
pub async fn index(state: &State<Arc<NamenodeState>>) -> Json<NamenodeInfo> {
    Json(NamenodeInfo {
        status: "namenode alive".to_string(),
        datanodes: state.active_datanodes().await,
        total_files: state.total_files().await,
        total_users: state.total_users().await,
    })
}

#[get("/system_status")]
pub async fn system_status(
    user: AuthenticatedUser,
    state: &State<Arc<NamenodeState>>,
) -> Json<SystemStatus> {
    Json(state.system_status(&user.username).await)
}
