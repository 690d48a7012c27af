use std::sync::Arc;

use rocket::{State, delete, get, post, serde::json::Json};
use serde::Serialize;
use utilities::logger::{info, instrument, tracing};

use crate::{
    api_service::{
        SharedRecorder,
        middleware::{auth::AuthenticatedUser, namespace_path::NamespacePath},
    },
    error::NamenodeError,
    ledger::recorder::Recorder,
    integrity_verifier::{FileHealth, IntegrityVerifier},
    namenode_state::{
        NamenodeState,
        file_details::{DirectoryEntry, FileEntry, FileRegistration, ListingEntry},
        path::normalize,
    },
};

#[derive(Debug, Serialize)]
pub struct RemovedFile {
    pub path: String,
    pub orphaned_blocks: usize,
}

#[derive(Debug, Serialize)]
pub struct RemovedDirectory {
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct Listing {
    pub path: String,
    pub items: Vec<ListingEntry>,
}

#[post("/register_file", data = "<body>")]
#[instrument(name = "api_register_file", skip_all, fields(owner = %user.username, filename = %body.filename))]
pub async fn register_file(
    user: AuthenticatedUser,
    body: Json<FileRegistration>,
    state: &State<Arc<NamenodeState>>,
    ledger: &State<SharedRecorder>,
) -> Result<Json<FileEntry>, NamenodeError> {
    let entry = state.register_file(&user.username, body.into_inner()).await?;
    ledger
        .store_file(&user.username, &entry.path, entry.size, entry.blocks.len())
        .await;
    info!(blocks = entry.blocks.len(), "File registered");
    Ok(Json(entry))
}

#[get("/file/<path..>")]
#[instrument(name = "api_get_file", skip_all, fields(owner = %user.username, path = %path.0))]
pub async fn get_file(
    user: AuthenticatedUser,
    path: NamespacePath,
    state: &State<Arc<NamenodeState>>,
) -> Result<Json<FileEntry>, NamenodeError> {
    Ok(Json(state.get_file(&user.username, &path.0).await?))
}

#[delete("/rm/<path..>")]
#[instrument(name = "api_remove_file", skip_all, fields(owner = %user.username, path = %path.0))]
pub async fn remove_file(
    user: AuthenticatedUser,
    path: NamespacePath,
    state: &State<Arc<NamenodeState>>,
    ledger: &State<SharedRecorder>,
) -> Result<Json<RemovedFile>, NamenodeError> {
    let orphaned_blocks = state.remove_file(&user.username, &path.0).await?;
    ledger.delete_file(&user.username, &path.0, orphaned_blocks).await;
    Ok(Json(RemovedFile {
        path: path.0,
        orphaned_blocks,
    }))
}

#[post("/mkdir/<path..>")]
#[instrument(name = "api_mkdir", skip_all, fields(owner = %user.username, path = %path.0))]
pub async fn mkdir(
    user: AuthenticatedUser,
    path: NamespacePath,
    state: &State<Arc<NamenodeState>>,
    ledger: &State<SharedRecorder>,
) -> Result<Json<DirectoryEntry>, NamenodeError> {
    let entry = state.mkdir(&user.username, &path.0).await?;
    ledger.mkdir(&user.username, &entry.path).await;
    Ok(Json(entry))
}

#[delete("/rmdir/<path..>")]
#[instrument(name = "api_rmdir", skip_all, fields(owner = %user.username, path = %path.0))]
pub async fn rmdir(
    user: AuthenticatedUser,
    path: NamespacePath,
    state: &State<Arc<NamenodeState>>,
    ledger: &State<SharedRecorder>,
) -> Result<Json<RemovedDirectory>, NamenodeError> {
    state.rmdir(&user.username, &path.0).await?;
    ledger.rmdir(&user.username, &path.0).await;
    Ok(Json(RemovedDirectory { path: path.0 }))
}

#[get("/ls?<path>")]
#[instrument(name = "api_list", skip_all, fields(owner = %user.username))]
pub async fn list(
    user: AuthenticatedUser,
    path: Option<String>,
    state: &State<Arc<NamenodeState>>,
) -> Result<Json<Listing>, NamenodeError> {
    let path = normalize(path.as_deref().unwrap_or("/"));
    let items = state.list(&user.username, &path).await?;
    Ok(Json(Listing { path, items }))
}

#[get("/file_health/<path..>")]
#[instrument(name = "api_file_health", skip_all, fields(owner = %user.username, path = %path.0))]
pub async fn file_health(
    user: AuthenticatedUser,
    path: NamespacePath,
    state: &State<Arc<NamenodeState>>,
    verifier: &State<IntegrityVerifier>,
) -> Result<Json<FileHealth>, NamenodeError> {
    let health = verifier.check_health(state, &user.username, &path.0).await?;
    Ok(Json(health))
}
