use std::io::Cursor;

use rocket::{
    Data, State,
    data::ToByteUnit,
    get,
    http::ContentType,
    post,
    response::stream::{One, ReaderStream},
    serde::json::Json,
};
use serde::Serialize;
use storage::{block_key::validate_block_id, file_storage::FileStorage, storage::Storage};
use utilities::logger::{error, info, instrument, tracing};

use crate::{api_service::NodeSettings, error::DatanodeError, node_report::collect_report};

type BlockReader = Box<dyn tokio::io::AsyncRead + Unpin + Send>;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub block_id: String,
    pub size: u64,
    pub checksum: String,
}

#[derive(Debug, Serialize)]
pub struct ExistsResponse {
    pub exists: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub node_id: String,
    pub total_blocks: u64,
    pub total_size: u64,
    pub free_space: u64,
}

fn checked_id(block_id: &str) -> Result<&str, DatanodeError> {
    validate_block_id(block_id).map_err(|e| DatanodeError::InvalidBlockId(e.to_string()))
}

fn storage_error(e: impl std::fmt::Display) -> DatanodeError {
    error!(error = %e, "Storage failure");
    DatanodeError::Storage(e.to_string())
}

#[post("/upload_block/<block_id>", data = "<data>")]
#[instrument(name = "api_upload_block", skip(data, store, settings))]
pub async fn upload_block(
    block_id: &str,
    data: Data<'_>,
    store: &State<FileStorage>,
    settings: &State<NodeSettings>,
) -> Result<Json<UploadResponse>, DatanodeError> {
    let block_id = checked_id(block_id)?;
    let body = data
        .open(settings.max_block_size.bytes())
        .into_bytes()
        .await
        .map_err(storage_error)?;
    if !body.is_complete() {
        return Err(DatanodeError::TooLarge(settings.max_block_size));
    }
    let stored = store
        .write(block_id, &mut Cursor::new(body.into_inner()))
        .await
        .map_err(storage_error)?;
    info!(size = stored.size, "Block stored");
    Ok(Json(UploadResponse {
        block_id: block_id.to_owned(),
        size: stored.size,
        checksum: stored.checksum,
    }))
}

/// Also answers HEAD, which the namenode uses as an existence probe
#[get("/block/<block_id>")]
#[instrument(name = "api_get_block", skip(store))]
pub async fn get_block(
    block_id: &str,
    store: &State<FileStorage>,
) -> Result<(ContentType, ReaderStream<One<BlockReader>>), DatanodeError> {
    let block_id = checked_id(block_id)?;
    match store.read(block_id).await.map_err(storage_error)? {
        Some(reader) => Ok((ContentType::Binary, ReaderStream::one(reader))),
        None => Err(DatanodeError::NotFound(block_id.to_owned())),
    }
}

#[get("/exists/<block_id>")]
pub async fn exists(
    block_id: &str,
    store: &State<FileStorage>,
) -> Result<Json<ExistsResponse>, DatanodeError> {
    let block_id = checked_id(block_id)?;
    Ok(Json(ExistsResponse {
        exists: store.exists(block_id).await.map_err(storage_error)?,
    }))
}

async fn health_report(
    store: &FileStorage,
    settings: &NodeSettings,
) -> Result<Json<HealthResponse>, DatanodeError> {
    let report = collect_report(store, settings.capacity_override)
        .await
        .map_err(storage_error)?;
    Ok(Json(HealthResponse {
        status: "datanode alive".to_string(),
        node_id: settings.node_id.clone(),
        total_blocks: report.total_blocks,
        total_size: report.total_size,
        free_space: report.free_space,
    }))
}

#[get("/")]
pub async fn index(
    store: &State<FileStorage>,
    settings: &State<NodeSettings>,
) -> Result<Json<HealthResponse>, DatanodeError> {
    health_report(store, settings).await
}

#[get("/health")]
pub async fn health(
    store: &State<FileStorage>,
    settings: &State<NodeSettings>,
) -> Result<Json<HealthResponse>, DatanodeError> {
    health_report(store, settings).await
}
