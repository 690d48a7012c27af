use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub detail: String,
}

#[derive(Debug, Serialize)]
pub struct Credentials<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct RegisterResponse {
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub username: String,
    pub token: String,
    pub expires_at: String,
}

#[derive(Debug, Deserialize)]
pub struct LogoutResponse {
    pub logged_out: bool,
}

#[derive(Debug, Deserialize)]
pub struct NamenodeInfo {
    pub status: String,
    pub datanodes: Vec<String>,
    pub total_files: usize,
    pub total_users: usize,
}

#[derive(Debug, Deserialize)]
pub struct PlacementResponse {
    pub placements: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct BlockDescriptor {
    pub index: u64,
    pub block_id: String,
    pub datanode: String,
}

#[derive(Debug, Serialize)]
pub struct FileRegistration {
    pub filename: String,
    pub size: u64,
    pub block_size: u64,
    pub blocks: Vec<BlockDescriptor>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct FileEntry {
    pub path: String,
    pub size: u64,
    pub block_size: u64,
    pub blocks: Vec<BlockDescriptor>,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct DirectoryEntry {
    pub path: String,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ListingEntry {
    Directory {
        name: String,
        created_at: String,
    },
    File {
        name: String,
        size: u64,
        blocks: usize,
        block_size: u64,
        created_at: String,
    },
}

#[derive(Debug, Deserialize)]
pub struct Listing {
    pub path: String,
    pub items: Vec<ListingEntry>,
}

#[derive(Debug, Deserialize)]
pub struct RemovedFile {
    pub path: String,
    pub orphaned_blocks: usize,
}

#[derive(Debug, Deserialize)]
pub struct RemovedDirectory {
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct MissingBlock {
    pub index: u64,
    pub block_id: String,
    pub datanode: String,
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct FileHealth {
    pub path: String,
    pub total_blocks: usize,
    pub missing_blocks: Vec<MissingBlock>,
    pub healthy: bool,
    pub integrity_score: f64,
}

#[derive(Debug, Deserialize)]
pub struct SystemHealth {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct DatanodeCounts {
    pub active: usize,
    pub inactive: usize,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
pub struct StorageCounts {
    pub total_files: usize,
    pub total_blocks: usize,
}

#[derive(Debug, Deserialize)]
pub struct UserCounts {
    pub files: usize,
    pub directories: usize,
}

#[derive(Debug, Deserialize)]
pub struct SystemStatus {
    pub system: SystemHealth,
    pub datanodes: DatanodeCounts,
    pub storage: StorageCounts,
    pub user_stats: UserCounts,
}

#[derive(Debug, Deserialize)]
pub struct DatanodeList {
    pub datanodes: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct DatanodeReport {
    pub url: String,
    pub node_id: String,
    pub status: String,
    pub capacity: u64,
    pub total_blocks: u64,
    pub last_heartbeat_secs_ago: u64,
    pub registered_at: String,
}

#[derive(Debug, Deserialize)]
pub struct DetailedDatanodeList {
    pub datanodes: Vec<DatanodeReport>,
}
