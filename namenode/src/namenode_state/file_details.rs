use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockDescriptor {
    pub index: u64,
    pub block_id: String,
    pub datanode: String,
}

/// A file as the client announces it once every block has been uploaded
#[derive(Clone, Debug, Deserialize)]
pub struct FileRegistration {
    pub filename: String,
    pub size: u64,
    pub block_size: u64,
    #[serde(default)]
    pub blocks: Vec<BlockDescriptor>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FileEntry {
    pub path: String,
    pub owner: String,
    pub size: u64,
    pub block_size: u64,
    /// sorted by index, indices are `0..n`
    pub blocks: Vec<BlockDescriptor>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DirectoryEntry {
    pub path: String,
    pub owner: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ListingEntry {
    Directory {
        name: String,
        created_at: DateTime<Utc>,
    },
    File {
        name: String,
        size: u64,
        blocks: usize,
        block_size: u64,
        created_at: DateTime<Utc>,
    },
}

impl ListingEntry {
    pub fn name(&self) -> &str {
        match self {
            ListingEntry::Directory { name, .. } | ListingEntry::File { name, .. } => name,
        }
    }
}
