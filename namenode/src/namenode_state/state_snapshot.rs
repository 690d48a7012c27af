use crate::namenode_state::datanode_details::{DatanodeDetail, DatanodeStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Instant;

#[derive(Clone, Debug, Hash, PartialEq, Serialize)]
pub struct DatanodeStateSnapshot {
    pub url: String,
    pub node_id: String,
    pub status: DatanodeStatus,
    pub capacity: u64,
    pub block_count: u64,
}

impl From<&DatanodeDetail> for DatanodeStateSnapshot {
    fn from(value: &DatanodeDetail) -> Self {
        Self {
            url: value.url.clone(),
            node_id: value.node_id.clone(),
            status: value.state,
            capacity: value.capacity,
            block_count: value.block_count,
        }
    }
}

/// Membership as written to the state log after every sweep
#[derive(Clone, Debug, Serialize)]
pub struct MembershipSnapshot {
    pub timestamp: DateTime<Utc>,
    pub datanodes: Vec<DatanodeStateSnapshot>,
}

impl PartialEq for MembershipSnapshot {
    fn eq(&self, other: &Self) -> bool {
        self.datanodes == other.datanodes
    }
}

/// One row of `/datanodes/detailed`
#[derive(Clone, Debug, Serialize)]
pub struct DatanodeReport {
    pub url: String,
    pub node_id: String,
    pub status: DatanodeStatus,
    pub capacity: u64,
    pub total_blocks: u64,
    pub last_heartbeat_secs_ago: u64,
    pub registered_at: DateTime<Utc>,
}

impl DatanodeReport {
    pub fn new(value: &DatanodeDetail, now: Instant) -> Self {
        Self {
            url: value.url.clone(),
            node_id: value.node_id.clone(),
            status: value.state,
            capacity: value.capacity,
            total_blocks: value.block_count,
            last_heartbeat_secs_ago: value.heartbeat_age(now).as_secs(),
            registered_at: value.registered_at,
        }
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct SystemHealth {
    pub status: String,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct DatanodeCounts {
    pub active: usize,
    pub inactive: usize,
    pub total: usize,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct StorageCounts {
    pub total_files: usize,
    pub total_blocks: usize,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct UserCounts {
    pub files: usize,
    pub directories: usize,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct SystemStatus {
    pub system: SystemHealth,
    pub datanodes: DatanodeCounts,
    pub storage: StorageCounts,
    pub user_stats: UserCounts,
}
