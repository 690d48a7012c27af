use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DatanodeStatus {
    Active,
    Inactive,
}

/// What a datanode tells about itself when it registers
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DatanodeAnnouncement {
    pub url: String,
    pub node_id: String,
    #[serde(default)]
    pub capacity: u64,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct HeartbeatReport {
    pub url: String,
    pub node_id: String,
    #[serde(default)]
    pub block_count: u64,
    #[serde(default)]
    pub capacity: u64,
}

#[derive(Debug, Clone)]
pub struct DatanodeDetail {
    pub url: String,
    pub node_id: String,
    pub capacity: u64,
    pub registered_at: DateTime<Utc>,
    pub block_count: u64,
    pub hearbeat_instant: Instant,
    pub state: DatanodeStatus,
}

impl DatanodeDetail {
    pub fn new(announcement: DatanodeAnnouncement, now: Instant) -> Self {
        Self {
            url: announcement.url,
            node_id: announcement.node_id,
            capacity: announcement.capacity,
            registered_at: Utc::now(),
            block_count: 0,
            hearbeat_instant: now,
            state: DatanodeStatus::Active,
        }
    }
    pub fn reannounce(&mut self, announcement: DatanodeAnnouncement, now: Instant) {
        self.node_id = announcement.node_id;
        self.capacity = announcement.capacity;
        self.registered_at = Utc::now();
        self.mark_heartbeat(now);
    }
    pub fn mark_heartbeat(&mut self, now: Instant) {
        self.hearbeat_instant = now;
        self.state = DatanodeStatus::Active;
    }
    pub fn sync_state(&mut self, report: &HeartbeatReport) {
        self.node_id = report.node_id.clone();
        self.block_count = report.block_count;
        self.capacity = report.capacity;
    }
    pub fn is_active(&self) -> bool {
        self.state == DatanodeStatus::Active
    }
    pub fn heartbeat_age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.hearbeat_instant)
    }
}
