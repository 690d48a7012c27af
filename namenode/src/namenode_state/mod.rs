pub mod datanode_details;
pub mod file_details;
pub mod membership;
pub mod namespace;
pub mod path;
pub mod state_mantainer;
pub mod state_snapshot;
pub mod users;

use std::time::{Duration, Instant};

use chrono::{TimeDelta, Utc};
use tokio::sync::Mutex;

use crate::{
    error::NamenodeError,
    namenode_state::{
        datanode_details::{DatanodeAnnouncement, DatanodeStatus, HeartbeatReport},
        file_details::{DirectoryEntry, FileEntry, FileRegistration, ListingEntry},
        membership::{HeartbeatOutcome, Membership},
        namespace::Namespace,
        state_snapshot::{
            DatanodeCounts, DatanodeReport, DatanodeStateSnapshot, MembershipSnapshot,
            StorageCounts, SystemHealth, SystemStatus, UserCounts,
        },
        users::{IssuedSession, UserRegistry},
    },
};

/// Reads the tokio clock so paused-time tests drive liveness
fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}

#[derive(Clone, Debug)]
pub struct StateSettings {
    pub heartbeat_timeout: Duration,
    pub session_ttl: Duration,
    pub min_password_len: usize,
}

/// All NameNode metadata. Each component sits behind its own lock so heartbeats never wait on
/// namespace mutations; a namespace mutation is a single critical section.
#[derive(Debug)]
pub struct NamenodeState {
    namespace: Mutex<Namespace>,
    membership: Mutex<Membership>,
    users: Mutex<UserRegistry>,
}

impl NamenodeState {
    pub fn new(settings: StateSettings) -> Self {
        let session_ttl = TimeDelta::from_std(settings.session_ttl).unwrap_or(TimeDelta::MAX);
        Self {
            namespace: Mutex::new(Namespace::new()),
            membership: Mutex::new(Membership::new(settings.heartbeat_timeout)),
            users: Mutex::new(UserRegistry::new(session_ttl, settings.min_password_len)),
        }
    }

    // users
    pub async fn register_user(&self, username: &str, password: &str) -> Result<(), NamenodeError> {
        self.users.lock().await.register(username, password)
    }
    pub async fn login(&self, username: &str, password: &str) -> Result<IssuedSession, NamenodeError> {
        self.users.lock().await.login(username, password, Utc::now())
    }
    pub async fn logout(&self, token: &str) -> bool {
        self.users.lock().await.logout(token)
    }
    pub async fn authenticated_user(&self, token: &str) -> Result<String, NamenodeError> {
        self.users.lock().await.authenticate(token, Utc::now())
    }
    pub async fn purge_expired_sessions(&self) -> usize {
        self.users.lock().await.purge_expired(Utc::now())
    }

    // membership
    pub async fn register_datanode(&self, announcement: DatanodeAnnouncement) -> bool {
        self.membership
            .lock()
            .await
            .register_datanode(announcement, now())
    }
    pub async fn heartbeat(&self, report: HeartbeatReport) -> HeartbeatOutcome {
        self.membership.lock().await.heartbeat(report, now())
    }
    pub async fn active_datanodes(&self) -> Vec<String> {
        self.membership.lock().await.active_datanodes()
    }
    pub async fn sweep_datanodes(&self) -> Vec<String> {
        self.membership.lock().await.sweep(now())
    }
    pub async fn datanode_reports(&self) -> Vec<DatanodeReport> {
        let now = now();
        self.membership
            .lock()
            .await
            .datanodes()
            .map(|datanode| DatanodeReport::new(datanode, now))
            .collect()
    }
    pub async fn membership_snapshot(&self) -> MembershipSnapshot {
        MembershipSnapshot {
            timestamp: Utc::now(),
            datanodes: self
                .membership
                .lock()
                .await
                .datanodes()
                .map(DatanodeStateSnapshot::from)
                .collect(),
        }
    }

    // namespace
    pub async fn mkdir(&self, owner: &str, path: &str) -> Result<DirectoryEntry, NamenodeError> {
        self.namespace.lock().await.mkdir(owner, path)
    }
    pub async fn rmdir(&self, owner: &str, path: &str) -> Result<(), NamenodeError> {
        self.namespace.lock().await.rmdir(owner, path)
    }
    pub async fn register_file(
        &self,
        owner: &str,
        registration: FileRegistration,
    ) -> Result<FileEntry, NamenodeError> {
        let active = self.membership.lock().await.active_set();
        self.namespace
            .lock()
            .await
            .register_file(owner, registration, &active)
    }
    pub async fn get_file(&self, owner: &str, path: &str) -> Result<FileEntry, NamenodeError> {
        self.namespace.lock().await.get_file(owner, path)
    }
    pub async fn remove_file(&self, owner: &str, path: &str) -> Result<usize, NamenodeError> {
        self.namespace.lock().await.remove_file(owner, path)
    }
    pub async fn list(&self, owner: &str, path: &str) -> Result<Vec<ListingEntry>, NamenodeError> {
        self.namespace.lock().await.list(owner, path)
    }

    // aggregates
    pub async fn total_files(&self) -> usize {
        self.namespace.lock().await.total_stats().files
    }
    pub async fn total_users(&self) -> usize {
        self.users.lock().await.user_count()
    }
    pub async fn system_status(&self, owner: &str) -> SystemStatus {
        let (active, inactive) = {
            let membership = self.membership.lock().await;
            (
                membership.count_by_status(DatanodeStatus::Active),
                membership.count_by_status(DatanodeStatus::Inactive),
            )
        };
        let (total, own) = {
            let namespace = self.namespace.lock().await;
            (namespace.total_stats(), namespace.owner_stats(owner))
        };
        let status = match (active, inactive) {
            (0, _) => "unavailable",
            (_, 0) => "healthy",
            _ => "degraded",
        };
        SystemStatus {
            system: SystemHealth {
                status: status.to_string(),
            },
            datanodes: DatanodeCounts {
                active,
                inactive,
                total: active + inactive,
            },
            storage: StorageCounts {
                total_files: total.files,
                total_blocks: total.blocks,
            },
            user_stats: UserCounts {
                files: own.files,
                directories: own.directories,
            },
        }
    }
}
