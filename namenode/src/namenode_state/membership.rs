use std::{
    collections::{HashMap, HashSet},
    time::{Duration, Instant},
};

use crate::namenode_state::datanode_details::{
    DatanodeAnnouncement, DatanodeDetail, DatanodeStatus, HeartbeatReport,
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HeartbeatOutcome {
    Refreshed,
    /// the node had been swept to inactive and is active again
    Resurrected,
    /// heartbeat from a url never registered, it was registered on the spot
    SelfRegistered,
}

/// Registration and liveness of every datanode ever seen. Nodes are never evicted,
/// only demoted to inactive when their heartbeats stop.
#[derive(Debug)]
pub struct Membership {
    heartbeat_timeout: Duration,
    // urls in first registration order, keeps placement deterministic
    order: Vec<String>,
    datanode_to_detail_map: HashMap<String, DatanodeDetail>,
}

impl Membership {
    pub fn new(heartbeat_timeout: Duration) -> Self {
        Self {
            heartbeat_timeout,
            order: vec![],
            datanode_to_detail_map: HashMap::default(),
        }
    }

    /// Returns true when the url was not known before.
    pub fn register_datanode(&mut self, announcement: DatanodeAnnouncement, now: Instant) -> bool {
        match self.datanode_to_detail_map.get_mut(&announcement.url) {
            Some(datanode_details) => {
                datanode_details.reannounce(announcement, now);
                false
            }
            None => {
                self.order.push(announcement.url.clone());
                self.datanode_to_detail_map.insert(
                    announcement.url.clone(),
                    DatanodeDetail::new(announcement, now),
                );
                true
            }
        }
    }

    pub fn heartbeat(&mut self, report: HeartbeatReport, now: Instant) -> HeartbeatOutcome {
        let outcome = match self.datanode_to_detail_map.get_mut(&report.url) {
            Some(datanode_details) => {
                let was_active = datanode_details.is_active();
                datanode_details.mark_heartbeat(now);
                if was_active {
                    HeartbeatOutcome::Refreshed
                } else {
                    HeartbeatOutcome::Resurrected
                }
            }
            None => {
                self.register_datanode(
                    DatanodeAnnouncement {
                        url: report.url.clone(),
                        node_id: report.node_id.clone(),
                        capacity: report.capacity,
                    },
                    now,
                );
                HeartbeatOutcome::SelfRegistered
            }
        };
        if let Some(datanode_details) = self.datanode_to_detail_map.get_mut(&report.url) {
            datanode_details.sync_state(&report);
        }
        outcome
    }

    /// Demotes every node whose last heartbeat is older than the timeout, returns the demoted urls.
    pub fn sweep(&mut self, now: Instant) -> Vec<String> {
        let timeout = self.heartbeat_timeout;
        self.order
            .iter()
            .filter_map(|url| {
                let datanode_details = self.datanode_to_detail_map.get_mut(url)?;
                if datanode_details.is_active() && datanode_details.heartbeat_age(now) > timeout {
                    datanode_details.state = DatanodeStatus::Inactive;
                    return Some(url.clone());
                }
                None
            })
            .collect()
    }

    pub fn active_datanodes(&self) -> Vec<String> {
        self.datanodes()
            .filter(|datanode| datanode.is_active())
            .map(|datanode| datanode.url.clone())
            .collect()
    }

    pub fn active_set(&self) -> HashSet<String> {
        self.active_datanodes().into_iter().collect()
    }

    /// Every tracked node in registration order.
    pub fn datanodes(&self) -> impl Iterator<Item = &DatanodeDetail> {
        self.order
            .iter()
            .filter_map(|url| self.datanode_to_detail_map.get(url))
    }

    pub fn count_by_status(&self, status: DatanodeStatus) -> usize {
        self.datanode_to_detail_map
            .values()
            .filter(|datanode| datanode.state == status)
            .count()
    }
}
