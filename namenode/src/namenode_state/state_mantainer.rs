use std::{path::Path, sync::Arc, time::Duration};

use tokio::{sync::mpsc::Sender, time::interval};
use utilities::{
    logger::{Instrument, Level, debug, error, span, warn},
    result::Result,
    state_logger::StateLogger,
};

use crate::{
    ledger::recorder::Recorder,
    namenode_state::{NamenodeState, state_snapshot::MembershipSnapshot},
};

/// Periodically demotes silent datanodes and drops expired sessions
pub struct StateMantainer {
    namenode_state: Arc<NamenodeState>,
    ledger: Arc<dyn Recorder + Send + Sync>,
    sweep_interval: Duration,
    snapshot_sender: Option<Sender<MembershipSnapshot>>,
}

impl StateMantainer {
    pub fn new(
        namenode_state: Arc<NamenodeState>,
        ledger: Arc<dyn Recorder + Send + Sync>,
        sweep_interval: Duration,
    ) -> Self {
        Self {
            namenode_state,
            ledger,
            sweep_interval,
            snapshot_sender: None,
        }
    }

    pub async fn with_state_log(mut self, state_log_file: &Path) -> Result<Self> {
        let sender =
            StateLogger::<MembershipSnapshot, MembershipSnapshot>::start(state_log_file).await?;
        self.snapshot_sender = Some(sender);
        Ok(self)
    }

    pub async fn sweep_once(&self) -> Vec<String> {
        let demoted = self.namenode_state.sweep_datanodes().await;
        for url in demoted.iter() {
            warn!(datanode = %url, "Datanode missed heartbeats, marking inactive");
            self.ledger.datanode_inactive(url).await;
        }
        let purged = self.namenode_state.purge_expired_sessions().await;
        if purged > 0 {
            debug!(purged, "Removed expired sessions");
        }
        if let Some(sender) = self.snapshot_sender.as_ref() {
            let snapshot = self.namenode_state.membership_snapshot().await;
            if let Err(e) = sender.send(snapshot).await {
                error!(error = %e, "Error while sending snapshot to state logger");
            }
        }
        demoted
    }

    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(self.sweep_interval);
            // first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let span = span!(Level::INFO, "namenode_liveness_sweep");
                self.sweep_once().instrument(span).await;
            }
        })
    }
}
