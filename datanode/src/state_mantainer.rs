use std::time::Duration;

use storage::file_storage::FileStorage;
use tokio::{task::JoinHandle, time::interval};
use utilities::logger::{Instrument, Level, error, info, span};

use crate::{namenode::service::NamenodeService, node_report::collect_report};

/// Sends one heartbeat per period; a failed beat is logged and the next one goes out on schedule
pub struct StateMantainer {
    store: FileStorage,
    namenode_service: NamenodeService,
    capacity_override: Option<u64>,
}
impl StateMantainer {
    pub fn new(
        store: FileStorage,
        namenode_service: NamenodeService,
        capacity_override: Option<u64>,
    ) -> Self {
        Self {
            store,
            namenode_service,
            capacity_override,
        }
    }

    async fn beat(&self) {
        let report = match collect_report(&self.store, self.capacity_override).await {
            Ok(v) => v,
            Err(e) => {
                error!("Skipping heartbeat : Error while collecting the storage report {e}");
                return;
            }
        };
        match self
            .namenode_service
            .send_heart_beat(report.total_blocks, report.free_space)
            .await
        {
            Ok(status) if status != "ok" => info!(%status, "Namenode acknowledged heartbeat"),
            Ok(_) => {}
            Err(e) => error!(error = %e, "Error while sending heartbeat to namenode"),
        }
    }

    pub fn start_heartbeat_loop(self, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(period);
            loop {
                ticker.tick().await;
                let span = span!(Level::DEBUG, "datanode_heartbeat");
                self.beat().instrument(span).await;
            }
        })
    }
}
