use std::{sync::Arc, time::Duration};

use futures::future::join_all;
use serde::Serialize;
use tokio::time::timeout;
use utilities::logger::{instrument, tracing, warn};

use crate::{
    datanode::service::BlockProber, error::NamenodeError,
    namenode_state::NamenodeState,
};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MissingBlock {
    pub index: u64,
    pub block_id: String,
    pub datanode: String,
    pub reason: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FileHealth {
    pub path: String,
    pub total_blocks: usize,
    pub missing_blocks: Vec<MissingBlock>,
    pub healthy: bool,
    pub integrity_score: f64,
}

impl FileHealth {
    fn new(path: String, total_blocks: usize, missing_blocks: Vec<MissingBlock>) -> Self {
        let missing = missing_blocks.len();
        let integrity_score = if total_blocks == 0 {
            100.0
        } else {
            (total_blocks - missing) as f64 / total_blocks as f64 * 100.0
        };
        Self {
            path,
            total_blocks,
            healthy: missing == 0,
            missing_blocks,
            integrity_score,
        }
    }
}

pub struct IntegrityVerifier {
    prober: Arc<dyn BlockProber + Send + Sync>,
    probe_timeout: Duration,
}

impl IntegrityVerifier {
    pub fn new(prober: Arc<dyn BlockProber + Send + Sync>, probe_timeout: Duration) -> Self {
        Self {
            prober,
            probe_timeout,
        }
    }

    /// Probes every block at once; returns after the slowest probe finished or timed out.
    #[instrument(name = "integrity_check_health", skip(self, state))]
    pub async fn check_health(
        &self,
        state: &NamenodeState,
        owner: &str,
        path: &str,
    ) -> Result<FileHealth, NamenodeError> {
        // the entry is cloned so no lock is held across network calls
        let entry = state.get_file(owner, path).await?;
        let probes = entry.blocks.iter().map(|block| async move {
            let outcome = timeout(
                self.probe_timeout,
                self.prober.probe_block(&block.datanode, &block.block_id),
            )
            .await;
            let failure = match outcome {
                Ok(Ok(())) => return None,
                Ok(Err(e)) => e,
                Err(_) => NamenodeError::Unreachable(format!(
                    "probe timed out after {:?}",
                    self.probe_timeout
                )),
            };
            let reason = format!("{}: {failure}", failure.kind());
            warn!(block_id = %block.block_id, datanode = %block.datanode, %reason, "Block unreachable");
            Some(MissingBlock {
                index: block.index,
                block_id: block.block_id.clone(),
                datanode: block.datanode.clone(),
                reason,
            })
        });
        let missing: Vec<MissingBlock> = join_all(probes).await.into_iter().flatten().collect();
        Ok(FileHealth::new(entry.path, entry.blocks.len(), missing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namenode_state::tests::{announce, registration, test_state};
    use async_trait::async_trait;
    use std::{collections::HashMap, time::Instant};

    enum Behaviour {
        Present,
        Missing,
        Stall,
    }

    /// Answers per datanode after a fixed delay
    struct FakeProber {
        delay: Duration,
        behaviour: HashMap<String, Behaviour>,
    }
    #[async_trait]
    impl BlockProber for FakeProber {
        async fn probe_block(&self, datanode: &str, _block_id: &str) -> Result<(), NamenodeError> {
            tokio::time::sleep(self.delay).await;
            match self.behaviour.get(datanode) {
                Some(Behaviour::Present) => Ok(()),
                Some(Behaviour::Stall) => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(())
                }
                Some(Behaviour::Missing) | None => Err(NamenodeError::Unreachable(format!(
                    "datanode {datanode} answered 404 Not Found"
                ))),
            }
        }
    }

    async fn state_with_file(placements: &[&str]) -> NamenodeState {
        let state = test_state();
        for url in placements {
            state.register_datanode(announce(url)).await;
        }
        let placements: Vec<String> = placements.iter().map(|s| s.to_string()).collect();
        let mut reg = registration("/f.bin", &placements);
        reg.size = placements.len() as u64 * 4;
        state.register_file("alice", reg).await.unwrap();
        state
    }

    #[tokio::test]
    async fn score_counts_missing_blocks() {
        let state = state_with_file(&["http://n1", "http://n2", "http://n1", "http://n2"]).await;
        let prober = FakeProber {
            delay: Duration::ZERO,
            behaviour: HashMap::from([
                ("http://n1".to_string(), Behaviour::Present),
                ("http://n2".to_string(), Behaviour::Missing),
            ]),
        };
        let verifier = IntegrityVerifier::new(Arc::new(prober), Duration::from_millis(200));
        let health = verifier.check_health(&state, "alice", "f.bin").await.unwrap();
        assert_eq!(health.total_blocks, 4);
        assert!(!health.healthy);
        assert_eq!(health.integrity_score, 50.0);
        let indices: Vec<u64> = health.missing_blocks.iter().map(|m| m.index).collect();
        assert_eq!(indices, vec![1, 3]);
        assert!(health
            .missing_blocks
            .iter()
            .all(|m| m.reason.starts_with("Unreachable: ")));
    }

    #[tokio::test]
    async fn probes_run_concurrently_with_independent_timeouts() {
        let placements = ["http://slow"; 10];
        let state = state_with_file(&placements).await;
        let prober = FakeProber {
            delay: Duration::from_millis(100),
            behaviour: HashMap::from([("http://slow".to_string(), Behaviour::Stall)]),
        };
        let verifier = IntegrityVerifier::new(Arc::new(prober), Duration::from_millis(300));
        let started = Instant::now();
        let health = verifier.check_health(&state, "alice", "/f.bin").await.unwrap();
        // sequential probing would need ten timeouts
        assert!(started.elapsed() < Duration::from_millis(1500));
        assert_eq!(health.missing_blocks.len(), 10);
        assert_eq!(health.integrity_score, 0.0);
        assert!(health.missing_blocks[0].reason.starts_with("Unreachable: probe timed out"));
    }

    #[tokio::test]
    async fn healthy_file_scores_full() {
        let state = state_with_file(&["http://n1", "http://n1"]).await;
        let prober = FakeProber {
            delay: Duration::from_millis(10),
            behaviour: HashMap::from([("http://n1".to_string(), Behaviour::Present)]),
        };
        let verifier = IntegrityVerifier::new(Arc::new(prober), Duration::from_millis(500));
        let health = verifier.check_health(&state, "alice", "/f.bin").await.unwrap();
        assert!(health.healthy);
        assert_eq!(health.integrity_score, 100.0);
    }

    #[tokio::test]
    async fn unknown_file_is_not_found() {
        let state = test_state();
        let verifier = IntegrityVerifier::new(
            Arc::new(FakeProber {
                delay: Duration::ZERO,
                behaviour: HashMap::new(),
            }),
            Duration::from_millis(100),
        );
        let result = verifier.check_health(&state, "alice", "/nope").await;
        assert!(matches!(result, Err(NamenodeError::NotFound(_))));
    }
}
