use super::selection_policy::DatanodeSelectionPolicy;
use crate::{error::NamenodeError, namenode_state::NamenodeState};
use async_trait::async_trait;
use std::sync::Arc;
use utilities::logger::{instrument, tracing};

/// Block `i` goes to `active[i % active.len()]`
pub fn round_robin(active: &[String], block_count: usize) -> Result<Vec<String>, NamenodeError> {
    if active.is_empty() {
        return Err(NamenodeError::NoActiveNodes);
    }
    Ok((0..block_count)
        .map(|index| active[index % active.len()].clone())
        .collect())
}

pub struct RoundRobinSelectionPolicy {
    namenode_state: Arc<NamenodeState>,
    max_blocks: usize,
}
impl RoundRobinSelectionPolicy {
    pub fn new(namenode_state: Arc<NamenodeState>, max_blocks: usize) -> Self {
        Self {
            namenode_state,
            max_blocks,
        }
    }
}

#[async_trait]
impl DatanodeSelectionPolicy for RoundRobinSelectionPolicy {
    #[instrument(name = "policy_datanode_selection_to_store", skip(self))]
    async fn get_datanodes_to_store(
        &self,
        block_count: usize,
    ) -> Result<Vec<String>, NamenodeError> {
        if block_count > self.max_blocks {
            return Err(NamenodeError::InvalidRequest(format!(
                "placement for {block_count} blocks exceeds the limit of {}",
                self.max_blocks
            )));
        }
        let active = self.namenode_state.active_datanodes().await;
        round_robin(&active, block_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namenode_state::tests::{announce, test_state};

    #[test]
    fn block_i_lands_on_i_mod_k() {
        let active: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        for n in 0..10 {
            let plan = round_robin(&active, n).unwrap();
            assert_eq!(plan.len(), n);
            for (i, url) in plan.iter().enumerate() {
                assert_eq!(url, &active[i % 3]);
            }
        }
    }

    #[test]
    fn empty_active_set_is_rejected() {
        assert_eq!(round_robin(&[], 3), Err(NamenodeError::NoActiveNodes));
        assert_eq!(round_robin(&[], 0), Err(NamenodeError::NoActiveNodes));
    }

    #[tokio::test]
    async fn policy_follows_registration_order() {
        let state = Arc::new(test_state());
        state.register_datanode(announce("http://n1")).await;
        state.register_datanode(announce("http://n2")).await;
        let policy = RoundRobinSelectionPolicy::new(state, 16);
        assert_eq!(
            policy.get_datanodes_to_store(3).await.unwrap(),
            vec!["http://n1", "http://n2", "http://n1"]
        );
    }

    #[tokio::test]
    async fn oversized_placement_is_rejected_before_planning() {
        let state = Arc::new(test_state());
        state.register_datanode(announce("http://n1")).await;
        let policy = RoundRobinSelectionPolicy::new(state, 16);
        assert_eq!(policy.get_datanodes_to_store(16).await.unwrap().len(), 16);
        for block_count in [17, 100_000_000_000, usize::MAX] {
            assert!(matches!(
                policy.get_datanodes_to_store(block_count).await,
                Err(NamenodeError::InvalidRequest(_))
            ));
        }
    }
}
