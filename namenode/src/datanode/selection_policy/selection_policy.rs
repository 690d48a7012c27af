use async_trait::async_trait;

use crate::error::NamenodeError;

#[async_trait]
pub trait DatanodeSelectionPolicy {
    /// One datanode url per block index
    async fn get_datanodes_to_store(&self, block_count: usize)
    -> Result<Vec<String>, NamenodeError>;
}
