use std::time::Duration;

use async_trait::async_trait;
use utilities::{
    http_client_pool::HTTP_CLIENT_POOL,
    logger::{instrument, tracing},
};

use crate::error::NamenodeError;

/// Existence check of one block on one datanode
#[async_trait]
pub trait BlockProber {
    async fn probe_block(&self, datanode: &str, block_id: &str) -> Result<(), NamenodeError>;
}

#[derive(Clone, Copy, Debug)]
pub struct DatanodeService {
    request_timeout: Duration,
}

impl DatanodeService {
    pub fn new(request_timeout: Duration) -> Self {
        Self { request_timeout }
    }
}

#[async_trait]
impl BlockProber for DatanodeService {
    #[instrument(name = "service_datanode_probe_block", skip(self))]
    async fn probe_block(&self, datanode: &str, block_id: &str) -> Result<(), NamenodeError> {
        let url = format!("{}/block/{}", datanode.trim_end_matches('/'), block_id);
        let client = HTTP_CLIENT_POOL
            .get_client(self.request_timeout)
            .await
            .map_err(|e| NamenodeError::Unreachable(format!("no http client for {datanode}: {e}")))?;
        let response = client
            .head(&url)
            .send()
            .await
            .map_err(|e| NamenodeError::Unreachable(format!("datanode {datanode} unreachable: {e}")))?;
        if !response.status().is_success() {
            return Err(NamenodeError::Unreachable(format!(
                "datanode {datanode} answered {}",
                response.status()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn refused_connection_is_unreachable() {
        // port 9 (discard) is not served on loopback
        let service = DatanodeService::new(Duration::from_millis(500));
        let result = service.probe_block("http://127.0.0.1:9", "b1").await;
        assert!(matches!(result, Err(NamenodeError::Unreachable(_))));
    }
}
