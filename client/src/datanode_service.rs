use std::time::Duration;

use serde::Deserialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use utilities::{
    http_client_pool::HTTP_CLIENT_POOL,
    logger::{instrument, trace, tracing},
    result::Result,
};

#[derive(Debug, Deserialize)]
pub struct UploadedBlock {
    pub block_id: String,
    pub size: u64,
    pub checksum: String,
}

fn block_url(datanode: &str, route: &str, block_id: &str) -> String {
    format!("{}/{route}/{block_id}", datanode.trim_end_matches('/'))
}

/// Block transfers straight to and from datanodes
#[derive(Clone, Copy, Debug)]
pub struct DatanodeService {
    transfer_timeout: Duration,
}
impl DatanodeService {
    pub fn new(transfer_timeout: Duration) -> Self {
        Self { transfer_timeout }
    }

    #[instrument(name = "datanode_service_upload_block", skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload_block(&self, datanode: &str, block_id: &str, bytes: Vec<u8>) -> Result<UploadedBlock> {
        let expected = bytes.len() as u64;
        let client = HTTP_CLIENT_POOL.get_client(self.transfer_timeout).await?;
        let response = client
            .post(block_url(datanode, "upload_block", block_id))
            .body(bytes)
            .send()
            .await
            .map_err(|e| format!("Unreachable: datanode {datanode} : {e}"))?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(format!("datanode {datanode} rejected block {block_id} ({status}): {body}").into());
        }
        let uploaded: UploadedBlock = response.json().await?;
        if uploaded.size != expected {
            return Err(format!(
                "datanode {datanode} stored {} bytes for {block_id}, sent {expected}",
                uploaded.size
            )
            .into());
        }
        trace!(checksum = %uploaded.checksum, "block uploaded");
        Ok(uploaded)
    }

    /// Streams the block body into `sink`, returning the number of bytes written
    #[instrument(name = "datanode_service_download_block", skip(self, sink))]
    pub async fn download_block(
        &self,
        datanode: &str,
        block_id: &str,
        sink: &mut (impl AsyncWrite + Unpin),
    ) -> Result<u64> {
        let client = HTTP_CLIENT_POOL.get_client(self.transfer_timeout).await?;
        let mut response = client
            .get(block_url(datanode, "block", block_id))
            .send()
            .await
            .map_err(|e| format!("Unreachable: datanode {datanode} : {e}"))?;
        if !response.status().is_success() {
            return Err(format!(
                "datanode {datanode} could not serve block {block_id} ({})",
                response.status()
            )
            .into());
        }
        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await? {
            sink.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        sink.flush().await?;
        Ok(written)
    }
}
