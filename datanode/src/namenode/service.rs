use std::time::Duration;

use serde::{Deserialize, Serialize};
use utilities::{
    http_client_pool::HTTP_CLIENT_POOL,
    logger::{info, instrument, trace, tracing},
    result::Result,
};

#[derive(Debug, Serialize)]
struct RegisterDatanodeRequest<'a> {
    url: &'a str,
    node_id: &'a str,
    capacity: u64,
}

#[derive(Debug, Serialize)]
struct HeartbeatRequest<'a> {
    url: &'a str,
    node_id: &'a str,
    block_count: u64,
    capacity: u64,
}

#[derive(Debug, Deserialize)]
struct HeartbeatAck {
    status: String,
}

/// Talks to the namenode on behalf of this datanode
#[derive(Clone, Debug)]
pub struct NamenodeService {
    namenode_addrs: String,
    url: String,
    node_id: String,
    timeout: Duration,
}
impl NamenodeService {
    pub fn new(namenode_addrs: &str, url: &str, node_id: &str, timeout: Duration) -> Self {
        Self {
            namenode_addrs: namenode_addrs.trim_end_matches('/').to_owned(),
            url: url.to_owned(),
            node_id: node_id.to_owned(),
            timeout,
        }
    }

    #[instrument(name = "service_namenode_register", skip(self), fields(url = %self.url))]
    pub async fn register(&self, capacity: u64) -> Result<()> {
        let client = HTTP_CLIENT_POOL.get_client(self.timeout).await?;
        let request = RegisterDatanodeRequest {
            url: &self.url,
            node_id: &self.node_id,
            capacity,
        };
        client
            .post(format!("{}/register_datanode", self.namenode_addrs))
            .json(&request)
            .send()
            .await
            .map_err(|e| format!("Error while registering with namenode {} : {e}", self.namenode_addrs))?
            .error_for_status()?;
        info!("Registered with namenode");
        Ok(())
    }

    #[instrument(name = "service_namenode_send_heart_beat", skip(self))]
    pub async fn send_heart_beat(&self, block_count: u64, capacity: u64) -> Result<String> {
        let client = HTTP_CLIENT_POOL.get_client(self.timeout).await?;
        let request = HeartbeatRequest {
            url: &self.url,
            node_id: &self.node_id,
            block_count,
            capacity,
        };
        let ack: HeartbeatAck = client
            .post(format!("{}/heartbeat", self.namenode_addrs))
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        trace!(status = %ack.status, "Heartbeat acknowledged");
        Ok(ack.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unreachable_namenode_is_an_error() {
        let service = NamenodeService::new(
            "http://127.0.0.1:1/",
            "http://127.0.0.1:8001",
            "dn-1",
            Duration::from_millis(500),
        );
        assert_eq!(service.namenode_addrs, "http://127.0.0.1:1");
        assert!(service.register(10).await.is_err());
        assert!(service.send_heart_beat(0, 10).await.is_err());
    }
}
