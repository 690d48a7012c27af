use std::{collections::HashMap, sync::Arc, time::Duration};

use reqwest::Client;
use tokio::sync::Mutex;
use tracing::trace;

use crate::result::Result;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Keeps one http client per request timeout so connections are reused across calls
#[derive(Clone, Debug)]
pub struct HttpClientPool {
    store: Arc<Mutex<HashMap<Duration, Client>>>,
}
impl HttpClientPool {
    fn new() -> Self {
        Self {
            store: Arc::default(),
        }
    }
    pub async fn get_client(&self, timeout: Duration) -> Result<Client> {
        let mut store = self.store.lock().await;
        if let Some(client) = store.get(&timeout) {
            trace!(?timeout, "Client already present");
            return Ok(client.clone());
        }
        trace!(?timeout, "Creating http client since client is not present already");
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .timeout(timeout)
            .build()
            .map_err(|e| format!("Error while building http client {e}"))?;
        store.insert(timeout, client.clone());
        Ok(client)
    }
}

pub static HTTP_CLIENT_POOL: once_cell::sync::Lazy<HttpClientPool> =
    once_cell::sync::Lazy::new(HttpClientPool::new);

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn clients_are_cached_per_timeout() {
        let pool = HttpClientPool::new();
        pool.get_client(Duration::from_secs(1)).await.unwrap();
        pool.get_client(Duration::from_secs(1)).await.unwrap();
        pool.get_client(Duration::from_secs(2)).await.unwrap();
        assert_eq!(pool.store.lock().await.len(), 2);
    }
}
