use std::path::Path;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use tokio::{
    io::AsyncWriteExt,
    sync::mpsc::{self, Sender},
};
use utilities::{
    logger::{error, instrument, tracing},
    result::Result,
};

use super::recorder::Recorder;

/// Append only activity log, written by a background task
#[derive(Clone, Debug)]
pub struct DefaultLedger {
    producer: Sender<String>,
}
impl DefaultLedger {
    #[instrument(name = "ledger_open")]
    pub async fn new(log_store: &str) -> Result<Self> {
        let (tx, mut rx) = mpsc::channel::<String>(64);
        if let Some(parent) = Path::new(log_store).parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut appendable = tokio::fs::File::options()
            .append(true)
            .create(true)
            .open(log_store)
            .await?;
        tokio::spawn(async move {
            while let Some(log) = rx.recv().await {
                if let Err(e) = appendable.write_all(log.as_bytes()).await {
                    error!(error = %e, "Error while appending log to file");
                    continue;
                }
                if let Err(e) = appendable.flush().await {
                    error!(error = %e, "Error while flushing ledger");
                }
            }
        });
        Ok(Self { producer: tx })
    }
    async fn insert_log(&self, log: String) {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let stamped_log = format!("{timestamp} {log}\n");
        if let Err(e) = self.producer.send(stamped_log).await {
            error!(error = %e, %log, "Error while sending log to producer");
        }
    }
}

#[async_trait]
impl Recorder for DefaultLedger {
    async fn register_user(&self, username: &str) {
        self.insert_log(format!("register_user {username}")).await;
    }
    async fn login(&self, username: &str) {
        self.insert_log(format!("login {username}")).await;
    }
    async fn register_datanode(&self, url: &str, node_id: &str, capacity: u64) {
        self.insert_log(format!("register_datanode {url},{node_id},{capacity}"))
            .await;
    }
    async fn datanode_inactive(&self, url: &str) {
        self.insert_log(format!("datanode_inactive {url}")).await;
    }
    async fn datanode_resurrected(&self, url: &str) {
        self.insert_log(format!("datanode_active {url}")).await;
    }
    async fn mkdir(&self, owner: &str, path: &str) {
        self.insert_log(format!("mkdir {owner},{path}")).await;
    }
    async fn rmdir(&self, owner: &str, path: &str) {
        self.insert_log(format!("rmdir {owner},{path}")).await;
    }
    async fn store_file(&self, owner: &str, path: &str, size: u64, no_of_blocks: usize) {
        self.insert_log(format!("store_file {owner},{path},{size},{no_of_blocks}"))
            .await;
    }
    async fn delete_file(&self, owner: &str, path: &str, orphaned_blocks: usize) {
        self.insert_log(format!("delete_file {owner},{path},{orphaned_blocks}"))
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn entries_are_appended_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger").join("history.log");
        let ledger = DefaultLedger::new(path.to_str().unwrap()).await.unwrap();
        ledger.register_user("alice").await;
        ledger.mkdir("alice", "/docs").await;
        ledger.store_file("alice", "/docs/a.txt", 10, 3).await;
        drop(ledger);

        let mut content = String::new();
        for _ in 0..50 {
            content = tokio::fs::read_to_string(&path).await.unwrap_or_default();
            if content.lines().count() == 3 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        let operations: Vec<&str> = content
            .lines()
            .map(|line| line.split(' ').nth(1).unwrap())
            .collect();
        assert_eq!(operations, vec!["register_user", "mkdir", "store_file"]);
        assert!(content.contains("store_file alice,/docs/a.txt,10,3"));
    }
}
