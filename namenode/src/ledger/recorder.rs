use async_trait::async_trait;

/// Sink for successful mutations; implementors must never fail the caller
#[async_trait]
pub trait Recorder {
    async fn register_user(&self, username: &str);
    async fn login(&self, username: &str);
    async fn register_datanode(&self, url: &str, node_id: &str, capacity: u64);
    async fn datanode_inactive(&self, url: &str);
    async fn datanode_resurrected(&self, url: &str);
    async fn mkdir(&self, owner: &str, path: &str);
    async fn rmdir(&self, owner: &str, path: &str);
    async fn store_file(&self, owner: &str, path: &str, size: u64, no_of_blocks: usize);
    async fn delete_file(&self, owner: &str, path: &str, orphaned_blocks: usize);
}
