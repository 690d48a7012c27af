use serde::Serialize;
use storage::{file_storage::FileStorage, storage::Storage};
use utilities::result::Result;

/// What the node knows about its own blocks and disk
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NodeReport {
    pub total_blocks: u64,
    pub total_size: u64,
    pub free_space: u64,
}

pub async fn collect_report(store: &FileStorage, capacity_override: Option<u64>) -> Result<NodeReport> {
    let total_blocks = store.available_chunks().await?.len() as u64;
    let total_size = store.used_storage().await?;
    let free_space = match capacity_override {
        Some(capacity) => capacity.saturating_sub(total_size),
        None => store.available_storage()?,
    };
    Ok(NodeReport {
        total_blocks,
        total_size,
        free_space,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use storage::file_storage::FileStorageConfig;

    #[tokio::test]
    async fn capacity_override_is_reduced_by_stored_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStorage::new(FileStorageConfig {
            root: dir.path().to_string_lossy().to_string(),
        })
        .await
        .unwrap();
        store.write("a_0", &mut Cursor::new(b"12345")).await.unwrap();
        store.write("a_1", &mut Cursor::new(b"678")).await.unwrap();
        let report = collect_report(&store, Some(100)).await.unwrap();
        assert_eq!(
            report,
            NodeReport {
                total_blocks: 2,
                total_size: 8,
                free_space: 92
            }
        );
        assert!(collect_report(&store, None).await.unwrap().free_space > 0);
    }
}
