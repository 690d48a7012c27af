use std::path::Path;

use utilities::{
    logger::{info, instrument, trace, tracing},
    result::Result,
    retry_policy::retry_with_backoff,
};
use uuid::Uuid;

use crate::{
    datanode_service::DatanodeService,
    file_chunker::FileChunker,
    namenode::{
        models::{BlockDescriptor, FileRegistration},
        service::NamenodeService,
    },
};

const MAX_ID_PREFIX_LEN: usize = 180;

/// `<remote>__<index>__<uuid>` with every character a datanode would refuse replaced by `_`
pub fn block_id_for(remote: &str, index: u64) -> String {
    let prefix: String = remote
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_ID_PREFIX_LEN)
        .collect();
    format!("{prefix}__{index}__{}", Uuid::new_v4().simple())
}

/// Absolute remote path; defaults to the local file name at the root
pub fn remote_path_for(local: &str, remote: Option<String>) -> Result<String> {
    let remote = match remote {
        Some(remote) => remote,
        None => Path::new(local)
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .ok_or_else(|| format!("can't derive a remote name from {local}"))?,
    };
    let segments: Vec<&str> = remote.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        return Err("remote path can't be the root".into());
    }
    Ok(format!("/{}", segments.join("/")))
}

pub struct StoreFileHandler {
    namenode: NamenodeService,
    datanode: DatanodeService,
    default_block_size: u64,
    max_retries: u8,
}
impl StoreFileHandler {
    pub fn new(
        namenode: NamenodeService,
        datanode: DatanodeService,
        default_block_size: u64,
        max_retries: u8,
    ) -> Self {
        Self {
            namenode,
            datanode,
            default_block_size,
            max_retries,
        }
    }
    #[instrument(skip(self))]
    pub async fn store_file(
        &mut self,
        local_file_path: String,
        remote_file_name: Option<String>,
        block_size: Option<u64>,
    ) -> Result<String> {
        trace!("Fetching file metadata");
        let file_metadata = tokio::fs::metadata(&local_file_path)
            .await
            .map_err(|e| format!("Errror while reading file metadata of {local_file_path} : {e}"))?;
        if file_metadata.is_dir() {
            return Err(format!("Provided file path ({local_file_path}) is dir").into());
        }
        let remote = remote_path_for(&local_file_path, remote_file_name)?;
        let block_size = block_size.unwrap_or(self.default_block_size);
        let file_size = file_metadata.len();
        let file_chunker = FileChunker::new(file_size, block_size)?;
        let block_count = file_chunker.block_count();
        info!(file_size, block_count, "Storing file");

        let placements = if block_count == 0 {
            vec![]
        } else {
            self.namenode.placement(block_count).await?
        };
        trace!(?placements, "got namenode placement");

        let mut blocks = Vec::with_capacity(placements.len());
        for (chunk, datanode) in file_chunker.zip(placements.iter()) {
            let block_id = block_id_for(&remote, chunk.index);
            let bytes = chunk.read(&local_file_path).await?;
            let datanode_service = self.datanode;
            retry_with_backoff(
                || datanode_service.upload_block(datanode, &block_id, bytes.clone()),
                self.max_retries,
            )
            .await
            .map_err(|e| format!("Unreachable: block {} could not be stored : {e}", chunk.index))?;
            blocks.push(BlockDescriptor {
                index: chunk.index,
                block_id,
                datanode: datanode.clone(),
            });
        }

        let registration = FileRegistration {
            filename: remote,
            size: file_size,
            block_size,
            blocks,
        };
        let entry = self.namenode.register_file(&registration).await?;
        Ok(format!(
            "Stored {} ({} bytes in {} blocks)",
            entry.path,
            entry.size,
            entry.blocks.len()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_ids_are_safe_and_unique() {
        let first = block_id_for("/docs/my report.txt", 2);
        let second = block_id_for("/docs/my report.txt", 2);
        assert!(first.starts_with("_docs_my_report.txt__2__"));
        assert_ne!(first, second);
        assert!(first
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_')));
        assert!(block_id_for(&"x".repeat(1000), 0).len() < 255);
    }

    #[test]
    fn remote_defaults_to_local_file_name() {
        assert_eq!(remote_path_for("./data/a.txt", None).unwrap(), "/a.txt");
        assert_eq!(
            remote_path_for("a.txt", Some("docs//b.txt".into())).unwrap(),
            "/docs/b.txt"
        );
        assert!(remote_path_for("a.txt", Some("/".into())).is_err());
    }
}
