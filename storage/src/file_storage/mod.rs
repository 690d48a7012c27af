mod platform_utility;
use sha2::{Digest, Sha256};
use std::{
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};
use tracing::{error, info, instrument, trace};

use crate::{
    block_key::validate_block_id,
    file_storage::platform_utility::available_storage,
    storage::{Result, Storage, StoredBlock},
};
use tokio::{
    fs::{self, File},
    io::{AsyncRead, AsyncReadExt, AsyncWriteExt},
};

/// Leading dot keeps it outside the block id namespace
const STAGING_DIR: &str = ".staged";
const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Blocks are written to `root/.staged` and renamed into `root` once complete,
/// so a reader never observes a half written block.
#[derive(Clone, Debug)]
pub struct FileStorage {
    root: PathBuf,
    staging_sequence: Arc<AtomicU64>,
}
pub struct FileStorageConfig {
    pub root: String,
}
impl FileStorage {
    pub async fn new(config: FileStorageConfig) -> Result<Self> {
        let root = PathBuf::from(&config.root);
        fs::create_dir_all(root.join(STAGING_DIR)).await.map_err(|e| {
            error!(root=%config.root,error=%e,"Error while creating the root for storage");
            format!("Error while creating storage root {} : {e}", config.root)
        })?;
        info!(root=%config.root,"Created root and staging dir for storage");
        Ok(FileStorage {
            root,
            staging_sequence: Arc::default(),
        })
    }
    fn get_committed_path(&self, block_id: &str) -> Result<PathBuf> {
        Ok(self.root.join(validate_block_id(block_id)?))
    }
    fn get_staged_path(&self, block_id: &str) -> Result<PathBuf> {
        let sequence = self.staging_sequence.fetch_add(1, Ordering::Relaxed);
        Ok(Path::new(&self.root)
            .join(STAGING_DIR)
            .join(format!("{}.{sequence}", validate_block_id(block_id)?)))
    }
    async fn copy_hashed(
        reader: &mut (impl AsyncRead + Unpin + Send),
        file: &mut File,
    ) -> Result<StoredBlock> {
        let mut hasher = Sha256::new();
        let mut buf = vec![0u8; COPY_BUFFER_SIZE];
        let mut size = 0u64;
        loop {
            let read = reader.read(&mut buf).await?;
            if read == 0 {
                break;
            }
            hasher.update(&buf[..read]);
            file.write_all(&buf[..read]).await?;
            size += read as u64;
        }
        file.flush().await?;
        Ok(StoredBlock {
            size,
            checksum: format!("{:x}", hasher.finalize()),
        })
    }
}
impl Storage for FileStorage {
    #[instrument(name = "file_storage_write", skip(self, block_stream))]
    async fn write(
        &self,
        block_id: &str,
        block_stream: &mut (impl AsyncRead + Unpin + Send),
    ) -> Result<StoredBlock> {
        let committed_path = self.get_committed_path(block_id)?;
        let staged_path = self.get_staged_path(block_id)?;
        let mut block_file = File::create_new(&staged_path).await?;
        let stored = match Self::copy_hashed(block_stream, &mut block_file).await {
            Ok(stored) => stored,
            Err(e) => {
                drop(block_file);
                if let Err(remove_error) = fs::remove_file(&staged_path).await {
                    error!(error=%remove_error,"Error while removing partially staged block");
                }
                return Err(e);
            }
        };
        drop(block_file);
        if let Err(e) = fs::rename(&staged_path, &committed_path).await {
            if let Err(remove_error) = fs::remove_file(&staged_path).await {
                error!(error=%remove_error,"Error while removing staged block after failed commit");
            }
            return Err(e.into());
        }
        info!(%block_id, size = stored.size, "block stored successfully");
        Ok(stored)
    }
    #[instrument(name = "file_storage_read", skip(self))]
    async fn read(&self, block_id: &str) -> Result<Option<Box<dyn AsyncRead + Unpin + Send>>> {
        let block_path = self.get_committed_path(block_id)?;
        match File::open(block_path).await {
            Ok(block_file) => Ok(Some(Box::new(block_file))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
    async fn exists(&self, block_id: &str) -> Result<bool> {
        let block_path = self.get_committed_path(block_id)?;
        Ok(fs::try_exists(block_path).await?)
    }
    #[instrument(name = "file_storage_delete", skip(self))]
    async fn delete(&self, block_id: &str) -> Result<bool> {
        let block_path = self.get_committed_path(block_id)?;
        match fs::remove_file(block_path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
    #[instrument(name = "file_storage_available_chunk", skip(self))]
    async fn available_chunks(&self) -> Result<Vec<String>> {
        trace!(root=?self.root,"Reading the dir to get available chunks");
        let mut dir_enteries = fs::read_dir(&self.root).await?;
        let mut block_ids = vec![];
        while let Some(entry) = dir_enteries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                block_ids.push(
                    entry
                        .file_name()
                        .into_string()
                        .map_err(|_| "Invalid file name")?,
                );
            }
        }
        block_ids.sort();
        Ok(block_ids)
    }
    async fn used_storage(&self) -> Result<u64> {
        let mut dir_enteries = fs::read_dir(&self.root).await?;
        let mut used = 0;
        while let Some(entry) = dir_enteries.next_entry().await? {
            let metadata = entry.metadata().await?;
            if metadata.is_file() {
                used += metadata.len();
            }
        }
        Ok(used)
    }
    fn available_storage(&self) -> Result<u64> {
        available_storage(&self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::tests::storage_test;
    use std::io::Cursor;

    async fn new_storage(dir: &tempfile::TempDir) -> FileStorage {
        FileStorage::new(FileStorageConfig {
            root: dir.path().join("blocks").to_string_lossy().into_owned(),
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn file_storage_test() -> Result<()> {
        let dir = tempfile::tempdir()?;
        storage_test(new_storage(&dir).await).await
    }

    #[tokio::test]
    async fn staging_area_is_not_listed() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let storage = new_storage(&dir).await;
        storage.write("b1", &mut Cursor::new(vec![7u8; 10])).await?;
        assert_eq!(storage.available_chunks().await?, vec!["b1".to_string()]);
        let staged = std::fs::read_dir(dir.path().join("blocks").join(STAGING_DIR))?.count();
        assert_eq!(staged, 0);
        assert!(storage.available_storage()? > 0);
        Ok(())
    }

    #[tokio::test]
    async fn staging_dir_name_is_usable_as_block_id() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let storage = new_storage(&dir).await;
        assert!(validate_block_id(STAGING_DIR).is_err());
        let stored = storage.write("staged", &mut Cursor::new(b"abc")).await?;
        assert_eq!(stored.size, 3);
        assert!(storage.exists("staged").await?);
        assert_eq!(storage.available_chunks().await?, vec!["staged".to_string()]);
        let staged = std::fs::read_dir(dir.path().join("blocks").join(STAGING_DIR))?.count();
        assert_eq!(staged, 0);
        Ok(())
    }

    #[tokio::test]
    async fn failed_commit_leaves_no_staged_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let storage = new_storage(&dir).await;
        // a non empty directory at the committed path makes the rename fail
        let blocker = dir.path().join("blocks").join("occupied");
        std::fs::create_dir_all(blocker.join("inner"))?;
        assert!(storage.write("occupied", &mut Cursor::new(b"abc")).await.is_err());
        let staged = std::fs::read_dir(dir.path().join("blocks").join(STAGING_DIR))?.count();
        assert_eq!(staged, 0);
        Ok(())
    }

    #[tokio::test]
    async fn traversal_ids_never_touch_the_filesystem() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let storage = new_storage(&dir).await;
        assert!(storage.write("../escape", &mut Cursor::new(b"x")).await.is_err());
        assert!(storage.read("../escape").await.is_err());
        assert!(!dir.path().join("escape").exists());
        Ok(())
    }
}
