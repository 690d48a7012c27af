use tokio::{
    fs::File,
    io::{AsyncSeekExt, AsyncWriteExt},
};
use utilities::{
    logger::{instrument, trace, tracing, warn},
    result::Result,
};

/// Reassembles downloaded blocks into a file that must not exist yet
#[derive(Clone, Debug)]
pub struct ChunkJoiner {
    file_path: String,
}

impl ChunkJoiner {
    #[instrument(name = "new_chunk_joiner")]
    pub async fn new(file_path: String, file_size: u64) -> Result<Self> {
        trace!("Creating file");
        // reserving space for the file we are going to store
        let file = tokio::fs::OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(&file_path)
            .await
            .map_err(|e| format!("Error while opening the file {file_path} : {e}"))?;
        file.set_len(file_size)
            .await
            .map_err(|e| format!("Error while reserving space {e}"))?;
        Ok(Self { file_path })
    }
    /// Writer positioned at `offset`; every call opens its own descriptor
    pub async fn writer_at(&self, offset: u64) -> Result<File> {
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .open(&self.file_path)
            .await
            .map_err(|e| format!("Error while opening file {e:?}"))?;
        file.seek(tokio::io::SeekFrom::Start(offset))
            .await
            .map_err(|e| format!("Error while seeking to start offset of chunk in file {e:?}"))?;
        Ok(file)
    }
    pub async fn join_chunk(&self, offset: u64, bytes: &[u8]) -> Result<()> {
        let mut file = self.writer_at(offset).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        Ok(())
    }
    #[instrument(name = "abort_join_chunk", skip(self))]
    pub async fn abort(&self) {
        if let Err(e) = tokio::fs::remove_file(&self.file_path).await {
            warn!(error = %e, path = %self.file_path, "Could not remove partial file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn chunks_land_at_their_offsets() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.bin").to_string_lossy().to_string();
        let joiner = ChunkJoiner::new(path.clone(), 10).await.unwrap();
        joiner.join_chunk(8, b"89").await.unwrap();
        joiner.join_chunk(0, b"0123").await.unwrap();
        joiner.join_chunk(4, b"4567").await.unwrap();
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"0123456789");

        assert!(ChunkJoiner::new(path.clone(), 10).await.is_err());
        joiner.abort().await;
        assert!(!std::path::Path::new(&path).exists());
    }
}
