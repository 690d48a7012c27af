use std::error::Error;

use tokio::io;

pub type Result<T> = std::result::Result<T, Box<dyn Error + Send + Sync>>;

#[derive(Clone, Debug, PartialEq)]
pub struct StoredBlock {
    pub size: u64,
    /// sha256 of the stored bytes, hex encoded
    pub checksum: String,
}

pub trait Storage {
    /// Stores the stream under `block_id`, replacing any previous content.
    async fn write(
        &self,
        block_id: &str,
        block_stream: &mut (impl io::AsyncRead + Unpin + Send),
    ) -> Result<StoredBlock>;
    /// `None` when no block is stored under the id.
    async fn read(&self, block_id: &str) -> Result<Option<Box<dyn io::AsyncRead + Unpin + Send>>>;
    async fn exists(&self, block_id: &str) -> Result<bool>;
    async fn delete(&self, block_id: &str) -> Result<bool>;
    async fn available_chunks(&self) -> Result<Vec<String>>;
    /// bytes taken by the stored blocks
    async fn used_storage(&self) -> Result<u64>;
    /// free bytes left on the device backing the storage
    fn available_storage(&self) -> Result<u64>;
}

#[cfg(test)]
pub mod tests {
    use std::io::Cursor;
    use tokio::io::AsyncReadExt;

    use super::*;
    pub async fn storage_test(storage: impl Storage) -> Result<()> {
        let block_id = "test_chunk.bin";
        let original_data = b"hello world";

        let mut input_stream = Cursor::new(original_data);
        let stored = storage.write(block_id, &mut input_stream).await?;
        assert_eq!(stored.size as usize, original_data.len());
        assert_eq!(
            stored.checksum,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
        assert!(storage.exists(block_id).await?);
        let available_chunks = storage.available_chunks().await?;
        assert_eq!(available_chunks, vec![block_id.to_string()]);
        assert_eq!(storage.used_storage().await?, original_data.len() as u64);

        let mut reader = storage.read(block_id).await?.expect("block was written");
        let mut read_buf = Vec::new();
        reader.read_to_end(&mut read_buf).await?;
        assert_eq!(read_buf, original_data);

        // overwriting keeps a single copy
        let mut replacement = Cursor::new(b"bye");
        assert_eq!(storage.write(block_id, &mut replacement).await?.size, 3);
        assert_eq!(storage.available_chunks().await?.len(), 1);

        assert!(storage.delete(block_id).await?);
        assert!(!storage.delete(block_id).await?);
        assert!(storage.read(block_id).await?.is_none());
        assert!(!storage.exists(block_id).await?);
        assert_eq!(storage.available_chunks().await?.len(), 0);
        Ok(())
    }
}
