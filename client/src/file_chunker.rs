use tokio::{
    fs::OpenOptions,
    io::{AsyncReadExt, AsyncSeekExt},
};
use utilities::{logger::instrument, logger::tracing, result::Result};

#[derive(Clone, Debug, PartialEq)]
pub struct FileChunk {
    pub index: u64,
    pub start_offset: u64,
    pub end_offset: u64,
}
impl FileChunk {
    pub fn len(&self) -> u64 {
        self.end_offset - self.start_offset
    }
    #[instrument(name = "file_chunk_read", skip(self), fields(index = self.index))]
    pub async fn read(&self, file_path: &str) -> Result<Vec<u8>> {
        let mut file = OpenOptions::new()
            .read(true)
            .open(file_path)
            .await
            .map_err(|e| format!("Error while openning the file for chunk {e:?}"))?;
        file.seek(tokio::io::SeekFrom::Start(self.start_offset))
            .await
            .map_err(|e| format!("Error while seeking to starting offset {e:?}"))?;
        let mut buffer = Vec::with_capacity(self.len() as usize);
        file.take(self.len()).read_to_end(&mut buffer).await?;
        if buffer.len() as u64 != self.len() {
            return Err(format!(
                "file shrank while reading chunk {}, expected {} bytes got {}",
                self.index,
                self.len(),
                buffer.len()
            )
            .into());
        }
        Ok(buffer)
    }
}

/// Splits a file of `file_size` bytes into blocks of at most `block_size` bytes
pub struct FileChunker {
    file_size: u64,
    block_size: u64,
    current_index: u64,
}

impl FileChunker {
    pub fn new(file_size: u64, block_size: u64) -> Result<Self> {
        if block_size == 0 {
            return Err("block size must be positive".into());
        }
        Ok(FileChunker {
            file_size,
            block_size,
            current_index: 0,
        })
    }
    pub fn block_count(&self) -> u64 {
        self.file_size.div_ceil(self.block_size)
    }
}

impl Iterator for FileChunker {
    type Item = FileChunk;
    fn next(&mut self) -> Option<FileChunk> {
        let start_offset = self.current_index * self.block_size;
        if start_offset >= self.file_size {
            return None;
        }
        let chunk = FileChunk {
            index: self.current_index,
            start_offset,
            end_offset: (start_offset + self.block_size).min(self.file_size),
        };
        self.current_index += 1;
        Some(chunk)
    }
}
