pub mod block_key;
pub mod file_storage;
pub mod storage;
