use std::path::Path;

use nix::sys::statvfs;

use crate::storage::Result;

pub(crate) fn available_storage(path: &Path) -> Result<u64> {
    let stats = statvfs::statvfs(path)?;
    let available_bytes = stats.blocks_available() as u64 * stats.fragment_size() as u64;
    Ok(available_bytes)
}
