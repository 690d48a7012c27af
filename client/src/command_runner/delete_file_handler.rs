use utilities::{
    logger::{instrument, tracing},
    result::Result,
};

use crate::namenode::service::NamenodeService;

pub struct DeleteFileHandler {
    namenode: NamenodeService,
}
impl DeleteFileHandler {
    pub fn new(namenode: NamenodeService) -> Self {
        Self { namenode }
    }
    #[instrument(skip(self))]
    pub async fn delete_file(&mut self, remote_file_name: &str) -> Result<String> {
        let removed = self.namenode.remove_file(remote_file_name).await?;
        Ok(format!(
            "Removed {} ({} blocks left on datanodes)",
            removed.path, removed.orphaned_blocks
        ))
    }
}
