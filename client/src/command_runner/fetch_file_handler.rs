use utilities::{
    logger::{error, info, instrument, trace, tracing},
    result::Result,
};

use crate::{
    chunk_joiner::ChunkJoiner,
    datanode_service::DatanodeService,
    namenode::{models::BlockDescriptor, service::NamenodeService},
};

pub struct FetchFileHandler {
    namenode: NamenodeService,
    datanode: DatanodeService,
}
impl FetchFileHandler {
    pub fn new(namenode: NamenodeService, datanode: DatanodeService) -> Self {
        Self { namenode, datanode }
    }

    async fn fetch_block(&self, joiner: &ChunkJoiner, block: &BlockDescriptor, block_size: u64) -> Result<()> {
        let mut writer = joiner.writer_at(block.index * block_size).await?;
        let written = self
            .datanode
            .download_block(&block.datanode, &block.block_id, &mut writer)
            .await?;
        trace!(index = block.index, written, "block joined");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn fetch_file(
        &mut self,
        remote_file_name: String,
        local_file_name: String,
    ) -> Result<String> {
        trace!("fetching the file {remote_file_name}");
        let entry = self.namenode.file(&remote_file_name).await?;
        trace!(blocks = ?entry.blocks, "got block details for file");
        let chunk_joiner = ChunkJoiner::new(local_file_name.clone(), entry.size).await?;
        let mut blocks = entry.blocks.clone();
        blocks.sort_by_key(|block| block.index);
        for block in &blocks {
            if let Err(e) = self.fetch_block(&chunk_joiner, block, entry.block_size).await {
                error!(error = %e, index = block.index, "Error during block fetching");
                info!("Removing the partial file");
                chunk_joiner.abort().await;
                return Err(format!("block {} of {} : {e}", block.index, entry.path).into());
            }
        }
        Ok(format!(
            "Fetched {} into {local_file_name} ({} bytes)",
            entry.path, entry.size
        ))
    }
}
