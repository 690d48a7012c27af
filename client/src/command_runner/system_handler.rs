use utilities::result::Result;

use crate::{
    config::CONFIG,
    namenode::{models::FileHealth, service::NamenodeService},
};

pub fn render_health(health: &FileHealth) -> String {
    let mut lines = vec![format!(
        "{} : {} ({:.1}% of {} blocks reachable)",
        health.path,
        if health.healthy { "healthy" } else { "degraded" },
        health.integrity_score,
        health.total_blocks
    )];
    lines.extend(health.missing_blocks.iter().map(|missing| {
        format!(
            "  missing block {} ({}) on {} : {}",
            missing.index, missing.block_id, missing.datanode, missing.reason
        )
    }));
    lines.join("\n")
}

pub struct SystemHandler {
    namenode: NamenodeService,
}
impl SystemHandler {
    pub fn new(namenode: NamenodeService) -> Self {
        Self { namenode }
    }
    pub async fn ping(&mut self) -> Result<String> {
        let info = self.namenode.ping().await?;
        Ok(format!(
            "{} at {} : {} active datanodes, {} files, {} users",
            info.status,
            self.namenode.address(),
            info.datanodes.len(),
            info.total_files,
            info.total_users
        ))
    }
    pub async fn file_health(&mut self, path: &str) -> Result<String> {
        Ok(render_health(&self.namenode.file_health(path).await?))
    }
    pub async fn status(&mut self) -> Result<String> {
        let status = self.namenode.system_status().await?;
        Ok(format!(
            "system : {}\ndatanodes : {} active, {} inactive, {} total\nstorage : {} files, {} blocks\nyou : {} files, {} directories",
            status.system.status,
            status.datanodes.active,
            status.datanodes.inactive,
            status.datanodes.total,
            status.storage.total_files,
            status.storage.total_blocks,
            status.user_stats.files,
            status.user_stats.directories
        ))
    }
    pub async fn datanodes(&mut self, detailed: bool) -> Result<String> {
        if !detailed {
            let list = self.namenode.datanodes().await?;
            if list.datanodes.is_empty() {
                return Ok("No active datanodes".to_owned());
            }
            return Ok(list.datanodes.join("\n"));
        }
        let list = self.namenode.datanodes_detailed().await?;
        if list.datanodes.is_empty() {
            return Ok("No datanodes registered".to_owned());
        }
        Ok(list
            .datanodes
            .iter()
            .map(|node| {
                format!(
                    "{} [{}] {} blocks={} capacity={} last_heartbeat={}s ago registered={}",
                    node.url,
                    node.node_id,
                    node.status,
                    node.total_blocks,
                    node.capacity,
                    node.last_heartbeat_secs_ago,
                    node.registered_at
                )
            })
            .collect::<Vec<_>>()
            .join("\n"))
    }
    pub fn config(&self) -> String {
        serde_json::to_string_pretty(&*CONFIG).unwrap_or_else(|e| format!("{CONFIG:?} ({e})"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_lists_missing_blocks() {
        let health: FileHealth = serde_json::from_str(
            r#"{"path":"/f.bin","total_blocks":4,"healthy":false,"integrity_score":75.0,
                "missing_blocks":[{"index":2,"block_id":"f_2","datanode":"http://n2","reason":"404"}]}"#,
        )
        .unwrap();
        let rendered = render_health(&health);
        assert!(rendered.starts_with("/f.bin : degraded (75.0% of 4 blocks reachable)"));
        assert!(rendered.contains("missing block 2 (f_2) on http://n2"));
    }
}
