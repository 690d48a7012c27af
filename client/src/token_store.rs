use std::path::{Path, PathBuf};

use utilities::{
    logger::{instrument, trace, tracing},
    result::Result,
};

/// Session token persisted between runs
#[derive(Clone, Debug)]
pub struct TokenStore {
    path: PathBuf,
}
impl TokenStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
    pub async fn load(&self) -> Option<String> {
        let token = tokio::fs::read_to_string(&self.path).await.ok()?;
        let token = token.trim();
        (!token.is_empty()).then(|| token.to_owned())
    }
    #[instrument(name = "token_store_save", skip(self, token))]
    pub async fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, token).await?;
        trace!(path = ?self.path, "token saved");
        Ok(())
    }
    pub async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("nested").join("token"));
        assert_eq!(store.load().await, None);
        store.save("abc-123").await.unwrap();
        assert_eq!(store.load().await.as_deref(), Some("abc-123"));
        store.clear().await.unwrap();
        store.clear().await.unwrap();
        assert_eq!(store.load().await, None);
    }
}
