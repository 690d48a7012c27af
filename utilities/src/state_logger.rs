use crate::logger::error;
use crate::result::Result;
use serde::Serialize;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::trace;

/// Appends a json line to the target file every time a received state differs from the last one
pub struct StateLogger<T, U>
where
    T: PartialEq + Serialize + Send + Sync + 'static,
    U: Into<T> + Send + Sync + 'static,
{
    current_state: Option<T>,
    file: tokio::fs::File,
    receiver: tokio::sync::mpsc::Receiver<U>,
}
impl<T, U> StateLogger<T, U>
where
    T: PartialEq + Serialize + Send + Sync + 'static,
    U: Into<T> + Send + Sync + 'static,
{
    pub async fn start(target_file_path: &Path) -> Result<tokio::sync::mpsc::Sender<U>> {
        if let Some(parent) = target_file_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let file = tokio::fs::File::options()
            .append(true)
            .create(true)
            .open(target_file_path)
            .await?;
        let (tx, rx) = tokio::sync::mpsc::channel::<U>(10);
        let mut state_logger = Self {
            current_state: None,
            file,
            receiver: rx,
        };
        tokio::spawn(async move {
            while let Some(new_state) = state_logger.receiver.recv().await {
                let state = new_state.into();
                trace!("Checking if the state snapshot is same or not");
                if state_logger.current_state.as_ref() != Some(&state) {
                    match state_logger.update_state(state).await {
                        Ok(_) => {
                            trace!("snapshot written successfully")
                        }
                        Err(e) => {
                            error!("Error while writing the updated state, {e}");
                        }
                    }
                }
            }
        });
        Ok(tx)
    }
    async fn update_state(&mut self, new_state: T) -> Result<()> {
        let json_line = serde_json::to_string(&new_state)?;
        self.current_state = Some(new_state);
        self.file.write_all(json_line.as_bytes()).await?;
        self.file.write_all(b"\n").await?;
        self.file.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[derive(PartialEq, Serialize)]
    struct Counter {
        value: u32,
    }
    impl From<u32> for Counter {
        fn from(value: u32) -> Self {
            Self { value }
        }
    }

    #[tokio::test]
    async fn only_changed_states_are_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.log");
        let sender = StateLogger::<Counter, u32>::start(&path).await.unwrap();
        for value in [1, 1, 2, 2, 2, 3] {
            sender.send(value).await.unwrap();
        }
        drop(sender);
        // the writer task drains the channel once the sender is gone
        let mut content = String::new();
        for _ in 0..50 {
            content = tokio::fs::read_to_string(&path).await.unwrap();
            if content.lines().count() == 3 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, vec![r#"{"value":1}"#, r#"{"value":2}"#, r#"{"value":3}"#]);
    }
}
