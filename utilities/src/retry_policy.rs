use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info};

use crate::result::Result;

const BASE_BACKOFF_MILLIS: u64 = 200;
const MAX_BACKOFF: Duration = Duration::from_secs(10);

/// Sleep before attempt `next_try`, starting at 800ms for the second attempt and capped at 10s.
pub fn backoff_for(next_try: u8) -> Duration {
    let factor = 2u64.saturating_pow(next_try as u32);
    Duration::from_millis(factor.saturating_mul(BASE_BACKOFF_MILLIS)).min(MAX_BACKOFF)
}

pub async fn retry_with_backoff<F, Fut, R>(mut f: F, max_retries: u8) -> Result<R>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<R>>,
{
    let max_retries = max_retries.max(1);
    let mut curr_try = 1;
    loop {
        match f().await {
            Ok(v) => {
                return Ok(v);
            }
            Err(e) => {
                error!(error=%e,retry=%curr_try,"Error happened while running closure");
                if curr_try == max_retries {
                    error!("Reached max retries return error");
                    return Err(e);
                }
            }
        }
        curr_try += 1;
        let sleep_duration = backoff_for(curr_try);
        info!(?sleep_duration, "Waiting before retry");
        sleep(sleep_duration).await;
    }
}
