use super::SessionStore;
use chrono::{Duration, Utc};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration as TokioDuration};
use tracing::{debug, info};

/// How often idle tabs are looked for
const PRUNE_INTERVAL_SECS: u64 = 900;

/// Start the background task that drops tabs idle for longer than `idle_hours`
pub fn start_pruner(store: Arc<SessionStore>, idle_hours: i64) -> JoinHandle<()> {
    let idle = Duration::hours(idle_hours);
    info!("Pruning tabs idle for more than {} hours", idle_hours);

    tokio::spawn(async move {
        loop {
            sleep(TokioDuration::from_secs(PRUNE_INTERVAL_SECS)).await;

            let removed = store.prune(Utc::now(), idle).await;
            if removed > 0 {
                info!("Pruned {} idle tabs", removed);
            } else {
                debug!("No idle tabs to prune");
            }
        }
    })
}
