// src/sweep.rs

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use crate::lifecycle::AttemptLifecycle;

/// Runs the expiry sweep forever on a fixed interval, independent of any
/// request handling. Errors are logged and the loop keeps going; a failed
/// sweep is retried wholesale on the next tick.
pub async fn run(lifecycle: Arc<AttemptLifecycle>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        match lifecycle.expire_timed_out_attempts().await {
            Ok(0) => {}
            Ok(n) => tracing::info!("Expiry sweep transitioned {} attempts", n),
            Err(e) => tracing::error!("Expiry sweep failed: {:?}", e),
        }
    }
}
