//! Stress helpers for the device store.
//!
//! These drive many concurrent writers against one store to check that
//! revision checks hold up under contention.

use devreg_core::{CoreError, Device, DeviceId, DeviceStore};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Result of a stress run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Total attempts made.
    pub total_ops: usize,
    /// Writes that applied.
    pub successful_ops: usize,
    /// Writes rejected with a revision conflict.
    pub conflicts: usize,
    /// Total duration.
    pub duration: Duration,
}

impl StressTestResult {
    /// Creates a new result.
    pub fn new(successful: usize, conflicts: usize, duration: Duration) -> Self {
        Self {
            total_ops: successful + conflicts,
            successful_ops: successful,
            conflicts,
            duration,
        }
    }
}

/// Configuration for stress runs.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Number of concurrent writer tasks.
    pub writers: usize,
    /// Attempts per writer.
    pub attempts: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            writers: 8,
            attempts: 50,
        }
    }
}

/// Runs read-modify-write cycles from many tasks against one device.
///
/// Each attempt loads the device, bumps its target, and saves it at the
/// revision it read. Conflicts are counted, not retried. Any other error
/// panics.
pub async fn contended_updates(
    store: Arc<DeviceStore>,
    id: DeviceId,
    config: &StressConfig,
) -> StressTestResult {
    let start = Instant::now();
    let mut handles = Vec::with_capacity(config.writers);

    for writer in 0..config.writers {
        let store = Arc::clone(&store);
        let id = id.clone();
        let attempts = config.attempts;
        handles.push(tokio::spawn(async move {
            let mut applied = 0usize;
            let mut conflicts = 0usize;
            for attempt in 0..attempts {
                let mut device = store
                    .load(&id)
                    .await
                    .expect("Failed to load device")
                    .unwrap_or_else(|| Device::new(id.clone()));
                device.target = format!("writer-{writer}-{attempt}");

                match store.store(&mut device).await {
                    Ok(()) => applied += 1,
                    Err(CoreError::Conflict { .. }) => conflicts += 1,
                    Err(err) => panic!("Unexpected store error: {err}"),
                }
                tokio::task::yield_now().await;
            }
            (applied, conflicts)
        }));
    }

    let mut successful = 0;
    let mut conflicts = 0;
    for handle in handles {
        let (applied, rejected) = handle.await.expect("Writer task panicked");
        successful += applied;
        conflicts += rejected;
    }

    StressTestResult::new(successful, conflicts, start.elapsed())
}
