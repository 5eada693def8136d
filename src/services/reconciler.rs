use crate::config::RECONCILE_SCHEDULE;
use crate::services::database::{list_tracked_handles, update_streamer_status};
use crate::services::twitch::{fetch_access_token, fetch_live_streams, live_handle_set};
use anyhow::Result;
use log::{error, info};
use sqlx::SqlitePool;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};

/// Synchronize the stored live flags with the platform's reported status.
/// Returns the number of records written.
pub async fn reconcile(pool: &SqlitePool) -> Result<u64> {
    let handles = list_tracked_handles(pool).await?;
    if handles.is_empty() {
        return Ok(0);
    }

    let token = fetch_access_token().await?;
    let streams = fetch_live_streams(&token, &handles).await?;
    let live_set = live_handle_set(&streams);

    apply_live_status(pool, &handles, &live_set).await
}

/// One write per tracked handle, unchanged rows included.
pub async fn apply_live_status(
    pool: &SqlitePool,
    handles: &[String],
    live_set: &HashSet<String>,
) -> Result<u64> {
    let timestamp = chrono::Utc::now().to_rfc3339();
    let mut written = 0;

    for handle in handles {
        let live = live_set.contains(&handle.to_lowercase());
        update_streamer_status(pool, handle, live, &timestamp).await?;
        written += 1;
    }

    info!("Reconciled live status for {written} streamers.");
    Ok(written)
}

/// Serialized entry point shared by the timer and the HTTP trigger.
/// Overlapping invocations wait on the guard instead of issuing racing
/// writes to the same rows.
pub async fn run_reconcile(pool: &SqlitePool, guard: &Mutex<()>) -> Result<u64> {
    let _held = guard.lock().await;
    reconcile(pool).await
}

pub async fn setup_reconciler(pool: SqlitePool, guard: Arc<Mutex<()>>) -> Result<JobScheduler> {
    info!("Setting up live-status reconcile scheduler...");

    let scheduler = JobScheduler::new().await?;

    let reconcile_job = Job::new_async(RECONCILE_SCHEDULE.as_str(), move |_uuid, _l| {
        let pool = pool.clone();
        let guard = guard.clone();
        Box::pin(async move {
            if let Err(e) = run_reconcile(&pool, &guard).await {
                error!("Scheduled reconcile failed: {e:?}");
            }
        })
    })?;

    scheduler.add(reconcile_job).await?;
    scheduler.start().await?;
    info!("Reconcile scheduler started.");

    Ok(scheduler)
}
