use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use uuid::Uuid;

use crate::config::SchedulerConfig;
use crate::item_manager::ItemManager;
use crate::utils::error::AppError;
use crate::Result;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchedulerStats {
    pub job_id: Option<Uuid>,
    pub cron_expression: String,
    pub run_count: u64,
    pub error_count: u64,
    pub skipped_count: u64,
    pub last_run: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl From<JobSchedulerError> for AppError {
    fn from(err: JobSchedulerError) -> Self {
        AppError::Internal(format!("Scheduler error: {:?}", err))
    }
}

/// Marks a cycle as running; cleared on drop, including on panic.
struct RunGuard(Arc<AtomicBool>);

impl RunGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(Arc::clone(flag)))
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// In-process stand-in for an external cron trigger.
///
/// Runs the full refresh cycle on a cron schedule. Overlapping runs are
/// skipped rather than queued.
pub struct RefreshScheduler {
    scheduler: JobScheduler,
    items: Arc<ItemManager>,
    config: SchedulerConfig,
    stats: Arc<RwLock<SchedulerStats>>,
    running: Arc<AtomicBool>,
}

impl RefreshScheduler {
    pub async fn new(items: Arc<ItemManager>, config: SchedulerConfig) -> Result<Self> {
        let scheduler = JobScheduler::new().await?;
        let stats = SchedulerStats {
            cron_expression: config.cron.clone(),
            ..SchedulerStats::default()
        };

        Ok(Self {
            scheduler,
            items,
            config,
            stats: Arc::new(RwLock::new(stats)),
            running: Arc::new(AtomicBool::new(false)),
        })
    }

    pub async fn start(&mut self) -> Result<()> {
        let items = Arc::clone(&self.items);
        let stats = Arc::clone(&self.stats);
        let running = Arc::clone(&self.running);

        let job = Job::new_async(self.config.cron.as_str(), move |_uuid, _l| {
            let items = Arc::clone(&items);
            let stats = Arc::clone(&stats);
            let running = Arc::clone(&running);
            Box::pin(async move {
                Self::execute_refresh(items, stats, running).await;
            })
        })?;

        let job_id = self.scheduler.add(job).await?;
        self.stats.write().await.job_id = Some(job_id);
        self.scheduler.start().await?;

        tracing::info!(cron = %self.config.cron, "Refresh scheduler started");
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<()> {
        self.scheduler.shutdown().await?;
        tracing::info!("Refresh scheduler shutdown");
        Ok(())
    }

    pub async fn stats(&self) -> SchedulerStats {
        self.stats.read().await.clone()
    }

    async fn execute_refresh(items: Arc<ItemManager>, stats: Arc<RwLock<SchedulerStats>>, running: Arc<AtomicBool>) {
        let _guard = match RunGuard::acquire(&running) {
            Some(guard) => guard,
            None => {
                tracing::warn!("Previous refresh still running, skipping this tick");
                stats.write().await.skipped_count += 1;
                return;
            }
        };

        let result = items.run_refresh_cycle().await;

        let mut stats = stats.write().await;
        stats.run_count += 1;
        stats.last_run = Some(Utc::now());
        match result {
            Ok(summary) => {
                stats.last_error = None;
                tracing::info!(
                    items = summary.items.len(),
                    drops = summary.drops_detected,
                    notified = summary.notifications_sent,
                    "Scheduled refresh completed"
                );
            }
            Err(e) => {
                stats.error_count += 1;
                stats.last_error = Some(e.to_string());
                tracing::error!(error = %e, "Scheduled refresh failed");
            }
        }
    }
}
