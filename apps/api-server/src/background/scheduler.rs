//! Thin wrapper over `tokio-cron-scheduler` for named periodic jobs.

use std::future::Future;

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use uuid::Uuid;

/// Six-field cron (with seconds): every minute at second zero.
pub const DEFAULT_SWEEP_CRON: &str = "0 * * * * *";

/// Every five minutes at second thirty.
pub const DEFAULT_CACHE_PURGE_CRON: &str = "30 */5 * * * *";

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// `SCHEDULER_ENABLED=false` turns off auto-publishing and the cache purge.
    pub enabled: bool,
    pub publish_sweep_cron: String,
    pub cache_purge_cron: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            publish_sweep_cron: DEFAULT_SWEEP_CRON.to_string(),
            cache_purge_cron: DEFAULT_CACHE_PURGE_CRON.to_string(),
        }
    }
}

impl SchedulerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: std::env::var("SCHEDULER_ENABLED")
                .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "false" | "0" | "off"))
                .unwrap_or(defaults.enabled),
            publish_sweep_cron: cron_var("PUBLISH_SWEEP_CRON").unwrap_or(defaults.publish_sweep_cron),
            cache_purge_cron: cron_var("CACHE_PURGE_CRON").unwrap_or(defaults.cache_purge_cron),
        }
    }
}

fn cron_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub struct Scheduler {
    jobs: JobScheduler,
    config: SchedulerConfig,
}

impl Scheduler {
    pub async fn new(config: SchedulerConfig) -> Result<Self, JobSchedulerError> {
        Ok(Self {
            jobs: JobScheduler::new().await?,
            config,
        })
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Run `task` on `schedule`. Ticks of the same job may overlap if a run
    /// outlasts the interval.
    pub async fn every<F, Fut>(&self, name: &'static str, schedule: &str, task: F) -> Result<Uuid, JobSchedulerError>
    where
        F: Fn() -> Fut + Send + Sync + Clone + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let job = Job::new_async(schedule, move |_id, _scheduler| {
            let task = task.clone();
            Box::pin(async move {
                tracing::trace!(job = name, "Job tick");
                task().await
            })
        })?;

        let id = self.jobs.add(job).await?;
        tracing::info!(job = name, job_id = %id, schedule, "Job scheduled");
        Ok(id)
    }

    pub async fn start(&self) -> Result<(), JobSchedulerError> {
        self.jobs.start().await?;
        tracing::info!("Scheduler running");
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<(), JobSchedulerError> {
        self.jobs.shutdown().await?;
        tracing::info!("Scheduler stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_schedule_is_rejected() {
        let scheduler = Scheduler::new(SchedulerConfig::default()).await.unwrap();
        let result = scheduler.every("broken", "every minute please", || async {}).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_default_schedule_is_accepted() {
        let scheduler = Scheduler::new(SchedulerConfig::default()).await.unwrap();
        let config = scheduler.config().clone();
        assert!(scheduler.every("sweep", &config.publish_sweep_cron, || async {}).await.is_ok());
        assert!(scheduler.every("purge", &config.cache_purge_cron, || async {}).await.is_ok());
    }
}
