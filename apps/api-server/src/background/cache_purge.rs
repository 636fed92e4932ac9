use tokio_cron_scheduler::JobSchedulerError;

use agora_core::services::VerificationService;

use super::Scheduler;

/// Drop expired verification codes once.
pub async fn run_cache_purge(verification: &VerificationService) {
    if let Err(e) = verification.purge_expired().await {
        tracing::error!(error = %e, "Cache purge failed");
    }
}

/// Register the purge on the configured cron schedule.
pub async fn register_cache_purge(
    scheduler: &Scheduler,
    verification: VerificationService,
) -> Result<uuid::Uuid, JobSchedulerError> {
    let schedule = scheduler.config().cache_purge_cron.clone();
    scheduler
        .every("cache-purge", &schedule, move || {
            let verification = verification.clone();
            async move { run_cache_purge(&verification).await }
        })
        .await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use agora_core::ports::Cache;
    use agora_infra::{InMemoryCache, InMemoryUserRepository};

    #[tokio::test]
    async fn test_purge_drops_expired_codes_only() {
        let cache = Arc::new(InMemoryCache::new());
        cache.set("verification:code:111111", "stale", Duration::from_millis(1)).await.unwrap();
        cache.set("verification:code:222222", "fresh", Duration::from_secs(60)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        let verification = VerificationService::new(
            Arc::new(InMemoryUserRepository::new()),
            cache.clone(),
            Default::default(),
        );
        run_cache_purge(&verification).await;

        assert_eq!(cache.purge_expired().await.unwrap(), 0);
        assert!(cache.exists("verification:code:222222").await.unwrap());
    }

    #[tokio::test]
    async fn test_purge_job_registers_on_default_schedule() {
        let scheduler = Scheduler::new(Default::default()).await.unwrap();
        let verification = VerificationService::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryCache::new()),
            Default::default(),
        );
        assert!(register_cache_purge(&scheduler, verification).await.is_ok());
    }
}
