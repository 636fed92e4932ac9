use chrono::Utc;
use tokio_cron_scheduler::JobSchedulerError;

use agora_core::services::PostService;

use super::Scheduler;

/// Apply every due Pending -> Published transition once.
pub async fn run_publish_sweep(posts: &PostService) {
    match posts.publish_due(Utc::now()).await {
        Ok(report) => {
            tracing::debug!(
                published = report.published.len(),
                lost_races = report.lost_races,
                "Publish sweep tick"
            );
        }
        Err(e) => tracing::error!(error = %e, "Publish sweep failed"),
    }
}

/// Register the sweep on the configured cron schedule.
pub async fn register_publish_sweep(
    scheduler: &Scheduler,
    posts: PostService,
) -> Result<uuid::Uuid, JobSchedulerError> {
    let schedule = scheduler.config().publish_sweep_cron.clone();
    scheduler
        .every("publish-sweep", &schedule, move || {
            let posts = posts.clone();
            async move { run_publish_sweep(&posts).await }
        })
        .await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeDelta;

    use super::*;
    use agora_core::domain::{Level, PostStatus, User};
    use agora_core::ports::BaseRepository;
    use agora_infra::{InMemoryBookmarkRepository, InMemoryPostRepository};

    #[tokio::test]
    async fn test_sweep_publishes_due_posts() {
        let repo = Arc::new(InMemoryPostRepository::new());
        let posts = PostService::new(repo.clone(), Arc::new(InMemoryBookmarkRepository::new()));

        let mut author = User::new("a@example.com".into(), "hash".into(), None);
        author.set_level(Level::VERIFIED, Utc::now());
        let long_ago = Utc::now() - TimeDelta::hours(4);
        let post = posts.create(&author, "old".into(), true, long_ago).await.unwrap();

        run_publish_sweep(&posts).await;

        let stored = repo.find_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(stored.status().unwrap(), PostStatus::Published);
    }
}
