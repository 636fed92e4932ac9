//! Background processing: the auto-publish sweep and the cache purge.

mod cache_purge;
mod publish_sweep;
mod scheduler;

pub use cache_purge::{register_cache_purge, run_cache_purge};
pub use publish_sweep::{register_publish_sweep, run_publish_sweep};
pub use scheduler::{Scheduler, SchedulerConfig};
