//! Periodic eviction of expired jobs and their rendered files.
//!
//! Expiry is based on submission time only; a job is reclaimed whether it
//! completed, failed or is still processing.

use crate::modules::jobs::store::JobStore;
use std::io::ErrorKind;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info, warn};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub removed: usize,
    pub files_deleted: usize,
}

pub struct Reclaimer {
    store: JobStore,
    ttl: Duration,
    period: Duration,
}

impl Reclaimer {
    pub fn new(store: JobStore, ttl: Duration, period: Duration) -> Self {
        Self { store, ttl, period }
    }

    /// Runs forever; spawn it. The first sweep happens one period after start.
    pub async fn run(self) {
        info!(
            "🧹 Starting job reclaimer (ttl: {:?}, interval: {:?})",
            self.ttl, self.period
        );

        let mut ticker = interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let report = self.sweep(Instant::now()).await;
            if report.removed > 0 {
                info!(
                    "🧹 Reclaimed {} job(s), deleted {} file(s)",
                    report.removed, report.files_deleted
                );
            }
        }
    }

    /// Removes every record older than the ttl at `now`, then its file.
    ///
    /// The record goes first so no new download can start on a file that is
    /// about to be deleted. File errors are logged and ignored.
    pub async fn sweep(&self, now: Instant) -> SweepReport {
        let mut report = SweepReport::default();

        for (id, record) in self.store.list_all().await {
            if !record.is_expired(now, self.ttl) {
                continue;
            }

            // Re-read on removal: the job may have finished since the snapshot.
            let Some(removed) = self.store.remove(id).await else {
                continue;
            };
            report.removed += 1;

            let Some(path) = removed.output_path() else {
                debug!(job_id = %id, "Reclaimed job without output");
                continue;
            };

            match tokio::fs::remove_file(path).await {
                Ok(()) => {
                    report.files_deleted += 1;
                    debug!(job_id = %id, "Deleted {}", path.display());
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => warn!(job_id = %id, "Failed to delete {}: {}", path.display(), e),
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::jobs::model::JobStatus;
    use std::path::PathBuf;
    use uuid::Uuid;

    const TTL: Duration = Duration::from_secs(1800);

    fn reclaimer(store: &JobStore) -> Reclaimer {
        Reclaimer::new(store.clone(), TTL, TTL)
    }

    fn later() -> Instant {
        Instant::now() + TTL + Duration::from_secs(1)
    }

    #[tokio::test]
    async fn fresh_jobs_survive_a_sweep() {
        let store = JobStore::new();
        let id = Uuid::new_v4();
        store.create(id).await.unwrap();

        let report = reclaimer(&store).sweep(Instant::now()).await;

        assert_eq!(report, SweepReport::default());
        assert_eq!(store.get(id).await.unwrap().status(), JobStatus::Processing);
    }

    #[tokio::test]
    async fn expired_completed_job_loses_record_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("done.mp4");
        std::fs::write(&path, b"video").unwrap();

        let store = JobStore::new();
        let id = Uuid::new_v4();
        store.create(id).await.unwrap();
        store.set_completed(id, path.clone()).await.unwrap();

        let report = reclaimer(&store).sweep(later()).await;

        assert_eq!(report, SweepReport { removed: 1, files_deleted: 1 });
        assert!(store.get(id).await.is_none());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn expiry_ignores_outcome() {
        let store = JobStore::new();
        let processing = Uuid::new_v4();
        let failed = Uuid::new_v4();
        store.create(processing).await.unwrap();
        store.create(failed).await.unwrap();
        store.set_error(failed, "invalid scene 2").await.unwrap();

        let report = reclaimer(&store).sweep(later()).await;

        assert_eq!(report.removed, 2);
        assert_eq!(report.files_deleted, 0);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn missing_file_does_not_block_record_removal() {
        let store = JobStore::new();
        let id = Uuid::new_v4();
        store.create(id).await.unwrap();
        store
            .set_completed(id, PathBuf::from("/nonexistent/render-server/gone.mp4"))
            .await
            .unwrap();

        let report = reclaimer(&store).sweep(later()).await;

        assert_eq!(report, SweepReport { removed: 1, files_deleted: 0 });
        assert!(store.get(id).await.is_none());
    }

    #[tokio::test]
    async fn only_expired_jobs_are_reclaimed() {
        let store = JobStore::new();
        let old = Uuid::new_v4();
        store.create(old).await.unwrap();
        let now = store.get(old).await.unwrap().created_at + TTL + Duration::from_millis(10);

        tokio::time::sleep(Duration::from_millis(20)).await;
        let young = Uuid::new_v4();
        store.create(young).await.unwrap();

        // Old job is 10ms past the ttl, the young one at least 10ms short of it.
        let report = reclaimer(&store).sweep(now).await;

        assert_eq!(report.removed, 1);
        assert!(store.get(old).await.is_none());
        assert!(store.get(young).await.is_some());
    }

    #[tokio::test]
    async fn run_sweeps_once_per_period() {
        tokio::time::pause();

        let store = JobStore::new();
        let id = Uuid::new_v4();
        store.create(id).await.unwrap();

        let ttl = Duration::from_secs(10);
        let period = Duration::from_secs(60);
        let task = tokio::spawn(Reclaimer::new(store.clone(), ttl, period).run());

        // Expired well before the first tick, but nothing sweeps until then.
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(store.get(id).await.is_some());

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert!(store.get(id).await.is_none());

        task.abort();
    }
}
