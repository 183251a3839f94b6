//! 取り込みジョブの進捗管理

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Running,
    Completed,
    Failed,
}

/// ジョブ1件の進捗
#[derive(Debug, Clone, Serialize)]
pub struct JobStatus {
    pub id: Uuid,
    pub state: JobState,
    pub total: usize,
    pub processed: usize,
    /// 直近に処理したファイル名、または失敗理由
    pub message: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl JobStatus {
    /// 進捗率（0-100）
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        ((self.processed.min(self.total) * 100) / self.total) as u8
    }
}

/// ジョブIDごとの進捗レジストリ
#[derive(Debug, Clone, Default)]
pub struct JobRegistry {
    jobs: Arc<Mutex<HashMap<Uuid, JobStatus>>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, JobStatus>> {
        // poison 時も中身を使う
        self.jobs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn start(&self, total: usize) -> Uuid {
        let id = Uuid::new_v4();
        self.lock().insert(
            id,
            JobStatus {
                id,
                state: JobState::Running,
                total,
                processed: 0,
                message: None,
                started_at: Utc::now(),
                finished_at: None,
            },
        );
        id
    }

    pub fn advance(&self, id: Uuid, file_name: &str) {
        if let Some(job) = self.lock().get_mut(&id) {
            job.processed += 1;
            job.message = Some(file_name.to_string());
        }
    }

    pub fn complete(&self, id: Uuid) {
        self.finish(id, JobState::Completed, None);
    }

    pub fn fail(&self, id: Uuid, reason: impl Into<String>) {
        self.finish(id, JobState::Failed, Some(reason.into()));
    }

    fn finish(&self, id: Uuid, state: JobState, message: Option<String>) {
        if let Some(job) = self.lock().get_mut(&id) {
            job.state = state;
            job.finished_at = Some(Utc::now());
            if message.is_some() {
                job.message = message;
            }
        }
    }

    pub fn get(&self, id: Uuid) -> Option<JobStatus> {
        self.lock().get(&id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_progress() {
        let registry = JobRegistry::new();
        let id = registry.start(4);

        registry.advance(id, "a.png");
        registry.advance(id, "b.png");
        let status = registry.get(id).unwrap();
        assert_eq!(status.state, JobState::Running);
        assert_eq!(status.percent(), 50);
        assert_eq!(status.message.as_deref(), Some("b.png"));

        registry.complete(id);
        let status = registry.get(id).unwrap();
        assert_eq!(status.state, JobState::Completed);
        assert!(status.finished_at.is_some());
    }

    #[test]
    fn test_jobs_are_independent() {
        let registry = JobRegistry::new();
        let first = registry.start(1);
        let second = registry.start(2);

        registry.advance(first, "x.png");
        registry.fail(second, "disk full");

        assert_eq!(registry.get(first).unwrap().processed, 1);
        assert_eq!(registry.get(second).unwrap().processed, 0);
        assert_eq!(registry.get(second).unwrap().state, JobState::Failed);
        assert_eq!(registry.get(second).unwrap().message.as_deref(), Some("disk full"));
        assert_eq!(registry.get(first).unwrap().state, JobState::Running);
    }

    #[test]
    fn test_empty_job_is_complete_percent() {
        let registry = JobRegistry::new();
        let id = registry.start(0);
        assert_eq!(registry.get(id).unwrap().percent(), 100);
        assert!(registry.get(Uuid::new_v4()).is_none());
    }
}
