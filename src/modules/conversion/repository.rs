use super::model::Job;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Outcome of a transition request against the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    /// The job exists but the change would move it backwards.
    Ignored,
    Unknown,
}

/// In-memory job registry. Cloning shares the same map; contents are lost
/// when the process exits.
#[derive(Clone, Default)]
pub struct JobRepository {
    jobs: Arc<RwLock<HashMap<String, Job>>>,
}

impl JobRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, job: Job) {
        self.jobs.write().await.insert(job.id.clone(), job);
    }

    pub async fn find_by_id(&self, id: &str) -> Option<Job> {
        self.jobs.read().await.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn finish(&self, id: &str, output: PathBuf) -> Transition {
        self.update(id, |job| job.finish(output)).await
    }

    pub async fn fail(&self, id: &str, message: String) -> Transition {
        self.update(id, |job| job.fail(message)).await
    }

    pub async fn advance(&self, id: &str, progress: u8) -> Transition {
        self.update(id, |job| job.advance(progress)).await
    }

    async fn update(&self, id: &str, apply: impl FnOnce(&mut Job) -> bool) -> Transition {
        let mut jobs = self.jobs.write().await;
        match jobs.get_mut(id) {
            Some(job) => {
                if apply(job) {
                    Transition::Applied
                } else {
                    Transition::Ignored
                }
            }
            None => Transition::Unknown,
        }
    }
}
