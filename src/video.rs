//! Async video job polling.
//!
//! A job is submitted once, then re-queried at a fixed interval until the
//! provider reports it done. The wait is bounded both by a number of status
//! queries and by wall-clock time, and it stops early when the caller's
//! cancellation token fires.

use crate::ai::VideoJobService;
use crate::models::{Config, VideoRequest};
use crate::{Error, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio_retry::strategy::FixedInterval;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Provider-side video generation job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoJob {
    pub id: String,
    pub done: bool,
    pub result_uri: Option<String>,
    /// Provider error message when the job finished unsuccessfully.
    pub failure: Option<String>,
    /// Credential slot that submitted the job. Status checks and the download
    /// must reuse it.
    pub credential: Option<usize>,
}

impl VideoJob {
    pub fn pending(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            done: false,
            result_uri: None,
            failure: None,
            credential: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
    pub max_wait: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(3000),
            max_attempts: 120,
            max_wait: Duration::from_secs(600),
        }
    }
}

impl PollPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            interval: config.video_poll_interval,
            max_attempts: config.video_max_poll_attempts,
            max_wait: config.video_max_wait,
        }
    }
}

pub struct VideoPoller {
    jobs: Arc<dyn VideoJobService>,
    policy: PollPolicy,
}

impl VideoPoller {
    pub fn new(jobs: Arc<dyn VideoJobService>, policy: PollPolicy) -> Self {
        Self { jobs, policy }
    }

    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    /// Submit, wait for completion, then download the finished asset.
    pub async fn generate(
        &self,
        request: &VideoRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>> {
        let job = cancellable(cancel, self.jobs.submit_video(request)).await?;
        info!("Submitted video job {}", job.id);

        let job = match tokio::time::timeout(
            self.policy.max_wait,
            self.wait_for_completion(job, cancel),
        )
        .await
        {
            Ok(job) => job?,
            Err(_) => {
                warn!("Video job exceeded wall-clock budget of {:?}", self.policy.max_wait);
                return Err(Error::Timeout(format!(
                    "video job not done after {:?}",
                    self.policy.max_wait
                )));
            }
        };

        if let Some(failure) = &job.failure {
            return Err(Error::AiProvider(format!(
                "Video job {} failed: {}",
                job.id, failure
            )));
        }

        let uri = job
            .result_uri
            .as_deref()
            .ok_or_else(|| Error::no_content("video", "no video URI returned"))?;

        info!("Video job {} done, downloading asset", job.id);
        cancellable(cancel, self.jobs.download_video(&job, uri)).await
    }

    async fn wait_for_completion(
        &self,
        mut job: VideoJob,
        cancel: &CancellationToken,
    ) -> Result<VideoJob> {
        let mut delays =
            FixedInterval::new(self.policy.interval).take(self.policy.max_attempts as usize);
        let mut attempts = 0u32;

        while !job.done {
            let Some(delay) = delays.next() else {
                warn!(
                    "Video job {} still running after {} status checks",
                    job.id, attempts
                );
                return Err(Error::Timeout(format!(
                    "video job {} not done after {} status checks",
                    job.id, attempts
                )));
            };

            cancellable(cancel, async {
                tokio::time::sleep(delay).await;
                Ok(())
            })
            .await?;

            attempts += 1;
            job = cancellable(cancel, self.jobs.refresh_video_job(&job)).await?;
            debug!(
                "Video job {} status check {}: done={}",
                job.id, attempts, job.done
            );
        }

        Ok(job)
    }
}

async fn cancellable<T>(
    cancel: &CancellationToken,
    future: impl std::future::Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::Cancelled),
        result = future => result,
    }
}
