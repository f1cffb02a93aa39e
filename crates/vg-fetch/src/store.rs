//! The ephemeral job store.
//!
//! Owns the full lifecycle of conversion artifacts: request validation,
//! decoder invocation with a hard timeout, artifact discovery, bounded-time
//! exposure, and eventual cleanup. One directory per job under the downloads
//! root, named by the job id; deletion is always carried out by the sweep,
//! never by ad hoc timers, so a process restart cannot orphan a pending
//! deletion (the startup sweep catches leftovers by age).

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use vg_core::config::DownloadsConfig;
use vg_core::{Error, JobId, Result};

use crate::command::DecoderCommand;
use crate::format::MediaFormat;
use crate::source;

/// One request to convert/retrieve a media artifact from a source URL.
#[derive(Debug, Clone, Serialize)]
pub struct DownloadRequest {
    pub source_url: String,
    pub format: MediaFormat,
}

/// Job lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Ready,
    Failed,
    Expired,
}

/// A download job and its lifecycle bookkeeping.
#[derive(Debug, Clone, Serialize)]
pub struct Job {
    pub id: JobId,
    pub request: DownloadRequest,
    pub status: JobStatus,
    /// Set iff `status == Ready`.
    pub output_path: Option<PathBuf>,
    pub created_at: DateTime<Utc>,
    pub ready_at: Option<DateTime<Utc>>,
    /// Earliest instant the sweep may delete this job's directory.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Counters reported by a sweep pass.
#[derive(Debug, Default, Clone, Copy)]
pub struct SweepStats {
    /// Jobs transitioned to Expired.
    pub expired_jobs: usize,
    /// Directories removed from disk.
    pub removed_dirs: usize,
    /// Per-entry failures (logged and skipped).
    pub errors: usize,
}

/// Tunable store behaviour, decoupled from the config file so tests can use
/// second-scale values.
#[derive(Debug, Clone)]
pub struct JobStoreOptions {
    /// Wall-clock budget for one decoder invocation.
    pub decoder_timeout: Duration,
    /// How long a Ready artifact is retained before the sweep removes it.
    pub retention: Duration,
    /// Expiry re-armed on each successful fetch, so retried or slow
    /// transfers keep working.
    pub post_fetch_linger: Duration,
}

impl Default for JobStoreOptions {
    fn default() -> Self {
        Self::from(&DownloadsConfig::default())
    }
}

impl From<&DownloadsConfig> for JobStoreOptions {
    fn from(config: &DownloadsConfig) -> Self {
        Self {
            decoder_timeout: config.decoder_timeout(),
            retention: config.retention(),
            post_fetch_linger: config.post_fetch_linger(),
        }
    }
}

/// Thread-safe store supervising ephemeral conversion artifacts.
///
/// Concurrent submissions are isolated per job id; the shared downloads root
/// is only ever appended to (new subdirectories) or swept (removal by age),
/// so no cross-job locking is needed.
pub struct JobStore {
    root: PathBuf,
    decoder: PathBuf,
    options: JobStoreOptions,
    jobs: DashMap<JobId, Job>,
}

impl JobStore {
    /// Create a store rooted at `root`, creating the directory if needed.
    pub fn new(root: PathBuf, decoder: PathBuf, options: JobStoreOptions) -> Result<Self> {
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            decoder,
            options,
            jobs: DashMap::new(),
        })
    }

    /// The downloads root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Look up a job snapshot by id.
    pub fn job(&self, id: JobId) -> Option<Job> {
        self.jobs.get(&id).map(|entry| entry.value().clone())
    }

    /// Number of jobs currently tracked.
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    fn decoder_name(&self) -> String {
        self.decoder
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.decoder.to_string_lossy().to_string())
    }

    /// Validate a request, run the decoder, and discover the artifact.
    ///
    /// Blocks the calling context until the decoder completes, fails, or
    /// times out. All decoder failures are terminal for the job; the caller
    /// may re-submit.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidRequest`] before any side effect for unrecognized
    /// URLs; [`Error::ConversionFailed`], [`Error::Timeout`], or
    /// [`Error::ArtifactMissing`] afterwards, with the job directory removed.
    pub async fn submit(&self, request: DownloadRequest) -> Result<Job> {
        // Validation precedes any filesystem or subprocess side effect.
        source::validate_source_url(&request.source_url)?;

        let id = JobId::new();
        let dir = self.root.join(id.to_string());
        std::fs::create_dir_all(&dir)?;

        let job = Job {
            id,
            request: request.clone(),
            status: JobStatus::Pending,
            output_path: None,
            created_at: Utc::now(),
            ready_at: None,
            expires_at: None,
        };
        self.jobs.insert(id, job);

        let template = dir.join("%(title)s.%(ext)s");
        let args = request.format.decoder_args(&template, &request.source_url);

        self.set_status(id, JobStatus::Running);
        tracing::info!(
            job_id = %id,
            url = %request.source_url,
            format = %request.format,
            "Starting decoder"
        );

        let result = DecoderCommand::new(self.decoder.clone())
            .args(args)
            .timeout(self.options.decoder_timeout)
            .run()
            .await;

        match result {
            Ok(output) if output.status.success() => {
                if !output.stderr.trim().is_empty() {
                    tracing::debug!(job_id = %id, stderr = %output.stderr.trim(), "Decoder stderr");
                }
                match self.discover_artifact(id, &dir) {
                    Ok(artifact) => {
                        let now = Utc::now();
                        let ready = {
                            let mut entry = self
                                .jobs
                                .get_mut(&id)
                                .ok_or_else(|| Error::Internal(format!("job {id} vanished")))?;
                            entry.status = JobStatus::Ready;
                            entry.output_path = Some(artifact.clone());
                            entry.ready_at = Some(now);
                            entry.expires_at = Some(now + self.options.retention);
                            entry.clone()
                        };
                        tracing::info!(
                            job_id = %id,
                            artifact = %artifact.display(),
                            "Job ready"
                        );
                        Ok(ready)
                    }
                    Err(e) => {
                        self.fail_job(id, &dir);
                        Err(e)
                    }
                }
            }
            Ok(output) => {
                // Raw diagnostics go to the log, never to the caller.
                tracing::error!(
                    job_id = %id,
                    status = %output.status,
                    stderr = %output.stderr.trim(),
                    "Decoder exited with failure"
                );
                self.fail_job(id, &dir);
                Err(Error::conversion(
                    self.decoder_name(),
                    format!("exited with status {}", output.status),
                ))
            }
            Err(e) => {
                tracing::error!(job_id = %id, error = %e, "Decoder invocation failed");
                self.fail_job(id, &dir);
                Err(e)
            }
        }
    }

    /// Look up a Ready job and return its artifact path for streaming.
    ///
    /// Re-arms the job's expiry to `now + post_fetch_linger` so the sweep
    /// leaves the artifact alone long enough for retried transfers.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] for unknown ids, non-Ready jobs, and jobs whose
    /// directory was already swept.
    pub fn fetch(&self, id: JobId) -> Result<(Job, PathBuf)> {
        let mut entry = self
            .jobs
            .get_mut(&id)
            .ok_or_else(|| Error::not_found("job", id))?;

        if entry.status != JobStatus::Ready {
            return Err(Error::not_found("job", id));
        }

        let path = entry
            .output_path
            .clone()
            .ok_or_else(|| Error::Internal(format!("ready job {id} has no output path")))?;

        if !path.exists() {
            // Swept underneath us; never serve a stale handle.
            entry.status = JobStatus::Expired;
            entry.output_path = None;
            return Err(Error::not_found("job", id));
        }

        entry.expires_at = Some(Utc::now() + self.options.post_fetch_linger);
        Ok((entry.clone(), path))
    }

    /// Delete expired and over-age job directories.
    ///
    /// Two passes, each fault-isolated per entry: first the registry jobs
    /// whose explicit `expires_at` has passed, then every subdirectory of
    /// the downloads root older than `max_age` by modified time regardless
    /// of registry state (the safety net for restarts and lost entries).
    /// Idempotent.
    pub fn sweep(&self, max_age: Duration) -> SweepStats {
        let now = Utc::now();
        let mut stats = SweepStats::default();

        // Pass 1: explicit expiry timestamps.
        let due: Vec<JobId> = self
            .jobs
            .iter()
            .filter(|entry| {
                entry.status == JobStatus::Ready
                    && entry.expires_at.is_some_and(|t| t <= now)
            })
            .map(|entry| entry.id)
            .collect();

        for id in due {
            let dir = self.root.join(id.to_string());
            if dir.exists() {
                if let Err(e) = std::fs::remove_dir_all(&dir) {
                    tracing::warn!(job_id = %id, error = %e, "Sweep failed to remove job directory");
                    stats.errors += 1;
                    continue;
                }
                stats.removed_dirs += 1;
            }
            if let Some(mut entry) = self.jobs.get_mut(&id) {
                entry.status = JobStatus::Expired;
                entry.output_path = None;
            }
            stats.expired_jobs += 1;
            tracing::info!(job_id = %id, "Job expired");
        }

        // Pass 2: age-based removal of anything under the root.
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(root = %self.root.display(), error = %e, "Sweep failed to list downloads root");
                stats.errors += 1;
                return stats;
            }
        };

        for entry in entries {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    tracing::warn!(error = %e, "Sweep failed to read directory entry");
                    stats.errors += 1;
                    continue;
                }
            };
            if !path.is_dir() {
                continue;
            }
            let age = match path.metadata().and_then(|m| m.modified()).and_then(|mtime| {
                mtime
                    .elapsed()
                    .map_err(|e| std::io::Error::other(e.to_string()))
            }) {
                Ok(age) => age,
                Err(e) => {
                    tracing::warn!(dir = %path.display(), error = %e, "Sweep could not determine directory age");
                    stats.errors += 1;
                    continue;
                }
            };
            if age <= max_age {
                continue;
            }
            if let Err(e) = std::fs::remove_dir_all(&path) {
                tracing::warn!(dir = %path.display(), error = %e, "Sweep failed to remove directory");
                stats.errors += 1;
                continue;
            }
            stats.removed_dirs += 1;
            tracing::info!(dir = %path.display(), age_secs = age.as_secs(), "Swept over-age directory");

            // Keep the registry honest when the directory had a live entry.
            if let Some(id) = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| n.parse::<JobId>().ok())
            {
                if let Some(mut entry) = self.jobs.get_mut(&id) {
                    if entry.status == JobStatus::Ready {
                        entry.status = JobStatus::Expired;
                        entry.output_path = None;
                        stats.expired_jobs += 1;
                    }
                }
            }
        }

        // Bound registry growth: terminal entries past the age threshold
        // carry no directory and no longer serve diagnostics.
        if let Ok(cutoff) = chrono::Duration::from_std(max_age) {
            self.jobs.retain(|_, job| {
                !(matches!(job.status, JobStatus::Failed | JobStatus::Expired)
                    && now - job.created_at > cutoff)
            });
        }

        if stats.expired_jobs > 0 || stats.removed_dirs > 0 || stats.errors > 0 {
            tracing::debug!(
                expired = stats.expired_jobs,
                removed = stats.removed_dirs,
                errors = stats.errors,
                "Sweep pass complete"
            );
        }
        stats
    }

    fn set_status(&self, id: JobId, status: JobStatus) {
        if let Some(mut entry) = self.jobs.get_mut(&id) {
            entry.status = status;
        }
    }

    /// Mark a job Failed and drop its directory; failures are terminal.
    fn fail_job(&self, id: JobId, dir: &Path) {
        self.set_status(id, JobStatus::Failed);
        if dir.exists() {
            if let Err(e) = std::fs::remove_dir_all(dir) {
                tracing::warn!(job_id = %id, error = %e, "Failed to remove failed job directory");
            }
        }
    }

    /// The decoder decides the output filename and extension, so the
    /// artifact is discovered by listing rather than predicted.
    fn discover_artifact(&self, id: JobId, dir: &Path) -> Result<PathBuf> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();

        match files.len() {
            1 => Ok(files.remove(0)),
            0 => Err(Error::ArtifactMissing { id: id.to_string() }),
            n => {
                // One output file is the decoder contract; guessing among
                // several risks serving a thumbnail or sidecar.
                tracing::warn!(job_id = %id, count = n, "Decoder produced ambiguous output");
                Err(Error::ArtifactMissing { id: id.to_string() })
            }
        }
    }
}

/// Start a background task that sweeps the store on a fixed interval.
///
/// The first tick fires immediately, which doubles as the sweep-at-startup
/// pass that clears directories orphaned by a previous process.
pub fn start_sweep_task(
    store: Arc<JobStore>,
    interval: Duration,
    max_age: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            store.sweep(max_age);
        }
    })
}
