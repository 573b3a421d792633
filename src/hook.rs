//! Scoring-event hook
//!
//! [`ScoreHook`] is the facade the host platform binds to its post-scoring
//! event. [`ScoreHook::submission_scored`] runs only bounded metadata
//! lookups, queues heavy work for the background worker, and returns
//! immediately; the scoring request is never blocked on archive processing.

use crate::config::Config;
use crate::error::{Error, Result, StorageError};
use crate::store::{ServiceIdentity, Stores};
use crate::types::{AbstractJob, Event, SubmissionId};
use crate::worker::{self, JobContext};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// How long shutdown waits for the in-flight job before giving up
const SHUTDOWN_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Fetching items or files with a limit of two distinguishes "exactly one"
/// from "more than one" without listing whole folders.
const CARDINALITY_PROBE_LIMIT: usize = 2;

/// Post-scoring hook that republishes a submission's PDF abstract
pub struct ScoreHook {
    config: Arc<Config>,
    stores: Stores,
    identity: ServiceIdentity,
    event_tx: broadcast::Sender<Event>,
    job_tx: mpsc::Sender<AbstractJob>,
    accepting_new: AtomicBool,
    cancel: CancellationToken,
    worker_handle: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl ScoreHook {
    /// Create a hook and spawn its publish worker.
    ///
    /// Validates the configured API base URL up front; an invalid URL is the
    /// only construction-time failure.
    pub fn new(config: Config, stores: Stores) -> Result<Self> {
        let api_base = crate::links::parse_api_base(&config.publish.api_base)?;

        let config = Arc::new(config);
        let (event_tx, _rx) = broadcast::channel(config.worker.event_capacity);
        let (job_tx, job_rx) = mpsc::channel(config.worker.queue_capacity);
        let identity = ServiceIdentity::new();
        let cancel = CancellationToken::new();

        let ctx = JobContext {
            stores: stores.clone(),
            config: config.clone(),
            api_base,
            identity: identity.clone(),
            event_tx: event_tx.clone(),
        };
        let worker_handle = worker::spawn_publish_worker(ctx, job_rx, cancel.clone());

        Ok(Self {
            config,
            stores,
            identity,
            event_tx,
            job_tx,
            accepting_new: AtomicBool::new(true),
            cancel,
            worker_handle: Mutex::new(Some(worker_handle)),
        })
    }

    /// Subscribe to publishing outcome events.
    ///
    /// Multiple subscribers are supported; each receives all events
    /// independently. The triggering caller still does not await results,
    /// but every outcome, including failures, is observable here.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Handle a "submission scored" event.
    ///
    /// Validates phase metadata and folder/item/file cardinality, then queues
    /// the heavy work and returns. Gate mismatches terminate silently with
    /// `Ok(())`; a missing submission or phase is an error because the event
    /// referenced a record that must exist.
    pub async fn submission_scored(&self, id: &SubmissionId) -> Result<()> {
        if !self.accepting_new.load(Ordering::SeqCst) {
            return Err(Error::ShuttingDown);
        }

        let submission = self
            .stores
            .submissions
            .load(id)
            .await?
            .ok_or_else(|| StorageError::NotFound {
                kind: "submission",
                id: id.to_string(),
            })?;
        let phase = self
            .stores
            .phases
            .load_elevated(&self.identity, &submission.phase_id)
            .await?
            .ok_or_else(|| StorageError::NotFound {
                kind: "phase",
                id: submission.phase_id.to_string(),
            })?;

        // Gate 1: phase marker
        let marker = phase
            .meta
            .get(&self.config.gate.phase_meta_key)
            .and_then(|value| value.as_str());
        if marker != Some(self.config.gate.phase_meta_value.as_str()) {
            debug!(
                submission_id = %id,
                phase_id = %phase.id,
                "phase marker does not match, skipping submission"
            );
            return Ok(());
        }

        // Gate 2: submission folder must exist
        let Some(folder) = self
            .stores
            .folders
            .load_elevated(&self.identity, &submission.folder_id)
            .await?
        else {
            debug!(submission_id = %id, "submission folder not found, skipping");
            return Ok(());
        };

        // Gate 3: exactly one item in the folder
        let items = self
            .stores
            .folders
            .child_items(&folder.id, CARDINALITY_PROBE_LIMIT)
            .await?;
        if items.len() != 1 {
            debug!(
                submission_id = %id,
                item_count = items.len(),
                "submission folder does not contain exactly one item, skipping"
            );
            return Ok(());
        }

        // Gate 4: exactly one file in the item
        let files = self
            .stores
            .items
            .child_files(&items[0].id, CARDINALITY_PROBE_LIMIT)
            .await?;
        if files.len() != 1 {
            debug!(
                submission_id = %id,
                file_count = files.len(),
                "submission item does not contain exactly one file, skipping"
            );
            return Ok(());
        }

        let job = AbstractJob {
            submission,
            folder,
            file: files[0].clone(),
        };
        self.job_tx.try_send(job).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => Error::QueueFull,
            mpsc::error::TrySendError::Closed(_) => Error::ShuttingDown,
        })?;

        self.event_tx.send(Event::Queued { submission: id.clone() }).ok();
        Ok(())
    }

    /// Gracefully shut down the hook.
    ///
    /// Stops accepting new submissions, lets the worker finish its in-flight
    /// job, and waits for it with a timeout. Jobs still queued are dropped.
    pub async fn shutdown(&self) -> Result<()> {
        tracing::info!("initiating graceful shutdown");
        self.accepting_new.store(false, Ordering::SeqCst);
        self.cancel.cancel();

        let handle = self.worker_handle.lock().await.take();
        if let Some(handle) = handle {
            match tokio::time::timeout(SHUTDOWN_TIMEOUT, handle).await {
                Ok(Ok(())) => tracing::info!("publish worker stopped"),
                Ok(Err(e)) => tracing::error!(error = %e, "publish worker panicked"),
                Err(_) => tracing::warn!("timed out waiting for publish worker to stop"),
            }
        }

        self.event_tx.send(Event::Shutdown).ok();
        Ok(())
    }
}
