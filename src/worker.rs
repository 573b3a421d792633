//! Publish worker
//!
//! A single background task drains the job queue and runs the processing
//! chain per job: read the stored ZIP into memory, extract the PDF abstract,
//! republish it, record the download link. Every outcome is emitted on the
//! event channel so nothing fails silently, even though the original scoring
//! request never awaits a result.

use crate::archive;
use crate::buffer;
use crate::config::Config;
use crate::error::Result;
use crate::links;
use crate::publisher;
use crate::store::{ServiceIdentity, Stores};
use crate::types::{AbstractJob, Event, FileId, SkipReason};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use url::Url;

/// Everything a processing job needs, captured once at spawn time
pub(crate) struct JobContext {
    pub(crate) stores: Stores,
    pub(crate) config: Arc<Config>,
    pub(crate) api_base: Url,
    pub(crate) identity: ServiceIdentity,
    pub(crate) event_tx: broadcast::Sender<Event>,
}

enum Outcome {
    Published { file: FileId, url: String },
    Skipped(SkipReason),
}

/// Spawn the worker task.
///
/// The worker runs one job at a time. On cancellation it finishes the job in
/// flight and exits; jobs still queued are dropped.
pub(crate) fn spawn_publish_worker(
    ctx: JobContext,
    mut job_rx: mpsc::Receiver<AbstractJob>,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("publish worker stopping");
                    break;
                }
                job = job_rx.recv() => {
                    let Some(job) = job else {
                        debug!("job queue closed, publish worker stopping");
                        break;
                    };
                    let submission_id = job.submission.id.clone();
                    match process_job(&ctx, job).await {
                        Ok(Outcome::Published { file, url }) => {
                            info!(
                                submission_id = %submission_id,
                                file_id = %file,
                                "published submission abstract"
                            );
                            ctx.event_tx
                                .send(Event::Published {
                                    submission: submission_id,
                                    file,
                                    url,
                                })
                                .ok();
                        }
                        Ok(Outcome::Skipped(reason)) => {
                            // the rejection site already logged a warning
                            ctx.event_tx
                                .send(Event::Skipped {
                                    submission: submission_id,
                                    reason,
                                })
                                .ok();
                        }
                        Err(e) => {
                            error!(
                                submission_id = %submission_id,
                                error = %e,
                                "abstract publishing failed"
                            );
                            ctx.event_tx
                                .send(Event::Failed {
                                    submission: submission_id,
                                    error: e.to_string(),
                                })
                                .ok();
                        }
                    }
                }
            }
        }
    })
}

/// Run the processing chain for one queued submission.
///
/// Archive rejections resolve to `Skipped`; storage and I/O failures
/// propagate.
async fn process_job(ctx: &JobContext, job: AbstractJob) -> Result<Outcome> {
    let zip_bytes = buffer::read_file_bytes(ctx.stores.files.as_ref(), &job.file).await?;

    let pdf = match archive::extract_abstract_pdf(&zip_bytes, &job.file.id) {
        Ok(pdf) => pdf,
        Err(reject) => return Ok(Outcome::Skipped(reject.skip_reason())),
    };

    let file = publisher::publish_abstract(
        &ctx.stores,
        &ctx.identity,
        &ctx.config.publish.folder_name,
        &job.folder,
        &job.submission.creator_id,
        pdf,
    )
    .await?;

    let url = links::inline_download_url(&ctx.api_base, &file.id);
    links::record_documentation_url(ctx.stores.submissions.as_ref(), &job.submission, url.clone())
        .await?;

    Ok(Outcome::Published { file: file.id, url })
}
