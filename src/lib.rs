//! # challenge-abstracts
//!
//! Post-scoring hook for a challenge platform: when a submission to a final
//! test phase is scored, extract the single PDF abstract from its uploaded
//! ZIP, republish it into an `Abstract` subfolder of the submission's folder,
//! and record an inline-download link on the submission record.
//!
//! ## Design Philosophy
//!
//! - **Explicit dependencies** - host storage is injected through typed
//!   store traits, not reached through an ambient registry
//! - **Visible privilege** - permission-bypassing loads take a
//!   [`ServiceIdentity`] so escalation shows at the call site
//! - **Observable outcomes** - heavy work runs on a background worker;
//!   the triggering call never blocks, but every outcome is broadcast as
//!   an [`Event`]
//!
//! ## Quick Start
//!
//! ```no_run
//! use challenge_abstracts::{Config, ScoreHook, Stores, SubmissionId};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (stores, _store) = Stores::in_memory();
//!     let hook = ScoreHook::new(Config::default(), stores)?;
//!
//!     // Subscribe to publishing outcomes
//!     let mut events = hook.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     // Wire this to the host's post-scoring event
//!     hook.submission_scored(&SubmissionId::new("5ad1ab")).await?;
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Submission archive inspection
pub mod archive;
/// Buffered reading of stored file content
pub mod buffer;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Scoring-event hook
pub mod hook;
/// Download link construction and submission updates
pub mod links;
/// Abstract publishing
pub mod publisher;
/// Storage interfaces to the host platform
pub mod store;
/// Core types and events
pub mod types;

mod worker;

// Re-export commonly used types
pub use archive::AbstractPdf;
pub use config::{Config, GateConfig, PublishConfig, WorkerConfig};
pub use error::{Error, InspectError, Result, StorageError};
pub use hook::ScoreHook;
pub use store::{
    FileReader, FileStore, FolderStore, ItemStore, MemoryStore, PhaseStore, ServiceIdentity,
    Stores, SubmissionStore, UserStore,
};
pub use types::{
    AbstractJob, Event, FileId, FileRecord, Folder, FolderId, Item, ItemId, Phase, PhaseId,
    SkipReason, Submission, SubmissionId, User, UserId,
};
