//! Storage interfaces to the host platform
//!
//! Every lookup goes through an explicit, injected trait object rather than
//! a process-wide model registry. Privileged loads that bypass the host's
//! permission checks take a [`ServiceIdentity`] so the escalation is visible
//! at the call site.

mod memory;

pub use memory::MemoryStore;

use crate::error::Result;
use crate::types::{
    FileRecord, Folder, FolderId, Item, ItemId, Phase, PhaseId, Submission, SubmissionId, User,
    UserId,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Capability token for privileged storage access.
///
/// Background publishing runs as the system, not on behalf of an
/// interactively authenticated request. Every store method that bypasses the
/// host's permission checks takes a `&ServiceIdentity`, making the privilege
/// escalation explicit in the interface rather than an implicit flag.
#[derive(Clone, Debug)]
pub struct ServiceIdentity(());

impl ServiceIdentity {
    /// Mint a service identity for background processing
    pub fn new() -> Self {
        Self(())
    }
}

impl Default for ServiceIdentity {
    fn default() -> Self {
        Self::new()
    }
}

/// Submission record access
///
/// Loads are unprivileged; the scoring event carries a submission the
/// triggering user could already see.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Load a submission by ID, or `None` if it does not exist
    async fn load(&self, id: &SubmissionId) -> Result<Option<Submission>>;

    /// Persist a submission record in full (not a field-level update)
    async fn save(&self, submission: &Submission) -> Result<()>;
}

/// Phase record access
#[async_trait]
pub trait PhaseStore: Send + Sync {
    /// Load a phase by ID, bypassing permission checks
    async fn load_elevated(
        &self,
        identity: &ServiceIdentity,
        id: &PhaseId,
    ) -> Result<Option<Phase>>;
}

/// Folder record access and subfolder creation
#[async_trait]
pub trait FolderStore: Send + Sync {
    /// Load a folder by ID, bypassing permission checks
    async fn load_elevated(
        &self,
        identity: &ServiceIdentity,
        id: &FolderId,
    ) -> Result<Option<Folder>>;

    /// List up to `limit` child items of a folder
    async fn child_items(&self, folder: &FolderId, limit: usize) -> Result<Vec<Item>>;

    /// Create a new subfolder owned by `creator`.
    ///
    /// Always creates; an existing subfolder with the same name is not
    /// reused, so repeated calls produce duplicates.
    async fn create_subfolder(
        &self,
        parent: &FolderId,
        name: &str,
        creator: &UserId,
    ) -> Result<Folder>;
}

/// Item record access
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// List up to `limit` child files of an item
    async fn child_files(&self, item: &ItemId, limit: usize) -> Result<Vec<FileRecord>>;
}

/// User record access
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Load a user by ID, bypassing permission checks
    async fn load_elevated(&self, identity: &ServiceIdentity, id: &UserId)
    -> Result<Option<User>>;
}

/// A streaming read handle over a stored file's content.
///
/// Dropped on all exits, normal and exceptional, releasing the underlying
/// resource.
pub type FileReader = Box<dyn tokio::io::AsyncRead + Send + Unpin>;

/// File content access
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Open a streaming read handle over a file's content
    async fn open(&self, file: &FileRecord) -> Result<FileReader>;

    /// Upload a byte buffer as a new file in `folder`.
    ///
    /// `size` is the declared content length and must match `data.len()`.
    async fn upload(
        &self,
        folder: &FolderId,
        name: &str,
        data: Vec<u8>,
        size: u64,
        uploader: &UserId,
    ) -> Result<FileRecord>;
}

/// Cloneable bundle of all storage interfaces injected into the hook
#[derive(Clone)]
pub struct Stores {
    /// Submission records
    pub submissions: Arc<dyn SubmissionStore>,
    /// Phase records
    pub phases: Arc<dyn PhaseStore>,
    /// Folder records
    pub folders: Arc<dyn FolderStore>,
    /// Item records
    pub items: Arc<dyn ItemStore>,
    /// User records
    pub users: Arc<dyn UserStore>,
    /// File content and metadata
    pub files: Arc<dyn FileStore>,
}

impl Stores {
    /// Build a bundle backed entirely by one [`MemoryStore`].
    ///
    /// Returns the bundle and a handle to the backing store for seeding and
    /// assertions. Suitable for embedding without a host platform and for
    /// tests.
    pub fn in_memory() -> (Self, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let stores = Self {
            submissions: store.clone(),
            phases: store.clone(),
            folders: store.clone(),
            items: store.clone(),
            users: store.clone(),
            files: store.clone(),
        };
        (stores, store)
    }
}
