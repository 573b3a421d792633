//! In-memory storage backend
//!
//! Implements every store trait over a single `RwLock`-protected state. Used
//! for embedding without a host platform and throughout the test suite, where
//! its query helpers and `open_count` counter let tests assert exactly what
//! the pipeline touched.

use super::{
    FileReader, FileStore, FolderStore, ItemStore, PhaseStore, ServiceIdentity, SubmissionStore,
    UserStore,
};
use crate::error::{Result, StorageError};
use crate::types::{
    FileId, FileRecord, Folder, FolderId, Item, ItemId, Phase, PhaseId, Submission, SubmissionId,
    User, UserId,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

#[derive(Default)]
struct State {
    submissions: HashMap<SubmissionId, Submission>,
    phases: HashMap<PhaseId, Phase>,
    folders: HashMap<FolderId, Folder>,
    items: HashMap<ItemId, Item>,
    files: HashMap<FileId, FileRecord>,
    users: HashMap<UserId, User>,
    blobs: HashMap<FileId, Vec<u8>>,
}

/// In-memory implementation of all storage interfaces
pub struct MemoryStore {
    state: RwLock<State>,
    next_id: AtomicU64,
    open_count: AtomicU64,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::default()),
            next_id: AtomicU64::new(1),
            open_count: AtomicU64::new(0),
        }
    }

    fn mint_id(&self, prefix: &str) -> String {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed);
        format!("{prefix}{n}")
    }

    /// Seed a user record
    pub async fn add_user(&self, login: &str) -> User {
        let user = User {
            id: UserId::new(self.mint_id("user")),
            login: login.to_owned(),
        };
        let mut state = self.state.write().await;
        state.users.insert(user.id.clone(), user.clone());
        user
    }

    /// Seed a phase record with the given metadata
    pub async fn add_phase(&self, name: &str, meta: serde_json::Map<String, serde_json::Value>) -> Phase {
        let phase = Phase {
            id: PhaseId::new(self.mint_id("phase")),
            name: name.to_owned(),
            meta,
        };
        let mut state = self.state.write().await;
        state.phases.insert(phase.id.clone(), phase.clone());
        phase
    }

    /// Seed a folder record
    pub async fn add_folder(&self, parent: Option<&FolderId>, name: &str, creator: &UserId) -> Folder {
        let folder = Folder {
            id: FolderId::new(self.mint_id("folder")),
            parent_id: parent.cloned(),
            name: name.to_owned(),
            creator_id: creator.clone(),
            created: Utc::now(),
        };
        let mut state = self.state.write().await;
        state.folders.insert(folder.id.clone(), folder.clone());
        folder
    }

    /// Seed an item record inside a folder
    pub async fn add_item(&self, folder: &FolderId, name: &str) -> Item {
        let item = Item {
            id: ItemId::new(self.mint_id("item")),
            folder_id: folder.clone(),
            name: name.to_owned(),
        };
        let mut state = self.state.write().await;
        state.items.insert(item.id.clone(), item.clone());
        item
    }

    /// Seed a file record with content inside an item
    pub async fn add_file(&self, item: &ItemId, name: &str, data: Vec<u8>) -> FileRecord {
        let file = FileRecord {
            id: FileId::new(self.mint_id("file")),
            item_id: item.clone(),
            name: name.to_owned(),
            size: data.len() as u64,
            created: Utc::now(),
        };
        let mut state = self.state.write().await;
        state.blobs.insert(file.id.clone(), data);
        state.files.insert(file.id.clone(), file.clone());
        file
    }

    /// Seed a submission record.
    ///
    /// References are not validated; tests use dangling folder IDs to drive
    /// the missing-folder gate.
    pub async fn add_submission(
        &self,
        phase: &PhaseId,
        folder: &FolderId,
        creator: &UserId,
    ) -> Submission {
        let submission = Submission {
            id: SubmissionId::new(self.mint_id("sub")),
            phase_id: phase.clone(),
            folder_id: folder.clone(),
            creator_id: creator.clone(),
            created: Utc::now(),
            documentation_url: None,
        };
        let mut state = self.state.write().await;
        state
            .submissions
            .insert(submission.id.clone(), submission.clone());
        submission
    }

    /// Look up a submission record
    pub async fn submission(&self, id: &SubmissionId) -> Option<Submission> {
        self.state.read().await.submissions.get(id).cloned()
    }

    /// List child folders of a folder, in creation order
    pub async fn subfolders_of(&self, parent: &FolderId) -> Vec<Folder> {
        let state = self.state.read().await;
        let mut folders: Vec<Folder> = state
            .folders
            .values()
            .filter(|f| f.parent_id.as_ref() == Some(parent))
            .cloned()
            .collect();
        folders.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
        folders
    }

    /// List files reachable under a folder (through its items), in creation order
    pub async fn files_in_folder(&self, folder: &FolderId) -> Vec<FileRecord> {
        let state = self.state.read().await;
        let mut files: Vec<FileRecord> = state
            .files
            .values()
            .filter(|f| {
                state
                    .items
                    .get(&f.item_id)
                    .is_some_and(|item| item.folder_id == *folder)
            })
            .cloned()
            .collect();
        files.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
        files
    }

    /// Look up a file's stored content
    pub async fn blob(&self, id: &FileId) -> Option<Vec<u8>> {
        self.state.read().await.blobs.get(id).cloned()
    }

    /// How many times file content has been opened for reading.
    ///
    /// Lets tests prove the gates short-circuited before any content read.
    pub fn open_count(&self) -> u64 {
        self.open_count.load(Ordering::Relaxed)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn load(&self, id: &SubmissionId) -> Result<Option<Submission>> {
        Ok(self.state.read().await.submissions.get(id).cloned())
    }

    async fn save(&self, submission: &Submission) -> Result<()> {
        let mut state = self.state.write().await;
        state
            .submissions
            .insert(submission.id.clone(), submission.clone());
        Ok(())
    }
}

#[async_trait]
impl PhaseStore for MemoryStore {
    async fn load_elevated(
        &self,
        _identity: &ServiceIdentity,
        id: &PhaseId,
    ) -> Result<Option<Phase>> {
        Ok(self.state.read().await.phases.get(id).cloned())
    }
}

#[async_trait]
impl FolderStore for MemoryStore {
    async fn load_elevated(
        &self,
        _identity: &ServiceIdentity,
        id: &FolderId,
    ) -> Result<Option<Folder>> {
        Ok(self.state.read().await.folders.get(id).cloned())
    }

    async fn child_items(&self, folder: &FolderId, limit: usize) -> Result<Vec<Item>> {
        let state = self.state.read().await;
        let mut items: Vec<Item> = state
            .items
            .values()
            .filter(|item| item.folder_id == *folder)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
        items.truncate(limit);
        Ok(items)
    }

    async fn create_subfolder(
        &self,
        parent: &FolderId,
        name: &str,
        creator: &UserId,
    ) -> Result<Folder> {
        // Always a new folder; an existing subfolder with this name is not reused
        let folder = Folder {
            id: FolderId::new(self.mint_id("folder")),
            parent_id: Some(parent.clone()),
            name: name.to_owned(),
            creator_id: creator.clone(),
            created: Utc::now(),
        };
        let mut state = self.state.write().await;
        state.folders.insert(folder.id.clone(), folder.clone());
        Ok(folder)
    }
}

#[async_trait]
impl ItemStore for MemoryStore {
    async fn child_files(&self, item: &ItemId, limit: usize) -> Result<Vec<FileRecord>> {
        let state = self.state.read().await;
        let mut files: Vec<FileRecord> = state
            .files
            .values()
            .filter(|file| file.item_id == *item)
            .cloned()
            .collect();
        files.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
        files.truncate(limit);
        Ok(files)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn load_elevated(
        &self,
        _identity: &ServiceIdentity,
        id: &UserId,
    ) -> Result<Option<User>> {
        Ok(self.state.read().await.users.get(id).cloned())
    }
}

#[async_trait]
impl FileStore for MemoryStore {
    async fn open(&self, file: &FileRecord) -> Result<FileReader> {
        self.open_count.fetch_add(1, Ordering::Relaxed);
        let state = self.state.read().await;
        let data = state
            .blobs
            .get(&file.id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound {
                kind: "file",
                id: file.id.to_string(),
            })?;
        Ok(Box::new(std::io::Cursor::new(data)))
    }

    async fn upload(
        &self,
        folder: &FolderId,
        name: &str,
        data: Vec<u8>,
        size: u64,
        _uploader: &UserId,
    ) -> Result<FileRecord> {
        if size != data.len() as u64 {
            return Err(StorageError::Backend(format!(
                "declared size {size} does not match content length {}",
                data.len()
            ))
            .into());
        }

        // The host platform wraps an uploaded file in an item named after it
        let item = Item {
            id: ItemId::new(self.mint_id("item")),
            folder_id: folder.clone(),
            name: name.to_owned(),
        };
        let file = FileRecord {
            id: FileId::new(self.mint_id("file")),
            item_id: item.id.clone(),
            name: name.to_owned(),
            size,
            created: Utc::now(),
        };

        let mut state = self.state.write().await;
        state.items.insert(item.id.clone(), item);
        state.blobs.insert(file.id.clone(), data);
        state.files.insert(file.id.clone(), file.clone());
        Ok(file)
    }
}
