//! Buffered reading of stored file content
//!
//! Submission archives are read fully into memory before inspection, which
//! avoids managing temporary files and directories.

use crate::error::Result;
use crate::store::FileStore;
use crate::types::FileRecord;
use tokio::io::AsyncReadExt;
use tracing::debug;

/// Bytes requested per read from the streaming handle
const READ_CHUNK_SIZE: usize = 64 * 1024;

/// Read a stored file's content fully into an in-memory buffer.
///
/// Performs repeated bounded reads until the handle is exhausted. The handle
/// is dropped on every exit path, including errors; read failures propagate
/// to the caller.
pub async fn read_file_bytes(files: &dyn FileStore, file: &FileRecord) -> Result<Vec<u8>> {
    let mut handle = files.open(file).await?;

    // capacity hint only; a size that overflows usize just skips preallocation
    let mut buffer = Vec::with_capacity(usize::try_from(file.size).unwrap_or(0));
    let mut chunk = vec![0u8; READ_CHUNK_SIZE];
    loop {
        let n = handle.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);
    }

    debug!(file_id = %file.id, bytes = buffer.len(), "read file content into memory");
    Ok(buffer)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn reads_full_content_into_one_buffer() {
        let store = MemoryStore::new();
        let user = store.add_user("alice").await;
        let folder = store.add_folder(None, "submission", &user.id).await;
        let item = store.add_item(&folder.id, "upload").await;

        // Larger than one read chunk to force multiple reads
        let data: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        let file = store.add_file(&item.id, "data.zip", data.clone()).await;

        let bytes = read_file_bytes(&store, &file).await.unwrap();
        assert_eq!(bytes, data);
        assert_eq!(store.open_count(), 1);
    }

    #[tokio::test]
    async fn empty_file_yields_empty_buffer() {
        let store = MemoryStore::new();
        let user = store.add_user("alice").await;
        let folder = store.add_folder(None, "submission", &user.id).await;
        let item = store.add_item(&folder.id, "upload").await;
        let file = store.add_file(&item.id, "empty.zip", Vec::new()).await;

        let bytes = read_file_bytes(&store, &file).await.unwrap();
        assert!(bytes.is_empty());
    }
}
