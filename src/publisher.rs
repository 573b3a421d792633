//! Abstract publishing
//!
//! Republishes an extracted PDF into a fresh subfolder of the submission's
//! folder, owned by the submission creator.

use crate::archive::AbstractPdf;
use crate::error::{Result, StorageError};
use crate::store::{ServiceIdentity, Stores};
use crate::types::{FileRecord, Folder, UserId};
use tracing::debug;

/// Create the abstract subfolder and upload the PDF into it.
///
/// The acting user is resolved with an elevated load; this runs as a
/// background system action, not on behalf of an authenticated request. A
/// missing creator is an unexpected failure and propagates.
///
/// Always creates a new subfolder and file; re-running for the same
/// submission produces duplicates.
pub async fn publish_abstract(
    stores: &Stores,
    identity: &ServiceIdentity,
    folder_name: &str,
    parent: &Folder,
    creator: &UserId,
    pdf: AbstractPdf,
) -> Result<FileRecord> {
    let user = stores
        .users
        .load_elevated(identity, creator)
        .await?
        .ok_or_else(|| StorageError::NotFound {
            kind: "user",
            id: creator.to_string(),
        })?;

    let subfolder = stores
        .folders
        .create_subfolder(&parent.id, folder_name, &user.id)
        .await?;

    let size = pdf.data.len() as u64;
    let file = stores
        .files
        .upload(&subfolder.id, &pdf.file_name, pdf.data, size, &user.id)
        .await?;

    debug!(
        folder_id = %subfolder.id,
        file_id = %file.id,
        name = %file.name,
        "published abstract PDF"
    );
    Ok(file)
}
