//! Core types and events for challenge-abstracts
//!
//! Record shapes mirror the host platform's wire format (camelCase JSON).
//! This crate only ever mutates one field: `documentationUrl` on
//! [`Submission`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Create a new identifier from any string-like value
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the identifier as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id! {
    /// Unique identifier for a submission
    SubmissionId
}
string_id! {
    /// Unique identifier for a challenge phase
    PhaseId
}
string_id! {
    /// Unique identifier for a folder
    FolderId
}
string_id! {
    /// Unique identifier for an item
    ItemId
}
string_id! {
    /// Unique identifier for a file
    FileId
}
string_id! {
    /// Unique identifier for a user
    UserId
}

/// A user's scored entry in a challenge phase
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    /// Submission identifier
    pub id: SubmissionId,
    /// The phase this submission belongs to
    pub phase_id: PhaseId,
    /// The folder holding the submission's uploaded content
    pub folder_id: FolderId,
    /// The user who created the submission
    pub creator_id: UserId,
    /// Creation timestamp
    pub created: DateTime<Utc>,
    /// Inline-download link to the republished abstract, once set
    pub documentation_url: Option<String>,
}

/// A stage of a challenge, with metadata controlling hook behavior
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    /// Phase identifier
    pub id: PhaseId,
    /// Display name
    pub name: String,
    /// Free-form metadata; the hook gates on one string-valued key
    #[serde(default)]
    pub meta: serde_json::Map<String, serde_json::Value>,
}

/// A file container in the host's folder hierarchy
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    /// Folder identifier
    pub id: FolderId,
    /// Parent folder, if any
    pub parent_id: Option<FolderId>,
    /// Display name
    pub name: String,
    /// The user who owns the folder
    pub creator_id: UserId,
    /// Creation timestamp
    pub created: DateTime<Utc>,
}

/// A host-managed container inside a folder, wrapping one or more files
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Item identifier
    pub id: ItemId,
    /// The folder containing this item
    pub folder_id: FolderId,
    /// Display name
    pub name: String,
}

/// A stored file blob's metadata record
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    /// File identifier
    pub id: FileId,
    /// The item containing this file
    pub item_id: ItemId,
    /// Display name
    pub name: String,
    /// Exact content length in bytes
    pub size: u64,
    /// Creation timestamp
    pub created: DateTime<Utc>,
}

/// A platform user account
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// User identifier
    pub id: UserId,
    /// Login name
    pub login: String,
}

/// The payload carried from the scoring hook to the publish worker
#[derive(Clone, Debug)]
pub struct AbstractJob {
    /// The scored submission
    pub submission: Submission,
    /// The submission's folder (parent of the new "Abstract" subfolder)
    pub folder: Folder,
    /// The submission's uploaded ZIP file
    pub file: FileRecord,
}

/// Why a queued submission was skipped instead of published
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// The uploaded bytes were not a readable ZIP container
    InvalidArchive,
    /// The archive did not contain exactly one PDF entry
    PdfCount {
        /// How many PDF entries were found
        count: usize,
    },
    /// The sole PDF entry had no content
    EmptyPdf,
}

/// Event emitted during abstract publishing
///
/// Subscribers observe every outcome, including the failures the original
/// scoring request never sees.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A submission passed all gates and was queued for publishing
    Queued {
        /// Submission identifier
        submission: SubmissionId,
    },

    /// The abstract PDF was republished and the download link recorded
    Published {
        /// Submission identifier
        submission: SubmissionId,
        /// The newly created file's identifier
        file: FileId,
        /// The inline-download URL written to the submission record
        url: String,
    },

    /// The submission archive was rejected; nothing was created
    Skipped {
        /// Submission identifier
        submission: SubmissionId,
        /// Why the archive was rejected
        reason: SkipReason,
    },

    /// Publishing failed unexpectedly (storage or I/O error)
    Failed {
        /// Submission identifier
        submission: SubmissionId,
        /// Error message
        error: String,
    },

    /// The hook is shutting down
    Shutdown,
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_serialize_transparently() {
        let id = FileId::new("abc123");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"abc123\"");

        let back: FileId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn submission_uses_camel_case_wire_shape() {
        let json = serde_json::json!({
            "id": "sub1",
            "phaseId": "phase1",
            "folderId": "folder1",
            "creatorId": "user1",
            "created": "2018-06-01T12:00:00Z",
            "documentationUrl": null,
        });
        let submission: Submission = serde_json::from_value(json).unwrap();

        assert_eq!(submission.id.as_str(), "sub1");
        assert_eq!(submission.phase_id.as_str(), "phase1");
        assert!(submission.documentation_url.is_none());

        let back = serde_json::to_value(&submission).unwrap();
        assert!(back.get("folderId").is_some());
        assert!(back.get("folder_id").is_none());
    }

    #[test]
    fn phase_meta_defaults_to_empty() {
        let json = serde_json::json!({ "id": "phase1", "name": "Final Test" });
        let phase: Phase = serde_json::from_value(json).unwrap();
        assert!(phase.meta.is_empty());
    }

    #[test]
    fn skip_reason_serializes_with_reason_tag() {
        let json = serde_json::to_value(SkipReason::PdfCount { count: 2 }).unwrap();
        assert_eq!(json["reason"], "pdf_count");
        assert_eq!(json["count"], 2);
    }

    #[test]
    fn event_serializes_with_type_tag() {
        let event = Event::Published {
            submission: SubmissionId::new("sub1"),
            file: FileId::new("file9"),
            url: "https://example.com/file/file9/download".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "published");
        assert_eq!(json["file"], "file9");
    }
}
