//! Download link construction and submission record updates

use crate::error::{Error, Result};
use crate::store::SubmissionStore;
use crate::types::{FileId, Submission};
use tracing::debug;
use url::Url;

/// Parse and validate the configured API base URL.
///
/// Rejects unparseable URLs and ones that cannot carry path segments
/// (e.g. `mailto:`). Called once at hook construction so link building
/// later is infallible.
pub fn parse_api_base(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| Error::Config {
        message: format!("invalid API base URL '{raw}': {e}"),
        key: Some("api_base".to_string()),
    })?;
    if url.cannot_be_a_base() {
        return Err(Error::Config {
            message: format!("API base URL '{raw}' cannot carry path segments"),
            key: Some("api_base".to_string()),
        });
    }
    Ok(url)
}

/// Build the inline-download URL for a republished file:
/// `{api_base}/file/{id}/download?contentDisposition=inline`.
///
/// Inline content disposition causes the browser to render the PDF directly
/// instead of prompting a save dialog.
pub fn inline_download_url(api_base: &Url, file: &FileId) -> String {
    let mut url = api_base.clone();
    // Infallible: parse_api_base rejected cannot-be-a-base URLs
    if let Ok(mut segments) = url.path_segments_mut() {
        segments
            .pop_if_empty()
            .extend(["file", file.as_str(), "download"]);
    }
    url.set_query(Some("contentDisposition=inline"));
    url.to_string()
}

/// Set the submission's documentation URL and persist the record in full.
pub async fn record_documentation_url(
    submissions: &dyn SubmissionStore,
    submission: &Submission,
    url: String,
) -> Result<()> {
    debug!(submission_id = %submission.id, url = %url, "recording documentation URL");
    let mut updated = submission.clone();
    updated.documentation_url = Some(url);
    submissions.save(&updated).await
}
