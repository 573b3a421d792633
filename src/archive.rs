//! Submission archive inspection
//!
//! A final-phase submission ZIP must contain exactly one non-empty PDF
//! abstract. Ambiguity is treated as failure: zero or multiple PDF entries
//! reject the archive rather than picking the first match.

use crate::error::InspectError;
use crate::types::FileId;
use std::io::{Cursor, Read};
use tracing::warn;

/// The PDF abstract extracted from a submission ZIP
#[derive(Clone, Debug)]
pub struct AbstractPdf {
    /// Display name of the PDF, with any archive path stripped
    pub file_name: String,
    /// Raw PDF content
    pub data: Vec<u8>,
}

/// Locate and extract the single PDF abstract from raw ZIP bytes.
///
/// `source` identifies the submission's stored ZIP file in the rejection
/// warnings. All rejections log exactly one warning and write no state.
pub fn extract_abstract_pdf(
    data: &[u8],
    source: &FileId,
) -> Result<AbstractPdf, InspectError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(data)).map_err(|e| {
        warn!(file_id = %source, error = %e, "failed to process submission ZIP file");
        InspectError::InvalidArchive(e.to_string())
    })?;

    let pdf_names: Vec<String> = archive
        .file_names()
        .filter(|name| name.to_lowercase().ends_with(".pdf"))
        .map(str::to_owned)
        .collect();
    if pdf_names.len() != 1 {
        warn!(
            file_id = %source,
            count = pdf_names.len(),
            "submission ZIP file must contain exactly one PDF file"
        );
        return Err(InspectError::PdfCount(pdf_names.len()));
    }
    let entry_name = &pdf_names[0];

    let mut pdf_data = Vec::new();
    {
        let mut entry = archive.by_name(entry_name).map_err(|e| {
            warn!(file_id = %source, error = %e, "failed to process submission ZIP file");
            InspectError::InvalidArchive(e.to_string())
        })?;
        // Decompression failures are container corruption, same as a bad header
        entry.read_to_end(&mut pdf_data).map_err(|e| {
            warn!(file_id = %source, error = %e, "failed to process submission ZIP file");
            InspectError::InvalidArchive(e.to_string())
        })?;
    }
    if pdf_data.is_empty() {
        warn!(file_id = %source, "submission ZIP file contains empty PDF file");
        return Err(InspectError::EmptyPdf);
    }

    // Base name only; ZIP entry paths use forward slashes
    let file_name = entry_name
        .rsplit('/')
        .next()
        .unwrap_or(entry_name)
        .to_owned();

    Ok(AbstractPdf {
        file_name,
        data: pdf_data,
    })
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};
    use zip::write::FileOptions;

    fn source() -> FileId {
        FileId::new("file1")
    }

    /// Collects WARN-and-above events as flattened "field=value" strings
    #[derive(Default)]
    struct WarningCapture {
        warnings: Arc<Mutex<Vec<String>>>,
    }

    impl tracing::Subscriber for WarningCapture {
        fn enabled(&self, metadata: &tracing::Metadata<'_>) -> bool {
            *metadata.level() <= tracing::Level::WARN
        }

        fn new_span(&self, _span: &tracing::span::Attributes<'_>) -> tracing::span::Id {
            tracing::span::Id::from_u64(1)
        }

        fn record(&self, _span: &tracing::span::Id, _values: &tracing::span::Record<'_>) {}

        fn record_follows_from(&self, _span: &tracing::span::Id, _follows: &tracing::span::Id) {}

        fn event(&self, event: &tracing::Event<'_>) {
            struct Flatten(String);
            impl tracing::field::Visit for Flatten {
                fn record_debug(
                    &mut self,
                    field: &tracing::field::Field,
                    value: &dyn std::fmt::Debug,
                ) {
                    use std::fmt::Write;
                    let _ = write!(self.0, "{}={:?} ", field.name(), value);
                }
            }
            let mut fields = Flatten(String::new());
            event.record(&mut fields);
            self.warnings.lock().unwrap().push(fields.0);
        }

        fn enter(&self, _span: &tracing::span::Id) {}

        fn exit(&self, _span: &tracing::span::Id) {}
    }

    /// Build an in-memory ZIP from (entry name, content) pairs
    fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut cursor);
            for (name, content) in entries {
                writer.start_file(*name, FileOptions::default()).unwrap();
                writer.write_all(content).unwrap();
            }
            writer.finish().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn extracts_single_pdf_alongside_other_entries() {
        let data = build_zip(&[
            ("abstract.pdf", b"%PDF-1.4 content"),
            ("readme.txt", b"notes"),
        ]);

        let pdf = extract_abstract_pdf(&data, &source()).unwrap();
        assert_eq!(pdf.file_name, "abstract.pdf");
        assert_eq!(pdf.data, b"%PDF-1.4 content");
    }

    #[test]
    fn pdf_suffix_match_is_case_insensitive() {
        let payload = vec![0x25u8; 500];
        let data = build_zip(&[("report.PDF", payload.as_slice()), ("readme.txt", b"notes")]);

        let pdf = extract_abstract_pdf(&data, &source()).unwrap();
        assert_eq!(pdf.file_name, "report.PDF");
        assert_eq!(pdf.data.len(), 500);
    }

    #[test]
    fn entry_path_is_stripped_to_base_name() {
        let data = build_zip(&[("submission/docs/abstract.pdf", b"%PDF")]);

        let pdf = extract_abstract_pdf(&data, &source()).unwrap();
        assert_eq!(pdf.file_name, "abstract.pdf");
    }

    #[test]
    fn two_pdfs_are_rejected_not_picked_from() {
        let data = build_zip(&[("a.pdf", b"%PDF a"), ("b.pdf", b"%PDF b")]);

        let err = extract_abstract_pdf(&data, &source()).unwrap_err();
        assert!(matches!(err, InspectError::PdfCount(2)));
    }

    #[test]
    fn zip_without_pdf_is_rejected() {
        let data = build_zip(&[("readme.txt", b"notes"), ("data.csv", b"1,2,3")]);

        let err = extract_abstract_pdf(&data, &source()).unwrap_err();
        assert!(matches!(err, InspectError::PdfCount(0)));
    }

    #[test]
    fn empty_pdf_entry_is_rejected() {
        let data = build_zip(&[("abstract.pdf", b"")]);

        let err = extract_abstract_pdf(&data, &source()).unwrap_err();
        assert!(matches!(err, InspectError::EmptyPdf));
    }

    #[test]
    fn non_zip_bytes_are_rejected() {
        let err = extract_abstract_pdf(b"this is not a zip archive", &source()).unwrap_err();
        assert!(matches!(err, InspectError::InvalidArchive(_)));
    }

    #[test]
    fn empty_input_is_rejected() {
        let err = extract_abstract_pdf(&[], &source()).unwrap_err();
        assert!(matches!(err, InspectError::InvalidArchive(_)));
    }

    #[test]
    fn every_rejection_logs_one_warning_naming_the_source_file() {
        let capture = WarningCapture::default();
        let warnings = Arc::clone(&capture.warnings);

        tracing::subscriber::with_default(capture, || {
            assert!(extract_abstract_pdf(b"not a zip archive", &source()).is_err());

            let two_pdfs = build_zip(&[("a.pdf", b"%PDF a"), ("b.pdf", b"%PDF b")]);
            assert!(extract_abstract_pdf(&two_pdfs, &source()).is_err());

            let empty_pdf = build_zip(&[("abstract.pdf", b"")]);
            assert!(extract_abstract_pdf(&empty_pdf, &source()).is_err());

            // the accepted path stays warning-free
            let good = build_zip(&[("abstract.pdf", b"%PDF-1.4")]);
            assert!(extract_abstract_pdf(&good, &source()).is_ok());
        });

        let warnings = warnings.lock().unwrap();
        assert_eq!(warnings.len(), 3, "one warning per rejection: {warnings:?}");
        assert!(
            warnings.iter().all(|w| w.contains("file1")),
            "each warning must reference the source file: {warnings:?}"
        );
    }
}
