//! Summary export. Turns a rendered summary into a downloadable file.
//!
//! The [`DocumentBackend`] trait is the seam to the layout library; the
//! shipped backend is [`pdf::PrintPdfBackend`]. Export never touches the
//! session: it works on a [`SessionSnapshot`] and either returns the file
//! or an [`ExportError`] for the host to show.

pub mod pdf;

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::Serialize;
use thiserror::Error;

use crate::attachment::sanitize_filename;
use crate::labels::Labels;
use crate::summary::{render_summary, SummaryDocument};
use crate::wizard::SessionSnapshot;

pub use pdf::PrintPdfBackend;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("PDF font error: {0}")]
    Font(String),

    #[error("PDF save error: {0}")]
    Save(String),

    #[error("Timestamp out of range for document metadata: {0}")]
    Timestamp(String),

    #[error("Cannot write export: {0}")]
    Io(#[from] std::io::Error),
}

/// Lays out a [`SummaryDocument`] into a binary file format.
///
/// Implementations must be deterministic: the same document yields the
/// same bytes.
pub trait DocumentBackend {
    fn content_type(&self) -> &'static str;

    /// File extension without the dot.
    fn extension(&self) -> &'static str;

    fn render(&self, document: &SummaryDocument) -> Result<Vec<u8>, ExportError>;
}

/// A rendered file ready to be offered for download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportedDocument {
    pub filename: String,
    pub content_type: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

/// Renders the snapshot and lays it out with `backend`.
pub fn export_summary(
    snapshot: &SessionSnapshot,
    labels: &Labels,
    generated_at: NaiveDateTime,
    backend: &dyn DocumentBackend,
) -> Result<ExportedDocument, ExportError> {
    let document = render_summary(snapshot, labels, generated_at);
    let bytes = backend.render(&document).inspect_err(|e| {
        tracing::warn!(error = %e, "Summary document generation failed");
    })?;

    tracing::info!(
        size = bytes.len(),
        medications = snapshot.medications.len(),
        questions = snapshot.questions.len(),
        "Summary document generated"
    );

    Ok(ExportedDocument {
        filename: summary_filename(labels, &snapshot.patient_name, backend.extension()),
        content_type: backend.content_type().into(),
        bytes,
    })
}

/// Suggested download name: `summary_<patient_name>.pdf`, spaces turned
/// into underscores and any other unsafe character sanitized. A blank
/// name yields `summary.pdf`.
pub fn summary_filename(labels: &Labels, patient_name: &str, extension: &str) -> String {
    let name = patient_name.trim();
    if name.is_empty() {
        return format!("{}.{extension}", labels.export_prefix);
    }
    format!(
        "{}_{}.{extension}",
        labels.export_prefix,
        sanitize_filename(&name.replace(' ', "_"))
    )
}

/// Safe file name for saving the patient's attachment next to the summary.
pub fn attachment_export_filename(attachment_name: &str) -> String {
    sanitize_filename(attachment_name.trim())
}

/// Writes an exported document into `dir`, creating it when missing.
pub fn write_export(dir: &Path, document: &ExportedDocument) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(&document.filename);
    std::fs::write(&path, &document.bytes)?;
    tracing::info!(size = document.bytes.len(), "Summary exported to disk");
    Ok(path)
}
