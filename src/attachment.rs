//! Attachment source boundary for the one optional file a patient can bring
//! (latest lab result, referral letter, photo of a prescription).
//!
//! Only PDF, JPEG and PNG files get past this module. Anything else is
//! rejected here, before it can reach the session state. Size is
//! informational only.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File extensions accepted by the file picker.
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "jpg", "jpeg", "png"];

const MAX_FILENAME_CHARS: usize = 100;

#[derive(Error, Debug)]
pub enum AttachmentError {
    #[error("Unsupported file type: {name} (allowed: pdf, jpg, jpeg, png)")]
    UnsupportedType { name: String },

    #[error("Cannot read attachment: {0}")]
    Io(#[from] std::io::Error),
}

/// Accepted attachment formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    Pdf,
    Jpeg,
    Png,
}

impl AttachmentKind {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }

    /// Classifies by the text after the last `.` of the file name.
    pub fn from_filename(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        Self::from_extension(ext)
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }

    /// Images can be previewed inline by the host; PDFs cannot.
    pub fn is_image(&self) -> bool {
        matches!(self, Self::Jpeg | Self::Png)
    }
}

/// An uploaded file held immutably for the rest of the session.
///
/// Bytes sit behind an `Arc` so snapshots and clones never copy the blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    name: String,
    content_type: String,
    kind: AttachmentKind,
    bytes: Arc<[u8]>,
}

impl Attachment {
    /// Accepts an upload from the host's file picker.
    ///
    /// `content_type` is whatever the host reported; when absent or blank it
    /// is guessed from the file name.
    pub fn from_upload(
        name: impl Into<String>,
        content_type: Option<&str>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Result<Self, AttachmentError> {
        let name = display_name(&name.into());
        let kind = AttachmentKind::from_filename(&name)
            .ok_or_else(|| AttachmentError::UnsupportedType { name: name.clone() })?;

        let content_type = content_type
            .map(str::trim)
            .filter(|ct| !ct.is_empty())
            .map(str::to_owned)
            .or_else(|| mime_guess::from_path(&name).first_raw().map(str::to_owned))
            .unwrap_or_else(|| kind.mime_type().to_owned());

        Ok(Self {
            name,
            content_type,
            kind,
            bytes: bytes.into(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn kind(&self) -> AttachmentKind {
        self.kind
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Human size in kilobytes with one decimal, e.g. `"12.3 KB"`.
    pub fn size_label(&self) -> String {
        format!("{:.1} KB", self.size() as f64 / 1024.0)
    }

    pub fn is_image(&self) -> bool {
        self.kind.is_image()
    }

    /// Metadata view without the bytes, as carried by session snapshots.
    pub fn info(&self) -> AttachmentInfo {
        AttachmentInfo {
            name: self.name.clone(),
            content_type: self.content_type.clone(),
            kind: self.kind,
            size_bytes: self.size(),
        }
    }
}

/// Attachment metadata, serialised to the presentation host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentInfo {
    pub name: String,
    pub content_type: String,
    pub kind: AttachmentKind,
    pub size_bytes: u64,
}

/// Loads an attachment from disk.
///
/// The extension allow-list is checked before the file is read.
pub fn load_attachment(path: &Path) -> Result<Attachment, AttachmentError> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_owned();

    if AttachmentKind::from_filename(&name).is_none() {
        return Err(AttachmentError::UnsupportedType { name });
    }

    let bytes = std::fs::read(path)?;
    let guessed = mime_guess::from_path(path).first_raw();
    let attachment = Attachment::from_upload(name, guessed, bytes)?;

    tracing::debug!(
        kind = ?attachment.kind(),
        size = attachment.size(),
        "Attachment loaded"
    );
    Ok(attachment)
}

/// Keeps only the final path component of an uploaded name.
fn display_name(original: &str) -> String {
    let name = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .replace('\0', "");

    if name.trim().is_empty() {
        "document".into()
    } else {
        name
    }
}

/// Sanitize a filename. Removes path separators and maps every character
/// outside `[A-Za-z0-9._-]` to `_`.
pub fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .filter(|&c| c != '/' && c != '\\' && c != '\0')
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    // Remove consecutive dots (path traversal prevention)
    let sanitized = sanitized.replace("..", "");

    let sanitized: String = sanitized.chars().take(MAX_FILENAME_CHARS).collect();

    if sanitized.is_empty() {
        "document".into()
    } else {
        sanitized
    }
}
