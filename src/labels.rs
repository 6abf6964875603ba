//! Label tables for the summary document and the step screens.
//!
//! Both presentations of the summary (console view and PDF) read their
//! wording from the same [`Labels`] table so they can never drift apart.

use serde::{Deserialize, Serialize};

/// Supported label languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locale {
    #[default]
    English,
    Indonesian,
}

impl Locale {
    /// Parses a short language code (`en`, `id`). Case-insensitive.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Some(Self::English),
            "id" | "indonesian" => Some(Self::Indonesian),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Indonesian => "id",
        }
    }

    pub fn labels(&self) -> &'static Labels {
        match self {
            Self::English => &ENGLISH,
            Self::Indonesian => &INDONESIAN,
        }
    }
}

/// Every user-visible string the renderer and the host need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Labels {
    pub app_title: &'static str,
    pub document_title: &'static str,
    pub patient: &'static str,
    pub doctor: &'static str,
    pub schedule: &'static str,
    /// Word between the date and the time: "05/03/2025 at 09:00".
    pub date_time_joiner: &'static str,
    /// Shown in the key/value table when a name was left blank.
    pub empty_value: &'static str,
    pub complaint_heading: &'static str,
    pub no_complaint: &'static str,
    pub medications_heading: &'static str,
    pub no_medications: &'static str,
    pub questions_heading: &'static str,
    pub no_questions: &'static str,
    pub attachment_heading: &'static str,
    pub attachment_prefix: &'static str,
    pub no_attachment: &'static str,
    /// Screen-only note for an attached JPEG or PNG.
    pub image_attached_note: &'static str,
    /// Screen-only note for an attached PDF.
    pub pdf_attached_note: &'static str,
    pub generated_prefix: &'static str,
    pub export_failed: &'static str,
    pub export_prefix: &'static str,
    pub step_titles: [&'static str; 6],
}

pub const ENGLISH: Labels = Labels {
    app_title: "Doctor Appointment Preparation Assistant",
    document_title: "Appointment Preparation Summary",
    patient: "Patient:",
    doctor: "Doctor:",
    schedule: "Appointment:",
    date_time_joiner: "at",
    empty_value: "-",
    complaint_heading: "Main Complaint",
    no_complaint: "No complaint recorded",
    medications_heading: "Medications & Supplements",
    no_medications: "none recorded",
    questions_heading: "Questions for the Doctor",
    no_questions: "none recorded",
    attachment_heading: "Attached File",
    attachment_prefix: "Attached file:",
    no_attachment: "No file uploaded",
    image_attached_note: "Image attached",
    pdf_attached_note: "PDF attached (preview not available)",
    generated_prefix: "Generated on:",
    export_failed: "Could not generate the summary document",
    export_prefix: "summary",
    step_titles: [
        "Basic Information",
        "Main Complaint",
        "Medications & Supplements",
        "Questions for the Doctor",
        "Upload an Important File (Optional)",
        "Summary for Your Consultation",
    ],
};

pub const INDONESIAN: Labels = Labels {
    app_title: "Asisten Persiapan Kontrol Dokter",
    document_title: "Ringkasan untuk Konsultasi Dokter",
    patient: "Pasien:",
    doctor: "Dokter:",
    schedule: "Tanggal:",
    date_time_joiner: "pukul",
    empty_value: "-",
    complaint_heading: "Keluhan Utama",
    no_complaint: "Tidak ada keluhan yang dicatat",
    medications_heading: "Daftar Obat & Suplemen",
    no_medications: "Tidak ada obat/suplemen yang dicatat",
    questions_heading: "Pertanyaan untuk Dokter",
    no_questions: "Tidak ada pertanyaan yang disiapkan",
    attachment_heading: "Lampiran File",
    attachment_prefix: "File terlampir:",
    no_attachment: "Tidak ada file yang diunggah",
    image_attached_note: "Gambar terlampir",
    pdf_attached_note: "File PDF terlampir (preview tidak tersedia)",
    generated_prefix: "Dibuat pada:",
    export_failed: "Gagal membuat dokumen ringkasan",
    export_prefix: "ringkasan_konsultasi",
    step_titles: [
        "Informasi Dasar",
        "Keluhan Utama",
        "Obat & Suplemen",
        "Pertanyaan untuk Dokter",
        "Unggah File Penting (Opsional)",
        "Ringkasan untuk Konsultasi",
    ],
};
