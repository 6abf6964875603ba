//! PDF backend built on `printpdf`.
//!
//! A4 pages, built-in Helvetica fonts, content flowing top to bottom and
//! onto new pages as needed. Output is byte-identical for identical input:
//! every metadata date is the summary's generation instant, XMP metadata
//! is disabled, and the file identifier in the cross-reference stream is
//! rewritten to a hash of the rendered summary.

use std::io::BufWriter;

use printpdf::{
    BuiltinFont, Color, CustomPdfConformance, IndirectFontRef, Line, Mm, PdfConformance,
    PdfDocument, PdfDocumentReference, PdfLayerReference, Point, Rgb,
};
use sha2::{Digest, Sha256};
use time::OffsetDateTime;

use super::{DocumentBackend, ExportError};
use crate::summary::{Block, KeyValueRow, SummaryDocument};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN_LEFT: f32 = 20.0;
const MARGIN_TOP: f32 = 280.0;
const MARGIN_BOTTOM: f32 = 20.0;

const TITLE_SIZE: f32 = 18.0;
const HEADING_SIZE: f32 = 14.0;
const BODY_SIZE: f32 = 10.0;
const FOOTER_SIZE: f32 = 8.0;

// 2 inch / 4 inch table columns.
const LABEL_COLUMN: f32 = 50.8;
const VALUE_COLUMN: f32 = 101.6;
const CELL_PADDING: f32 = 2.8;

const BODY_WRAP: usize = 90;
const VALUE_WRAP: usize = 55;

/// Millimetres per typographic point.
const MM_PER_PT: f32 = 0.3528;

/// Lays out summaries as A4 PDFs.
#[derive(Debug, Clone, Default)]
pub struct PrintPdfBackend;

impl DocumentBackend for PrintPdfBackend {
    fn content_type(&self) -> &'static str {
        "application/pdf"
    }

    fn extension(&self) -> &'static str {
        "pdf"
    }

    fn render(&self, document: &SummaryDocument) -> Result<Vec<u8>, ExportError> {
        let document_id = document_id(document)?;
        let stamp = metadata_timestamp(document)?;

        let (doc, page1, layer1) = PdfDocument::new(
            &document.title,
            Mm(PAGE_WIDTH),
            Mm(PAGE_HEIGHT),
            "Layer 1",
        );
        let doc = doc
            .with_conformance(PdfConformance::Custom(CustomPdfConformance {
                requires_icc_profile: false,
                requires_xmp_metadata: false,
                ..Default::default()
            }))
            .with_document_id(document_id.clone())
            .with_creation_date(stamp)
            .with_mod_date(stamp)
            .with_metadata_date(stamp);

        let fonts = Fonts::load(&doc)?;
        let layer = doc.get_page(page1).get_layer(layer1);
        let mut cursor = PageCursor {
            doc: &doc,
            layer,
            y: MARGIN_TOP,
            pages: 1,
        };

        for block in &document.blocks {
            draw_block(&mut cursor, &fonts, block);
        }
        let pages = cursor.pages;

        let mut buf = BufWriter::new(Vec::new());
        doc.save(&mut buf)
            .map_err(|e| ExportError::Save(e.to_string()))?;
        let bytes = buf
            .into_inner()
            .map_err(|e| ExportError::Save(format!("PDF buffer error: {e}")))?;

        tracing::debug!(pages, size = bytes.len(), "PDF laid out");
        Ok(stabilize_file_identifier(bytes, &document_id))
    }
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

impl Fonts {
    fn load(doc: &PdfDocumentReference) -> Result<Self, ExportError> {
        let load = |font| {
            doc.add_builtin_font(font)
                .map_err(|e| ExportError::Font(e.to_string()))
        };
        Ok(Self {
            regular: load(BuiltinFont::Helvetica)?,
            bold: load(BuiltinFont::HelveticaBold)?,
            italic: load(BuiltinFont::HelveticaOblique)?,
        })
    }
}

/// Current page and vertical position; opens a new page when the next
/// element would cross the bottom margin.
struct PageCursor<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
    pages: usize,
}

impl PageCursor<'_> {
    fn reserve(&mut self, height: f32) {
        if self.y - height >= MARGIN_BOTTOM {
            return;
        }
        self.pages += 1;
        let (page, layer) = self.doc.add_page(
            Mm(PAGE_WIDTH),
            Mm(PAGE_HEIGHT),
            format!("Layer {}", self.pages),
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = MARGIN_TOP;
    }

    fn text(&mut self, text: &str, size: f32, x: f32, font: &IndirectFontRef, advance: f32) {
        self.reserve(advance);
        self.layer.use_text(text, size, Mm(x), Mm(self.y), font);
        self.y -= advance;
    }

    fn gap(&mut self, height: f32) {
        self.y -= height;
    }

    fn color(&self, rgb: (f32, f32, f32)) {
        self.layer
            .set_fill_color(Color::Rgb(Rgb::new(rgb.0, rgb.1, rgb.2, None)));
    }

    fn hline(&self, x1: f32, x2: f32, y: f32) {
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(x1), Mm(y)), false),
                (Point::new(Mm(x2), Mm(y)), false),
            ],
            is_closed: false,
        });
    }

    fn vline(&self, x: f32, y1: f32, y2: f32) {
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(x), Mm(y1)), false),
                (Point::new(Mm(x), Mm(y2)), false),
            ],
            is_closed: false,
        });
    }
}

const BLACK: (f32, f32, f32) = (0.0, 0.0, 0.0);
const TITLE_BLUE: (f32, f32, f32) = (0.118, 0.251, 0.686); // #1E40AF
const HEADING_GRAY: (f32, f32, f32) = (0.122, 0.161, 0.216); // #1F2937
const GRID_GRAY: (f32, f32, f32) = (0.898, 0.906, 0.922); // #E5E7EB
const MUTED_GRAY: (f32, f32, f32) = (0.5, 0.5, 0.5);

fn draw_block(cursor: &mut PageCursor<'_>, fonts: &Fonts, block: &Block) {
    match block {
        Block::Title { text } => {
            cursor.color(TITLE_BLUE);
            cursor.text(
                text,
                TITLE_SIZE,
                centered_x(text, TITLE_SIZE),
                &fonts.bold,
                TITLE_SIZE * MM_PER_PT + 12.0,
            );
            cursor.color(BLACK);
        }
        Block::KeyValueTable { rows } => {
            draw_table(cursor, fonts, rows);
            cursor.gap(8.0);
        }
        Block::Heading { text } => {
            cursor.reserve(18.0);
            cursor.color(HEADING_GRAY);
            cursor.text(text, HEADING_SIZE, MARGIN_LEFT, &fonts.bold, 8.0);
            cursor.color(BLACK);
        }
        Block::Paragraph { text } => {
            for paragraph in text.lines() {
                for line in wrap_text(paragraph, BODY_WRAP) {
                    cursor.text(&line, BODY_SIZE, MARGIN_LEFT, &fonts.regular, 5.0);
                }
            }
            cursor.gap(4.0);
        }
        Block::NumberedList { items } => {
            for item in items {
                for (i, line) in wrap_text(&item.line(), BODY_WRAP).into_iter().enumerate() {
                    let x = if i == 0 { MARGIN_LEFT } else { MARGIN_LEFT + 5.0 };
                    cursor.text(&line, BODY_SIZE, x, &fonts.regular, 5.0);
                }
            }
            cursor.gap(4.0);
        }
        Block::Placeholder { text } => {
            cursor.text(text, BODY_SIZE, MARGIN_LEFT, &fonts.italic, 5.0);
            cursor.gap(4.0);
        }
        Block::Footer { text } => {
            cursor.gap(10.0);
            cursor.color(MUTED_GRAY);
            cursor.text(
                text,
                FOOTER_SIZE,
                centered_x(text, FOOTER_SIZE),
                &fonts.regular,
                4.0,
            );
            cursor.color(BLACK);
        }
    }
}

/// Two-column grid: bold labels left, wrapped values right.
fn draw_table(cursor: &mut PageCursor<'_>, fonts: &Fonts, rows: &[KeyValueRow]) {
    let left = MARGIN_LEFT;
    let middle = left + LABEL_COLUMN;
    let right = middle + VALUE_COLUMN;
    let line_height = 5.0;

    for row in rows {
        let value_lines = wrap_text(&row.value, VALUE_WRAP);
        let height = value_lines.len() as f32 * line_height + 2.0 * CELL_PADDING;
        cursor.reserve(height);

        let top = cursor.y;
        let bottom = top - height;
        let baseline = top - CELL_PADDING - BODY_SIZE * MM_PER_PT;

        cursor.layer.use_text(
            &row.label,
            BODY_SIZE,
            Mm(left + CELL_PADDING),
            Mm(baseline),
            &fonts.bold,
        );
        for (i, line) in value_lines.iter().enumerate() {
            cursor.layer.use_text(
                line,
                BODY_SIZE,
                Mm(middle + CELL_PADDING),
                Mm(baseline - i as f32 * line_height),
                &fonts.regular,
            );
        }

        cursor.layer.set_outline_color(Color::Rgb(Rgb::new(
            GRID_GRAY.0,
            GRID_GRAY.1,
            GRID_GRAY.2,
            None,
        )));
        cursor.layer.set_outline_thickness(1.0);
        cursor.hline(left, right, top);
        cursor.hline(left, right, bottom);
        cursor.vline(left, top, bottom);
        cursor.vline(middle, top, bottom);
        cursor.vline(right, top, bottom);

        cursor.y = bottom;
    }
}

/// Rough horizontal centre for Helvetica at `size` points.
fn centered_x(text: &str, size: f32) -> f32 {
    let width = text.chars().count() as f32 * size * 0.5 * MM_PER_PT;
    ((PAGE_WIDTH - width) / 2.0).max(MARGIN_LEFT)
}

/// Simple word-wrap helper for PDF text rendering.
pub(crate) fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.chars().count() + word.chars().count() + 1 > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// 32 hex chars of SHA-256 over the serialized summary.
fn document_id(document: &SummaryDocument) -> Result<String, ExportError> {
    let json = serde_json::to_vec(document)
        .map_err(|e| ExportError::Save(format!("Summary serialization: {e}")))?;
    let digest = format!("{:x}", Sha256::digest(&json));
    Ok(digest[..32].to_string())
}

fn metadata_timestamp(document: &SummaryDocument) -> Result<OffsetDateTime, ExportError> {
    let seconds = document.generated_at.and_utc().timestamp();
    OffsetDateTime::from_unix_timestamp(seconds)
        .map_err(|e| ExportError::Timestamp(e.to_string()))
}

/// Replaces the file identifier pair with `[(id)(id)]`.
///
/// printpdf writes two random strings into `/ID` on every save, inside the
/// cross-reference stream dictionary at the end of the file. The last `/ID[`
/// is that entry. Returns the input unchanged when none is found.
fn stabilize_file_identifier(mut bytes: Vec<u8>, id: &str) -> Vec<u8> {
    let Some(start) = rfind(&bytes, b"/ID[") else {
        return bytes;
    };
    let Some(end) = find(&bytes[start..], b"]").map(|i| start + i + 1) else {
        return bytes;
    };

    let replacement = format!("/ID[({id})({id})]");
    bytes.splice(start..end, replacement.into_bytes());
    bytes
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).rposition(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::Locale;
    use crate::summary::render_summary;
    use crate::wizard::SessionSnapshot;
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

    fn snapshot() -> SessionSnapshot {
        SessionSnapshot {
            current_step: 6,
            patient_name: "Budi Santoso".into(),
            doctor_name: "Dr. Annisa".into(),
            appointment_date: NaiveDate::from_ymd_opt(2025, 3, 5).unwrap(),
            appointment_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            main_complaint: "Persistent headache in the mornings, worse after screen work."
                .into(),
            medications: vec!["".into(), "  ".into(), "Paracetamol 500mg".into()],
            questions: vec!["Do I need further tests?".into()],
            attachment: None,
        }
    }

    fn generated_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 4)
            .unwrap()
            .and_hms_opt(20, 7, 0)
            .unwrap()
    }

    fn summary() -> SummaryDocument {
        render_summary(&snapshot(), Locale::English.labels(), generated_at())
    }

    #[test]
    fn renders_pdf_magic_bytes() {
        let bytes = PrintPdfBackend.render(&summary()).unwrap();
        assert!(!bytes.is_empty());
        assert_eq!(&bytes[0..4], b"%PDF");
    }

    #[test]
    fn identical_input_gives_identical_bytes() {
        let a = PrintPdfBackend.render(&summary()).unwrap();
        let b = PrintPdfBackend.render(&summary()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_timestamp_changes_bytes() {
        let a = PrintPdfBackend.render(&summary()).unwrap();
        let later = render_summary(
            &snapshot(),
            Locale::English.labels(),
            generated_at() + chrono::Duration::minutes(1),
        );
        let b = PrintPdfBackend.render(&later).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn long_lists_flow_onto_more_pages() {
        let mut snap = snapshot();
        snap.questions = (1..=120).map(|i| format!("Question number {i}")).collect();
        let doc = render_summary(&snap, Locale::English.labels(), generated_at());
        let long = PrintPdfBackend.render(&doc).unwrap();
        let short = PrintPdfBackend.render(&summary()).unwrap();
        assert_eq!(&long[0..4], b"%PDF");
        assert!(long.len() > short.len());
    }

    #[test]
    fn document_id_is_stable_hex() {
        let id = document_id(&summary()).unwrap();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(id, document_id(&summary()).unwrap());
    }

    #[test]
    fn file_identifier_rewritten() {
        let input =
            b"%PDF-1.5\n9 0 obj\n<</ID[(aaaa)(bbbb)]/Type/XRef/Size 10>>\nstream\n".to_vec();
        let output = stabilize_file_identifier(input, "cafe");
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("/ID[(cafe)(cafe)]/Type/XRef/Size 10>>"));
    }

    #[test]
    fn rendered_pdf_carries_document_id_twice() {
        let doc = summary();
        let id = document_id(&doc).unwrap();
        let bytes = PrintPdfBackend.render(&doc).unwrap();
        let needle = format!("/ID[({id})({id})]");
        assert!(find(&bytes, needle.as_bytes()).is_some());
    }

    #[test]
    fn file_identifier_untouched_without_id() {
        let input = b"%PDF-1.5 no identifier here".to_vec();
        assert_eq!(stabilize_file_identifier(input.clone(), "cafe"), input);
    }

    #[test]
    fn test_wrap_text() {
        let text = "This is a long sentence that should be wrapped at around forty characters or so.";
        let lines = wrap_text(text, 40);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(line.len() <= 45);
        }
    }

    #[test]
    fn test_wrap_text_short() {
        let lines = wrap_text("Short", 40);
        assert_eq!(lines, vec!["Short".to_string()]);
    }

    #[test]
    fn test_wrap_text_empty() {
        assert_eq!(wrap_text("", 40).len(), 1);
    }
}
