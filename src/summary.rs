//! Summary document renderer.
//!
//! Turns a [`SessionSnapshot`] into an ordered list of [`Block`]s. The
//! console view and the PDF backend both present this same list, so the
//! filtering and numbering rules are applied exactly once.
//!
//! Rendering is pure: the generation instant is passed in, never read from
//! a clock here.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::labels::Labels;
use crate::wizard::SessionSnapshot;

const DATE_FORMAT: &str = "%d/%m/%Y";
const TIME_FORMAT: &str = "%H:%M";

// ═══════════════════════════════════════════
// View types
// ═══════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValueRow {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberedItem {
    /// 1-based, counted over the non-blank entries only.
    pub number: usize,
    pub text: String,
}

impl NumberedItem {
    pub fn line(&self) -> String {
        format!("{}. {}", self.number, self.text)
    }
}

/// One formatted element of the summary, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    Title { text: String },
    KeyValueTable { rows: Vec<KeyValueRow> },
    Heading { text: String },
    Paragraph { text: String },
    NumberedList { items: Vec<NumberedItem> },
    /// Stand-in line for an empty section ("none recorded").
    Placeholder { text: String },
    Footer { text: String },
}

impl Block {
    /// Plain-text lines of this block.
    pub fn lines(&self) -> Vec<String> {
        match self {
            Self::Title { text }
            | Self::Heading { text }
            | Self::Paragraph { text }
            | Self::Placeholder { text }
            | Self::Footer { text } => text.lines().map(str::to_owned).collect(),
            Self::KeyValueTable { rows } => rows
                .iter()
                .map(|row| format!("{} {}", row.label, row.value))
                .collect(),
            Self::NumberedList { items } => items.iter().map(NumberedItem::line).collect(),
        }
    }
}

/// The derived summary, input to every presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryDocument {
    pub title: String,
    pub generated_at: NaiveDateTime,
    pub blocks: Vec<Block>,
}

impl SummaryDocument {
    /// On-screen rendering: one line per text line, blank line between
    /// blocks, title and headings underlined.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for block in &self.blocks {
            if !out.is_empty() {
                out.push('\n');
            }
            let lines = block.lines();
            for line in &lines {
                out.push_str(line);
                out.push('\n');
            }
            let underline = match block {
                Block::Title { .. } => Some('='),
                Block::Heading { .. } => Some('-'),
                _ => None,
            };
            if let Some(ch) = underline {
                let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
                out.extend(std::iter::repeat(ch).take(width));
                out.push('\n');
            }
        }
        out
    }
}

// ═══════════════════════════════════════════
// Rendering
// ═══════════════════════════════════════════

/// Builds the summary for `snapshot` as of `generated_at`.
pub fn render_summary(
    snapshot: &SessionSnapshot,
    labels: &Labels,
    generated_at: NaiveDateTime,
) -> SummaryDocument {
    let mut blocks = Vec::with_capacity(12);

    blocks.push(Block::Title {
        text: labels.document_title.into(),
    });

    blocks.push(Block::KeyValueTable {
        rows: vec![
            KeyValueRow {
                label: labels.patient.into(),
                value: value_or_dash(&snapshot.patient_name, labels),
            },
            KeyValueRow {
                label: labels.doctor.into(),
                value: value_or_dash(&snapshot.doctor_name, labels),
            },
            KeyValueRow {
                label: labels.schedule.into(),
                value: format_appointment(
                    snapshot.appointment_date,
                    snapshot.appointment_time,
                    labels,
                ),
            },
        ],
    });

    blocks.push(Block::Heading {
        text: labels.complaint_heading.into(),
    });
    blocks.push(if snapshot.main_complaint.trim().is_empty() {
        Block::Placeholder {
            text: labels.no_complaint.into(),
        }
    } else {
        Block::Paragraph {
            text: snapshot.main_complaint.clone(),
        }
    });

    blocks.push(Block::Heading {
        text: labels.medications_heading.into(),
    });
    blocks.push(numbered_or_placeholder(&snapshot.medications, labels.no_medications));

    blocks.push(Block::Heading {
        text: labels.questions_heading.into(),
    });
    blocks.push(numbered_or_placeholder(&snapshot.questions, labels.no_questions));

    blocks.push(Block::Heading {
        text: labels.attachment_heading.into(),
    });
    blocks.push(match &snapshot.attachment {
        Some(info) => Block::Paragraph {
            text: format!("{} {}", labels.attachment_prefix, info.name),
        },
        None => Block::Placeholder {
            text: labels.no_attachment.into(),
        },
    });

    blocks.push(Block::Footer {
        text: format!(
            "{} {}",
            labels.generated_prefix,
            generated_at.format(&format!("{DATE_FORMAT} {TIME_FORMAT}"))
        ),
    });

    SummaryDocument {
        title: labels.document_title.into(),
        generated_at,
        blocks,
    }
}

/// `"DD/MM/YYYY <joiner> HH:MM"`, e.g. `"05/03/2025 at 09:00"`.
pub fn format_appointment(date: NaiveDate, time: NaiveTime, labels: &Labels) -> String {
    format!(
        "{} {} {}",
        date.format(DATE_FORMAT),
        labels.date_time_joiner,
        time.format(TIME_FORMAT)
    )
}

/// Entries that are non-empty after trimming, in original order.
pub fn non_blank_entries(entries: &[String]) -> Vec<&str> {
    entries
        .iter()
        .map(String::as_str)
        .filter(|entry| !entry.trim().is_empty())
        .collect()
}

fn numbered_or_placeholder(entries: &[String], placeholder: &str) -> Block {
    let kept = non_blank_entries(entries);
    if kept.is_empty() {
        return Block::Placeholder {
            text: placeholder.into(),
        };
    }
    Block::NumberedList {
        items: kept
            .into_iter()
            .enumerate()
            .map(|(i, text)| NumberedItem {
                number: i + 1,
                text: text.into(),
            })
            .collect(),
    }
}

fn value_or_dash(value: &str, labels: &Labels) -> String {
    if value.is_empty() {
        labels.empty_value.into()
    } else {
        value.into()
    }
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════
