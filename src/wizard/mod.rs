//! Wizard state controller: the session's form state and every operation
//! that mutates it.
//!
//! The controller owns exactly one [`SessionState`]. Hosts read it through
//! [`WizardController::state`] or take an owned [`SessionSnapshot`] for
//! rendering; they change it only through the controller's operations.
//! Every mutating operation returns a [`Refresh`] telling the host whether
//! the view must be redrawn. Out-of-range moves and removals are silent
//! no-ops that return [`Refresh::Unchanged`].

pub mod library;
pub mod step;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::attachment::{Attachment, AttachmentInfo};
use crate::clock::{Clock, SystemClock};
use crate::config;

pub use step::Step;

// ═══════════════════════════════════════════
// Refresh signal
// ═══════════════════════════════════════════

/// Outcome of a mutating operation, as seen by the presentation host.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    /// State changed; re-render from the controller.
    Render,
    /// Nothing changed (clamped move, out-of-range index, duplicate).
    Unchanged,
}

impl Refresh {
    fn from_changed(changed: bool) -> Self {
        if changed {
            Self::Render
        } else {
            Self::Unchanged
        }
    }

    pub fn is_needed(self) -> bool {
        matches!(self, Self::Render)
    }
}

// ═══════════════════════════════════════════
// Session state
// ═══════════════════════════════════════════

/// Everything the patient has entered so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    step: Step,
    patient_name: String,
    doctor_name: String,
    appointment_date: NaiveDate,
    appointment_time: NaiveTime,
    main_complaint: String,
    medications: Vec<String>,
    questions: Vec<String>,
    attachment: Option<Attachment>,
    question_library_visible: bool,
}

impl SessionState {
    /// Fresh state for a session starting on `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            step: Step::FIRST,
            patient_name: String::new(),
            doctor_name: String::new(),
            appointment_date: today,
            appointment_time: config::default_appointment_time(),
            main_complaint: String::new(),
            medications: Vec::new(),
            questions: Vec::new(),
            attachment: None,
            question_library_visible: false,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    /// Current step as a 1-based number, always within 1..=6.
    pub fn current_step(&self) -> u8 {
        self.step.number()
    }

    pub fn patient_name(&self) -> &str {
        &self.patient_name
    }

    pub fn doctor_name(&self) -> &str {
        &self.doctor_name
    }

    pub fn appointment_date(&self) -> NaiveDate {
        self.appointment_date
    }

    pub fn appointment_time(&self) -> NaiveTime {
        self.appointment_time
    }

    pub fn main_complaint(&self) -> &str {
        &self.main_complaint
    }

    pub fn medications(&self) -> &[String] {
        &self.medications
    }

    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }

    pub fn question_library_visible(&self) -> bool {
        self.question_library_visible
    }

    /// Owned, read-only copy for rendering.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            current_step: self.current_step(),
            patient_name: self.patient_name.clone(),
            doctor_name: self.doctor_name.clone(),
            appointment_date: self.appointment_date,
            appointment_time: self.appointment_time,
            main_complaint: self.main_complaint.clone(),
            medications: self.medications.clone(),
            questions: self.questions.clone(),
            attachment: self.attachment.as_ref().map(Attachment::info),
        }
    }
}

/// Immutable view of a session, the renderer's only input.
///
/// The library-visibility toggle is deliberately absent: it is screen
/// state, not part of the summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub current_step: u8,
    pub patient_name: String,
    pub doctor_name: String,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub main_complaint: String,
    pub medications: Vec<String>,
    pub questions: Vec<String>,
    pub attachment: Option<AttachmentInfo>,
}

// ═══════════════════════════════════════════
// Controller
// ═══════════════════════════════════════════

/// Owns one session's state and applies user actions to it.
pub struct WizardController {
    session_id: Uuid,
    state: SessionState,
    clock: Box<dyn Clock>,
}

impl WizardController {
    /// New session dated from the system clock.
    pub fn new() -> Self {
        Self::with_clock(Box::new(SystemClock))
    }

    /// New session whose default appointment date comes from `clock`.
    pub fn with_clock(clock: Box<dyn Clock>) -> Self {
        let session_id = Uuid::new_v4();
        let state = SessionState::new(clock.today());
        tracing::debug!(session = %session_id, "Wizard session started");
        Self {
            session_id,
            state,
            clock,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.snapshot()
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    // ── Navigation ──────────────────────────────────────────

    /// Moves one step forward; no-op at the summary step.
    pub fn advance(&mut self) -> Refresh {
        let Some(next) = self.state.step.next() else {
            return Refresh::Unchanged;
        };
        self.state.step = next;
        tracing::debug!(session = %self.session_id, step = next.number(), "Advanced");
        Refresh::Render
    }

    /// Moves one step back; no-op at the first step.
    pub fn retreat(&mut self) -> Refresh {
        let Some(previous) = self.state.step.previous() else {
            return Refresh::Unchanged;
        };
        self.state.step = previous;
        tracing::debug!(session = %self.session_id, step = previous.number(), "Retreated");
        Refresh::Render
    }

    // ── Scalar fields ───────────────────────────────────────

    pub fn set_patient_name(&mut self, name: impl Into<String>) -> Refresh {
        replace_if_changed(&mut self.state.patient_name, name.into())
    }

    pub fn set_doctor_name(&mut self, name: impl Into<String>) -> Refresh {
        replace_if_changed(&mut self.state.doctor_name, name.into())
    }

    pub fn set_appointment_date(&mut self, date: NaiveDate) -> Refresh {
        replace_if_changed(&mut self.state.appointment_date, date)
    }

    pub fn set_appointment_time(&mut self, time: NaiveTime) -> Refresh {
        replace_if_changed(&mut self.state.appointment_time, time)
    }

    pub fn set_main_complaint(&mut self, complaint: impl Into<String>) -> Refresh {
        replace_if_changed(&mut self.state.main_complaint, complaint.into())
    }

    // ── Medications ─────────────────────────────────────────

    /// Appends an empty entry for the patient to fill in.
    pub fn append_medication(&mut self) -> Refresh {
        self.state.medications.push(String::new());
        tracing::debug!(
            session = %self.session_id,
            count = self.state.medications.len(),
            "Medication entry added"
        );
        Refresh::Render
    }

    /// Overwrites the entry at `index`; out of range is a no-op.
    pub fn set_medication(&mut self, index: usize, text: impl Into<String>) -> Refresh {
        match self.state.medications.get_mut(index) {
            Some(entry) => replace_if_changed(entry, text.into()),
            None => Refresh::Unchanged,
        }
    }

    /// Removes the entry at `index`; out of range is a no-op.
    pub fn remove_medication(&mut self, index: usize) -> Refresh {
        let removed = remove_at(&mut self.state.medications, index);
        if removed {
            tracing::debug!(session = %self.session_id, index, "Medication entry removed");
        }
        Refresh::from_changed(removed)
    }

    // ── Questions ───────────────────────────────────────────

    /// Appends an empty entry for the patient to fill in.
    pub fn append_question(&mut self) -> Refresh {
        self.state.questions.push(String::new());
        tracing::debug!(
            session = %self.session_id,
            count = self.state.questions.len(),
            "Question entry added"
        );
        Refresh::Render
    }

    /// Overwrites the entry at `index`; out of range is a no-op.
    pub fn set_question(&mut self, index: usize, text: impl Into<String>) -> Refresh {
        match self.state.questions.get_mut(index) {
            Some(entry) => replace_if_changed(entry, text.into()),
            None => Refresh::Unchanged,
        }
    }

    /// Removes the entry at `index`; out of range is a no-op.
    pub fn remove_question(&mut self, index: usize) -> Refresh {
        let removed = remove_at(&mut self.state.questions, index);
        if removed {
            tracing::debug!(session = %self.session_id, index, "Question entry removed");
        }
        Refresh::from_changed(removed)
    }

    /// Appends a library question unless the exact text is already listed.
    pub fn add_library_question(&mut self, text: &str) -> Refresh {
        if self.state.questions.iter().any(|q| q == text) {
            return Refresh::Unchanged;
        }
        self.state.questions.push(text.to_owned());
        tracing::debug!(
            session = %self.session_id,
            count = self.state.questions.len(),
            "Library question added"
        );
        Refresh::Render
    }

    pub fn toggle_library(&mut self, visible: bool) -> Refresh {
        replace_if_changed(&mut self.state.question_library_visible, visible)
    }

    // ── Attachment ──────────────────────────────────────────

    /// Stores `attachment`, discarding any previous one.
    pub fn attach(&mut self, attachment: Attachment) -> Refresh {
        tracing::debug!(
            session = %self.session_id,
            kind = ?attachment.kind(),
            size = attachment.size(),
            replaced = self.state.attachment.is_some(),
            "Attachment stored"
        );
        self.state.attachment = Some(attachment);
        Refresh::Render
    }

    pub fn clear_attachment(&mut self) -> Refresh {
        Refresh::from_changed(self.state.attachment.take().is_some())
    }

    // ── Reset ───────────────────────────────────────────────

    /// Restores every field to its default and returns to step 1.
    ///
    /// The default appointment date is re-read from the clock.
    pub fn reset(&mut self) -> Refresh {
        self.state = SessionState::new(self.clock.today());
        self.state.step = Step::FIRST;
        tracing::info!(session = %self.session_id, "Wizard session reset");
        Refresh::Render
    }
}

impl Default for WizardController {
    fn default() -> Self {
        Self::new()
    }
}

fn replace_if_changed<T: PartialEq>(slot: &mut T, value: T) -> Refresh {
    if *slot == value {
        return Refresh::Unchanged;
    }
    *slot = value;
    Refresh::Render
}

fn remove_at(entries: &mut Vec<String>, index: usize) -> bool {
    if index < entries.len() {
        entries.remove(index);
        true
    } else {
        false
    }
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;

    fn controller() -> WizardController {
        let now = NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(8, 15, 0)
            .unwrap();
        WizardController::with_clock(Box::new(FixedClock(now)))
    }

    fn march_first() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    #[test]
    fn fresh_session_defaults() {
        let wizard = controller();
        let state = wizard.state();
        assert_eq!(state.current_step(), 1);
        assert_eq!(state.patient_name(), "");
        assert_eq!(state.doctor_name(), "");
        assert_eq!(state.appointment_date(), march_first());
        assert_eq!(state.appointment_time(), NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(state.main_complaint(), "");
        assert!(state.medications().is_empty());
        assert!(state.questions().is_empty());
        assert!(state.attachment().is_none());
        assert!(!state.question_library_visible());
    }

    #[test]
    fn advance_clamps_at_six() {
        let mut wizard = controller();
        for expected in 2..=6 {
            assert_eq!(wizard.advance(), Refresh::Render);
            assert_eq!(wizard.state().current_step(), expected);
        }
        assert_eq!(wizard.advance(), Refresh::Unchanged);
        assert_eq!(wizard.state().current_step(), 6);
    }

    #[test]
    fn retreat_clamps_at_one() {
        let mut wizard = controller();
        assert_eq!(wizard.retreat(), Refresh::Unchanged);
        assert_eq!(wizard.state().current_step(), 1);

        let _ = wizard.advance();
        assert_eq!(wizard.retreat(), Refresh::Render);
        assert_eq!(wizard.state().current_step(), 1);
    }

    #[test]
    fn navigation_sequence_tracks_net_valid_moves() {
        // (true = advance, false = retreat)
        let moves = [
            true, true, false, false, false, true, true, true, true, true, true, true, false,
            true, true,
        ];
        let mut wizard = controller();
        let mut expected: u8 = 1;
        for forward in moves {
            if forward {
                let _ = wizard.advance();
                expected = (expected + 1).min(6);
            } else {
                let _ = wizard.retreat();
                expected = expected.saturating_sub(1).max(1);
            }
            let step = wizard.state().current_step();
            assert!((1..=6).contains(&step));
            assert_eq!(step, expected);
        }
    }

    #[test]
    fn input_preserved_across_navigation() {
        let mut wizard = controller();
        let _ = wizard.set_patient_name("Budi Santoso");
        let _ = wizard.advance();
        let _ = wizard.set_main_complaint("Headache for three days");
        let _ = wizard.retreat();
        let _ = wizard.advance();
        let _ = wizard.advance();

        assert_eq!(wizard.state().patient_name(), "Budi Santoso");
        assert_eq!(wizard.state().main_complaint(), "Headache for three days");
    }

    #[test]
    fn setters_signal_only_real_changes() {
        let mut wizard = controller();
        assert_eq!(wizard.set_doctor_name("Dr. Annisa"), Refresh::Render);
        assert_eq!(wizard.set_doctor_name("Dr. Annisa"), Refresh::Unchanged);

        let date = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();
        assert_eq!(wizard.set_appointment_date(date), Refresh::Render);
        assert_eq!(wizard.state().appointment_date(), date);

        let time = NaiveTime::from_hms_opt(14, 30, 0).unwrap();
        assert_eq!(wizard.set_appointment_time(time), Refresh::Render);
        assert_eq!(wizard.state().appointment_time(), time);
    }

    #[test]
    fn append_and_edit_medications() {
        let mut wizard = controller();
        assert_eq!(wizard.append_medication(), Refresh::Render);
        assert_eq!(wizard.append_medication(), Refresh::Render);
        assert_eq!(wizard.state().medications(), ["", ""]);

        let _ = wizard.set_medication(1, "Paracetamol 500mg");
        assert_eq!(wizard.state().medications(), ["", "Paracetamol 500mg"]);

        assert_eq!(wizard.set_medication(5, "ignored"), Refresh::Unchanged);
        assert_eq!(wizard.state().medications().len(), 2);
    }

    #[test]
    fn remove_medication_in_range() {
        let mut wizard = controller();
        for name in ["A", "B", "C"] {
            let _ = wizard.append_medication();
            let last = wizard.state().medications().len() - 1;
            let _ = wizard.set_medication(last, name);
        }
        assert_eq!(wizard.remove_medication(1), Refresh::Render);
        assert_eq!(wizard.state().medications(), ["A", "C"]);
    }

    #[test]
    fn remove_out_of_range_leaves_lists_unchanged() {
        let mut wizard = controller();
        let _ = wizard.append_medication();
        let _ = wizard.set_medication(0, "Metformin");
        let _ = wizard.append_question();

        assert_eq!(wizard.remove_medication(1), Refresh::Unchanged);
        assert_eq!(wizard.remove_medication(usize::MAX), Refresh::Unchanged);
        assert_eq!(wizard.remove_question(3), Refresh::Unchanged);

        assert_eq!(wizard.state().medications(), ["Metformin"]);
        assert_eq!(wizard.state().questions(), [""]);
    }

    #[test]
    fn remove_from_empty_list_is_noop() {
        let mut wizard = controller();
        assert_eq!(wizard.remove_question(0), Refresh::Unchanged);
        assert_eq!(wizard.remove_medication(0), Refresh::Unchanged);
    }

    #[test]
    fn library_question_added_once() {
        let mut wizard = controller();
        let q = library::common_questions(crate::labels::Locale::English)[0];
        assert_eq!(wizard.add_library_question(q), Refresh::Render);
        assert_eq!(wizard.add_library_question(q), Refresh::Unchanged);
        assert_eq!(wizard.state().questions().iter().filter(|x| *x == q).count(), 1);
    }

    #[test]
    fn library_dedup_is_literal() {
        let mut wizard = controller();
        let _ = wizard.add_library_question("Is this contagious?");
        assert_eq!(wizard.add_library_question("is this contagious?"), Refresh::Render);
        assert_eq!(wizard.add_library_question(" Is this contagious?"), Refresh::Render);
        assert_eq!(wizard.state().questions().len(), 3);
    }

    #[test]
    fn library_question_matches_typed_entry() {
        let mut wizard = controller();
        let _ = wizard.append_question();
        let _ = wizard.set_question(0, "When should I come back?");
        assert_eq!(
            wizard.add_library_question("When should I come back?"),
            Refresh::Unchanged
        );
    }

    #[test]
    fn toggle_library_flag() {
        let mut wizard = controller();
        assert_eq!(wizard.toggle_library(true), Refresh::Render);
        assert!(wizard.state().question_library_visible());
        assert_eq!(wizard.toggle_library(true), Refresh::Unchanged);
        assert_eq!(wizard.toggle_library(false), Refresh::Render);
        assert!(!wizard.state().question_library_visible());
    }

    #[test]
    fn second_attachment_replaces_first() {
        let mut wizard = controller();
        let first = Attachment::from_upload("lab.pdf", None, vec![1u8; 10]).unwrap();
        let second = Attachment::from_upload("xray.png", None, vec![2u8; 20]).unwrap();

        let _ = wizard.attach(first);
        let _ = wizard.attach(second);

        let stored = wizard.state().attachment().unwrap();
        assert_eq!(stored.name(), "xray.png");
        assert_eq!(stored.size(), 20);

        assert_eq!(wizard.clear_attachment(), Refresh::Render);
        assert_eq!(wizard.clear_attachment(), Refresh::Unchanged);
    }

    #[test]
    fn reset_restores_defaults_from_any_state() {
        let mut wizard = controller();
        let _ = wizard.set_patient_name("Budi");
        let _ = wizard.set_doctor_name("Dr. Annisa");
        let _ = wizard.set_appointment_date(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        let _ = wizard.set_appointment_time(NaiveTime::from_hms_opt(16, 45, 0).unwrap());
        let _ = wizard.set_main_complaint("Cough");
        let _ = wizard.append_medication();
        let _ = wizard.add_library_question("Is this contagious?");
        let _ = wizard.toggle_library(true);
        let _ = wizard.attach(Attachment::from_upload("lab.pdf", None, vec![0u8; 3]).unwrap());
        for _ in 0..4 {
            let _ = wizard.advance();
        }

        assert_eq!(wizard.reset(), Refresh::Render);
        assert_eq!(wizard.state(), &SessionState::new(march_first()));
        assert_eq!(wizard.state().current_step(), 1);
    }

    #[test]
    fn snapshot_excludes_bytes_and_library_flag() {
        let mut wizard = controller();
        let _ = wizard.toggle_library(true);
        let _ = wizard.attach(Attachment::from_upload("lab.pdf", None, vec![0u8; 64]).unwrap());

        let snapshot = wizard.snapshot();
        let info = snapshot.attachment.as_ref().unwrap();
        assert_eq!(info.name, "lab.pdf");
        assert_eq!(info.size_bytes, 64);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert!(json.get("question_library_visible").is_none());
    }

    #[test]
    fn snapshot_is_detached_from_later_edits() {
        let mut wizard = controller();
        let _ = wizard.set_patient_name("Before");
        let snapshot = wizard.snapshot();
        let _ = wizard.set_patient_name("After");
        assert_eq!(snapshot.patient_name, "Before");
    }
}
