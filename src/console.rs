//! Line-oriented terminal host for the wizard.
//!
//! Prints the current step, reads one command per line and redraws only
//! when the controller reports a change. Generic over the reader and
//! writer so whole sessions can be scripted.

use std::io::{self, BufRead, Write};

use crate::attachment::ALLOWED_EXTENSIONS;
use crate::commands::{execute, parse_command, Outcome};
use crate::config::{AppConfig, TOTAL_STEPS};
use crate::summary::{format_appointment, render_summary};
use crate::wizard::library::common_questions;
use crate::wizard::{Step, WizardController};

const PROGRESS_WIDTH: usize = 24;
const PROMPT: &str = "> ";

/// Runs the wizard until `quit` or end of input.
pub fn run_console<R, W>(
    input: R,
    output: &mut W,
    controller: &mut WizardController,
    config: &AppConfig,
) -> io::Result<()>
where
    R: BufRead,
    W: Write,
{
    tracing::info!(
        session = %controller.session_id(),
        locale = config.locale.code(),
        "Console session started"
    );

    render_screen(output, controller, config)?;
    write!(output, "{PROMPT}")?;
    output.flush()?;

    for line in input.lines() {
        let line = line?;
        let outcome = parse_command(&line).and_then(|cmd| execute(controller, config, cmd));

        match outcome {
            Ok(Outcome::Refresh(refresh)) => {
                if refresh.is_needed() {
                    render_screen(output, controller, config)?;
                }
            }
            Ok(Outcome::Exported(path)) => {
                writeln!(output, "Saved: {}", path.display())?;
            }
            Ok(Outcome::Print(text)) => {
                writeln!(output, "{text}")?;
            }
            Ok(Outcome::Quit) => break,
            Err(message) => {
                writeln!(output, "! {message}")?;
            }
        }

        write!(output, "{PROMPT}")?;
        output.flush()?;
    }

    writeln!(output)?;
    tracing::info!(session = %controller.session_id(), "Console session ended");
    Ok(())
}

/// Draws the header and the body of the current step.
pub fn render_screen<W: Write>(
    output: &mut W,
    controller: &WizardController,
    config: &AppConfig,
) -> io::Result<()> {
    let labels = config.locale.labels();
    let state = controller.state();
    let step = state.step();

    writeln!(output)?;
    writeln!(output, "{}", labels.app_title)?;
    writeln!(
        output,
        "Step {} of {TOTAL_STEPS}: {}",
        step.number(),
        step.title(labels)
    )?;
    writeln!(output, "{}", progress_bar(step))?;
    writeln!(output)?;

    match step {
        Step::BasicInfo => {
            writeln!(output, "{} {}", labels.patient, state.patient_name())?;
            writeln!(output, "{} {}", labels.doctor, state.doctor_name())?;
            writeln!(
                output,
                "{} {}",
                labels.schedule,
                format_appointment(state.appointment_date(), state.appointment_time(), labels)
            )?;
        }
        Step::MainComplaint => {
            if state.main_complaint().trim().is_empty() {
                writeln!(output, "({})", labels.no_complaint)?;
            } else {
                writeln!(output, "{}", state.main_complaint())?;
            }
        }
        Step::Medications => {
            write_entries(output, state.medications(), labels.no_medications)?;
        }
        Step::Questions => {
            write_entries(output, state.questions(), labels.no_questions)?;
            if state.question_library_visible() {
                writeln!(output)?;
                for (i, question) in common_questions(config.locale).iter().enumerate() {
                    let added = state.questions().iter().any(|q| q == *question);
                    let mark = if added { '*' } else { ' ' };
                    writeln!(output, " {mark}{:>2}. {question}", i + 1)?;
                }
            }
        }
        Step::Attachment => {
            writeln!(output, "Accepted: {}", ALLOWED_EXTENSIONS.join(", "))?;
            match state.attachment() {
                Some(attachment) => {
                    let kind = if attachment.is_image() { "image" } else { "PDF" };
                    writeln!(
                        output,
                        "{} {} ({kind}, {})",
                        labels.attachment_prefix,
                        attachment.name(),
                        attachment.size_label()
                    )?;
                }
                None => writeln!(output, "{}", labels.no_attachment)?,
            }
        }
        Step::Summary => {
            let document = render_summary(&controller.snapshot(), labels, controller.clock().now());
            write!(output, "{}", document.to_text())?;
            if let Some(attachment) = state.attachment() {
                let note = if attachment.is_image() {
                    labels.image_attached_note
                } else {
                    labels.pdf_attached_note
                };
                writeln!(output, "({note})")?;
            }
        }
    }

    Ok(())
}

fn write_entries<W: Write>(output: &mut W, entries: &[String], empty: &str) -> io::Result<()> {
    if entries.is_empty() {
        return writeln!(output, "({empty})");
    }
    for (i, entry) in entries.iter().enumerate() {
        writeln!(output, "{:>2}. {entry}", i + 1)?;
    }
    Ok(())
}

fn progress_bar(step: Step) -> String {
    let filled = (step.progress() * PROGRESS_WIDTH as f32).round() as usize;
    format!(
        "[{}{}] {:>3.0}%",
        "#".repeat(filled),
        "-".repeat(PROGRESS_WIDTH - filled.min(PROGRESS_WIDTH)),
        step.progress() * 100.0
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::labels::Locale;
    use chrono::NaiveDate;

    fn controller() -> WizardController {
        let now = NaiveDate::from_ymd_opt(2025, 3, 4)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        WizardController::with_clock(Box::new(FixedClock(now)))
    }

    fn run_script(script: &str, config: &AppConfig) -> (String, WizardController) {
        let mut wizard = controller();
        let mut out = Vec::new();
        run_console(script.as_bytes(), &mut out, &mut wizard, config).unwrap();
        (String::from_utf8(out).unwrap(), wizard)
    }

    fn config() -> AppConfig {
        AppConfig {
            locale: Locale::English,
            export_dir: std::env::temp_dir().join("previsit-console-tests"),
        }
    }

    #[test]
    fn first_screen_shows_step_one() {
        let (out, _) = run_script("", &config());
        assert!(out.contains("Step 1 of 6: Basic Information"));
        assert!(out.contains("04/03/2025 at 09:00"));
    }

    #[test]
    fn full_session_reaches_summary() {
        let script = "\
patient Budi Santoso
doctor Dr. Annisa
date 05/03/2025
next
complaint Persistent dry cough
next
med add
med set 1 Paracetamol 500mg
med add
next
library show
library add 1
next
next
quit
";
        let (out, wizard) = run_script(script, &config());

        assert_eq!(wizard.state().current_step(), 6);
        assert!(out.contains("Step 6 of 6: Summary for Your Consultation"));
        assert!(out.contains("Patient: Budi Santoso"));
        assert!(out.contains("Appointment: 05/03/2025 at 09:00"));
        assert!(out.contains("1. Paracetamol 500mg"));
        assert!(out.contains("1. What is the diagnosis of my current condition?"));
        assert!(out.contains("No file uploaded"));
        assert!(out.contains("Generated on: 04/03/2025 10:30"));
    }

    #[test]
    fn no_op_commands_do_not_redraw() {
        let (out, _) = run_script("back\nback\n", &config());
        assert_eq!(out.matches("Step 1 of 6").count(), 1);
    }

    #[test]
    fn errors_are_shown_and_session_continues() {
        let (out, wizard) = run_script("date tomorrow\nnext\n", &config());
        assert!(out.contains("! Invalid date format"));
        assert_eq!(wizard.state().current_step(), 2);
    }

    #[test]
    fn library_marks_added_questions() {
        let (out, _) = run_script("next\nnext\nnext\nlibrary show\nlibrary add 2\n", &config());
        assert!(out.contains(" * 2. What is causing my condition?"));
        assert!(out.contains("   1. What is the diagnosis of my current condition?"));
    }

    #[test]
    fn attachment_step_lists_accepted_types() {
        let (out, _) = run_script("next\nnext\nnext\nnext\n", &config());
        assert!(out.contains("Step 5 of 6"));
        assert!(out.contains("Accepted: pdf, jpg, jpeg, png"));
    }

    #[test]
    fn blank_complaint_shows_placeholder_on_step_two() {
        let mut wizard = controller();
        let _ = wizard.advance();
        let _ = wizard.set_main_complaint("   \t");
        let mut out = Vec::new();
        render_screen(&mut out, &wizard, &config()).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("(No complaint recorded)"));
    }

    #[test]
    fn summary_notes_attachment_kind() {
        let tmp = tempfile::tempdir().unwrap();
        let scan = tmp.path().join("scan.pdf");
        std::fs::write(&scan, b"%PDF-1.4").unwrap();
        let script = format!("attach {}\nnext\nnext\nnext\nnext\nnext\n", scan.display());

        let (out, _) = run_script(&script, &config());
        assert!(out.contains("Attached file: scan.pdf"));
        assert!(out.contains("(PDF attached (preview not available))"));
    }

    #[test]
    fn progress_bar_tracks_step() {
        assert!(progress_bar(Step::FIRST).ends_with(" 17%"));
        assert!(progress_bar(Step::LAST).starts_with(&format!("[{}]", "#".repeat(PROGRESS_WIDTH))));
        assert!(progress_bar(Step::LAST).ends_with("100%"));
    }
}
