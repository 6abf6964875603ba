//! Host command layer.
//!
//! Parses one line of user input into a [`Command`] and applies it to a
//! [`WizardController`]. Like an IPC boundary, every failure comes back as
//! a plain `String` ready to show the user.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveTime};

use crate::attachment::load_attachment;
use crate::config::AppConfig;
use crate::export::{
    attachment_export_filename, export_summary, write_export, ExportedDocument, PrintPdfBackend,
};
use crate::summary::render_summary;
use crate::wizard::library::common_questions;
use crate::wizard::{Refresh, WizardController};

/// Accepted input formats for the appointment date.
const DATE_INPUT_FORMATS: &[&str] = &["%d/%m/%Y", "%Y-%m-%d"];

pub const HELP: &str = "\
Commands:
  next | back                 move between steps
  patient <name>              set patient name
  doctor <name>               set doctor name
  date <DD/MM/YYYY>           set appointment date
  time <HH:MM>                set appointment time
  complaint <text>            set main complaint
  med add | med set <n> <text> | med rm <n>
  q add | q set <n> <text> | q rm <n>
  library show | library hide | library add <n>
  attach <path> | detach
  export                      write the summary PDF
  save-attachment             copy the attachment next to the summary
  json                        print the summary as JSON
  reset                       start over
  help | quit";

/// One user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Next,
    Back,
    PatientName(String),
    DoctorName(String),
    AppointmentDate(NaiveDate),
    AppointmentTime(NaiveTime),
    Complaint(String),
    AddMedication,
    SetMedication(usize, String),
    RemoveMedication(usize),
    AddQuestion,
    SetQuestion(usize, String),
    RemoveQuestion(usize),
    ShowLibrary(bool),
    AddLibraryQuestion(usize),
    Attach(PathBuf),
    Detach,
    Export,
    SaveAttachment,
    Json,
    Reset,
    Help,
    Quit,
}

/// What the host should do after a command ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Refresh(Refresh),
    Exported(PathBuf),
    Print(String),
    Quit,
}

impl From<Refresh> for Outcome {
    fn from(refresh: Refresh) -> Self {
        Self::Refresh(refresh)
    }
}

/// Parses a command line. List positions are 1-based as shown on screen
/// and converted to 0-based indices here.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (word, rest) = split_word(line);

    match word.to_ascii_lowercase().as_str() {
        "next" | "n" => Ok(Command::Next),
        "back" | "b" => Ok(Command::Back),
        "patient" => Ok(Command::PatientName(rest.to_string())),
        "doctor" => Ok(Command::DoctorName(rest.to_string())),
        "date" => parse_date(rest).map(Command::AppointmentDate),
        "time" => NaiveTime::parse_from_str(rest, "%H:%M")
            .map(Command::AppointmentTime)
            .map_err(|_| "Invalid time format. Use HH:MM".to_string()),
        "complaint" => Ok(Command::Complaint(rest.to_string())),
        "med" => parse_list_command(
            rest,
            Command::AddMedication,
            Command::SetMedication,
            Command::RemoveMedication,
        ),
        "q" => parse_list_command(
            rest,
            Command::AddQuestion,
            Command::SetQuestion,
            Command::RemoveQuestion,
        ),
        "library" => {
            let (action, arg) = split_word(rest);
            match action {
                "show" => Ok(Command::ShowLibrary(true)),
                "hide" => Ok(Command::ShowLibrary(false)),
                "add" => parse_position(arg).map(Command::AddLibraryQuestion),
                _ => Err("Usage: library show | library hide | library add <n>".into()),
            }
        }
        "attach" => {
            if rest.is_empty() {
                return Err("Usage: attach <path>".into());
            }
            Ok(Command::Attach(PathBuf::from(rest)))
        }
        "detach" => Ok(Command::Detach),
        "export" => Ok(Command::Export),
        "save-attachment" => Ok(Command::SaveAttachment),
        "json" => Ok(Command::Json),
        "reset" => Ok(Command::Reset),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        "" => Err("Type 'help' for a list of commands".into()),
        other => Err(format!("Unknown command: {other}")),
    }
}

/// Applies `command` to the session.
pub fn execute(
    controller: &mut WizardController,
    config: &AppConfig,
    command: Command,
) -> Result<Outcome, String> {
    let labels = config.locale.labels();

    let outcome = match command {
        Command::Next => controller.advance().into(),
        Command::Back => controller.retreat().into(),
        Command::PatientName(name) => controller.set_patient_name(name).into(),
        Command::DoctorName(name) => controller.set_doctor_name(name).into(),
        Command::AppointmentDate(date) => controller.set_appointment_date(date).into(),
        Command::AppointmentTime(time) => controller.set_appointment_time(time).into(),
        Command::Complaint(text) => controller.set_main_complaint(text).into(),
        Command::AddMedication => controller.append_medication().into(),
        Command::SetMedication(index, text) => controller.set_medication(index, text).into(),
        Command::RemoveMedication(index) => controller.remove_medication(index).into(),
        Command::AddQuestion => controller.append_question().into(),
        Command::SetQuestion(index, text) => controller.set_question(index, text).into(),
        Command::RemoveQuestion(index) => controller.remove_question(index).into(),
        Command::ShowLibrary(visible) => controller.toggle_library(visible).into(),
        Command::AddLibraryQuestion(index) => match common_questions(config.locale).get(index) {
            Some(question) => controller.add_library_question(question).into(),
            None => Refresh::Unchanged.into(),
        },
        Command::Attach(path) => {
            let attachment = load_attachment(&path).map_err(|e| e.to_string())?;
            controller.attach(attachment).into()
        }
        Command::Detach => controller.clear_attachment().into(),
        Command::Export => {
            let path = export_to_disk(controller, config)
                .map_err(|e| format!("{}: {e}", labels.export_failed))?;
            Outcome::Exported(path)
        }
        Command::SaveAttachment => {
            let path = save_attachment(controller, &config.export_dir)?;
            Outcome::Exported(path)
        }
        Command::Json => {
            let document = render_summary(&controller.snapshot(), labels, controller.clock().now());
            let json = serde_json::to_string_pretty(&document).map_err(|e| e.to_string())?;
            Outcome::Print(json)
        }
        Command::Reset => controller.reset().into(),
        Command::Help => Outcome::Print(HELP.to_string()),
        Command::Quit => Outcome::Quit,
    };

    Ok(outcome)
}

fn export_to_disk(
    controller: &WizardController,
    config: &AppConfig,
) -> Result<PathBuf, crate::export::ExportError> {
    let document = export_summary(
        &controller.snapshot(),
        config.locale.labels(),
        controller.clock().now(),
        &PrintPdfBackend,
    )?;
    write_export(&config.export_dir, &document)
}

fn save_attachment(controller: &WizardController, dir: &Path) -> Result<PathBuf, String> {
    let attachment = controller
        .state()
        .attachment()
        .ok_or("No file has been attached")?;
    let document = ExportedDocument {
        filename: attachment_export_filename(attachment.name()),
        content_type: attachment.content_type().to_string(),
        bytes: attachment.bytes().to_vec(),
    };
    write_export(dir, &document).map_err(|e| e.to_string())
}

fn parse_list_command(
    rest: &str,
    add: Command,
    set: fn(usize, String) -> Command,
    remove: fn(usize) -> Command,
) -> Result<Command, String> {
    let (action, arg) = split_word(rest);
    match action {
        "add" => Ok(add),
        "set" => {
            let (position, text) = split_word(arg);
            Ok(set(parse_position(position)?, text.to_string()))
        }
        "rm" => parse_position(arg).map(remove),
        _ => Err("Usage: add | set <n> <text> | rm <n>".into()),
    }
}

/// 1-based on screen, 0-based in the controller. `0` maps past the end so
/// it becomes a no-op like any other out-of-range position.
fn parse_position(arg: &str) -> Result<usize, String> {
    let position: usize = arg
        .trim()
        .parse()
        .map_err(|_| format!("Expected a number, got '{}'", arg.trim()))?;
    Ok(position.checked_sub(1).unwrap_or(usize::MAX))
}

fn parse_date(input: &str) -> Result<NaiveDate, String> {
    DATE_INPUT_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(input, format).ok())
        .ok_or_else(|| "Invalid date format. Use DD/MM/YYYY".to_string())
}

fn split_word(input: &str) -> (&str, &str) {
    match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim_start()),
        None => (input, ""),
    }
}
