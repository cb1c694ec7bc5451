//! assignmate assignment command implementations.

use std::collections::BTreeSet;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;

use chrono::Utc;
use serde::Serialize;

use crate::assignment::{self, Assignment, AssignmentDraft, ReminderKind};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::{emit, OutputOptions, Report};
use crate::storage::Storage;
use crate::store::AssignmentStore;
use crate::urgency::{self, Filter, Stats, Urgency};

pub struct AddOptions {
    pub title: String,
    pub subject: String,
    pub due: String,
    pub notes: Option<String>,
    pub remind: Vec<String>,
    pub no_reminders: bool,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct EditOptions {
    pub id: String,
    pub title: Option<String>,
    pub subject: Option<String>,
    pub due: Option<String>,
    pub notes: Option<String>,
    pub remind: Vec<String>,
    pub no_reminders: bool,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct DoneOptions {
    pub id: String,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct RmOptions {
    pub id: String,
    pub yes: bool,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct ListOptions {
    pub filter: String,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct ShowOptions {
    pub id: String,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct StatsOptions {
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct TuiOptions {
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

struct Context {
    store: AssignmentStore,
    config: Config,
}

fn load_context(data_dir: Option<PathBuf>) -> Result<Context> {
    let storage = Storage::resolve(data_dir)?;
    let config = Config::load_from_dir(storage.data_dir());
    Ok(Context {
        store: AssignmentStore::open(storage),
        config,
    })
}

pub fn run_add(options: AddOptions) -> Result<()> {
    let mut ctx = load_context(options.data_dir)?;
    let reminders = if options.no_reminders {
        BTreeSet::new()
    } else if options.remind.is_empty() {
        ctx.config.reminders.default_reminders()
    } else {
        assignment::parse_reminder_list(&options.remind)?
    };

    let draft = AssignmentDraft::parse(
        &options.title,
        &options.subject,
        &options.due,
        options.notes.as_deref(),
        reminders,
    )?;
    let created = ctx.store.add(draft)?;

    let mut report = Report::new("Assignment added");
    push_assignment_fields(&mut report, &created);
    report.suggest(format!("assignmate done {}", created.short_id()));

    emit(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "add",
        &AssignmentOutput::new(&created),
        &report,
    )
}

pub fn run_edit(options: EditOptions) -> Result<()> {
    let mut ctx = load_context(options.data_dir)?;
    let id = ctx.store.resolve_id(&options.id)?;
    let current = ctx
        .store
        .get(&id)
        .cloned()
        .ok_or_else(|| Error::AssignmentNotFound(id.clone()))?;

    let mut draft = AssignmentDraft::from_assignment(&current);
    if let Some(title) = options.title {
        draft.title = title;
    }
    if let Some(subject) = options.subject {
        draft.subject = subject;
    }
    if let Some(due) = options.due.as_deref() {
        draft.due_date = assignment::parse_due_date(due)?;
    }
    if let Some(notes) = options.notes {
        draft.notes = Some(notes);
    }
    if options.no_reminders {
        draft.reminders.clear();
    } else if !options.remind.is_empty() {
        draft.reminders = assignment::parse_reminder_list(&options.remind)?;
    }

    let updated = ctx.store.update(&id, draft)?;

    let mut report = Report::new("Assignment updated");
    push_assignment_fields(&mut report, &updated);
    if !updated.reminders.is_empty() {
        report.line("reminders re-armed");
    }

    emit(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "edit",
        &AssignmentOutput::new(&updated),
        &report,
    )
}

pub fn run_done(options: DoneOptions) -> Result<()> {
    let mut ctx = load_context(options.data_dir)?;
    let id = ctx.store.resolve_id(&options.id)?;
    let toggled = ctx.store.toggle_complete(&id)?;

    let header = if toggled.is_completed {
        "Assignment completed"
    } else {
        "Assignment reopened"
    };
    let mut report = Report::new(header);
    report.field("ID", toggled.id.clone());
    report.field("Title", toggled.title.clone());

    emit(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "done",
        &AssignmentOutput::new(&toggled),
        &report,
    )
}

pub fn run_rm(options: RmOptions) -> Result<()> {
    let mut ctx = load_context(options.data_dir)?;
    let output_options = OutputOptions {
        json: options.json,
        quiet: options.quiet,
    };

    let id = match ctx.store.resolve_id(&options.id) {
        Ok(id) => id,
        Err(Error::AssignmentNotFound(_)) => {
            let mut report = Report::new("Nothing deleted");
            report.warn(format!("no assignment matches '{}'", options.id.trim()));
            return emit(
                output_options,
                "rm",
                &DeleteOutput {
                    id: options.id.trim().to_string(),
                    removed: false,
                },
                &report,
            );
        }
        Err(err) => return Err(err),
    };

    if !options.yes {
        let title = ctx
            .store
            .get(&id)
            .map(|assignment| assignment.title.clone())
            .unwrap_or_default();
        confirm_delete(&title)?;
    }

    let removed = ctx.store.delete(&id)?;

    let mut report = Report::new(if removed {
        "Assignment deleted"
    } else {
        "Nothing deleted"
    });
    report.field("ID", id.clone());

    emit(output_options, "rm", &DeleteOutput { id, removed }, &report)
}

fn confirm_delete(title: &str) -> Result<()> {
    let stdin = io::stdin();
    if !stdin.is_terminal() {
        return Err(Error::Cancelled(
            "deletion needs confirmation; rerun with --yes".to_string(),
        ));
    }

    let mut stderr = io::stderr();
    write!(stderr, "Delete \"{title}\"? [y/N] ")?;
    stderr.flush()?;

    let mut answer = String::new();
    stdin.lock().read_line(&mut answer)?;
    if matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes") {
        Ok(())
    } else {
        Err(Error::Cancelled("deletion not confirmed".to_string()))
    }
}

pub fn run_list(options: ListOptions) -> Result<()> {
    let filter: Filter = options.filter.parse()?;
    let ctx = load_context(options.data_dir)?;
    let now = Utc::now();
    let assignments = ctx.store.filtered(filter);
    let stats = ctx.store.stats(now);

    let rows: Vec<AssignmentOutput> = assignments
        .iter()
        .map(|assignment| AssignmentOutput::at(assignment, now))
        .collect();

    let mut report = Report::new(format!("Assignments ({})", filter.label()));
    report.field("Shown", rows.len().to_string());
    report.field("Overdue", stats.overdue.to_string());
    report.field("Due soon", stats.soon.to_string());
    for row in &rows {
        report.line(format_row(row.assignment, row.urgency));
    }
    if ctx.store.is_empty() {
        report.suggest("assignmate add \"<title>\" --subject <subject> --due <YYYY-MM-DDTHH:MM>");
    }

    emit(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "list",
        &ListOutput {
            filter,
            total: rows.len(),
            assignments: rows,
        },
        &report,
    )
}

pub fn run_show(options: ShowOptions) -> Result<()> {
    let ctx = load_context(options.data_dir)?;
    let id = ctx.store.resolve_id(&options.id)?;
    let assignment = ctx
        .store
        .get(&id)
        .ok_or_else(|| Error::AssignmentNotFound(id.clone()))?;
    let output = AssignmentOutput::at(assignment, Utc::now());

    let mut report = Report::new(assignment.title.clone());
    push_assignment_fields(&mut report, assignment);
    report.field("Status", status_label(assignment, output.urgency));
    if let Some(notes) = assignment.notes.as_ref() {
        report.line(notes.clone());
    }
    let fired = assignment.last_notified.fired();
    if !fired.is_empty() {
        report.field("Notified", join_kinds(fired.iter().copied()));
    }

    emit(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "show",
        &output,
        &report,
    )
}

pub fn run_stats(options: StatsOptions) -> Result<()> {
    let ctx = load_context(options.data_dir)?;
    let stats: Stats = ctx.store.stats(Utc::now());

    let mut report = Report::new("Assignment stats");
    report.field("Total", stats.total.to_string());
    report.field("Active", stats.active.to_string());
    report.field("Overdue", stats.overdue.to_string());
    report.field("Due soon", stats.soon.to_string());
    report.field("Completed", stats.completed.to_string());

    emit(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "stats",
        &stats,
        &report,
    )
}

pub fn run_tui(options: TuiOptions) -> Result<()> {
    if options.json {
        return Err(Error::InvalidArgument("tui does not support --json".to_string()));
    }
    if options.quiet {
        return Err(Error::InvalidArgument("tui does not support --quiet".to_string()));
    }
    let ctx = load_context(options.data_dir)?;
    crate::ui::tracker::run(ctx.store, ctx.config)
}

fn push_assignment_fields(report: &mut Report, assignment: &Assignment) {
    report.field("ID", assignment.id.clone());
    report.field("Subject", assignment.subject.clone());
    report.field("Due", assignment::format_due(assignment.due_date));
    report.field("Reminders", reminders_label(&assignment.reminders));
}

fn reminders_label(reminders: &BTreeSet<ReminderKind>) -> String {
    if reminders.is_empty() {
        "none".to_string()
    } else {
        join_kinds(reminders.iter().copied())
    }
}

fn join_kinds(kinds: impl Iterator<Item = ReminderKind>) -> String {
    kinds.map(ReminderKind::label).collect::<Vec<_>>().join(", ")
}

fn status_label(assignment: &Assignment, urgency: Urgency) -> String {
    if assignment.is_completed {
        "completed".to_string()
    } else {
        urgency.to_string()
    }
}

fn format_row(assignment: &Assignment, urgency: Urgency) -> String {
    let marker = if assignment.is_completed {
        "done"
    } else {
        urgency.as_str()
    };
    format!(
        "[{marker}] {} {} {} ({})",
        assignment.short_id(),
        assignment::format_due(assignment.due_date),
        assignment.title,
        assignment.subject
    )
}

#[derive(Serialize)]
struct AssignmentOutput<'a> {
    #[serde(flatten)]
    assignment: &'a Assignment,
    urgency: Urgency,
}

impl<'a> AssignmentOutput<'a> {
    fn new(assignment: &'a Assignment) -> Self {
        Self::at(assignment, Utc::now())
    }

    fn at(assignment: &'a Assignment, now: chrono::DateTime<Utc>) -> Self {
        Self {
            assignment,
            urgency: urgency::classify_assignment(assignment, now),
        }
    }
}

#[derive(Serialize)]
struct ListOutput<'a> {
    filter: Filter,
    total: usize,
    assignments: Vec<AssignmentOutput<'a>>,
}

#[derive(Serialize)]
struct DeleteOutput {
    id: String,
    removed: bool,
}
