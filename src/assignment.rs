//! Assignment records and form input.
//!
//! Assignments are persisted as a JSON array using camelCase keys:
//!
//! ```text
//! [{
//!   "id": "8f0c…",
//!   "title": "Final Essay",
//!   "subject": "Literature 101",
//!   "dueDate": "2024-05-01T17:00:00Z",
//!   "notes": "2000 words",
//!   "isCompleted": false,
//!   "reminders": ["at_due_date", "1_day_before"],
//!   "lastNotified": { "1_day_before": true }
//! }]
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Local, LocalResult, NaiveDateTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

const LOCAL_INPUT_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Format used to prefill the due date field when editing.
const DUE_INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";
const DUE_INPUT_FORMAT_SECS: &str = "%Y-%m-%dT%H:%M:%S";

/// Notification trigger relative to an assignment's due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ReminderKind {
    #[serde(rename = "at_due_date")]
    AtDueDate,
    #[serde(rename = "1_hour_before")]
    OneHourBefore,
    #[serde(rename = "1_day_before")]
    OneDayBefore,
}

impl ReminderKind {
    pub const ALL: [ReminderKind; 3] = [
        ReminderKind::AtDueDate,
        ReminderKind::OneHourBefore,
        ReminderKind::OneDayBefore,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ReminderKind::AtDueDate => "at_due_date",
            ReminderKind::OneHourBefore => "1_hour_before",
            ReminderKind::OneDayBefore => "1_day_before",
        }
    }

    /// Human label used by the form and list output.
    pub fn label(self) -> &'static str {
        match self {
            ReminderKind::AtDueDate => "At due date",
            ReminderKind::OneHourBefore => "1 hour before",
            ReminderKind::OneDayBefore => "1 day before",
        }
    }

    /// How long before the due date the reminder window opens.
    pub fn lead_time(self) -> Option<Duration> {
        match self {
            ReminderKind::AtDueDate => None,
            ReminderKind::OneHourBefore => Some(Duration::hours(1)),
            ReminderKind::OneDayBefore => Some(Duration::hours(24)),
        }
    }

    /// Whether `now` falls inside this reminder's firing window.
    ///
    /// `at_due_date` stays open forever once the due date passes; the lead-time
    /// kinds are open on `[due - lead, due)`.
    pub fn window_contains(self, due: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self.lead_time() {
            None => now >= due,
            Some(lead) => now >= due - lead && now < due,
        }
    }

    /// Notification title and body for an assignment.
    pub fn message(self, title: &str, subject: &str) -> (String, String) {
        match self {
            ReminderKind::AtDueDate => (
                "Assignment Due Now!".to_string(),
                format!("{title} is due for {subject}."),
            ),
            ReminderKind::OneHourBefore => (
                "Reminder: 1 Hour Left".to_string(),
                format!("{title} for {subject} is due soon."),
            ),
            ReminderKind::OneDayBefore => (
                "Upcoming Deadline".to_string(),
                format!("{title} for {subject} is due tomorrow."),
            ),
        }
    }
}

impl fmt::Display for ReminderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReminderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "at_due_date" | "at-due-date" | "due" => Ok(ReminderKind::AtDueDate),
            "1_hour_before" | "1-hour-before" | "1h" | "hour" => Ok(ReminderKind::OneHourBefore),
            "1_day_before" | "1-day-before" | "1d" | "day" => Ok(ReminderKind::OneDayBefore),
            other => Err(Error::InvalidArgument(format!(
                "invalid reminder '{other}' (expected at_due_date|1_hour_before|1_day_before)"
            ))),
        }
    }
}

/// Which reminder kinds have already fired for an assignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifiedFlags {
    #[serde(rename = "at_due_date", default, skip_serializing_if = "is_false")]
    pub at_due_date: bool,
    #[serde(rename = "1_hour_before", default, skip_serializing_if = "is_false")]
    pub one_hour_before: bool,
    #[serde(rename = "1_day_before", default, skip_serializing_if = "is_false")]
    pub one_day_before: bool,
}

impl NotifiedFlags {
    pub fn get(&self, kind: ReminderKind) -> bool {
        match kind {
            ReminderKind::AtDueDate => self.at_due_date,
            ReminderKind::OneHourBefore => self.one_hour_before,
            ReminderKind::OneDayBefore => self.one_day_before,
        }
    }

    pub fn mark(&mut self, kind: ReminderKind) {
        match kind {
            ReminderKind::AtDueDate => self.at_due_date = true,
            ReminderKind::OneHourBefore => self.one_hour_before = true,
            ReminderKind::OneDayBefore => self.one_day_before = true,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.at_due_date || self.one_hour_before || self.one_day_before)
    }

    pub fn fired(&self) -> Vec<ReminderKind> {
        ReminderKind::ALL
            .into_iter()
            .filter(|kind| self.get(*kind))
            .collect()
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: String,
    pub title: String,
    pub subject: String,
    pub due_date: DateTime<Utc>,
    #[serde(
        default,
        deserialize_with = "deserialize_notes",
        skip_serializing_if = "Option::is_none"
    )]
    pub notes: Option<String>,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default, deserialize_with = "deserialize_reminders")]
    pub reminders: BTreeSet<ReminderKind>,
    #[serde(default)]
    pub last_notified: NotifiedFlags,
}

impl Assignment {
    /// Create a fresh, incomplete assignment with a new id and no fired reminders.
    pub fn new(draft: AssignmentDraft) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: draft.title,
            subject: draft.subject,
            due_date: draft.due_date,
            notes: draft.notes,
            is_completed: false,
            reminders: draft.reminders,
            last_notified: NotifiedFlags::default(),
        }
    }

    /// Replace every editable field and re-arm all reminders.
    pub fn apply_draft(&mut self, draft: AssignmentDraft) {
        self.title = draft.title;
        self.subject = draft.subject;
        self.due_date = draft.due_date;
        self.notes = draft.notes;
        self.reminders = draft.reminders;
        self.last_notified = NotifiedFlags::default();
    }

    pub fn short_id(&self) -> &str {
        self.id.get(..8).unwrap_or(&self.id)
    }
}

fn deserialize_notes<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|notes| !notes.trim().is_empty()))
}

// Older files may carry "none" or kinds this build does not know; drop them.
fn deserialize_reminders<'de, D>(
    deserializer: D,
) -> std::result::Result<BTreeSet<ReminderKind>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<String>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .iter()
        .filter_map(|value| value.parse::<ReminderKind>().ok())
        .collect())
}

/// Validated contents of the create/edit form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentDraft {
    pub title: String,
    pub subject: String,
    pub due_date: DateTime<Utc>,
    pub notes: Option<String>,
    pub reminders: BTreeSet<ReminderKind>,
}

impl AssignmentDraft {
    /// Build a draft from raw form strings, interpreting the due date in local time.
    pub fn parse(
        title: &str,
        subject: &str,
        due: &str,
        notes: Option<&str>,
        reminders: BTreeSet<ReminderKind>,
    ) -> Result<Self> {
        require(title, "title")?;
        require(subject, "subject")?;
        let due_date = parse_due_date(due)?;
        Self {
            title: title.to_string(),
            subject: subject.to_string(),
            due_date,
            notes: notes.map(str::to_string),
            reminders,
        }
        .validated()
    }

    /// Prefill a draft from an existing assignment (edit form).
    pub fn from_assignment(assignment: &Assignment) -> Self {
        Self {
            title: assignment.title.clone(),
            subject: assignment.subject.clone(),
            due_date: assignment.due_date,
            notes: assignment.notes.clone(),
            reminders: assignment.reminders.clone(),
        }
    }

    /// Trim text fields and reject missing required ones.
    pub fn validated(self) -> Result<Self> {
        let title = require(&self.title, "title")?;
        let subject = require(&self.subject, "subject")?;
        let notes = self
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|notes| !notes.is_empty())
            .map(str::to_string);
        Ok(Self {
            title: title.to_string(),
            subject: subject.to_string(),
            due_date: self.due_date,
            notes,
            reminders: self.reminders,
        })
    }
}

fn require<'a>(value: &'a str, field: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidArgument(format!("{field} is required")));
    }
    Ok(trimmed)
}

/// Parse a due date typed by the user, interpreting zone-less input as local time.
pub fn parse_due_date(input: &str) -> Result<DateTime<Utc>> {
    parse_due_date_in(input, &Local)
}

pub fn parse_due_date_in<Tz: TimeZone>(input: &str, tz: &Tz) -> Result<DateTime<Utc>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidArgument("due date is required".to_string()));
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }

    for format in LOCAL_INPUT_FORMATS {
        let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) else {
            continue;
        };
        return match tz.from_local_datetime(&naive) {
            LocalResult::Single(value) => Ok(value.with_timezone(&Utc)),
            LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
            LocalResult::None => Err(Error::InvalidArgument(format!(
                "due date '{trimmed}' does not exist in the local time zone"
            ))),
        };
    }

    Err(Error::InvalidArgument(format!(
        "invalid due date '{trimmed}' (expected YYYY-MM-DDTHH:MM or RFC 3339)"
    )))
}

/// Parse a comma/whitespace separated reminder list, e.g. `at_due_date,1d`.
pub fn parse_reminder_list(values: &[String]) -> Result<BTreeSet<ReminderKind>> {
    let mut out = BTreeSet::new();
    for value in values {
        for part in value
            .split(|ch: char| ch == ',' || ch.is_whitespace())
            .map(str::trim)
            .filter(|part| !part.is_empty())
        {
            out.insert(part.parse::<ReminderKind>()?);
        }
    }
    Ok(out)
}

/// Render a due date in local time for list rows.
pub fn format_due(due: DateTime<Utc>) -> String {
    due.with_timezone(&Local).format("%b %d %H:%M").to_string()
}

/// Render a due date in the editable local input format, keeping seconds
/// when they are not zero.
pub fn format_due_input(due: DateTime<Utc>) -> String {
    let local = due.with_timezone(&Local);
    let format = if local.second() == 0 {
        DUE_INPUT_FORMAT
    } else {
        DUE_INPUT_FORMAT_SECS
    };
    local.format(format).to_string()
}
