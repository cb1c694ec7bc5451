//! Reminder evaluation.
//!
//! [`evaluate`] is a pure recompute over the whole collection: it decides
//! which reminder windows have opened since the last poll and returns the
//! updated records. The caller delivers the fired reminders and persists the
//! collection only when something changed.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::assignment::{Assignment, ReminderKind};
use crate::notifier::Notifier;

/// One reminder that became due during an evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FiredReminder {
    pub assignment_id: String,
    pub kind: ReminderKind,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Evaluation {
    pub fired: Vec<FiredReminder>,
    /// The new collection, or `None` when no flag changed.
    pub updated: Option<Vec<Assignment>>,
}

impl Evaluation {
    pub fn is_empty(&self) -> bool {
        self.fired.is_empty()
    }
}

/// Work out which reminders fire at `now`.
///
/// Completed assignments are skipped entirely. Each selected kind fires at
/// most once; a window that opened and closed between two polls is missed.
pub fn evaluate(assignments: &[Assignment], now: DateTime<Utc>) -> Evaluation {
    let mut fired = Vec::new();
    let mut updated = assignments.to_vec();

    for assignment in updated.iter_mut().filter(|a| !a.is_completed) {
        for kind in assignment.reminders.iter().copied() {
            if assignment.last_notified.get(kind) || !kind.window_contains(assignment.due_date, now)
            {
                continue;
            }
            let (title, body) = kind.message(&assignment.title, &assignment.subject);
            fired.push(FiredReminder {
                assignment_id: assignment.id.clone(),
                kind,
                title,
                body,
            });
            assignment.last_notified.mark(kind);
        }
    }

    if fired.is_empty() {
        return Evaluation::default();
    }
    Evaluation {
        fired,
        updated: Some(updated),
    }
}

/// Hand every fired reminder to the notifier. Returns how many were delivered.
pub fn deliver(fired: &[FiredReminder], notifier: &Notifier) -> usize {
    fired
        .iter()
        .filter(|reminder| notifier.send(&reminder.title, &reminder.body))
        .count()
}
