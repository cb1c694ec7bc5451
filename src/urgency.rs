//! Urgency classification, list filters and summary stats.
//!
//! All of this is presentation: reminder timing lives in [`crate::reminder`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::assignment::Assignment;
use crate::error::{Error, Result};

/// Horizon within which an incomplete assignment counts as due soon.
pub const SOON_WINDOW_HOURS: i64 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Overdue,
    Soon,
    Upcoming,
}

impl Urgency {
    pub fn as_str(self) -> &'static str {
        match self {
            Urgency::Overdue => "overdue",
            Urgency::Soon => "soon",
            Urgency::Upcoming => "upcoming",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify an assignment for color coding. Completed work is never urgent.
pub fn classify(due: DateTime<Utc>, is_completed: bool, now: DateTime<Utc>) -> Urgency {
    if is_completed {
        return Urgency::Upcoming;
    }
    if due < now {
        return Urgency::Overdue;
    }
    if is_due_soon(due, now) {
        return Urgency::Soon;
    }
    Urgency::Upcoming
}

pub fn classify_assignment(assignment: &Assignment, now: DateTime<Utc>) -> Urgency {
    classify(assignment.due_date, assignment.is_completed, now)
}

fn is_due_soon(due: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    let remaining = due - now;
    remaining > Duration::zero() && remaining <= Duration::hours(SOON_WINDOW_HOURS)
}

/// Which slice of the collection a list view shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    #[default]
    Active,
    Completed,
    All,
}

impl Filter {
    pub const ALL: [Filter; 3] = [Filter::Active, Filter::Completed, Filter::All];

    pub fn as_str(self) -> &'static str {
        match self {
            Filter::Active => "active",
            Filter::Completed => "completed",
            Filter::All => "all",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Filter::Active => "Active",
            Filter::Completed => "Completed",
            Filter::All => "All",
        }
    }

    pub fn matches(self, assignment: &Assignment) -> bool {
        match self {
            Filter::Active => !assignment.is_completed,
            Filter::Completed => assignment.is_completed,
            Filter::All => true,
        }
    }

    pub fn next(self) -> Self {
        match self {
            Filter::Active => Filter::Completed,
            Filter::Completed => Filter::All,
            Filter::All => Filter::Active,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Filter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Filter::Active),
            "completed" | "done" => Ok(Filter::Completed),
            "all" => Ok(Filter::All),
            other => Err(Error::InvalidArgument(format!(
                "invalid filter '{other}' (expected active|completed|all)"
            ))),
        }
    }
}

/// Apply a filter and sort ascending by due date. Ties keep collection order.
pub fn filter_sorted(assignments: &[Assignment], filter: Filter) -> Vec<Assignment> {
    let mut out: Vec<Assignment> = assignments
        .iter()
        .filter(|assignment| filter.matches(assignment))
        .cloned()
        .collect();
    out.sort_by_key(|assignment| assignment.due_date);
    out
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub total: usize,
    pub active: usize,
    pub overdue: usize,
    pub soon: usize,
    pub completed: usize,
}

impl Stats {
    pub fn compute(assignments: &[Assignment], now: DateTime<Utc>) -> Self {
        let mut stats = Stats {
            total: assignments.len(),
            ..Stats::default()
        };
        for assignment in assignments {
            if assignment.is_completed {
                stats.completed += 1;
                continue;
            }
            stats.active += 1;
            if assignment.due_date < now {
                stats.overdue += 1;
            } else if is_due_soon(assignment.due_date, now) {
                stats.soon += 1;
            }
        }
        stats
    }
}
