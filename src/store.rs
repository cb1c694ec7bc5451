//! Assignment store.
//!
//! Holds the in-memory collection and persists it on every change. Each
//! mutation is a locked read-modify-write against the data directory, so the
//! TUI, the watch daemon and one-shot CLI commands can share one collection.

use std::fmt;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::assignment::{Assignment, AssignmentDraft};
use crate::error::{Error, Result};
use crate::notifier::Notifier;
use crate::reminder::{self, FiredReminder};
use crate::storage::Storage;
use crate::urgency::{self, Filter, Stats};

/// Change notifications delivered to subscribers after the write lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Added(String),
    Updated(String),
    Toggled { id: String, completed: bool },
    Deleted(String),
    Reminded(Vec<FiredReminder>),
    Reloaded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

pub type Observer = Box<dyn FnMut(&StoreEvent)>;

pub struct AssignmentStore {
    storage: Storage,
    assignments: Vec<Assignment>,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

// Outcome of a closure run inside the locked read-modify-write.
struct Change<T> {
    value: T,
    dirty: bool,
}

impl<T> Change<T> {
    fn dirty(value: T) -> Self {
        Self { value, dirty: true }
    }

    fn clean(value: T) -> Self {
        Self {
            value,
            dirty: false,
        }
    }
}

impl AssignmentStore {
    /// Load the collection once. Absent or malformed data opens empty.
    pub fn open(storage: Storage) -> Self {
        let assignments = storage.load_assignments();
        debug!(count = assignments.len(), dir = %storage.data_dir().display(), "opened store");
        Self {
            storage,
            assignments,
            observers: Vec::new(),
            next_subscription: 1,
        }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Assignment> {
        self.assignments.iter().find(|assignment| assignment.id == id)
    }

    /// Resolve a full id or a unique id prefix.
    pub fn resolve_id(&self, input: &str) -> Result<String> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidArgument("assignment id cannot be empty".to_string()));
        }
        if let Some(exact) = self.get(trimmed) {
            return Ok(exact.id.clone());
        }

        let needle = trimmed.to_ascii_lowercase();
        let mut matches: Vec<&str> = self
            .assignments
            .iter()
            .map(|assignment| assignment.id.as_str())
            .filter(|id| id.to_ascii_lowercase().starts_with(&needle))
            .collect();
        matches.dedup();

        match matches.len() {
            0 => Err(Error::AssignmentNotFound(trimmed.to_string())),
            1 => Ok(matches[0].to_string()),
            n => Err(Error::AmbiguousId {
                prefix: trimmed.to_string(),
                matches: n,
            }),
        }
    }

    pub fn filtered(&self, filter: Filter) -> Vec<Assignment> {
        urgency::filter_sorted(&self.assignments, filter)
    }

    pub fn stats(&self, now: DateTime<Utc>) -> Stats {
        Stats::compute(&self.assignments, now)
    }

    /// Reload from disk, notifying subscribers when the collection changed.
    pub fn refresh(&mut self) -> bool {
        let loaded = self.storage.load_assignments();
        if loaded == self.assignments {
            return false;
        }
        self.assignments = loaded;
        self.emit(&StoreEvent::Reloaded);
        true
    }

    /// Write the in-memory collection as-is.
    pub fn save(&self) -> Result<()> {
        let _lock = self.storage.lock_assignments()?;
        self.storage.save_assignments(&self.assignments)
    }

    /// Create a new assignment at the front of the collection.
    pub fn add(&mut self, draft: AssignmentDraft) -> Result<Assignment> {
        let draft = draft.validated()?;
        let created = self.mutate(|assignments| {
            let assignment = Assignment::new(draft);
            assignments.insert(0, assignment.clone());
            Ok(Change::dirty(assignment))
        })?;
        info!(id = %created.id, title = %created.title, "added assignment");
        self.emit(&StoreEvent::Added(created.id.clone()));
        Ok(created)
    }

    /// Replace every editable field and re-arm all reminders.
    pub fn update(&mut self, id: &str, draft: AssignmentDraft) -> Result<Assignment> {
        let draft = draft.validated()?;
        let updated = self.mutate(|assignments| {
            let assignment = find_mut(assignments, id)?;
            assignment.apply_draft(draft);
            Ok(Change::dirty(assignment.clone()))
        })?;
        info!(id = %updated.id, "updated assignment");
        self.emit(&StoreEvent::Updated(updated.id.clone()));
        Ok(updated)
    }

    pub fn toggle_complete(&mut self, id: &str) -> Result<Assignment> {
        let toggled = self.mutate(|assignments| {
            let assignment = find_mut(assignments, id)?;
            assignment.is_completed = !assignment.is_completed;
            Ok(Change::dirty(assignment.clone()))
        })?;
        info!(id = %toggled.id, completed = toggled.is_completed, "toggled assignment");
        self.emit(&StoreEvent::Toggled {
            id: toggled.id.clone(),
            completed: toggled.is_completed,
        });
        Ok(toggled)
    }

    /// Remove by id. Returns whether a record was removed; missing ids are a no-op.
    pub fn delete(&mut self, id: &str) -> Result<bool> {
        let removed = self.mutate(|assignments| {
            let before = assignments.len();
            assignments.retain(|assignment| assignment.id != id);
            if assignments.len() == before {
                return Ok(Change::clean(false));
            }
            Ok(Change::dirty(true))
        })?;
        if removed {
            info!(id, "deleted assignment");
            self.emit(&StoreEvent::Deleted(id.to_string()));
        } else {
            debug!(id, "delete skipped; no such assignment");
        }
        Ok(removed)
    }

    /// Evaluate reminders at `now`, persist the new flags, then deliver.
    ///
    /// Flags are written before delivery; a failed delivery is not retried.
    pub fn apply_reminders(
        &mut self,
        now: DateTime<Utc>,
        notifier: &Notifier,
    ) -> Result<Vec<FiredReminder>> {
        let fired = self.mutate(|assignments| {
            let evaluation = reminder::evaluate(assignments, now);
            match evaluation.updated {
                Some(updated) => {
                    *assignments = updated;
                    Ok(Change::dirty(evaluation.fired))
                }
                None => Ok(Change::clean(Vec::new())),
            }
        })?;
        if fired.is_empty() {
            return Ok(fired);
        }

        let delivered = reminder::deliver(&fired, notifier);
        info!(fired = fired.len(), delivered, "reminders fired");
        self.emit(&StoreEvent::Reminded(fired.clone()));
        Ok(fired)
    }

    pub fn subscribe(&mut self, observer: Observer) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, observer));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    fn mutate<T>(
        &mut self,
        apply: impl FnOnce(&mut Vec<Assignment>) -> Result<Change<T>>,
    ) -> Result<T> {
        let _lock = self.storage.lock_assignments()?;
        let mut assignments = self.storage.load_assignments();
        let result = apply(&mut assignments);
        let change = match result {
            Ok(change) => change,
            Err(err) => {
                self.assignments = assignments;
                return Err(err);
            }
        };
        if change.dirty {
            self.storage.save_assignments(&assignments)?;
        }
        self.assignments = assignments;
        Ok(change.value)
    }

    fn emit(&mut self, event: &StoreEvent) {
        for (_, observer) in self.observers.iter_mut() {
            observer(event);
        }
    }
}

fn find_mut<'a>(assignments: &'a mut [Assignment], id: &str) -> Result<&'a mut Assignment> {
    assignments
        .iter_mut()
        .find(|assignment| assignment.id == id)
        .ok_or_else(|| Error::AssignmentNotFound(id.to_string()))
}
