use crate::assignment::AssignmentDraft;
use crate::config::DisplayConfig;
use crate::error::Result;
use crate::notifier::{Notifier, Permission};
use crate::store::AssignmentStore;
use crate::theme::{self, Theme};

#[derive(Debug, Clone)]
pub struct ActionOutcome {
    pub changed: bool,
    pub message: String,
    pub assignment_id: Option<String>,
}

pub fn create_assignment(store: &mut AssignmentStore, draft: AssignmentDraft) -> Result<ActionOutcome> {
    let created = store.add(draft)?;
    Ok(ActionOutcome {
        changed: true,
        message: format!("added {}", created.title),
        assignment_id: Some(created.id),
    })
}

/// Saving the edit form always re-arms reminders, even with no field changed.
pub fn update_assignment(
    store: &mut AssignmentStore,
    id: &str,
    draft: AssignmentDraft,
) -> Result<ActionOutcome> {
    let updated = store.update(id, draft)?;
    Ok(ActionOutcome {
        changed: true,
        message: format!("updated {}", updated.title),
        assignment_id: Some(updated.id),
    })
}

pub fn toggle_assignment(store: &mut AssignmentStore, id: &str) -> Result<ActionOutcome> {
    let toggled = store.toggle_complete(id)?;
    let message = if toggled.is_completed {
        format!("completed {}", toggled.title)
    } else {
        format!("reopened {}", toggled.title)
    };
    Ok(ActionOutcome {
        changed: true,
        message,
        assignment_id: Some(toggled.id),
    })
}

pub fn delete_assignment(store: &mut AssignmentStore, id: &str) -> Result<ActionOutcome> {
    let title = store.get(id).map(|assignment| assignment.title.clone());
    let removed = store.delete(id)?;
    let message = match (removed, title) {
        (true, Some(title)) => format!("deleted {title}"),
        (true, None) => format!("deleted {id}"),
        (false, _) => "already deleted".to_string(),
    };
    Ok(ActionOutcome {
        changed: removed,
        message,
        assignment_id: None,
    })
}

pub fn request_notifications(notifier: &mut Notifier) -> Result<ActionOutcome> {
    let before = notifier.permission();
    let after = notifier.request_permission()?;
    let message = match after {
        Permission::Granted => "notifications enabled".to_string(),
        _ => format!("notifications unavailable ({} backend)", notifier.backend_name()),
    };
    Ok(ActionOutcome {
        changed: before != after,
        message,
        assignment_id: None,
    })
}

pub fn toggle_theme(
    store: &AssignmentStore,
    display: &DisplayConfig,
) -> Result<(Theme, ActionOutcome)> {
    let next = theme::toggle(store.storage(), display)?;
    Ok((
        next,
        ActionOutcome {
            changed: true,
            message: format!("{next} theme"),
            assignment_id: None,
        },
    ))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::{Duration, Utc};
    use tempfile::TempDir;

    use super::*;
    use crate::assignment::ReminderKind;
    use crate::notifier::MemoryBackend;
    use crate::storage::Storage;

    fn setup_store() -> (TempDir, AssignmentStore) {
        let dir = TempDir::new().expect("temp dir");
        let store = AssignmentStore::open(Storage::new(dir.path()));
        (dir, store)
    }

    fn draft(title: &str) -> AssignmentDraft {
        AssignmentDraft {
            title: title.to_string(),
            subject: "Math".to_string(),
            due_date: Utc::now() + Duration::days(3),
            notes: None,
            reminders: BTreeSet::from([ReminderKind::AtDueDate]),
        }
    }

    #[test]
    fn create_reports_new_id() {
        let (_dir, mut store) = setup_store();
        let outcome = create_assignment(&mut store, draft("Problem set")).expect("create");
        assert!(outcome.changed);
        let id = outcome.assignment_id.expect("id");
        assert!(store.get(&id).is_some());
    }

    #[test]
    fn unchanged_edit_still_rearms_reminders() {
        let (_dir, mut store) = setup_store();
        let mut overdue = draft("Essay");
        overdue.due_date = Utc::now() - Duration::minutes(5);
        let created = store.add(overdue).expect("add");

        let backend = MemoryBackend::new();
        let notifier = Notifier::new(Box::new(backend.clone()), Permission::Granted);
        assert_eq!(store.apply_reminders(Utc::now(), &notifier).expect("fire").len(), 1);
        let current = store.get(&created.id).expect("present").clone();
        assert!(current.last_notified.get(ReminderKind::AtDueDate));

        let same = AssignmentDraft::from_assignment(&current);
        let outcome = update_assignment(&mut store, &created.id, same).expect("update");
        assert!(outcome.changed);
        assert!(store.get(&created.id).expect("present").last_notified.is_empty());

        let refired = store.apply_reminders(Utc::now(), &notifier).expect("refire");
        assert_eq!(refired.len(), 1);
        assert_eq!(backend.sent().len(), 2);
    }

    #[test]
    fn update_changes_title() {
        let (_dir, mut store) = setup_store();
        let created = store.add(draft("Essay")).expect("add");
        let mut edited = AssignmentDraft::from_assignment(&created);
        edited.title = "Essay v2".to_string();
        let outcome = update_assignment(&mut store, &created.id, edited).expect("update");
        assert!(outcome.changed);
        assert_eq!(store.get(&created.id).expect("present").title, "Essay v2");
    }

    #[test]
    fn toggle_reports_direction() {
        let (_dir, mut store) = setup_store();
        let created = store.add(draft("Lab report")).expect("add");
        let done = toggle_assignment(&mut store, &created.id).expect("toggle");
        assert!(done.message.starts_with("completed"));
        let reopened = toggle_assignment(&mut store, &created.id).expect("toggle");
        assert!(reopened.message.starts_with("reopened"));
    }

    #[test]
    fn delete_missing_is_unchanged() {
        let (_dir, mut store) = setup_store();
        let created = store.add(draft("Quiz")).expect("add");
        let first = delete_assignment(&mut store, &created.id).expect("delete");
        assert!(first.changed);
        assert_eq!(first.message, "deleted Quiz");
        let second = delete_assignment(&mut store, &created.id).expect("delete again");
        assert!(!second.changed);
    }

    #[test]
    fn request_notifications_reports_unsupported_backend() {
        let mut notifier = Notifier::new(Box::new(MemoryBackend::unsupported()), Permission::Default);
        let outcome = request_notifications(&mut notifier).expect("request");
        assert_eq!(notifier.permission(), Permission::Denied);
        assert!(outcome.message.contains("unavailable"));
    }

    #[test]
    fn toggle_theme_persists() {
        let (_dir, store) = setup_store();
        let display = DisplayConfig {
            theme: "dark".to_string(),
        };
        let (next, outcome) = toggle_theme(&store, &display).expect("toggle");
        assert_eq!(next, Theme::Light);
        assert_eq!(outcome.message, "light theme");
        assert_eq!(theme::load(store.storage(), &display), Theme::Light);
    }
}
