use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::assignment::{self, Assignment, AssignmentDraft, ReminderKind};
use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKind {
    NewAssignment,
    EditAssignment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorFieldId {
    Title,
    Subject,
    Due,
    Notes,
    Reminders,
}

#[derive(Debug, Clone)]
pub struct EditorField {
    pub id: EditorFieldId,
    pub label: &'static str,
    pub value: String,
    pub required: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    None,
    Cancel,
    Submit,
}

#[derive(Debug, Clone)]
pub struct EditorState {
    kind: EditorKind,
    fields: Vec<EditorField>,
    reminders: BTreeSet<ReminderKind>,
    reminder_cursor: usize,
    active: usize,
    confirming: bool,
    error: Option<String>,
    assignment_id: Option<String>,
    // Prefilled due text and the stored instant it came from.
    original_due: Option<(String, DateTime<Utc>)>,
}

impl EditorState {
    pub fn new_assignment(default_reminders: BTreeSet<ReminderKind>) -> Self {
        Self {
            kind: EditorKind::NewAssignment,
            fields: build_fields("", "", "", ""),
            reminders: default_reminders,
            reminder_cursor: 0,
            active: 0,
            confirming: false,
            error: None,
            assignment_id: None,
            original_due: None,
        }
    }

    pub fn edit_assignment(assignment: &Assignment) -> Self {
        let due_text = assignment::format_due_input(assignment.due_date);
        Self {
            kind: EditorKind::EditAssignment,
            fields: build_fields(
                &assignment.title,
                &assignment.subject,
                &due_text,
                assignment.notes.as_deref().unwrap_or(""),
            ),
            reminders: assignment.reminders.clone(),
            reminder_cursor: 0,
            active: 0,
            confirming: false,
            error: None,
            assignment_id: Some(assignment.id.clone()),
            original_due: Some((due_text, assignment.due_date)),
        }
    }

    pub fn kind(&self) -> EditorKind {
        self.kind
    }

    pub fn assignment_id(&self) -> Option<&str> {
        self.assignment_id.as_deref()
    }

    pub fn fields(&self) -> &[EditorField] {
        &self.fields
    }

    pub fn reminders(&self) -> &BTreeSet<ReminderKind> {
        &self.reminders
    }

    pub fn reminder_cursor(&self) -> usize {
        self.reminder_cursor
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_field(&self) -> Option<EditorFieldId> {
        self.fields.get(self.active).map(|field| field.id)
    }

    pub fn confirming(&self) -> bool {
        self.confirming
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_error(&mut self, message: String) {
        self.error = Some(message);
        self.confirming = false;
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> EditorAction {
        if self.confirming {
            return self.handle_confirm_key(key);
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('u') {
            if let Some(field) = self.current_text_field_mut() {
                field.value.clear();
            }
            self.error = None;
            return EditorAction::None;
        }

        match key.code {
            KeyCode::Esc => return EditorAction::Cancel,
            KeyCode::Tab | KeyCode::Down => self.move_active(1),
            KeyCode::BackTab | KeyCode::Up => self.move_active(-1),
            KeyCode::Enter => {
                if self.active + 1 >= self.fields.len() {
                    return self.attempt_confirm();
                }
                self.move_active(1);
            }
            KeyCode::Left if self.on_reminders() => self.move_reminder_cursor(-1),
            KeyCode::Right if self.on_reminders() => self.move_reminder_cursor(1),
            KeyCode::Char(' ') if self.on_reminders() => self.toggle_reminder(),
            KeyCode::Backspace => {
                if let Some(field) = self.current_text_field_mut() {
                    field.value.pop();
                }
            }
            KeyCode::Char(ch) => {
                if key.modifiers.contains(KeyModifiers::CONTROL) {
                    return EditorAction::None;
                }
                if !ch.is_control() {
                    if let Some(field) = self.current_text_field_mut() {
                        field.value.push(ch);
                    }
                }
            }
            _ => {}
        }

        self.error = None;
        EditorAction::None
    }

    /// Parse and validate the form into a draft.
    pub fn build_draft(&self) -> Result<AssignmentDraft, String> {
        let due = self.field_value(EditorFieldId::Due);
        let notes = self.field_value(EditorFieldId::Notes);
        let mut draft = AssignmentDraft::parse(
            self.field_value(EditorFieldId::Title),
            self.field_value(EditorFieldId::Subject),
            due,
            Some(notes),
            self.reminders.clone(),
        )
        .map_err(form_error)?;

        // An untouched due field keeps the stored instant exactly.
        if let Some((text, stored)) = &self.original_due {
            if due.trim() == text {
                draft.due_date = *stored;
            }
        }
        Ok(draft)
    }

    fn attempt_confirm(&mut self) -> EditorAction {
        match self.build_draft() {
            Ok(_) => {
                self.confirming = true;
                EditorAction::None
            }
            Err(err) => {
                self.set_error(err);
                EditorAction::None
            }
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) -> EditorAction {
        match key.code {
            KeyCode::Esc => EditorAction::Cancel,
            KeyCode::Backspace | KeyCode::Char('e') => {
                self.confirming = false;
                self.error = None;
                EditorAction::None
            }
            KeyCode::Char('y') | KeyCode::Enter => EditorAction::Submit,
            _ => EditorAction::None,
        }
    }

    fn on_reminders(&self) -> bool {
        self.active_field() == Some(EditorFieldId::Reminders)
    }

    fn toggle_reminder(&mut self) {
        let Some(kind) = ReminderKind::ALL.get(self.reminder_cursor).copied() else {
            return;
        };
        if !self.reminders.remove(&kind) {
            self.reminders.insert(kind);
        }
    }

    fn move_reminder_cursor(&mut self, delta: isize) {
        let len = ReminderKind::ALL.len() as isize;
        self.reminder_cursor = (self.reminder_cursor as isize + delta).rem_euclid(len) as usize;
    }

    fn move_active(&mut self, delta: isize) {
        let len = self.fields.len() as isize;
        if len == 0 {
            self.active = 0;
            return;
        }
        let next = (self.active as isize + delta).rem_euclid(len);
        self.active = next as usize;
    }

    fn current_text_field_mut(&mut self) -> Option<&mut EditorField> {
        self.fields
            .get_mut(self.active)
            .filter(|field| field.id != EditorFieldId::Reminders)
    }

    fn field_value(&self, id: EditorFieldId) -> &str {
        self.fields
            .iter()
            .find(|field| field.id == id)
            .map(|field| field.value.as_str())
            .unwrap_or("")
    }
}

fn build_fields(title: &str, subject: &str, due: &str, notes: &str) -> Vec<EditorField> {
    vec![
        EditorField {
            id: EditorFieldId::Title,
            label: "Title",
            value: title.to_string(),
            required: true,
        },
        EditorField {
            id: EditorFieldId::Subject,
            label: "Subject",
            value: subject.to_string(),
            required: true,
        },
        EditorField {
            id: EditorFieldId::Due,
            label: "Due",
            value: due.to_string(),
            required: true,
        },
        EditorField {
            id: EditorFieldId::Notes,
            label: "Notes",
            value: notes.to_string(),
            required: false,
        },
        EditorField {
            id: EditorFieldId::Reminders,
            label: "Reminders",
            value: String::new(),
            required: false,
        },
    ]
}

fn form_error(err: Error) -> String {
    match err {
        Error::InvalidArgument(message) => message,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn press(editor: &mut EditorState, code: KeyCode) -> EditorAction {
        editor.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(editor: &mut EditorState, text: &str) {
        for ch in text.chars() {
            press(editor, KeyCode::Char(ch));
        }
    }

    fn new_editor() -> EditorState {
        EditorState::new_assignment(BTreeSet::from([ReminderKind::AtDueDate]))
    }

    #[test]
    fn editor_requires_title() {
        let mut editor = new_editor();
        for _ in 0..editor.fields().len() {
            let action = press(&mut editor, KeyCode::Enter);
            assert_eq!(action, EditorAction::None);
        }
        assert_eq!(editor.error(), Some("title is required"));
        assert!(!editor.confirming());
    }

    #[test]
    fn editor_requires_subject_then_due() {
        let mut editor = new_editor();
        type_text(&mut editor, "Lab report");
        for _ in 0..editor.fields().len() {
            press(&mut editor, KeyCode::Enter);
        }
        assert_eq!(editor.error(), Some("subject is required"));

        press(&mut editor, KeyCode::Tab);
        press(&mut editor, KeyCode::Tab);
        type_text(&mut editor, "Chemistry");
        for _ in 0..4 {
            press(&mut editor, KeyCode::Enter);
        }
        assert_eq!(editor.error(), Some("due date is required"));
    }

    #[test]
    fn complete_form_confirms_and_submits() {
        let mut editor = new_editor();
        type_text(&mut editor, "Lab report");
        press(&mut editor, KeyCode::Tab);
        type_text(&mut editor, "Chemistry");
        press(&mut editor, KeyCode::Tab);
        type_text(&mut editor, "2024-05-01T17:00:00Z");
        press(&mut editor, KeyCode::Tab);
        type_text(&mut editor, "  ");
        press(&mut editor, KeyCode::Tab);
        assert_eq!(editor.active_field(), Some(EditorFieldId::Reminders));

        press(&mut editor, KeyCode::Right);
        press(&mut editor, KeyCode::Char(' '));
        assert_eq!(press(&mut editor, KeyCode::Enter), EditorAction::None);
        assert!(editor.confirming());
        assert_eq!(press(&mut editor, KeyCode::Enter), EditorAction::Submit);

        let draft = editor.build_draft().expect("draft");
        assert_eq!(draft.title, "Lab report");
        assert_eq!(draft.notes, None);
        assert_eq!(draft.due_date, Utc.with_ymd_and_hms(2024, 5, 1, 17, 0, 0).unwrap());
        assert_eq!(
            draft.reminders,
            BTreeSet::from([ReminderKind::AtDueDate, ReminderKind::OneHourBefore])
        );
    }

    #[test]
    fn letters_type_into_fields_not_reminders() {
        let mut editor = new_editor();
        type_text(&mut editor, "jk");
        assert_eq!(editor.fields()[0].value, "jk");

        for _ in 0..4 {
            press(&mut editor, KeyCode::Tab);
        }
        type_text(&mut editor, "x");
        assert!(editor.fields().iter().all(|field| field.value != "x"));
    }

    #[test]
    fn edit_prefills_from_assignment() {
        let assignment = Assignment::new(AssignmentDraft {
            title: "Essay".to_string(),
            subject: "Lit".to_string(),
            due_date: Utc.with_ymd_and_hms(2024, 5, 1, 17, 0, 0).unwrap(),
            notes: Some("2000 words".to_string()),
            reminders: BTreeSet::from([ReminderKind::OneDayBefore]),
        });
        let editor = EditorState::edit_assignment(&assignment);
        assert_eq!(editor.kind(), EditorKind::EditAssignment);
        assert_eq!(editor.assignment_id(), Some(assignment.id.as_str()));

        let draft = editor.build_draft().expect("draft");
        assert_eq!(draft.title, "Essay");
        assert_eq!(draft.notes.as_deref(), Some("2000 words"));
        assert_eq!(draft.due_date, assignment.due_date);
        assert_eq!(draft.reminders, assignment.reminders);
    }

    #[test]
    fn edit_keeps_due_seconds_when_due_untouched() {
        let assignment = Assignment::new(AssignmentDraft {
            title: "Essay".to_string(),
            subject: "Lit".to_string(),
            due_date: Utc.with_ymd_and_hms(2024, 5, 1, 17, 0, 30).unwrap()
                + chrono::Duration::milliseconds(250),
            notes: None,
            reminders: BTreeSet::new(),
        });
        let mut editor = EditorState::edit_assignment(&assignment);
        assert!(editor.fields()[2].value.ends_with(":30"));

        type_text(&mut editor, " v2");
        let draft = editor.build_draft().expect("draft");
        assert_eq!(draft.title, "Essay v2");
        assert_eq!(draft.due_date, assignment.due_date);
    }

    #[test]
    fn edited_due_text_replaces_stored_instant() {
        let assignment = Assignment::new(AssignmentDraft {
            title: "Essay".to_string(),
            subject: "Lit".to_string(),
            due_date: Utc.with_ymd_and_hms(2024, 5, 1, 17, 0, 30).unwrap(),
            notes: None,
            reminders: BTreeSet::new(),
        });
        let mut editor = EditorState::edit_assignment(&assignment);
        press(&mut editor, KeyCode::Tab);
        press(&mut editor, KeyCode::Tab);
        editor.handle_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        type_text(&mut editor, "2024-06-01T09:00:00Z");

        let draft = editor.build_draft().expect("draft");
        assert_eq!(draft.due_date, Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap());
    }

    #[test]
    fn confirm_backspace_returns_to_form() {
        let assignment = Assignment::new(AssignmentDraft {
            title: "Essay".to_string(),
            subject: "Lit".to_string(),
            due_date: Utc.with_ymd_and_hms(2024, 5, 1, 17, 0, 0).unwrap(),
            notes: None,
            reminders: BTreeSet::new(),
        });
        let mut editor = EditorState::edit_assignment(&assignment);
        for _ in 0..editor.fields().len() {
            press(&mut editor, KeyCode::Enter);
        }
        assert!(editor.confirming());
        press(&mut editor, KeyCode::Backspace);
        assert!(!editor.confirming());
        assert_eq!(press(&mut editor, KeyCode::Esc), EditorAction::Cancel);
    }
}
