use chrono::{DateTime, Utc};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::assignment::{self, Assignment, ReminderKind};
use crate::theme::Theme;
use crate::urgency::{self, Filter, Urgency};

use super::app::{AppState, DeleteConfirmState, HelpContext, StatusKind};
use super::editor::{EditorFieldId, EditorKind, EditorState};

const DUE_WIDTH: usize = 12;
const SUBJECT_WIDTH: usize = 14;
const LABEL_WIDTH: usize = 11;
const HELP_KEY_WIDTH: usize = 14;
const DUE_HINT: &str = "YYYY-MM-DDTHH:MM";

/// Colors for one theme.
struct Palette {
    text: Color,
    muted: Color,
    muted_dark: Color,
    selection_bg: Color,
    info: Color,
    accent: Color,
    border_list: Color,
    border_detail: Color,
    overdue: Color,
    soon: Color,
    upcoming: Color,
    completed: Color,
}

const DARK: Palette = Palette {
    text: Color::Rgb(234, 236, 239),
    muted: Color::Rgb(160, 165, 172),
    muted_dark: Color::Rgb(118, 124, 130),
    selection_bg: Color::Rgb(52, 56, 60),
    info: Color::Rgb(116, 198, 219),
    accent: Color::Rgb(122, 170, 255),
    border_list: Color::Rgb(92, 126, 166),
    border_detail: Color::Rgb(180, 156, 92),
    overdue: Color::Rgb(255, 107, 107),
    soon: Color::Rgb(244, 200, 98),
    upcoming: Color::Rgb(126, 210, 146),
    completed: Color::Rgb(98, 114, 164),
};

const LIGHT: Palette = Palette {
    text: Color::Rgb(36, 41, 47),
    muted: Color::Rgb(87, 96, 106),
    muted_dark: Color::Rgb(110, 119, 129),
    selection_bg: Color::Rgb(221, 227, 234),
    info: Color::Rgb(9, 105, 218),
    accent: Color::Rgb(130, 80, 223),
    border_list: Color::Rgb(84, 110, 140),
    border_detail: Color::Rgb(154, 103, 0),
    overdue: Color::Rgb(207, 34, 46),
    soon: Color::Rgb(191, 135, 0),
    upcoming: Color::Rgb(26, 127, 55),
    completed: Color::Rgb(140, 149, 159),
};

fn palette(theme: Theme) -> &'static Palette {
    match theme {
        Theme::Dark => &DARK,
        Theme::Light => &LIGHT,
    }
}

impl Palette {
    fn urgency(&self, assignment: &Assignment, now: DateTime<Utc>) -> Color {
        if assignment.is_completed {
            return self.completed;
        }
        match urgency::classify_assignment(assignment, now) {
            Urgency::Overdue => self.overdue,
            Urgency::Soon => self.soon,
            Urgency::Upcoming => self.upcoming,
        }
    }
}

pub fn render(frame: &mut Frame, app: &AppState) {
    let area = frame.size();
    let colors = palette(app.theme);
    if app.theme == Theme::Light {
        frame.render_widget(
            Block::default().style(Style::default().bg(Color::Rgb(250, 251, 252))),
            area,
        );
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(area);

    render_header(frame, app, colors, chunks[0]);
    render_stats(frame, app, colors, chunks[1]);
    render_tabs(frame, app, colors, chunks[2]);

    let main = chunks[3];
    if app.is_narrow() {
        if app.editor.is_some() {
            render_detail(frame, app, colors, main);
        } else {
            render_list(frame, app, colors, main);
        }
    } else {
        let split = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)].as_ref())
            .split(main);
        render_list(frame, app, colors, split[0]);
        render_detail(frame, app, colors, split[1]);
    }

    render_footer(frame, app, colors, chunks[4]);

    if app.help_context == HelpContext::List {
        render_help_modal(frame, area, colors);
    }
    if let Some(state) = app.delete_confirm.as_ref() {
        render_delete_confirm_modal(frame, area, colors, state);
    }
}

fn render_header(frame: &mut Frame, app: &AppState, colors: &Palette, area: Rect) {
    let spans = vec![
        Span::styled(
            "AssignMate",
            Style::default()
                .fg(colors.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("  ", Style::default()),
        Span::styled(
            format!(
                "notifications: {}  theme: {}  every {}s",
                app.permission_label(),
                app.theme,
                app.poll_interval().as_secs()
            ),
            Style::default().fg(colors.muted),
        ),
    ];
    let widget = Paragraph::new(Line::from(spans));
    frame.render_widget(widget, area);
}

fn render_stats(frame: &mut Frame, app: &AppState, colors: &Palette, area: Rect) {
    let stats = app.stats;
    let cells = [
        ("total", stats.total, colors.text),
        ("active", stats.active, colors.info),
        ("overdue", stats.overdue, colors.overdue),
        ("due soon", stats.soon, colors.soon),
        ("done", stats.completed, colors.completed),
    ];
    let mut spans = Vec::new();
    for (idx, (label, count, color)) in cells.into_iter().enumerate() {
        if idx > 0 {
            spans.push(Span::styled("  ", Style::default().fg(colors.muted_dark)));
        }
        spans.push(Span::styled(
            count.to_string(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(
            format!(" {label}"),
            Style::default().fg(colors.muted),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_tabs(frame: &mut Frame, app: &AppState, colors: &Palette, area: Rect) {
    let mut spans = Vec::new();
    for (idx, filter) in Filter::ALL.into_iter().enumerate() {
        if idx > 0 {
            spans.push(Span::styled("  ", Style::default().fg(colors.muted_dark)));
        }
        let count = match filter {
            Filter::Active => app.stats.active,
            Filter::Completed => app.stats.completed,
            Filter::All => app.stats.total,
        };
        let text = format!("{} {} ({count})", idx + 1, filter.label());
        let style = if app.filter == filter {
            Style::default()
                .fg(colors.accent)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(colors.muted)
        };
        spans.push(Span::styled(text, style));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_list(frame: &mut Frame, app: &AppState, colors: &Palette, area: Rect) {
    let content_width = area.width.saturating_sub(2) as usize;
    let mut lines = Vec::new();

    if app.visible.is_empty() {
        let empty = match app.filter {
            Filter::Active => "No active assignments. Press a to add one.",
            Filter::Completed => "Nothing completed yet.",
            Filter::All => "No assignments. Press a to add one.",
        };
        lines.push(Line::from(Span::styled(
            empty,
            Style::default().fg(colors.muted),
        )));
    } else {
        let list_height = area.height.saturating_sub(2) as usize;
        let (start, end) = list_window(app.visible.len(), app.selected, list_height);
        for pos in start..end {
            let assignment = &app.visible[pos];
            lines.push(render_list_row(
                assignment,
                app.selected == Some(pos),
                app.now,
                content_width,
                colors,
            ));
        }
    }

    let title = format!("{} assignments", app.filter.label());
    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(colors.border_list)),
    );
    frame.render_widget(widget, area);
}

fn render_list_row(
    assignment: &Assignment,
    selected: bool,
    now: DateTime<Utc>,
    width: usize,
    colors: &Palette,
) -> Line<'static> {
    let urgency_color = colors.urgency(assignment, now);
    let marker = if assignment.is_completed { "[x]" } else { "[ ]" };
    let title_width = width.saturating_sub(4 + DUE_WIDTH + 1 + SUBJECT_WIDTH + 1);
    let mut title_style = Style::default().fg(colors.text);
    if assignment.is_completed {
        title_style = title_style
            .fg(colors.completed)
            .add_modifier(Modifier::CROSSED_OUT);
    }

    let mut spans = vec![
        Span::styled(format!("{marker} "), Style::default().fg(urgency_color)),
        Span::styled(
            pad_text(&assignment::format_due(assignment.due_date), DUE_WIDTH),
            Style::default().fg(urgency_color),
        ),
        Span::raw(" "),
        Span::styled(
            pad_text(&assignment.subject, SUBJECT_WIDTH),
            Style::default().fg(colors.info),
        ),
        Span::raw(" "),
        Span::styled(truncate_text(&assignment.title, title_width), title_style),
    ];
    if selected {
        for span in &mut spans {
            span.style = span
                .style
                .bg(colors.selection_bg)
                .add_modifier(Modifier::BOLD);
        }
    }
    Line::from(spans)
}

fn render_detail(frame: &mut Frame, app: &AppState, colors: &Palette, area: Rect) {
    let content_width = area.width.saturating_sub(2) as usize;
    let (title, content) = if let Some(editor) = app.editor.as_ref() {
        let title = match editor.kind() {
            EditorKind::NewAssignment => "New Assignment",
            EditorKind::EditAssignment => "Edit Assignment",
        };
        (title, build_editor_lines(editor, content_width, colors))
    } else {
        ("Details", build_detail_lines(app, content_width, colors))
    };
    let widget = Paragraph::new(content)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(colors.border_detail)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(widget, area);
}

fn build_detail_lines(app: &AppState, width: usize, colors: &Palette) -> Vec<Line<'static>> {
    let Some(assignment) = app.selected_assignment() else {
        return vec![
            Line::from(Span::styled(
                "Nothing selected",
                Style::default().fg(colors.muted),
            )),
            Line::from(""),
            Line::from(Span::styled(
                format!("data: {}", app.data_dir().display()),
                Style::default().fg(colors.muted_dark),
            )),
        ];
    };

    let value_width = width.saturating_sub(LABEL_WIDTH + 1);
    let urgency_color = colors.urgency(assignment, app.now);
    let status = if assignment.is_completed {
        "completed".to_string()
    } else {
        urgency::classify_assignment(assignment, app.now).to_string()
    };

    let mut lines = vec![
        Line::from(Span::styled(
            truncate_text(&assignment.title, width),
            Style::default()
                .fg(colors.text)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        detail_row("ID", assignment.short_id(), colors.muted, colors, value_width),
        detail_row("Subject", &assignment.subject, colors.info, colors, value_width),
        detail_row(
            "Due",
            &format!(
                "{} ({})",
                assignment::format_due(assignment.due_date),
                relative_due(assignment.due_date, app.now)
            ),
            urgency_color,
            colors,
            value_width,
        ),
        detail_row("Status", &status, urgency_color, colors, value_width),
    ];

    lines.push(Line::from(""));
    lines.push(section_header("Reminders", colors));
    if assignment.reminders.is_empty() {
        lines.push(Line::from(Span::styled(
            "none",
            Style::default().fg(colors.muted),
        )));
    }
    for kind in &assignment.reminders {
        let fired = assignment.last_notified.get(*kind);
        let (mark, color) = if fired {
            ("sent", colors.muted_dark)
        } else {
            ("pending", colors.upcoming)
        };
        lines.push(Line::from(vec![
            Span::styled(pad_text(kind.label(), 16), Style::default().fg(colors.text)),
            Span::styled(mark, Style::default().fg(color)),
        ]));
    }

    if let Some(notes) = assignment.notes.as_deref() {
        lines.push(Line::from(""));
        lines.push(section_header("Notes", colors));
        for line in notes.lines() {
            lines.push(Line::from(Span::styled(
                line.to_string(),
                Style::default().fg(colors.text),
            )));
        }
    }
    lines
}

fn detail_row(
    label: &str,
    value: &str,
    color: Color,
    colors: &Palette,
    width: usize,
) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            pad_text(label, LABEL_WIDTH),
            Style::default().fg(colors.muted_dark),
        ),
        Span::raw(" "),
        Span::styled(truncate_text(value, width), Style::default().fg(color)),
    ])
}

fn build_editor_lines(editor: &EditorState, width: usize, colors: &Palette) -> Vec<Line<'static>> {
    if editor.confirming() {
        return build_confirm_lines(editor, width, colors);
    }

    let value_width = width.saturating_sub(LABEL_WIDTH + 1);
    let mut lines: Vec<Line<'static>> = Vec::new();
    for (idx, field) in editor.fields().iter().enumerate() {
        let is_active = idx == editor.active_index();
        let label_style = if is_active {
            Style::default()
                .fg(colors.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(colors.text)
        };
        let mut spans = vec![
            Span::styled(pad_text(field.label, LABEL_WIDTH), label_style),
            Span::raw(" "),
        ];

        if field.id == EditorFieldId::Reminders {
            spans.extend(reminder_toggle_spans(editor, is_active, colors));
            lines.push(Line::from(spans));
            continue;
        }

        if is_active {
            let mut text = truncate_tail(&field.value, value_width.saturating_sub(1));
            text.push('_');
            spans.push(Span::styled(
                text,
                Style::default()
                    .fg(colors.text)
                    .bg(colors.selection_bg),
            ));
        } else if field.value.trim().is_empty() {
            let placeholder = match (field.required, field.id) {
                (_, EditorFieldId::Due) => format!("<{DUE_HINT}>"),
                (true, _) => "<required>".to_string(),
                (false, _) => "(optional)".to_string(),
            };
            spans.push(Span::styled(placeholder, Style::default().fg(colors.muted)));
        } else {
            spans.push(Span::styled(
                truncate_text(&field.value, value_width),
                Style::default().fg(colors.text),
            ));
        }
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("Due is local time as {DUE_HINT}"),
        Style::default().fg(colors.muted_dark),
    )));

    if let Some(error) = editor.error() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            error.to_string(),
            Style::default()
                .fg(colors.overdue)
                .add_modifier(Modifier::BOLD),
        )));
    }
    lines
}

fn reminder_toggle_spans(
    editor: &EditorState,
    is_active: bool,
    colors: &Palette,
) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    for (idx, kind) in ReminderKind::ALL.into_iter().enumerate() {
        if idx > 0 {
            spans.push(Span::raw(" "));
        }
        let checked = editor.reminders().contains(&kind);
        let text = format!("[{}] {}", if checked { "x" } else { " " }, kind.label());
        let mut style = if checked {
            Style::default().fg(colors.upcoming)
        } else {
            Style::default().fg(colors.muted)
        };
        if is_active && idx == editor.reminder_cursor() {
            style = style.bg(colors.selection_bg).add_modifier(Modifier::BOLD);
        }
        spans.push(Span::styled(text, style));
    }
    spans
}

fn build_confirm_lines(editor: &EditorState, width: usize, colors: &Palette) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = vec![
        Line::from(Span::styled(
            "Confirm assignment",
            Style::default()
                .fg(colors.soon)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    let value_width = width.saturating_sub(LABEL_WIDTH + 1);
    match editor.build_draft() {
        Ok(draft) => {
            lines.push(detail_row("Title", &draft.title, colors.text, colors, value_width));
            lines.push(detail_row("Subject", &draft.subject, colors.info, colors, value_width));
            lines.push(detail_row(
                "Due",
                &assignment::format_due(draft.due_date),
                colors.text,
                colors,
                value_width,
            ));
            let reminders = if draft.reminders.is_empty() {
                "none".to_string()
            } else {
                draft
                    .reminders
                    .iter()
                    .map(|kind| kind.label())
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            lines.push(detail_row("Reminders", &reminders, colors.text, colors, value_width));
            if let Some(notes) = draft.notes.as_deref() {
                lines.push(detail_row("Notes", notes, colors.muted, colors, value_width));
            }
            if editor.kind() == EditorKind::EditAssignment {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    "Saving re-arms every reminder.",
                    Style::default().fg(colors.muted_dark),
                )));
            }
        }
        Err(message) => {
            lines.push(Line::from(Span::styled(
                message,
                Style::default().fg(colors.overdue),
            )));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "enter/y save  e back  esc cancel",
        Style::default().fg(colors.muted_dark),
    )));
    lines
}

fn render_footer(frame: &mut Frame, app: &AppState, colors: &Palette, area: Rect) {
    let hint_span = Span::styled(app.footer_hint(), Style::default().fg(colors.info));
    let status_line = match app.status_line() {
        Some((status, kind)) => {
            let style = match kind {
                StatusKind::Error => Style::default()
                    .fg(colors.overdue)
                    .add_modifier(Modifier::BOLD),
                StatusKind::Info => Style::default().fg(colors.soon),
            };
            Line::from(Span::styled(status, style))
        }
        None => Line::from(""),
    };
    let widget = Paragraph::new(vec![Line::from(hint_span), status_line])
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(colors.border_list)),
        );
    frame.render_widget(widget, area);
}

fn render_help_modal(frame: &mut Frame, area: Rect, colors: &Palette) {
    let width = area.width.saturating_sub(8).min(56);
    let lines = build_list_help_lines(width.saturating_sub(2) as usize, colors);
    let modal = centered_rect(width, lines.len() as u16 + 2, area);
    frame.render_widget(Clear, modal);
    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Help")
            .border_style(Style::default().fg(colors.accent)),
    );
    frame.render_widget(widget, modal);
}

fn build_list_help_lines(width: usize, colors: &Palette) -> Vec<Line<'static>> {
    vec![
        help_line("j/k or up/down", "move selection", width, colors),
        help_line("g/G", "first or last row", width, colors),
        help_line("pgup/pgdn", "page up/down", width, colors),
        help_line("a", "add assignment", width, colors),
        help_line("e/enter", "edit assignment", width, colors),
        help_line("space/x", "toggle completed", width, colors),
        help_line("d", "delete assignment", width, colors),
        help_line("1/2/3", "active, completed or all", width, colors),
        help_line("tab", "next filter", width, colors),
        help_line("t", "toggle theme", width, colors),
        help_line("n", "enable notifications", width, colors),
        help_line("r", "reload from disk", width, colors),
        help_line("q/esc", "quit", width, colors),
        help_line("?", "hide help", width, colors),
    ]
}

fn help_line(keys: &str, desc: &str, width: usize, colors: &Palette) -> Line<'static> {
    let key_text = pad_text(keys, HELP_KEY_WIDTH.min(width));
    let desc_text = truncate_text(desc, width.saturating_sub(HELP_KEY_WIDTH + 1));
    Line::from(vec![
        Span::styled(
            key_text,
            Style::default()
                .fg(colors.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(desc_text, Style::default().fg(colors.muted)),
    ])
}

fn render_delete_confirm_modal(
    frame: &mut Frame,
    area: Rect,
    colors: &Palette,
    state: &DeleteConfirmState,
) {
    let content_width = area.width.saturating_sub(8).min(64);
    let modal = centered_rect(content_width, 8, area);
    frame.render_widget(Clear, modal);

    let title_width = (content_width as usize).saturating_sub(10);
    let short_id: String = state.assignment_id.chars().take(8).collect();
    let lines = vec![
        Line::from(Span::styled(
            "Delete assignment?",
            Style::default()
                .fg(colors.overdue)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("ID: ", Style::default().fg(colors.muted_dark)),
            Span::styled(short_id, Style::default().fg(colors.muted)),
        ]),
        Line::from(vec![
            Span::styled("Title: ", Style::default().fg(colors.muted_dark)),
            Span::styled(
                truncate_text(&state.title, title_width),
                Style::default().fg(colors.text),
            ),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "enter/y confirm  esc/n cancel",
            Style::default().fg(colors.muted_dark),
        )),
    ];

    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Delete"))
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, modal);
}

fn section_header(title: &str, colors: &Palette) -> Line<'static> {
    Line::from(Span::styled(
        title.to_string(),
        Style::default()
            .fg(colors.accent)
            .add_modifier(Modifier::BOLD),
    ))
}

/// "in 2d 3h", "in 45m" or "3h ago".
fn relative_due(due: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = due - now;
    let minutes = delta.num_minutes().abs();
    let span = if minutes >= 24 * 60 {
        format!("{}d {}h", minutes / (24 * 60), (minutes / 60) % 24)
    } else if minutes >= 60 {
        format!("{}h {}m", minutes / 60, minutes % 60)
    } else {
        format!("{minutes}m")
    };
    if delta < chrono::Duration::zero() {
        format!("{span} ago")
    } else {
        format!("in {span}")
    }
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width.saturating_sub(2));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn list_window(total: usize, selected: Option<usize>, height: usize) -> (usize, usize) {
    if total == 0 || height == 0 {
        return (0, 0);
    }
    if total <= height {
        return (0, total);
    }
    let selected = selected.unwrap_or(0);
    let mut start = selected.saturating_sub(height / 2);
    if start + height > total {
        start = total - height;
    }
    (start, start + height)
}

fn pad_text(value: &str, width: usize) -> String {
    let text = truncate_text(value, width);
    format!("{text:width$}")
}

fn truncate_text(value: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= max {
        return value.to_string();
    }
    if max <= 3 {
        return chars[..max].iter().collect();
    }
    let mut out: String = chars[..(max - 3)].iter().collect();
    out.push_str("...");
    out
}

// Keep the end of the value visible while typing.
fn truncate_tail(value: &str, max: usize) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= max {
        return value.to_string();
    }
    chars[chars.len() - max..].iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn list_window_centers_selection() {
        assert_eq!(list_window(0, None, 5), (0, 0));
        assert_eq!(list_window(3, Some(2), 5), (0, 3));
        assert_eq!(list_window(20, Some(10), 6), (7, 13));
        assert_eq!(list_window(20, Some(19), 6), (14, 20));
    }

    #[test]
    fn truncation_keeps_width() {
        assert_eq!(truncate_text("Chemistry lab", 8), "Chemi...");
        assert_eq!(truncate_text("Lab", 8), "Lab");
        assert_eq!(truncate_tail("2026-10-19T17:00", 5), "17:00");
        assert_eq!(pad_text("Math", 6), "Math  ");
    }

    #[test]
    fn relative_due_reads_both_directions() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        assert_eq!(relative_due(now + Duration::minutes(45), now), "in 45m");
        assert_eq!(
            relative_due(now + Duration::hours(50), now),
            "in 2d 2h"
        );
        assert_eq!(relative_due(now - Duration::minutes(90), now), "1h 30m ago");
    }
}
