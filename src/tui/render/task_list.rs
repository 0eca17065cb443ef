use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::model::task::Task;
use crate::tui::app::App;
use crate::util::unicode::{display_width, truncate_to_width};

use super::push_highlighted_spans;

/// Render the bordered task list. Rows come from the current snapshot, so
/// what is drawn is exactly what row-targeted commands resolve against.
pub fn render_task_list(frame: &mut Frame, app: &mut App, area: Rect) {
    let bg = app.theme.background;
    let block = Block::default()
        .title(Span::styled(
            " Tasks ",
            Style::default()
                .fg(app.theme.text_bright)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border).bg(bg))
        .style(Style::default().bg(bg));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if app.snapshot.is_empty() {
        let msg = if app.store.tasks().is_empty() {
            "No tasks yet. Press \"a\" to add one."
        } else {
            "No tasks match the current filter."
        };
        let empty = Paragraph::new(Line::from(Span::styled(
            msg,
            Style::default().fg(app.theme.dim).bg(bg),
        )));
        frame.render_widget(empty, inner);
        return;
    }

    let visible = inner.height as usize;
    clamp_scroll(app, visible);

    let search_re = app.search_re();
    let width = inner.width as usize;
    let mut lines: Vec<Line> = Vec::with_capacity(visible);
    for (row, entry) in app
        .snapshot
        .entries
        .iter()
        .enumerate()
        .skip(app.scroll_offset)
        .take(visible)
    {
        // The snapshot was derived from the store, so its index is in range
        let Some(task) = app.store.tasks().get(entry.index) else {
            continue;
        };
        let row_bg = if row == app.cursor {
            app.theme.selection_bg
        } else {
            bg
        };
        lines.push(task_line(app, task, width, row_bg, search_re.as_ref()));
    }

    let paragraph = Paragraph::new(lines).style(Style::default().bg(bg));
    frame.render_widget(paragraph, inner);
}

/// Keep the cursor inside the visible window.
fn clamp_scroll(app: &mut App, visible: usize) {
    if visible == 0 {
        return;
    }
    if app.cursor < app.scroll_offset {
        app.scroll_offset = app.cursor;
    } else if app.cursor >= app.scroll_offset + visible {
        app.scroll_offset = app.cursor + 1 - visible;
    }
    let max_offset = app.snapshot.len().saturating_sub(visible);
    app.scroll_offset = app.scroll_offset.min(max_offset);
}

fn task_line<'a>(
    app: &App,
    task: &Task,
    width: usize,
    row_bg: ratatui::style::Color,
    search_re: Option<&regex::Regex>,
) -> Line<'a> {
    let theme = &app.theme;
    let (checkbox, check_color) = if task.completed {
        ("[✓] ", theme.green)
    } else {
        ("[ ] ", theme.dim)
    };
    let text_style = if task.completed {
        Style::default().fg(theme.dim).bg(row_bg)
    } else {
        Style::default().fg(theme.text).bg(row_bg)
    };
    let match_style = Style::default()
        .fg(theme.search_match_fg)
        .bg(theme.search_match_bg);

    // Suffix pieces, each with its own style
    let mut suffix: Vec<(String, Style)> = Vec::new();
    if let Some(p) = task.priority {
        suffix.push((
            format!(" {}", p.marker()),
            Style::default().fg(theme.priority_color(p)).bg(row_bg),
        ));
    }
    if let Some(due) = &task.due_date {
        suffix.push((
            format!(" (due: {})", due),
            Style::default().fg(theme.cyan).bg(row_bg),
        ));
    }
    for tag in task.tag_list() {
        suffix.push((
            format!(" #{}", tag),
            Style::default().fg(theme.purple).bg(row_bg),
        ));
    }
    let suffix_w: usize = suffix.iter().map(|(s, _)| display_width(s)).sum();

    let desc_room = width.saturating_sub(display_width(checkbox) + suffix_w);
    let description = truncate_to_width(&task.description, desc_room.max(1));

    let mut spans = vec![Span::styled(
        checkbox,
        Style::default().fg(check_color).bg(row_bg),
    )];
    push_highlighted_spans(&mut spans, &description, text_style, match_style, search_re);
    spans.extend(suffix.into_iter().map(|(s, style)| Span::styled(s, style)));

    // Fill the rest of the row so the selection background spans the width
    let used: usize = spans.iter().map(|s| display_width(&s.content)).sum();
    if used < width {
        spans.push(Span::styled(
            " ".repeat(width - used),
            Style::default().bg(row_bg),
        ));
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::*;
    use insta::assert_snapshot;

    fn render_list(app: &mut App, w: u16, h: u16) -> String {
        render_to_string(w, h, |frame, area| render_task_list(frame, app, area))
    }

    #[test]
    fn rows_show_markers() {
        let mut app = app_with_tasks(&["buy milk", "call mom"]);
        let first = app.store.tasks()[0].id;
        let second = app.store.tasks()[1].id;
        app.store.toggle_complete(first).unwrap();
        app.store.set_due_date(second, "2024-06-01").unwrap();
        app.store.set_tags(second, "family, phone").unwrap();
        app.refresh_view();

        let output = render_list(&mut app, 60, 5);
        assert_snapshot!(output, @r"
        ┌ Tasks ───────────────────────────────────────────────────┐
        │[✓] buy milk (MED)                                        │
        │[ ] call mom (MED) (due: 2024-06-01) #family #phone       │
        │                                                          │
        └──────────────────────────────────────────────────────────┘
        ");
    }

    #[test]
    fn long_description_is_truncated() {
        let mut app = app_with_tasks(&["a very long description that will not fit"]);
        let output = render_list(&mut app, 30, 3);
        let row = output.lines().nth(1).unwrap();
        assert!(row.contains("…"));
        assert!(row.ends_with("(MED)│"));
        assert_eq!(display_width(row), 30);
    }

    #[test]
    fn empty_messages() {
        let mut app = app_with_tasks(&[]);
        assert!(render_list(&mut app, 60, 4).contains("No tasks yet"));

        let mut app = app_with_tasks(&["a"]);
        app.settings.search = "zzz".into();
        app.refresh_view();
        assert!(render_list(&mut app, 60, 4).contains("No tasks match"));
    }

    #[test]
    fn scroll_follows_cursor() {
        let names: Vec<String> = (0..10).map(|i| format!("task {i}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut app = app_with_tasks(&refs);
        app.cursor = 7;
        let output = render_list(&mut app, 40, 5);
        assert_eq!(app.scroll_offset, 5);
        assert!(output.contains("task 7"));
        assert!(!output.contains("task 4"));

        app.cursor = 1;
        render_list(&mut app, 40, 5);
        assert_eq!(app.scroll_offset, 1);
    }
}
