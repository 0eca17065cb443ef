use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::app::{App, InputKind, LineInput, Mode};

/// Handle keys while a text prompt is open
pub(super) fn handle_prompt(app: &mut App, kind: InputKind, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match (key.code, ctrl) {
        (KeyCode::Esc, _) => close_prompt(app),
        (KeyCode::Enter, _) => {
            let text = std::mem::take(&mut app.input.text);
            close_prompt(app);
            submit(app, kind, &text);
        }

        (KeyCode::Left, _) => app.input.left(),
        (KeyCode::Right, _) => app.input.right(),
        (KeyCode::Home, _) | (KeyCode::Char('a'), true) => app.input.home(),
        (KeyCode::End, _) | (KeyCode::Char('e'), true) => app.input.end(),
        (KeyCode::Backspace, _) => app.input.backspace(),
        (KeyCode::Delete, _) => app.input.delete(),
        (KeyCode::Char('w'), true) => app.input.delete_word(),
        (KeyCode::Char('u'), true) => app.input.clear_to_start(),

        (KeyCode::Char(c), false)
            if key.modifiers.difference(KeyModifiers::SHIFT).is_empty() =>
        {
            app.input.insert(c)
        }
        _ => {}
    }
}

fn close_prompt(app: &mut App) {
    app.mode = Mode::Navigate;
    app.input = LineInput::default();
}

/// Apply a submitted prompt. Id-targeted prompts use the id captured when
/// they opened.
fn submit(app: &mut App, kind: InputKind, text: &str) {
    match kind {
        InputKind::Add => match app.store.add(text) {
            Ok(Some(task)) => {
                app.refresh_view();
                app.select_id(task.id);
                app.set_status("Task added!");
            }
            Ok(None) => {}
            Err(e) => app.report_error(&e),
        },
        InputKind::Edit(id) => {
            if text.trim().is_empty() {
                return;
            }
            match app.store.edit_description(id, text) {
                Ok(_) => app.set_status("Task updated!"),
                Err(e) => app.report_error(&e),
            }
            app.refresh_view();
        }
        InputKind::Due(id) => {
            match app.store.set_due_date(id, text) {
                Ok(task) if task.due_date.is_some() => app.set_status("Due date updated!"),
                Ok(_) => app.set_status("Due date cleared!"),
                Err(e) if e.rejection().is_some() => {
                    app.set_error("Invalid date format! Use YYYY-MM-DD")
                }
                Err(e) => app.report_error(&e),
            }
            app.refresh_view();
        }
        InputKind::Tags(id) => {
            match app.store.set_tags(id, text) {
                Ok(_) => app.set_status("Tags updated!"),
                Err(e) => app.report_error(&e),
            }
            app.refresh_view();
        }
        InputKind::Search => {
            app.settings.search = text.trim().to_string();
            app.cursor = 0;
            app.scroll_offset = 0;
            app.refresh_view();
        }
    }
}
