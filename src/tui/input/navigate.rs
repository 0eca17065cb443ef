use crossterm::event::{KeyCode, KeyEvent};

use crate::model::task::TaskId;
use crate::ops::store::StoreError;
use crate::tui::app::{App, InputKind};

/// Handle keys in the task list
pub(super) fn handle_navigate(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,

        // Movement
        KeyCode::Up | KeyCode::Char('k') => app.cursor = app.cursor.saturating_sub(1),
        KeyCode::Down | KeyCode::Char('j') => {
            if app.cursor + 1 < app.snapshot.len() {
                app.cursor += 1;
            }
        }
        KeyCode::Char('g') | KeyCode::Home => app.cursor = 0,
        KeyCode::Char('G') | KeyCode::End => {
            app.cursor = app.snapshot.len().saturating_sub(1);
        }

        // Prompts
        KeyCode::Char('a') => app.begin_input(InputKind::Add, ""),
        KeyCode::Char('e') => {
            if let Some(task) = app.selected_task() {
                app.begin_input(InputKind::Edit(task.id), &task.description);
            }
        }
        KeyCode::Char('u') => {
            if let Some(task) = app.selected_task() {
                let due = task.due_date.clone().unwrap_or_default();
                app.begin_input(InputKind::Due(task.id), &due);
            }
        }
        KeyCode::Char('t') => {
            if let Some(task) = app.selected_task() {
                app.begin_input(InputKind::Tags(task.id), &task.tag_list().join(","));
            }
        }
        KeyCode::Char('/') => {
            let current = app.settings.search.clone();
            app.begin_input(InputKind::Search, &current);
        }

        // Direct edits on the selected task
        KeyCode::Char('c') => {
            with_selected(app, |app, id| {
                let task = app.store.toggle_complete(id)?;
                app.set_status(if task.completed {
                    "Task completed!"
                } else {
                    "Task marked incomplete"
                });
                Ok(())
            });
        }
        KeyCode::Char('d') => {
            with_selected(app, |app, id| {
                app.store.delete(id)?;
                app.set_status("Task deleted!");
                Ok(())
            });
        }
        KeyCode::Char('p') => {
            with_selected(app, |app, id| {
                let task = app.store.cycle_priority(id)?;
                let level = task.priority.map_or("none", |p| p.as_str());
                app.set_status(format!("Priority set to: {}", level));
                Ok(())
            });
        }

        // View settings
        KeyCode::Char('f') => {
            app.settings.filter = app.settings.filter.next();
            app.refresh_view();
            app.set_status(format!("Filter: {}", app.settings.filter));
        }
        KeyCode::Char('s') => {
            app.settings.sort = app.settings.sort.next();
            app.refresh_view();
            app.set_status(format!("Sort: {}", app.settings.sort));
        }

        // Overlays
        KeyCode::Char('h') | KeyCode::Char('?') => app.show_help = true,
        KeyCode::Char('R') => app.open_recovery_log(),

        _ => {}
    }
}

/// Resolve the selected row and run `op` on its task, then re-derive the
/// view. Nothing happens on an empty view.
fn with_selected(app: &mut App, op: impl FnOnce(&mut App, TaskId) -> Result<(), StoreError>) {
    let id = match app.selected_id() {
        Ok(Some(id)) => id,
        Ok(None) => return,
        Err(e) => {
            app.report_error(&e);
            return;
        }
    };
    let result = op(app, id);
    app.refresh_view();
    if let Err(e) = result {
        app.report_error(&e);
    }
}
