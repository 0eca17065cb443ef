use crossterm::event::{KeyCode, KeyEvent};

use crate::tui::app::App;

/// Any key closes the help overlay
pub(super) fn handle_help_overlay(app: &mut App, _key: KeyEvent) {
    app.show_help = false;
}

const PAGE: usize = 10;

/// Scroll or close the recovery log overlay
pub(super) fn handle_recovery_overlay(app: &mut App, key: KeyEvent) {
    let max = app.recovery_log_lines.len().saturating_sub(1);
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('R') => {
            app.show_recovery_log = false;
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.recovery_log_scroll = (app.recovery_log_scroll + 1).min(max);
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.recovery_log_scroll = app.recovery_log_scroll.saturating_sub(1);
        }
        KeyCode::PageDown => {
            app.recovery_log_scroll = (app.recovery_log_scroll + PAGE).min(max);
        }
        KeyCode::PageUp => {
            app.recovery_log_scroll = app.recovery_log_scroll.saturating_sub(PAGE);
        }
        KeyCode::Char('g') | KeyCode::Home => app.recovery_log_scroll = 0,
        KeyCode::Char('G') | KeyCode::End => app.recovery_log_scroll = max,
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::app_with_tasks;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn recovery_scroll_is_clamped() {
        let mut app = app_with_tasks(&[]);
        app.show_recovery_log = true;
        app.recovery_log_lines = (0..15).map(|i| format!("line {i}")).collect();

        handle_recovery_overlay(&mut app, key(KeyCode::PageDown));
        handle_recovery_overlay(&mut app, key(KeyCode::PageDown));
        assert_eq!(app.recovery_log_scroll, 14);
        handle_recovery_overlay(&mut app, key(KeyCode::Char('k')));
        assert_eq!(app.recovery_log_scroll, 13);
        handle_recovery_overlay(&mut app, key(KeyCode::Char('g')));
        assert_eq!(app.recovery_log_scroll, 0);
        handle_recovery_overlay(&mut app, key(KeyCode::Up));
        assert_eq!(app.recovery_log_scroll, 0);

        handle_recovery_overlay(&mut app, key(KeyCode::Esc));
        assert!(!app.show_recovery_log);
    }
}
