use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::tui::app::{App, Mode};
use crate::util::unicode::{cursor_col, display_width};

/// Bordered single-line input box, labelled for the active prompt.
/// Long input scrolls horizontally so the cursor stays visible.
pub fn render_prompt(frame: &mut Frame, app: &App, area: Rect) {
    let Mode::Input(kind) = app.mode else {
        return;
    };
    let bg = app.theme.background;
    let block = Block::default()
        .title(Span::styled(
            kind.label(),
            Style::default()
                .fg(app.theme.text_bright)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.highlight).bg(bg))
        .style(Style::default().bg(bg));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let text = &app.input.text;
    let col = cursor_col(text, app.input.cursor);
    let room = inner.width as usize - 1;
    let skip = col.saturating_sub(room);

    let paragraph = Paragraph::new(Line::from(Span::styled(
        text.as_str(),
        Style::default().fg(app.theme.text_bright).bg(bg),
    )))
    .scroll((0, skip as u16));
    frame.render_widget(paragraph, inner);

    let x = inner.x + (col - skip).min(display_width(text)) as u16;
    frame.set_cursor_position(Position::new(x, inner.y));
}
