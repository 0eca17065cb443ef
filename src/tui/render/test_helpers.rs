use chrono::{TimeZone, Utc};
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;

use crate::io::store_io::{MemoryGateway, TaskGateway};
use crate::model::AppConfig;
use crate::model::task::Task;
use crate::ops::store::TaskStore;
use crate::tui::app::App;

pub const TERM_W: u16 = 80;
pub const TERM_H: u16 = 24;

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

/// An app over an in-memory store holding one task per description, with
/// ids 1..=n. Later ids come from a fixed clock well past the seeded ones.
pub fn app_with_tasks(descriptions: &[&str]) -> App {
    let base = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    let tasks: Vec<Task> = descriptions
        .iter()
        .enumerate()
        .map(|(i, d)| {
            let created = base + chrono::Duration::seconds(i as i64);
            Task::new(i as u64 + 1, d.to_string(), created)
        })
        .collect();
    let gateway = MemoryGateway::with_tasks(&tasks).unwrap();
    let store = TaskStore::open(Box::new(gateway) as Box<dyn TaskGateway>)
        .unwrap()
        .with_clock(move || base + chrono::Duration::hours(1));
    App::new(store, &AppConfig::default())
}
