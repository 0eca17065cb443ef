use serde::Serialize;

use crate::model::task::{Priority, Task, TaskId};
use crate::ops::store::Summary;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson {
    pub id: TaskId,
    pub description: String,
    pub completed: bool,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    pub tags: Vec<String>,
}

/// A task as it appears in `list`, with its view row and canonical position
#[derive(Serialize)]
pub struct RowJson {
    pub row: usize,
    pub index: usize,
    #[serde(flatten)]
    pub task: TaskJson,
}

#[derive(Serialize)]
pub struct StatsJson {
    pub total: usize,
    pub completed: usize,
    pub uncompleted: usize,
}

#[derive(Serialize)]
pub struct TagCountJson {
    pub tag: String,
    pub count: usize,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn task_to_json(task: &Task) -> TaskJson {
    TaskJson {
        id: task.id,
        description: task.description.clone(),
        completed: task.completed,
        created_at: task.created_at.to_rfc3339(),
        priority: task.priority,
        due_date: task.due_date.clone(),
        tags: task.tag_list().to_vec(),
    }
}

pub fn stats_to_json(summary: Summary) -> StatsJson {
    StatsJson {
        total: summary.total,
        completed: summary.completed,
        uncompleted: summary.total - summary.completed,
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// `[✓] ` or `[ ] `
pub fn checkbox(task: &Task) -> &'static str {
    if task.completed { "[✓] " } else { "[ ] " }
}

/// Everything after the description: priority marker, due date, tags
pub fn task_suffix(task: &Task) -> String {
    let mut out = String::new();
    if let Some(p) = task.priority {
        out.push(' ');
        out.push_str(p.marker());
    }
    if let Some(due) = &task.due_date {
        out.push_str(&format!(" (due: {})", due));
    }
    for tag in task.tag_list() {
        out.push_str(&format!(" #{}", tag));
    }
    out
}

/// Format a single task as a one-line summary
pub fn format_task_line(task: &Task) -> String {
    format!("{}{}{}", checkbox(task), task.description, task_suffix(task))
}

/// Format detailed task view
pub fn format_task_detail(task: &Task) -> Vec<String> {
    let mut lines = vec![
        format_task_line(task),
        format!("  id: {}", task.id),
        format!("  created: {}", task.created_at.format("%Y-%m-%d %H:%M UTC")),
        format!(
            "  priority: {}",
            task.priority.map_or("none", Priority::as_str)
        ),
    ];
    if let Some(due) = &task.due_date {
        lines.push(format!("  due: {}", due));
    }
    if !task.tag_list().is_empty() {
        lines.push(format!("  tags: {}", task.tag_list().join(", ")));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sample() -> Task {
        let ts = Utc.with_ymd_and_hms(2024, 3, 9, 14, 30, 0).unwrap();
        let mut task = Task::new(7, "file taxes".into(), ts);
        task.priority = Some(Priority::High);
        task.due_date = Some("2024-04-15".into());
        task.tags = Some(vec!["money".into(), "home".into()]);
        task
    }

    #[test]
    fn line_shows_all_metadata() {
        assert_eq!(
            format_task_line(&sample()),
            "[ ] file taxes (HIGH) (due: 2024-04-15) #money #home"
        );
    }

    #[test]
    fn line_for_bare_completed_task() {
        let mut task = sample();
        task.completed = true;
        task.priority = None;
        task.due_date = None;
        task.tags = Some(Vec::new());
        assert_eq!(format_task_line(&task), "[✓] file taxes");
    }

    #[test]
    fn detail_lines() {
        insta::assert_snapshot!(format_task_detail(&sample()).join("\n"), @r"
        [ ] file taxes (HIGH) (due: 2024-04-15) #money #home
          id: 7
          created: 2024-03-09 14:30 UTC
          priority: high
          due: 2024-04-15
          tags: money, home
        ");
    }

    #[test]
    fn json_always_lists_tags() {
        let mut task = sample();
        task.tags = None;
        task.priority = None;
        let value = serde_json::to_value(task_to_json(&task)).unwrap();
        assert_eq!(value["tags"], serde_json::json!([]));
        assert!(value.get("priority").is_none());
        assert_eq!(value["created_at"], "2024-03-09T14:30:00+00:00");
    }
}
