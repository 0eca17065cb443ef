use std::fmt;

use chrono::{DateTime, Utc};

use crate::model::task::{Priority, Task, TaskId, is_due_date, normalize_description, parse_tags};

/// Why an edit was refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    EmptyDescription,
    InvalidDueDate(String),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::EmptyDescription => write!(f, "description cannot be empty"),
            Rejection::InvalidDueDate(text) => {
                write!(f, "invalid date format {:?}, use YYYY-MM-DD", text)
            }
        }
    }
}

/// Error type for task operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    #[error("task not found: {0}")]
    NotFound(TaskId),
    #[error("{0}")]
    Rejected(Rejection),
}

// ---------------------------------------------------------------------------
// Lookup and ids
// ---------------------------------------------------------------------------

/// Canonical position of the task with `id`
pub fn find_index(tasks: &[Task], id: TaskId) -> Result<usize, TaskError> {
    tasks
        .iter()
        .position(|t| t.id == id)
        .ok_or(TaskError::NotFound(id))
}

fn find_mut(tasks: &mut [Task], id: TaskId) -> Result<&mut Task, TaskError> {
    let idx = find_index(tasks, id)?;
    Ok(&mut tasks[idx])
}

/// Next id: the creation time in epoch milliseconds, bumped past the
/// largest existing id when the clock would collide or has gone backwards.
pub fn next_id(tasks: &[Task], now: DateTime<Utc>) -> TaskId {
    let stamp = u64::try_from(now.timestamp_millis()).unwrap_or(0);
    let after_max = tasks.iter().map(|t| t.id).max().map_or(0, |m| m + 1);
    stamp.max(after_max)
}

// ---------------------------------------------------------------------------
// Create / delete
// ---------------------------------------------------------------------------

/// Append a new task. Returns None (and changes nothing) for blank input.
pub fn add_task(tasks: &mut Vec<Task>, description: &str, now: DateTime<Utc>) -> Option<Task> {
    let description = normalize_description(description)?;
    let task = Task::new(next_id(tasks, now), description, now);
    tasks.push(task.clone());
    Some(task)
}

/// Remove a task entirely, returning it.
pub fn delete_task(tasks: &mut Vec<Task>, id: TaskId) -> Result<Task, TaskError> {
    let idx = find_index(tasks, id)?;
    Ok(tasks.remove(idx))
}

// ---------------------------------------------------------------------------
// Field edits
// ---------------------------------------------------------------------------

pub fn toggle_complete(tasks: &mut [Task], id: TaskId) -> Result<Task, TaskError> {
    let task = find_mut(tasks, id)?;
    task.completed = !task.completed;
    Ok(task.clone())
}

/// Replace the description; blank text is rejected.
pub fn edit_description(tasks: &mut [Task], id: TaskId, text: &str) -> Result<Task, TaskError> {
    let task = find_mut(tasks, id)?;
    let description =
        normalize_description(text).ok_or(TaskError::Rejected(Rejection::EmptyDescription))?;
    task.description = description;
    Ok(task.clone())
}

/// Advance the priority: low → medium → high → low (unset counts as high).
pub fn cycle_priority(tasks: &mut [Task], id: TaskId) -> Result<Task, TaskError> {
    let task = find_mut(tasks, id)?;
    task.priority = Some(Priority::cycle(task.priority));
    Ok(task.clone())
}

/// Set or clear the due date. Blank input clears it; anything else must
/// have the `YYYY-MM-DD` shape.
pub fn set_due_date(tasks: &mut [Task], id: TaskId, text: &str) -> Result<Task, TaskError> {
    let task = find_mut(tasks, id)?;
    let text = text.trim();
    if text.is_empty() {
        task.due_date = None;
    } else if is_due_date(text) {
        task.due_date = Some(text.to_string());
    } else {
        return Err(TaskError::Rejected(Rejection::InvalidDueDate(text.to_string())));
    }
    Ok(task.clone())
}

/// Replace the tag list from comma-separated input.
pub fn set_tags(tasks: &mut [Task], id: TaskId, text: &str) -> Result<Task, TaskError> {
    let task = find_mut(tasks, id)?;
    task.tags = Some(parse_tags(text));
    Ok(task.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn sample() -> Vec<Task> {
        let mut tasks = Vec::new();
        add_task(&mut tasks, "first", at(0)).unwrap();
        add_task(&mut tasks, "second", at(1)).unwrap();
        add_task(&mut tasks, "third", at(2)).unwrap();
        tasks
    }

    #[test]
    fn add_trims_and_appends() {
        let mut tasks = sample();
        let task = add_task(&mut tasks, "  fourth  ", at(3)).unwrap();
        assert_eq!(task.description, "fourth");
        assert_eq!(tasks.last().unwrap(), &task);
        assert_eq!(task.created_at, at(3));
        assert_eq!(task.priority, Some(Priority::Medium));
    }

    #[test]
    fn add_blank_is_noop() {
        let mut tasks = sample();
        assert!(add_task(&mut tasks, "   ", at(3)).is_none());
        assert!(add_task(&mut tasks, "", at(3)).is_none());
        assert_eq!(tasks.len(), 3);
    }

    #[test]
    fn ids_are_timestamps_when_free() {
        let tasks = Vec::new();
        assert_eq!(next_id(&tasks, at(0)), 1_700_000_000_000);
    }

    #[test]
    fn ids_never_collide() {
        let mut tasks = Vec::new();
        let a = add_task(&mut tasks, "a", at(0)).unwrap();
        let b = add_task(&mut tasks, "b", at(0)).unwrap();
        let c = add_task(&mut tasks, "c", at(-60)).unwrap();
        assert_eq!(b.id, a.id + 1);
        assert_eq!(c.id, b.id + 1);
    }

    #[test]
    fn toggle_flips_completed() {
        let mut tasks = sample();
        let id = tasks[1].id;
        assert!(toggle_complete(&mut tasks, id).unwrap().completed);
        assert!(!toggle_complete(&mut tasks, id).unwrap().completed);
    }

    #[test]
    fn delete_removes_and_keeps_order() {
        let mut tasks = sample();
        let id = tasks[1].id;
        let removed = delete_task(&mut tasks, id).unwrap();
        assert_eq!(removed.description, "second");
        let names: Vec<&str> = tasks.iter().map(|t| t.description.as_str()).collect();
        assert_eq!(names, vec!["first", "third"]);
    }

    #[test]
    fn missing_id_is_not_found() {
        let mut tasks = sample();
        assert_eq!(toggle_complete(&mut tasks, 42), Err(TaskError::NotFound(42)));
        assert_eq!(delete_task(&mut tasks, 42), Err(TaskError::NotFound(42)));
        assert_eq!(set_tags(&mut tasks, 42, "a"), Err(TaskError::NotFound(42)));
    }

    #[test]
    fn edit_rejects_blank() {
        let mut tasks = sample();
        let id = tasks[0].id;
        assert_eq!(
            edit_description(&mut tasks, id, "  "),
            Err(TaskError::Rejected(Rejection::EmptyDescription))
        );
        assert_eq!(tasks[0].description, "first");
        let task = edit_description(&mut tasks, id, " renamed ").unwrap();
        assert_eq!(task.description, "renamed");
    }

    #[test]
    fn priority_cycle_closes_after_three() {
        let mut tasks = sample();
        let id = tasks[0].id;
        tasks[0].priority = None;
        let first = cycle_priority(&mut tasks, id).unwrap().priority;
        assert_eq!(first, Some(Priority::Low));
        cycle_priority(&mut tasks, id).unwrap();
        cycle_priority(&mut tasks, id).unwrap();
        let fourth = cycle_priority(&mut tasks, id).unwrap().priority;
        assert_eq!(fourth, first);
    }

    #[test]
    fn due_date_set_clear_reject() {
        let mut tasks = sample();
        let id = tasks[0].id;

        let task = set_due_date(&mut tasks, id, " 2024-13-99 ").unwrap();
        assert_eq!(task.due_date.as_deref(), Some("2024-13-99"));

        let err = set_due_date(&mut tasks, id, "tomorrow").unwrap_err();
        assert_eq!(
            err,
            TaskError::Rejected(Rejection::InvalidDueDate("tomorrow".into()))
        );
        assert_eq!(tasks[0].due_date.as_deref(), Some("2024-13-99"));

        let task = set_due_date(&mut tasks, id, "").unwrap();
        assert!(task.due_date.is_none());
    }

    #[test]
    fn tags_replace_wholesale() {
        let mut tasks = sample();
        let id = tasks[2].id;
        set_tags(&mut tasks, id, "a, b").unwrap();
        let task = set_tags(&mut tasks, id, "c").unwrap();
        assert_eq!(task.tags, Some(vec!["c".to_string()]));
        let task = set_tags(&mut tasks, id, "").unwrap();
        assert_eq!(task.tags, Some(Vec::new()));
    }

    #[test]
    fn rejection_messages() {
        assert_eq!(
            Rejection::InvalidDueDate("x".into()).to_string(),
            "invalid date format \"x\", use YYYY-MM-DD"
        );
        assert_eq!(
            TaskError::Rejected(Rejection::EmptyDescription).to_string(),
            "description cannot be empty"
        );
    }
}
