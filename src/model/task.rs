use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Task identifier. Assigned once at creation and never reused.
pub type TaskId = u64;

/// `YYYY-MM-DD` shape only; calendar validity is not checked.
static DUE_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid due date pattern"));

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Sort rank: high first, unset last.
    pub fn rank(priority: Option<Priority>) -> u8 {
        match priority {
            Some(Priority::High) => 0,
            Some(Priority::Medium) => 1,
            Some(Priority::Low) => 2,
            None => 3,
        }
    }

    /// Next priority in the cycle low → medium → high → low.
    /// Unset behaves like high, so the first press yields low.
    pub fn cycle(priority: Option<Priority>) -> Priority {
        match priority {
            None | Some(Priority::High) => Priority::Low,
            Some(Priority::Low) => Priority::Medium,
            Some(Priority::Medium) => Priority::High,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    /// Short marker shown next to the description
    pub fn marker(self) -> &'static str {
        match self {
            Priority::High => "(HIGH)",
            Priority::Medium => "(MED)",
            Priority::Low => "(LOW)",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single tracked task, in the shape it is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl Task {
    /// Create a fresh, incomplete task with the default priority.
    /// `description` is expected to be trimmed and non-empty already.
    pub fn new(id: TaskId, description: String, created_at: DateTime<Utc>) -> Self {
        Task {
            id,
            description,
            completed: false,
            created_at,
            priority: Some(Priority::Medium),
            due_date: None,
            tags: None,
        }
    }

    /// Tags as a slice; absent and empty read the same.
    pub fn tag_list(&self) -> &[String] {
        self.tags.as_deref().unwrap_or(&[])
    }

    /// Case-insensitive substring match on the description.
    /// An empty needle matches everything.
    pub fn matches_search(&self, needle_lower: &str) -> bool {
        needle_lower.is_empty() || self.description.to_lowercase().contains(needle_lower)
    }
}

/// Trim a description, returning None when nothing is left.
pub fn normalize_description(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Whether `text` has the `YYYY-MM-DD` shape
pub fn is_due_date(text: &str) -> bool {
    DUE_DATE_RE.is_match(text)
}

/// Split comma-separated tag input, trimming each tag and dropping empties.
pub fn parse_tags(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
