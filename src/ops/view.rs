//! Derived view over the canonical task collection.
//!
//! The deriver is a pure function of (tasks, settings). Filtering and search
//! run first, then a stable sort, and every row keeps the canonical index of
//! its task so that commands on a view row can be routed back to the store.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::task::{Priority, Task, TaskId};

/// Which tasks are shown
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum FilterMode {
    #[default]
    All,
    Completed,
    Uncompleted,
}

impl FilterMode {
    /// all → completed → uncompleted → all
    pub fn next(self) -> Self {
        match self {
            FilterMode::All => FilterMode::Completed,
            FilterMode::Completed => FilterMode::Uncompleted,
            FilterMode::Uncompleted => FilterMode::All,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FilterMode::All => "all",
            FilterMode::Completed => "completed",
            FilterMode::Uncompleted => "uncompleted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "all" => Some(FilterMode::All),
            "completed" => Some(FilterMode::Completed),
            "uncompleted" => Some(FilterMode::Uncompleted),
            _ => None,
        }
    }

    fn admits(self, task: &Task) -> bool {
        match self {
            FilterMode::All => true,
            FilterMode::Completed => task.completed,
            FilterMode::Uncompleted => !task.completed,
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How shown tasks are ordered
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum SortMode {
    /// Canonical insertion order
    #[default]
    Default,
    Priority,
    DueDate,
    Created,
}

impl SortMode {
    /// default → priority → due-date → created → default
    pub fn next(self) -> Self {
        match self {
            SortMode::Default => SortMode::Priority,
            SortMode::Priority => SortMode::DueDate,
            SortMode::DueDate => SortMode::Created,
            SortMode::Created => SortMode::Default,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortMode::Default => "default",
            SortMode::Priority => "priority",
            SortMode::DueDate => "due-date",
            SortMode::Created => "created",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "default" => Some(SortMode::Default),
            "priority" => Some(SortMode::Priority),
            "due-date" => Some(SortMode::DueDate),
            "created" => Some(SortMode::Created),
            _ => None,
        }
    }

    fn compare(self, a: &Task, b: &Task) -> Ordering {
        match self {
            SortMode::Default => Ordering::Equal,
            SortMode::Priority => Priority::rank(a.priority).cmp(&Priority::rank(b.priority)),
            // YYYY-MM-DD compares chronologically as text; missing dates go last
            SortMode::DueDate => match (&a.due_date, &b.due_date) {
                (Some(x), Some(y)) => x.cmp(y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            SortMode::Created => a.created_at.cmp(&b.created_at),
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filter, sort and search settings. Owned by the caller, never by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewSettings {
    pub filter: FilterMode,
    pub sort: SortMode,
    pub search: String,
}

/// One displayed task and its position in the canonical collection
#[derive(Debug, Clone, Copy)]
pub struct ViewRow<'a> {
    pub task: &'a Task,
    pub index: usize,
}

/// Derive the displayed rows from the canonical collection.
pub fn derive<'a>(tasks: &'a [Task], settings: &ViewSettings) -> Vec<ViewRow<'a>> {
    let needle = settings.search.to_lowercase();
    let mut rows: Vec<ViewRow<'a>> = tasks
        .iter()
        .enumerate()
        .filter(|(_, task)| settings.filter.admits(task) && task.matches_search(&needle))
        .map(|(index, task)| ViewRow { task, index })
        .collect();

    if settings.sort != SortMode::Default {
        // sort_by is stable: ties keep canonical order
        rows.sort_by(|a, b| settings.sort.compare(a.task, b.task));
    }
    rows
}

/// A derived view borrowed from a store at a specific revision.
///
/// While this borrow is alive the store cannot be mutated, so its rows are
/// always consistent. Use [`DerivedView::snapshot`] to keep the mapping
/// across mutations; snapshots are checked against the store revision.
#[derive(Debug)]
pub struct DerivedView<'a> {
    pub rows: Vec<ViewRow<'a>>,
    pub revision: u64,
}

impl<'a> DerivedView<'a> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, row: usize) -> Option<&ViewRow<'a>> {
        self.rows.get(row)
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            entries: self
                .rows
                .iter()
                .map(|r| ViewEntry {
                    id: r.task.id,
                    index: r.index,
                })
                .collect(),
            revision: self.revision,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewEntry {
    pub id: TaskId,
    pub index: usize,
}

/// Owned row-to-task mapping, valid only at the revision it was taken.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewSnapshot {
    pub entries: Vec<ViewEntry>,
    pub revision: u64,
}

impl ViewSnapshot {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
