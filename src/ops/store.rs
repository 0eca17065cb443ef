//! The task store: owner of the canonical collection.
//!
//! Every mutation runs against a copy of the collection, is persisted through
//! the gateway, and only then replaces the in-memory state. A rejected edit
//! or a failed write therefore leaves memory and disk exactly as they were.
//! Each committed mutation bumps the store revision, which is how views
//! taken earlier are recognized as stale.

use chrono::{DateTime, Utc};

use crate::io::store_io::{StoreIoError, TaskGateway};
use crate::model::task::{Task, TaskId};
use crate::ops::task_ops::{self, Rejection, TaskError};
use crate::ops::view::{self, DerivedView, ViewSettings, ViewSnapshot};

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error("view is stale: taken at revision {view}, store is at revision {store}")]
    StaleView { view: u64, store: u64 },
    #[error("no row {row} in view of {len} rows")]
    NoSuchRow { row: usize, len: usize },
    #[error(transparent)]
    Io(#[from] StoreIoError),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::Task(TaskError::NotFound(_)))
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            StoreError::Task(TaskError::Rejected(r)) => Some(r),
            _ => None,
        }
    }

    pub fn is_corrupt_store(&self) -> bool {
        matches!(self, StoreError::Io(e) if e.is_corrupt())
    }
}

/// Task and completion counts for the status bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    pub total: usize,
    pub completed: usize,
}

type Clock = Box<dyn Fn() -> DateTime<Utc>>;

pub struct TaskStore<G: TaskGateway> {
    gateway: G,
    tasks: Vec<Task>,
    revision: u64,
    clock: Clock,
}

impl<G: TaskGateway> TaskStore<G> {
    /// Load the collection from `gateway`.
    pub fn open(gateway: G) -> Result<Self, StoreError> {
        let tasks = gateway.load()?;
        Ok(TaskStore {
            gateway,
            tasks,
            revision: 0,
            clock: Box::new(Utc::now),
        })
    }

    /// Replace the time source used for ids and `created_at`.
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// The canonical collection in insertion order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn position(&self, id: TaskId) -> Option<usize> {
        task_ops::find_index(&self.tasks, id).ok()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn summary(&self) -> Summary {
        Summary {
            total: self.tasks.len(),
            completed: self.tasks.iter().filter(|t| t.completed).count(),
        }
    }

    // -----------------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------------

    /// Derive the displayed rows for `settings` at the current revision.
    pub fn view(&self, settings: &ViewSettings) -> DerivedView<'_> {
        DerivedView {
            rows: view::derive(&self.tasks, settings),
            revision: self.revision,
        }
    }

    /// Resolve a row of a previously taken snapshot to the id it shows.
    /// Fails if the store has changed since the snapshot was taken.
    pub fn resolve(&self, snapshot: &ViewSnapshot, row: usize) -> Result<TaskId, StoreError> {
        if snapshot.revision != self.revision {
            return Err(StoreError::StaleView {
                view: snapshot.revision,
                store: self.revision,
            });
        }
        let entry = snapshot.entries.get(row).ok_or(StoreError::NoSuchRow {
            row,
            len: snapshot.len(),
        })?;
        debug_assert_eq!(self.tasks[entry.index].id, entry.id);
        Ok(entry.id)
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Add a task. Blank input is a no-op and returns `Ok(None)`.
    pub fn add(&mut self, description: &str) -> Result<Option<Task>, StoreError> {
        let now = (self.clock)();
        let mut next = self.tasks.clone();
        let Some(task) = task_ops::add_task(&mut next, description, now) else {
            return Ok(None);
        };
        self.commit(next)?;
        Ok(Some(task))
    }

    pub fn toggle_complete(&mut self, id: TaskId) -> Result<Task, StoreError> {
        self.mutate(|tasks| task_ops::toggle_complete(tasks, id))
    }

    pub fn delete(&mut self, id: TaskId) -> Result<Task, StoreError> {
        let removed = self.mutate(|tasks| task_ops::delete_task(tasks, id))?;
        self.gateway.record_deletion(&removed);
        Ok(removed)
    }

    pub fn edit_description(&mut self, id: TaskId, text: &str) -> Result<Task, StoreError> {
        self.mutate(|tasks| task_ops::edit_description(tasks, id, text))
    }

    pub fn cycle_priority(&mut self, id: TaskId) -> Result<Task, StoreError> {
        self.mutate(|tasks| task_ops::cycle_priority(tasks, id))
    }

    pub fn set_due_date(&mut self, id: TaskId, text: &str) -> Result<Task, StoreError> {
        self.mutate(|tasks| task_ops::set_due_date(tasks, id, text))
    }

    pub fn set_tags(&mut self, id: TaskId, text: &str) -> Result<Task, StoreError> {
        self.mutate(|tasks| task_ops::set_tags(tasks, id, text))
    }

    fn mutate<T>(
        &mut self,
        op: impl FnOnce(&mut Vec<Task>) -> Result<T, TaskError>,
    ) -> Result<T, StoreError> {
        let mut next = self.tasks.clone();
        let out = op(&mut next)?;
        self.commit(next)?;
        Ok(out)
    }

    fn commit(&mut self, next: Vec<Task>) -> Result<(), StoreError> {
        self.gateway.save(&next)?;
        self.tasks = next;
        self.revision += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::store_io::MemoryGateway;
    use crate::model::task::Priority;
    use crate::ops::view::{FilterMode, SortMode};
    use chrono::TimeZone;
    use std::cell::Cell;
    use std::rc::Rc;

    /// A clock that advances one second per call
    fn ticking_clock() -> impl Fn() -> DateTime<Utc> {
        let tick = Rc::new(Cell::new(0i64));
        move || {
            let n = tick.get();
            tick.set(n + 1);
            Utc.timestamp_opt(1_700_000_000 + n, 0).unwrap()
        }
    }

    fn store(gateway: &MemoryGateway) -> TaskStore<&MemoryGateway> {
        TaskStore::open(gateway).unwrap().with_clock(ticking_clock())
    }

    #[test]
    fn add_persists_before_returning() {
        let gateway = MemoryGateway::new();
        let mut store = store(&gateway);
        let task = store.add("buy milk").unwrap().unwrap();
        assert_eq!(gateway.writes(), 1);
        assert_eq!(gateway.load().unwrap(), vec![task]);
        assert_eq!(store.revision(), 1);
    }

    #[test]
    fn blank_add_touches_nothing() {
        let gateway = MemoryGateway::new();
        let mut store = store(&gateway);
        store.add("one").unwrap();
        let before = gateway.document();

        assert!(store.add("   ").unwrap().is_none());
        assert_eq!(store.tasks().len(), 1);
        assert_eq!(gateway.document(), before);
        assert_eq!(gateway.writes(), 1);
        assert_eq!(store.revision(), 1);
    }

    #[test]
    fn open_loads_existing_collection() {
        let gateway = MemoryGateway::new();
        {
            let mut store = store(&gateway);
            store.add("a").unwrap();
            store.add("b").unwrap();
        }
        let reopened = TaskStore::open(&gateway).unwrap();
        let names: Vec<&str> = reopened.tasks().iter().map(|t| t.description.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn open_reports_corrupt_store() {
        let gateway = MemoryGateway::with_document("{ not json");
        let err = TaskStore::open(&gateway).err().unwrap();
        assert!(err.is_corrupt_store());
    }

    #[test]
    fn rejected_edit_leaves_state_and_document() {
        let gateway = MemoryGateway::new();
        let mut store = store(&gateway);
        let id = store.add("task").unwrap().unwrap().id;
        store.set_due_date(id, "2024-06-01").unwrap();
        let before_doc = gateway.document();
        let before_due = store.get(id).unwrap().due_date.clone();

        let err = store.set_due_date(id, "not-a-date").unwrap_err();
        assert_eq!(
            err.rejection(),
            Some(&Rejection::InvalidDueDate("not-a-date".into()))
        );
        assert_eq!(store.get(id).unwrap().due_date, before_due);
        assert_eq!(gateway.document(), before_doc);

        assert!(store.edit_description(id, " ").unwrap_err().rejection().is_some());
        assert_eq!(store.get(id).unwrap().description, "task");
    }

    #[test]
    fn failed_write_leaves_memory_unchanged() {
        let gateway = MemoryGateway::new();
        let mut store = store(&gateway);
        let id = store.add("task").unwrap().unwrap().id;
        gateway.set_fail_writes(true);

        assert!(matches!(store.toggle_complete(id), Err(StoreError::Io(_))));
        assert!(!store.get(id).unwrap().completed);
        assert!(matches!(store.add("another"), Err(StoreError::Io(_))));
        assert_eq!(store.tasks().len(), 1);
        assert!(matches!(store.delete(id), Err(StoreError::Io(_))));
        assert!(store.get(id).is_some());
        assert_eq!(store.revision(), 1);
    }

    #[test]
    fn not_found_does_not_write() {
        let gateway = MemoryGateway::new();
        let mut store = store(&gateway);
        store.add("x").unwrap();
        let err = store.cycle_priority(999).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(gateway.writes(), 1);
    }

    #[test]
    fn every_mutation_round_trips() {
        let gateway = MemoryGateway::new();
        let mut store = store(&gateway);
        let a = store.add("alpha").unwrap().unwrap().id;
        let b = store.add("beta").unwrap().unwrap().id;

        store.toggle_complete(a).unwrap();
        store.cycle_priority(b).unwrap();
        store.set_due_date(b, "2025-01-31").unwrap();
        store.set_tags(a, "x, y").unwrap();
        store.edit_description(b, "beta two").unwrap();

        assert_eq!(gateway.load().unwrap(), store.tasks());
        let b_task = store.get(b).unwrap();
        assert_eq!(b_task.priority, Some(Priority::High));
        assert_eq!(b_task.description, "beta two");

        store.delete(a).unwrap();
        assert_eq!(gateway.load().unwrap(), store.tasks());
        assert_eq!(store.tasks().len(), 1);
    }

    #[test]
    fn summary_counts() {
        let gateway = MemoryGateway::new();
        let mut store = store(&gateway);
        let a = store.add("a").unwrap().unwrap().id;
        store.add("b").unwrap();
        store.toggle_complete(a).unwrap();
        assert_eq!(store.summary(), Summary { total: 2, completed: 1 });
    }

    #[test]
    fn resolve_through_sorted_view() {
        let gateway = MemoryGateway::new();
        let mut store = store(&gateway);
        let a = store.add("a").unwrap().unwrap().id;
        let b = store.add("b").unwrap().unwrap().id;
        store.cycle_priority(a).unwrap(); // medium -> high

        let settings = ViewSettings {
            sort: SortMode::Priority,
            ..Default::default()
        };
        let snapshot = store.view(&settings).snapshot();
        assert_eq!(store.resolve(&snapshot, 0).unwrap(), a);
        assert_eq!(store.resolve(&snapshot, 1).unwrap(), b);
        assert!(matches!(
            store.resolve(&snapshot, 2),
            Err(StoreError::NoSuchRow { row: 2, len: 2 })
        ));
    }

    #[test]
    fn resolve_rejects_stale_snapshot() {
        let gateway = MemoryGateway::new();
        let mut store = store(&gateway);
        store.add("a").unwrap();
        let b = store.add("b").unwrap().unwrap().id;
        let settings = ViewSettings {
            filter: FilterMode::Uncompleted,
            ..Default::default()
        };
        let snapshot = store.view(&settings).snapshot();

        store.toggle_complete(b).unwrap();
        assert!(matches!(
            store.resolve(&snapshot, 1),
            Err(StoreError::StaleView { view: 2, store: 3 })
        ));

        let fresh = store.view(&settings).snapshot();
        assert_eq!(fresh.len(), 1);
    }

    #[test]
    fn rejected_and_noop_keep_snapshot_valid() {
        let gateway = MemoryGateway::new();
        let mut store = store(&gateway);
        let a = store.add("a").unwrap().unwrap().id;
        let snapshot = store.view(&ViewSettings::default()).snapshot();

        store.add("  ").unwrap();
        store.set_due_date(a, "bad").unwrap_err();
        assert_eq!(store.resolve(&snapshot, 0).unwrap(), a);
    }
}
