//! Two-column kanban classification and drag-and-drop moves.

use crate::models::{Task, TaskId};

/// The two board columns. A task's column is exactly its `completed` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Incomplete,
    Completed,
}

impl Column {
    pub const ALL: [Column; 2] = [Column::Incomplete, Column::Completed];

    pub fn of(task: &Task) -> Self {
        Self::from_completed(task.completed)
    }

    pub fn from_completed(completed: bool) -> Self {
        if completed {
            Self::Completed
        } else {
            Self::Incomplete
        }
    }

    pub fn completed(self) -> bool {
        matches!(self, Self::Completed)
    }

    pub fn other(self) -> Self {
        match self {
            Self::Incomplete => Self::Completed,
            Self::Completed => Self::Incomplete,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Incomplete => "To do",
            Self::Completed => "Done",
        }
    }
}

/// Display grouping of a collection. Relative order inside each column is
/// the collection's order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition<'a> {
    pub incomplete: Vec<&'a Task>,
    pub completed: Vec<&'a Task>,
}

impl<'a> Partition<'a> {
    pub fn column(&self, column: Column) -> &[&'a Task] {
        match column {
            Column::Incomplete => &self.incomplete,
            Column::Completed => &self.completed,
        }
    }

    /// (incomplete, completed)
    pub fn counts(&self) -> (usize, usize) {
        (self.incomplete.len(), self.completed.len())
    }
}

pub fn partition(tasks: &[Task]) -> Partition<'_> {
    let (completed, incomplete): (Vec<&Task>, Vec<&Task>) =
        tasks.iter().partition(|t| t.completed);
    Partition {
        incomplete,
        completed,
    }
}

/// The task currently being dragged, if any. Single pointer: starting a new
/// drag silently replaces the old one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DragState {
    in_flight: Option<TaskId>,
}

impl DragState {
    pub fn start(&mut self, task_id: TaskId) {
        if let Some(previous) = self.in_flight.replace(task_id) {
            tracing::debug!(previous, task_id, "drag replaced");
        }
    }

    pub fn in_flight(&self) -> Option<TaskId> {
        self.in_flight
    }

    pub fn take(&mut self) -> Option<TaskId> {
        self.in_flight.take()
    }

    pub fn cancel(&mut self) {
        self.in_flight = None;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Move {
    Moved(Vec<Task>),
    /// Already in the target column, or no such task. Nothing to persist.
    Unchanged,
}

/// Move a task into `target`. Compares against the task's state in `tasks`,
/// not against whatever the caller saw when the drag started.
pub fn move_task(tasks: &[Task], task_id: TaskId, target: Column) -> Move {
    match tasks.iter().find(|t| t.id == task_id) {
        Some(task) if Column::of(task) != target => {
            Move::Moved(crate::ops::toggle_completion(tasks, task_id))
        }
        Some(_) => Move::Unchanged,
        None => {
            tracing::debug!(task_id, "move of unknown task ignored");
            Move::Unchanged
        }
    }
}
