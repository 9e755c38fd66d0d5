//! The board for the signed-in user, with write-through persistence.
//!
//! [`Kanban`] owns the storage slot and the [`Session`]. Every accepted
//! mutation is applied to the in-memory collection and immediately saved;
//! nothing is buffered.
//!
//! Corrupt stored tasks are not an error here: the board starts empty, a
//! warning is logged, and [`Kanban::take_warning`] hands the message to the
//! front end. The next write replaces the corrupt value, so this trades the
//! unreadable data for a usable board.

use crate::board::{self, move_task, Column, DragState, Move, Partition};
use crate::error::CoreError;
use crate::models::{Task, TaskId, User};
use crate::ops;
use crate::session::Session;
use crate::store::{self, KeyValueSlot};

#[derive(Debug)]
struct Board {
    owner_id: String,
    tasks: Vec<Task>,
    next_id: TaskId,
}

#[derive(Debug)]
pub struct Kanban<S: KeyValueSlot> {
    slot: S,
    session: Session,
    board: Option<Board>,
    drag: DragState,
    warning: Option<String>,
}

impl<S: KeyValueSlot> Kanban<S> {
    /// Restore the session from `slot` and load its board, if any.
    pub fn open(mut slot: S) -> Result<Self, CoreError> {
        let session = Session::open(&mut slot)?;
        let mut kanban = Self {
            slot,
            session,
            board: None,
            drag: DragState::default(),
            warning: None,
        };

        if let Some(owner_id) = kanban.session.owner_id().map(str::to_string) {
            kanban.load_board(&owner_id)?;
        }

        Ok(kanban)
    }

    pub fn slot(&self) -> &S {
        &self.slot
    }

    pub fn into_slot(self) -> S {
        self.slot
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn current_user(&self) -> Option<&User> {
        self.session.current()
    }

    pub fn users(&self) -> Result<Vec<User>, CoreError> {
        Ok(Session::users(&self.slot)?)
    }

    // ============ Session ============

    pub fn register(&mut self, name: &str, email: &str) -> Result<User, CoreError> {
        let user = self.session.register(&mut self.slot, name, email)?;
        self.load_board(&user.id)?;
        Ok(user)
    }

    pub fn login(&mut self, user: User) -> Result<(), CoreError> {
        let owner_id = user.id.clone();
        self.session.login(&mut self.slot, user)?;
        self.load_board(&owner_id)
    }

    /// Log in as a user picked from the directory.
    pub fn login_by_id(&mut self, user_id: &str) -> Result<(), CoreError> {
        let user = self
            .users()?
            .into_iter()
            .find(|u| u.id == user_id)
            .ok_or_else(|| CoreError::UnknownUser(user_id.to_string()))?;
        self.login(user)
    }

    pub fn logout(&mut self) -> Result<(), CoreError> {
        self.session.logout(&mut self.slot)?;
        self.board = None;
        self.drag.cancel();
        Ok(())
    }

    // ============ Tasks ============

    /// Tasks of the signed-in user in insertion order. Empty when signed out.
    pub fn tasks(&self) -> &[Task] {
        self.board
            .as_ref()
            .map(|b| b.tasks.as_slice())
            .unwrap_or(&[])
    }

    pub fn task(&self, task_id: TaskId) -> Option<&Task> {
        self.tasks().iter().find(|t| t.id == task_id)
    }

    pub fn next_id(&self) -> Option<TaskId> {
        self.board.as_ref().map(|b| b.next_id)
    }

    pub fn partition(&self) -> Partition<'_> {
        board::partition(self.tasks())
    }

    pub fn add_task(&mut self, text: &str) -> Result<TaskId, CoreError> {
        let board = self.board.as_ref().ok_or(CoreError::NoSession)?;
        let id = board.next_id;
        let (tasks, next_id) = ops::add_task(&board.tasks, text, &board.owner_id, id)?;
        self.commit(tasks)?.next_id = next_id;
        Ok(id)
    }

    /// Flip a task between the columns. An unknown id is ignored, but the
    /// unchanged collection is still written.
    pub fn toggle_completion(&mut self, task_id: TaskId) -> Result<(), CoreError> {
        let board = self.board.as_ref().ok_or(CoreError::NoSession)?;
        if !ops::contains(&board.tasks, task_id) {
            tracing::debug!(task_id, "toggle of unknown task");
        }
        let tasks = ops::toggle_completion(&board.tasks, task_id);
        self.commit(tasks)?;
        Ok(())
    }

    /// Comment as the signed-in user.
    pub fn add_comment(&mut self, task_id: TaskId, content: &str) -> Result<(), CoreError> {
        let user = self.session.current().ok_or(CoreError::NoSession)?;
        let board = self.board.as_ref().ok_or(CoreError::NoSession)?;
        if !ops::contains(&board.tasks, task_id) {
            tracing::debug!(task_id, "comment on unknown task");
        }
        let tasks = ops::add_comment(&board.tasks, task_id, content, &user.id, &user.name)?;
        self.commit(tasks)?;
        Ok(())
    }

    // ============ Drag and drop ============

    pub fn start_drag(&mut self, task_id: TaskId) {
        self.drag.start(task_id);
    }

    pub fn dragging(&self) -> Option<TaskId> {
        self.drag.in_flight()
    }

    pub fn cancel_drag(&mut self) {
        self.drag.cancel();
    }

    /// Drop the in-flight task on a column. Returns whether anything moved;
    /// a drop onto the task's own column writes nothing.
    pub fn drop_on(&mut self, target: Column) -> Result<bool, CoreError> {
        let Some(task_id) = self.drag.take() else {
            return Ok(false);
        };
        let board = self.board.as_ref().ok_or(CoreError::NoSession)?;

        match move_task(&board.tasks, task_id, target) {
            Move::Moved(tasks) => {
                self.commit(tasks)?;
                Ok(true)
            }
            Move::Unchanged => Ok(false),
        }
    }

    // ============ Warnings ============

    /// Pending message about recovered data, cleared once read.
    pub fn take_warning(&mut self) -> Option<String> {
        self.warning.take()
    }

    fn load_board(&mut self, owner_id: &str) -> Result<(), CoreError> {
        self.drag.cancel();

        let loaded = match store::load(&mut self.slot, owner_id) {
            Ok(loaded) => loaded,
            Err(e) if e.is_corrupt() => {
                tracing::warn!(owner_id, "starting with an empty board: {}", e);
                self.warning = Some(format!(
                    "Saved tasks could not be read and were reset ({e})"
                ));
                store::LoadedTasks {
                    tasks: Vec::new(),
                    next_id: 1,
                    migrated: false,
                }
            }
            Err(e) => return Err(e.into()),
        };

        self.board = Some(Board {
            owner_id: owner_id.to_string(),
            tasks: loaded.tasks,
            next_id: loaded.next_id,
        });
        Ok(())
    }

    /// Save `tasks` and only then adopt them, so a failed write leaves the
    /// board as it was.
    fn commit(&mut self, tasks: Vec<Task>) -> Result<&mut Board, CoreError> {
        let board = self.board.as_mut().ok_or(CoreError::NoSession)?;
        store::save(&mut self.slot, &board.owner_id, &tasks)?;
        board.tasks = tasks;
        Ok(board)
    }
}
