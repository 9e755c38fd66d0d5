use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use kanban_core::{
    api::{CreateGoalRequest, UpdateGoalRequest, UpdateProfileRequest},
    AppStep, Column, CoreError, FileSlot, Goal, Kanban, Task, TaskId, User, ValidationError,
};

use crate::api::{RemoteClient, RemoteError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Register,
    Board,
    Goals,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VimMode {
    Normal,
    Insert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterField {
    Name,
    Email,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalField {
    Title,
    Description,
    Strengths,
    Weaknesses,
    TargetDate,
}

impl GoalField {
    pub const ALL: [GoalField; 5] = [
        GoalField::Title,
        GoalField::Description,
        GoalField::Strengths,
        GoalField::Weaknesses,
        GoalField::TargetDate,
    ];

    pub fn label(self) -> &'static str {
        match self {
            GoalField::Title => " Goal ",
            GoalField::Description => " Description ",
            GoalField::Strengths => " Current strengths ",
            GoalField::Weaknesses => " Weaknesses to improve ",
            GoalField::TargetDate => " Target date (YYYY-MM-DD) ",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Text typed into the new-goal form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoalForm {
    pub title: String,
    pub description: String,
    pub strengths: String,
    pub weaknesses: String,
    pub target_date: String,
}

impl GoalForm {
    pub fn field(&self, field: GoalField) -> &str {
        match field {
            GoalField::Title => &self.title,
            GoalField::Description => &self.description,
            GoalField::Strengths => &self.strengths,
            GoalField::Weaknesses => &self.weaknesses,
            GoalField::TargetDate => &self.target_date,
        }
    }

    fn field_mut(&mut self, field: GoalField) -> &mut String {
        match field {
            GoalField::Title => &mut self.title,
            GoalField::Description => &mut self.description,
            GoalField::Strengths => &mut self.strengths,
            GoalField::Weaknesses => &mut self.weaknesses,
            GoalField::TargetDate => &mut self.target_date,
        }
    }

    fn to_request(&self, user_id: &str) -> Result<CreateGoalRequest, ValidationError> {
        CreateGoalRequest::new(user_id, &self.title)?
            .with_details(&self.description, &self.strengths, &self.weaknesses)
            .with_target_date(&self.target_date)
    }
}

/// What the single-line input on the board is collecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardInput {
    NewTask,
    Comment(TaskId),
}

#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Tick,
}

pub struct App {
    pub kanban: Kanban<FileSlot>,
    pub remote: Option<RemoteClient>,
    pub view: View,
    pub vim_mode: VimMode,

    // Loading state
    pub loading: bool,
    pub loading_message: String,
    pub error_message: Option<String>,
    pub warning_message: Option<String>,

    // Login
    pub users: Vec<User>,
    pub selected_user_idx: usize,

    // Register form
    pub register_name: String,
    pub register_email: String,
    pub register_field: RegisterField,

    // Board state
    pub selected_column: Column,
    pub selected_task: usize,
    pub board_input: Option<BoardInput>,
    pub input: String,

    // Goals
    pub step: AppStep,
    pub goals: Vec<Goal>,
    pub selected_goal: usize,
    pub goal_form: GoalForm,
    pub goal_field: GoalField,
}

impl App {
    pub fn new(kanban: Kanban<FileSlot>, remote: Option<RemoteClient>) -> Self {
        let view = if kanban.current_user().is_some() {
            View::Board
        } else {
            View::Login
        };

        let mut app = Self {
            kanban,
            remote,
            view,
            vim_mode: VimMode::Normal,
            loading: false,
            loading_message: String::new(),
            error_message: None,
            warning_message: None,
            users: Vec::new(),
            selected_user_idx: 0,
            register_name: String::new(),
            register_email: String::new(),
            register_field: RegisterField::Name,
            selected_column: Column::Incomplete,
            selected_task: 0,
            board_input: None,
            input: String::new(),
            step: AppStep::initial(),
            goals: Vec::new(),
            selected_goal: 0,
            goal_form: GoalForm::default(),
            goal_field: GoalField::Title,
        };
        app.refresh_users();
        app.check_warning();
        app
    }

    pub fn set_loading(&mut self, loading: bool, message: &str) {
        self.loading = loading;
        self.loading_message = message.to_string();
    }

    pub fn set_error(&mut self, message: String) {
        self.error_message = Some(message);
    }

    pub fn clear_error(&mut self) {
        self.error_message = None;
        self.warning_message = None;
    }

    fn check_warning(&mut self) {
        if let Some(warning) = self.kanban.take_warning() {
            self.warning_message = Some(warning);
        }
    }

    fn refresh_users(&mut self) {
        match self.kanban.users() {
            Ok(users) => self.users = users,
            Err(e) => self.set_error(format!("Failed to load users: {}", e)),
        }
        if self.selected_user_idx >= self.users.len() {
            self.selected_user_idx = 0;
        }
    }

    pub fn user_name(&self) -> &str {
        self.kanban
            .current_user()
            .map(|u| u.name.as_str())
            .unwrap_or("Unknown")
    }

    /// Tasks of one column in display order
    pub fn column_tasks(&self, column: Column) -> Vec<&Task> {
        self.kanban.partition().column(column).to_vec()
    }

    pub fn selected(&self) -> Option<&Task> {
        self.column_tasks(self.selected_column)
            .get(self.selected_task)
            .copied()
    }

    /// Handle key events, returns true if app should quit
    pub async fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        // Clear messages on any key press
        if self.error_message.is_some() || self.warning_message.is_some() {
            self.clear_error();
            if key.code == KeyCode::Esc {
                return Ok(false);
            }
        }

        // Global quit with Ctrl+C
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Ok(true);
        }

        match self.view {
            View::Login => Ok(self.handle_login_key(key)),
            View::Register => Ok(self.handle_register_key(key).await),
            View::Board => Ok(self.handle_board_key(key).await),
            View::Goals => Ok(self.handle_goals_key(key).await),
        }
    }

    fn handle_login_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('r') => {
                self.view = View::Register;
                self.vim_mode = VimMode::Insert;
                self.register_field = RegisterField::Name;
            }
            KeyCode::Char('j') | KeyCode::Down => {
                if self.selected_user_idx < self.users.len().saturating_sub(1) {
                    self.selected_user_idx += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if self.selected_user_idx > 0 {
                    self.selected_user_idx -= 1;
                }
            }
            KeyCode::Enter => {
                if let Some(user) = self.users.get(self.selected_user_idx).cloned() {
                    self.do_login(user);
                }
            }
            _ => {}
        }

        false
    }

    async fn handle_register_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') if self.vim_mode == VimMode::Normal => return true,
            KeyCode::Esc => {
                if self.vim_mode == VimMode::Insert {
                    self.vim_mode = VimMode::Normal;
                } else {
                    self.register_name.clear();
                    self.register_email.clear();
                    self.view = View::Login;
                }
            }
            KeyCode::Char('i') if self.vim_mode == VimMode::Normal => {
                self.vim_mode = VimMode::Insert;
            }
            KeyCode::Tab | KeyCode::BackTab => {
                self.register_field = match self.register_field {
                    RegisterField::Name => RegisterField::Email,
                    RegisterField::Email => RegisterField::Name,
                };
            }
            KeyCode::Char('j') | KeyCode::Down if self.vim_mode == VimMode::Normal => {
                self.register_field = RegisterField::Email;
            }
            KeyCode::Char('k') | KeyCode::Up if self.vim_mode == VimMode::Normal => {
                self.register_field = RegisterField::Name;
            }
            KeyCode::Enter => self.do_register().await,
            KeyCode::Char(c) if self.vim_mode == VimMode::Insert => match self.register_field {
                RegisterField::Name => self.register_name.push(c),
                RegisterField::Email => self.register_email.push(c),
            },
            KeyCode::Backspace if self.vim_mode == VimMode::Insert => match self.register_field {
                RegisterField::Name => {
                    self.register_name.pop();
                }
                RegisterField::Email => {
                    self.register_email.pop();
                }
            },
            _ => {}
        }

        false
    }

    async fn handle_board_key(&mut self, key: KeyEvent) -> bool {
        if let Some(input) = self.board_input {
            self.handle_board_input_key(key, input);
            return false;
        }

        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('L') => self.do_logout(),
            KeyCode::Char('g') => self.open_goals().await,
            KeyCode::Char('h') | KeyCode::Left => self.select_column(Column::Incomplete),
            KeyCode::Char('l') | KeyCode::Right => self.select_column(Column::Completed),
            KeyCode::Char('j') | KeyCode::Down => self.move_down(),
            KeyCode::Char('k') | KeyCode::Up => self.move_up(),
            KeyCode::Char('n') => {
                self.board_input = Some(BoardInput::NewTask);
                self.input.clear();
            }
            KeyCode::Char('c') => {
                if let Some(id) = self.selected().map(|t| t.id) {
                    self.board_input = Some(BoardInput::Comment(id));
                    self.input.clear();
                }
            }
            KeyCode::Char(' ') | KeyCode::Char('x') => {
                if let Some(id) = self.selected().map(|t| t.id) {
                    let result = self.kanban.toggle_completion(id);
                    self.after_change(result, "Failed to update task");
                }
            }
            KeyCode::Char('m') => {
                if self.kanban.dragging().is_some() {
                    self.drop_here();
                } else if let Some(id) = self.selected().map(|t| t.id) {
                    self.kanban.start_drag(id);
                }
            }
            KeyCode::Enter if self.kanban.dragging().is_some() => self.drop_here(),
            KeyCode::Esc => self.kanban.cancel_drag(),
            _ => {}
        }

        false
    }

    fn handle_board_input_key(&mut self, key: KeyEvent, input: BoardInput) {
        match key.code {
            KeyCode::Esc => {
                self.board_input = None;
                self.input.clear();
            }
            KeyCode::Enter => {
                let result = match input {
                    BoardInput::NewTask => self.kanban.add_task(&self.input).map(|_| ()),
                    BoardInput::Comment(id) => self.kanban.add_comment(id, &self.input),
                };
                match result {
                    Ok(()) => {
                        self.board_input = None;
                        self.input.clear();
                        self.clamp_selection();
                    }
                    // Keep the input open so the user can fix it
                    Err(CoreError::Validation(e)) => self.set_error(e.to_string()),
                    Err(e) => self.set_error(format!("Failed to save: {}", e)),
                }
            }
            KeyCode::Char(c) => self.input.push(c),
            KeyCode::Backspace => {
                self.input.pop();
            }
            _ => {}
        }
    }

    fn drop_here(&mut self) {
        let result = self.kanban.drop_on(self.selected_column).map(|_| ());
        self.after_change(result, "Failed to move task");
    }

    fn after_change(&mut self, result: Result<(), CoreError>, context: &str) {
        if let Err(e) = result {
            self.set_error(format!("{}: {}", context, e));
        }
        self.clamp_selection();
    }

    fn do_login(&mut self, user: User) {
        match self.kanban.login(user) {
            Ok(()) => self.on_auth_success(),
            Err(e) => self.set_error(format!("Login failed: {}", e)),
        }
    }

    async fn do_register(&mut self) {
        self.set_loading(true, "Registering...");

        let name = self.register_name.clone();
        let email = self.register_email.clone();

        match self.kanban.register(&name, &email) {
            Ok(user) => {
                if let Some(remote) = self.remote.clone() {
                    if let Err(e) = sync_profile(&remote, &user).await {
                        self.set_error(format!("Profile sync failed: {}", e));
                    }
                }
                self.register_name.clear();
                self.register_email.clear();
                self.refresh_users();
                self.on_auth_success();
            }
            Err(e) => self.set_error(format!("Registration failed: {}", e)),
        }

        self.set_loading(false, "");
    }

    fn on_auth_success(&mut self) {
        self.view = View::Board;
        self.vim_mode = VimMode::Normal;
        self.selected_column = Column::Incomplete;
        self.selected_task = 0;
        self.step = AppStep::initial();
        self.goals.clear();
        self.check_warning();
    }

    fn do_logout(&mut self) {
        if let Err(e) = self.kanban.logout() {
            self.set_error(format!("Logout failed: {}", e));
            return;
        }
        self.board_input = None;
        self.input.clear();
        self.goals.clear();
        self.refresh_users();
        self.view = View::Login;
    }

    // ============ Goals ============

    async fn open_goals(&mut self) {
        let Some(remote) = self.remote.clone() else {
            self.set_error("Goals need KANBAN_REMOTE_URL and KANBAN_REMOTE_KEY".to_string());
            return;
        };
        let Some(user) = self.kanban.current_user().cloned() else {
            return;
        };

        self.view = View::Goals;
        self.step = AppStep::initial();
        self.set_loading(true, "Loading goals...");

        // Older accounts may predate the remote profile
        if let Err(e) = sync_profile(&remote, &user).await {
            tracing::warn!(user_id = %user.id, "could not sync profile: {}", e);
        }

        match remote.list_goals(&user.id).await {
            Ok(goals) => {
                self.step = self.step.on_goals_loaded(&goals);
                self.goals = goals;
                self.selected_goal = 0;
            }
            Err(e) => {
                self.view = View::Board;
                self.set_error(format!("Failed to load goals: {}", e));
            }
        }

        self.set_loading(false, "");
    }

    async fn handle_goals_key(&mut self, key: KeyEvent) -> bool {
        match self.step {
            AppStep::Welcome => {
                if key.code == KeyCode::Esc {
                    self.view = View::Board;
                }
            }
            AppStep::Goals => match key.code {
                KeyCode::Esc => {
                    self.reset_goal_form();
                    if self.goals.is_empty() {
                        self.view = View::Board;
                    } else {
                        self.step = AppStep::Dashboard;
                    }
                }
                KeyCode::Enter => self.do_create_goal().await,
                KeyCode::Tab | KeyCode::Down => self.goal_field = self.goal_field.next(),
                KeyCode::BackTab | KeyCode::Up => self.goal_field = self.goal_field.prev(),
                KeyCode::Char(c) => self.goal_form.field_mut(self.goal_field).push(c),
                KeyCode::Backspace => {
                    self.goal_form.field_mut(self.goal_field).pop();
                }
                _ => {}
            },
            AppStep::Dashboard => match key.code {
                KeyCode::Char('q') => return true,
                KeyCode::Esc | KeyCode::Char('b') => self.view = View::Board,
                KeyCode::Char('n') => {
                    self.reset_goal_form();
                    self.step = self.step.start_new_goal();
                }
                KeyCode::Char('d') => self.do_complete_goal().await,
                KeyCode::Char('j') | KeyCode::Down => {
                    if self.selected_goal < self.goals.len().saturating_sub(1) {
                        self.selected_goal += 1;
                    }
                }
                KeyCode::Char('k') | KeyCode::Up => {
                    self.selected_goal = self.selected_goal.saturating_sub(1);
                }
                _ => {}
            },
        }

        false
    }

    fn reset_goal_form(&mut self) {
        self.goal_form = GoalForm::default();
        self.goal_field = GoalField::Title;
    }

    async fn do_create_goal(&mut self) {
        let Some(user_id) = self.kanban.current_user().map(|u| u.id.clone()) else {
            return;
        };
        // Form stays filled in so the user can correct it
        let req = match self.goal_form.to_request(&user_id) {
            Ok(req) => req,
            Err(e) => {
                self.set_error(e.to_string());
                return;
            }
        };
        let Some(remote) = self.remote.clone() else {
            return;
        };

        self.set_loading(true, "Saving goal...");

        match remote.create_goal(&req).await {
            Ok(goal) => {
                // Newest first, matching the list order
                self.goals.insert(0, goal);
                self.selected_goal = 0;
                self.reset_goal_form();
                self.step = self.step.on_goal_created();
            }
            Err(e) => self.set_error(format!("Failed to create goal: {}", e)),
        }

        self.set_loading(false, "");
    }

    async fn do_complete_goal(&mut self) {
        let Some(remote) = self.remote.clone() else {
            return;
        };
        let Some(goal_id) = self
            .goals
            .get(self.selected_goal)
            .and_then(|g| g.id.clone())
        else {
            return;
        };

        let req = UpdateGoalRequest {
            status: Some("completed".to_string()),
            ..Default::default()
        };

        match remote.update_goal(&goal_id, req).await {
            Ok(updated) => {
                if let Some(slot) = self.goals.get_mut(self.selected_goal) {
                    *slot = updated;
                }
            }
            Err(e) => self.set_error(format!("Failed to update goal: {}", e)),
        }
    }

    // ============ Navigation ============

    fn select_column(&mut self, column: Column) {
        if self.selected_column != column {
            self.selected_column = column;
            self.selected_task = 0;
        }
    }

    pub fn move_up(&mut self) {
        if self.selected_task > 0 {
            self.selected_task -= 1;
        }
    }

    pub fn move_down(&mut self) {
        let len = self.column_tasks(self.selected_column).len();
        if self.selected_task < len.saturating_sub(1) {
            self.selected_task += 1;
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.column_tasks(self.selected_column).len();
        if self.selected_task >= len {
            self.selected_task = len.saturating_sub(1);
        }
    }
}

/// Create the remote profile if it is missing, or bring its name and email
/// in line with the local user.
async fn sync_profile(remote: &RemoteClient, user: &User) -> Result<(), RemoteError> {
    match remote.get_profile(&user.id).await {
        Ok(profile) => {
            if let Some(req) = UpdateProfileRequest::sync(&profile, &user.name, &user.email) {
                remote.update_profile(&user.id, &req).await?;
                tracing::info!(user_id = %user.id, "updated remote profile");
            }
            Ok(())
        }
        Err(RemoteError::NotFound) => {
            remote
                .create_profile(&user.id, &user.email, Some(&user.name))
                .await?;
            Ok(())
        }
        Err(e) => Err(e),
    }
}
