//! Known users and the active session.
//!
//! The directory and the session pointer live in the same key-value slot as
//! task data, under their own keys. Task code only ever asks the session for
//! the owner id and the author name.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, StoreError, ValidationError};
use crate::ids::time_id;
use crate::models::User;
use crate::store::KeyValueSlot;

pub const USERS_KEY: &str = "todo-users";
pub const SESSION_KEY: &str = "todo-auth";

/// Directory written on first run.
pub fn default_users() -> Vec<User> {
    vec![
        User::new("1", "田中太郎", "tanaka@example.com"),
        User::new("2", "佐藤花子", "sato@example.com"),
        User::new("3", "山田次郎", "yamada@example.com"),
    ]
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionRecord {
    user: User,
    is_authenticated: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    current: Option<User>,
}

impl Session {
    /// Seed the directory if it has never been written, then restore the
    /// stored session. An unreadable session record counts as logged out.
    pub fn open<S: KeyValueSlot + ?Sized>(slot: &mut S) -> Result<Self, StoreError> {
        match slot.get(USERS_KEY) {
            Ok(Some(_)) => {}
            Ok(None) => {
                tracing::info!("seeding user directory");
                write_json(slot, USERS_KEY, &default_users())?;
            }
            // Present but unreadable: keep it, `users` falls back to defaults
            Err(e) if e.is_corrupt() => {}
            Err(e) => return Err(e),
        }

        let current = match slot.get(SESSION_KEY) {
            Ok(None) => None,
            Err(e) if e.is_corrupt() => {
                tracing::warn!("ignoring unreadable session record: {}", e);
                None
            }
            Err(e) => return Err(e),
            Ok(Some(raw)) => match serde_json::from_str::<SessionRecord>(&raw) {
                Ok(record) if record.is_authenticated => Some(record.user),
                Ok(_) => None,
                Err(e) => {
                    tracing::warn!("ignoring unreadable session record: {}", e);
                    None
                }
            },
        };

        if let Some(user) = &current {
            tracing::debug!(user_id = %user.id, "restored session");
        }

        Ok(Self { current })
    }

    pub fn current(&self) -> Option<&User> {
        self.current.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    /// Scope for task storage.
    pub fn owner_id(&self) -> Option<&str> {
        self.current.as_ref().map(|u| u.id.as_str())
    }

    /// Name snapshot for new comments.
    pub fn author_name(&self) -> Option<&str> {
        self.current.as_ref().map(|u| u.name.as_str())
    }

    /// All known users. Falls back to the default set when the directory is
    /// missing or unreadable.
    pub fn users<S: KeyValueSlot + ?Sized>(slot: &S) -> Result<Vec<User>, StoreError> {
        let raw = match slot.get(USERS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(default_users()),
            Err(e) if e.is_corrupt() => {
                tracing::warn!("user directory is unreadable, using defaults: {}", e);
                return Ok(default_users());
            }
            Err(e) => return Err(e),
        };

        match serde_json::from_str(&raw) {
            Ok(users) => Ok(users),
            Err(e) => {
                tracing::warn!("user directory is unreadable, using defaults: {}", e);
                Ok(default_users())
            }
        }
    }

    /// Add a user to the directory and log them in.
    pub fn register<S: KeyValueSlot + ?Sized>(
        &mut self,
        slot: &mut S,
        name: &str,
        email: &str,
    ) -> Result<User, CoreError> {
        let name = name.trim();
        let email = email.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if email.is_empty() {
            return Err(ValidationError::EmptyEmail.into());
        }

        let user = User::new(time_id(Utc::now()), name, email);

        let mut users = Self::users(&*slot)?;
        users.push(user.clone());
        write_json(slot, USERS_KEY, &users)?;
        tracing::info!(user_id = %user.id, "registered user");

        self.login(slot, user.clone())?;
        Ok(user)
    }

    pub fn login<S: KeyValueSlot + ?Sized>(
        &mut self,
        slot: &mut S,
        user: User,
    ) -> Result<(), StoreError> {
        let record = SessionRecord {
            user,
            is_authenticated: true,
        };
        write_json(slot, SESSION_KEY, &record)?;
        tracing::info!(user_id = %record.user.id, "logged in");
        self.current = Some(record.user);
        Ok(())
    }

    /// Clear the session. The stored record is removed outright so the next
    /// open sees no session at all.
    pub fn logout<S: KeyValueSlot + ?Sized>(&mut self, slot: &mut S) -> Result<(), StoreError> {
        slot.remove(SESSION_KEY)?;
        if let Some(user) = self.current.take() {
            tracing::info!(user_id = %user.id, "logged out");
        }
        Ok(())
    }
}

fn write_json<S: KeyValueSlot + ?Sized, T: Serialize + ?Sized>(
    slot: &mut S,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let contents = serde_json::to_string_pretty(value).map_err(|source| StoreError::Serialize {
        key: key.to_string(),
        source,
    })?;
    slot.set(key, &contents)
}
