/// Input rejected before anything is persisted. The caller should re-prompt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Task text is required")]
    EmptyTaskText,

    #[error("Comment content is required")]
    EmptyComment,

    #[error("Name is required")]
    EmptyName,

    #[error("Email is required")]
    EmptyEmail,

    #[error("No task ids left")]
    TaskIdsExhausted,

    #[error("Goal title is required")]
    EmptyGoalTitle,

    #[error("Target date must be YYYY-MM-DD, got '{0}'")]
    InvalidTargetDate(String),
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Stored value for '{key}' is corrupt: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Stored value for '{key}' is not UTF-8: {source}")]
    NotUtf8 {
        key: String,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("Stored tasks under '{key}' use up every id")]
    IdOverflow { key: String },

    #[error("Could not serialize value for '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn is_corrupt(&self) -> bool {
        matches!(
            self,
            Self::Corrupt { .. } | Self::NotUtf8 { .. } | Self::IdOverflow { .. }
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("No active session")]
    NoSession,

    #[error("Unknown user: {0}")]
    UnknownUser(String),
}
