use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Self-development goal kept by the remote profile service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strengths: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weaknesses: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    /// Name used when a profile is created without one: the local part of
    /// the email address.
    pub fn default_name(email: &str) -> &str {
        email.split('@').next().unwrap_or(email)
    }
}

/// Where the goal screen is in its flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppStep {
    /// Goals have not been fetched yet.
    #[default]
    Welcome,
    /// No goals exist; the user is asked to write one.
    Goals,
    Dashboard,
}

impl AppStep {
    pub fn initial() -> Self {
        Self::Welcome
    }

    pub fn on_goals_loaded(self, goals: &[Goal]) -> Self {
        if goals.is_empty() {
            Self::Goals
        } else {
            Self::Dashboard
        }
    }

    pub fn on_goal_created(self) -> Self {
        match self {
            Self::Goals => Self::Dashboard,
            other => other,
        }
    }

    /// Leave the dashboard to write another goal.
    pub fn start_new_goal(self) -> Self {
        match self {
            Self::Dashboard => Self::Goals,
            other => other,
        }
    }
}
