use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::UserProfile;

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateProfileRequest {
    pub id: String,
    pub email: String,
    pub name: String,
}

impl CreateProfileRequest {
    /// Falls back to the email's local part when no name is supplied.
    pub fn new(user_id: &str, email: &str, name: Option<&str>) -> Self {
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| UserProfile::default_name(email));

        Self {
            id: user_id.to_string(),
            email: email.to_string(),
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl UpdateProfileRequest {
    /// Changes that bring a remote profile in line with the local user, or
    /// `None` when they already agree.
    pub fn sync(profile: &UserProfile, name: &str, email: &str) -> Option<Self> {
        let name = (profile.name != name).then(|| name.to_string());
        let email = (profile.email != email).then(|| email.to_string());
        if name.is_none() && email.is_none() {
            return None;
        }

        Some(Self {
            name,
            email,
            updated_at: Utc::now(),
        })
    }
}
