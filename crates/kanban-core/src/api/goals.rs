use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Status every newly created goal starts in.
pub const ACTIVE_GOAL_STATUS: &str = "active";

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateGoalRequest {
    pub user_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strengths: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weaknesses: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_date: Option<NaiveDate>,
    pub status: String,
}

impl CreateGoalRequest {
    pub fn new(user_id: &str, title: &str) -> Result<Self, ValidationError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyGoalTitle);
        }

        Ok(Self {
            user_id: user_id.to_string(),
            title: title.to_string(),
            description: None,
            strengths: None,
            weaknesses: None,
            target_date: None,
            status: ACTIVE_GOAL_STATUS.to_string(),
        })
    }

    /// Free-text details. Blank fields are left out of the request.
    pub fn with_details(mut self, description: &str, strengths: &str, weaknesses: &str) -> Self {
        self.description = non_blank(description);
        self.strengths = non_blank(strengths);
        self.weaknesses = non_blank(weaknesses);
        self
    }

    /// Target date as typed by the user, `YYYY-MM-DD`. Blank means none.
    pub fn with_target_date(mut self, raw: &str) -> Result<Self, ValidationError> {
        let raw = raw.trim();
        self.target_date = if raw.is_empty() {
            None
        } else {
            let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_| ValidationError::InvalidTargetDate(raw.to_string()))?;
            Some(date)
        };
        Ok(self)
    }
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateGoalRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strengths: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weaknesses: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn new_goal_is_active_and_trimmed() {
        let req = CreateGoalRequest::new("u1", "  Learn Rust ").unwrap();
        assert_eq!(req.title, "Learn Rust");
        assert_eq!(req.status, ACTIVE_GOAL_STATUS);
    }

    #[test]
    fn blank_title_is_rejected() {
        assert_eq!(
            CreateGoalRequest::new("u1", "  ").unwrap_err(),
            ValidationError::EmptyGoalTitle
        );
    }

    #[test]
    fn details_skip_blank_fields() {
        let req = CreateGoalRequest::new("u1", "Run")
            .unwrap()
            .with_details(" Finish a marathon ", "", "  stamina ");

        assert_eq!(req.description.as_deref(), Some("Finish a marathon"));
        assert_eq!(req.strengths, None);
        assert_eq!(req.weaknesses.as_deref(), Some("stamina"));

        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("strengths").is_none());
        assert!(json.get("target_date").is_none());
    }

    #[test]
    fn target_date_is_parsed() {
        let req = CreateGoalRequest::new("u1", "Run")
            .unwrap()
            .with_target_date(" 2025-10-01 ")
            .unwrap();
        assert_eq!(req.target_date, NaiveDate::from_ymd_opt(2025, 10, 1));

        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["target_date"], "2025-10-01");
    }

    #[rstest]
    #[case("tomorrow")]
    #[case("2025-13-01")]
    #[case("01/10/2025")]
    fn bad_target_date_is_rejected(#[case] raw: &str) {
        let err = CreateGoalRequest::new("u1", "Run")
            .unwrap()
            .with_target_date(raw)
            .unwrap_err();
        assert_eq!(err, ValidationError::InvalidTargetDate(raw.to_string()));
    }

    #[test]
    fn blank_target_date_means_none() {
        let req = CreateGoalRequest::new("u1", "Run")
            .unwrap()
            .with_target_date("  ")
            .unwrap();
        assert_eq!(req.target_date, None);
    }
}
