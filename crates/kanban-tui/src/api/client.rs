use chrono::Utc;
use kanban_core::{
    api::{CreateGoalRequest, CreateProfileRequest, UpdateGoalRequest, UpdateProfileRequest},
    Goal, UserProfile,
};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Serialize};

const PROFILES: &str = "user_profiles";
const GOALS: &str = "goals";

#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("Not authorized")]
    Unauthorized,
    #[error("Record not found")]
    NotFound,
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Server error: {0}")]
    Server(String),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Client for the hosted profile/goal tables (PostgREST-style REST API).
///
/// Every call returns either the record or an error; nothing here panics.
#[derive(Clone)]
pub struct RemoteClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RemoteClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Build URL for a collection, with an optional query string
    fn url(&self, collection: &str, query: &str) -> String {
        if query.is_empty() {
            format!("{}/rest/v1/{}", self.base_url, collection)
        } else {
            format!("{}/rest/v1/{}?{}", self.base_url, collection, query)
        }
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", self.api_key.as_str())
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    /// `col=eq.value` filters plus an optional `order` clause
    fn filter_query(filters: &[(&str, &str)], order: Option<&str>) -> String {
        let mut query_parts: Vec<String> = filters
            .iter()
            .map(|(column, value)| format!("{}=eq.{}", column, urlencoding::encode(value)))
            .collect();

        if let Some(order) = order {
            query_parts.push(format!("order={}", urlencoding::encode(order)));
        }

        query_parts.join("&")
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, RemoteError> {
        let status = response.status();

        match status {
            StatusCode::OK | StatusCode::CREATED => {
                response.json().await.map_err(RemoteError::Network)
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(RemoteError::Unauthorized),
            StatusCode::NOT_FOUND | StatusCode::NOT_ACCEPTABLE => Err(RemoteError::NotFound),
            StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
                let text = response.text().await.unwrap_or_default();
                Err(RemoteError::Validation(text))
            }
            _ => {
                let text = response.text().await.unwrap_or_default();
                Err(RemoteError::Server(format!("{}: {}", status, text)))
            }
        }
    }

    /// Representation requests come back as an array; a single write yields
    /// exactly one row.
    fn single<T>(rows: Vec<T>) -> Result<T, RemoteError> {
        rows.into_iter().next().ok_or(RemoteError::NotFound)
    }

    // ============ Generic entity access ============

    pub async fn create_entity<B: Serialize, T: DeserializeOwned>(
        &self,
        collection: &str,
        body: &B,
    ) -> Result<T, RemoteError> {
        let response = self
            .request(Method::POST, &self.url(collection, ""))
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;

        let rows: Vec<T> = self.handle_response(response).await?;
        Self::single(rows)
    }

    pub async fn get_entities<T: DeserializeOwned>(
        &self,
        collection: &str,
        filters: &[(&str, &str)],
        order: Option<&str>,
    ) -> Result<Vec<T>, RemoteError> {
        let query = Self::filter_query(filters, order);
        let response = self
            .request(Method::GET, &self.url(collection, &query))
            .send()
            .await?;

        self.handle_response(response).await
    }

    pub async fn update_entity<B: Serialize, T: DeserializeOwned>(
        &self,
        collection: &str,
        id: &str,
        body: &B,
    ) -> Result<T, RemoteError> {
        let query = Self::filter_query(&[("id", id)], None);
        let response = self
            .request(Method::PATCH, &self.url(collection, &query))
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;

        let rows: Vec<T> = self.handle_response(response).await?;
        Self::single(rows)
    }

    // ============ Profiles ============

    pub async fn create_profile(
        &self,
        user_id: &str,
        email: &str,
        name: Option<&str>,
    ) -> Result<UserProfile, RemoteError> {
        let req = CreateProfileRequest::new(user_id, email, name);
        let result = self.create_entity(PROFILES, &req).await;
        if let Err(e) = &result {
            tracing::error!(user_id, "profile creation failed: {}", e);
        }
        result
    }

    pub async fn get_profile(&self, user_id: &str) -> Result<UserProfile, RemoteError> {
        let rows = self.get_entities(PROFILES, &[("id", user_id)], None).await?;
        Self::single(rows)
    }

    pub async fn update_profile(
        &self,
        user_id: &str,
        req: &UpdateProfileRequest,
    ) -> Result<UserProfile, RemoteError> {
        self.update_entity(PROFILES, user_id, req).await
    }

    // ============ Goals ============

    pub async fn create_goal(&self, req: &CreateGoalRequest) -> Result<Goal, RemoteError> {
        let result = self.create_entity(GOALS, req).await;
        if let Err(e) = &result {
            tracing::error!(user_id = %req.user_id, "goal creation failed: {}", e);
        }
        result
    }

    /// Goals of a user, newest first
    pub async fn list_goals(&self, user_id: &str) -> Result<Vec<Goal>, RemoteError> {
        self.get_entities(GOALS, &[("user_id", user_id)], Some("created_at.desc"))
            .await
    }

    pub async fn update_goal(
        &self,
        goal_id: &str,
        mut req: UpdateGoalRequest,
    ) -> Result<Goal, RemoteError> {
        req.updated_at = Some(Utc::now());
        self.update_entity(GOALS, goal_id, &req).await
    }
}
