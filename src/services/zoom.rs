use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::config::Config;
use crate::error::{AppError, AppResult};

const ZOOM_AUTH_URL: &str = "https://zoom.us/oauth/token";
const ZOOM_API_URL: &str = "https://api.zoom.us/v2";

/// Zoom meeting-service client using server-to-server OAuth. The app access
/// token is cached and refreshed shortly before expiry.
#[derive(Debug, Clone)]
pub struct ZoomService {
    client: Client,
    account_id: String,
    client_id: String,
    client_secret: String,
    host_email: Option<String>,
    app_access_token: Arc<RwLock<Option<AppAccessToken>>>,
}

#[derive(Debug, Clone)]
struct AppAccessToken {
    token: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Serialize)]
struct CreateMeetingRequest {
    topic: String,
    /// 2 = scheduled meeting.
    #[serde(rename = "type")]
    meeting_type: u8,
    start_time: String,
    duration: i64,
    timezone: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ZoomMeeting {
    pub id: Option<i64>,
    pub join_url: String,
    pub start_url: String,
}

impl ZoomService {
    /// Build the service when all three server-to-server credentials are
    /// configured; returns `None` otherwise.
    pub fn from_config(config: &Config) -> Option<Self> {
        let account_id = config.zoom.account_id.clone()?;
        let client_id = config.zoom.client_id.clone()?;
        let client_secret = config.zoom.client_secret.clone()?;

        Some(Self {
            client: Client::new(),
            account_id,
            client_id,
            client_secret,
            host_email: config.zoom.host_email.clone(),
            app_access_token: Arc::new(RwLock::new(None)),
        })
    }

    /// Create a scheduled Zoom meeting and return its join/start URLs.
    pub async fn create_meeting(
        &self,
        topic: &str,
        start_utc: DateTime<Utc>,
        duration_minutes: i64,
    ) -> AppResult<ZoomMeeting> {
        let token = self.get_app_access_token().await?;

        let user = self.host_email.as_deref().unwrap_or("me");
        let request = CreateMeetingRequest {
            topic: topic.to_string(),
            meeting_type: 2,
            start_time: start_utc.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            duration: duration_minutes,
            timezone: "UTC".to_string(),
        };

        let response = self
            .client
            .post(format!("{}/users/{}/meetings", ZOOM_API_URL, user))
            .bearer_auth(&token)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Zoom(format!(
                "Meeting creation failed with {}: {}",
                status, body
            )));
        }

        let meeting: ZoomMeeting = response.json().await?;
        Ok(meeting)
    }

    /// Fetch (or reuse) the cached server-to-server access token.
    async fn get_app_access_token(&self) -> AppResult<String> {
        {
            let guard = self.app_access_token.read().await;
            if let Some(token) = guard.as_ref() {
                // Refresh a minute early to avoid using an expiring token.
                if token.expires_at > Utc::now() + Duration::seconds(60) {
                    return Ok(token.token.clone());
                }
            }
        }

        let response = self
            .client
            .post(ZOOM_AUTH_URL)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .query(&[
                ("grant_type", "account_credentials"),
                ("account_id", self.account_id.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Zoom(format!(
                "Token request failed with {}: {}",
                status, body
            )));
        }

        let token_response: AccessTokenResponse = response.json().await?;
        let token = AppAccessToken {
            token: token_response.access_token.clone(),
            expires_at: Utc::now() + Duration::seconds(token_response.expires_in),
        };

        let mut guard = self.app_access_token.write().await;
        *guard = Some(token);

        Ok(token_response.access_token)
    }
}
