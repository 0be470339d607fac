//! Slack delivery via the Web API: resolve the recipient's email address to
//! a user id, then post a direct message. Recipients are email addresses so
//! the routing config stays independent of Slack internals.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::MessageSender;

const LOOKUP_URL: &str = "https://slack.com/api/users.lookupByEmail";
const POST_URL: &str = "https://slack.com/api/chat.postMessage";

pub struct SlackSender {
    token: String,
    client: Client,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    ok: bool,
    user: Option<LookupUser>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LookupUser {
    id: String,
}

#[derive(Debug, Deserialize)]
struct PostResponse {
    ok: bool,
    error: Option<String>,
}

impl SlackSender {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            client: Client::new(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    async fn lookup_user(&self, email: &str) -> Option<String> {
        let res = self
            .client
            .get(LOOKUP_URL)
            .bearer_auth(&self.token)
            .query(&[("email", email)])
            .timeout(self.timeout)
            .send()
            .await;
        let resp = match res {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(recipient = email, error = %e, "slack user lookup request failed");
                return None;
            }
        };
        let body: LookupResponse = match resp.json().await {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(recipient = email, error = %e, "slack user lookup parse failed");
                return None;
            }
        };
        if !body.ok {
            tracing::warn!(
                recipient = email,
                error = body.error.as_deref().unwrap_or("unknown"),
                "slack user lookup rejected"
            );
            return None;
        }
        body.user.map(|u| u.id)
    }
}

#[async_trait]
impl MessageSender for SlackSender {
    async fn send(&self, recipient: &str, text: &str) -> bool {
        let Some(user_id) = self.lookup_user(recipient).await else {
            return false;
        };

        let payload = serde_json::json!({ "channel": user_id, "text": text });
        let res = self
            .client
            .post(POST_URL)
            .bearer_auth(&self.token)
            .json(&payload)
            .timeout(self.timeout)
            .send()
            .await;
        let resp = match res {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(recipient, error = %e, "slack post request failed");
                return false;
            }
        };
        match resp.json::<PostResponse>().await {
            Ok(body) if body.ok => true,
            Ok(body) => {
                tracing::warn!(
                    recipient,
                    error = body.error.as_deref().unwrap_or("unknown"),
                    "slack post rejected"
                );
                false
            }
            Err(e) => {
                tracing::warn!(recipient, error = %e, "slack post parse failed");
                false
            }
        }
    }
}
