//! Thin reqwest wrappers around the three remote webhooks. No retries and no
//! timeouts; a hung webhook simply leaves the caller waiting.

use crate::models::{ChatPayload, ContactSubmission, Post};
use reqwest::{Client, Url};

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// The request never produced a response.
    #[error("webhook request failed: {0}")]
    Transport(String),
    /// The webhook answered with a non-success status.
    #[error("webhook returned status {status}")]
    Status { status: u16, body: String },
    /// The response body could not be deserialized.
    #[error("webhook response parse failed: {0}")]
    Parse(String),
}

/// Fetch the full post collection. Ordering is whatever the webhook returns;
/// callers sort locally.
pub async fn fetch_posts(http: &Client, url: &Url) -> Result<Vec<Post>, WebhookError> {
    let response = http
        .get(url.clone())
        .send()
        .await
        .map_err(|err| WebhookError::Transport(err.to_string()))?;

    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|err| WebhookError::Transport(err.to_string()))?;

    if !status.is_success() {
        return Err(WebhookError::Status {
            status: status.as_u16(),
            body: text,
        });
    }

    serde_json::from_str(&text).map_err(|err| WebhookError::Parse(err.to_string()))
}

/// Relay one chat message. Returns the raw response body: the webhook may
/// answer with JSON or with plain text, and `chat::extract_reply` handles
/// both.
pub async fn send_chat(
    http: &Client,
    url: &Url,
    payload: &ChatPayload,
) -> Result<String, WebhookError> {
    let response = http
        .post(url.clone())
        .json(payload)
        .send()
        .await
        .map_err(|err| WebhookError::Transport(err.to_string()))?;

    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|err| WebhookError::Transport(err.to_string()))?;

    if !status.is_success() {
        return Err(WebhookError::Status {
            status: status.as_u16(),
            body: text,
        });
    }

    Ok(text)
}

/// Relay one contact submission. Success or failure is carried by the HTTP
/// status alone.
pub async fn send_contact(
    http: &Client,
    url: &Url,
    submission: &ContactSubmission,
) -> Result<(), WebhookError> {
    let response = http
        .post(url.clone())
        .json(submission)
        .send()
        .await
        .map_err(|err| WebhookError::Transport(err.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(WebhookError::Status {
            status: status.as_u16(),
            body,
        });
    }

    Ok(())
}
