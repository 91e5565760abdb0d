use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One blog post as served by the posts webhook. The collection is treated as
/// an immutable snapshot per request; nothing is cached or mutated locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub author: String,
    pub date: DateTime<Utc>,
    /// Markdown body. Untrusted: must be sanitized before it reaches a page.
    pub content: String,
}

/// Message posted by the chat widget to `/api/chat`.
#[derive(Debug, Deserialize)]
pub struct ChatPrompt {
    pub message: String,
    /// URL of the page the widget is embedded in, if the client sent one.
    #[serde(default)]
    pub page: Option<String>,
}

/// Body forwarded to the chat webhook for a single message.
#[derive(Debug, Serialize)]
pub struct ChatPayload {
    pub message: String,
    /// ISO-8601 timestamp of when the message was relayed.
    pub timestamp: String,
    pub source: String,
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub page: String,
}

/// Reply returned to the chat widget. `reply_html` is already sanitized.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply_html: String,
}

/// Contact form payload forwarded to the contact webhook. Field names match
/// the form the webhook was built for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub nombre: String,
    pub email: String,
    pub asunto: String,
    pub mensaje: String,
}

/// Raw contact form fields as submitted by the browser.
#[derive(Debug, Default, Deserialize)]
pub struct ContactFields {
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub asunto: String,
    #[serde(default)]
    pub mensaje: String,
}

/// Persisted cookie-consent decision. JSON field names match the record the
/// site always stored; `expiresAt` marks the end of the 1-year validity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsentRecord {
    pub analytics: bool,
    pub necessary: bool,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "expiresAt")]
    pub expires_at: DateTime<Utc>,
}

/// Query parameters accepted by the blog index.
#[derive(Debug, Default, Deserialize)]
pub struct FeedQuery {
    /// Kept as the raw string: a garbage `?page=` value must render page 1,
    /// not fail extraction with a 400.
    #[serde(default)]
    page: Option<String>,
    /// Transient contact-form status flag set by the `/contact` redirect.
    pub sent: Option<String>,
}

impl FeedQuery {
    /// Requested page number; anything non-numeric reads as page 1. Range
    /// clamping happens later, during pagination.
    pub fn page(&self) -> usize {
        self.page
            .as_deref()
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(1)
    }
}

/// Query parameters accepted by the post detail view.
#[derive(Debug, Default, Deserialize)]
pub struct PostQuery {
    pub id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_query_reads_garbage_pages_as_one() {
        let query = FeedQuery {
            page: Some("abc".to_owned()),
            sent: None,
        };
        assert_eq!(query.page(), 1);

        let query = FeedQuery {
            page: Some(" 2 ".to_owned()),
            sent: None,
        };
        assert_eq!(query.page(), 2);

        assert_eq!(FeedQuery::default().page(), 1);
    }
}
