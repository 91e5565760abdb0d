//! Chat relay logic: session correlation, outgoing payloads, and reply
//! extraction from the webhook's loosely-shaped responses.

use crate::models::ChatPayload;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use uuid::Uuid;

/// Cookie holding the opaque per-browser session identifier.
pub const SESSION_COOKIE: &str = "portfolio_chat_session";
pub const SESSION_MAX_AGE_DAYS: i64 = 365;

const CHAT_SOURCE: &str = "portfolio-chat";

/// Fixed preference order for the field carrying the bot reply.
const REPLY_FIELDS: [&str; 4] = ["response", "message", "answer", "output"];

/// Reuse the session id from the cookie, or mint a fresh one. The bool is
/// true when the id is new and still needs to be persisted.
pub fn session_id(stored: Option<&str>) -> (String, bool) {
    match stored {
        Some(id) if !id.trim().is_empty() => (id.to_owned(), false),
        _ => (Uuid::new_v4().to_string(), true),
    }
}

pub fn build_payload(
    message: &str,
    session_id: &str,
    page: Option<&str>,
    now: DateTime<Utc>,
) -> ChatPayload {
    ChatPayload {
        message: message.to_owned(),
        timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        source: CHAT_SOURCE.to_owned(),
        session_id: session_id.to_owned(),
        page: page.unwrap_or_default().to_owned(),
    }
}

/// Pull the bot reply out of a webhook response body.
///
/// A JSON object yields the first non-empty string among `response`,
/// `message`, `answer`, `output`, in that order. A body that is not JSON at
/// all is treated as the reply itself. Anything else (JSON without any of
/// the fields, empty bodies) is a formatting failure and yields `None`.
pub fn extract_reply(body: &str) -> Option<String> {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        let text = body.trim();
        return (!text.is_empty()).then(|| text.to_owned());
    };

    for field in REPLY_FIELDS {
        if let Some(text) = value.get(field).and_then(Value::as_str) {
            if !text.trim().is_empty() {
                return Some(text.to_owned());
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn reply_fields_follow_preference_order() {
        let body = r#"{"output": "último", "message": "segundo", "response": "primero"}"#;
        assert_eq!(extract_reply(body).as_deref(), Some("primero"));

        let body = r#"{"answer": "hi"}"#;
        assert_eq!(extract_reply(body).as_deref(), Some("hi"));
    }

    #[test]
    fn empty_fields_are_skipped() {
        let body = r#"{"response": "  ", "message": "hola"}"#;
        assert_eq!(extract_reply(body).as_deref(), Some("hola"));
    }

    #[test]
    fn json_without_known_fields_is_a_failure() {
        assert_eq!(extract_reply(r#"{"foo": "bar"}"#), None);
        assert_eq!(extract_reply(r#"[{"response": "hola"}]"#), None);
        assert_eq!(extract_reply(""), None);
    }

    #[test]
    fn plain_text_body_is_the_reply() {
        assert_eq!(
            extract_reply("hola desde n8n").as_deref(),
            Some("hola desde n8n")
        );
    }

    #[test]
    fn non_string_fields_are_ignored() {
        assert_eq!(extract_reply(r#"{"response": 42}"#), None);
    }

    #[test]
    fn session_id_is_reused_when_present() {
        let (id, fresh) = session_id(Some("abc-123"));
        assert_eq!(id, "abc-123");
        assert!(!fresh);

        let (id, fresh) = session_id(None);
        assert!(!id.is_empty());
        assert!(fresh);

        let (_, fresh) = session_id(Some("   "));
        assert!(fresh);
    }

    #[test]
    fn payload_carries_the_wire_field_names() {
        let now = Utc.with_ymd_and_hms(2026, 8, 27, 10, 30, 0).unwrap();
        let payload = build_payload("hola", "sid-1", Some("https://example.com/"), now);
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["message"], "hola");
        assert_eq!(json["timestamp"], "2026-08-27T10:30:00.000Z");
        assert_eq!(json["source"], "portfolio-chat");
        assert_eq!(json["sessionId"], "sid-1");
        assert_eq!(json["page"], "https://example.com/");
    }
}
