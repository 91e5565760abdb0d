//! Cookie-consent records. Pure functions over the stored cookie value, so
//! the persistence side can be swapped out in tests.
//!
//! The banner is shown iff no valid record exists. A record past its
//! `expiresAt` counts as absent, which makes the banner reappear after the
//! 1-year validity runs out.

use crate::models::ConsentRecord;
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use tracing::warn;

/// Cookie holding the encoded consent record.
pub const CONSENT_COOKIE: &str = "cookie_consent";
pub const CONSENT_VALIDITY_DAYS: i64 = 365;

/// The three decisions a visitor can take on the banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    AcceptAll,
    NecessaryOnly,
    Reject,
}

impl Decision {
    /// Only a full accept enables the analytics integration.
    pub fn analytics_allowed(self) -> bool {
        matches!(self, Decision::AcceptAll)
    }
}

pub fn record_for(decision: Decision, now: DateTime<Utc>) -> ConsentRecord {
    ConsentRecord {
        analytics: decision.analytics_allowed(),
        necessary: true,
        timestamp: now,
        expires_at: now + Duration::days(CONSENT_VALIDITY_DAYS),
    }
}

/// Encode a record for storage in a cookie value.
pub fn encode(record: &ConsentRecord) -> String {
    // Infallible for this struct; an empty value just reads back as absent.
    let json = serde_json::to_vec(record).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json)
}

pub fn decode(value: &str) -> Option<ConsentRecord> {
    let bytes = URL_SAFE_NO_PAD.decode(value).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// The currently effective record, if any. Garbage values and expired
/// records both count as "no decision yet".
pub fn current(stored: Option<&str>, now: DateTime<Utc>) -> Option<ConsentRecord> {
    let record = decode(stored?)?;
    (now < record.expires_at).then_some(record)
}

/// The measurement id to embed in pages, if analytics should load at all.
/// Skips (with a warning) while the configured id is still the placeholder,
/// rather than emitting a broken loader.
pub fn analytics_tag<'a>(
    record: Option<&ConsentRecord>,
    analytics_id: &'a str,
    is_placeholder: bool,
) -> Option<&'a str> {
    let allowed = record.is_some_and(|record| record.analytics);
    if !allowed {
        return None;
    }
    if is_placeholder {
        warn!("analytics consent granted but GA_MEASUREMENT_ID is unset; skipping loader");
        return None;
    }
    Some(analytics_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 27, 9, 0, 0).unwrap()
    }

    #[test]
    fn decisions_map_to_analytics_flag() {
        assert!(record_for(Decision::AcceptAll, now()).analytics);
        assert!(!record_for(Decision::NecessaryOnly, now()).analytics);
        assert!(!record_for(Decision::Reject, now()).analytics);
        assert!(record_for(Decision::Reject, now()).necessary);
    }

    #[test]
    fn encode_decode_roundtrip() {
        let record = record_for(Decision::AcceptAll, now());
        let decoded = decode(&encode(&record)).unwrap();
        assert!(decoded.analytics);
        assert_eq!(decoded.timestamp, record.timestamp);
        assert_eq!(decoded.expires_at, now() + Duration::days(365));
    }

    #[test]
    fn record_json_uses_original_field_names() {
        let record = record_for(Decision::NecessaryOnly, now());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["analytics"], false);
        assert_eq!(json["necessary"], true);
        assert!(json.get("expiresAt").is_some());
    }

    #[test]
    fn missing_or_garbage_values_read_as_undecided() {
        assert!(current(None, now()).is_none());
        assert!(current(Some(""), now()).is_none());
        assert!(current(Some("not-base64!"), now()).is_none());
        assert!(current(Some(&URL_SAFE_NO_PAD.encode(b"{}")), now()).is_none());
    }

    #[test]
    fn expired_records_read_as_undecided() {
        let record = record_for(Decision::AcceptAll, now());
        let stored = encode(&record);

        assert!(current(Some(&stored), now() + Duration::days(364)).is_some());
        assert!(current(Some(&stored), now() + Duration::days(366)).is_none());
    }

    #[test]
    fn analytics_tag_requires_consent_and_a_real_id() {
        let granted = record_for(Decision::AcceptAll, now());
        let denied = record_for(Decision::Reject, now());

        assert_eq!(
            analytics_tag(Some(&granted), "G-ABC123", false),
            Some("G-ABC123")
        );
        assert_eq!(analytics_tag(Some(&denied), "G-ABC123", false), None);
        assert_eq!(analytics_tag(None, "G-ABC123", false), None);
        assert_eq!(analytics_tag(Some(&granted), "G-XXXXXXXXXX", true), None);
    }
}
