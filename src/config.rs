use reqwest::Url;
use std::env;

/// Placeholder measurement id shipped in the page template. Analytics is
/// never loaded while the configured id still matches it.
pub const ANALYTICS_ID_PLACEHOLDER: &str = "G-XXXXXXXXXX";

const DEFAULT_POSTS_WEBHOOK: &str = "https://n8n.rodrigovaldelvira.com/webhook/posts";
const DEFAULT_CHAT_WEBHOOK: &str = "https://n8n.rodrigovaldelvira.com/webhook/portfolio-chatbot-q&A";
const DEFAULT_CONTACT_WEBHOOK: &str = "https://n8n.rodrigovaldelvira.com/webhook/portfolio-sendemail";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid webhook url in {var}: {message}")]
    InvalidUrl { var: &'static str, message: String },
    #[error("webhook url in {var} must be http(s)")]
    UnsupportedScheme { var: &'static str },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub posts_webhook: Url,
    pub chat_webhook: Url,
    pub contact_webhook: Url,
    pub analytics_id: String,
}

impl Config {
    /// Read endpoints and identifiers from the environment, falling back to
    /// the production defaults. Webhook URLs are parsed up front so that the
    /// encoded form is fixed before any request is issued (the default chat
    /// URL contains a literal `&`).
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            posts_webhook: webhook_from_env("POSTS_WEBHOOK", DEFAULT_POSTS_WEBHOOK)?,
            chat_webhook: webhook_from_env("CHAT_WEBHOOK", DEFAULT_CHAT_WEBHOOK)?,
            contact_webhook: webhook_from_env("CONTACT_WEBHOOK", DEFAULT_CONTACT_WEBHOOK)?,
            analytics_id: env::var("GA_MEASUREMENT_ID")
                .unwrap_or_else(|_| ANALYTICS_ID_PLACEHOLDER.to_owned()),
        })
    }

    pub fn analytics_id_is_placeholder(&self) -> bool {
        self.analytics_id.is_empty() || self.analytics_id == ANALYTICS_ID_PLACEHOLDER
    }
}

fn webhook_from_env(var: &'static str, default: &str) -> Result<Url, ConfigError> {
    let raw = env::var(var).unwrap_or_else(|_| default.to_owned());
    parse_webhook(&raw).map_err(|err| match err {
        WebhookUrlError::Parse(message) => ConfigError::InvalidUrl { var, message },
        WebhookUrlError::Scheme => ConfigError::UnsupportedScheme { var },
    })
}

enum WebhookUrlError {
    Parse(String),
    Scheme,
}

/// Parse and normalize a webhook URL, fixing its encoded form once at
/// startup. Only http(s) endpoints are accepted.
fn parse_webhook(raw: &str) -> Result<Url, WebhookUrlError> {
    let url = Url::parse(raw.trim()).map_err(|err| WebhookUrlError::Parse(err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(WebhookUrlError::Scheme);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_chat_webhook_parses_with_ampersand() {
        let url = parse_webhook(DEFAULT_CHAT_WEBHOOK).ok().unwrap();
        assert_eq!(url.scheme(), "https");
        assert!(url.path().contains("portfolio-chatbot-q&A"));
    }

    #[test]
    fn urls_are_trimmed_and_normalized() {
        let url = parse_webhook("  http://example.com/webhook/posts ").ok().unwrap();
        assert_eq!(url.as_str(), "http://example.com/webhook/posts");
    }

    #[test]
    fn non_http_schemes_are_rejected() {
        assert!(parse_webhook("ftp://example.com/posts").is_err());
        assert!(parse_webhook("not a url").is_err());
    }

    #[test]
    fn placeholder_analytics_id_is_detected() {
        let config = Config {
            posts_webhook: parse_webhook(DEFAULT_POSTS_WEBHOOK).ok().unwrap(),
            chat_webhook: parse_webhook(DEFAULT_CHAT_WEBHOOK).ok().unwrap(),
            contact_webhook: parse_webhook(DEFAULT_CONTACT_WEBHOOK).ok().unwrap(),
            analytics_id: ANALYTICS_ID_PLACEHOLDER.to_owned(),
        };
        assert!(config.analytics_id_is_placeholder());

        let config = Config {
            analytics_id: "G-ABC123XYZ".to_owned(),
            ..config
        };
        assert!(!config.analytics_id_is_placeholder());
    }
}
