// src/utils/config.rs
use std::time::Duration;

/// Identifying header sent with every detail-page request.
pub const DEFAULT_USER_AGENT: &str = "gradcafe-cleaner/0.1 (applicant results research)";
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;
// The site has no published limit. Stay well under one request per 100ms.
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 150;

pub const USER_AGENT_ENV: &str = "GRADCAFE_USER_AGENT";
pub const REQUEST_DELAY_ENV: &str = "GRADCAFE_REQUEST_DELAY_MS";

/// Settings for the detail-page HTTP client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub user_agent: String,
    pub timeout: Duration,
    pub request_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            request_delay: Duration::from_millis(DEFAULT_REQUEST_DELAY_MS),
        }
    }
}

impl ClientConfig {
    /// Resolves the client settings. Explicit CLI values win, then the
    /// environment, then the built-in defaults.
    pub fn resolve(
        user_agent: Option<String>,
        timeout_secs: Option<u64>,
        request_delay_ms: Option<u64>,
    ) -> Self {
        let user_agent = user_agent
            .or_else(|| std::env::var(USER_AGENT_ENV).ok())
            .map(|ua| ua.trim().to_string())
            .filter(|ua| !ua.is_empty())
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

        let request_delay_ms = match request_delay_ms {
            Some(ms) => ms,
            None => match std::env::var(REQUEST_DELAY_ENV) {
                Ok(raw) => raw.trim().parse::<u64>().unwrap_or_else(|_| {
                    tracing::warn!(
                        "Ignoring invalid {}='{}', using {}ms",
                        REQUEST_DELAY_ENV,
                        raw,
                        DEFAULT_REQUEST_DELAY_MS
                    );
                    DEFAULT_REQUEST_DELAY_MS
                }),
                Err(_) => DEFAULT_REQUEST_DELAY_MS,
            },
        };

        Self {
            user_agent,
            timeout: Duration::from_secs(timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
            request_delay: Duration::from_millis(request_delay_ms),
        }
    }
}
