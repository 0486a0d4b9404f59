use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

const PROJECT_NAME_ENV: &str = "PROJECT_NAME";
const RELEASE_TAG_ENV: &str = "RELEASE_TAG";
const RELEASE_URL_ENV: &str = "RELEASE_URL";
const MASTODON_SERVER_ENV: &str = "MASTODON_SERVER";
const MASTODON_TOKEN_ENV: &str = "MASTODON_ACCESS_TOKEN";
const BLUESKY_USERNAME_ENV: &str = "BLUESKY_USERNAME";
const BLUESKY_PASSWORD_ENV: &str = "BLUESKY_APP_PASSWORD";
const AI_ENABLED_ENV: &str = "ANNOUNCE_AI_ENABLED";
const AI_DEBUG_ENV: &str = "ANNOUNCE_AI_DEBUG";
const AI_BASE_URL_ENV: &str = "ANNOUNCE_AI_BASE_URL";
const AI_MODEL_ENV: &str = "ANNOUNCE_AI_MODEL";
const AI_API_KEY_ENV: &str = "ANNOUNCE_AI_API_KEY";
const AI_TIMEOUT_ENV: &str = "ANNOUNCE_AI_TIMEOUT_SECONDS";

pub const DEFAULT_PROJECT_NAME: &str = "pvetui";
pub const DEFAULT_AI_TIMEOUT_SECS: u64 = 20;
const MIN_AI_TIMEOUT_SECS: i64 = 3;
const MAX_AI_TIMEOUT_SECS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub project_name: String,
    pub release_tag: Option<String>,
    pub release_url: Option<String>,
    pub credentials: Credentials,
    pub ai: AiConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub mastodon: Option<MastodonCredentials>,
    pub bluesky: Option<BlueskyCredentials>,
}

#[derive(Clone, PartialEq, Eq)]
pub struct MastodonCredentials {
    pub server: String,
    pub access_token: String,
}

#[derive(Clone, PartialEq, Eq)]
pub struct BlueskyCredentials {
    pub identifier: String,
    pub app_password: String,
}

#[derive(Clone, PartialEq, Eq)]
pub struct AiConfig {
    pub enabled: bool,
    pub debug: bool,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            debug: false,
            base_url: None,
            model: None,
            api_key: None,
            timeout_secs: DEFAULT_AI_TIMEOUT_SECS,
        }
    }
}

impl MastodonCredentials {
    /// Only checked before posting, so a bad value never blocks dry runs or
    /// Bluesky-only runs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let lower = self.server.to_ascii_lowercase();
        if lower.starts_with("https://") || lower.starts_with("http://") {
            Ok(())
        } else {
            Err(ConfigError::InvalidMastodonServer(self.server.clone()))
        }
    }
}

impl fmt::Debug for MastodonCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MastodonCredentials")
            .field("server", &self.server)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

impl fmt::Debug for BlueskyCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlueskyCredentials")
            .field("identifier", &self.identifier)
            .field("app_password", &"<redacted>")
            .finish()
    }
}

impl fmt::Debug for AiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AiConfig")
            .field("enabled", &self.enabled)
            .field("debug", &self.debug)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl RuntimeConfig {
    pub fn from_env() -> Self {
        Self::from_pairs(std::env::vars())
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let env_map: HashMap<String, String> = pairs
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        let get = |key: &str| non_empty(env_map.get(key).map(String::as_str));

        let project_name =
            get(PROJECT_NAME_ENV).unwrap_or_else(|| DEFAULT_PROJECT_NAME.to_string());

        let mastodon = match (get(MASTODON_SERVER_ENV), get(MASTODON_TOKEN_ENV)) {
            (Some(server), Some(access_token)) => Some(MastodonCredentials {
                server: server.trim_end_matches('/').to_string(),
                access_token,
            }),
            _ => None,
        };

        let bluesky = match (get(BLUESKY_USERNAME_ENV), get(BLUESKY_PASSWORD_ENV)) {
            (Some(identifier), Some(app_password)) => Some(BlueskyCredentials {
                identifier,
                app_password,
            }),
            _ => None,
        };

        let ai = AiConfig {
            enabled: parse_flag(get(AI_ENABLED_ENV).as_deref()),
            debug: parse_flag(get(AI_DEBUG_ENV).as_deref()),
            base_url: get(AI_BASE_URL_ENV),
            model: get(AI_MODEL_ENV),
            api_key: get(AI_API_KEY_ENV),
            timeout_secs: parse_timeout(get(AI_TIMEOUT_ENV).as_deref()),
        };

        Self {
            project_name,
            release_tag: get(RELEASE_TAG_ENV),
            release_url: get(RELEASE_URL_ENV),
            credentials: Credentials { mastodon, bluesky },
            ai,
        }
    }
}

fn non_empty(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
}

fn parse_flag(raw: Option<&str>) -> bool {
    raw.is_some_and(|value| {
        matches!(
            value.to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

fn parse_timeout(raw: Option<&str>) -> u64 {
    raw.and_then(|value| value.parse::<i64>().ok())
        .map(|value| value.clamp(MIN_AI_TIMEOUT_SECS, MAX_AI_TIMEOUT_SECS) as u64)
        .unwrap_or(DEFAULT_AI_TIMEOUT_SECS)
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid MASTODON_SERVER: {0} (expected http:// or https:// URL)")]
    InvalidMastodonServer(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_uses_defaults_when_environment_is_empty() {
        let config = RuntimeConfig::from_pairs(Vec::<(String, String)>::new());

        assert_eq!(config.project_name, DEFAULT_PROJECT_NAME);
        assert_eq!(config.release_tag, None);
        assert_eq!(config.release_url, None);
        assert_eq!(config.credentials, Credentials::default());
        assert_eq!(config.ai, AiConfig::default());
    }

    #[test]
    fn config_enables_platform_only_when_both_values_are_set() {
        let config = RuntimeConfig::from_pairs(vec![
            ("MASTODON_SERVER", "https://fosstodon.org/"),
            ("MASTODON_ACCESS_TOKEN", "token"),
            ("BLUESKY_USERNAME", "pvetui.bsky.social"),
            ("BLUESKY_APP_PASSWORD", "  "),
        ]);

        let mastodon = config.credentials.mastodon.expect("mastodon enabled");
        assert_eq!(mastodon.server, "https://fosstodon.org");
        assert_eq!(mastodon.access_token, "token");
        assert_eq!(config.credentials.bluesky, None);
    }

    #[test]
    fn config_defers_mastodon_server_validation() {
        let config = RuntimeConfig::from_pairs(vec![
            ("MASTODON_SERVER", "fosstodon.org"),
            ("MASTODON_ACCESS_TOKEN", "token"),
        ]);

        let mastodon = config.credentials.mastodon.expect("mastodon enabled");
        assert_eq!(mastodon.server, "fosstodon.org");
        assert_eq!(
            mastodon.validate(),
            Err(ConfigError::InvalidMastodonServer("fosstodon.org".to_string()))
        );
    }

    #[test]
    fn mastodon_validate_accepts_http_and_https_servers() {
        for server in ["https://fosstodon.org", "HTTP://localhost:3000"] {
            let credentials = MastodonCredentials {
                server: server.to_string(),
                access_token: "token".to_string(),
            };
            assert_eq!(credentials.validate(), Ok(()), "{server} should be accepted");
        }
    }

    #[test]
    fn config_parses_ai_flags_case_insensitively() {
        for truthy in ["1", "true", "YES", " On "] {
            let config = RuntimeConfig::from_pairs(vec![("ANNOUNCE_AI_ENABLED", truthy)]);
            assert!(config.ai.enabled, "{truthy} should enable ai");
        }

        let config = RuntimeConfig::from_pairs(vec![
            ("ANNOUNCE_AI_ENABLED", "enabled"),
            ("ANNOUNCE_AI_DEBUG", "true"),
        ]);
        assert!(!config.ai.enabled);
        assert!(config.ai.debug);
    }

    #[test]
    fn config_clamps_ai_timeout_and_ignores_garbage() {
        let timeout = |raw: &str| {
            RuntimeConfig::from_pairs(vec![("ANNOUNCE_AI_TIMEOUT_SECONDS", raw)])
                .ai
                .timeout_secs
        };

        assert_eq!(timeout("1"), 3);
        assert_eq!(timeout("-10"), 3);
        assert_eq!(timeout("45"), 45);
        assert_eq!(timeout("600"), 60);
        assert_eq!(timeout("soon"), DEFAULT_AI_TIMEOUT_SECS);
    }

    #[test]
    fn config_reads_release_overrides() {
        let config = RuntimeConfig::from_pairs(vec![
            ("PROJECT_NAME", "demo"),
            ("RELEASE_TAG", "v2.0.0"),
            ("RELEASE_URL", "https://example.com/v2.0.0"),
        ]);

        assert_eq!(config.project_name, "demo");
        assert_eq!(config.release_tag.as_deref(), Some("v2.0.0"));
        assert_eq!(
            config.release_url.as_deref(),
            Some("https://example.com/v2.0.0")
        );
    }

    #[test]
    fn config_debug_output_redacts_secrets() {
        let config = RuntimeConfig::from_pairs(vec![
            ("MASTODON_SERVER", "https://fosstodon.org"),
            ("MASTODON_ACCESS_TOKEN", "mastodon-secret"),
            ("BLUESKY_USERNAME", "pvetui.bsky.social"),
            ("BLUESKY_APP_PASSWORD", "bluesky-secret"),
            ("ANNOUNCE_AI_API_KEY", "ai-secret"),
        ]);

        let rendered = format!("{config:?}");
        assert!(!rendered.contains("mastodon-secret"));
        assert!(!rendered.contains("bluesky-secret"));
        assert!(!rendered.contains("ai-secret"));
        assert!(rendered.contains("pvetui.bsky.social"));
    }
}
