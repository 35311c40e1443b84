use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_POLL_SECS: u64 = 5;
pub const DEFAULT_SOUND: &str = "/assets/notification.mp3";
pub const DEFAULT_SOUND_VOLUME: f64 = 0.4;

#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    pub poll_interval: Duration,
    pub notification_sound: String,
    pub sound_volume: f64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            poll_interval: Duration::from_secs(DEFAULT_POLL_SECS),
            notification_sound: DEFAULT_SOUND.into(),
            sound_volume: DEFAULT_SOUND_VOLUME,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    /// Runtime environment first, then values captured at build time (the
    /// only source in the browser), then defaults.
    pub fn from_env() -> Self {
        let base_url = lookup("FLOWDESK_API_BASE", option_env!("FLOWDESK_API_BASE"))
            .unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let poll_secs = lookup("FLOWDESK_POLL_SECS", option_env!("FLOWDESK_POLL_SECS"))
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_POLL_SECS);
        let notification_sound = lookup("FLOWDESK_SOUND", option_env!("FLOWDESK_SOUND"))
            .unwrap_or_else(|| DEFAULT_SOUND.into());
        let sound_volume = lookup("FLOWDESK_SOUND_VOLUME", option_env!("FLOWDESK_SOUND_VOLUME"))
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|v| (0.0..=1.0).contains(v))
            .unwrap_or(DEFAULT_SOUND_VOLUME);

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            poll_interval: Duration::from_secs(poll_secs),
            notification_sound,
            sound_volume,
        }
    }

    pub fn with_poll_interval(mut self, every: Duration) -> Self {
        self.poll_interval = every;
        self
    }

    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

fn lookup(name: &str, build_time: Option<&'static str>) -> Option<String> {
    std::env::var(name)
        .ok()
        .or_else(|| build_time.map(ToString::to_string))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_with_single_slash() {
        let config = ClientConfig::new("http://localhost:8080/api/");
        assert_eq!(config.url("/notifications"), "http://localhost:8080/api/notifications");
        assert_eq!(config.url("auth/me"), "http://localhost:8080/api/auth/me");
    }

    #[test]
    fn defaults_match_backend_conventions() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert_eq!(config.sound_volume, 0.4);
    }
}
