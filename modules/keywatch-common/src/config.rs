use std::env;

/// The word-bounded key grammar: five hyphen-separated groups of five
/// uppercase alphanumerics, matched as a standalone token.
pub const DEFAULT_KEY_PATTERN: &str = r"\b[A-Z0-9]{5}(?:-[A-Z0-9]{5}){4}\b";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Redis
    pub redis_url: String,

    // Scraping
    pub scrape_interval_minutes: u64,
    pub lookback_hours: i64,
    pub subreddits: Vec<String>,
    pub forums: Vec<String>,
    pub scan_stale_post_comments: bool,

    // Pattern (overridable)
    pub key_pattern: String,

    // Web server
    pub web_host: String,
    pub web_port: u16,

    // Liveness ping target (optional)
    pub keep_alive_url: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing or malformed,
    /// so a misconfigured process never reaches the scheduler.
    pub fn from_env() -> Self {
        Self {
            redis_url: required_env("REDIS_URL"),
            scrape_interval_minutes: parsed_env("SCRAPE_INTERVAL_MINUTES", 30),
            lookback_hours: parsed_env("LOOKBACK_HOURS", 6),
            subreddits: list_env("SUBREDDITS", "PiratedGames,Piracy,CrackWatch"),
            forums: list_env("FORUMS", ""),
            scan_stale_post_comments: env::var("SCAN_STALE_POST_COMMENTS")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            key_pattern: env::var("KEY_PATTERN")
                .unwrap_or_else(|_| DEFAULT_KEY_PATTERN.to_string()),
            web_host: env::var("WEB_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            web_port: env::var("WEB_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("WEB_PORT must be a number"),
            keep_alive_url: env::var("KEEP_ALIVE_URL").ok().filter(|v| !v.is_empty()),
        }
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}

fn parsed_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(v) => v
            .parse()
            .unwrap_or_else(|_| panic!("{key} must be a number, got '{v}'")),
        Err(_) => default,
    }
}

fn list_env(key: &str, default: &str) -> Vec<String> {
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_parsing_skips_blanks() {
        let items: Vec<String> = "PiratedGames, ,Piracy,"
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect();
        assert_eq!(items, vec!["PiratedGames", "Piracy"]);
    }

    #[test]
    fn default_pattern_is_word_bounded() {
        assert!(DEFAULT_KEY_PATTERN.starts_with(r"\b"));
        assert!(DEFAULT_KEY_PATTERN.ends_with(r"\b"));
    }
}
