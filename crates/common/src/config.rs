use serde::Deserialize;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_POLL_INTERVAL_SECONDS: u64 = 60;
pub const DEFAULT_NOTICE_SOURCE_URL: &str = "https://gauhati.ac.in/";
pub const DEFAULT_PUSH_ENDPOINT: &str = "https://exp.host/--/api/v2/push/send";
pub const DEFAULT_TOKEN_STORE_PATH: &str = "tokens.txt";
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 10;
/// Asia/Kolkata, the timezone the source site prints its dates in.
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = 330;

/// Global application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// HTTP listen port
    pub port: u16,

    /// Seconds between poll cycles
    pub poll_interval_seconds: u64,

    /// Page scraped for notices on every cycle
    pub notice_source_url: String,

    /// Push delivery endpoint (Expo push API)
    pub push_endpoint: String,

    /// Line-oriented file holding registered device tokens
    pub token_store_path: String,

    /// Upper bound for every outbound HTTP call
    pub http_timeout_seconds: u64,

    /// Fixed UTC offset used to compute today's date
    pub notice_utc_offset_minutes: i32,

    /// Pins "today" to a literal `dd/mm/yyyy` string instead of the clock
    pub notice_date_override: Option<String>,

    /// CSS selector overrides for the notice list; `None` keeps the built-in layout
    pub notice_item_selector: Option<String>,
    pub notice_link_selector: Option<String>,
    pub notice_date_selector: Option<String>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let poll_interval_seconds = parse_or(
            &lookup,
            "POLL_INTERVAL_SECONDS",
            DEFAULT_POLL_INTERVAL_SECONDS,
        )?;
        if poll_interval_seconds == 0 {
            anyhow::bail!("POLL_INTERVAL_SECONDS must be greater than zero");
        }

        let http_timeout_seconds =
            parse_or(&lookup, "HTTP_TIMEOUT_SECONDS", DEFAULT_HTTP_TIMEOUT_SECONDS)?;
        if http_timeout_seconds == 0 {
            anyhow::bail!("HTTP_TIMEOUT_SECONDS must be greater than zero");
        }

        let notice_utc_offset_minutes = parse_or(
            &lookup,
            "NOTICE_UTC_OFFSET_MINUTES",
            DEFAULT_UTC_OFFSET_MINUTES,
        )?;
        // chrono only accepts offsets strictly inside a day
        if notice_utc_offset_minutes.abs() >= 24 * 60 {
            anyhow::bail!("NOTICE_UTC_OFFSET_MINUTES must be within ±1439");
        }

        Ok(Self {
            port: parse_or(&lookup, "PORT", DEFAULT_PORT)?,
            poll_interval_seconds,
            notice_source_url: lookup("NOTICE_SOURCE_URL")
                .unwrap_or_else(|| DEFAULT_NOTICE_SOURCE_URL.to_string()),
            push_endpoint: lookup("PUSH_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_PUSH_ENDPOINT.to_string()),
            token_store_path: lookup("TOKEN_STORE_PATH")
                .unwrap_or_else(|| DEFAULT_TOKEN_STORE_PATH.to_string()),
            http_timeout_seconds,
            notice_utc_offset_minutes,
            notice_date_override: non_blank(&lookup, "NOTICE_DATE_OVERRIDE"),
            notice_item_selector: non_blank(&lookup, "NOTICE_ITEM_SELECTOR"),
            notice_link_selector: non_blank(&lookup, "NOTICE_LINK_SELECTOR"),
            notice_date_selector: non_blank(&lookup, "NOTICE_DATE_SELECTOR"),
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            poll_interval_seconds: DEFAULT_POLL_INTERVAL_SECONDS,
            notice_source_url: DEFAULT_NOTICE_SOURCE_URL.to_string(),
            push_endpoint: DEFAULT_PUSH_ENDPOINT.to_string(),
            token_store_path: DEFAULT_TOKEN_STORE_PATH.to_string(),
            http_timeout_seconds: DEFAULT_HTTP_TIMEOUT_SECONDS,
            notice_utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
            notice_date_override: None,
            notice_item_selector: None,
            notice_link_selector: None,
            notice_date_selector: None,
        }
    }
}

fn non_blank<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{key} must be a valid {}", std::any::type_name::<T>())),
        None => Ok(default),
    }
}
