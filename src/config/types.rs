use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub fetch: FetchConfig,

    #[serde(default)]
    pub crawl: CrawlConfig,

    #[serde(default, rename = "user-agent")]
    pub user_agent: UserAgentConfig,
}

/// HTTP fetch behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FetchConfig {
    /// Request timeout in seconds; documentation hosts can be slow, so the
    /// accepted range is 30-60
    #[serde(default = "default_timeout_secs", rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Maximum redirect hops to follow for one request
    #[serde(default = "default_max_redirects", rename = "max-redirects")]
    pub max_redirects: u32,

    /// Maximum attempts for a rate-limited request before giving up
    #[serde(default = "default_retry_attempts", rename = "max-retry-attempts")]
    pub max_retry_attempts: u32,

    /// Initial backoff delay in milliseconds; doubles on each attempt
    #[serde(default = "default_backoff_base_ms", rename = "backoff-base-ms")]
    pub backoff_base_ms: u64,

    /// Upper bound on any single backoff delay, in seconds
    #[serde(default = "default_backoff_max_secs", rename = "backoff-max-secs")]
    pub backoff_max_secs: u64,
}

/// Generic crawl bounds
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CrawlConfig {
    /// Maximum number of pages the generic crawler will visit
    #[serde(default = "default_max_pages", rename = "max-pages")]
    pub max_pages: usize,

    /// Maximum link depth from the index page
    #[serde(default = "default_max_depth", rename = "max-depth")]
    pub max_depth: u32,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserAgentConfig {
    /// Name sent in the User-Agent header
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Version sent in the User-Agent header
    #[serde(default = "default_agent_version")]
    pub version: String,

    /// Optional URL with information about the scraper
    #[serde(default, rename = "contact-url")]
    pub contact_url: Option<String>,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_redirects() -> u32 {
    10
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    1000
}

fn default_backoff_max_secs() -> u64 {
    60
}

fn default_max_pages() -> usize {
    500
}

fn default_max_depth() -> u32 {
    5
}

fn default_agent_name() -> String {
    "autodocs-scrape".to_string()
}

fn default_agent_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_redirects: default_max_redirects(),
            max_retry_attempts: default_retry_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
            backoff_max_secs: default_backoff_max_secs(),
        }
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            max_depth: default_max_depth(),
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            version: default_agent_version(),
            contact_url: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the full User-Agent header value
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!("{}/{} (+{})", self.name, self.version, contact),
            None => format!("{}/{}", self.name, self.version),
        }
    }
}
