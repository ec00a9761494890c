/// Timing and host-site settings
use url::Url;

/// Delays and deadlines used while driving the host pages, in milliseconds
#[derive(Debug, Clone, PartialEq)]
pub struct Timing {
    /// Deadline for an element to appear
    pub wait_timeout_ms: u32,
    /// Deadline for a category option to appear after a search
    pub option_wait_ms: u32,
    pub category_attempts: u32,
    pub category_backoff_ms: u32,
    pub between_transactions_ms: u32,
    /// Pause after the line form or the report editor opens
    pub form_settle_ms: u32,
    /// Pause around date-picker and category clicks, and before saving
    pub field_settle_ms: u32,
    /// Pause after a category search is submitted
    pub search_settle_ms: u32,
    pub keystroke_delay_ms: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Timing {
            wait_timeout_ms: 10_000,
            option_wait_ms: 5_000,
            category_attempts: 3,
            category_backoff_ms: 1_000,
            between_transactions_ms: 2_000,
            form_settle_ms: 2_000,
            field_settle_ms: 1_000,
            search_settle_ms: 2_000,
            keystroke_delay_ms: 50,
        }
    }
}

/// Where transactions come from
pub const SOURCE_HOST: &str = "app.rocketmoney.com";
pub const SOURCE_PATH: &str = "/transactions";
pub const SOURCE_URL: &str = "https://app.rocketmoney.com/transactions";

/// Where expense lines go; any subdomain is accepted
pub const TARGET_DOMAIN: &str = "myworkday.com";

pub fn is_source_page(tab_url: &str) -> bool {
    Url::parse(tab_url)
        .map(|url| url.host_str() == Some(SOURCE_HOST) && url.path().starts_with(SOURCE_PATH))
        .unwrap_or(false)
}

pub fn is_target_page(tab_url: &str) -> bool {
    Url::parse(tab_url)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .map(|host| host == TARGET_DOMAIN || host.ends_with(&format!(".{}", TARGET_DOMAIN)))
        .unwrap_or(false)
}
