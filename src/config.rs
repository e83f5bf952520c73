use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;

pub const DEFAULT_API_BASE: &str = "https://v3.football.api-sports.io";
pub const DEFAULT_MARKET: &str = "1x2";
pub const DEFAULT_OUTPUT: &str = "odds_history.xlsx";
const DEFAULT_FALLBACK: &str = "sample_data.csv";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_ODDS_DELAY_MS: u64 = 250;

/// Exponential backoff for rate-limited requests.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial: Duration,
    pub max: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial: Duration::from_secs(1),
            max: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// Wait before the attempt following `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial.saturating_mul(factor).min(self.max)
    }
}

/// Settings resolved once at startup and threaded through the run.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: Option<String>,
    pub api_base: String,
    pub request_timeout: Duration,
    pub odds_delay: Duration,
    pub retry: RetryPolicy,
    pub fallback_path: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let api_key =
            env_non_empty("API_FOOTBALL_KEY").or_else(|| env_non_empty("APISPORTS_KEY"));
        let api_base = env_non_empty("API_FOOTBALL_BASE")
            .map(|base| base.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let timeout_secs = env::var("API_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .clamp(1, 120);
        let odds_delay_ms = env::var("ODDS_DELAY_MS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_ODDS_DELAY_MS);
        let fallback_path = env_non_empty("FALLBACK_DATA")
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                let exe = env::current_exe().ok();
                default_fallback_path(exe.as_deref().and_then(Path::parent))
            });

        Self {
            api_key,
            api_base,
            request_timeout: Duration::from_secs(timeout_secs),
            odds_delay: Duration::from_millis(odds_delay_ms),
            retry: RetryPolicy::default(),
            fallback_path,
        }
    }

    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }
}

/// One export job as requested by the operator.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub team: String,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub market: String,
    pub league: Option<String>,
    pub season: Option<String>,
    pub out: PathBuf,
}

impl RunRequest {
    /// Human-readable period used on the summary sheet.
    pub fn period_label(&self) -> String {
        format!("{} → {}", self.date_from, self.date_to)
    }
}

/// The sample file shipped beside the binary, else the working directory's.
pub fn default_fallback_path(exe_dir: Option<&Path>) -> PathBuf {
    exe_dir
        .map(|dir| dir.join(DEFAULT_FALLBACK))
        .filter(|path| path.is_file())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_FALLBACK))
}

fn env_non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
