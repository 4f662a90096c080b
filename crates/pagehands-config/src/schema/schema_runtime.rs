//! Orchestrator, executor and logging configuration.

use serde::{Deserialize, Serialize};

/// Session and turn handling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Messages kept per session after each turn.
    #[serde(default = "default_max_history")]
    pub max_history: usize,

    /// Sessions idle longer than this are evicted.
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,

    /// How often the staleness sweep runs.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// Pause between executor injection and the retried send.
    #[serde(default = "default_injection_delay_ms")]
    pub injection_delay_ms: u64,
}

fn default_max_history() -> usize {
    20
}

fn default_session_ttl_secs() -> u64 {
    3600
}

fn default_sweep_interval_secs() -> u64 {
    300
}

fn default_injection_delay_ms() -> u64 {
    100
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_history: default_max_history(),
            session_ttl_secs: default_session_ttl_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
            injection_delay_ms: default_injection_delay_ms(),
        }
    }
}

/// Page executor behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Pause after scroll-and-highlight before acting.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// How long an element highlight stays visible.
    #[serde(default = "default_highlight_ms")]
    pub highlight_ms: u64,

    /// Pixels scrolled by `scroll_page` up/down when no amount is given.
    #[serde(default = "default_scroll_amount")]
    pub scroll_amount: f64,

    /// Excerpts returned by `find_text`.
    #[serde(default = "default_max_excerpts")]
    pub max_excerpts: usize,

    /// Quiet period before a batch of DOM mutations is reported.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_settle_delay_ms() -> u64 {
    300
}

fn default_highlight_ms() -> u64 {
    1500
}

fn default_scroll_amount() -> f64 {
    500.0
}

fn default_max_excerpts() -> usize {
    10
}

fn default_debounce_ms() -> u64 {
    500
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: default_settle_delay_ms(),
            highlight_ms: default_highlight_ms(),
            scroll_amount: default_scroll_amount(),
            max_excerpts: default_max_excerpts(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,

    /// Directory for the daily-rotated log file.
    #[serde(default = "default_log_dir")]
    pub dir: String,

    /// Write a log file in addition to the console.
    #[serde(default = "default_file_enabled")]
    pub file: bool,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "~/.pagehands/logs".to_string()
}

fn default_file_enabled() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            dir: default_log_dir(),
            file: default_file_enabled(),
        }
    }
}
