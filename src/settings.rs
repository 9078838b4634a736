use crate::dashboard::config::DashboardConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// Root URL of the DataBoard service.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Username prefilled on the login screen.
    #[serde(default)]
    pub username: Option<String>,
    /// When enabled the application initialises the logger at debug level.
    /// Defaults to `false` when the field is missing in the settings file.
    #[serde(default)]
    pub debug_logging: bool,
    /// Optional file receiving a copy of the log output.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    /// Enable toast notifications in the UI.
    #[serde(default = "default_toasts")]
    pub enable_toasts: bool,
    /// Duration of toast notifications in seconds.
    #[serde(default = "default_toast_duration")]
    pub toast_duration: f32,
    /// Append every toast to this file when set.
    #[serde(default)]
    pub toast_log: Option<PathBuf>,
    /// Timeout applied to each HTTP request, in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Rows fetched when previewing a dataset.
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
    /// Last known window size. If absent, a default size is used.
    #[serde(default)]
    pub window_size: Option<(i32, i32)>,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

fn default_api_base_url() -> String {
    "http://localhost:5000".into()
}

fn default_toasts() -> bool {
    true
}

fn default_toast_duration() -> f32 {
    3.0
}

fn default_request_timeout() -> u64 {
    30
}

fn default_preview_rows() -> usize {
    100
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            username: None,
            debug_logging: false,
            log_file: None,
            enable_toasts: default_toasts(),
            toast_duration: default_toast_duration(),
            toast_log: None,
            request_timeout_secs: default_request_timeout(),
            preview_rows: default_preview_rows(),
            window_size: None,
            dashboard: DashboardConfig::default(),
        }
    }
}

impl Settings {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.is_empty() {
            return Ok(Self::default());
        }
        let mut settings: Settings = serde_json::from_str(&content)?;
        settings.dashboard.sanitize();
        Ok(settings)
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_secs_f32(self.toast_duration.max(0.0))
    }
}
