use crate::dashboard::model::{
    ChartDataEnvelope, ChartSpec, DashboardLayout, DashboardSummary, Dataset, DatasetPreview,
    EnvelopeError,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};

mod http;

pub use http::HttpApiClient;

/// Fallback shown when the service gives no `error` message.
pub const GENERIC_ERROR: &str = "Unknown error";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Message taken from the `error` field of the response body.
    #[error("{0}")]
    Server(String),
    #[error("Unknown error (HTTP {0})")]
    Status(u16),
    #[error("network error: {0}")]
    Transport(String),
    #[error("invalid response: {0}")]
    Decode(String),
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

impl From<EnvelopeError> for ApiError {
    fn from(err: EnvelopeError) -> Self {
        ApiError::Decode(err.to_string())
    }
}

/// Body of a successful upload.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct UploadReceipt {
    #[serde(default)]
    pub dataset: Option<Dataset>,
}

/// Body of a successful dashboard save.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SavedDashboard {
    #[serde(default)]
    pub dashboard_id: Option<String>,
}

/// Calls offered by the DataBoard service.
///
/// Implementations are blocking; callers that must stay responsive run them
/// off the UI thread.
pub trait ApiClient: Send + Sync {
    fn login(&self, username: &str, password: &str) -> Result<(), ApiError>;

    /// Ends the session and returns the path the user should land on.
    fn logout(&self) -> Result<String, ApiError>;

    fn list_datasets(&self) -> Result<Vec<Dataset>, ApiError>;

    fn dataset_detail(&self, id: &str) -> Result<Dataset, ApiError>;

    fn dataset_preview(&self, id: &str, rows: usize) -> Result<DatasetPreview, ApiError>;

    fn upload_file(&self, path: &Path) -> Result<UploadReceipt, ApiError>;

    fn create_chart(&self, spec: &ChartSpec) -> Result<ChartDataEnvelope, ApiError>;

    fn save_dashboard(&self, layout: &DashboardLayout) -> Result<SavedDashboard, ApiError>;

    fn list_dashboards(&self) -> Result<Vec<DashboardSummary>, ApiError>;

    fn load_dashboard(&self, id: &str) -> Result<DashboardLayout, ApiError>;
}
