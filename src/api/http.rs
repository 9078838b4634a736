use super::{ApiClient, ApiError, SavedDashboard, UploadReceipt};
use crate::dashboard::model::{
    ChartDataEnvelope, ChartSpec, DashboardLayout, DashboardSummary, Dataset, DatasetPreview,
};
use anyhow::Context;
use reqwest::blocking::{multipart, Client, Response};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::path::Path;
use std::time::Duration;
use url::Url;

pub const LOGIN_PATH: &str = "/login";

/// [`ApiClient`] speaking JSON over HTTP with a cookie-backed session.
pub struct HttpApiClient {
    client: Client,
    base: Url,
}

impl HttpApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let mut base =
            Url::parse(base_url).with_context(|| format!("invalid API base URL '{base_url}'"))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let client = Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .user_agent("databoard client")
            .build()?;
        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Decode(format!("base URL '{}' cannot hold a path", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        let url = self.endpoint(segments)?;
        tracing::debug!(%url, "GET");
        decode(self.client.get(url).send()?)
    }

    fn post_json<T: DeserializeOwned>(&self, segments: &[&str], body: &Value) -> Result<T, ApiError> {
        let url = self.endpoint(segments)?;
        tracing::debug!(%url, "POST");
        decode(self.client.post(url).json(body).send()?)
    }
}

/// Turn a response into `T`, surfacing the body's `error` field on failure.
fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
    let status = resp.status();
    let text = resp.text()?;
    let body: Option<Value> = serde_json::from_str(&text).ok();
    let server_error = body
        .as_ref()
        .and_then(|b| b.get("error"))
        .and_then(Value::as_str)
        .map(str::to_string);
    if !status.is_success() {
        tracing::warn!(status = status.as_u16(), "request failed");
        return Err(match server_error {
            Some(msg) => ApiError::Server(msg),
            None => ApiError::Status(status.as_u16()),
        });
    }
    if let Some(msg) = server_error {
        return Err(ApiError::Server(msg));
    }
    let body = body.ok_or_else(|| ApiError::Decode("response is not JSON".into()))?;
    serde_json::from_value(body).map_err(|e| ApiError::Decode(e.to_string()))
}

impl ApiClient for HttpApiClient {
    fn login(&self, username: &str, password: &str) -> Result<(), ApiError> {
        let _: Value = self.post_json(
            &["api", "auth", "login"],
            &json!({ "username": username, "password": password }),
        )?;
        tracing::info!(username, "logged in");
        Ok(())
    }

    fn logout(&self) -> Result<String, ApiError> {
        let _: Value = self.post_json(&["api", "auth", "logout"], &json!({}))?;
        Ok(LOGIN_PATH.to_string())
    }

    fn list_datasets(&self) -> Result<Vec<Dataset>, ApiError> {
        self.get(&["api", "datasets"])
    }

    fn dataset_detail(&self, id: &str) -> Result<Dataset, ApiError> {
        self.get(&["api", "dataset", id])
    }

    fn dataset_preview(&self, id: &str, rows: usize) -> Result<DatasetPreview, ApiError> {
        let mut url = self.endpoint(&["api", "dataset", id, "preview"])?;
        url.query_pairs_mut().append_pair("rows", &rows.to_string());
        decode(self.client.get(url).send()?)
    }

    fn upload_file(&self, path: &Path) -> Result<UploadReceipt, ApiError> {
        let form = multipart::Form::new()
            .file("file", path)
            .map_err(|source| ApiError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let url = self.endpoint(&["api", "upload"])?;
        tracing::info!(file = %path.display(), "uploading");
        decode(self.client.post(url).multipart(form).send()?)
    }

    fn create_chart(&self, spec: &ChartSpec) -> Result<ChartDataEnvelope, ApiError> {
        let body: Value = self.post_json(&["api", "chart", "create"], &spec.request_body())?;
        Ok(ChartDataEnvelope::from_response(spec.chart_type, body)?)
    }

    fn save_dashboard(&self, layout: &DashboardLayout) -> Result<SavedDashboard, ApiError> {
        let body = serde_json::to_value(layout).map_err(|e| ApiError::Decode(e.to_string()))?;
        self.post_json(&["api", "dashboard", "save"], &body)
    }

    fn list_dashboards(&self) -> Result<Vec<DashboardSummary>, ApiError> {
        self.get(&["api", "dashboards"])
    }

    fn load_dashboard(&self, id: &str) -> Result<DashboardLayout, ApiError> {
        self.get(&["api", "dashboard", "load", id])
    }
}
