use databoard::api::{ApiClient, ApiError, SavedDashboard, UploadReceipt};
use databoard::dashboard::model::{
    CategoricalData, ChartDataEnvelope, ChartSpec, ChartType, ColumnInfo, ColumnType,
    DashboardLayout, DashboardSummary, Dataset, DatasetPreview, Point, PointData, TableData,
};
use serde_json::json;
use std::path::Path;
use std::sync::Mutex;

pub fn dataset(id: &str, filename: &str, columns: &[(&str, ColumnType)]) -> Dataset {
    Dataset {
        id: id.into(),
        filename: filename.into(),
        rows: 3,
        columns: columns.len() as u64,
        columns_info: columns
            .iter()
            .map(|(name, column_type)| ColumnInfo {
                name: name.to_string(),
                column_type: *column_type,
            })
            .collect(),
        created_at: None,
        size_mb: None,
    }
}

pub fn people() -> Dataset {
    dataset(
        "d1",
        "people.csv",
        &[("city", ColumnType::Categorical), ("age", ColumnType::Numeric)],
    )
}

/// In-memory stand-in for the DataBoard service.
#[derive(Default)]
pub struct MockApi {
    pub datasets: Mutex<Vec<Dataset>>,
    pub chart_error: Mutex<Option<String>>,
    pub failing_x: Mutex<Option<String>>,
    pub upload_error: Mutex<Option<String>>,
    pub saved: Mutex<Vec<DashboardLayout>>,
    pub calls: Mutex<Vec<String>>,
}

impl MockApi {
    pub fn with_datasets(datasets: Vec<Dataset>) -> Self {
        Self {
            datasets: Mutex::new(datasets),
            ..Self::default()
        }
    }

    pub fn fail_charts(&self, msg: &str) {
        *self.chart_error.lock().unwrap() = Some(msg.to_string());
    }

    /// Fail only chart requests whose X column is `x_column`.
    pub fn fail_charts_on(&self, x_column: &str) {
        *self.failing_x.lock().unwrap() = Some(x_column.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == call).count()
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }
}

impl ApiClient for MockApi {
    fn login(&self, _username: &str, password: &str) -> Result<(), ApiError> {
        self.record("login");
        if password == "wrong" {
            return Err(ApiError::Server("Invalid credentials".into()));
        }
        Ok(())
    }

    fn logout(&self) -> Result<String, ApiError> {
        self.record("logout");
        Ok("/login".into())
    }

    fn list_datasets(&self) -> Result<Vec<Dataset>, ApiError> {
        self.record("list_datasets");
        Ok(self.datasets.lock().unwrap().clone())
    }

    fn dataset_detail(&self, id: &str) -> Result<Dataset, ApiError> {
        self.record("dataset_detail");
        self.datasets
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .ok_or_else(|| ApiError::Server("Dataset not found".into()))
    }

    fn dataset_preview(&self, id: &str, rows: usize) -> Result<DatasetPreview, ApiError> {
        self.record("dataset_preview");
        let ds = self.dataset_detail(id)?;
        Ok(DatasetPreview {
            columns: ds.x_axis_candidates().iter().map(|c| c.to_string()).collect(),
            data: Vec::new(),
            total_rows: rows as u64,
        })
    }

    fn upload_file(&self, path: &Path) -> Result<UploadReceipt, ApiError> {
        self.record("upload_file");
        if let Some(msg) = self.upload_error.lock().unwrap().clone() {
            return Err(ApiError::Server(msg));
        }
        let mut datasets = self.datasets.lock().unwrap();
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ds = dataset(&format!("up-{}", datasets.len() + 1), &filename, &[]);
        datasets.push(ds.clone());
        Ok(UploadReceipt { dataset: Some(ds) })
    }

    fn create_chart(&self, spec: &ChartSpec) -> Result<ChartDataEnvelope, ApiError> {
        self.record("create_chart");
        if let Some(msg) = self.chart_error.lock().unwrap().clone() {
            return Err(ApiError::Server(msg));
        }
        let failing = self.failing_x.lock().unwrap().clone();
        if failing.is_some() && failing.as_deref() == spec.x_column() {
            return Err(ApiError::Server("Column not found".into()));
        }
        Ok(match spec.chart_type {
            ChartType::Table => {
                let row = json!({"city": "Oslo", "age": 30});
                let row = row.as_object().cloned().unwrap_or_default();
                ChartDataEnvelope::Table(TableData {
                    columns: None,
                    rows: vec![row],
                })
            }
            ChartType::Scatter => ChartDataEnvelope::Scatter(PointData {
                data: vec![Point { x: 1.0, y: 2.0 }, Point { x: 3.0, y: 4.0 }],
                x_label: spec.x_column().map(str::to_string),
                y_label: spec.y_column().map(str::to_string),
            }),
            other => ChartDataEnvelope::categorical(
                other,
                CategoricalData {
                    labels: vec!["A".into(), "B".into()],
                    values: vec![3.0, 5.0],
                    x_label: spec.x_column().map(str::to_string),
                    y_label: spec.y_column().map(str::to_string),
                },
            )?,
        })
    }

    fn save_dashboard(&self, layout: &DashboardLayout) -> Result<SavedDashboard, ApiError> {
        self.record("save_dashboard");
        let mut saved = self.saved.lock().unwrap();
        let id = format!("dash-{}", saved.len() + 1);
        let mut stored = layout.clone();
        stored.id = Some(id.clone());
        saved.push(stored);
        Ok(SavedDashboard {
            dashboard_id: Some(id),
        })
    }

    fn list_dashboards(&self) -> Result<Vec<DashboardSummary>, ApiError> {
        self.record("list_dashboards");
        Ok(self
            .saved
            .lock()
            .unwrap()
            .iter()
            .map(|l| DashboardSummary {
                id: l.id.clone().unwrap_or_default(),
                name: l.name.clone(),
                updated_at: None,
            })
            .collect())
    }

    fn load_dashboard(&self, id: &str) -> Result<DashboardLayout, ApiError> {
        self.record("load_dashboard");
        self.saved
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.id.as_deref() == Some(id))
            .cloned()
            .ok_or_else(|| ApiError::Server("Dashboard not found".into()))
    }
}
