//! Application state and the typed actions that drive it.
//!
//! A [`UserAction`] is handled in two halves. [`DashboardApp::request`]
//! validates it on the UI thread and returns the network [`Job`], if any.
//! [`Job::run`] performs the blocking calls and may run on any thread.
//! [`DashboardApp::apply`] folds the [`JobOutcome`] back into the state and
//! may return a follow-up job.

use crate::api::{ApiClient, ApiError, SavedDashboard, UploadReceipt};
use crate::dashboard::dashboard::FetchedRestore;
use crate::dashboard::datasets::{DetailTicket, LoadTicket};
use crate::dashboard::model::{
    Aggregation, ChartDataEnvelope, ChartSpec, ChartType, DashboardLayout, DashboardSummary,
    Dataset, DatasetPreview, GridPosition, SortBy, WidgetId,
};
use crate::dashboard::{
    Dashboard, DashboardError, DashboardEvent, DatasetError, DatasetRegistry, PendingChart,
    PendingRestore, ValidationError,
};
use crate::notify::{Notice, NoticeQueue};
use crate::settings::Settings;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub enum UserAction {
    Login { username: String, password: String },
    Logout,
    LoadDatasets,
    SelectDataset(String),
    LoadColumns(String),
    PreviewDataset(String),
    ClosePreview,
    UploadFile(PathBuf),
    OpenChartForm(ChartType),
    CloseChartForm,
    CreateChart(ChartSpec),
    RemoveWidget(WidgetId),
    ClearDashboard { confirmed: bool },
    SaveDashboard { name: String },
    ListDashboards,
    LoadDashboard(String),
    MoveWidget { id: WidgetId, position: GridPosition },
}

/// Network half of a user action.
#[derive(Debug)]
pub enum Job {
    Login { username: String, password: String },
    Logout,
    LoadDatasets(LoadTicket),
    LoadColumns(DetailTicket),
    Preview { dataset_id: String, rows: usize },
    Upload(PathBuf),
    CreateChart(PendingChart),
    Save(DashboardLayout),
    ListDashboards,
    LoadDashboard(String),
    Restore(PendingRestore),
}

#[derive(Debug)]
pub enum JobOutcome {
    LoggedIn {
        username: String,
        result: Result<(), ApiError>,
    },
    LoggedOut(Result<String, ApiError>),
    Datasets(LoadTicket, Result<Vec<Dataset>, ApiError>),
    Columns(DetailTicket, Result<Dataset, ApiError>),
    Preview(String, Result<DatasetPreview, ApiError>),
    Uploaded(PathBuf, Result<UploadReceipt, ApiError>),
    Chart(PendingChart, Result<ChartDataEnvelope, ApiError>),
    Saved(String, Result<SavedDashboard, ApiError>),
    Dashboards(Result<Vec<DashboardSummary>, ApiError>),
    DashboardLoaded(Result<DashboardLayout, ApiError>),
    Restored(FetchedRestore),
}

impl Job {
    pub fn run(self, api: &dyn ApiClient) -> JobOutcome {
        match self {
            Job::Login { username, password } => {
                let result = api.login(&username, &password);
                JobOutcome::LoggedIn { username, result }
            }
            Job::Logout => JobOutcome::LoggedOut(api.logout()),
            Job::LoadDatasets(ticket) => JobOutcome::Datasets(ticket, api.list_datasets()),
            Job::LoadColumns(ticket) => {
                let result = api.dataset_detail(ticket.dataset_id());
                JobOutcome::Columns(ticket, result)
            }
            Job::Preview { dataset_id, rows } => {
                let result = api.dataset_preview(&dataset_id, rows);
                JobOutcome::Preview(dataset_id, result)
            }
            Job::Upload(path) => {
                let result = api.upload_file(&path);
                JobOutcome::Uploaded(path, result)
            }
            Job::CreateChart(pending) => {
                let result = pending.fetch(api);
                JobOutcome::Chart(pending, result)
            }
            Job::Save(layout) => {
                let result = api.save_dashboard(&layout);
                JobOutcome::Saved(layout.name, result)
            }
            Job::ListDashboards => JobOutcome::Dashboards(api.list_dashboards()),
            Job::LoadDashboard(id) => JobOutcome::DashboardLoaded(api.load_dashboard(&id)),
            Job::Restore(pending) => JobOutcome::Restored(pending.fetch(api)),
        }
    }
}

/// Editable state of the chart configuration form.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartForm {
    pub chart_type: ChartType,
    pub dataset_id: String,
    pub x_column: String,
    pub y_column: String,
    pub aggregation: Aggregation,
    pub limit: u32,
    pub sort_by: SortBy,
}

impl ChartForm {
    pub fn new(chart_type: ChartType, dataset_id: &str, limit: u32) -> Self {
        Self {
            chart_type,
            dataset_id: dataset_id.to_string(),
            x_column: String::new(),
            y_column: String::new(),
            aggregation: Aggregation::default(),
            limit,
            sort_by: SortBy::default(),
        }
    }

    pub fn to_spec(&self) -> ChartSpec {
        let non_empty = |s: &str| (!s.trim().is_empty()).then(|| s.to_string());
        ChartSpec {
            dataset_id: self.dataset_id.clone(),
            chart_type: self.chart_type,
            x_column: non_empty(&self.x_column),
            y_column: non_empty(&self.y_column),
            aggregation: self.aggregation,
            limit: self.limit,
            sort_by: self.sort_by,
        }
    }

    /// Drop column choices the dataset does not offer.
    fn retain_columns(&mut self, dataset: &Dataset) {
        if !dataset.x_axis_candidates().contains(&self.x_column.as_str()) {
            self.x_column.clear();
        }
        if !dataset.y_axis_candidates().contains(&self.y_column.as_str()) {
            self.y_column.clear();
        }
    }
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
}

/// All client state, owned by the UI shell.
pub struct DashboardApp {
    datasets: DatasetRegistry,
    dashboard: Dashboard,
    notices: NoticeQueue,
    events: Receiver<DashboardEvent>,
    chart_form: Option<ChartForm>,
    preview: Option<(String, DatasetPreview)>,
    saved_dashboards: Vec<DashboardSummary>,
    last_saved_id: Option<String>,
    empty_state: bool,
    upload_in_flight: bool,
    logged_in: bool,
    preview_rows: usize,
}

impl DashboardApp {
    pub fn new(settings: &Settings) -> Self {
        let (tx, events) = channel();
        let tx = Mutex::new(tx);
        let dashboard = Dashboard::new(
            settings.dashboard.clone(),
            Some(Arc::new(move |event| {
                if let Ok(tx) = tx.lock() {
                    let _ = tx.send(event);
                }
            })),
        );
        Self {
            datasets: DatasetRegistry::default(),
            dashboard,
            notices: NoticeQueue::with_log(settings.toast_log.clone()),
            events,
            chart_form: None,
            preview: None,
            saved_dashboards: Vec::new(),
            last_saved_id: None,
            empty_state: true,
            upload_in_flight: false,
            logged_in: false,
            preview_rows: settings.preview_rows,
        }
    }

    pub fn datasets(&self) -> &DatasetRegistry {
        &self.datasets
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn chart_form(&self) -> Option<&ChartForm> {
        self.chart_form.as_ref()
    }

    pub fn chart_form_mut(&mut self) -> Option<&mut ChartForm> {
        self.chart_form.as_mut()
    }

    pub fn preview(&self) -> Option<&(String, DatasetPreview)> {
        self.preview.as_ref()
    }

    pub fn saved_dashboards(&self) -> &[DashboardSummary] {
        &self.saved_dashboards
    }

    pub fn last_saved_id(&self) -> Option<&str> {
        self.last_saved_id.as_deref()
    }

    /// True while the dashboard should show its empty placeholder.
    pub fn empty_state(&self) -> bool {
        self.empty_state
    }

    pub fn upload_in_flight(&self) -> bool {
        self.upload_in_flight
    }

    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }

    /// Render widgets placed since the previous frame.
    pub fn tick(&mut self) -> Vec<WidgetId> {
        self.dashboard.take_renders()
    }

    /// Handle `action` and return the job that completes it, if any.
    pub fn request(&mut self, action: UserAction) -> Option<Job> {
        let job = self.handle_action(action);
        self.pump_events();
        job
    }

    /// Fold a finished job back into the state.
    pub fn apply(&mut self, outcome: JobOutcome) -> Option<Job> {
        let job = self.handle_outcome(outcome);
        self.pump_events();
        job
    }

    /// Run `action` to completion on the calling thread.
    pub fn dispatch(&mut self, action: UserAction, api: &dyn ApiClient) {
        let mut next = self.request(action);
        while let Some(job) = next {
            next = self.apply(job.run(api));
        }
    }

    fn handle_action(&mut self, action: UserAction) -> Option<Job> {
        match action {
            UserAction::Login { username, password } => Some(Job::Login { username, password }),
            UserAction::Logout => Some(Job::Logout),
            UserAction::LoadDatasets => Some(Job::LoadDatasets(self.datasets.begin_load())),
            UserAction::SelectDataset(id) => {
                match self.datasets.select(&id) {
                    Ok(dataset) => {
                        let msg = format!("Dataset selected: {}", dataset.filename);
                        self.notices.toast(msg);
                    }
                    Err(err) => tracing::warn!(error = %err, "cannot select dataset"),
                }
                None
            }
            UserAction::LoadColumns(id) => {
                if id.is_empty() {
                    return None;
                }
                if let Some(form) = self.chart_form.as_mut() {
                    form.dataset_id = id.clone();
                }
                Some(Job::LoadColumns(self.datasets.begin_detail(&id)))
            }
            UserAction::PreviewDataset(id) => Some(Job::Preview {
                dataset_id: id,
                rows: self.preview_rows,
            }),
            UserAction::ClosePreview => {
                self.preview = None;
                None
            }
            UserAction::UploadFile(path) => self.request_upload(path),
            UserAction::OpenChartForm(chart_type) => self.open_chart_form(chart_type),
            UserAction::CloseChartForm => {
                self.chart_form = None;
                None
            }
            UserAction::CreateChart(spec) => {
                if self.datasets.selected().is_none()
                    || self.datasets.get(&spec.dataset_id).is_none()
                {
                    self.notices.alert(ValidationError::NoDatasetSelected.to_string());
                    return None;
                }
                self.create_chart(spec)
            }
            UserAction::RemoveWidget(id) => {
                if let Err(err) = self.dashboard.remove_widget(&id) {
                    tracing::warn!(error = %err, "remove failed");
                }
                None
            }
            UserAction::ClearDashboard { confirmed } => {
                if confirmed {
                    self.dashboard.clear_all();
                }
                None
            }
            UserAction::SaveDashboard { name } => {
                let name = name.trim();
                if name.is_empty() {
                    return None;
                }
                Some(Job::Save(self.dashboard.snapshot_layout(name)))
            }
            UserAction::ListDashboards => Some(Job::ListDashboards),
            UserAction::LoadDashboard(id) => Some(Job::LoadDashboard(id)),
            UserAction::MoveWidget { id, position } => {
                if let Err(err) = self.dashboard.move_widget(&id, position) {
                    tracing::debug!(error = %err, "move rejected");
                }
                None
            }
        }
    }

    fn request_upload(&mut self, path: PathBuf) -> Option<Job> {
        if !is_csv(&path) {
            self.notices
                .alert(format!("Upload failed: {}", ValidationError::UnsupportedFile));
            return None;
        }
        if self.upload_in_flight {
            self.notices.toast("An upload is already in progress");
            return None;
        }
        self.upload_in_flight = true;
        Some(Job::Upload(path))
    }

    fn create_chart(&mut self, spec: ChartSpec) -> Option<Job> {
        match self.dashboard.begin_create(spec) {
            Ok(pending) => Some(Job::CreateChart(pending)),
            Err(DashboardError::InFlight) => {
                self.notices.toast("A chart is already being created");
                None
            }
            Err(err) => {
                self.notices.alert(err.to_string());
                None
            }
        }
    }

    fn open_chart_form(&mut self, chart_type: ChartType) -> Option<Job> {
        let Some(selected) = self.datasets.selected() else {
            self.notices.alert(ValidationError::NoDatasetSelected.to_string());
            return None;
        };
        let needs_columns = selected.columns_info.is_empty();
        let id = selected.id.clone();
        let limit = self.dashboard.config().default_limit;
        self.chart_form = Some(ChartForm::new(chart_type, &id, limit));
        needs_columns.then(|| Job::LoadColumns(self.datasets.begin_detail(&id)))
    }

    fn handle_outcome(&mut self, outcome: JobOutcome) -> Option<Job> {
        match outcome {
            JobOutcome::LoggedIn { username, result } => match result {
                Ok(()) => {
                    self.logged_in = true;
                    self.notices.toast(format!("Signed in as {username}"));
                    Some(Job::LoadDatasets(self.datasets.begin_load()))
                }
                Err(err) => {
                    self.notices.alert(format!("Login failed: {err}"));
                    None
                }
            },
            JobOutcome::LoggedOut(result) => {
                match result {
                    Ok(target) => {
                        self.reset_session();
                        self.notices.redirect(target);
                    }
                    Err(err) => tracing::error!(error = %err, "logout failed"),
                }
                None
            }
            JobOutcome::Datasets(ticket, result) => {
                match self.datasets.finish_load(ticket, result) {
                    Ok(count) => tracing::debug!(count, "datasets loaded"),
                    Err(DatasetError::Superseded) => {}
                    // Listing is non-critical; the registry keeps its contents.
                    Err(err) => tracing::debug!(error = %err, "dataset reload soft-failed"),
                }
                None
            }
            JobOutcome::Columns(ticket, result) => {
                match self.datasets.finish_detail(ticket, result) {
                    Ok(dataset) => {
                        if let Some(form) = self.chart_form.as_mut() {
                            if form.dataset_id == dataset.id {
                                form.retain_columns(dataset);
                            }
                        }
                    }
                    Err(DatasetError::Superseded) => {}
                    Err(err) => tracing::error!(error = %err, "failed to load columns"),
                }
                None
            }
            JobOutcome::Preview(id, result) => {
                match result {
                    Ok(preview) => self.preview = Some((id, preview)),
                    Err(err) => self.notices.alert(format!("Failed to load preview: {err}")),
                }
                None
            }
            JobOutcome::Uploaded(path, _) if !self.logged_in => {
                tracing::debug!(file = %path.display(), "dropping upload result after logout");
                None
            }
            JobOutcome::Uploaded(path, result) => {
                self.upload_in_flight = false;
                match result {
                    Ok(_) => {
                        tracing::info!(file = %path.display(), "upload complete");
                        self.notices.toast("File uploaded successfully!");
                        Some(Job::LoadDatasets(self.datasets.begin_load()))
                    }
                    Err(err) => {
                        self.notices.alert(format!("Upload failed: {err}"));
                        None
                    }
                }
            }
            JobOutcome::Chart(pending, result) => {
                match self.dashboard.finish_create(pending, result) {
                    Ok(_) => self.chart_form = None,
                    Err(DashboardError::Superseded) => {}
                    Err(err) => self
                        .notices
                        .alert(format!("Failed to create chart: {err}")),
                }
                None
            }
            JobOutcome::Saved(name, result) => {
                match result {
                    Ok(saved) => {
                        tracing::info!(name = %name, id = ?saved.dashboard_id, "dashboard saved");
                        self.last_saved_id = saved.dashboard_id;
                        self.notices.toast("Dashboard saved successfully!");
                    }
                    Err(err) => self
                        .notices
                        .alert(format!("Failed to save dashboard: {err}")),
                }
                None
            }
            JobOutcome::Dashboards(result) => {
                match result {
                    Ok(list) => self.saved_dashboards = list,
                    Err(err) => self
                        .notices
                        .alert(format!("Failed to list dashboards: {err}")),
                }
                None
            }
            JobOutcome::DashboardLoaded(result) => match result {
                Ok(layout) => Some(Job::Restore(self.dashboard.begin_restore(layout))),
                Err(err) => {
                    self.notices
                        .alert(format!("Failed to load dashboard: {err}"));
                    None
                }
            },
            JobOutcome::Restored(fetched) => {
                match self.dashboard.finish_restore(fetched) {
                    Ok(report) => {
                        let mut msg = format!(
                            "Loaded '{}' with {} widget(s)",
                            report.name,
                            report.restored.len()
                        );
                        if !report.skipped.is_empty() {
                            msg.push_str(&format!(", {} skipped", report.skipped.len()));
                        }
                        self.notices.toast(msg);
                    }
                    Err(DashboardError::Superseded) => {}
                    Err(err) => self
                        .notices
                        .alert(format!("Failed to load dashboard: {err}")),
                }
                None
            }
        }
    }

    fn reset_session(&mut self) {
        self.logged_in = false;
        self.datasets.reset();
        self.upload_in_flight = false;
        self.dashboard.clear_all();
        self.chart_form = None;
        self.preview = None;
        self.saved_dashboards.clear();
        self.last_saved_id = None;
    }

    fn pump_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                DashboardEvent::Emptied => self.empty_state = true,
                DashboardEvent::WidgetAdded(_) => self.empty_state = false,
                DashboardEvent::WidgetRemoved(_) | DashboardEvent::Restored { .. } => {}
            }
        }
    }
}
