mod chart_form;
mod chart_view;
mod confirmation_modal;
mod worker;

pub use chart_form::chart_form_ui;
pub use chart_view::{color32, table_ui};
pub use confirmation_modal::{ConfirmationModal, ConfirmationResult, DestructiveAction};
pub use worker::JobRunner;

use crate::api::ApiClient;
use crate::app::{DashboardApp, UserAction};
use crate::dashboard::model::{ChartType, GridPosition};
use crate::dashboard::render::TableView;
use crate::notify::Notice;
use crate::settings::Settings;
use eframe::egui;
use egui_toast::{Toast, ToastKind, ToastOptions, Toasts};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;

const CARD_MARGIN: f32 = 4.0;

#[derive(Default)]
struct LoginForm {
    username: String,
    password: String,
}

/// Top-level egui application.
pub struct DashboardShell {
    app: DashboardApp,
    runner: JobRunner,
    toasts: Toasts,
    pub enable_toasts: bool,
    toast_duration: f32,
    alerts: VecDeque<String>,
    confirm: ConfirmationModal,
    pending_load: Option<String>,
    login: LoginForm,
    upload_path: String,
    save_name: Option<String>,
    default_name: String,
    show_load: bool,
    cell_height: f32,
    columns: u32,
}

impl DashboardShell {
    pub fn new(settings: &Settings, api: Arc<dyn ApiClient>) -> Self {
        Self {
            app: DashboardApp::new(settings),
            runner: JobRunner::new(api),
            toasts: Toasts::new().anchor(egui::Align2::RIGHT_TOP, [10.0, 10.0]),
            enable_toasts: settings.enable_toasts,
            toast_duration: settings.toast_duration,
            alerts: VecDeque::new(),
            confirm: ConfirmationModal::default(),
            pending_load: None,
            login: LoginForm {
                username: settings.username.clone().unwrap_or_default(),
                password: String::new(),
            },
            upload_path: String::new(),
            save_name: None,
            default_name: settings.dashboard.default_name.clone(),
            show_load: false,
            cell_height: settings.dashboard.grid.cell_height,
            columns: settings.dashboard.grid.columns,
        }
    }

    pub fn app(&self) -> &DashboardApp {
        &self.app
    }

    /// Alerts waiting to be acknowledged, oldest first.
    pub fn pending_alerts(&self) -> &VecDeque<String> {
        &self.alerts
    }

    pub fn is_busy(&self) -> bool {
        self.runner.is_busy()
    }

    pub fn perform(&mut self, ctx: &egui::Context, action: UserAction) {
        tracing::debug!(?action, "user action");
        if let Some(job) = self.app.request(action) {
            self.runner.spawn(job, ctx);
        }
        self.flush_notices();
    }

    /// Start an upload for the first dropped file that has a path.
    pub fn handle_dropped_files(&mut self, ctx: &egui::Context, files: Vec<egui::DroppedFile>) {
        if let Some(path) = files.into_iter().find_map(|f| f.path) {
            tracing::debug!(file = %path.display(), "file dropped");
            self.perform(ctx, UserAction::UploadFile(path));
        }
    }

    fn poll_jobs(&mut self, ctx: &egui::Context) {
        for outcome in self.runner.poll() {
            if let Some(job) = self.app.apply(outcome) {
                self.runner.spawn(job, ctx);
            }
        }
        self.flush_notices();
    }

    fn flush_notices(&mut self) {
        for notice in self.app.drain_notices() {
            match notice {
                Notice::Toast(msg) => {
                    if self.enable_toasts {
                        self.toasts.add(Toast {
                            text: msg.into(),
                            kind: ToastKind::Success,
                            options: ToastOptions::default()
                                .duration_in_seconds(self.toast_duration as f64),
                        });
                    }
                }
                Notice::Alert(msg) => self.alerts.push_back(msg),
                Notice::Redirect(target) => {
                    tracing::info!(%target, "session ended");
                    self.login.password.clear();
                    self.show_load = false;
                    self.save_name = None;
                }
            }
        }
    }

    fn login_ui(&mut self, ctx: &egui::Context, actions: &mut Vec<UserAction>) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(80.0);
                ui.heading("DataBoard");
                ui.add_space(12.0);
                ui.add(egui::TextEdit::singleline(&mut self.login.username).hint_text("Username"));
                let pw = ui.add(
                    egui::TextEdit::singleline(&mut self.login.password)
                        .password(true)
                        .hint_text("Password"),
                );
                let enter = pw.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                if ui.button("Sign in").clicked() || enter {
                    actions.push(UserAction::Login {
                        username: self.login.username.trim().to_string(),
                        password: self.login.password.clone(),
                    });
                }
            });
        });
    }

    fn toolbar_ui(&mut self, ctx: &egui::Context, actions: &mut Vec<UserAction>) {
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal_wrapped(|ui| {
                ui.label("Add:");
                for chart_type in ChartType::ALL {
                    if ui.button(chart_type.label()).clicked() {
                        actions.push(UserAction::OpenChartForm(chart_type));
                    }
                }
                ui.separator();
                if ui.button("Save").clicked() {
                    self.save_name = Some(self.default_name.clone());
                }
                if ui.button("Load").clicked() {
                    self.show_load = true;
                    actions.push(UserAction::ListDashboards);
                }
                if ui.button("Clear All").clicked() {
                    self.confirm.open_for(DestructiveAction::ClearDashboard);
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Logout").clicked() {
                        actions.push(UserAction::Logout);
                    }
                    if self.runner.is_busy() {
                        ui.spinner();
                    }
                });
            });
        });
    }

    fn datasets_ui(&mut self, ctx: &egui::Context, actions: &mut Vec<UserAction>) {
        let hovering = ctx.input(|i| !i.raw.hovered_files.is_empty());
        egui::SidePanel::left("datasets")
            .resizable(true)
            .default_width(240.0)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("Datasets");
                    if ui.small_button("⟳").on_hover_text("Reload").clicked() {
                        actions.push(UserAction::LoadDatasets);
                    }
                });
                let stroke = if hovering {
                    egui::Stroke::new(2.0, ui.visuals().selection.stroke.color)
                } else {
                    ui.visuals().widgets.noninteractive.bg_stroke
                };
                egui::Frame::group(ui.style()).stroke(stroke).show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    if self.app.upload_in_flight() {
                        ui.horizontal(|ui| {
                            ui.spinner();
                            ui.label("Uploading...");
                        });
                    } else {
                        ui.label("Drop a CSV file here or enter its path");
                    }
                    ui.horizontal(|ui| {
                        ui.add(
                            egui::TextEdit::singleline(&mut self.upload_path)
                                .desired_width(150.0)
                                .hint_text("data.csv"),
                        );
                        let ready = !self.upload_path.trim().is_empty();
                        if ui.add_enabled(ready, egui::Button::new("Upload")).clicked() {
                            let path = PathBuf::from(self.upload_path.trim());
                            actions.push(UserAction::UploadFile(path));
                            self.upload_path.clear();
                        }
                    });
                });
                ui.separator();
                egui::ScrollArea::vertical().show(ui, |ui| {
                    if self.app.datasets().datasets().is_empty() {
                        ui.weak("No datasets uploaded yet");
                    }
                    for dataset in self.app.datasets().datasets() {
                        let selected = self.app.datasets().is_selected(&dataset.id);
                        if ui.selectable_label(selected, &dataset.filename).clicked() {
                            actions.push(UserAction::SelectDataset(dataset.id.clone()));
                        }
                        ui.horizontal(|ui| {
                            ui.small(dataset.summary());
                            if selected && ui.small_button("Preview").clicked() {
                                actions.push(UserAction::PreviewDataset(dataset.id.clone()));
                            }
                        });
                    }
                });
            });
    }

    fn grid_ui(&mut self, ctx: &egui::Context, actions: &mut Vec<UserAction>) {
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.app.empty_state() {
                ui.centered_and_justified(|ui| {
                    ui.weak("No widgets yet. Select a dataset and add a chart.");
                });
                return;
            }
            egui::ScrollArea::vertical().show(ui, |ui| {
                let dashboard = self.app.dashboard();
                let width = ui.available_width();
                let col_w = width / self.columns.max(1) as f32;
                let rows = dashboard.grid().rows().max(1);
                let (area, _) = ui.allocate_exact_size(
                    egui::vec2(width, rows as f32 * self.cell_height),
                    egui::Sense::hover(),
                );
                for (node, widget) in dashboard.widgets() {
                    let pos = node.position;
                    let rect = egui::Rect::from_min_size(
                        area.min + egui::vec2(pos.x as f32 * col_w, pos.y as f32 * self.cell_height),
                        egui::vec2(pos.w as f32 * col_w, pos.h as f32 * self.cell_height),
                    )
                    .shrink(CARD_MARGIN);
                    ui.painter().rect(
                        rect,
                        6.0,
                        ui.visuals().extreme_bg_color,
                        ui.visuals().widgets.noninteractive.bg_stroke,
                    );
                    ui.allocate_ui_at_rect(rect.shrink(6.0), |ui| {
                        ui.horizontal(|ui| {
                            ui.strong(widget.title());
                            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                                if ui.small_button("🗑").on_hover_text("Remove").clicked() {
                                    actions.push(UserAction::RemoveWidget(node.id.clone()));
                                }
                                ui.menu_button("⋯", |ui| {
                                    if let Some(position) = move_menu(ui, pos) {
                                        actions.push(UserAction::MoveWidget {
                                            id: node.id.clone(),
                                            position,
                                        });
                                        ui.close_menu();
                                    }
                                });
                            });
                        });
                        match widget.render_config() {
                            Some(config) => chart_view::show(ui, widget.id().as_str(), config),
                            None => {
                                ui.centered_and_justified(|ui| {
                                    ui.spinner();
                                });
                            }
                        }
                    });
                }
            });
        });
    }

    fn dialogs_ui(&mut self, ctx: &egui::Context, actions: &mut Vec<UserAction>) {
        let creating = self.app.dashboard().create_in_flight();
        let datasets = self.app.datasets().datasets().to_vec();
        if let Some(form) = self.app.chart_form_mut() {
            if let Some(action) = chart_form_ui(ctx, form, &datasets, creating) {
                actions.push(action);
            }
        }

        if let Some((id, preview)) = self.app.preview() {
            let title = self
                .app
                .datasets()
                .get(id)
                .map(|d| format!("Preview: {}", d.filename))
                .unwrap_or_else(|| "Preview".into());
            let table = TableView::from_preview(preview);
            let mut open = true;
            egui::Window::new(title)
                .open(&mut open)
                .default_size([640.0, 360.0])
                .show(ctx, |ui| {
                    ui.label(format!(
                        "Showing {} of {} rows",
                        table.rows.len(),
                        preview.total_rows
                    ));
                    table_ui(ui, &table);
                });
            if !open {
                actions.push(UserAction::ClosePreview);
            }
        }

        if let Some(name) = self.save_name.as_mut() {
            let mut done = None;
            egui::Window::new("Save Dashboard")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label("Enter dashboard name:");
                    ui.text_edit_singleline(name);
                    ui.horizontal(|ui| {
                        if ui.button("Save").clicked() {
                            done = Some(true);
                        }
                        if ui.button("Cancel").clicked() {
                            done = Some(false);
                        }
                    });
                });
            match done {
                Some(true) => {
                    actions.push(UserAction::SaveDashboard { name: name.clone() });
                    self.save_name = None;
                }
                Some(false) => self.save_name = None,
                None => {}
            }
        }

        if self.show_load {
            let mut open = true;
            egui::Window::new("Load Dashboard")
                .open(&mut open)
                .collapsible(false)
                .show(ctx, |ui| {
                    if self.app.saved_dashboards().is_empty() {
                        ui.weak("No saved dashboards");
                    }
                    for summary in self.app.saved_dashboards() {
                        ui.horizontal(|ui| {
                            ui.label(&summary.name);
                            if let Some(updated) = &summary.updated_at {
                                ui.small(updated);
                            }
                            if ui.button("Load").clicked() {
                                if self.app.dashboard().is_empty() {
                                    actions.push(UserAction::LoadDashboard(summary.id.clone()));
                                } else {
                                    self.pending_load = Some(summary.id.clone());
                                    self.confirm.open_for(DestructiveAction::ReplaceDashboard);
                                }
                            }
                        });
                    }
                });
            let chosen = actions
                .iter()
                .any(|a| matches!(a, UserAction::LoadDashboard(_)));
            if !open || chosen || self.pending_load.is_some() {
                self.show_load = false;
            }
        }

        match self.confirm.ui(ctx) {
            ConfirmationResult::Confirmed => match self.confirm.kind() {
                Some(DestructiveAction::ClearDashboard) => {
                    actions.push(UserAction::ClearDashboard { confirmed: true });
                }
                Some(DestructiveAction::ReplaceDashboard) => {
                    if let Some(id) = self.pending_load.take() {
                        actions.push(UserAction::LoadDashboard(id));
                    }
                }
                None => {}
            },
            ConfirmationResult::Cancelled => self.pending_load = None,
            ConfirmationResult::None => {}
        }

        if let Some(msg) = self.alerts.front().cloned() {
            egui::Window::new("Notice")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label(&msg);
                    if ui.button("OK").clicked() {
                        self.alerts.pop_front();
                    }
                });
        }
    }
}

/// Buttons nudging a widget one cell; returns the requested geometry.
fn move_menu(ui: &mut egui::Ui, pos: GridPosition) -> Option<GridPosition> {
    let mut next = None;
    let options = [
        ("Move left", GridPosition { x: pos.x.saturating_sub(1), ..pos }),
        ("Move right", GridPosition { x: pos.x + 1, ..pos }),
        ("Move up", GridPosition { y: pos.y.saturating_sub(1), ..pos }),
        ("Move down", GridPosition { y: pos.y + 1, ..pos }),
        ("Wider", GridPosition { w: pos.w + 1, ..pos }),
        ("Narrower", GridPosition { w: pos.w.saturating_sub(1).max(1), ..pos }),
        ("Taller", GridPosition { h: pos.h + 1, ..pos }),
        ("Shorter", GridPosition { h: pos.h.saturating_sub(1).max(1), ..pos }),
    ];
    for (label, target) in options {
        if ui.add_enabled(target != pos, egui::Button::new(label)).clicked() {
            next = Some(target);
        }
    }
    next
}

impl eframe::App for DashboardShell {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let rendered = self.app.tick();
        if !rendered.is_empty() {
            tracing::debug!(count = rendered.len(), "rendered widgets");
        }
        self.poll_jobs(ctx);
        if self.app.dashboard().has_pending_renders() {
            ctx.request_repaint();
        }

        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        if !dropped.is_empty() && self.app.is_logged_in() {
            self.handle_dropped_files(ctx, dropped);
        }

        let mut actions: Vec<UserAction> = Vec::new();
        if self.app.is_logged_in() {
            self.toolbar_ui(ctx, &mut actions);
            self.datasets_ui(ctx, &mut actions);
            self.grid_ui(ctx, &mut actions);
        } else {
            self.login_ui(ctx, &mut actions);
        }
        self.dialogs_ui(ctx, &mut actions);
        for action in actions {
            self.perform(ctx, action);
        }

        if self.enable_toasts {
            self.toasts.show(ctx);
        }
    }
}
