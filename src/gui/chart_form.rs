use crate::app::{ChartForm, UserAction};
use crate::dashboard::model::{Aggregation, ChartType, Dataset, SortBy};
use eframe::egui;

/// Draw the chart configuration window and return the action it produced.
pub fn chart_form_ui(
    ctx: &egui::Context,
    form: &mut ChartForm,
    datasets: &[Dataset],
    creating: bool,
) -> Option<UserAction> {
    let mut action = None;
    let mut open = true;
    egui::Window::new(format!("Add {} Chart", form.chart_type.label()))
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .open(&mut open)
        .show(ctx, |ui| {
            egui::Grid::new("chart_form_grid")
                .num_columns(2)
                .spacing([12.0, 6.0])
                .show(ui, |ui| {
                    ui.label("Dataset");
                    let current = datasets
                        .iter()
                        .find(|d| d.id == form.dataset_id)
                        .map(|d| d.filename.as_str())
                        .unwrap_or("Select a dataset");
                    egui::ComboBox::from_id_source("chart_form_dataset")
                        .selected_text(current)
                        .show_ui(ui, |ui| {
                            for d in datasets {
                                if ui
                                    .selectable_label(d.id == form.dataset_id, &d.filename)
                                    .clicked()
                                    && d.id != form.dataset_id
                                {
                                    action = Some(UserAction::LoadColumns(d.id.clone()));
                                }
                            }
                        });
                    ui.end_row();

                    let dataset = datasets.iter().find(|d| d.id == form.dataset_id);
                    let x_options = dataset.map(Dataset::x_axis_candidates).unwrap_or_default();
                    let y_options = dataset.map(Dataset::y_axis_candidates).unwrap_or_default();

                    if form.chart_type != ChartType::Table {
                        ui.label("X axis");
                        column_combo(ui, "chart_form_x", &mut form.x_column, &x_options, "Select column");
                        ui.end_row();

                        ui.label("Y axis");
                        column_combo(ui, "chart_form_y", &mut form.y_column, &y_options, "Count rows");
                        ui.end_row();

                        ui.label("Aggregation");
                        egui::ComboBox::from_id_source("chart_form_agg")
                            .selected_text(form.aggregation.as_str())
                            .show_ui(ui, |ui| {
                                for agg in Aggregation::ALL {
                                    ui.selectable_value(&mut form.aggregation, agg, agg.as_str());
                                }
                            });
                        ui.end_row();

                        ui.label("Sort by");
                        ui.horizontal(|ui| {
                            ui.radio_value(&mut form.sort_by, SortBy::Value, "value");
                            ui.radio_value(&mut form.sort_by, SortBy::Index, "label");
                        });
                        ui.end_row();
                    }

                    ui.label("Limit");
                    ui.add(egui::DragValue::new(&mut form.limit).clamp_range(1..=10_000));
                    ui.end_row();
                });
            ui.separator();
            ui.horizontal(|ui| {
                let create = ui.add_enabled(!creating, egui::Button::new("Create"));
                if create.clicked() {
                    action = Some(UserAction::CreateChart(form.to_spec()));
                }
                if creating {
                    ui.spinner();
                }
                if ui.button("Cancel").clicked() {
                    action = Some(UserAction::CloseChartForm);
                }
            });
        });
    if !open {
        action = Some(UserAction::CloseChartForm);
    }
    action
}

fn column_combo(ui: &mut egui::Ui, id: &str, value: &mut String, options: &[&str], empty: &str) {
    let text = if value.is_empty() { empty } else { value.as_str() }.to_string();
    egui::ComboBox::from_id_source(id)
        .selected_text(text)
        .show_ui(ui, |ui| {
            if ui.selectable_label(value.is_empty(), empty).clicked() {
                value.clear();
            }
            for opt in options {
                if ui.selectable_label(value.as_str() == *opt, *opt).clicked() {
                    *value = opt.to_string();
                }
            }
        });
}
