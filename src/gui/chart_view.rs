//! Paints a [`RenderConfig`] with egui primitives.

use crate::dashboard::render::{
    ChartConfig, ChartKind, ColorSpec, Rgba, SeriesData, TableView,
};
use crate::dashboard::RenderConfig;
use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, Sense, Shape, Stroke, Vec2};
use egui_extras::{Column, TableBuilder};
use std::f32::consts::TAU;

const AXIS_MARGIN: f32 = 28.0;
const LEGEND_WIDTH: f32 = 110.0;

pub fn color32(c: Rgba) -> Color32 {
    let alpha = (c.a.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgba_unmultiplied(c.r, c.g, c.b, alpha)
}

/// Draw `config` into the remaining space of `ui`.
pub fn show(ui: &mut egui::Ui, id_salt: &str, config: &RenderConfig) {
    match config {
        RenderConfig::Chart(chart) => paint_chart(ui, chart),
        RenderConfig::Table(table) => {
            ui.push_id(id_salt, |ui| table_ui(ui, table));
        }
        RenderConfig::Empty => {
            ui.centered_and_justified(|ui| {
                ui.weak("No data");
            });
        }
    }
}

pub fn table_ui(ui: &mut egui::Ui, table: &TableView) {
    egui::ScrollArea::horizontal().show(ui, |ui| {
        TableBuilder::new(ui)
            .striped(true)
            .columns(Column::auto().resizable(true), table.columns.len())
            .header(20.0, |mut header| {
                for col in &table.columns {
                    header.col(|ui| {
                        ui.strong(col);
                    });
                }
            })
            .body(|mut body| {
                for row in &table.rows {
                    body.row(18.0, |mut cells| {
                        for cell in row {
                            cells.col(|ui| {
                                ui.label(cell);
                            });
                        }
                    });
                }
            });
    });
}

fn paint_chart(ui: &mut egui::Ui, chart: &ChartConfig) {
    let (rect, _) = ui.allocate_exact_size(ui.available_size(), Sense::hover());
    let Some(series) = chart.data.datasets.first() else {
        return;
    };
    let painter = ui.painter_at(rect);
    let text_color = ui.visuals().text_color();
    match (&series.data, chart.kind) {
        (SeriesData::Values(values), ChartKind::Pie | ChartKind::Doughnut) => {
            let plot = if chart.legend_visible() {
                let legend = Rect::from_min_max(
                    Pos2::new(rect.max.x - LEGEND_WIDTH, rect.min.y),
                    rect.max,
                );
                paint_legend(&painter, legend, &chart.data.labels, &series.background_color, text_color);
                Rect::from_min_max(rect.min, Pos2::new(rect.max.x - LEGEND_WIDTH, rect.max.y))
            } else {
                rect
            };
            let hole = if chart.kind == ChartKind::Doughnut { 0.5 } else { 0.0 };
            paint_radial(&painter, plot, values, &series.background_color, hole, ui.visuals().panel_fill);
        }
        (SeriesData::Values(values), ChartKind::Line) => {
            let plot = rect.shrink(AXIS_MARGIN / 2.0);
            let fill = series.fill.unwrap_or(false);
            paint_line(&painter, plot, values, series.border_color.at(0), series.background_color.at(0), fill);
            paint_category_labels(&painter, plot, &chart.data.labels, false, text_color);
        }
        (SeriesData::Values(values), _) => {
            let plot = rect.shrink(AXIS_MARGIN / 2.0);
            paint_bars(&painter, plot, values, &series.background_color, chart.is_horizontal());
            paint_category_labels(&painter, plot, &chart.data.labels, chart.is_horizontal(), text_color);
        }
        (SeriesData::Points(points), _) => {
            let plot = rect.shrink(AXIS_MARGIN / 2.0);
            let coords: Vec<(f64, f64)> = points.iter().map(|p| (p.x, p.y)).collect();
            paint_scatter(&painter, plot, &coords, series.background_color.at(0));
            if let Some(scales) = &chart.options.scales {
                painter.text(
                    Pos2::new(plot.center().x, rect.max.y),
                    Align2::CENTER_BOTTOM,
                    &scales.x.title.text,
                    FontId::proportional(11.0),
                    text_color,
                );
                painter.text(
                    Pos2::new(rect.min.x, plot.min.y),
                    Align2::LEFT_TOP,
                    &scales.y.title.text,
                    FontId::proportional(11.0),
                    text_color,
                );
            }
        }
    }
}

/// Value range always including zero so bars grow from a baseline.
fn value_range(values: &[f64]) -> (f64, f64) {
    let min = values.iter().cloned().fold(0.0_f64, f64::min);
    let max = values.iter().cloned().fold(0.0_f64, f64::max);
    if (max - min).abs() < f64::EPSILON {
        (min, min + 1.0)
    } else {
        (min, max)
    }
}

fn scale(value: f64, (min, max): (f64, f64), from: f32, to: f32) -> f32 {
    let t = ((value - min) / (max - min)) as f32;
    from + (to - from) * t
}

fn paint_bars(
    painter: &egui::Painter,
    plot: Rect,
    values: &[f64],
    colors: &ColorSpec,
    horizontal: bool,
) {
    if values.is_empty() {
        return;
    }
    let range = value_range(values);
    let slot = if horizontal {
        plot.height() / values.len() as f32
    } else {
        plot.width() / values.len() as f32
    };
    let gap = slot * 0.15;
    for (i, value) in values.iter().enumerate() {
        let start = i as f32 * slot + gap;
        let end = (i + 1) as f32 * slot - gap;
        let bar = if horizontal {
            let zero = scale(0.0, range, plot.min.x, plot.max.x);
            let tip = scale(*value, range, plot.min.x, plot.max.x);
            Rect::from_x_y_ranges(zero.min(tip)..=zero.max(tip), plot.min.y + start..=plot.min.y + end)
        } else {
            let zero = scale(0.0, range, plot.max.y, plot.min.y);
            let tip = scale(*value, range, plot.max.y, plot.min.y);
            Rect::from_x_y_ranges(plot.min.x + start..=plot.min.x + end, zero.min(tip)..=zero.max(tip))
        };
        painter.rect_filled(bar, 2.0, color32(colors.at(i)));
    }
}

fn paint_line(
    painter: &egui::Painter,
    plot: Rect,
    values: &[f64],
    stroke: Rgba,
    fill: Rgba,
    filled: bool,
) {
    if values.is_empty() {
        return;
    }
    let range = value_range(values);
    let step = if values.len() > 1 {
        plot.width() / (values.len() - 1) as f32
    } else {
        0.0
    };
    let points: Vec<Pos2> = values
        .iter()
        .enumerate()
        .map(|(i, v)| Pos2::new(plot.min.x + i as f32 * step, scale(*v, range, plot.max.y, plot.min.y)))
        .collect();
    if filled {
        let base = scale(0.0, range, plot.max.y, plot.min.y);
        for pair in points.windows(2) {
            let quad = vec![
                pair[0],
                pair[1],
                Pos2::new(pair[1].x, base),
                Pos2::new(pair[0].x, base),
            ];
            painter.add(Shape::convex_polygon(quad, color32(fill), Stroke::NONE));
        }
    }
    painter.add(Shape::line(points.clone(), Stroke::new(2.0, color32(stroke))));
    for p in points {
        painter.circle_filled(p, 2.5, color32(stroke));
    }
}

fn paint_scatter(painter: &egui::Painter, plot: Rect, points: &[(f64, f64)], color: Rgba) {
    if points.is_empty() {
        return;
    }
    let xs: Vec<f64> = points.iter().map(|p| p.0).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.1).collect();
    let x_range = span(&xs);
    let y_range = span(&ys);
    painter.line_segment(
        [plot.left_bottom(), plot.right_bottom()],
        Stroke::new(1.0, Color32::GRAY),
    );
    painter.line_segment([plot.left_top(), plot.left_bottom()], Stroke::new(1.0, Color32::GRAY));
    for (x, y) in points {
        let pos = Pos2::new(
            scale(*x, x_range, plot.min.x, plot.max.x),
            scale(*y, y_range, plot.max.y, plot.min.y),
        );
        painter.circle_filled(pos, 3.0, color32(color));
    }
}

fn span(values: &[f64]) -> (f64, f64) {
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if (max - min).abs() < f64::EPSILON {
        (min - 0.5, max + 0.5)
    } else {
        (min, max)
    }
}

fn paint_radial(
    painter: &egui::Painter,
    plot: Rect,
    values: &[f64],
    colors: &ColorSpec,
    hole: f32,
    background: Color32,
) {
    let total: f64 = values.iter().filter(|v| **v > 0.0).sum();
    if total <= 0.0 {
        return;
    }
    let center = plot.center();
    let radius = plot.width().min(plot.height()) * 0.45;
    let mut start = -TAU / 4.0;
    for (i, value) in values.iter().enumerate() {
        if *value <= 0.0 {
            continue;
        }
        let sweep = (*value / total) as f32 * TAU;
        // Convex pieces stay under a quarter turn.
        let pieces = (sweep / (TAU / 4.0)).ceil().max(1.0) as usize;
        let color = color32(colors.at(i));
        for piece in 0..pieces {
            let a0 = start + sweep * piece as f32 / pieces as f32;
            let a1 = start + sweep * (piece + 1) as f32 / pieces as f32;
            let mut poly = vec![center];
            let steps = 12;
            for s in 0..=steps {
                let a = a0 + (a1 - a0) * s as f32 / steps as f32;
                poly.push(center + radius * Vec2::angled(a));
            }
            painter.add(Shape::convex_polygon(poly, color, Stroke::NONE));
        }
        start += sweep;
    }
    if hole > 0.0 {
        painter.circle_filled(center, radius * hole, background);
    }
}

fn paint_legend(
    painter: &egui::Painter,
    area: Rect,
    labels: &[String],
    colors: &ColorSpec,
    text_color: Color32,
) {
    let mut y = area.min.y + 8.0;
    for (i, label) in labels.iter().enumerate() {
        if y + 14.0 > area.max.y {
            break;
        }
        let swatch = Rect::from_min_size(Pos2::new(area.min.x + 4.0, y), Vec2::splat(10.0));
        painter.rect_filled(swatch, 2.0, color32(colors.at(i)));
        painter.text(
            Pos2::new(swatch.max.x + 6.0, y + 5.0),
            Align2::LEFT_CENTER,
            label,
            FontId::proportional(11.0),
            text_color,
        );
        y += 16.0;
    }
}

fn paint_category_labels(
    painter: &egui::Painter,
    plot: Rect,
    labels: &[String],
    horizontal: bool,
    text_color: Color32,
) {
    if labels.is_empty() {
        return;
    }
    let slot = if horizontal {
        plot.height() / labels.len() as f32
    } else {
        plot.width() / labels.len() as f32
    };
    // Skip labels that would collide.
    let every = ((40.0 / slot).ceil() as usize).max(1);
    for (i, label) in labels.iter().enumerate().step_by(every) {
        let mid = (i as f32 + 0.5) * slot;
        let (pos, align) = if horizontal {
            (Pos2::new(plot.min.x + 2.0, plot.min.y + mid), Align2::LEFT_CENTER)
        } else {
            (Pos2::new(plot.min.x + mid, plot.max.y + 2.0), Align2::CENTER_TOP)
        };
        painter.text(pos, align, label, FontId::proportional(10.0), text_color);
    }
}
