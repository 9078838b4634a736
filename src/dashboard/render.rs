//! Translation of chart-data envelopes into declarative chart configuration.
//!
//! The output serializes to the JSON shape accepted by Chart.js
//! (`{type, data: {labels, datasets}, options}`) and is also what the egui
//! shell paints from.

use crate::dashboard::model::{
    CategoricalData, ChartDataEnvelope, ChartType, DatasetPreview, Point, PointData, TableData,
};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// RGBA color with 8-bit channels and a fractional alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn opaque(self) -> Self {
        self.with_alpha(1.0)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

impl Serialize for Rgba {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

pub const FILL_ALPHA: f32 = 0.7;

pub const BASE_COLORS: [Rgba; 8] = [
    Rgba::new(102, 126, 234, FILL_ALPHA),
    Rgba::new(118, 75, 162, FILL_ALPHA),
    Rgba::new(237, 100, 166, FILL_ALPHA),
    Rgba::new(255, 154, 158, FILL_ALPHA),
    Rgba::new(250, 208, 196, FILL_ALPHA),
    Rgba::new(156, 207, 216, FILL_ALPHA),
    Rgba::new(102, 187, 106, FILL_ALPHA),
    Rgba::new(255, 202, 40, FILL_ALPHA),
];

const PRIMARY: Rgba = BASE_COLORS[0];

/// `count` colors cycling through [`BASE_COLORS`].
pub fn palette(count: usize) -> Vec<Rgba> {
    (0..count).map(|i| BASE_COLORS[i % BASE_COLORS.len()]).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColorSpec {
    Uniform(Rgba),
    PerPoint(Vec<Rgba>),
}

impl ColorSpec {
    /// Color of the point at `index`.
    pub fn at(&self, index: usize) -> Rgba {
        match self {
            ColorSpec::Uniform(c) => *c,
            ColorSpec::PerPoint(colors) if !colors.is_empty() => colors[index % colors.len()],
            ColorSpec::PerPoint(_) => PRIMARY,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColorSpec::Uniform(_) => 1,
            ColorSpec::PerPoint(colors) => colors.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SeriesData {
    Values(Vec<f64>),
    Points(Vec<Point>),
}

impl SeriesData {
    pub fn len(&self) -> usize {
        match self {
            SeriesData::Values(v) => v.len(),
            SeriesData::Points(p) => p.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    pub label: String,
    pub data: SeriesData,
    pub background_color: ColorSpec,
    pub border_color: ColorSpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<bool>,
}

/// Chart kinds understood by the charting layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
    Pie,
    Doughnut,
    Scatter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexAxis {
    X,
    Y,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LegendPosition {
    Top,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub display: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<LegendPosition>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plugins {
    pub legend: Legend,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisTitle {
    pub display: bool,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub title: AxisTitle,
}

impl Axis {
    fn titled(text: Option<&str>) -> Self {
        Self {
            title: AxisTitle {
                display: true,
                text: text.unwrap_or_default().to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scales {
    pub x: Axis,
    pub y: Axis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOptions {
    pub responsive: bool,
    pub maintain_aspect_ratio: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_axis: Option<IndexAxis>,
    pub plugins: Plugins,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scales: Option<Scales>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartBody {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    pub datasets: Vec<Series>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartConfig {
    #[serde(rename = "type")]
    pub kind: ChartKind,
    pub data: ChartBody,
    pub options: ChartOptions,
}

impl ChartConfig {
    pub fn legend_visible(&self) -> bool {
        self.options.plugins.legend.display
    }

    pub fn is_horizontal(&self) -> bool {
        self.options.index_axis == Some(IndexAxis::Y)
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Tabular view of a table envelope with every cell already formatted.
#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableView {
    pub fn to_html(&self) -> String {
        let mut html = String::from("<table><thead><tr>");
        for col in &self.columns {
            html.push_str("<th>");
            html.push_str(&escape_html(col));
            html.push_str("</th>");
        }
        html.push_str("</tr></thead><tbody>");
        for row in &self.rows {
            html.push_str("<tr>");
            for cell in row {
                html.push_str("<td>");
                html.push_str(&escape_html(cell));
                html.push_str("</td>");
            }
            html.push_str("</tr>");
        }
        html.push_str("</tbody></table>");
        html
    }

    /// Preview rows laid out under the columns the service listed.
    pub fn from_preview(preview: &DatasetPreview) -> Self {
        let rows = preview
            .data
            .iter()
            .map(|row| {
                preview
                    .columns
                    .iter()
                    .map(|col| format_cell(row.get(col)))
                    .collect()
            })
            .collect();
        Self {
            columns: preview.columns.clone(),
            rows,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderConfig {
    Chart(ChartConfig),
    Table(TableView),
    /// Nothing to draw, e.g. a table without rows.
    Empty,
}

pub fn to_render_config(envelope: &ChartDataEnvelope) -> RenderConfig {
    match envelope {
        ChartDataEnvelope::Table(table) => match table_view(table) {
            Some(view) => RenderConfig::Table(view),
            None => RenderConfig::Empty,
        },
        ChartDataEnvelope::Scatter(points) => RenderConfig::Chart(scatter_config(points)),
        ChartDataEnvelope::Categorical { chart_type, data } => {
            RenderConfig::Chart(categorical_config(*chart_type, data))
        }
    }
}

fn base_options(legend: Legend) -> ChartOptions {
    ChartOptions {
        responsive: true,
        maintain_aspect_ratio: false,
        index_axis: None,
        plugins: Plugins { legend },
        scales: None,
    }
}

fn hidden_legend() -> Legend {
    Legend {
        display: false,
        position: None,
    }
}

fn scatter_config(points: &PointData) -> ChartConfig {
    let mut options = base_options(hidden_legend());
    options.scales = Some(Scales {
        x: Axis::titled(points.x_label.as_deref()),
        y: Axis::titled(points.y_label.as_deref()),
    });
    ChartConfig {
        kind: ChartKind::Scatter,
        data: ChartBody {
            labels: Vec::new(),
            datasets: vec![Series {
                label: "Data Points".into(),
                data: SeriesData::Points(points.data.clone()),
                background_color: ColorSpec::Uniform(PRIMARY.with_alpha(0.5)),
                border_color: ColorSpec::Uniform(PRIMARY.opaque()),
                border_width: None,
                fill: None,
            }],
        },
        options,
    }
}

fn categorical_config(chart_type: ChartType, data: &CategoricalData) -> ChartConfig {
    let radial = chart_type.is_radial();
    let (background_color, border_color) = if radial {
        let colors = palette(data.labels.len());
        let borders = colors.iter().map(|c| c.opaque()).collect();
        (ColorSpec::PerPoint(colors), ColorSpec::PerPoint(borders))
    } else {
        (
            ColorSpec::Uniform(PRIMARY),
            ColorSpec::Uniform(PRIMARY.opaque()),
        )
    };
    let kind = match chart_type {
        ChartType::Line | ChartType::Area => ChartKind::Line,
        ChartType::Pie => ChartKind::Pie,
        ChartType::Doughnut => ChartKind::Doughnut,
        _ => ChartKind::Bar,
    };
    let legend = if radial {
        Legend {
            display: true,
            position: Some(LegendPosition::Right),
        }
    } else {
        hidden_legend()
    };
    let mut options = base_options(legend);
    options.index_axis = Some(if chart_type == ChartType::HorizontalBar {
        IndexAxis::Y
    } else {
        IndexAxis::X
    });
    ChartConfig {
        kind,
        data: ChartBody {
            labels: data.labels.clone(),
            datasets: vec![Series {
                label: data
                    .y_label
                    .clone()
                    .filter(|l| !l.is_empty())
                    .unwrap_or_else(|| "Value".into()),
                data: SeriesData::Values(data.values.clone()),
                background_color,
                border_color,
                border_width: Some(2),
                fill: Some(chart_type == ChartType::Area),
            }],
        },
        options,
    }
}

fn table_view(table: &TableData) -> Option<TableView> {
    let first = table.rows.first()?;
    let columns = table
        .columns
        .clone()
        .unwrap_or_else(|| first.keys().cloned().collect());
    let rows = table
        .rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|col| format_cell(row.get(col)))
                .collect()
        })
        .collect();
    Some(TableView { columns, rows })
}

fn format_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
