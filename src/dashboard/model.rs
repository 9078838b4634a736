use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Declared type of a dataset column.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Numeric,
    Categorical,
    Datetime,
    #[serde(other)]
    Other,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Numeric => "numeric",
            ColumnType::Categorical => "categorical",
            ColumnType::Datetime => "datetime",
            ColumnType::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

/// Dataset metadata as reported by the service.
///
/// The listing endpoint omits `columns_info`; the detail endpoint fills it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dataset {
    pub id: String,
    pub filename: String,
    #[serde(default)]
    pub rows: u64,
    #[serde(default)]
    pub columns: u64,
    #[serde(default)]
    pub columns_info: Vec<ColumnInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_mb: Option<f64>,
}

impl Dataset {
    /// Every column may serve as the X axis.
    pub fn x_axis_candidates(&self) -> Vec<&str> {
        self.columns_info.iter().map(|c| c.name.as_str()).collect()
    }

    /// Only numeric columns may serve as the Y axis.
    pub fn y_axis_candidates(&self) -> Vec<&str> {
        self.columns_info
            .iter()
            .filter(|c| c.column_type == ColumnType::Numeric)
            .map(|c| c.name.as_str())
            .collect()
    }

    pub fn summary(&self) -> String {
        format!("{} rows × {} cols", self.rows, self.columns)
    }
}

/// First rows of a dataset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatasetPreview {
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub data: Vec<Map<String, Value>>,
    #[serde(default)]
    pub total_rows: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    Bar,
    Line,
    Pie,
    Doughnut,
    Scatter,
    Area,
    HorizontalBar,
    Table,
}

impl ChartType {
    pub const ALL: [ChartType; 8] = [
        ChartType::Bar,
        ChartType::Line,
        ChartType::Pie,
        ChartType::Doughnut,
        ChartType::Scatter,
        ChartType::Area,
        ChartType::HorizontalBar,
        ChartType::Table,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::Bar => "bar",
            ChartType::Line => "line",
            ChartType::Pie => "pie",
            ChartType::Doughnut => "doughnut",
            ChartType::Scatter => "scatter",
            ChartType::Area => "area",
            ChartType::HorizontalBar => "horizontal_bar",
            ChartType::Table => "table",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChartType::Bar => "Bar",
            ChartType::Line => "Line",
            ChartType::Pie => "Pie",
            ChartType::Doughnut => "Doughnut",
            ChartType::Scatter => "Scatter",
            ChartType::Area => "Area",
            ChartType::HorizontalBar => "Horizontal Bar",
            ChartType::Table => "Table",
        }
    }

    /// Types whose payload is a `labels`/`values` series.
    pub fn is_categorical(&self) -> bool {
        !matches!(self, ChartType::Scatter | ChartType::Table)
    }

    pub fn is_radial(&self) -> bool {
        matches!(self, ChartType::Pie | ChartType::Doughnut)
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    #[default]
    Sum,
    Mean,
    Count,
    Min,
    Max,
}

impl Aggregation {
    pub const ALL: [Aggregation; 5] = [
        Aggregation::Sum,
        Aggregation::Mean,
        Aggregation::Count,
        Aggregation::Min,
        Aggregation::Max,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregation::Sum => "sum",
            Aggregation::Mean => "mean",
            Aggregation::Count => "count",
            Aggregation::Min => "min",
            Aggregation::Max => "max",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Value,
    Index,
}

fn default_limit() -> u32 {
    50
}

/// User-chosen parameters of a chart widget.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChartSpec {
    pub dataset_id: String,
    pub chart_type: ChartType,
    #[serde(default)]
    pub x_column: Option<String>,
    #[serde(default)]
    pub y_column: Option<String>,
    #[serde(default)]
    pub aggregation: Aggregation,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub sort_by: SortBy,
}

impl ChartSpec {
    pub fn new(dataset_id: impl Into<String>, chart_type: ChartType) -> Self {
        Self {
            dataset_id: dataset_id.into(),
            chart_type,
            x_column: None,
            y_column: None,
            aggregation: Aggregation::default(),
            limit: default_limit(),
            sort_by: SortBy::default(),
        }
    }

    pub fn with_x(mut self, column: impl Into<String>) -> Self {
        self.x_column = Some(column.into());
        self
    }

    pub fn with_y(mut self, column: impl Into<String>) -> Self {
        self.y_column = Some(column.into());
        self
    }

    pub fn with_aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregation = aggregation;
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn x_column(&self) -> Option<&str> {
        self.x_column.as_deref().filter(|c| !c.trim().is_empty())
    }

    pub fn y_column(&self) -> Option<&str> {
        self.y_column.as_deref().filter(|c| !c.trim().is_empty())
    }

    /// Request body for `POST /api/chart/create`.
    pub fn request_body(&self) -> Value {
        serde_json::json!({
            "dataset_id": self.dataset_id,
            "chart_type": self.chart_type,
            "config": {
                "x_column": self.x_column().unwrap_or_default(),
                "y_column": self.y_column().unwrap_or_default(),
                "aggregation": self.aggregation,
                "limit": self.limit,
                "sort_by": self.sort_by,
            }
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoricalData {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_label: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PointData {
    pub data: Vec<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_label: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TableData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
    #[serde(default)]
    pub rows: Vec<Map<String, Value>>,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum EnvelopeError {
    #[error("chart type '{0}' does not accept a categorical series")]
    NotCategorical(ChartType),
    #[error("invalid {chart_type} payload: {reason}")]
    Payload {
        chart_type: ChartType,
        reason: String,
    },
    #[error("labels and values differ in length ({labels} vs {values})")]
    LengthMismatch { labels: usize, values: usize },
}

/// Wire form of an envelope before the payload is checked against its type.
#[derive(Debug, Deserialize)]
pub struct RawEnvelope {
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    pub data: Value,
}

/// Computed chart data returned by the service for a [`ChartSpec`].
///
/// The payload shape always matches the chart type.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawEnvelope")]
pub enum ChartDataEnvelope {
    Categorical {
        chart_type: ChartType,
        data: CategoricalData,
    },
    Scatter(PointData),
    Table(TableData),
}

impl TryFrom<RawEnvelope> for ChartDataEnvelope {
    type Error = EnvelopeError;

    fn try_from(raw: RawEnvelope) -> Result<Self, Self::Error> {
        Self::from_parts(raw.chart_type, raw.data)
    }
}

impl ChartDataEnvelope {
    pub fn categorical(chart_type: ChartType, data: CategoricalData) -> Result<Self, EnvelopeError> {
        if !chart_type.is_categorical() {
            return Err(EnvelopeError::NotCategorical(chart_type));
        }
        if data.labels.len() != data.values.len() {
            return Err(EnvelopeError::LengthMismatch {
                labels: data.labels.len(),
                values: data.values.len(),
            });
        }
        Ok(Self::Categorical { chart_type, data })
    }

    /// Build an envelope from a chart type and its untyped `data` payload.
    pub fn from_parts(chart_type: ChartType, data: Value) -> Result<Self, EnvelopeError> {
        let payload_err = |e: serde_json::Error| EnvelopeError::Payload {
            chart_type,
            reason: e.to_string(),
        };
        match chart_type {
            ChartType::Table => Ok(Self::Table(
                serde_json::from_value(data).map_err(payload_err)?,
            )),
            ChartType::Scatter => Ok(Self::Scatter(
                serde_json::from_value(data).map_err(payload_err)?,
            )),
            _ => Self::categorical(
                chart_type,
                serde_json::from_value(data).map_err(payload_err)?,
            ),
        }
    }

    /// Decode a create-chart response body for a request of type `requested`.
    ///
    /// Table results arrive without the `{type, data}` wrapper.
    pub fn from_response(requested: ChartType, body: Value) -> Result<Self, EnvelopeError> {
        let wrapped = body.get("type").is_some() && body.get("data").is_some();
        if wrapped {
            let raw: RawEnvelope =
                serde_json::from_value(body).map_err(|e| EnvelopeError::Payload {
                    chart_type: requested,
                    reason: e.to_string(),
                })?;
            Self::try_from(raw)
        } else {
            Self::from_parts(requested, body)
        }
    }

    pub fn chart_type(&self) -> ChartType {
        match self {
            Self::Categorical { chart_type, .. } => *chart_type,
            Self::Scatter(_) => ChartType::Scatter,
            Self::Table(_) => ChartType::Table,
        }
    }
}

/// Cell geometry of a grid node, in grid units.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct GridPosition {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl GridPosition {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.w)
    }

    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.h)
    }

    pub fn overlaps(&self, other: &GridPosition) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Identifier of a live widget, `widget-N`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WidgetId(String);

impl WidgetId {
    pub fn from_counter(n: u64) -> Self {
        Self(format!("widget-{n}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WidgetId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One persisted grid node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LayoutItem {
    pub id: WidgetId,
    #[serde(flatten)]
    pub position: GridPosition,
    /// Originating chart parameters, needed to restore the widget.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<ChartSpec>,
}

/// Named layout snapshot sent to `/api/dashboard/save`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DashboardLayout {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub layout: Vec<LayoutItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn edges_saturate_on_huge_positions() {
        let huge = GridPosition::new(u32::MAX, u32::MAX, 4, u32::MAX);
        assert_eq!(huge.right(), u32::MAX);
        assert_eq!(huge.bottom(), u32::MAX);
        assert!(!huge.overlaps(&GridPosition::new(0, 0, 4, 4)));
    }

    #[test]
    fn y_candidates_are_numeric_only() {
        let ds: Dataset = serde_json::from_value(json!({
            "id": "d1",
            "filename": "people.csv",
            "rows": 2,
            "columns": 2,
            "columns_info": [
                {"name": "age", "type": "numeric"},
                {"name": "city", "type": "categorical"}
            ]
        }))
        .unwrap();
        assert_eq!(ds.y_axis_candidates(), vec!["age"]);
        assert_eq!(ds.x_axis_candidates(), vec!["age", "city"]);
    }

    #[test]
    fn unknown_column_type_maps_to_other() {
        let col: ColumnInfo =
            serde_json::from_value(json!({"name": "flag", "type": "boolean"})).unwrap();
        assert_eq!(col.column_type, ColumnType::Other);
    }

    #[test]
    fn request_body_nests_config() {
        let spec = ChartSpec::new("d1", ChartType::HorizontalBar)
            .with_x("city")
            .with_y("age")
            .with_limit(10);
        let body = spec.request_body();
        assert_eq!(body["chart_type"], "horizontal_bar");
        assert_eq!(body["config"]["x_column"], "city");
        assert_eq!(body["config"]["aggregation"], "sum");
        assert_eq!(body["config"]["limit"], 10);
    }

    #[test]
    fn envelope_rejects_mismatched_payload() {
        let err = ChartDataEnvelope::from_parts(ChartType::Bar, json!({"data": []})).unwrap_err();
        assert!(matches!(err, EnvelopeError::Payload { .. }));
        let err = ChartDataEnvelope::from_parts(
            ChartType::Pie,
            json!({"labels": ["a", "b"], "values": [1.0]}),
        )
        .unwrap_err();
        assert_eq!(err, EnvelopeError::LengthMismatch { labels: 2, values: 1 });
    }

    #[test]
    fn unwrapped_table_response_decodes() {
        let body = json!({"columns": ["a"], "rows": [{"a": 1}]});
        let env = ChartDataEnvelope::from_response(ChartType::Table, body).unwrap();
        assert_eq!(env.chart_type(), ChartType::Table);
    }

    #[test]
    fn layout_item_flattens_position() {
        let item = LayoutItem {
            id: WidgetId::from_counter(3),
            position: GridPosition::new(0, 4, 6, 4),
            spec: None,
        };
        let v = serde_json::to_value(&item).unwrap();
        assert_eq!(v, json!({"id": "widget-3", "x": 0, "y": 4, "w": 6, "h": 4}));
    }
}
