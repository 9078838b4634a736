use serde::{Deserialize, Serialize};

fn default_columns() -> u32 {
    12
}

fn default_cell_height() -> f32 {
    80.0
}

fn default_float() -> bool {
    true
}

fn default_widget_w() -> u32 {
    6
}

fn default_widget_h() -> u32 {
    4
}

fn default_limit() -> u32 {
    10
}

fn default_dashboard_name() -> String {
    "My Dashboard".into()
}

/// Grid definition for the dashboard layout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GridConfig {
    #[serde(default = "default_columns")]
    pub columns: u32,
    /// Height of one grid row in points.
    #[serde(default = "default_cell_height")]
    pub cell_height: f32,
    /// When disabled, widgets are pulled upward to close vertical gaps after
    /// every removal or move. When enabled, they stay where they were placed.
    #[serde(default = "default_float")]
    pub float: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: default_columns(),
            cell_height: default_cell_height(),
            float: default_float(),
        }
    }
}

/// Size given to newly created widgets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WidgetSize {
    #[serde(default = "default_widget_w")]
    pub w: u32,
    #[serde(default = "default_widget_h")]
    pub h: u32,
}

impl Default for WidgetSize {
    fn default() -> Self {
        Self {
            w: default_widget_w(),
            h: default_widget_h(),
        }
    }
}

/// Dashboard section of the application settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardConfig {
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub widget_size: WidgetSize,
    /// Row limit prefilled in the chart form.
    #[serde(default = "default_limit")]
    pub default_limit: u32,
    /// Name prefilled when saving a dashboard.
    #[serde(default = "default_dashboard_name")]
    pub default_name: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            widget_size: WidgetSize::default(),
            default_limit: default_limit(),
            default_name: default_dashboard_name(),
        }
    }
}

impl DashboardConfig {
    /// Clamp values the grid cannot honour. Returns one warning per fix.
    pub fn sanitize(&mut self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.grid.columns == 0 {
            warnings.push("grid columns must be at least 1; using 12".into());
            self.grid.columns = default_columns();
        }
        if self.widget_size.w == 0 || self.widget_size.w > self.grid.columns {
            let w = self.widget_size.w.clamp(1, self.grid.columns);
            warnings.push(format!(
                "widget width {} does not fit a {}-column grid; using {}",
                self.widget_size.w, self.grid.columns, w
            ));
            self.widget_size.w = w;
        }
        if self.widget_size.h == 0 {
            warnings.push("widget height must be at least 1".into());
            self.widget_size.h = 1;
        }
        if self.default_limit == 0 {
            warnings.push("default limit must be positive; using 10".into());
            self.default_limit = default_limit();
        }
        if !(self.grid.cell_height > 0.0) {
            warnings.push("cell height must be positive; using 80".into());
            self.grid.cell_height = default_cell_height();
        }
        for w in &warnings {
            tracing::warn!("{w}");
        }
        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let cfg: DashboardConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, DashboardConfig::default());
        assert_eq!(cfg.grid.columns, 12);
        assert_eq!(cfg.widget_size, WidgetSize { w: 6, h: 4 });
    }

    #[test]
    fn sanitize_clamps_oversized_widget() {
        let mut cfg = DashboardConfig {
            grid: GridConfig {
                columns: 4,
                ..GridConfig::default()
            },
            ..DashboardConfig::default()
        };
        let warnings = cfg.sanitize();
        assert_eq!(cfg.widget_size.w, 4);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn sanitize_repairs_zero_columns() {
        let mut cfg = DashboardConfig::default();
        cfg.grid.columns = 0;
        cfg.default_limit = 0;
        let warnings = cfg.sanitize();
        assert_eq!(cfg.grid.columns, 12);
        assert_eq!(cfg.default_limit, 10);
        assert_eq!(warnings.len(), 2);
    }
}
