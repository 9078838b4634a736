pub mod config;
pub mod dashboard;
pub mod datasets;
pub mod layout;
pub mod model;
pub mod render;
pub mod widgets;

pub use dashboard::{
    validate_spec, Dashboard, DashboardError, DashboardEvent, EventCallback, PendingChart,
    PendingRestore, RestoreReport, ValidationError,
};
pub use datasets::{DatasetError, DatasetRegistry};
pub use render::{to_render_config, RenderConfig};
pub use widgets::{Widget, WidgetRegistry, WidgetState};
