use crate::api::{ApiClient, ApiError};
use crate::dashboard::config::DashboardConfig;
use crate::dashboard::layout::{GridLayout, GridNode, LayoutError};
use crate::dashboard::model::{
    ChartDataEnvelope, ChartSpec, ChartType, DashboardLayout, GridPosition, LayoutItem, WidgetId,
};
use crate::dashboard::widgets::{Widget, WidgetRegistry};
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DashboardEvent {
    WidgetAdded(WidgetId),
    WidgetRemoved(WidgetId),
    /// The last widget is gone; the UI shows its empty state.
    Emptied,
    Restored { restored: usize, skipped: usize },
}

pub type EventCallback = Arc<dyn Fn(DashboardEvent) + Send + Sync>;

/// Input problems caught before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please select a dataset")]
    MissingDataset,
    #[error("Please select a dataset first!")]
    NoDatasetSelected,
    #[error("Please select X-axis column")]
    MissingXColumn,
    #[error("Limit must be greater than zero")]
    InvalidLimit,
    #[error("Only CSV files are supported")]
    UnsupportedFile,
}

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("widget '{0}' not found")]
    NotFound(WidgetId),
    #[error("a chart request is already in progress")]
    InFlight,
    #[error("the dashboard changed before the response arrived")]
    Superseded,
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// Checks applied to a chart spec before it is sent.
pub fn validate_spec(spec: &ChartSpec) -> Result<(), ValidationError> {
    if spec.dataset_id.trim().is_empty() {
        return Err(ValidationError::MissingDataset);
    }
    if spec.chart_type != ChartType::Table && spec.x_column().is_none() {
        return Err(ValidationError::MissingXColumn);
    }
    if spec.limit == 0 {
        return Err(ValidationError::InvalidLimit);
    }
    Ok(())
}

/// A validated chart request awaiting its response.
#[derive(Debug, Clone)]
pub struct PendingChart {
    token: u64,
    generation: u64,
    spec: ChartSpec,
}

impl PendingChart {
    pub fn spec(&self) -> &ChartSpec {
        &self.spec
    }

    pub fn fetch(&self, api: &dyn ApiClient) -> Result<ChartDataEnvelope, ApiError> {
        api.create_chart(&self.spec)
    }
}

/// A restore that has cleared the board and waits for chart data.
#[derive(Debug, Clone)]
pub struct PendingRestore {
    generation: u64,
    layout: DashboardLayout,
}

impl PendingRestore {
    pub fn layout(&self) -> &DashboardLayout {
        &self.layout
    }

    /// Re-run every saved chart spec. Items without a spec are carried
    /// through unfetched.
    pub fn fetch(self, api: &dyn ApiClient) -> FetchedRestore {
        let items = self
            .layout
            .layout
            .iter()
            .map(|item| {
                let result = item.spec.as_ref().map(|spec| api.create_chart(spec));
                (item.clone(), result)
            })
            .collect();
        FetchedRestore {
            generation: self.generation,
            name: self.layout.name,
            items,
        }
    }
}

#[derive(Debug)]
pub struct FetchedRestore {
    generation: u64,
    name: String,
    items: Vec<(LayoutItem, Option<Result<ChartDataEnvelope, ApiError>>)>,
}

#[derive(Debug, Default, PartialEq)]
pub struct RestoreReport {
    pub name: String,
    pub restored: Vec<WidgetId>,
    /// Saved id and the reason it was not restored.
    pub skipped: Vec<(WidgetId, String)>,
}

/// Widget registry and grid layout kept in lockstep.
///
/// Every widget id in the registry has exactly one grid node and every grid
/// node belongs to a registered widget.
pub struct Dashboard {
    config: DashboardConfig,
    layout: GridLayout,
    registry: WidgetRegistry,
    generation: u64,
    next_token: u64,
    pending_create: Option<u64>,
    render_queue: Vec<WidgetId>,
    event_cb: Option<EventCallback>,
}

impl Dashboard {
    pub fn new(config: DashboardConfig, event_cb: Option<EventCallback>) -> Self {
        let layout = GridLayout::new(&config.grid);
        Self {
            config,
            layout,
            registry: WidgetRegistry::default(),
            generation: 0,
            next_token: 0,
            pending_create: None,
            render_queue: Vec::new(),
            event_cb,
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn widget(&self, id: &WidgetId) -> Option<&Widget> {
        self.registry.get(id)
    }

    pub fn position(&self, id: &WidgetId) -> Option<GridPosition> {
        self.layout.node(id).map(|n| n.position)
    }

    pub fn grid(&self) -> &GridLayout {
        &self.layout
    }

    /// Grid nodes paired with their widgets, in insertion order.
    pub fn widgets(&self) -> impl Iterator<Item = (&GridNode, &Widget)> {
        self.layout
            .nodes()
            .iter()
            .filter_map(|node| self.registry.get(&node.id).map(|w| (node, w)))
    }

    pub fn create_in_flight(&self) -> bool {
        self.pending_create.is_some()
    }

    /// Validate `spec` and reserve the single create slot.
    pub fn begin_create(&mut self, spec: ChartSpec) -> Result<PendingChart, DashboardError> {
        validate_spec(&spec)?;
        if self.pending_create.is_some() {
            return Err(DashboardError::InFlight);
        }
        self.next_token += 1;
        self.pending_create = Some(self.next_token);
        Ok(PendingChart {
            token: self.next_token,
            generation: self.generation,
            spec,
        })
    }

    /// Apply the response of a [`PendingChart`]. A failed request leaves no
    /// widget behind; a response for a superseded request is dropped.
    pub fn finish_create(
        &mut self,
        pending: PendingChart,
        result: Result<ChartDataEnvelope, ApiError>,
    ) -> Result<WidgetId, DashboardError> {
        let owned = self.pending_create == Some(pending.token);
        if owned {
            self.pending_create = None;
        }
        if !owned || pending.generation != self.generation {
            tracing::info!(token = pending.token, "dropping stale chart response");
            return Err(DashboardError::Superseded);
        }
        let envelope = result?;
        self.insert_widget(pending.spec, envelope, None)
    }

    pub fn create_widget(
        &mut self,
        spec: ChartSpec,
        api: &dyn ApiClient,
    ) -> Result<WidgetId, DashboardError> {
        let pending = self.begin_create(spec)?;
        let result = pending.fetch(api);
        self.finish_create(pending, result)
    }

    fn insert_widget(
        &mut self,
        spec: ChartSpec,
        envelope: ChartDataEnvelope,
        at: Option<GridPosition>,
    ) -> Result<WidgetId, DashboardError> {
        let id = self.registry.allocate_id();
        let size = self.config.widget_size;
        match at {
            Some(position) => self.layout.add_at(id.clone(), position)?,
            None => self.layout.add(id.clone(), size.w, size.h)?,
        };
        self.registry.insert(Widget::new(id.clone(), spec, envelope));
        self.render_queue.push(id.clone());
        debug_assert!(self.is_consistent());
        tracing::info!(widget = %id, "widget created");
        self.emit(DashboardEvent::WidgetAdded(id.clone()));
        Ok(id)
    }

    pub fn remove_widget(&mut self, id: &WidgetId) -> Result<(), DashboardError> {
        if !self.registry.contains(id) || self.layout.remove(id).is_none() {
            return Err(DashboardError::NotFound(id.clone()));
        }
        self.registry.remove(id);
        self.render_queue.retain(|queued| queued != id);
        debug_assert!(self.is_consistent());
        tracing::info!(widget = %id, "widget removed");
        self.emit(DashboardEvent::WidgetRemoved(id.clone()));
        if self.registry.is_empty() {
            self.emit(DashboardEvent::Emptied);
        }
        Ok(())
    }

    /// Remove every widget and invalidate outstanding requests.
    pub fn clear_all(&mut self) {
        self.layout.remove_all();
        let removed = self.registry.clear();
        self.render_queue.clear();
        self.generation += 1;
        self.pending_create = None;
        tracing::info!(removed, "dashboard cleared");
        self.emit(DashboardEvent::Emptied);
    }

    pub fn move_widget(
        &mut self,
        id: &WidgetId,
        position: GridPosition,
    ) -> Result<GridPosition, DashboardError> {
        self.layout.update(id, position).map_err(|e| match e {
            LayoutError::NotFound(id) => DashboardError::NotFound(id),
            other => DashboardError::Layout(other),
        })
    }

    pub fn snapshot_layout(&self, name: &str) -> DashboardLayout {
        let layout = self
            .layout
            .save()
            .into_iter()
            .map(|node| LayoutItem {
                spec: self.registry.get(&node.id).map(|w| w.spec().clone()),
                id: node.id,
                position: node.position,
            })
            .collect();
        DashboardLayout {
            id: None,
            name: name.to_string(),
            layout,
        }
    }

    /// Clear the board and prepare to rebuild it from `snapshot`.
    pub fn begin_restore(&mut self, snapshot: DashboardLayout) -> PendingRestore {
        self.clear_all();
        PendingRestore {
            generation: self.generation,
            layout: snapshot,
        }
    }

    pub fn finish_restore(
        &mut self,
        fetched: FetchedRestore,
    ) -> Result<RestoreReport, DashboardError> {
        if fetched.generation != self.generation {
            tracing::info!(name = %fetched.name, "dropping stale restore");
            return Err(DashboardError::Superseded);
        }
        let mut report = RestoreReport {
            name: fetched.name,
            ..RestoreReport::default()
        };
        for (item, result) in fetched.items {
            match (item.spec, result) {
                (Some(spec), Some(Ok(envelope))) => {
                    let id = self.insert_widget(spec, envelope, Some(item.position))?;
                    report.restored.push(id);
                }
                (_, Some(Err(err))) => {
                    tracing::warn!(widget = %item.id, error = %err, "restore request failed");
                    report.skipped.push((item.id, err.to_string()));
                }
                _ => {
                    report
                        .skipped
                        .push((item.id, "no chart parameters saved".to_string()));
                }
            }
        }
        self.emit(DashboardEvent::Restored {
            restored: report.restored.len(),
            skipped: report.skipped.len(),
        });
        Ok(report)
    }

    pub fn restore_layout(
        &mut self,
        snapshot: DashboardLayout,
        api: &dyn ApiClient,
    ) -> Result<RestoreReport, DashboardError> {
        let pending = self.begin_restore(snapshot);
        let fetched = pending.fetch(api);
        self.finish_restore(fetched)
    }

    /// Render widgets placed since the previous tick. Rendering waits one
    /// tick so the grid node exists before its chart is drawn.
    pub fn take_renders(&mut self) -> Vec<WidgetId> {
        let queued = std::mem::take(&mut self.render_queue);
        queued
            .into_iter()
            .filter(|id| match self.registry.get_mut(id) {
                Some(widget) => {
                    widget.render();
                    true
                }
                None => false,
            })
            .collect()
    }

    pub fn has_pending_renders(&self) -> bool {
        !self.render_queue.is_empty()
    }

    /// Registry and grid agree on the set of widget ids.
    pub fn is_consistent(&self) -> bool {
        self.layout.len() == self.registry.len()
            && self
                .layout
                .nodes()
                .iter()
                .all(|node| self.registry.contains(&node.id))
    }

    fn emit(&self, event: DashboardEvent) {
        if let Some(cb) = &self.event_cb {
            (cb)(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_needs_no_x_column() {
        assert!(validate_spec(&ChartSpec::new("d1", ChartType::Table)).is_ok());
        assert_eq!(
            validate_spec(&ChartSpec::new("d1", ChartType::Line)),
            Err(ValidationError::MissingXColumn)
        );
    }

    #[test]
    fn blank_values_fail_validation() {
        assert_eq!(
            validate_spec(&ChartSpec::new("  ", ChartType::Table)),
            Err(ValidationError::MissingDataset)
        );
        assert_eq!(
            validate_spec(&ChartSpec::new("d1", ChartType::Bar).with_x(" ")),
            Err(ValidationError::MissingXColumn)
        );
        assert_eq!(
            validate_spec(&ChartSpec::new("d1", ChartType::Bar).with_x("a").with_limit(0)),
            Err(ValidationError::InvalidLimit)
        );
    }

    #[test]
    fn second_begin_is_rejected_while_pending() {
        let mut dash = Dashboard::new(DashboardConfig::default(), None);
        let spec = ChartSpec::new("d1", ChartType::Table);
        let _first = dash.begin_create(spec.clone()).unwrap();
        assert!(matches!(
            dash.begin_create(spec),
            Err(DashboardError::InFlight)
        ));
    }

    #[test]
    fn failed_request_releases_slot_and_creates_nothing() {
        let mut dash = Dashboard::new(DashboardConfig::default(), None);
        let pending = dash
            .begin_create(ChartSpec::new("d1", ChartType::Table))
            .unwrap();
        let err = dash
            .finish_create(pending, Err(ApiError::Server("boom".into())))
            .unwrap_err();
        assert!(matches!(err, DashboardError::Api(ApiError::Server(_))));
        assert!(dash.is_empty());
        assert!(!dash.create_in_flight());
    }
}
