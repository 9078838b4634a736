use crate::dashboard::model::{ChartDataEnvelope, ChartSpec, ChartType, WidgetId};
use crate::dashboard::render::{to_render_config, RenderConfig};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetState {
    /// Placed on the grid, waiting for the next render tick.
    Requested,
    Rendered,
}

/// A chart or table placed on the dashboard.
#[derive(Debug, Clone)]
pub struct Widget {
    id: WidgetId,
    spec: ChartSpec,
    title: String,
    state: WidgetState,
    envelope: Option<ChartDataEnvelope>,
    render: Option<RenderConfig>,
}

impl Widget {
    pub fn new(id: WidgetId, spec: ChartSpec, envelope: ChartDataEnvelope) -> Self {
        let title = title_for(envelope.chart_type());
        Self {
            id,
            spec,
            title,
            state: WidgetState::Requested,
            envelope: Some(envelope),
            render: None,
        }
    }

    pub fn id(&self) -> &WidgetId {
        &self.id
    }

    pub fn spec(&self) -> &ChartSpec {
        &self.spec
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn state(&self) -> WidgetState {
        self.state
    }

    pub fn render_config(&self) -> Option<&RenderConfig> {
        self.render.as_ref()
    }

    /// Convert the envelope into its render configuration. The envelope is
    /// consumed; later calls return the stored configuration.
    pub fn render(&mut self) -> &RenderConfig {
        if let Some(envelope) = self.envelope.take() {
            self.render = Some(to_render_config(&envelope));
            self.state = WidgetState::Rendered;
        }
        self.render.get_or_insert(RenderConfig::Empty)
    }
}

fn title_for(chart_type: ChartType) -> String {
    match chart_type {
        ChartType::Table => "Data Table".into(),
        other => format!("{} Chart", other.label()),
    }
}

/// Live widgets keyed by id, plus the session's id counter.
#[derive(Debug, Default)]
pub struct WidgetRegistry {
    map: HashMap<WidgetId, Widget>,
    counter: u64,
}

impl WidgetRegistry {
    /// Next id in the session. Ids are never handed out twice.
    pub fn allocate_id(&mut self) -> WidgetId {
        self.counter += 1;
        WidgetId::from_counter(self.counter)
    }

    pub fn issued(&self) -> u64 {
        self.counter
    }

    pub fn insert(&mut self, widget: Widget) {
        self.map.insert(widget.id.clone(), widget);
    }

    pub fn remove(&mut self, id: &WidgetId) -> Option<Widget> {
        self.map.remove(id)
    }

    /// Drop every widget. The id counter keeps running.
    pub fn clear(&mut self) -> usize {
        let n = self.map.len();
        self.map.clear();
        n
    }

    pub fn contains(&self, id: &WidgetId) -> bool {
        self.map.contains_key(id)
    }

    pub fn get(&self, id: &WidgetId) -> Option<&Widget> {
        self.map.get(id)
    }

    pub fn get_mut(&mut self, id: &WidgetId) -> Option<&mut Widget> {
        self.map.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &WidgetId> {
        self.map.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::model::TableData;

    #[test]
    fn ids_keep_counting_after_clear() {
        let mut reg = WidgetRegistry::default();
        assert_eq!(reg.allocate_id().as_str(), "widget-1");
        assert_eq!(reg.allocate_id().as_str(), "widget-2");
        reg.clear();
        assert_eq!(reg.allocate_id().as_str(), "widget-3");
        assert_eq!(reg.issued(), 3);
    }

    #[test]
    fn render_consumes_envelope_once() {
        let spec = ChartSpec::new("d1", ChartType::Table);
        let mut widget = Widget::new(
            WidgetId::from_counter(1),
            spec,
            ChartDataEnvelope::Table(TableData::default()),
        );
        assert_eq!(widget.state(), WidgetState::Requested);
        assert_eq!(widget.title(), "Data Table");
        assert_eq!(widget.render(), &RenderConfig::Empty);
        assert_eq!(widget.state(), WidgetState::Rendered);
        assert_eq!(widget.render(), &RenderConfig::Empty);
    }
}
