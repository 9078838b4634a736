use crate::api::{ApiClient, ApiError};
use crate::dashboard::model::Dataset;

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("dataset '{0}' not found")]
    NotFound(String),
    #[error("failed to load datasets: {0}")]
    Fetch(#[from] ApiError),
    #[error("a newer dataset request superseded this one")]
    Superseded,
}

/// Identifies one dataset listing request. Only the newest ticket may
/// replace the registry contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

/// Identifies one dataset detail request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailTicket {
    generation: u64,
    dataset_id: String,
}

impl DetailTicket {
    pub fn dataset_id(&self) -> &str {
        &self.dataset_id
    }
}

/// Datasets known to the client and the current selection.
#[derive(Debug, Default)]
pub struct DatasetRegistry {
    datasets: Vec<Dataset>,
    selected: Option<String>,
    load_generation: u64,
    detail_generation: u64,
}

impl DatasetRegistry {
    pub fn datasets(&self) -> &[Dataset] {
        &self.datasets
    }

    pub fn get(&self, id: &str) -> Option<&Dataset> {
        self.datasets.iter().find(|d| d.id == id)
    }

    pub fn selected(&self) -> Option<&Dataset> {
        self.selected.as_deref().and_then(|id| self.get(id))
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.as_deref() == Some(id)
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.load_generation += 1;
        LoadTicket {
            generation: self.load_generation,
        }
    }

    /// Replace the contents with a listing. On failure the previous
    /// contents stay in place.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<Dataset>, ApiError>,
    ) -> Result<usize, DatasetError> {
        if ticket.generation != self.load_generation {
            tracing::debug!(generation = ticket.generation, "dropping stale dataset listing");
            return Err(DatasetError::Superseded);
        }
        let datasets = match result {
            Ok(datasets) => datasets,
            Err(err) => {
                tracing::warn!(error = %err, "failed to load datasets");
                return Err(err.into());
            }
        };
        self.datasets = datasets;
        let vanished = self
            .selected
            .as_deref()
            .is_some_and(|id| self.get(id).is_none());
        if vanished {
            tracing::info!(dataset = ?self.selected, "selected dataset disappeared after reload");
            self.selected = None;
        }
        Ok(self.datasets.len())
    }

    pub fn load_datasets(&mut self, api: &dyn ApiClient) -> Result<&[Dataset], DatasetError> {
        let ticket = self.begin_load();
        let result = api.list_datasets();
        self.finish_load(ticket, result)?;
        Ok(&self.datasets)
    }

    pub fn select(&mut self, id: &str) -> Result<&Dataset, DatasetError> {
        let idx = self
            .datasets
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| DatasetError::NotFound(id.to_string()))?;
        self.selected = Some(id.to_string());
        Ok(&self.datasets[idx])
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Forget every dataset and the selection. Generations keep counting so
    /// tickets issued before the reset stay stale.
    pub fn reset(&mut self) {
        self.datasets.clear();
        self.selected = None;
        self.load_generation += 1;
        self.detail_generation += 1;
    }

    pub fn begin_detail(&mut self, dataset_id: &str) -> DetailTicket {
        self.detail_generation += 1;
        DetailTicket {
            generation: self.detail_generation,
            dataset_id: dataset_id.to_string(),
        }
    }

    /// Store fetched detail (with `columns_info`) over the listed entry.
    pub fn finish_detail(
        &mut self,
        ticket: DetailTicket,
        result: Result<Dataset, ApiError>,
    ) -> Result<&Dataset, DatasetError> {
        if ticket.generation != self.detail_generation {
            return Err(DatasetError::Superseded);
        }
        let mut detail = result?;
        if detail.id.is_empty() {
            detail.id = ticket.dataset_id.clone();
        }
        let idx = match self.datasets.iter().position(|d| d.id == detail.id) {
            Some(idx) => {
                self.datasets[idx] = detail;
                idx
            }
            None => {
                self.datasets.push(detail);
                self.datasets.len() - 1
            }
        };
        Ok(&self.datasets[idx])
    }

    /// Numeric columns of the selected dataset.
    pub fn selected_y_candidates(&self) -> Vec<&str> {
        self.selected()
            .map(Dataset::y_axis_candidates)
            .unwrap_or_default()
    }

    pub fn selected_x_candidates(&self) -> Vec<&str> {
        self.selected()
            .map(Dataset::x_axis_candidates)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ds(id: &str) -> Dataset {
        Dataset {
            id: id.into(),
            filename: format!("{id}.csv"),
            rows: 1,
            columns: 1,
            columns_info: Vec::new(),
            created_at: None,
            size_mb: None,
        }
    }

    #[test]
    fn stale_listing_is_dropped() {
        let mut reg = DatasetRegistry::default();
        let old = reg.begin_load();
        let new = reg.begin_load();
        reg.finish_load(new, Ok(vec![ds("b")])).unwrap();
        assert!(matches!(
            reg.finish_load(old, Ok(vec![ds("a")])),
            Err(DatasetError::Superseded)
        ));
        assert_eq!(reg.datasets()[0].id, "b");
    }

    #[test]
    fn failed_listing_keeps_previous_contents() {
        let mut reg = DatasetRegistry::default();
        let t = reg.begin_load();
        reg.finish_load(t, Ok(vec![ds("a")])).unwrap();
        let t = reg.begin_load();
        assert!(reg
            .finish_load(t, Err(ApiError::Transport("down".into())))
            .is_err());
        assert_eq!(reg.datasets().len(), 1);
    }

    #[test]
    fn reload_drops_vanished_selection() {
        let mut reg = DatasetRegistry::default();
        let t = reg.begin_load();
        reg.finish_load(t, Ok(vec![ds("a")])).unwrap();
        reg.select("a").unwrap();
        let t = reg.begin_load();
        reg.finish_load(t, Ok(vec![ds("b")])).unwrap();
        assert!(reg.selected().is_none());
        assert!(matches!(reg.select("a"), Err(DatasetError::NotFound(_))));
    }

    #[test]
    fn reset_keeps_earlier_tickets_stale() {
        let mut reg = DatasetRegistry::default();
        let listing = reg.begin_load();
        let detail = reg.begin_detail("a");
        reg.reset();
        let fresh = reg.begin_load();
        assert!(matches!(
            reg.finish_load(listing, Ok(vec![ds("a")])),
            Err(DatasetError::Superseded)
        ));
        assert!(matches!(
            reg.finish_detail(detail, Ok(ds("a"))),
            Err(DatasetError::Superseded)
        ));
        reg.finish_load(fresh, Ok(vec![ds("b")])).unwrap();
        assert_eq!(reg.datasets()[0].id, "b");
    }
}
