use crate::dashboard::config::GridConfig;
use crate::dashboard::model::{GridPosition, WidgetId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridNode {
    pub id: WidgetId,
    pub position: GridPosition,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("grid already holds a node for '{0}'")]
    Duplicate(WidgetId),
    #[error("no grid node for '{0}'")]
    NotFound(WidgetId),
    #[error("position {0:?} overlaps another widget")]
    Collision(GridPosition),
}

/// Deepest row or tallest node accepted from a saved layout.
pub const MAX_ROWS: u32 = 1_000;

/// Column-bounded grid that places, moves and removes widget nodes.
///
/// Nodes never overlap and never extend past the last column. With `float`
/// disabled, nodes are pulled upward after every removal or move.
#[derive(Debug, Clone)]
pub struct GridLayout {
    columns: u32,
    float: bool,
    nodes: Vec<GridNode>,
}

impl GridLayout {
    pub fn new(cfg: &GridConfig) -> Self {
        Self {
            columns: cfg.columns.max(1),
            float: cfg.float,
            nodes: Vec::new(),
        }
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &WidgetId) -> bool {
        self.nodes.iter().any(|n| &n.id == id)
    }

    pub fn node(&self, id: &WidgetId) -> Option<&GridNode> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> &[GridNode] {
        &self.nodes
    }

    /// Number of rows currently occupied.
    pub fn rows(&self) -> u32 {
        self.nodes
            .iter()
            .map(|n| n.position.bottom())
            .max()
            .unwrap_or(0)
    }

    /// Insert a node of size `w`×`h` at the first free cell, scanning rows
    /// top to bottom and columns left to right.
    pub fn add(&mut self, id: WidgetId, w: u32, h: u32) -> Result<GridPosition, LayoutError> {
        if self.contains(&id) {
            return Err(LayoutError::Duplicate(id));
        }
        let position = self.first_fit(w, h, None);
        tracing::debug!(widget = %id, ?position, "grid node added");
        self.nodes.push(GridNode { id, position });
        Ok(position)
    }

    /// Insert a node at `position`, clamped to the grid. Falls back to
    /// first-fit placement with the same size when the cells are taken.
    pub fn add_at(
        &mut self,
        id: WidgetId,
        position: GridPosition,
    ) -> Result<GridPosition, LayoutError> {
        if self.contains(&id) {
            return Err(LayoutError::Duplicate(id));
        }
        let clamped = self.clamp(position);
        let placed = if self.is_free(&clamped, None) {
            clamped
        } else {
            tracing::debug!(widget = %id, ?clamped, "saved position taken; auto-placing");
            self.first_fit(clamped.w, clamped.h, None)
        };
        self.nodes.push(GridNode {
            id,
            position: placed,
        });
        if !self.float {
            self.compact();
        }
        Ok(self.nodes.last().map(|n| n.position).unwrap_or(placed))
    }

    /// Move or resize an existing node. Rejects overlapping targets.
    pub fn update(
        &mut self,
        id: &WidgetId,
        position: GridPosition,
    ) -> Result<GridPosition, LayoutError> {
        let idx = self
            .nodes
            .iter()
            .position(|n| &n.id == id)
            .ok_or_else(|| LayoutError::NotFound(id.clone()))?;
        let clamped = self.clamp(position);
        if !self.is_free(&clamped, Some(idx)) {
            return Err(LayoutError::Collision(clamped));
        }
        self.nodes[idx].position = clamped;
        if !self.float {
            self.compact();
        }
        Ok(self.nodes[idx].position)
    }

    pub fn remove(&mut self, id: &WidgetId) -> Option<GridNode> {
        let idx = self.nodes.iter().position(|n| &n.id == id)?;
        let node = self.nodes.remove(idx);
        if !self.float {
            self.compact();
        }
        Some(node)
    }

    pub fn remove_all(&mut self) -> Vec<GridNode> {
        std::mem::take(&mut self.nodes)
    }

    /// Nodes ordered top-to-bottom, left-to-right.
    pub fn save(&self) -> Vec<GridNode> {
        let mut nodes = self.nodes.clone();
        nodes.sort_by_key(|n| (n.position.y, n.position.x));
        nodes
    }

    fn clamp(&self, position: GridPosition) -> GridPosition {
        let w = position.w.clamp(1, self.columns);
        let x = position.x.min(self.columns - w);
        GridPosition {
            x,
            y: position.y.min(MAX_ROWS),
            w,
            h: position.h.clamp(1, MAX_ROWS),
        }
    }

    fn is_free(&self, candidate: &GridPosition, skip: Option<usize>) -> bool {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != skip)
            .all(|(_, n)| !n.position.overlaps(candidate))
    }

    fn first_fit(&self, w: u32, h: u32, skip: Option<usize>) -> GridPosition {
        let w = w.clamp(1, self.columns);
        let h = h.max(1);
        let mut y = 0;
        loop {
            for x in 0..=(self.columns - w) {
                let candidate = GridPosition { x, y, w, h };
                if self.is_free(&candidate, skip) {
                    return candidate;
                }
            }
            y += 1;
        }
    }

    /// Pull every node up as far as it goes, top rows first.
    fn compact(&mut self) {
        let mut order: Vec<usize> = (0..self.nodes.len()).collect();
        order.sort_by_key(|&i| (self.nodes[i].position.y, self.nodes[i].position.x));
        for idx in order {
            while self.nodes[idx].position.y > 0 {
                let mut up = self.nodes[idx].position;
                up.y -= 1;
                if !self.is_free(&up, Some(idx)) {
                    break;
                }
                self.nodes[idx].position = up;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> GridLayout {
        GridLayout::new(&GridConfig::default())
    }

    fn id(n: u64) -> WidgetId {
        WidgetId::from_counter(n)
    }

    #[test]
    fn packs_two_half_width_nodes_per_row() {
        let mut g = grid();
        assert_eq!(g.add(id(1), 6, 4).unwrap(), GridPosition::new(0, 0, 6, 4));
        assert_eq!(g.add(id(2), 6, 4).unwrap(), GridPosition::new(6, 0, 6, 4));
        assert_eq!(g.add(id(3), 6, 4).unwrap(), GridPosition::new(0, 4, 6, 4));
        assert_eq!(g.rows(), 8);
    }

    #[test]
    fn fills_gap_left_by_removal() {
        let mut g = grid();
        g.add(id(1), 6, 4).unwrap();
        g.add(id(2), 6, 4).unwrap();
        g.remove(&id(1)).unwrap();
        assert_eq!(g.add(id(3), 6, 4).unwrap(), GridPosition::new(0, 0, 6, 4));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let mut g = grid();
        g.add(id(1), 6, 4).unwrap();
        assert_eq!(g.add(id(1), 6, 4), Err(LayoutError::Duplicate(id(1))));
    }

    #[test]
    fn clamps_to_grid_width() {
        let mut g = grid();
        let pos = g.add_at(id(1), GridPosition::new(10, 2, 20, 0)).unwrap();
        assert_eq!(pos, GridPosition::new(0, 2, 12, 1));
    }

    #[test]
    fn oversized_saved_rows_are_bounded() {
        let mut g = grid();
        let pos = g
            .add_at(id(1), GridPosition::new(0, u32::MAX, 12, u32::MAX))
            .unwrap();
        assert_eq!(pos, GridPosition::new(0, MAX_ROWS, 12, MAX_ROWS));
        assert_eq!(g.rows(), 2 * MAX_ROWS);
        assert_eq!(g.add(id(2), 6, 4).unwrap(), GridPosition::new(0, 0, 6, 4));
    }

    #[test]
    fn taken_saved_position_falls_back_to_first_fit() {
        let mut g = grid();
        g.add(id(1), 6, 4).unwrap();
        let pos = g.add_at(id(2), GridPosition::new(0, 0, 6, 4)).unwrap();
        assert_eq!(pos, GridPosition::new(6, 0, 6, 4));
    }

    #[test]
    fn update_rejects_collisions() {
        let mut g = grid();
        g.add(id(1), 6, 4).unwrap();
        g.add(id(2), 6, 4).unwrap();
        let err = g.update(&id(2), GridPosition::new(3, 0, 6, 4)).unwrap_err();
        assert!(matches!(err, LayoutError::Collision(_)));
        assert_eq!(
            g.update(&id(2), GridPosition::new(0, 4, 12, 2)).unwrap(),
            GridPosition::new(0, 4, 12, 2)
        );
    }

    #[test]
    fn compacts_when_not_floating() {
        let mut g = GridLayout::new(&GridConfig {
            float: false,
            ..GridConfig::default()
        });
        g.add(id(1), 12, 4).unwrap();
        g.add(id(2), 12, 4).unwrap();
        g.remove(&id(1));
        assert_eq!(g.node(&id(2)).unwrap().position.y, 0);
    }

    #[test]
    fn save_orders_by_row_then_column() {
        let mut g = grid();
        g.add_at(id(1), GridPosition::new(6, 4, 6, 4)).unwrap();
        g.add_at(id(2), GridPosition::new(0, 0, 6, 4)).unwrap();
        let saved: Vec<_> = g.save().into_iter().map(|n| n.id).collect();
        assert_eq!(saved, vec![id(2), id(1)]);
    }
}
