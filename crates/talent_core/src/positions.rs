use std::collections::HashSet;

use crate::PositionAggregate;

/// First-seen-wins collection of positions keyed by job id.
#[derive(Debug, Clone, Default)]
pub struct PositionBook {
    positions: Vec<PositionAggregate>,
    seen: HashSet<String>,
}

impl PositionBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, job_id: &str) -> bool {
        self.seen.contains(job_id)
    }

    /// Adds the aggregate unless its job id is already present.
    /// Returns whether it was added.
    pub fn insert(&mut self, position: PositionAggregate) -> bool {
        if !self.seen.insert(position.job_id.clone()) {
            return false;
        }
        self.positions.push(position);
        true
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Positions in first-seen order.
    pub fn into_positions(self) -> Vec<PositionAggregate> {
        self.positions
    }
}
