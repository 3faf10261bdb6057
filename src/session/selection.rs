use crate::{
    foundation::error::{BoothError, BoothResult},
    gallery::store::EntryId,
};

/// Outcome of [`Selection::toggle`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Toggle {
    /// The id was appended; `position` is its 1-based rank.
    Added {
        /// 1-based rank in selection order.
        position: usize,
    },
    /// The id was already selected and has been removed.
    Removed,
}

/// Ordered, duplicate-free list of selected gallery ids with a size cap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<EntryId>,
    limit: usize,
}

impl Selection {
    /// Empty selection holding at most `limit` ids.
    pub fn new(limit: usize) -> Self {
        Self {
            ids: Vec::new(),
            limit,
        }
    }

    /// Add `id`, or remove it when already present.
    ///
    /// Adding past the cap fails with [`BoothError::SelectionLimitExceeded`] and leaves the
    /// selection unchanged. Removal never fails.
    pub fn toggle(&mut self, id: EntryId) -> BoothResult<Toggle> {
        if let Some(i) = self.ids.iter().position(|&x| x == id) {
            self.ids.remove(i);
            return Ok(Toggle::Removed);
        }
        if self.ids.len() >= self.limit {
            return Err(BoothError::SelectionLimitExceeded { limit: self.limit });
        }
        self.ids.push(id);
        Ok(Toggle::Added {
            position: self.ids.len(),
        })
    }

    /// Selected ids in selection order.
    pub fn ids(&self) -> &[EntryId] {
        &self.ids
    }

    /// 1-based rank of `id`, as shown on the selection badge.
    pub fn position(&self, id: EntryId) -> Option<usize> {
        self.ids.iter().position(|&x| x == id).map(|i| i + 1)
    }

    /// Number of selected ids.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// `true` when nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Maximum number of ids.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Deselect everything.
    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/selection.rs"]
mod tests;
