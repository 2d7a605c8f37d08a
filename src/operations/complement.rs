use tracing::debug;

use crate::error::{Result, SelectionError};
use crate::geometry::Shape;
use crate::roi::{Roi, RoiKey, RoiSet};

use super::{commit_derived, Selection};

/// Complement of a selection.
///
/// By default every finished ROI outside the selection becomes a target and
/// yields one derived ROI `target − ∪ selected`. With [`Complement::within`]
/// the result is a single derived ROI `area − ∪ selected`.
///
/// All derived shapes and keys are checked before the set is touched. With
/// `delete_originals` the selected ROIs are removed after the derived ROIs
/// are inserted.
pub struct Complement {
    selection: Selection,
    area: Option<Shape>,
    key: Option<RoiKey>,
    label: Option<String>,
}

impl Complement {
    /// Creates a complement of `selection` against the other ROIs of the set.
    #[must_use]
    pub fn new(selection: Selection) -> Self {
        Self {
            selection,
            area: None,
            key: None,
            label: None,
        }
    }

    /// Complement relative to a working area instead of the other ROIs.
    #[must_use]
    pub fn within(mut self, area: &Shape) -> Self {
        self.area = Some(area.clone());
        self
    }

    /// Reuses `key` for the first derived ROI instead of issuing a fresh one.
    ///
    /// The key must be reserved in the set, or belong to a selected ROI that
    /// is deleted by this operation.
    #[must_use]
    pub fn with_key(mut self, key: RoiKey) -> Self {
        self.key = Some(key);
        self
    }

    /// Sets the label of every derived ROI.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Commits the derived ROIs and returns their keys in target order. A
    /// cancelled selection returns no keys and leaves the set unchanged.
    ///
    /// # Errors
    ///
    /// [`SelectionError::Empty`] or [`SelectionError::Missing`] for an
    /// invalid selection, [`SelectionError::NoTargets`] when no finished ROI
    /// remains outside the selection,
    /// [`crate::error::GeometryError::Unfinished`] if a selected ROI is still
    /// being drawn, and [`crate::error::IdentityError`] for a reused key that
    /// is still held. On error the set is unchanged.
    pub fn execute(&self, set: &mut RoiSet) -> Result<Vec<RoiKey>> {
        if !self.selection.proceeds() {
            return Ok(Vec::new());
        }
        let cut = self
            .selection
            .resolve(set)?
            .into_iter()
            .map(Roi::shape)
            .collect::<Result<Vec<_>>>()?;

        let shapes = match &self.area {
            Some(area) => vec![Shape::difference(area.clone(), cut)],
            None => {
                let targets = set
                    .iter()
                    .filter(|(key, roi)| !self.selection.contains(*key) && roi.is_finished())
                    .map(|(_, roi)| roi.shape())
                    .collect::<Result<Vec<_>>>()?;
                if targets.is_empty() {
                    return Err(SelectionError::NoTargets.into());
                }
                targets
                    .into_iter()
                    .map(|target| Shape::difference(target, cut.iter().cloned()))
                    .collect()
            }
        };

        let results = shapes
            .into_iter()
            .enumerate()
            .map(|(i, shape)| (self.key.filter(|_| i == 0), shape))
            .collect();
        let released: &[RoiKey] = if self.selection.deletes_originals() {
            self.selection.keys()
        } else {
            &[]
        };
        let created = commit_derived(set, results, self.label.as_deref(), released)?;
        debug!(
            created = created.len(),
            deleted = released.len(),
            "complement committed"
        );
        Ok(created)
    }
}
