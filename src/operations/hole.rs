use tracing::debug;

use crate::error::Result;
use crate::geometry::Shape;
use crate::roi::{Outline, Roi, RoiKey, RoiSet};

/// Creates a hole ROI: the dataset area with an inner outline cut out.
///
/// The dataset area is copied; later changes to the caller's shape do not
/// affect the hole.
pub struct MakeHole {
    dataset_area: Shape,
    inner: Outline,
    magic_wand: bool,
    key: Option<RoiKey>,
    label: Option<String>,
}

impl MakeHole {
    /// A polygon hole around `inner`, which may still be under construction.
    #[must_use]
    pub fn new(dataset_area: &Shape, inner: Outline) -> Self {
        Self {
            dataset_area: dataset_area.clone(),
            inner,
            magic_wand: false,
            key: None,
            label: None,
        }
    }

    /// Marks the inner outline as a wand selection. It must be finished.
    #[must_use]
    pub fn magic_wand(mut self) -> Self {
        self.magic_wand = true;
        self
    }

    /// Marks the inner outline as a polygon. This is the default.
    #[must_use]
    pub fn polygon(mut self) -> Self {
        self.magic_wand = false;
        self
    }

    /// Inserts the hole under `key`, which must be reserved in the set and
    /// not held by an ROI.
    #[must_use]
    pub fn with_key(mut self, key: RoiKey) -> Self {
        self.key = Some(key);
        self
    }

    /// Sets the label of the hole.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Inserts the hole under a fresh key, or the one given by
    /// [`MakeHole::with_key`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::GeometryError::Unfinished`] for a wand hole
    /// whose inner outline is not finished, and [`crate::error::IdentityError`]
    /// for a given key that is held or was not issued by `set`.
    pub fn execute(&self, set: &mut RoiSet) -> Result<RoiKey> {
        let wand_region = if self.magic_wand {
            Some(self.inner.require_region()?.clone())
        } else {
            None
        };
        let build = |key: RoiKey| {
            let roi = match wand_region {
                Some(region) => Roi::magic_wand_hole(key, &self.dataset_area, region),
                None => Roi::polygon_hole(key, &self.dataset_area, self.inner.clone()),
            };
            match &self.label {
                Some(label) => roi.with_label(label.clone()),
                None => roi,
            }
        };
        let key = match self.key {
            Some(key) => set.insert(build(key))?,
            None => set.insert_new(build)?,
        };
        debug!(%key, magic_wand = self.magic_wand, "created hole roi");
        Ok(key)
    }
}
