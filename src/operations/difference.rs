use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{Result, SelectionError};
use crate::geometry::Shape;
use crate::roi::{RoiKey, RoiSet};

use super::commit_derived;

/// Identifies one target/sub-selection pair within a [`Difference`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubModelId(pub usize);

#[derive(Debug, Clone)]
struct SubModel {
    target: RoiKey,
    subtracted: Vec<RoiKey>,
    key: Option<RoiKey>,
    result: Option<Shape>,
}

/// Multi-target difference builder.
///
/// Each sub-model pairs a target ROI with its own sub-selection of ROIs to
/// subtract. Edits apply to the active sub-model and discard only its stored
/// result. Results are computed on request and committed together by
/// [`Difference::execute`].
///
/// With `delete_originals`, subtracted ROIs are removed on commit unless they
/// are the target of some sub-model. Targets are never removed.
#[derive(Debug, Clone, Default)]
pub struct Difference {
    sub_models: BTreeMap<SubModelId, SubModel>,
    active: Option<SubModelId>,
    next_id: usize,
    delete_originals: bool,
    label: Option<String>,
}

impl Difference {
    /// Creates a difference without sub-models.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes every subtracted ROI after the results are committed.
    #[must_use]
    pub fn delete_originals(mut self, delete: bool) -> Self {
        self.delete_originals = delete;
        self
    }

    /// Sets the label of every derived ROI.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Adds a sub-model for `target`. The first one added becomes active.
    pub fn add_sub_model(&mut self, target: RoiKey) -> SubModelId {
        let id = SubModelId(self.next_id);
        self.next_id += 1;
        self.sub_models.insert(
            id,
            SubModel {
                target,
                subtracted: Vec::new(),
                key: None,
                result: None,
            },
        );
        self.active.get_or_insert(id);
        id
    }

    /// Makes `id` the sub-model that edits apply to.
    ///
    /// # Errors
    ///
    /// [`SelectionError::UnknownSubModel`] if `id` was never added.
    pub fn set_active(&mut self, id: SubModelId) -> Result<()> {
        if !self.sub_models.contains_key(&id) {
            return Err(SelectionError::UnknownSubModel(id).into());
        }
        self.active = Some(id);
        Ok(())
    }

    /// The sub-model that edits apply to.
    #[must_use]
    pub fn active(&self) -> Option<SubModelId> {
        self.active
    }

    /// Target ROI of sub-model `id`.
    #[must_use]
    pub fn target(&self, id: SubModelId) -> Option<RoiKey> {
        self.sub_models.get(&id).map(|m| m.target)
    }

    /// Sub-selection of sub-model `id`, in selection order.
    #[must_use]
    pub fn subtracted(&self, id: SubModelId) -> Option<&[RoiKey]> {
        self.sub_models.get(&id).map(|m| m.subtracted.as_slice())
    }

    fn active_mut(&mut self) -> Result<(SubModelId, &mut SubModel)> {
        let id = self.active.ok_or(SelectionError::NoActiveSubModel)?;
        let model = self
            .sub_models
            .get_mut(&id)
            .ok_or(SelectionError::UnknownSubModel(id))?;
        Ok((id, model))
    }

    /// Adds `key` to the active sub-selection.
    ///
    /// # Errors
    ///
    /// [`SelectionError::NoActiveSubModel`] without sub-models, and
    /// [`SelectionError::SelfSubtraction`] when `key` is the active target.
    pub fn select(&mut self, key: RoiKey) -> Result<()> {
        let (_, model) = self.active_mut()?;
        if key == model.target {
            return Err(SelectionError::SelfSubtraction(key).into());
        }
        if !model.subtracted.contains(&key) {
            model.subtracted.push(key);
            model.result = None;
        }
        Ok(())
    }

    /// Commits the active sub-model's result under `key` instead of a fresh
    /// key.
    ///
    /// The key must be reserved in the set, or belong to a subtracted ROI that
    /// is deleted on commit. It is checked by [`Difference::execute`].
    ///
    /// # Errors
    ///
    /// [`SelectionError::NoActiveSubModel`] without sub-models.
    pub fn reuse_key(&mut self, key: RoiKey) -> Result<()> {
        let (_, model) = self.active_mut()?;
        model.key = Some(key);
        Ok(())
    }

    /// Removes `key` from the active sub-selection.
    ///
    /// # Errors
    ///
    /// [`SelectionError::NoActiveSubModel`] without sub-models.
    pub fn deselect(&mut self, key: RoiKey) -> Result<()> {
        let (_, model) = self.active_mut()?;
        let before = model.subtracted.len();
        model.subtracted.retain(|&k| k != key);
        if model.subtracted.len() != before {
            model.result = None;
        }
        Ok(())
    }

    /// Computes and stores `target − ∪ sub-selection` for the active sub-model.
    ///
    /// # Errors
    ///
    /// [`SelectionError::Empty`] for an empty sub-selection,
    /// [`SelectionError::Missing`] when the target or a selected ROI is not in
    /// `set`, and [`crate::error::GeometryError::Unfinished`] for an ROI still
    /// being drawn.
    pub fn compute_active(&mut self, set: &RoiSet) -> Result<&Shape> {
        let (id, model) = self.active_mut()?;
        if model.subtracted.is_empty() {
            return Err(SelectionError::Empty.into());
        }
        let lookup = |key: RoiKey| set.get(key).ok_or(SelectionError::Missing(key));
        let target = lookup(model.target)?.shape()?;
        let cut = model
            .subtracted
            .iter()
            .map(|&key| lookup(key)?.shape())
            .collect::<Result<Vec<_>>>()?;
        debug!(sub_model = id.0, subtracted = cut.len(), "computed difference");
        Ok(model.result.insert(Shape::difference(target, cut)))
    }

    /// Stored result of sub-model `id`, if computed since its last edit.
    #[must_use]
    pub fn result(&self, id: SubModelId) -> Option<&Shape> {
        self.sub_models.get(&id).and_then(|m| m.result.as_ref())
    }

    /// Inserts one derived ROI per computed result, in sub-model order, and
    /// returns their keys. Sub-models without a result are skipped.
    ///
    /// # Errors
    ///
    /// [`SelectionError::Missing`] when a computed sub-model's target or
    /// subtracted ROI has left the set, and
    /// [`crate::error::IdentityError`] for a reused key that is still held or
    /// shared by two sub-models. On error the set is unchanged.
    pub fn execute(&self, set: &mut RoiSet) -> Result<Vec<RoiKey>> {
        let computed: Vec<(&SubModel, &Shape)> = self
            .sub_models
            .values()
            .filter_map(|m| m.result.as_ref().map(|shape| (m, shape)))
            .collect();

        for (model, _) in &computed {
            if let Some(&key) = std::iter::once(&model.target)
                .chain(&model.subtracted)
                .find(|&&key| !set.contains_key(key))
            {
                return Err(SelectionError::Missing(key).into());
            }
        }

        let mut released: Vec<RoiKey> = Vec::new();
        if self.delete_originals {
            for &key in computed.iter().flat_map(|(m, _)| &m.subtracted) {
                let is_target = self.sub_models.values().any(|m| m.target == key);
                if !is_target && !released.contains(&key) {
                    released.push(key);
                }
            }
        }

        let results = computed
            .iter()
            .map(|(model, shape)| (model.key, (*shape).clone()))
            .collect();
        let created = commit_derived(set, results, self.label.as_deref(), &released)?;
        debug!(
            created = created.len(),
            deleted = released.len(),
            "difference committed"
        );
        Ok(created)
    }
}
