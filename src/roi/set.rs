use slotmap::{SecondaryMap, SlotMap};
use tracing::debug;

use crate::error::{IdentityError, Result};

use super::{Roi, RoiKey};

/// Working set owning ROIs by key.
///
/// Keys are issued by the set itself, so an identity can never be shared by
/// two live ROIs. A reserved key has no ROI until [`RoiSet::insert`] fills it.
#[derive(Debug, Default, Clone)]
pub struct RoiSet {
    keys: SlotMap<RoiKey, ()>,
    rois: SecondaryMap<RoiKey, Roi>,
}

impl RoiSet {
    /// Creates an empty working set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a fresh key for an ROI to be inserted later.
    pub fn reserve_key(&mut self) -> RoiKey {
        self.keys.insert(())
    }

    /// Inserts `roi` under its own key.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::UnknownKey`] if this set never issued the key
    /// (or has since released it), and [`IdentityError::Collision`] if an ROI
    /// already holds it.
    pub fn insert(&mut self, roi: Roi) -> Result<RoiKey> {
        let key = roi.key();
        self.ensure_vacant(key, &[])?;
        debug!(%key, label = %roi.label(), "inserting roi");
        self.rois.insert(key, roi);
        Ok(key)
    }

    /// Reserves a key, builds the ROI with it and inserts the result.
    ///
    /// # Errors
    ///
    /// Fails like [`RoiSet::insert`] when `build` returns an ROI under a
    /// different key; the reserved key is released.
    pub fn insert_new(&mut self, build: impl FnOnce(RoiKey) -> Roi) -> Result<RoiKey> {
        let key = self.reserve_key();
        let roi = build(key);
        self.insert(roi).inspect_err(|_| {
            self.keys.remove(key);
        })
    }

    /// Checks that an ROI could be inserted under `key` once the ROIs held
    /// under `released` are gone.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::UnknownKey`] if this set never issued the key,
    /// and [`IdentityError::Collision`] if an ROI outside `released` holds it.
    pub fn ensure_vacant(&self, key: RoiKey, released: &[RoiKey]) -> Result<()> {
        if !self.keys.contains_key(key) {
            return Err(IdentityError::UnknownKey(key).into());
        }
        if self.rois.contains_key(key) && !released.contains(&key) {
            return Err(IdentityError::Collision(key).into());
        }
        Ok(())
    }

    /// Removes the ROI under `key` but keeps the key reserved for a successor.
    pub fn vacate(&mut self, key: RoiKey) -> Option<Roi> {
        let roi = self.rois.remove(key)?;
        debug!(%key, "vacated roi");
        Some(roi)
    }

    /// Returns the ROI held under `key`.
    #[must_use]
    pub fn get(&self, key: RoiKey) -> Option<&Roi> {
        self.rois.get(key)
    }

    /// Returns the ROI held under `key` for editing.
    pub fn get_mut(&mut self, key: RoiKey) -> Option<&mut Roi> {
        self.rois.get_mut(key)
    }

    /// Removes the ROI and releases its key.
    pub fn remove(&mut self, key: RoiKey) -> Option<Roi> {
        let roi = self.rois.remove(key)?;
        self.keys.remove(key);
        debug!(%key, "removed roi");
        Some(roi)
    }

    /// Replaces the label of the ROI under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::UnknownKey`] if no ROI holds `key`.
    pub fn set_label(&mut self, key: RoiKey, label: impl Into<String>) -> Result<()> {
        let roi = self
            .rois
            .get_mut(key)
            .ok_or(IdentityError::UnknownKey(key))?;
        roi.set_label(label);
        Ok(())
    }

    /// Whether an ROI is held under `key`. Reserved keys do not count.
    #[must_use]
    pub fn contains_key(&self, key: RoiKey) -> bool {
        self.rois.contains_key(key)
    }

    /// Keys of the held ROIs, in set order.
    pub fn keys(&self) -> impl Iterator<Item = RoiKey> + '_ {
        self.rois.keys()
    }

    /// Held ROIs with their keys, in set order.
    pub fn iter(&self) -> impl Iterator<Item = (RoiKey, &Roi)> {
        self.rois.iter()
    }

    /// Number of held ROIs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rois.len()
    }

    /// Whether no ROI is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rois.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::RoiError;
    use crate::geometry::Region;
    use crate::math::Point2;
    use crate::roi::Outline;

    fn square(key: RoiKey) -> Roi {
        Roi::magic_wand_path(
            key,
            Region::rectangle(Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)),
        )
    }

    #[test]
    fn insert_new_and_get() {
        let mut set = RoiSet::new();
        let key = set.insert_new(square).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(key).unwrap().key(), key);
        assert!(set.contains_key(key));
    }

    #[test]
    fn duplicate_identity_is_rejected() {
        let mut set = RoiSet::new();
        let key = set.insert_new(square).unwrap();
        let err = set.insert(square(key)).unwrap_err();
        assert!(matches!(err, RoiError::Identity(IdentityError::Collision(k)) if k == key));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn foreign_key_is_rejected() {
        let mut other = RoiSet::new();
        other.reserve_key();
        let foreign = other.reserve_key();
        let mut set = RoiSet::new();
        let err = set.insert(square(foreign)).unwrap_err();
        assert!(matches!(err, RoiError::Identity(IdentityError::UnknownKey(_))));
    }

    #[test]
    fn removed_key_is_not_reused() {
        let mut set = RoiSet::new();
        let key = set.insert_new(square).unwrap();
        assert!(set.remove(key).is_some());
        assert!(set.remove(key).is_none());
        let next = set.insert_new(square).unwrap();
        assert_ne!(next, key);
        assert!(set.insert(square(key)).is_err());
    }

    #[test]
    fn insert_new_releases_key_on_failure() {
        let mut set = RoiSet::new();
        let existing = set.insert_new(square).unwrap();
        assert!(set.insert_new(|_| square(existing)).is_err());
        assert_eq!(set.len(), 1);
        assert_eq!(set.keys().collect::<Vec<_>>(), vec![existing]);
    }

    #[test]
    fn vacated_key_accepts_a_successor() {
        let mut set = RoiSet::new();
        let key = set.insert_new(square).unwrap();
        assert!(set.ensure_vacant(key, &[]).is_err());
        assert!(set.ensure_vacant(key, &[key]).is_ok());
        assert!(set.vacate(key).is_some());
        assert!(!set.contains_key(key));
        set.ensure_vacant(key, &[]).unwrap();
        assert_eq!(set.insert(square(key)).unwrap(), key);
    }

    #[test]
    fn relabel_in_place() {
        let mut set = RoiSet::new();
        let key = set.insert_new(|k| Roi::polygon(k, Outline::new())).unwrap();
        set.set_label(key, "cell 1").unwrap();
        assert_eq!(set.get(key).unwrap().label(), "cell 1");
        set.remove(key);
        assert!(set.set_label(key, "gone").is_err());
    }
}
