use crate::error::{Result, SelectionError};
use crate::roi::{Roi, RoiKey, RoiSet};

/// The outcome of a selection session: which ROIs take part in a composite
/// operation, whether they are deleted afterwards, and whether the user chose
/// to proceed at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    keys: Vec<RoiKey>,
    delete_originals: bool,
    proceed: bool,
}

impl Selection {
    /// A selection of `keys` in first-seen order; repeated keys are dropped.
    #[must_use]
    pub fn new(keys: impl IntoIterator<Item = RoiKey>) -> Self {
        let mut unique: Vec<RoiKey> = Vec::new();
        for key in keys {
            if !unique.contains(&key) {
                unique.push(key);
            }
        }
        Self {
            keys: unique,
            delete_originals: false,
            proceed: true,
        }
    }

    /// A session the user dismissed. Operators given it do nothing.
    #[must_use]
    pub fn cancelled() -> Self {
        Self {
            keys: Vec::new(),
            delete_originals: false,
            proceed: false,
        }
    }

    /// Removes the selected ROIs once the operation commits.
    #[must_use]
    pub fn delete_originals(mut self, delete: bool) -> Self {
        self.delete_originals = delete;
        self
    }

    /// Selected keys, in selection order.
    #[must_use]
    pub fn keys(&self) -> &[RoiKey] {
        &self.keys
    }

    /// Whether `key` is selected.
    #[must_use]
    pub fn contains(&self, key: RoiKey) -> bool {
        self.keys.contains(&key)
    }

    /// Number of selected keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Whether the operation removes the selected ROIs.
    #[must_use]
    pub fn deletes_originals(&self) -> bool {
        self.delete_originals
    }

    /// `false` for a cancelled selection.
    #[must_use]
    pub fn proceeds(&self) -> bool {
        self.proceed
    }

    /// Looks up every selected ROI.
    ///
    /// # Errors
    ///
    /// [`SelectionError::Empty`] for an empty selection,
    /// [`SelectionError::Missing`] for a key absent from `set`.
    pub(crate) fn resolve<'a>(&self, set: &'a RoiSet) -> Result<Vec<&'a Roi>> {
        if self.keys.is_empty() {
            return Err(SelectionError::Empty.into());
        }
        self.keys
            .iter()
            .map(|&key| set.get(key).ok_or_else(|| SelectionError::Missing(key).into()))
            .collect()
    }
}

impl FromIterator<RoiKey> for Selection {
    fn from_iter<I: IntoIterator<Item = RoiKey>>(iter: I) -> Self {
        Self::new(iter)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::RoiError;
    use crate::geometry::Region;
    use crate::math::Point2;

    fn set_of(n: usize) -> (RoiSet, Vec<RoiKey>) {
        let mut set = RoiSet::new();
        let keys = (0..n)
            .map(|_| {
                let unit = Region::rectangle(Point2::origin(), Point2::new(1.0, 1.0));
                set.insert_new(|k| Roi::magic_wand_path(k, unit)).unwrap()
            })
            .collect();
        (set, keys)
    }

    #[test]
    fn repeated_keys_are_dropped_in_order() {
        let (_, k) = set_of(3);
        let selection: Selection = [k[2], k[0], k[2], k[1], k[0]].into_iter().collect();
        assert_eq!(selection.keys(), &[k[2], k[0], k[1]]);
        assert!(selection.proceeds());
        assert!(!selection.deletes_originals());
    }

    #[test]
    fn resolve_reports_empty_and_missing() {
        let (mut set, k) = set_of(2);
        assert!(matches!(
            Selection::new(Vec::<RoiKey>::new()).resolve(&set).unwrap_err(),
            RoiError::InvalidSelection(SelectionError::Empty)
        ));
        set.remove(k[1]);
        let err = Selection::new(k.clone()).resolve(&set).unwrap_err();
        assert!(matches!(err, RoiError::InvalidSelection(SelectionError::Missing(m)) if m == k[1]));
    }

    #[test]
    fn cancelled_does_not_proceed() {
        let selection = Selection::cancelled();
        assert!(!selection.proceeds());
        assert!(selection.is_empty());
    }
}
