pub mod complement;
pub mod difference;
pub mod hole;
pub mod query;
pub mod selection;

pub use complement::Complement;
pub use difference::{Difference, SubModelId};
pub use hole::MakeHole;
pub use selection::Selection;

use crate::error::{IdentityError, Result};
use crate::geometry::Shape;
use crate::roi::{Roi, RoiKey, RoiSet};

/// Inserts one derived ROI per shape, then removes the `released` ROIs.
///
/// A shape paired with a key is inserted under that key, which must be
/// reserved or held by one of the `released` ROIs; other shapes get fresh
/// keys. Every key is checked before the set is touched.
pub(crate) fn commit_derived(
    set: &mut RoiSet,
    results: Vec<(Option<RoiKey>, Shape)>,
    label: Option<&str>,
    released: &[RoiKey],
) -> Result<Vec<RoiKey>> {
    let mut reused: Vec<RoiKey> = Vec::new();
    for key in results.iter().filter_map(|(key, _)| *key) {
        if reused.contains(&key) {
            return Err(IdentityError::Collision(key).into());
        }
        set.ensure_vacant(key, released)?;
        reused.push(key);
    }
    for &key in &reused {
        set.vacate(key);
    }

    let mut created = Vec::with_capacity(results.len());
    for (key, shape) in results {
        let build = |key: RoiKey| {
            let roi = Roi::derived(key, shape);
            match label {
                Some(label) => roi.with_label(label),
                None => roi,
            }
        };
        let key = match key {
            Some(key) => set.insert(build(key))?,
            None => set.insert_new(build)?,
        };
        created.push(key);
    }
    for &key in released {
        if !reused.contains(&key) {
            set.remove(key);
        }
    }
    Ok(created)
}
