use crate::error::{GeometryError, Result};

use super::crossing::Crossing;

/// Converts crossings sorted by value into the values where insideness toggles.
///
/// Insideness is "winding number is non-zero". Crossings sharing an identical
/// value are applied together, so a boundary that touches the scan line and
/// reverses there contributes nothing. The result has even length and reads as
/// alternating `[enter, leave, enter, leave, ...]` values; a pair may be
/// zero-length but never negative.
///
/// `line` only labels the error.
///
/// # Errors
///
/// Returns [`GeometryError::MalformedBoundary`] if the winding number does not
/// return to zero after the last crossing.
pub fn resolve_winding(crossings: &[Crossing], line: f64) -> Result<Vec<f64>> {
    debug_assert!(
        crossings.windows(2).all(|w| w[0].cmp_value(&w[1]).is_le()),
        "crossings must be sorted by value"
    );

    let mut toggles = Vec::with_capacity(crossings.len());
    let mut winding = 0i32;
    let mut i = 0;
    while i < crossings.len() {
        let value = crossings[i].value;
        let mut delta = 0;
        while i < crossings.len() && crossings[i].value.total_cmp(&value).is_eq() {
            delta += crossings[i].direction.winding();
            i += 1;
        }
        let next = winding + delta;
        if (next == 0) != (winding == 0) {
            toggles.push(value);
        }
        winding = next;
    }

    if winding != 0 {
        tracing::warn!(line, winding, "scan line left a non-zero winding number");
        return Err(GeometryError::MalformedBoundary { line, winding }.into());
    }
    Ok(toggles)
}

/// Pairs resolved toggle values into closed `(enter, leave)` intervals.
#[must_use]
pub fn inside_intervals(toggles: &[f64]) -> Vec<(f64, f64)> {
    toggles.chunks_exact(2).map(|pair| (pair[0], pair[1])).collect()
}
