use std::cmp::Ordering;

/// Traversal direction of the boundary where it crosses a scan line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    /// Boundary moves towards decreasing coordinate.
    Downward,
    /// Boundary moves towards increasing coordinate.
    Upward,
}

impl Direction {
    /// Winding contribution: `+1` for [`Direction::Upward`], `-1` otherwise.
    #[must_use]
    pub fn winding(self) -> i32 {
        match self {
            Self::Upward => 1,
            Self::Downward => -1,
        }
    }
}

/// One boundary crossing of a scan line.
///
/// `value` is the coordinate along the scan line (x for horizontal lines).
/// Equality requires the exact value and the same direction; ordering for
/// resolution is by value only, see [`sort_crossings`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crossing {
    pub value: f64,
    pub direction: Direction,
}

impl Crossing {
    /// A crossing at `value`.
    #[must_use]
    pub fn new(value: f64, direction: Direction) -> Self {
        Self { value, direction }
    }

    /// A crossing where the boundary heads up.
    #[must_use]
    pub fn upward(value: f64) -> Self {
        Self::new(value, Direction::Upward)
    }

    /// A crossing where the boundary heads down.
    #[must_use]
    pub fn downward(value: f64) -> Self {
        Self::new(value, Direction::Downward)
    }

    /// Orders by value alone.
    #[must_use]
    pub fn cmp_value(&self, other: &Self) -> Ordering {
        self.value.total_cmp(&other.value)
    }
}

/// Sorts crossings ascending by value.
///
/// Equal values are placed `Downward` before `Upward` so the input handed to
/// the resolver is deterministic; the resolver itself nets out equal values.
pub fn sort_crossings(crossings: &mut [Crossing]) {
    crossings.sort_by(|a, b| a.cmp_value(b).then(a.direction.cmp(&b.direction)));
}
