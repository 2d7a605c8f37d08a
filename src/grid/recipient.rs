/// Receives classified grid points, one at a time or as rectangular blocks.
///
/// Block bounds are half-open: `row_from..row_to` and `column_from..column_to`.
pub trait GridPointRecipient {
    fn add_point(&mut self, row: usize, column: usize);

    /// Adds every point of a block. Implementors that can store blocks
    /// directly should override this.
    fn add_block(&mut self, row_from: usize, row_to: usize, column_from: usize, column_to: usize) {
        for row in row_from..row_to {
            for column in column_from..column_to {
                self.add_point(row, column);
            }
        }
    }
}

impl<R: GridPointRecipient + ?Sized> GridPointRecipient for &mut R {
    fn add_point(&mut self, row: usize, column: usize) {
        (**self).add_point(row, column);
    }

    fn add_block(&mut self, row_from: usize, row_to: usize, column_from: usize, column_to: usize) {
        (**self).add_block(row_from, row_to, column_from, column_to);
    }
}

/// Two-channel recipient receiving both inside and outside points from a
/// single classification pass.
pub trait GridPointDivisionRecipient {
    fn add_inside_point(&mut self, row: usize, column: usize);

    fn add_outside_point(&mut self, row: usize, column: usize);

    fn add_inside_block(
        &mut self,
        row_from: usize,
        row_to: usize,
        column_from: usize,
        column_to: usize,
    ) {
        for row in row_from..row_to {
            for column in column_from..column_to {
                self.add_inside_point(row, column);
            }
        }
    }

    fn add_outside_block(
        &mut self,
        row_from: usize,
        row_to: usize,
        column_from: usize,
        column_to: usize,
    ) {
        for row in row_from..row_to {
            for column in column_from..column_to {
                self.add_outside_point(row, column);
            }
        }
    }
}

/// Materialises every received point as `(row, column)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointCollector {
    points: Vec<(usize, usize)>,
}

impl PointCollector {
    /// An empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-sizes the buffer, typically from a count upper bound.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    /// Points in delivery order.
    #[must_use]
    pub fn points(&self) -> &[(usize, usize)] {
        &self.points
    }

    /// Takes the points in delivery order.
    #[must_use]
    pub fn into_points(self) -> Vec<(usize, usize)> {
        self.points
    }

    /// Number of points received.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether no point was received.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points sorted row-major, for order-independent comparison.
    #[must_use]
    pub fn sorted(&self) -> Vec<(usize, usize)> {
        let mut points = self.points.clone();
        points.sort_unstable();
        points
    }
}

impl GridPointRecipient for PointCollector {
    fn add_point(&mut self, row: usize, column: usize) {
        self.points.push((row, column));
    }
}

/// Counts points and the callbacks that delivered them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointCounter {
    pub points: usize,
    pub point_calls: usize,
    pub block_calls: usize,
}

impl GridPointRecipient for PointCounter {
    fn add_point(&mut self, _row: usize, _column: usize) {
        self.points += 1;
        self.point_calls += 1;
    }

    fn add_block(&mut self, row_from: usize, row_to: usize, column_from: usize, column_to: usize) {
        self.points += (row_to - row_from) * (column_to - column_from);
        self.block_calls += 1;
    }
}

/// Collects the inside and outside channels separately.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DivisionCollector {
    pub inside: PointCollector,
    pub outside: PointCollector,
}

impl GridPointDivisionRecipient for DivisionCollector {
    fn add_inside_point(&mut self, row: usize, column: usize) {
        self.inside.add_point(row, column);
    }

    fn add_outside_point(&mut self, row: usize, column: usize) {
        self.outside.add_point(row, column);
    }

    fn add_inside_block(
        &mut self,
        row_from: usize,
        row_to: usize,
        column_from: usize,
        column_to: usize,
    ) {
        self.inside.add_block(row_from, row_to, column_from, column_to);
    }

    fn add_outside_block(
        &mut self,
        row_from: usize,
        row_to: usize,
        column_from: usize,
        column_to: usize,
    ) {
        self.outside.add_block(row_from, row_to, column_from, column_to);
    }
}
