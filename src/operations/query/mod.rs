mod shape_factors;

pub use shape_factors::{ComputeShapeFactors, ShapeFactors, MAX_SHAPE_FACTOR_LINES};
