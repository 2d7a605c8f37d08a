pub mod contour;
pub mod region;
pub mod shape;

pub use contour::{Contour, ContourVertex};
pub use region::Region;
pub use shape::Shape;
