use crate::error::{GeometryError, Result};
use crate::geometry::{Contour, ContourVertex, Region};
use crate::math::{points_approx_eq, rotate_about, Point2, TOLERANCE};

/// Boundary of a drawn ROI and its construction phase.
///
/// While drawing, points are fixed one by one and a provisional point follows
/// the pointer. Finishing closes the fixed points into a region; only
/// finished outlines take part in classification and composition.
#[derive(Debug, Clone, PartialEq)]
pub enum Outline {
    UnderConstruction {
        fixed: Vec<ContourVertex>,
        provisional: Option<Point2>,
    },
    Finished(Region),
}

impl Default for Outline {
    fn default() -> Self {
        Self::UnderConstruction {
            fixed: Vec::new(),
            provisional: None,
        }
    }
}

impl Outline {
    /// An empty outline waiting for its first point.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An outline that is already complete.
    #[must_use]
    pub fn finished(region: Region) -> Self {
        Self::Finished(region)
    }

    /// Whether the outline can no longer be edited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished(_))
    }

    /// The finished region, if any.
    #[must_use]
    pub fn region(&self) -> Option<&Region> {
        match self {
            Self::Finished(region) => Some(region),
            Self::UnderConstruction { .. } => None,
        }
    }

    /// The finished region.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Unfinished`] while under construction.
    pub fn require_region(&self) -> Result<&Region> {
        self.region().ok_or_else(|| GeometryError::Unfinished.into())
    }

    /// Fixes a straight-edged point and clears the provisional point.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::AlreadyFinished`] once finished.
    pub fn push_point(&mut self, point: Point2) -> Result<()> {
        self.push_vertex(ContourVertex::line(point))
    }

    /// Fixes a vertex whose bulge shapes the segment to the next vertex.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::AlreadyFinished`] once finished.
    pub fn push_vertex(&mut self, vertex: ContourVertex) -> Result<()> {
        match self {
            Self::UnderConstruction { fixed, provisional } => {
                fixed.push(vertex);
                *provisional = None;
                Ok(())
            }
            Self::Finished(_) => Err(GeometryError::AlreadyFinished.into()),
        }
    }

    /// Moves (or clears) the provisional point.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::AlreadyFinished`] once finished.
    pub fn set_provisional(&mut self, point: Option<Point2>) -> Result<()> {
        match self {
            Self::UnderConstruction { provisional, .. } => {
                *provisional = point;
                Ok(())
            }
            Self::Finished(_) => Err(GeometryError::AlreadyFinished.into()),
        }
    }

    /// Closes the fixed points into a single-contour region. The provisional
    /// point is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::AlreadyFinished`] if already finished, or
    /// [`GeometryError::DegenerateOutline`] with fewer than three fixed points.
    pub fn finish(&mut self) -> Result<()> {
        let Self::UnderConstruction { fixed, .. } = self else {
            return Err(GeometryError::AlreadyFinished.into());
        };
        if fixed.len() < 3 {
            return Err(GeometryError::DegenerateOutline(fixed.len()).into());
        }
        let contour = Contour::new(std::mem::take(fixed));
        *self = Self::Finished(Region::from_contour(contour));
        Ok(())
    }

    /// A copy rotated by `angle` radians about `anchor`.
    #[must_use]
    pub fn rotated(&self, angle: f64, anchor: &Point2) -> Self {
        match self {
            Self::UnderConstruction { fixed, provisional } => Self::UnderConstruction {
                fixed: fixed
                    .iter()
                    .map(|v| ContourVertex {
                        point: rotate_about(&v.point, angle, anchor),
                        bulge: v.bulge,
                    })
                    .collect(),
                provisional: provisional.map(|p| rotate_about(&p, angle, anchor)),
            },
            Self::Finished(region) => Self::Finished(region.rotated(angle, anchor)),
        }
    }

    /// Geometric comparison; the provisional point is transient and ignored.
    #[must_use]
    pub fn approx_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Finished(a), Self::Finished(b)) => a.approx_eq(b),
            (
                Self::UnderConstruction { fixed: a, .. },
                Self::UnderConstruction { fixed: b, .. },
            ) => {
                a.len() == b.len()
                    && a.iter().zip(b).all(|(va, vb)| {
                        points_approx_eq(&va.point, &vb.point)
                            && (va.bulge - vb.bulge).abs() <= TOLERANCE
                    })
            }
            _ => false,
        }
    }
}
