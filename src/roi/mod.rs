//! Regions of interest: identity, presentation and the shape family.

pub mod outline;
pub mod proxy;
pub mod set;

use std::borrow::Cow;
use std::fmt;

use slotmap::Key;

pub use outline::Outline;
pub use proxy::RoiProxy;
pub use set::RoiSet;

use crate::error::Result;
use crate::geometry::{Region, Shape};
use crate::grid::{
    Grid, GridClassifier, GridMapping, GridPointDivisionRecipient, GridPointRecipient, GridWindow,
    RoiRelativePosition,
};
use crate::math::Point2;
use crate::operations::query::{ComputeShapeFactors, ShapeFactors};

slotmap::new_key_type! {
    /// Immutable identity key of an ROI, issued by a [`RoiSet`].
    pub struct RoiKey;
}

impl fmt::Display for RoiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.data())
    }
}

/// The `(key, label)` pair distinguishing one ROI from another.
///
/// The key never changes. Without a custom label the label is the key's
/// string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityTag {
    key: RoiKey,
    custom_label: Option<String>,
}

impl IdentityTag {
    /// A tag whose label is the key's string form.
    #[must_use]
    pub fn new(key: RoiKey) -> Self {
        Self {
            key,
            custom_label: None,
        }
    }

    /// A tag with an optional custom label.
    #[must_use]
    pub fn with_label(key: RoiKey, label: Option<String>) -> Self {
        Self {
            key,
            custom_label: label,
        }
    }

    /// The identity key.
    #[must_use]
    pub fn key(&self) -> RoiKey {
        self.key
    }

    /// The custom label, or the key's string form without one.
    #[must_use]
    pub fn label(&self) -> Cow<'_, str> {
        match &self.custom_label {
            Some(label) => Cow::Borrowed(label),
            None => Cow::Owned(self.key.to_string()),
        }
    }

    /// The custom label, if one was set.
    #[must_use]
    pub fn custom_label(&self) -> Option<&str> {
        self.custom_label.as_deref()
    }

    /// Replaces the custom label.
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.custom_label = Some(label.into());
    }

    /// Falls back to the key's string form.
    pub fn clear_label(&mut self) {
        self.custom_label = None;
    }
}

impl fmt::Display for IdentityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Presentation attributes. Ignored by [`Roi::equals_up_to_style`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoiStyle {
    /// RGBA outline color.
    pub color: [u8; 4],
    pub line_width: f64,
}

impl Default for RoiStyle {
    fn default() -> Self {
        Self {
            color: [255, 200, 100, 255],
            line_width: 1.0,
        }
    }
}

/// The shape family.
#[derive(Debug, Clone, PartialEq)]
pub enum RoiKind {
    Polygon(Outline),
    FreeHand(Outline),
    MagicWandPath(Outline),
    /// `dataset_area − inner`, drawn with the polygon tool.
    PolygonHole { dataset_area: Shape, inner: Outline },
    /// `dataset_area − inner`, selected with the magic wand.
    MagicWandHole { dataset_area: Shape, inner: Outline },
    /// Result of a complement or difference construction.
    Derived(Shape),
    /// Another ROI under an overriding identity; all geometry delegates to it.
    Wrapper(Box<Roi>),
}

/// A region of interest: identity, style and shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Roi {
    identity: IdentityTag,
    style: RoiStyle,
    kind: RoiKind,
}

impl Roi {
    /// An ROI of `kind` with the default style.
    #[must_use]
    pub fn new(key: RoiKey, kind: RoiKind) -> Self {
        Self {
            identity: IdentityTag::new(key),
            style: RoiStyle::default(),
            kind,
        }
    }

    /// A polygon ROI, finished or still being drawn.
    #[must_use]
    pub fn polygon(key: RoiKey, outline: Outline) -> Self {
        Self::new(key, RoiKind::Polygon(outline))
    }

    /// A free-hand ROI, finished or still being drawn.
    #[must_use]
    pub fn free_hand(key: RoiKey, outline: Outline) -> Self {
        Self::new(key, RoiKind::FreeHand(outline))
    }

    /// Wand selections are complete when created.
    #[must_use]
    pub fn magic_wand_path(key: RoiKey, region: Region) -> Self {
        Self::new(key, RoiKind::MagicWandPath(Outline::finished(region)))
    }

    /// Cuts `inner` out of a copy of `dataset_area`.
    #[must_use]
    pub fn polygon_hole(key: RoiKey, dataset_area: &Shape, inner: Outline) -> Self {
        Self::new(
            key,
            RoiKind::PolygonHole {
                dataset_area: dataset_area.clone(),
                inner,
            },
        )
    }

    /// Cuts a wand selection out of a copy of `dataset_area`.
    #[must_use]
    pub fn magic_wand_hole(key: RoiKey, dataset_area: &Shape, inner: Region) -> Self {
        Self::new(
            key,
            RoiKind::MagicWandHole {
                dataset_area: dataset_area.clone(),
                inner: Outline::finished(inner),
            },
        )
    }

    /// An ROI holding the result of a composite operation.
    #[must_use]
    pub fn derived(key: RoiKey, shape: Shape) -> Self {
        Self::new(key, RoiKind::Derived(shape))
    }

    /// Presents `inner` under a different identity.
    #[must_use]
    pub fn wrap(inner: Roi, key: RoiKey, label: Option<String>) -> Self {
        Self {
            identity: IdentityTag::with_label(key, label),
            style: inner.style,
            kind: RoiKind::Wrapper(Box::new(inner)),
        }
    }

    /// Replaces the style.
    #[must_use]
    pub fn with_style(mut self, style: RoiStyle) -> Self {
        self.style = style;
        self
    }

    /// Sets a custom label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.identity.set_label(label);
        self
    }

    /// Key and label.
    #[must_use]
    pub fn identity(&self) -> &IdentityTag {
        &self.identity
    }

    /// The identity key.
    #[must_use]
    pub fn key(&self) -> RoiKey {
        self.identity.key
    }

    /// The custom label, or the key's string form without one.
    #[must_use]
    pub fn label(&self) -> Cow<'_, str> {
        self.identity.label()
    }

    /// Replaces the custom label.
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.identity.set_label(label);
    }

    /// Falls back to the key's string form.
    pub fn clear_label(&mut self) {
        self.identity.clear_label();
    }

    /// Display style.
    #[must_use]
    pub fn style(&self) -> &RoiStyle {
        &self.style
    }

    /// Replaces the display style.
    pub fn set_style(&mut self, style: RoiStyle) {
        self.style = style;
    }

    /// The variant, without unwrapping wrappers.
    #[must_use]
    pub fn kind(&self) -> &RoiKind {
        &self.kind
    }

    /// The geometry-bearing kind, looking through wrappers.
    #[must_use]
    pub fn geometry(&self) -> &RoiKind {
        match &self.kind {
            RoiKind::Wrapper(inner) => inner.geometry(),
            kind => kind,
        }
    }

    /// The outline being drawn, for interactive construction.
    pub fn outline_mut(&mut self) -> Option<&mut Outline> {
        match &mut self.kind {
            RoiKind::Polygon(outline)
            | RoiKind::FreeHand(outline)
            | RoiKind::MagicWandPath(outline)
            | RoiKind::PolygonHole { inner: outline, .. }
            | RoiKind::MagicWandHole { inner: outline, .. } => Some(outline),
            RoiKind::Derived(_) => None,
            RoiKind::Wrapper(inner) => inner.outline_mut(),
        }
    }

    /// Whether the geometry is complete.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        match self.geometry() {
            RoiKind::Polygon(outline)
            | RoiKind::FreeHand(outline)
            | RoiKind::MagicWandPath(outline)
            | RoiKind::PolygonHole { inner: outline, .. }
            | RoiKind::MagicWandHole { inner: outline, .. } => outline.is_finished(),
            RoiKind::Derived(_) | RoiKind::Wrapper(_) => true,
        }
    }

    /// The covered point set. Hole variants build `dataset_area − inner` on
    /// each call.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::GeometryError::Unfinished`] while the outline
    /// is under construction.
    pub fn shape(&self) -> Result<Shape> {
        match self.geometry() {
            RoiKind::Polygon(outline)
            | RoiKind::FreeHand(outline)
            | RoiKind::MagicWandPath(outline) => {
                Ok(Shape::Region(outline.require_region()?.clone()))
            }
            RoiKind::PolygonHole {
                dataset_area,
                inner,
            }
            | RoiKind::MagicWandHole {
                dataset_area,
                inner,
            } => Ok(Shape::difference(
                dataset_area.clone(),
                [Shape::Region(inner.require_region()?.clone())],
            )),
            RoiKind::Derived(shape) => Ok(shape.clone()),
            RoiKind::Wrapper(inner) => inner.shape(),
        }
    }

    /// Closed-region containment; `false` for an unfinished ROI.
    #[must_use]
    pub fn contains(&self, p: &Point2) -> bool {
        self.shape().is_ok_and(|shape| shape.contains(p))
    }

    /// An independent deep copy with the same identity and style.
    #[must_use]
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// A deep copy with the same identity and another style.
    #[must_use]
    pub fn copy_with_style(&self, style: RoiStyle) -> Self {
        self.clone().with_style(style)
    }

    /// A deep copy under a new key. Without `label` the label is the new key's string form.
    #[must_use]
    pub fn copy_with_identity(&self, key: RoiKey, label: Option<String>) -> Self {
        let mut copy = self.clone();
        copy.identity = IdentityTag::with_label(key, label);
        copy
    }

    /// A copy rotated counter-clockwise by `angle` radians about the anchor,
    /// keeping identity and style. Hole variants rotate their inner outline;
    /// the dataset area stays fixed.
    #[must_use]
    pub fn rotated_copy(&self, angle: f64, anchor_x: f64, anchor_y: f64) -> Self {
        let anchor = Point2::new(anchor_x, anchor_y);
        let kind = match &self.kind {
            RoiKind::Polygon(o) => RoiKind::Polygon(o.rotated(angle, &anchor)),
            RoiKind::FreeHand(o) => RoiKind::FreeHand(o.rotated(angle, &anchor)),
            RoiKind::MagicWandPath(o) => RoiKind::MagicWandPath(o.rotated(angle, &anchor)),
            RoiKind::PolygonHole {
                dataset_area,
                inner,
            } => RoiKind::PolygonHole {
                dataset_area: dataset_area.clone(),
                inner: inner.rotated(angle, &anchor),
            },
            RoiKind::MagicWandHole {
                dataset_area,
                inner,
            } => RoiKind::MagicWandHole {
                dataset_area: dataset_area.clone(),
                inner: inner.rotated(angle, &anchor),
            },
            RoiKind::Derived(shape) => RoiKind::Derived(shape.rotated(angle, &anchor)),
            RoiKind::Wrapper(inner) => {
                RoiKind::Wrapper(Box::new(inner.rotated_copy(angle, anchor_x, anchor_y)))
            }
        };
        Self {
            identity: self.identity.clone(),
            style: self.style,
            kind,
        }
    }

    /// Geometric equality of kind and boundary, ignoring identity, style and
    /// any provisional drawing point. Wrappers compare as their inner ROI.
    #[must_use]
    pub fn equals_up_to_style(&self, other: &Roi) -> bool {
        match (self.geometry(), other.geometry()) {
            (RoiKind::Polygon(a), RoiKind::Polygon(b))
            | (RoiKind::FreeHand(a), RoiKind::FreeHand(b))
            | (RoiKind::MagicWandPath(a), RoiKind::MagicWandPath(b)) => a.approx_eq(b),
            (
                RoiKind::PolygonHole {
                    dataset_area: da,
                    inner: ia,
                },
                RoiKind::PolygonHole {
                    dataset_area: db,
                    inner: ib,
                },
            )
            | (
                RoiKind::MagicWandHole {
                    dataset_area: da,
                    inner: ia,
                },
                RoiKind::MagicWandHole {
                    dataset_area: db,
                    inner: ib,
                },
            ) => da.approx_eq(db) && ia.approx_eq(ib),
            (RoiKind::Derived(a), RoiKind::Derived(b)) => a.approx_eq(b),
            _ => false,
        }
    }

    /// Area, perimeter and elongation at the given flatness tolerance.
    ///
    /// # Errors
    ///
    /// Fails for unfinished ROIs, non-positive tolerance or malformed boundaries.
    pub fn shape_factors(&self, flatness: f64) -> Result<ShapeFactors> {
        ComputeShapeFactors::new(&self.shape()?)
            .with_flatness(flatness)
            .execute()
    }

    /// A classifier for this ROI's shape with default scan parameters.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::GeometryError::Unfinished`] while under construction.
    pub fn classifier(&self) -> Result<GridClassifier> {
        Ok(GridClassifier::new(&self.shape()?))
    }

    /// Delivers the grid points selected by `position`.
    ///
    /// [`RoiRelativePosition::Everything`] selects the whole grid and works
    /// even for an unfinished ROI.
    ///
    /// # Errors
    ///
    /// Fails for unfinished ROIs or malformed boundaries; nothing is delivered then.
    pub fn add_points<M, R>(
        &self,
        grid: &Grid,
        mapping: &M,
        position: RoiRelativePosition,
        recipient: &mut R,
    ) -> Result<()>
    where
        M: GridMapping + ?Sized,
        R: GridPointRecipient + ?Sized,
    {
        if !position.depends_on_roi() {
            match grid.point_count() {
                0 => {}
                1 => recipient.add_point(0, 0),
                _ => recipient.add_block(0, grid.rows, 0, grid.columns),
            }
            return Ok(());
        }
        self.classifier()?
            .add_points(grid, mapping, position, recipient)
    }

    /// Splits the inclusive `window` into inside and outside points in one pass.
    ///
    /// # Errors
    ///
    /// Fails for unfinished ROIs or malformed boundaries; nothing is delivered then.
    pub fn divide_points<M, R>(
        &self,
        grid: &Grid,
        mapping: &M,
        window: &GridWindow,
        recipient: &mut R,
    ) -> Result<()>
    where
        M: GridMapping + ?Sized,
        R: GridPointDivisionRecipient + ?Sized,
    {
        self.classifier()?
            .divide_points(grid, mapping, window, recipient)
    }

    /// Conservative inside count; the whole grid for an unfinished ROI.
    #[must_use]
    pub fn points_inside_count_upper_bound<M: GridMapping + ?Sized>(
        &self,
        grid: &Grid,
        mapping: &M,
    ) -> usize {
        self.classifier().map_or(grid.point_count(), |c| {
            c.points_inside_count_upper_bound(grid, mapping)
        })
    }

    /// Never less than the number of outside points.
    #[must_use]
    pub fn points_outside_count_upper_bound(&self, grid: &Grid) -> usize {
        grid.point_count()
    }

    /// Upper bound for the points `add_points` delivers for `position`.
    #[must_use]
    pub fn point_count_upper_bound<M: GridMapping + ?Sized>(
        &self,
        grid: &Grid,
        mapping: &M,
        position: RoiRelativePosition,
    ) -> usize {
        match position {
            RoiRelativePosition::Everything => grid.point_count(),
            RoiRelativePosition::Inside => self.points_inside_count_upper_bound(grid, mapping),
            RoiRelativePosition::Outside => self.points_outside_count_upper_bound(grid),
        }
    }
}
