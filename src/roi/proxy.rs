//! Reconstruction proxies: minimal snapshots from which an equivalent ROI can
//! be rebuilt once the caller supplies a style and a key.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geometry::{Contour, ContourVertex, Region, Shape};
use crate::math::Point2;

use super::{Outline, Roi, RoiKey, RoiKind, RoiStyle};

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PathVertex {
    pub x: f64,
    pub y: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub bulge: f64,
}

impl From<&ContourVertex> for PathVertex {
    fn from(v: &ContourVertex) -> Self {
        Self {
            x: v.point.x,
            y: v.point.y,
            bulge: v.bulge,
        }
    }
}

impl From<&PathVertex> for ContourVertex {
    fn from(v: &PathVertex) -> Self {
        ContourVertex {
            point: Point2::new(v.x, v.y),
            bulge: v.bulge,
        }
    }
}

/// Boundary path: one vertex list per closed contour.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PathData {
    pub contours: Vec<Vec<PathVertex>>,
}

impl PathData {
    fn from_vertices(vertices: &[ContourVertex]) -> Self {
        Self {
            contours: vec![vertices.iter().map(PathVertex::from).collect()],
        }
    }

    /// Rebuilds the region from its contours.
    #[must_use]
    pub fn to_region(&self) -> Region {
        Region::new(
            self.contours
                .iter()
                .map(|c| Contour::new(c.iter().map(ContourVertex::from).collect()))
                .collect(),
        )
    }

    /// All vertices in contour order, flattened into one list.
    fn to_vertices(&self) -> Vec<ContourVertex> {
        self.contours
            .iter()
            .flatten()
            .map(ContourVertex::from)
            .collect()
    }
}

impl From<&Region> for PathData {
    fn from(region: &Region) -> Self {
        Self {
            contours: region
                .contours()
                .iter()
                .map(|c| c.vertices().iter().map(PathVertex::from).collect())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ShapeData {
    Area(PathData),
    Difference {
        minuend: Box<ShapeData>,
        subtrahends: Vec<ShapeData>,
    },
}

impl From<&Shape> for ShapeData {
    fn from(shape: &Shape) -> Self {
        match shape {
            Shape::Region(region) => Self::Area(region.into()),
            Shape::Difference {
                minuend,
                subtrahends,
            } => Self::Difference {
                minuend: Box::new(Self::from(&**minuend)),
                subtrahends: subtrahends.iter().map(Self::from).collect(),
            },
        }
    }
}

impl ShapeData {
    /// Rebuilds the shape tree.
    #[must_use]
    pub fn to_shape(&self) -> Shape {
        match self {
            Self::Area(path) => Shape::Region(path.to_region()),
            Self::Difference {
                minuend,
                subtrahends,
            } => Shape::difference(minuend.to_shape(), subtrahends.iter().map(Self::to_shape)),
        }
    }
}

/// Outline snapshot. An unfinished outline keeps its fixed points as a single
/// contour; the provisional point is not kept.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OutlineData {
    pub path: PathData,
    pub custom_label: Option<String>,
    pub finished: bool,
}

impl OutlineData {
    fn new(outline: &Outline, custom_label: Option<&str>) -> Self {
        let (path, finished) = match outline {
            Outline::Finished(region) => (region.into(), true),
            Outline::UnderConstruction { fixed, .. } => (PathData::from_vertices(fixed), false),
        };
        Self {
            path,
            custom_label: custom_label.map(str::to_owned),
            finished,
        }
    }

    fn to_outline(&self) -> Outline {
        if self.finished {
            Outline::finished(self.path.to_region())
        } else {
            Outline::UnderConstruction {
                fixed: self.path.to_vertices(),
                provisional: None,
            }
        }
    }
}

/// One snapshot variant per ROI kind.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RoiProxy {
    Polygon(OutlineData),
    FreeHand(OutlineData),
    MagicWandPath(OutlineData),
    PolygonHole {
        outline: OutlineData,
        dataset_area: ShapeData,
    },
    MagicWandHole {
        outline: OutlineData,
        dataset_area: ShapeData,
    },
    Derived {
        shape: ShapeData,
        custom_label: Option<String>,
    },
    Wrapper {
        inner: Box<RoiProxy>,
        custom_label: Option<String>,
    },
}

impl RoiProxy {
    /// Rebuilds the ROI under `key` with `style`. The label is the stored
    /// custom label, or the key's string form when none was stored.
    #[must_use]
    pub fn recreate_original_object(&self, style: RoiStyle, key: RoiKey) -> Roi {
        let (kind, label) = match self {
            Self::Polygon(o) => (RoiKind::Polygon(o.to_outline()), o.custom_label.clone()),
            Self::FreeHand(o) => (RoiKind::FreeHand(o.to_outline()), o.custom_label.clone()),
            Self::MagicWandPath(o) => (
                RoiKind::MagicWandPath(o.to_outline()),
                o.custom_label.clone(),
            ),
            Self::PolygonHole {
                outline,
                dataset_area,
            } => (
                RoiKind::PolygonHole {
                    dataset_area: dataset_area.to_shape(),
                    inner: outline.to_outline(),
                },
                outline.custom_label.clone(),
            ),
            Self::MagicWandHole {
                outline,
                dataset_area,
            } => (
                RoiKind::MagicWandHole {
                    dataset_area: dataset_area.to_shape(),
                    inner: outline.to_outline(),
                },
                outline.custom_label.clone(),
            ),
            Self::Derived {
                shape,
                custom_label,
            } => (RoiKind::Derived(shape.to_shape()), custom_label.clone()),
            Self::Wrapper {
                inner,
                custom_label,
            } => (
                RoiKind::Wrapper(Box::new(inner.recreate_original_object(style, key))),
                custom_label.clone(),
            ),
        };
        let mut roi = Roi::new(key, kind).with_style(style);
        if let Some(label) = label {
            roi.set_label(label);
        }
        roi
    }
}

impl Roi {
    /// Snapshot sufficient to rebuild an equivalent ROI.
    #[must_use]
    pub fn proxy(&self) -> RoiProxy {
        let label = self.identity.custom_label();
        match &self.kind {
            RoiKind::Polygon(o) => RoiProxy::Polygon(OutlineData::new(o, label)),
            RoiKind::FreeHand(o) => RoiProxy::FreeHand(OutlineData::new(o, label)),
            RoiKind::MagicWandPath(o) => RoiProxy::MagicWandPath(OutlineData::new(o, label)),
            RoiKind::PolygonHole {
                dataset_area,
                inner,
            } => RoiProxy::PolygonHole {
                outline: OutlineData::new(inner, label),
                dataset_area: dataset_area.into(),
            },
            RoiKind::MagicWandHole {
                dataset_area,
                inner,
            } => RoiProxy::MagicWandHole {
                outline: OutlineData::new(inner, label),
                dataset_area: dataset_area.into(),
            },
            RoiKind::Derived(shape) => RoiProxy::Derived {
                shape: shape.into(),
                custom_label: label.map(str::to_owned),
            },
            RoiKind::Wrapper(inner) => RoiProxy::Wrapper {
                inner: Box::new(inner.proxy()),
                custom_label: label.map(str::to_owned),
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::roi::tests::{every_variant, keys};

    fn style() -> RoiStyle {
        RoiStyle {
            color: [10, 20, 30, 255],
            line_width: 2.5,
        }
    }

    #[test]
    fn recreated_roi_equals_original_for_every_variant() {
        let ks = keys(9);
        for roi in every_variant(&ks) {
            for key in [roi.key(), ks[8]] {
                let rebuilt = roi.proxy().recreate_original_object(style(), key);
                assert!(rebuilt.equals_up_to_style(&roi), "{:?}", roi.kind());
                assert_eq!(rebuilt.is_finished(), roi.is_finished());
                assert_eq!(rebuilt.key(), key);
                assert_eq!(rebuilt.style(), &style());
            }
        }
    }

    #[test]
    fn label_defaults_to_new_key() {
        let ks = keys(8);
        let roi = every_variant(&ks).swap_remove(0);
        let rebuilt = roi.proxy().recreate_original_object(style(), ks[1]);
        assert_eq!(rebuilt.label(), ks[1].to_string());

        let labelled = roi.with_label("nucleus");
        let rebuilt = labelled.proxy().recreate_original_object(style(), ks[1]);
        assert_eq!(rebuilt.label(), "nucleus");
    }

    #[test]
    fn unfinished_outline_round_trips_without_provisional_point() {
        let ks = keys(1);
        let mut outline = Outline::new();
        outline.push_point(Point2::new(0.0, 0.0)).unwrap();
        outline.push_point(Point2::new(2.0, 0.0)).unwrap();
        outline.set_provisional(Some(Point2::new(5.0, 5.0))).unwrap();
        let roi = Roi::polygon(ks[0], outline);

        let rebuilt = roi.proxy().recreate_original_object(RoiStyle::default(), ks[0]);
        assert!(!rebuilt.is_finished());
        assert!(rebuilt.equals_up_to_style(&roi));
        match rebuilt.kind() {
            RoiKind::Polygon(Outline::UnderConstruction { fixed, provisional }) => {
                assert_eq!(fixed.len(), 2);
                assert!(provisional.is_none());
            }
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn hole_proxy_carries_dataset_area() {
        let ks = keys(8);
        let hole = every_variant(&ks).swap_remove(3);
        let RoiProxy::PolygonHole { dataset_area, .. } = hole.proxy() else {
            panic!("expected a polygon hole proxy");
        };
        assert!(matches!(dataset_area, ShapeData::Area(_)));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_round_trip_rebuilds_equivalent_roi() {
        let ks = keys(8);
        for roi in every_variant(&ks) {
            let json = serde_json::to_string(&roi.proxy()).unwrap();
            let proxy: RoiProxy = serde_json::from_str(&json).unwrap();
            let rebuilt = proxy.recreate_original_object(style(), roi.key());
            assert!(rebuilt.equals_up_to_style(&roi));
            assert_eq!(rebuilt.label(), roi.label());
        }
    }

    #[cfg(feature = "serde")]
    #[test]
    fn bulge_defaults_to_zero() {
        let v: PathVertex = serde_json::from_str(r#"{"x":1.0,"y":2.0}"#).unwrap();
        assert_eq!(v, PathVertex { x: 1.0, y: 2.0, bulge: 0.0 });
    }
}
