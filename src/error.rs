use thiserror::Error;

use crate::operations::SubModelId;
use crate::roi::RoiKey;

/// Top-level error type for ROI classification and composition.
#[derive(Debug, Error)]
pub enum RoiError {
    #[error(transparent)]
    InvalidSelection(#[from] SelectionError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Identity(#[from] IdentityError),
}

/// A composite operator was invoked with an empty or inconsistent selection.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("selection is empty")]
    Empty,

    #[error("selected ROI {0} is not in the working set")]
    Missing(RoiKey),

    #[error("no target ROI remains after removing the selection")]
    NoTargets,

    #[error("ROI {0} cannot be subtracted from itself")]
    SelfSubtraction(RoiKey),

    #[error("unknown sub-model {0:?}")]
    UnknownSubModel(SubModelId),

    #[error("no sub-model is active")]
    NoActiveSubModel,
}

/// Errors raised by boundary geometry and scan-line classification.
#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("boundary does not close: scan line {line} ends with winding number {winding}")]
    MalformedBoundary { line: f64, winding: i32 },

    #[error("ROI outline is still under construction")]
    Unfinished,

    #[error("ROI outline is already finished")]
    AlreadyFinished,

    #[error("outline needs at least 3 points, got {0}")]
    DegenerateOutline(usize),

    #[error("grid mapping spacing must be finite and non-zero: ({dx}, {dy})")]
    DegenerateMapping { dx: f64, dy: f64 },

    #[error("flatness tolerance must be positive, got {0}")]
    InvalidTolerance(f64),
}

/// Errors related to ROI identity within a working set.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentityError {
    #[error("identity {0} already exists in the working set")]
    Collision(RoiKey),

    #[error("key {0} was not issued by this working set")]
    UnknownKey(RoiKey),
}

/// Convenience type alias for results using [`RoiError`].
pub type Result<T> = std::result::Result<T, RoiError>;
