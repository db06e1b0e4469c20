//! Oriented 3D bounding boxes for point cloud labeling.
//!
//! The crate covers the geometric core of a labeling session: the compact
//! box model and its mutators, the closest-face connector drawn between
//! related boxes, fitting boxes to raw points, and reading and writing
//! label files. Rendering and point cloud I/O are left to the caller, which
//! receives plain vertex arrays and segment lists.

mod caliper;

pub mod batch;
pub mod bbox;
pub mod config;
pub mod fit;
pub mod labels;
pub mod math3d;
pub mod relationship;
pub mod types;

pub use crate::bbox::{Mutation, OrientedBoundingBox, Rejection};
pub use crate::config::{LabelConfig, LabelFormatKind, RotationMode};
pub use crate::fit::{fit_bbox, FitError};
pub use crate::labels::{format_for, LabelError, LabelFormat, LabelStore};
pub use crate::relationship::{closest_faces, Connector, Relationship};
pub use crate::types::{Dimensions, Point, Rotations, Side, BBOX_EDGES};
