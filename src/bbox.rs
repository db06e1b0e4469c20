//! Oriented bounding box model.
//!
//! A box is stored compactly as center, extents and per-axis rotation in
//! degrees. World-space corners are derived on demand and never cached, so
//! every mutator only has to keep the compact form consistent.

use crate::config::LabelConfig;
use crate::math3d::{normalize_degrees, rotate_point_around_center, translate_point};
use crate::types::{Dimensions, Point, Rotations, Side, BBOX_EDGES};
use std::fmt;
use tracing::warn;

/// Why a mutator left the box untouched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rejection {
    /// A dimension setter was given a non-positive value.
    NonPositiveDimension { value: f64 },
    /// A side extrusion would bring the dimension to or below the minimum.
    BelowMinimum { side: Side, resulting: f64, minimum: f64 },
    /// The class name was empty.
    EmptyClassname,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::NonPositiveDimension { value } => {
                write!(f, "dimension {value} is not positive")
            }
            Rejection::BelowMinimum {
                side,
                resulting,
                minimum,
            } => write!(
                f,
                "resizing {side} would leave {resulting}, minimum is {minimum}"
            ),
            Rejection::EmptyClassname => f.write_str("classname is empty"),
        }
    }
}

/// Result of a validated mutation.
///
/// Rejections are not errors: the box stays as it was and a warning is
/// logged. Callers that care can inspect the value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mutation {
    Applied,
    Rejected(Rejection),
}

impl Mutation {
    pub fn is_applied(&self) -> bool {
        matches!(self, Mutation::Applied)
    }

    fn reject(rejection: Rejection) -> Self {
        warn!(%rejection, "bounding box mutation rejected");
        Mutation::Rejected(rejection)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrientedBoundingBox {
    center: Point,
    dimensions: Dimensions,
    rotations: Rotations,
    classname: String,
    min_dimension: f64,
    local_vertices: [Point; 8],
}

impl OrientedBoundingBox {
    /// New axis-aligned box of the configured standard size.
    pub fn new(center: Point, config: &LabelConfig) -> Self {
        Self::with_dimensions(center, None, None, None, config)
    }

    /// New axis-aligned box; missing or non-positive extents fall back to the
    /// configured standard size.
    pub fn with_dimensions(
        center: Point,
        length: Option<f64>,
        width: Option<f64>,
        height: Option<f64>,
        config: &LabelConfig,
    ) -> Self {
        let standard = config.standard_dimensions();
        let pick =
            |given: Option<f64>, fallback: f64| given.filter(|v| *v > 0.0).unwrap_or(fallback);
        let dimensions = Dimensions::new(
            pick(length, standard.length),
            pick(width, standard.width),
            pick(height, standard.height),
        );

        Self {
            center,
            dimensions,
            rotations: Rotations::default(),
            classname: config.default_class.clone(),
            min_dimension: config.min_dimension,
            local_vertices: axis_aligned_vertices(&dimensions),
        }
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn rotations(&self) -> Rotations {
        self.rotations
    }

    pub fn classname(&self) -> &str {
        &self.classname
    }

    pub fn volume(&self) -> f64 {
        self.dimensions.volume()
    }

    /// Corners around the origin, before translation and rotation.
    pub fn local_vertices(&self) -> &[Point; 8] {
        &self.local_vertices
    }

    /// Corners translated to the center but not rotated.
    pub fn axis_aligned_vertices(&self) -> [Point; 8] {
        let c = self.center;
        self.local_vertices.map(|v| translate_point(&v, c.x, c.y, c.z))
    }

    /// World-space corners in the fixed vertex index order.
    pub fn world_vertices(&self) -> [Point; 8] {
        self.axis_aligned_vertices()
            .map(|v| rotate_point_around_center(&v, &self.center, self.rotations))
    }

    /// The 12 box edges as world-space segments, in [`BBOX_EDGES`] order.
    pub fn wireframe(&self) -> Vec<[Point; 2]> {
        let vertices = self.world_vertices();
        BBOX_EDGES
            .iter()
            .map(|&(a, b)| [vertices[a], vertices[b]])
            .collect()
    }

    /// Heading arrow along local +x: a shaft from the center and three barbs.
    pub fn orientation_arrow(&self) -> Vec<[Point; 2]> {
        let arrow_length = self.dimensions.length * 0.4;
        let tip = Point::new(arrow_length, 0.0, 0.0);
        let barbs = [
            Point::new(arrow_length * 0.8, arrow_length * 0.3, 0.0),
            Point::new(arrow_length * 0.8, arrow_length * -0.3, 0.0),
            Point::new(arrow_length * 0.8, 0.0, arrow_length * 0.3),
        ];

        let to_world = |p: Point| {
            let moved = translate_point(&p, self.center.x, self.center.y, self.center.z);
            rotate_point_around_center(&moved, &self.center, self.rotations)
        };

        let mut segments = vec![[to_world(Point::origin()), to_world(tip)]];
        segments.extend(barbs.into_iter().map(|b| [to_world(tip), to_world(b)]));
        segments
    }

    pub fn set_classname(&mut self, classname: &str) -> Mutation {
        if classname.is_empty() {
            return Mutation::reject(Rejection::EmptyClassname);
        }
        self.classname = classname.to_string();
        Mutation::Applied
    }

    pub fn set_dimensions(&mut self, length: f64, width: f64, height: f64) -> Mutation {
        if let Some(value) = [length, width, height].into_iter().find(|v| !(*v > 0.0)) {
            return Mutation::reject(Rejection::NonPositiveDimension { value });
        }
        self.store_dimensions(Dimensions::new(length, width, height));
        Mutation::Applied
    }

    pub fn set_length(&mut self, length: f64) -> Mutation {
        let Dimensions { width, height, .. } = self.dimensions;
        self.set_dimensions(length, width, height)
    }

    pub fn set_width(&mut self, width: f64) -> Mutation {
        let Dimensions { length, height, .. } = self.dimensions;
        self.set_dimensions(length, width, height)
    }

    pub fn set_height(&mut self, height: f64) -> Mutation {
        let Dimensions { length, width, .. } = self.dimensions;
        self.set_dimensions(length, width, height)
    }

    pub fn set_x_rotation(&mut self, angle: f64) {
        self.rotations.x = normalize_degrees(angle);
    }

    pub fn set_y_rotation(&mut self, angle: f64) {
        self.rotations.y = normalize_degrees(angle);
    }

    pub fn set_z_rotation(&mut self, angle: f64) {
        self.rotations.z = normalize_degrees(angle);
    }

    pub fn set_rotations(&mut self, rotations: Rotations) {
        self.set_x_rotation(rotations.x);
        self.set_y_rotation(rotations.y);
        self.set_z_rotation(rotations.z);
    }

    pub fn set_x_translation(&mut self, x: f64) {
        self.center.x = x;
    }

    pub fn set_y_translation(&mut self, y: f64) {
        self.center.y = y;
    }

    pub fn set_z_translation(&mut self, z: f64) {
        self.center.z = z;
    }

    pub fn translate(&mut self, dx: f64, dy: f64, dz: f64) {
        self.center = translate_point(&self.center, dx, dy, dz);
    }

    /// Move one face by `delta` along its outward normal, keeping the
    /// opposite face fixed in world space.
    pub fn resize_along_side(&mut self, side: Side, delta: f64) -> Mutation {
        let mut dimensions = self.dimensions;
        let extent = match side {
            Side::Left | Side::Right => &mut dimensions.length,
            Side::Front | Side::Back => &mut dimensions.width,
            Side::Top | Side::Bottom => &mut dimensions.height,
        };
        let resulting = *extent + delta;
        if !(resulting > self.min_dimension) {
            return Mutation::reject(Rejection::BelowMinimum {
                side,
                resulting,
                minimum: self.min_dimension,
            });
        }
        *extent = resulting;

        let (moving, anchor) = side.extrusion_pair();
        let vertices = self.world_vertices();
        let direction = (vertices[moving] - vertices[anchor]).normalize() * (delta / 2.0);

        self.store_dimensions(dimensions);
        self.translate(direction.x, direction.y, direction.z);
        Mutation::Applied
    }

    fn store_dimensions(&mut self, dimensions: Dimensions) {
        self.dimensions = dimensions;
        self.local_vertices = axis_aligned_vertices(&dimensions);
    }
}

fn axis_aligned_vertices(d: &Dimensions) -> [Point; 8] {
    let (l, w, h) = (d.length / 2.0, d.width / 2.0, d.height / 2.0);
    [
        Point::new(-l, -w, -h),
        Point::new(-l, w, -h),
        Point::new(l, w, -h),
        Point::new(l, -w, -h),
        Point::new(-l, -w, h),
        Point::new(-l, w, h),
        Point::new(l, w, h),
        Point::new(l, -w, h),
    ]
}
