use nalgebra as na;
use std::fmt;
use std::str::FromStr;

pub type Point = na::Point3<f64>;

/// Box extents along the local x, y and z axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimensions {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    pub fn new(length: f64, width: f64, height: f64) -> Self {
        Self {
            length,
            width,
            height,
        }
    }

    pub fn is_positive(&self) -> bool {
        self.length > 0.0 && self.width > 0.0 && self.height > 0.0
    }

    pub fn volume(&self) -> f64 {
        self.length * self.width * self.height
    }
}

/// Rotation angles in degrees around the x, y and z axes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rotations {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Rotations {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

/// Wireframe topology over the eight box vertices.
///
/// ```text
/// 0: (-L/2,-W/2,-H/2)  1: (-L/2,+W/2,-H/2)  2: (+L/2,+W/2,-H/2)  3: (+L/2,-W/2,-H/2)
/// 4: (-L/2,-W/2,+H/2)  5: (-L/2,+W/2,+H/2)  6: (+L/2,+W/2,+H/2)  7: (+L/2,-W/2,+H/2)
/// ```
pub const BBOX_EDGES: [(usize, usize); 12] = [
    (0, 1),
    (0, 3),
    (0, 4),
    (2, 1),
    (2, 3),
    (2, 6),
    (5, 1),
    (5, 4),
    (5, 6),
    (7, 3),
    (7, 4),
    (7, 6),
];

/// One of the six named faces of a box.
///
/// `left`/`right` are the -x/+x faces, `back`/`front` the -y/+y faces and
/// `bottom`/`top` the -z/+z faces of the local frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
    Front,
    Back,
}

impl Side {
    /// Iteration order used wherever faces are enumerated.
    pub const ALL: [Side; 6] = [
        Side::Top,
        Side::Bottom,
        Side::Left,
        Side::Right,
        Side::Front,
        Side::Back,
    ];

    /// Vertex indices of the face, in cyclic order around its border.
    pub fn vertex_indices(self) -> [usize; 4] {
        match self {
            Side::Top => [4, 5, 6, 7],
            Side::Bottom => [0, 1, 2, 3],
            Side::Left => [0, 1, 5, 4],
            Side::Right => [3, 2, 6, 7],
            Side::Front => [1, 2, 6, 5],
            Side::Back => [0, 3, 7, 4],
        }
    }

    /// `(moving, anchor)` vertex pair used when extruding this face.
    ///
    /// The direction from `anchor` to `moving` points out of the face, so the
    /// opposite face stays put while this one travels.
    pub fn extrusion_pair(self) -> (usize, usize) {
        match self {
            Side::Right => (3, 0),
            Side::Left => (0, 3),
            Side::Front => (1, 0),
            Side::Back => (0, 1),
            Side::Top => (4, 0),
            Side::Bottom => (0, 4),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Side::Top => "top",
            Side::Bottom => "bottom",
            Side::Left => "left",
            Side::Right => "right",
            Side::Front => "front",
            Side::Back => "back",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown side name: {0:?}")]
pub struct UnknownSide(pub String);

impl FromStr for Side {
    type Err = UnknownSide;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Side::ALL
            .into_iter()
            .find(|side| side.name() == s)
            .ok_or_else(|| UnknownSide(s.to_string()))
    }
}
