//! Relationships between boxes and the connector drawn between them.

use crate::math3d::{centroid, euclidean_sq_distance};
use crate::types::{Point, Side, BBOX_EDGES};
use itertools::iproduct;

/// A named, directed link between two boxes of the same point cloud.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub from: usize,
    pub to: usize,
    pub name: String,
}

impl Relationship {
    pub fn new(from: usize, to: usize, name: impl Into<String>) -> Self {
        Self {
            from,
            to,
            name: name.into(),
        }
    }
}

pub fn face_centroid(vertices: &[Point; 8], side: Side) -> Point {
    centroid(side.vertex_indices().iter().map(|&i| &vertices[i]))
}

/// Face pair whose centroids are closest, first match winning ties.
pub fn closest_faces(first: &[Point; 8], second: &[Point; 8]) -> (Side, Side) {
    let centroids_first = Side::ALL.map(|side| face_centroid(first, side));
    let centroids_second = Side::ALL.map(|side| face_centroid(second, side));

    let mut best = (Side::ALL[0], Side::ALL[0]);
    let mut best_distance = f64::INFINITY;
    for (i, j) in iproduct!(0..Side::ALL.len(), 0..Side::ALL.len()) {
        let distance = euclidean_sq_distance(&centroids_first[i], &centroids_second[j]);
        if distance < best_distance {
            best_distance = distance;
            best = (Side::ALL[i], Side::ALL[j]);
        }
    }
    best
}

fn face_vertices(vertices: &[Point; 8], side: Side) -> [Point; 4] {
    side.vertex_indices().map(|i| vertices[i])
}

/// Prism joining the closest faces of two boxes.
#[derive(Debug, Clone, PartialEq)]
pub struct Connector {
    pub faces: (Side, Side),
    pub near: [Point; 4],
    pub far: [Point; 4],
}

impl Connector {
    /// Number of ways `far` can be paired with `near`.
    pub const PAIRINGS: usize = 4;

    pub fn between(first: &[Point; 8], second: &[Point; 8]) -> Self {
        let faces = closest_faces(first, second);
        Self {
            faces,
            near: face_vertices(first, faces.0),
            far: face_vertices(second, faces.1),
        }
    }

    /// `far` rotated left by `shift` positions. Shift 0 is the pairing that
    /// gets drawn; shifts 1 to 3 are kept for aligning the prism later.
    pub fn rotated_far(&self, shift: usize) -> [Point; 4] {
        let mut far = self.far;
        far.rotate_left(shift % Self::PAIRINGS);
        far
    }

    /// The three non-identity rotations of `far`.
    pub fn alternate_pairings(&self) -> [[Point; 4]; 3] {
        [1, 2, 3].map(|shift| self.rotated_far(shift))
    }

    /// `near ++ rotated_far(shift)` treated as the corners of a box.
    pub fn vertices(&self, shift: usize) -> [Point; 8] {
        let far = self.rotated_far(shift);
        let mut vertices = [Point::origin(); 8];
        vertices[..4].copy_from_slice(&self.near);
        vertices[4..].copy_from_slice(&far);
        vertices
    }

    /// Segments of the drawn connector.
    pub fn segments(&self) -> Vec<[Point; 2]> {
        self.segments_with(0)
    }

    pub fn segments_with(&self, shift: usize) -> Vec<[Point; 2]> {
        let vertices = self.vertices(shift);
        BBOX_EDGES
            .iter()
            .map(|&(a, b)| [vertices[a], vertices[b]])
            .collect()
    }
}
