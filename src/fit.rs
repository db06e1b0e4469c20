//! Fitting an oriented box around a raw point set.

use crate::bbox::OrientedBoundingBox;
use crate::caliper::Caliper;
use crate::config::LabelConfig;
use crate::math3d::rotation_matrix_to_euler;
use crate::types::Point;
use geo::{prelude::*, Coord, Line};
use itertools::{izip, Itertools, MinMaxResult};
use nalgebra as na;
use noisy_float::prelude::*;
use std::borrow::Borrow;
use thiserror::Error;
use tracing::debug;

/// Extents at or below this are treated as flat.
const DEGENERATE_EXTENT: f64 = 1e-9;

#[derive(Debug, Error, PartialEq)]
pub enum FitError {
    #[error("no points to fit")]
    Empty,
    #[error("point {index} has a non-finite coordinate")]
    NonFinite { index: usize },
    #[error("points span no volume ({length} x {width} x {height})")]
    Degenerate { length: f64, width: f64, height: f64 },
}

/// Fit a box on a set of points.
///
/// The footprint is the hull-edge-aligned rectangle with the lowest mix of
/// Hausdorff distance to the points and area; the vertical extent is the
/// z range. Rotation is around z only.
pub fn fit_bbox(
    points: impl IntoIterator<Item = impl Borrow<Point>>,
    config: &LabelConfig,
) -> Result<OrientedBoundingBox, FitError> {
    let (points3d, points2d): (Vec<Point>, Vec<geo::Point>) = points
        .into_iter()
        .map(|point3d| {
            let point3d = *point3d.borrow();
            let point2d = geo::Point::new(point3d.x, point3d.y);
            (point3d, point2d)
        })
        .unzip();

    if points3d.is_empty() {
        return Err(FitError::Empty);
    }
    if let Some(index) = points3d
        .iter()
        .position(|p| !p.coords.iter().all(|c| c.is_finite()))
    {
        return Err(FitError::NonFinite { index });
    }

    let convex_hull_points = geo::MultiPoint::from(points2d.clone())
        .convex_hull()
        .exterior()
        .clone();
    let mut ch: Vec<geo::Point<f64>> = convex_hull_points.points().collect();
    ch.pop();

    let MinMaxResult::MinMax(z_min, z_max) = points3d.iter().map(|p| r64(p.z)).minmax() else {
        return Err(FitError::Degenerate {
            length: 0.0,
            width: 0.0,
            height: 0.0,
        });
    };
    let size_z = (z_max - z_min).raw();

    if ch.len() < 3 {
        return Err(FitError::Degenerate {
            length: 0.0,
            width: 0.0,
            height: size_z,
        });
    }

    let bboxs: Vec<[(f64, f64); 4]> = Caliper::sweep(&ch).map(|c| c.rectangle()).collect();
    debug!(hull = ch.len(), candidates = bboxs.len(), "fitting footprint");

    let haus_error = normalize(bboxs.iter().map(|x| hausdorff_distance(x, &points2d)));
    let area_error = normalize(bboxs.iter().map(bbox_area));
    let loss: Vec<f64> = haus_error
        .iter()
        .zip(area_error)
        .map(|(a, b)| a * 0.7 + b * 0.3)
        .collect();

    let Some((minimal_bbox, _)) = izip!(&bboxs, &loss).min_by_key(|(_, loss)| r64(**loss)) else {
        return Err(FitError::Degenerate {
            length: 0.0,
            width: 0.0,
            height: size_z,
        });
    };

    let size_x = distance2d(minimal_bbox[1], minimal_bbox[0]);
    let size_y = distance2d(minimal_bbox[0], minimal_bbox[3]);
    if size_x <= DEGENERATE_EXTENT || size_y <= DEGENERATE_EXTENT || size_z <= DEGENERATE_EXTENT
    {
        return Err(FitError::Degenerate {
            length: size_x,
            width: size_y,
            height: size_z,
        });
    }

    let rotation = {
        let from = na::Point2::new(minimal_bbox[0].0, minimal_bbox[0].1);
        let to = na::Point2::new(minimal_bbox[1].0, minimal_bbox[1].1);
        let vector = to - from;
        let yaw = vector.y.atan2(vector.x);
        na::UnitQuaternion::from_euler_angles(0.0, 0.0, yaw)
    };

    let center = Point::new(
        minimal_bbox.iter().map(|v| v.0).sum::<f64>() / 4.0,
        minimal_bbox.iter().map(|v| v.1).sum::<f64>() / 4.0,
        ((z_max + z_min) / 2.0).raw(),
    );

    let mut bbox = OrientedBoundingBox::with_dimensions(
        center,
        Some(size_x),
        Some(size_y),
        Some(size_z),
        config,
    );
    bbox.set_rotations(rotation_matrix_to_euler(rotation.to_rotation_matrix().matrix()));
    Ok(bbox)
}

/// Min-max scale into `[0, 1]`; a flat series maps to zeros.
fn normalize(loss: impl Iterator<Item = f64>) -> Vec<f64> {
    let loss: Vec<f64> = loss.collect();
    match loss.iter().copied().minmax() {
        MinMaxResult::MinMax(min_loss, max_loss) if max_loss > min_loss => loss
            .iter()
            .map(|x| (x - min_loss) / (max_loss - min_loss))
            .collect(),
        _ => vec![0.0; loss.len()],
    }
}

fn distance2d(a: (f64, f64), b: (f64, f64)) -> f64 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

fn bbox_area(vertex: &[(f64, f64); 4]) -> f64 {
    distance2d(vertex[0], vertex[3]) * distance2d(vertex[1], vertex[0])
}

fn point2bbox(vertex: &[(f64, f64); 4], point: &geo::Point<f64>) -> f64 {
    vertex
        .iter()
        .map(|&(x, y)| Coord { x, y })
        .circular_tuple_windows()
        .map(|(lhs, rhs)| point.euclidean_distance(&Line::new(lhs, rhs)))
        .fold(f64::INFINITY, f64::min)
}

fn hausdorff_distance(vertex: &[(f64, f64); 4], points: &[geo::Point<f64>]) -> f64 {
    points
        .iter()
        .map(|p| point2bbox(vertex, p))
        .map(r64)
        .sum::<R64>()
        .raw()
}
