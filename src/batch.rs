//! Bulk extraction: fit one box per point file and collect them in a single
//! `{"objects": [...]}` record.
//!
//! Point files are plain text, one point per line, with at least three
//! whitespace-separated columns of which the first three are x, y and z.
//! A file that cannot be read or fitted is reported and skipped; it never
//! stops the rest of the batch.

use crate::bbox::OrientedBoundingBox;
use crate::config::LabelConfig;
use crate::fit::{fit_bbox, FitError};
use crate::labels::{write_json, CentroidObject, LabelError};
use crate::types::Point;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{path}:{line}: expected three numeric coordinates")]
    Parse { path: PathBuf, line: usize },
    #[error("cannot fit a box to {path}")]
    Fit {
        path: PathBuf,
        #[source]
        source: FitError,
    },
}

impl BatchError {
    /// The point file this error is about.
    pub fn path(&self) -> &Path {
        match self {
            BatchError::Io { path, .. }
            | BatchError::Parse { path, .. }
            | BatchError::Fit { path, .. } => path,
        }
    }
}

/// The single-file export of a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRecord {
    pub objects: Vec<CentroidObject>,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub boxes: Vec<(PathBuf, OrientedBoundingBox)>,
    pub failures: Vec<BatchError>,
}

impl BatchReport {
    pub fn record(&self, config: &LabelConfig) -> BatchRecord {
        BatchRecord {
            objects: self
                .boxes
                .iter()
                .map(|(_, bbox)| CentroidObject::from_bbox(bbox, config))
                .collect(),
        }
    }

    pub fn write_json(&self, path: &Path, config: &LabelConfig) -> Result<PathBuf, LabelError> {
        let written = write_json(path, &self.record(config))?;
        info!(
            boxes = self.boxes.len(),
            failures = self.failures.len(),
            path = %written.display(),
            "wrote batch record"
        );
        Ok(written)
    }
}

pub fn read_point_file(path: &Path) -> Result<Vec<Point>, BatchError> {
    let text = fs::read_to_string(path).map_err(|source| BatchError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut points = vec![];
    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let coords: Vec<f64> = line
            .split_whitespace()
            .take(3)
            .map(str::parse)
            .collect::<Result<_, _>>()
            .map_err(|_| BatchError::Parse {
                path: path.to_path_buf(),
                line: index + 1,
            })?;
        let &[x, y, z] = coords.as_slice() else {
            return Err(BatchError::Parse {
                path: path.to_path_buf(),
                line: index + 1,
            });
        };
        points.push(Point::new(x, y, z));
    }
    Ok(points)
}

pub fn extract_file(path: &Path, config: &LabelConfig) -> Result<OrientedBoundingBox, BatchError> {
    let points = read_point_file(path)?;
    fit_bbox(&points, config).map_err(|source| BatchError::Fit {
        path: path.to_path_buf(),
        source,
    })
}

/// Fit every file in order, collecting boxes and failures separately.
pub fn extract_files(
    paths: impl IntoIterator<Item = PathBuf>,
    config: &LabelConfig,
) -> BatchReport {
    let mut report = BatchReport::default();
    for path in paths {
        match extract_file(&path, config) {
            Ok(bbox) => report.boxes.push((path, bbox)),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping point file");
                report.failures.push(err);
            }
        }
    }
    report
}

/// Fit every regular file directly inside `dir`, in path order.
pub fn extract_directory(dir: &Path, config: &LabelConfig) -> Result<BatchReport, BatchError> {
    let io_error = |source| BatchError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut files = fs::read_dir(dir)
        .map_err(io_error)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_error)?;
    files.retain(|path| path.is_file());
    files.sort();

    info!(dir = %dir.display(), files = files.len(), "extracting bounding boxes");
    Ok(extract_files(files, config))
}
