//! Label files.
//!
//! Each point cloud `<stem>.<ext>` gets a `<stem>.json` label file holding
//! its boxes and a `<stem>_rels.json` file holding relationships between
//! them. Both live in one label folder. Values are rounded only when written.

pub mod centroid;
pub mod vertices;

pub use centroid::{CentroidFormat, CentroidObject};
pub use vertices::VerticesFormat;

use crate::bbox::OrientedBoundingBox;
use crate::config::{LabelConfig, LabelFormatKind, RotationMode};
use crate::relationship::Relationship;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

pub const FILE_ENDING: &str = ".json";
const RELATIONSHIP_SUFFIX: &str = "_rels";

#[derive(Debug, Error)]
pub enum LabelError {
    #[error("failed to access label file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed label file {path}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("object {index} in {path} is invalid: {reason}")]
    InvalidObject {
        path: PathBuf,
        index: usize,
        reason: String,
    },
}

/// A way of laying out boxes in a label file.
pub trait LabelFormat {
    fn store(&self) -> &LabelStore;

    fn store_mut(&mut self) -> &mut LabelStore;

    /// Boxes stored for the point cloud; empty when no label file exists.
    fn import_labels(&self, pcd_path: &Path) -> Result<Vec<OrientedBoundingBox>, LabelError>;

    /// Write all boxes of the point cloud, replacing any previous file.
    fn export_labels(
        &self,
        bboxes: &[OrientedBoundingBox],
        pcd_path: &Path,
    ) -> Result<PathBuf, LabelError>;

    fn export_relationships(
        &self,
        relationships: &[Relationship],
        pcd_path: &Path,
    ) -> Result<PathBuf, LabelError> {
        self.store().export_relationships(relationships, pcd_path)
    }

    fn import_relationships(&self, pcd_path: &Path) -> Result<Vec<Relationship>, LabelError> {
        self.store().import_relationships(pcd_path)
    }
}

/// Build the format selected in `config`, writing into `label_folder`.
pub fn format_for(
    label_folder: impl Into<PathBuf>,
    config: &LabelConfig,
) -> Box<dyn LabelFormat> {
    let store = LabelStore::new(label_folder, config.clone());
    match config.label_format {
        LabelFormatKind::Centroid => Box::new(CentroidFormat::new(store)),
        LabelFormatKind::Vertices => Box::new(VerticesFormat::new(store)),
    }
}

/// Where the label files go and how numbers are written into them.
#[derive(Debug, Clone)]
pub struct LabelStore {
    label_folder: PathBuf,
    config: LabelConfig,
}

impl LabelStore {
    pub fn new(label_folder: impl Into<PathBuf>, config: LabelConfig) -> Self {
        let label_folder = label_folder.into();
        info!(
            folder = %label_folder.display(),
            format = ?config.label_format,
            "using label store"
        );
        match (config.label_format, config.rotation_mode) {
            (LabelFormatKind::Vertices, _) => {
                info!("saving rotations implicitly in the vertex coordinates")
            }
            (_, RotationMode::Relative) => {
                info!("saving rotations relative to the positive x-axis in radians (-pi..+pi)")
            }
            (_, RotationMode::Absolute) => {
                info!("saving rotations absolute to the positive x-axis in degrees (0..360)")
            }
        }
        Self {
            label_folder,
            config,
        }
    }

    pub fn label_folder(&self) -> &Path {
        &self.label_folder
    }

    pub fn set_label_folder(&mut self, label_folder: impl Into<PathBuf>) {
        self.label_folder = label_folder.into();
        info!(folder = %self.label_folder.display(), "updated label folder");
    }

    pub fn config(&self) -> &LabelConfig {
        &self.config
    }

    pub fn round(&self, value: f64) -> f64 {
        round_dec(value, self.config.export_precision)
    }

    pub fn label_path(&self, pcd_path: &Path) -> PathBuf {
        self.label_folder
            .join(format!("{}{FILE_ENDING}", file_stem(pcd_path)))
    }

    pub fn relationship_path(&self, pcd_path: &Path) -> PathBuf {
        self.label_folder.join(format!(
            "{}{RELATIONSHIP_SUFFIX}{FILE_ENDING}",
            file_stem(pcd_path)
        ))
    }

    pub fn export_relationships(
        &self,
        relationships: &[Relationship],
        pcd_path: &Path,
    ) -> Result<PathBuf, LabelError> {
        let data = RelationshipFile {
            source: SourceHeader::of(pcd_path),
            relationships: relationships
                .iter()
                .map(|rel| RelationshipEntry {
                    name: rel.name.clone(),
                    bboxes: [rel.from, rel.to],
                })
                .collect(),
        };

        let label_path = write_json(&self.relationship_path(pcd_path), &data)?;
        info!(
            count = relationships.len(),
            path = %label_path.display(),
            "exported relationships"
        );
        Ok(label_path)
    }

    pub fn import_relationships(&self, pcd_path: &Path) -> Result<Vec<Relationship>, LabelError> {
        let label_path = self.relationship_path(pcd_path);
        let Some(data) = read_json::<RelationshipFile>(&label_path)? else {
            return Ok(vec![]);
        };

        let relationships: Vec<Relationship> = data
            .relationships
            .into_iter()
            .map(|entry| Relationship::new(entry.bboxes[0], entry.bboxes[1], entry.name))
            .collect();
        info!(
            count = relationships.len(),
            path = %label_path.display(),
            "imported relationships"
        );
        Ok(relationships)
    }
}

/// Where a label file's point cloud lives.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceHeader {
    pub folder: String,
    pub filename: String,
    pub path: String,
}

impl SourceHeader {
    pub fn of(pcd_path: &Path) -> Self {
        let name = |p: Option<&Path>| {
            p.and_then(Path::file_name)
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        };
        Self {
            folder: name(pcd_path.parent()),
            filename: name(Some(pcd_path)),
            path: pcd_path.display().to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct RelationshipFile {
    #[serde(flatten)]
    source: SourceHeader,
    relationships: Vec<RelationshipEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RelationshipEntry {
    name: String,
    bboxes: [usize; 2],
}

/// Degrees in `[0, 360)` to radians in `(-pi, pi]`.
pub fn abs_to_rel(abs_rotation: f64) -> f64 {
    let rel_rotation = abs_rotation.to_radians();
    if rel_rotation > PI {
        rel_rotation - TAU
    } else {
        rel_rotation
    }
}

/// Radians in `(-pi, pi]` to degrees in `[0, 360)`.
pub fn rel_to_abs(rel_rotation: f64) -> f64 {
    let abs_rotation = rel_rotation.to_degrees();
    if abs_rotation < 0.0 {
        // a vanishing negative angle would otherwise land on 360
        (abs_rotation + 360.0) % 360.0
    } else {
        abs_rotation
    }
}

pub fn round_dec(value: f64, decimal_places: u32) -> f64 {
    let scale = 10f64.powi(decimal_places as i32);
    let rounded = (value * scale).round() / scale;
    if rounded.is_finite() {
        rounded
    } else {
        value
    }
}

fn file_stem(pcd_path: &Path) -> String {
    pcd_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Pretty-print `data` with tab indentation, replacing an existing file.
pub(crate) fn write_json<T: Serialize>(label_path: &Path, data: &T) -> Result<PathBuf, LabelError> {
    if label_path.is_file() {
        info!(path = %label_path.display(), "file already exists, replacing it");
    }
    let io_error = |source| LabelError::Io {
        path: label_path.to_path_buf(),
        source,
    };

    let file = File::create(label_path).map_err(io_error)?;
    let mut writer = BufWriter::new(file);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
    let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
    data.serialize(&mut serializer).map_err(|source| LabelError::Io {
        path: label_path.to_path_buf(),
        source: source.into(),
    })?;
    writer.flush().map_err(io_error)?;
    Ok(label_path.to_path_buf())
}

/// Parse a label file, `None` if there is no file yet.
pub(crate) fn read_json<T: DeserializeOwned>(label_path: &Path) -> Result<Option<T>, LabelError> {
    if !label_path.is_file() {
        return Ok(None);
    }
    let file = File::open(label_path).map_err(|source| LabelError::Io {
        path: label_path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file))
        .map(Some)
        .map_err(|source| LabelError::Malformed {
            path: label_path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn rotation_modes_round_trip() {
        for i in 0..3600 {
            let degrees = i as f64 * 0.1;
            assert_abs_diff_eq!(rel_to_abs(abs_to_rel(degrees)), degrees, epsilon = 1e-9);
        }
        for i in -1799..=1800 {
            let radians = i as f64 / 1800.0 * PI;
            assert_abs_diff_eq!(abs_to_rel(rel_to_abs(radians)), radians, epsilon = 1e-9);
        }
    }

    #[test]
    fn rotation_conversion_ranges() {
        assert_abs_diff_eq!(abs_to_rel(180.0), PI);
        assert_abs_diff_eq!(abs_to_rel(270.0), -PI / 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(rel_to_abs(-PI / 2.0), 270.0, epsilon = 1e-12);
        assert!(rel_to_abs(-1e-20) < 360.0);
    }

    #[test]
    fn rounding_keeps_requested_places() {
        assert_abs_diff_eq!(round_dec(1.23456, 3), 1.235);
        assert_abs_diff_eq!(round_dec(-0.0004, 3), 0.0);
        assert_abs_diff_eq!(round_dec(2.0, 0), 2.0);
        assert_eq!(round_dec(1e300, 20), 1e300);
    }

    #[test]
    fn label_files_are_named_after_the_cloud() {
        let store = LabelStore::new("/labels", LabelConfig::default());
        let pcd = Path::new("/clouds/scan_01.ply");
        assert_eq!(store.label_path(pcd), Path::new("/labels/scan_01.json"));
        assert_eq!(
            store.relationship_path(pcd),
            Path::new("/labels/scan_01_rels.json")
        );
    }

    #[test]
    fn source_header_names_folder_and_file() {
        let header = SourceHeader::of(Path::new("/data/pipes/scan.pcd"));
        assert_eq!(header.folder, "pipes");
        assert_eq!(header.filename, "scan.pcd");
        assert_eq!(header.path, "/data/pipes/scan.pcd");
    }

    #[test]
    fn relationships_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = LabelStore::new(dir.path(), LabelConfig::default());
        let pcd = Path::new("/clouds/room.pcd");
        let rels = vec![
            Relationship::new(0, 1, "connects_to"),
            Relationship::new(2, 0, "supports"),
        ];

        let path = store.export_relationships(&rels, pcd).unwrap();
        assert_eq!(path, dir.path().join("room_rels.json"));

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["filename"], "room.pcd");
        assert_eq!(raw["folder"], "clouds");
        assert_eq!(raw["relationships"][1]["name"], "supports");
        assert_eq!(raw["relationships"][1]["bboxes"], serde_json::json!([2, 0]));

        assert_eq!(store.import_relationships(pcd).unwrap(), rels);
    }

    #[test]
    fn missing_relationship_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = LabelStore::new(dir.path(), LabelConfig::default());
        assert!(store
            .import_relationships(Path::new("unlabeled.pcd"))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn relationship_with_one_box_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let store = LabelStore::new(dir.path(), LabelConfig::default());
        std::fs::write(
            dir.path().join("room_rels.json"),
            r#"{"relationships": [{"name": "x", "bboxes": [1]}]}"#,
        )
        .unwrap();
        assert!(matches!(
            store.import_relationships(Path::new("room.pcd")),
            Err(LabelError::Malformed { .. })
        ));
    }

    #[test]
    fn writing_into_missing_folder_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = LabelStore::new(dir.path().join("absent"), LabelConfig::default());
        assert!(matches!(
            store.export_relationships(&[], Path::new("room.pcd")),
            Err(LabelError::Io { .. })
        ));
    }
}
