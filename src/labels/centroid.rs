use super::{abs_to_rel, read_json, rel_to_abs, round_dec, write_json};
use super::{LabelError, LabelFormat, LabelStore, SourceHeader};
use crate::bbox::OrientedBoundingBox;
use crate::config::{LabelConfig, RotationMode};
use crate::types::{Point, Rotations};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Boxes as center, extents and rotation angles.
#[derive(Debug, Clone)]
pub struct CentroidFormat {
    store: LabelStore,
}

impl CentroidFormat {
    pub fn new(store: LabelStore) -> Self {
        Self { store }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Xyz {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

/// One box in a centroid label file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CentroidObject {
    pub name: String,
    pub centroid: Xyz,
    pub dimensions: Extent,
    pub rotations: Xyz,
}

impl CentroidObject {
    /// Rounded record of `bbox`, with rotations written in `config`'s mode.
    pub fn from_bbox(bbox: &OrientedBoundingBox, config: &LabelConfig) -> Self {
        let round = |v: f64| round_dec(v, config.export_precision);
        let center = bbox.center();
        let dimensions = bbox.dimensions();
        let rotation = |deg: f64| match config.rotation_mode {
            RotationMode::Absolute => round(deg),
            RotationMode::Relative => round(abs_to_rel(deg)),
        };
        let rotations = bbox.rotations();

        Self {
            name: bbox.classname().to_string(),
            centroid: Xyz {
                x: round(center.x),
                y: round(center.y),
                z: round(center.z),
            },
            dimensions: Extent {
                length: round(dimensions.length),
                width: round(dimensions.width),
                height: round(dimensions.height),
            },
            rotations: Xyz {
                x: rotation(rotations.x),
                y: rotation(rotations.y),
                z: rotation(rotations.z),
            },
        }
    }

    /// Rebuild the box, or say why the record cannot describe one.
    pub fn to_bbox(&self, config: &LabelConfig) -> Result<OrientedBoundingBox, String> {
        let Extent {
            length,
            width,
            height,
        } = self.dimensions;
        if !(length > 0.0 && width > 0.0 && height > 0.0) {
            return Err(format!(
                "dimensions {length} x {width} x {height} are not all positive"
            ));
        }

        let Xyz { x, y, z } = self.centroid;
        let mut bbox = OrientedBoundingBox::with_dimensions(
            Point::new(x, y, z),
            Some(length),
            Some(width),
            Some(height),
            config,
        );
        let angle = |v: f64| match config.rotation_mode {
            RotationMode::Absolute => v,
            RotationMode::Relative => rel_to_abs(v),
        };
        bbox.set_rotations(Rotations::new(
            angle(self.rotations.x),
            angle(self.rotations.y),
            angle(self.rotations.z),
        ));
        if !self.name.is_empty() {
            let _ = bbox.set_classname(&self.name);
        }
        Ok(bbox)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CentroidLabel {
    #[serde(flatten)]
    source: SourceHeader,
    objects: Vec<CentroidObject>,
}

impl LabelFormat for CentroidFormat {
    fn store(&self) -> &LabelStore {
        &self.store
    }

    fn store_mut(&mut self) -> &mut LabelStore {
        &mut self.store
    }

    fn import_labels(&self, pcd_path: &Path) -> Result<Vec<OrientedBoundingBox>, LabelError> {
        let label_path = self.store.label_path(pcd_path);
        let Some(data) = read_json::<CentroidLabel>(&label_path)? else {
            return Ok(vec![]);
        };

        let labels = data
            .objects
            .iter()
            .enumerate()
            .map(|(index, object)| {
                object
                    .to_bbox(self.store.config())
                    .map_err(|reason| LabelError::InvalidObject {
                        path: label_path.clone(),
                        index,
                        reason,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        info!(
            count = labels.len(),
            path = %label_path.display(),
            "imported labels"
        );
        Ok(labels)
    }

    fn export_labels(
        &self,
        bboxes: &[OrientedBoundingBox],
        pcd_path: &Path,
    ) -> Result<PathBuf, LabelError> {
        let data = CentroidLabel {
            source: SourceHeader::of(pcd_path),
            objects: bboxes
                .iter()
                .map(|bbox| CentroidObject::from_bbox(bbox, self.store.config()))
                .collect(),
        };

        let label_path = write_json(&self.store.label_path(pcd_path), &data)?;
        info!(
            count = bboxes.len(),
            path = %label_path.display(),
            "exported labels"
        );
        Ok(label_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    fn labeled_box(config: &LabelConfig) -> OrientedBoundingBox {
        let mut bbox = OrientedBoundingBox::with_dimensions(
            Point::new(1.23456, -2.0, 0.5),
            Some(3.0),
            Some(1.5),
            Some(0.75),
            config,
        );
        bbox.set_rotations(Rotations::new(0.0, 0.0, 270.0));
        let _ = bbox.set_classname("chair");
        bbox
    }

    #[test]
    fn record_rounds_without_touching_the_box() {
        let config = LabelConfig {
            export_precision: 2,
            ..LabelConfig::default()
        };
        let bbox = labeled_box(&config);
        let record = CentroidObject::from_bbox(&bbox, &config);

        assert_eq!(record.name, "chair");
        assert_abs_diff_eq!(record.centroid.x, 1.23);
        assert_abs_diff_eq!(record.rotations.z, 270.0);
        assert_abs_diff_eq!(bbox.center().x, 1.23456);
    }

    #[test]
    fn relative_mode_writes_radians() {
        let config = LabelConfig {
            rotation_mode: RotationMode::Relative,
            ..LabelConfig::default()
        };
        let record = CentroidObject::from_bbox(&labeled_box(&config), &config);
        assert_abs_diff_eq!(record.rotations.z, -FRAC_PI_2, epsilon = 1e-8);

        let restored = record.to_bbox(&config).unwrap();
        assert_abs_diff_eq!(restored.rotations().z, 270.0, epsilon = 1e-6);
    }

    #[test]
    fn export_then_import_restores_boxes() {
        let dir = tempfile::tempdir().unwrap();
        let config = LabelConfig::default();
        let format = CentroidFormat::new(LabelStore::new(dir.path(), config.clone()));
        let pcd = Path::new("/clouds/office.pcd");
        let boxes = vec![
            labeled_box(&config),
            OrientedBoundingBox::new(Point::new(4.0, 4.0, 0.0), &config),
        ];

        let path = format.export_labels(&boxes, pcd).unwrap();
        assert_eq!(path, dir.path().join("office.json"));
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n\t\"folder\": \"clouds\""));

        let restored = format.import_labels(pcd).unwrap();
        assert_eq!(restored.len(), 2);
        for (before, after) in boxes.iter().zip(&restored) {
            assert_eq!(after.classname(), before.classname());
            assert_abs_diff_eq!(after.center(), before.center(), epsilon = 1e-8);
            assert_abs_diff_eq!(after.dimensions().length, before.dimensions().length);
            assert_abs_diff_eq!(after.rotations().z, before.rotations().z, epsilon = 1e-8);
        }
    }

    #[test]
    fn missing_keys_fail_the_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let format = CentroidFormat::new(LabelStore::new(dir.path(), LabelConfig::default()));
        std::fs::write(
            dir.path().join("office.json"),
            r#"{"objects": [
                {"name": "a", "centroid": {"x": 0, "y": 0, "z": 0},
                 "dimensions": {"length": 1, "width": 1, "height": 1},
                 "rotations": {"x": 0, "y": 0, "z": 0}},
                {"name": "b", "centroid": {"x": 0, "y": 0}}
            ]}"#,
        )
        .unwrap();

        let err = format.import_labels(Path::new("office.pcd")).unwrap_err();
        assert!(matches!(
            err,
            LabelError::Malformed { ref path, .. } if path.ends_with("office.json")
        ));
    }

    #[test]
    fn zero_dimension_is_an_invalid_object() {
        let dir = tempfile::tempdir().unwrap();
        let format = CentroidFormat::new(LabelStore::new(dir.path(), LabelConfig::default()));
        std::fs::write(
            dir.path().join("office.json"),
            r#"{"objects": [
                {"name": "a", "centroid": {"x": 0, "y": 0, "z": 0},
                 "dimensions": {"length": 1, "width": 0, "height": 1},
                 "rotations": {"x": 0, "y": 0, "z": 0}}
            ]}"#,
        )
        .unwrap();

        assert!(matches!(
            format.import_labels(Path::new("office.pcd")),
            Err(LabelError::InvalidObject { index: 0, .. })
        ));
    }
}
