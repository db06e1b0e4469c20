use super::{read_json, write_json, LabelError, LabelFormat, LabelStore, SourceHeader};
use crate::bbox::OrientedBoundingBox;
use crate::math3d::rotation_matrix_to_euler;
use crate::types::Point;
use nalgebra as na;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Boxes as their eight world-space corners; rotation is implicit.
#[derive(Debug, Clone)]
pub struct VerticesFormat {
    store: LabelStore,
}

impl VerticesFormat {
    pub fn new(store: LabelStore) -> Self {
        Self { store }
    }

    fn to_bbox(&self, object: &VerticesObject) -> Result<OrientedBoundingBox, String> {
        let v = object.vertices.map(|[x, y, z]| Point::new(x, y, z));
        let center = na::center(&v[0], &v[6]);

        let axes = [v[3] - v[0], v[1] - v[0], v[4] - v[0]];
        let [length, width, height] = axes.map(|axis| axis.norm());
        if !(length > 0.0 && width > 0.0 && height > 0.0) {
            return Err(format!(
                "corners span {length} x {width} x {height}, not a box"
            ));
        }

        let rotation = na::Matrix3::from_columns(&axes.map(|axis| axis.normalize()));
        let mut bbox = OrientedBoundingBox::with_dimensions(
            center,
            Some(length),
            Some(width),
            Some(height),
            self.store.config(),
        );
        bbox.set_rotations(rotation_matrix_to_euler(&rotation));
        if !object.name.is_empty() {
            let _ = bbox.set_classname(&object.name);
        }
        Ok(bbox)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct VerticesObject {
    name: String,
    vertices: [[f64; 3]; 8],
}

#[derive(Debug, Serialize, Deserialize)]
struct VerticesLabel {
    #[serde(flatten)]
    source: SourceHeader,
    objects: Vec<VerticesObject>,
}

impl LabelFormat for VerticesFormat {
    fn store(&self) -> &LabelStore {
        &self.store
    }

    fn store_mut(&mut self) -> &mut LabelStore {
        &mut self.store
    }

    fn import_labels(&self, pcd_path: &Path) -> Result<Vec<OrientedBoundingBox>, LabelError> {
        let label_path = self.store.label_path(pcd_path);
        let Some(data) = read_json::<VerticesLabel>(&label_path)? else {
            return Ok(vec![]);
        };

        let mut labels = Vec::with_capacity(data.objects.len());
        for (index, object) in data.objects.iter().enumerate() {
            let bbox = self
                .to_bbox(object)
                .map_err(|reason| LabelError::InvalidObject {
                    path: label_path.clone(),
                    index,
                    reason,
                })?;
            labels.push(bbox);
        }
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
        let objects = bboxes
            .iter()
            .map(|bbox| VerticesObject {
                name: bbox.classname().to_string(),
                vertices: bbox
                    .world_vertices()
                    .map(|p| [p.x, p.y, p.z].map(|c| self.store.round(c))),
            })
            .collect();
        let data = VerticesLabel {
            source: SourceHeader::of(pcd_path),
            objects,
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
