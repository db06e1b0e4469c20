use crate::types::Dimensions;
use serde::{Deserialize, Serialize};

/// How rotations are written to centroid label files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationMode {
    /// Degrees in `[0, 360)`.
    #[default]
    Absolute,
    /// Radians in `(-pi, pi]`.
    Relative,
}

/// Which label file layout is read and written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelFormatKind {
    /// Center, extents and rotation angles per object.
    #[default]
    Centroid,
    /// The eight world-space corners per object.
    Vertices,
}

/// Settings consumed by the box model, fitting and label files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    /// Lower bound a side extrusion may shrink a dimension to (exclusive).
    pub min_dimension: f64,
    /// Length used for new boxes when none is given.
    pub standard_length: f64,
    pub standard_width: f64,
    pub standard_height: f64,
    /// Class assigned to new boxes.
    pub default_class: String,
    /// Decimal places kept when writing label files.
    pub export_precision: u32,
    pub rotation_mode: RotationMode,
    pub label_format: LabelFormatKind,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            min_dimension: 0.01,
            standard_length: 0.75,
            standard_width: 0.55,
            standard_height: 0.15,
            default_class: "cart".to_string(),
            export_precision: 8,
            rotation_mode: RotationMode::Absolute,
            label_format: LabelFormatKind::Centroid,
        }
    }
}

impl LabelConfig {
    pub fn standard_dimensions(&self) -> Dimensions {
        Dimensions::new(
            self.standard_length,
            self.standard_width,
            self.standard_height,
        )
    }
}
