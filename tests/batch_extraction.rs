use bbox3d_label::batch::{extract_directory, BatchError, BatchRecord};
use bbox3d_label::{FitError, LabelConfig};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

fn write_cuboid(path: &Path, origin: (f64, f64, f64), size: (f64, f64, f64)) {
    let mut text = String::new();
    for i in 0..=3 {
        for j in 0..=3 {
            for k in 0..=3 {
                let x = origin.0 + size.0 * i as f64 / 3.0;
                let y = origin.1 + size.1 * j as f64 / 3.0;
                let z = origin.2 + size.2 * k as f64 / 3.0;
                writeln!(text, "{x} {y} {z} 0.5").unwrap();
            }
        }
    }
    fs::write(path, text).unwrap();
}

#[test]
fn degenerate_files_are_reported_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    write_cuboid(&dir.path().join("a_pipe.txt"), (0.0, 0.0, 0.0), (4.0, 1.0, 1.0));
    write_cuboid(&dir.path().join("b_pipe.txt"), (10.0, 5.0, 2.0), (1.0, 2.0, 3.0));
    fs::write(dir.path().join("c_empty.txt"), "").unwrap();
    write_cuboid(&dir.path().join("d_flat.txt"), (0.0, 0.0, 0.0), (1.0, 1.0, 0.0));
    fs::create_dir(dir.path().join("nested")).unwrap();

    let config = LabelConfig {
        default_class: "pipe".to_string(),
        export_precision: 4,
        ..LabelConfig::default()
    };
    let report = extract_directory(dir.path(), &config).unwrap();

    let fitted: Vec<_> = report
        .boxes
        .iter()
        .map(|(path, _)| path.file_name().unwrap().to_str().unwrap())
        .collect();
    assert_eq!(fitted, ["a_pipe.txt", "b_pipe.txt"]);

    assert_eq!(report.failures.len(), 2);
    assert!(matches!(
        &report.failures[0],
        BatchError::Fit { source: FitError::Empty, path } if path.ends_with("c_empty.txt")
    ));
    assert!(matches!(
        &report.failures[1],
        BatchError::Fit { source: FitError::Degenerate { .. }, path } if path.ends_with("d_flat.txt")
    ));

    let (_, second) = &report.boxes[1];
    approx::assert_abs_diff_eq!(second.volume(), 6.0, epsilon = 1e-6);
    approx::assert_abs_diff_eq!(second.center().z, 3.5, epsilon = 1e-9);

    let out = dir.path().join("data.json");
    report.write_json(&out, &config).unwrap();
    let record: BatchRecord = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(record.objects.len(), 2);
    assert!(record.objects.iter().all(|o| o.name == "pipe"));
    approx::assert_abs_diff_eq!(record.objects[0].centroid.x, 2.0, epsilon = 1e-4);
    approx::assert_abs_diff_eq!(record.objects[0].centroid.z, 0.5, epsilon = 1e-4);
}

#[test]
fn missing_directory_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = extract_directory(&dir.path().join("nope"), &LabelConfig::default());
    assert!(matches!(result, Err(BatchError::Io { .. })));
}
