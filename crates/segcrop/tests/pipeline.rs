use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use image::{Rgb, RgbImage};
use segcrop::{
    DetectionResult, Detector, DetectorError, InferenceParams, Pipeline, RunDirectoryDetector,
    RunLayout, SegCropError,
};

/// Points at a prepared run directory and counts invocations.
struct StubDetector {
    run_dir: PathBuf,
    calls: Arc<AtomicUsize>,
}

impl Detector for StubDetector {
    fn detect(
        &self,
        image_path: &Path,
        _params: &InferenceParams,
    ) -> Result<DetectionResult, DetectorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let project = self.run_dir.parent().unwrap_or(Path::new("."));
        Ok(RunLayout::new(project, "predict").resolve(&self.run_dir, image_path))
    }
}

struct Fixture {
    _dir: tempfile::TempDir,
    image: PathBuf,
    project: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let uploads = dir.path().join("uploads");
        fs::create_dir_all(&uploads).unwrap();
        let image = uploads.join("car.png");
        RgbImage::from_fn(100, 80, |x, y| Rgb([x as u8, y as u8, 200]))
            .save(&image)
            .unwrap();
        let project = dir.path().join("runs").join("segment");
        fs::create_dir_all(&project).unwrap();
        Self {
            _dir: dir,
            image,
            project,
        }
    }

    fn run_dir(&self, name: &str, labels: &str, class_names: Option<&str>) -> PathBuf {
        let run_dir = self.project.join(name);
        let labels_dir = run_dir.join("labels");
        fs::create_dir_all(&labels_dir).unwrap();
        fs::write(labels_dir.join("car.txt"), labels).unwrap();
        if let Some(names) = class_names {
            fs::write(labels_dir.join("classes_names.txt"), names).unwrap();
        }
        run_dir
    }

    fn stub(&self, run_dir: &Path) -> (StubDetector, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let detector = StubDetector {
            run_dir: run_dir.to_path_buf(),
            calls: Arc::clone(&calls),
        };
        (detector, calls)
    }
}

const MIXED_LABELS: &str = "\
0 0.1 0.1 0.3 0.1 0.3 0.3 0.1 0.3 0.91
1 0.5 0.5 0.7 0.5 0.7 0.7 0.95
x 0.1 0.1 0.9 0.1 0.9 0.9 1
3 0.2 0.6 0.4 0.6 0.3 0.9 0.42
";

fn file_names(paths: impl IntoIterator<Item = PathBuf>) -> Vec<String> {
    paths
        .into_iter()
        .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn test_run_preserves_order_and_skips_bad_lines() {
    let fixture = Fixture::new();
    let run_dir = fixture.run_dir("predict2", MIXED_LABELS, Some("door\nhood\n\nfront bumper\n"));
    let (detector, calls) = fixture.stub(&run_dir);

    let pipeline = Pipeline::builder().detector(detector).build();
    let output = pipeline.run(&fixture.image).unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(output.annotated_image, run_dir.join("car.png"));

    let classes: Vec<u32> = output.artifacts.iter().map(|a| a.class_idx).collect();
    assert_eq!(classes, vec![0, 1, 3]);
    assert_eq!(
        file_names(output.artifacts.iter().map(|a| a.path.clone())),
        vec![
            "000_class0_door_conf0.910.png",
            "001_class1_hood_conf0.950.png",
            "002_class3_3_conf0.420.png",
        ]
    );
    assert_eq!(output.captions(), vec!["door 0.91", "hood 0.95", "3 0.42"]);
    for artifact in &output.artifacts {
        assert_eq!(artifact.path.parent().unwrap(), run_dir.join("crops_by_mask"));
        assert!(artifact.path.is_file());
    }
}

#[test]
fn test_crops_are_rgba_with_soft_edges() {
    let fixture = Fixture::new();
    let run_dir = fixture.run_dir("predict", "5 0.1 0.1 0.9 0.1 0.9 0.9 0.1 0.9 0.87\n", None);
    let (detector, _) = fixture.stub(&run_dir);

    let output = Pipeline::builder().detector(detector).build().run(&fixture.image).unwrap();
    assert_eq!(output.artifacts.len(), 1);

    // polygon spans x 10..=90, y 8..=72 on a 100x80 image
    let crop = image::open(&output.artifacts[0].path).unwrap().to_rgba8();
    assert_eq!(crop.dimensions(), (85, 69));
    let center = crop.get_pixel(42, 34);
    assert_eq!(center.0, [50, 40, 200, 255]);
    assert!(crop.get_pixel(0, 0)[3] < 255);
}

#[test]
fn test_zero_pad_keeps_thin_instances() {
    let fixture = Fixture::new();
    let run_dir = fixture.run_dir("predict", "1 0.1 0.5 0.5 0.5 0.9 0.5 0.8\n", None);
    let (detector, _) = fixture.stub(&run_dir);

    let output = Pipeline::builder()
        .detector(detector)
        .pad(0)
        .build()
        .run(&fixture.image)
        .unwrap();

    assert_eq!(output.artifacts.len(), 1);
    let crop = image::open(&output.artifacts[0].path).unwrap().to_rgba8();
    assert_eq!(crop.dimensions(), (81, 1));
}

#[test]
fn test_missing_image_fails_before_detection() {
    let fixture = Fixture::new();
    let run_dir = fixture.run_dir("predict", MIXED_LABELS, None);
    let (detector, calls) = fixture.stub(&run_dir);

    let pipeline = Pipeline::builder().detector(detector).build();
    let err = pipeline.run(fixture.image.with_file_name("missing.jpg")).unwrap_err();

    assert!(matches!(err, SegCropError::NotFound { .. }));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_missing_annotations_yield_no_artifacts() {
    let fixture = Fixture::new();
    let run_dir = fixture.project.join("predict");
    fs::create_dir_all(&run_dir).unwrap();
    let (detector, _) = fixture.stub(&run_dir);

    let output = Pipeline::builder().detector(detector).build().run(&fixture.image).unwrap();
    assert!(output.artifacts.is_empty());
}

#[test]
fn test_repeated_runs_are_deterministic() {
    let fixture = Fixture::new();
    let run_dir = fixture.run_dir("predict", MIXED_LABELS, None);
    let (detector, _) = fixture.stub(&run_dir);
    let pipeline = Pipeline::builder().detector(detector).build();

    let first = pipeline.run(&fixture.image).unwrap();
    let first_bytes: Vec<Vec<u8>> = first
        .artifacts
        .iter()
        .map(|a| fs::read(&a.path).unwrap())
        .collect();

    let second = pipeline.run(&fixture.image).unwrap();
    assert_eq!(first, second);
    for (artifact, bytes) in second.artifacts.iter().zip(first_bytes) {
        assert_eq!(fs::read(&artifact.path).unwrap(), bytes);
    }
}

#[test]
fn test_run_directory_detector_uses_latest_run() {
    let fixture = Fixture::new();
    fixture.run_dir("predict", "0 0.1 0.1 0.3 0.1 0.3 0.3 0.5\n", None);
    let latest = fixture.run_dir("predict3", MIXED_LABELS, None);
    fixture.run_dir("predict_old", MIXED_LABELS, None);

    let detector = RunDirectoryDetector::new(RunLayout::new(&fixture.project, "predict"));
    let output = Pipeline::builder().detector(detector).build().run(&fixture.image).unwrap();

    assert_eq!(output.annotated_image, latest.join("car.png"));
    assert_eq!(output.artifacts.len(), 3);
}

#[test]
fn test_config_overrides_output_and_class_names() {
    let fixture = Fixture::new();
    let run_dir = fixture.run_dir("predict", MIXED_LABELS, Some("ignored\n"));
    let (detector, _) = fixture.stub(&run_dir);

    let names = fixture.project.join("names.txt");
    fs::write(&names, "rear door\nwheel\n").unwrap();
    let out = fixture.project.join("exported");

    let pipeline = Pipeline::builder()
        .detector(detector)
        .class_names_path(&names)
        .output_dir(&out)
        .build();
    let output = pipeline.run(&fixture.image).unwrap();

    assert_eq!(
        output.artifacts[0].path,
        out.join("000_class0_rear_door_conf0.910.png")
    );
    assert_eq!(
        output.artifacts[1].path,
        out.join("001_class1_wheel_conf0.950.png")
    );
}

#[test]
fn test_uncreatable_output_dir_aborts_run() {
    let fixture = Fixture::new();
    let run_dir = fixture.run_dir("predict", MIXED_LABELS, None);
    let (detector, _) = fixture.stub(&run_dir);

    let blocker = fixture.project.join("not_a_dir");
    fs::write(&blocker, "").unwrap();

    let pipeline = Pipeline::builder()
        .detector(detector)
        .output_dir(&blocker)
        .build();
    let err = pipeline.run(&fixture.image).unwrap_err();
    assert!(matches!(err, SegCropError::Io(_)));
}

#[test]
fn test_failed_crop_write_aborts_and_keeps_earlier_files() {
    let fixture = Fixture::new();
    let run_dir = fixture.run_dir("predict", MIXED_LABELS, None);
    let (detector, _) = fixture.stub(&run_dir);

    let out = fixture.project.join("crops");
    // a directory squatting on the second crop's file name
    let blocked = out.join("001_class1_1_conf0.950.png");
    fs::create_dir_all(&blocked).unwrap();

    let pipeline = Pipeline::builder()
        .detector(detector)
        .output_dir(&out)
        .build();
    let err = pipeline.run(&fixture.image).unwrap_err();

    match err {
        SegCropError::Write { path, .. } => assert_eq!(path, blocked),
        other => panic!("expected a write error, got {other:?}"),
    }
    assert!(out.join("000_class0_0_conf0.910.png").is_file());
    assert!(!out.join("002_class3_3_conf0.420.png").exists());
}
