//! End-to-end runtime tests: load, classify and close against a scripted
//! engine and real image files.

mod common;

use std::sync::Arc;
use std::thread;

use common::{Assets, ScriptedFactory};
use vision_bridge::engine::{InputShape, Recognition};
use vision_bridge::models::LoadError;
use vision_bridge::{Runtime, RuntimeConfig, RuntimeError};

fn cat_dog_factory() -> ScriptedFactory {
    ScriptedFactory::new(InputShape::new(4, 4, 3), vec![230, 51])
}

#[test]
fn test_cat_dog_classification() {
    let assets = Assets::new();
    let image = assets.png("cat.png", 16, 16, [200, 100, 50]);
    let runtime = assets.runtime(cat_dog_factory());

    let id = runtime.load_model("model.tflite", "labels.txt").unwrap();
    let results = runtime.run_model_on_image(id.as_str(), &image, 2, 0.5).unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].label, "cat");
    assert!((results[0].confidence - 230.0 / 255.0).abs() < 1e-9);
}

#[test]
fn test_results_sorted_and_truncated() {
    let assets = Assets::new();
    assets.write("labels.txt", b"a\nb\nc\nd\n");
    let image = assets.png("img.png", 8, 8, [0, 0, 0]);
    let factory = ScriptedFactory::new(InputShape::new(2, 2, 3), vec![10, 200, 120, 90]);
    let runtime = assets.runtime(factory);

    let id = runtime.load_model("model.tflite", "labels.txt").unwrap();
    let results = runtime.run_model_on_image(id.as_str(), &image, 2, 0.0).unwrap();

    let labels: Vec<&str> = results.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels, vec!["b", "c"]);
    assert!(results[0].confidence >= results[1].confidence);
}

#[test]
fn test_surplus_scores_use_unknown_label() {
    let assets = Assets::new();
    let image = assets.png("img.png", 4, 4, [1, 2, 3]);
    let factory = ScriptedFactory::new(InputShape::new(2, 2, 3), vec![100, 50, 255]);
    let runtime = assets.runtime(factory);

    let id = runtime.load_model("model.tflite", "labels.txt").unwrap();
    let results = runtime.run_model_on_image(id.as_str(), &image, 3, 0.1).unwrap();

    assert_eq!(
        results,
        vec![
            Recognition::new("unknown", 1.0),
            Recognition::new("cat", 100.0 / 255.0),
            Recognition::new("dog", 50.0 / 255.0),
        ]
    );
}

#[test]
fn test_input_buffer_matches_model_shape() {
    let assets = Assets::new();
    let image = assets.png("red.png", 10, 6, [255, 0, 0]);
    let factory = ScriptedFactory::new(InputShape::new(3, 5, 3), vec![0, 0]);
    let stats = Arc::clone(&factory.stats);
    let runtime = assets.runtime(factory);

    let id = runtime.load_model("model.tflite", "labels.txt").unwrap();
    runtime.run_model_on_image(id.as_str(), &image, 1, 0.5).unwrap();

    let input = stats.last_input.lock().clone();
    assert_eq!(input.len(), 3 * 5 * 3);
    assert!(input.chunks(3).all(|px| px == [255, 0, 0]));
}

#[test]
fn test_file_uri_prefix_accepted() {
    let assets = Assets::new();
    let image = assets.png("cat.png", 4, 4, [9, 9, 9]);
    let runtime = assets.runtime(cat_dog_factory());

    let id = runtime.load_model("model.tflite", "labels.txt").unwrap();
    let uri = format!("file://{}", image);
    let results = runtime.run_model_on_image(id.as_str(), &uri, 2, 0.5).unwrap();
    assert_eq!(results[0].label, "cat");
}

#[test]
fn test_undecodable_image_reports_read_failure() {
    let assets = Assets::new();
    let path = assets.write("notes.png", b"definitely not an image");
    let runtime = assets.runtime(cat_dog_factory());

    let id = runtime.load_model("model.tflite", "labels.txt").unwrap();
    let err = runtime
        .run_model_on_image(id.as_str(), &path.display().to_string(), 2, 0.5)
        .unwrap_err();
    assert!(matches!(err, RuntimeError::Preprocess(_)));
    assert!(err.to_string().starts_with("Failed to read image"));
    assert!(runtime.contains(id.as_str()));
}

#[test]
fn test_missing_image_reports_read_failure() {
    let assets = Assets::new();
    let runtime = assets.runtime(cat_dog_factory());

    let id = runtime.load_model("model.tflite", "labels.txt").unwrap();
    let missing = assets.path("missing.jpg").display().to_string();
    let err = runtime
        .run_model_on_image(id.as_str(), &missing, 2, 0.5)
        .unwrap_err();
    assert!(err.to_string().starts_with("Failed to read image"));
}

#[test]
fn test_run_after_close_reports_unknown_model() {
    let assets = Assets::new();
    let image = assets.png("cat.png", 4, 4, [0, 0, 0]);
    let runtime = assets.runtime(cat_dog_factory());

    let id = runtime.load_model("model.tflite", "labels.txt").unwrap();
    assert!(runtime.close(id.as_str()));

    let err = runtime
        .run_model_on_image(id.as_str(), &image, 2, 0.5)
        .unwrap_err();
    assert!(matches!(err, RuntimeError::NoSuchModel(_)));
    assert_eq!(err.to_string(), "No such modelId");
}

#[test]
fn test_close_releases_engine() {
    let assets = Assets::new();
    let factory = cat_dog_factory();
    let stats = Arc::clone(&factory.stats);
    let runtime = assets.runtime(factory);

    let id = runtime.load_model("model.tflite", "labels.txt").unwrap();
    assert_eq!(stats.live(), 1);
    runtime.close(id.as_str());
    assert_eq!(stats.live(), 0);
    assert_eq!(runtime.model_count(), 0);
}

#[test]
fn test_close_unknown_id_is_noop() {
    let assets = Assets::new();
    let runtime = assets.runtime(cat_dog_factory());
    let id = runtime.load_model("model.tflite", "labels.txt").unwrap();

    assert!(!runtime.close("no-such-id"));
    assert!(runtime.contains(id.as_str()));
    assert_eq!(runtime.model_count(), 1);
}

#[test]
fn test_load_twice_gives_distinct_ids() {
    let assets = Assets::new();
    let runtime = assets.runtime(cat_dog_factory());

    let a = runtime.load_model("model.tflite", "labels.txt").unwrap();
    let b = runtime.load_model("model.tflite", "labels.txt").unwrap();
    assert_ne!(a, b);
    assert_eq!(runtime.model_count(), 2);

    runtime.close(a.as_str());
    assert!(runtime.contains(b.as_str()));
}

#[test]
fn test_missing_model_asset_leaves_registry_unchanged() {
    let assets = Assets::new();
    let factory = cat_dog_factory();
    let stats = Arc::clone(&factory.stats);
    let runtime = assets.runtime(factory);

    let err = runtime.load_model("absent.tflite", "labels.txt").unwrap_err();
    assert!(matches!(err, RuntimeError::Load(LoadError::NotFound(_))));
    assert_eq!(runtime.model_count(), 0);
    assert_eq!(stats.live(), 0);
}

#[test]
fn test_label_failure_rolls_back_engine() {
    let assets = Assets::new();
    let factory = cat_dog_factory();
    let stats = Arc::clone(&factory.stats);
    let runtime = assets.runtime(factory);

    let err = runtime.load_model("model.tflite", "absent.txt").unwrap_err();
    assert!(matches!(err, RuntimeError::Load(_)));
    assert_eq!(runtime.model_count(), 0);
    assert_eq!(stats.created.load(std::sync::atomic::Ordering::SeqCst), 1);
    assert_eq!(stats.live(), 0);
}

#[test]
fn test_unreadable_labels_report_label_failure() {
    let assets = Assets::new();
    assets.write("labels.bin", &[0xff, 0xfe, 0x00, 0x80]);
    let runtime = assets.runtime(cat_dog_factory());

    let err = runtime.load_model("model.tflite", "labels.bin").unwrap_err();
    assert!(matches!(err, RuntimeError::Load(LoadError::Labels { .. })));
    assert!(err.to_string().starts_with("Failed to read labels"));
    assert_eq!(runtime.model_count(), 0);
}

#[test]
fn test_engine_rejection_is_reported() {
    let assets = Assets::new();
    assets.write("bogus.tflite", b"GGUF not a tflite model");
    let runtime = assets.runtime(cat_dog_factory());

    let err = runtime.load_model("bogus.tflite", "labels.txt").unwrap_err();
    assert!(matches!(err, RuntimeError::Load(LoadError::Engine(_))));
    assert_eq!(runtime.model_count(), 0);
}

#[test]
fn test_empty_model_asset_rejected() {
    let assets = Assets::new();
    assets.write("empty.tflite", b"");
    let runtime = assets.runtime(cat_dog_factory());

    let err = runtime.load_model("empty.tflite", "labels.txt").unwrap_err();
    assert!(matches!(err, RuntimeError::Load(LoadError::InvalidFormat(_))));
}

#[test]
fn test_path_escape_rejected() {
    let assets = Assets::new();
    let outside = tempfile::tempdir().unwrap();
    std::fs::write(outside.path().join("model.tflite"), common::MODEL_BYTES).unwrap();
    let runtime = assets.runtime(cat_dog_factory());

    let escape = format!("../{}/model.tflite", outside.path().file_name().unwrap().to_string_lossy());
    let err = runtime.load_model(&escape, "labels.txt").unwrap_err();
    assert!(matches!(err, RuntimeError::Load(LoadError::PathNotAllowed(_))));
    assert_eq!(runtime.model_count(), 0);
}

#[test]
fn test_concurrent_inference_on_shared_model() {
    let assets = Assets::new();
    let image = assets.png("cat.png", 8, 8, [10, 20, 30]);
    let runtime = Arc::new(assets.runtime(cat_dog_factory()));
    let id = runtime.load_model("model.tflite", "labels.txt").unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let runtime = Arc::clone(&runtime);
            let id = id.clone();
            let image = image.clone();
            thread::spawn(move || runtime.run_model_on_image(id.as_str(), &image, 2, 0.5))
        })
        .collect();

    for handle in handles {
        let results = handle.join().unwrap().unwrap();
        assert_eq!(results[0].label, "cat");
    }
}

#[test]
fn test_default_backend_without_engine_reports_error() {
    let assets = Assets::new();
    let runtime = Runtime::new(RuntimeConfig {
        assets_root: assets.root().to_path_buf(),
        ..RuntimeConfig::default()
    });
    assert_eq!(runtime.backend_name(), "tflite");

    let result = runtime.load_model("model.tflite", "labels.txt");
    if cfg!(feature = "tflite") {
        // Scripted bytes are not a real flatbuffer either way.
        assert!(result.is_err());
    } else {
        let err = result.unwrap_err();
        assert!(err.to_string().contains("not compiled in"));
    }
    assert_eq!(runtime.model_count(), 0);
}

#[test]
fn test_loaded_bytes_track_load_and_close() {
    let assets = Assets::new();
    let runtime = assets.runtime(cat_dog_factory());
    let model_len = common::MODEL_BYTES.len() as u64;

    let a = runtime.load_model("model.tflite", "labels.txt").unwrap();
    let b = runtime.load_model("model.tflite", "labels.txt").unwrap();
    assert_eq!(runtime.model_registry.total_memory(), 2 * model_len);

    runtime.close(a.as_str());
    assert_eq!(runtime.model_registry.total_memory(), model_len);
    runtime.close(b.as_str());
    assert_eq!(runtime.model_registry.total_memory(), 0);
}

#[test]
fn test_error_kinds_name_failure_class() {
    let assets = Assets::new();
    let runtime = assets.runtime(cat_dog_factory());

    let err = runtime.load_model("absent.tflite", "labels.txt").unwrap_err();
    assert_eq!(err.kind(), "load");

    let err = runtime
        .run_model_on_image("missing-id", "cat.png", 1, 0.5)
        .unwrap_err();
    assert_eq!(err.kind(), "no_such_model");

    let id = runtime.load_model("model.tflite", "labels.txt").unwrap();
    let missing = assets.path("missing.png").display().to_string();
    let err = runtime
        .run_model_on_image(id.as_str(), &missing, 1, 0.5)
        .unwrap_err();
    assert_eq!(err.kind(), "preprocess");
}

#[test]
fn test_score_vector_shorter_than_labels_ranks_available_scores() {
    let assets = Assets::new();
    assets.write("labels.txt", b"cat\ndog\nbird\n");
    let image = assets.png("cat.png", 4, 4, [0, 0, 0]);
    let factory = ScriptedFactory::new(InputShape::new(2, 2, 3), vec![51, 230]);
    let runtime = assets.runtime(factory);

    let id = runtime.load_model("model.tflite", "labels.txt").unwrap();
    let results = runtime.run_model_on_image(id.as_str(), &image, 3, 0.1).unwrap();

    let labels: Vec<&str> = results.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels, vec!["dog", "cat"]);
}
