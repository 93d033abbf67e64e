//! Experiment Schema Tests
//!
//! Records exchanged between a session and its tracker, and the in-memory
//! store that holds them.

use artifact_sink::array::{Array, DType};
use artifact_sink::experiment::{
    ArtifactKind, ArtifactRecord, ExperimentStore, MetricRecord, MetricValue, RunRecord,
    RunStatus,
};

// =============================================================================
// RunRecord Tests
// =============================================================================

#[test]
fn test_run_record_creation() {
    let run = RunRecord::new("run-001", "vision", "lab");

    assert_eq!(run.run_id(), "run-001");
    assert_eq!(run.project(), "vision");
    assert_eq!(run.entity(), "lab");
    assert_eq!(run.status(), RunStatus::Pending);
    assert!(run.config().is_none());
    assert!(run.started_at().is_none());
    assert!(run.ended_at().is_none());
}

#[test]
fn test_run_record_with_config() {
    let config = serde_json::json!({
        "learning_rate": 0.01,
        "batch_size": 32,
        "model": "resnet50"
    });

    let run = RunRecord::builder("run-002", "vision", "lab")
        .config(config.clone())
        .build();

    assert_eq!(run.config(), Some(&config));
    assert_eq!(run.status(), RunStatus::Pending);
}

#[test]
fn test_run_record_complete_success() {
    let mut run = RunRecord::new("run-003", "vision", "lab");
    run.start();
    run.complete(RunStatus::Success);

    assert_eq!(run.status(), RunStatus::Success);
    assert!(run.started_at().is_some());
    assert!(run.ended_at().is_some());
    assert!(run.ended_at().unwrap() >= run.started_at().unwrap());
}

#[test]
fn test_run_record_serialization() {
    let mut run = RunRecord::new("run-004", "vision", "lab");
    run.start();

    let json = serde_json::to_string(&run).expect("serialization failed");
    let deserialized: RunRecord = serde_json::from_str(&json).expect("deserialization failed");

    assert_eq!(run, deserialized);
}

#[test]
fn test_run_status_wire_names() {
    assert_eq!(serde_json::to_string(&RunStatus::Pending).unwrap(), "\"pending\"");
    assert_eq!(serde_json::to_string(&RunStatus::Running).unwrap(), "\"running\"");
    assert_eq!(serde_json::to_string(&RunStatus::Success).unwrap(), "\"success\"");
    assert_eq!(serde_json::to_string(&RunStatus::Failed).unwrap(), "\"failed\"");
    assert_eq!(serde_json::to_string(&RunStatus::Cancelled).unwrap(), "\"cancelled\"");
}

// =============================================================================
// MetricRecord Tests
// =============================================================================

#[test]
fn test_metric_record_with_explicit_timestamp() {
    use chrono::{TimeZone, Utc};
    let ts = Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap();

    let metric = MetricRecord::builder("run-001", "accuracy", 0.95)
        .step(100)
        .timestamp(ts)
        .build();

    assert_eq!(metric.timestamp(), ts);
    assert_eq!(metric.step(), Some(100));
}

#[test]
fn test_metric_record_unindexed() {
    let metric = MetricRecord::new("run-001", "loss", None, 0.25);
    assert_eq!(metric.step(), None);

    let json = serde_json::to_value(&metric).unwrap();
    assert!(json["step"].is_null());
}

#[test]
fn test_metric_value_array_serialization() {
    let array = Array::from_shape_vec([2, 3], vec![1u8, 2, 3, 4, 5, 6]).unwrap();
    let metric = MetricRecord::new("run-001", "mask", Some(5), &array);

    let json = serde_json::to_string(&metric).expect("serialization failed");
    let deserialized: MetricRecord = serde_json::from_str(&json).expect("deserialization failed");

    assert_eq!(deserialized, metric);
    match deserialized.value() {
        MetricValue::Array {
            dtype,
            shape,
            values,
        } => {
            assert_eq!(*dtype, DType::U8);
            assert_eq!(shape, &vec![2, 3]);
            assert_eq!(values.len(), 6);
        }
        other => panic!("expected array value, got {other:?}"),
    }
}

#[test]
fn test_metric_record_time_series_batch() {
    // Simulate a training loop writing metrics
    let metrics: Vec<MetricRecord> = (0..100u64)
        .map(|step| {
            let loss = 1.0 / (step as f64 + 1.0);
            MetricRecord::new("run-001", "loss", Some(step), loss)
        })
        .collect();

    assert_eq!(metrics.len(), 100);
    assert_eq!(metrics[0].step(), Some(0));
    assert_eq!(metrics[99].step(), Some(99));

    // Loss should decrease over steps
    assert!(metrics[0].value().as_scalar() > metrics[99].value().as_scalar());
}

// =============================================================================
// ArtifactRecord Tests
// =============================================================================

#[test]
fn test_artifact_record_serialization() {
    let artifact = ArtifactRecord::new(
        "run-001",
        "config",
        ArtifactKind::Object,
        "outputs/exp_config.json",
        5000,
    );

    let json = serde_json::to_string(&artifact).expect("serialization failed");
    let deserialized: ArtifactRecord = serde_json::from_str(&json).expect("deserialization failed");

    assert_eq!(artifact, deserialized);
}

// =============================================================================
// ExperimentStore Tests
// =============================================================================

#[test]
fn test_get_metrics_for_run_single_key() {
    let mut store = ExperimentStore::new();

    for step in 0..5u64 {
        store.add_metric(MetricRecord::new(
            "run-001",
            "loss",
            Some(step),
            1.0 / (step as f64 + 1.0),
        ));
    }

    // Different run (should not be returned)
    for step in 0..5u64 {
        store.add_metric(MetricRecord::new("run-002", "loss", Some(step), 0.5));
    }

    let metrics = store.get_metrics_for_run("run-001", "loss");

    assert_eq!(metrics.len(), 5);
    for metric in &metrics {
        assert_eq!(metric.run_id(), "run-001");
        assert_eq!(metric.key(), "loss");
    }
}

#[test]
fn test_get_metrics_for_run_ordered_by_step() {
    let mut store = ExperimentStore::new();

    for step in [3u64, 1, 4, 0, 2] {
        store.add_metric(MetricRecord::new("run-001", "loss", Some(step), 0.1));
    }

    let metrics = store.get_metrics_for_run("run-001", "loss");

    assert_eq!(metrics.len(), 5);
    for (i, metric) in metrics.iter().enumerate() {
        assert_eq!(metric.step(), Some(i as u64));
    }
}

#[test]
fn test_get_metrics_for_run_empty_result() {
    let mut store = ExperimentStore::new();
    store.add_metric(MetricRecord::new("run-001", "loss", Some(0), 0.5));

    assert!(store.get_metrics_for_run("run-999", "loss").is_empty());
    assert!(store.get_metrics_for_run("run-001", "accuracy").is_empty());
}

#[test]
fn test_experiment_store_runs_by_project() {
    let mut store = ExperimentStore::new();

    store.put_run(RunRecord::new("run-001", "vision", "lab"));
    store.put_run(RunRecord::new("run-002", "vision", "lab"));
    store.put_run(RunRecord::new("run-003", "nlp", "lab"));

    let runs = store.get_runs_for_project("vision");
    assert_eq!(runs.len(), 2);
    for run in runs {
        assert_eq!(run.project(), "vision");
    }
}
