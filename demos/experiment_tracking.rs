//! Experiment Tracking Example
//!
//! Drives a full training-run session against the in-memory tracker: metric
//! logging, tensor and image logging, artifact saving, and a line log.
//!
//! Run with: cargo run --example experiment_tracking

use artifact_sink::array::{Array, Device, Tensor};
use artifact_sink::artifact::load_array;
use artifact_sink::telemetry::init_tracing;
use artifact_sink::tracker::MemoryTracker;
use artifact_sink::{LogFile, Session, SessionConfig};

fn main() -> artifact_sink::Result<()> {
    init_tracing("artifact_sink=info")?;
    println!("=== artifact-sink Experiment Tracking ===\n");

    let output_dir = std::env::temp_dir().join("artifact-sink-demo");

    // -------------------------------------------------------------------------
    // 1. Start a session
    // -------------------------------------------------------------------------
    println!("1. Starting session...");

    let tracker = MemoryTracker::new();
    let config = SessionConfig::builder("imagenet", "resnet-run-001", "vision-lab")
        .config(serde_json::json!({
            "model": "resnet50",
            "learning_rate": 0.001,
            "batch_size": 32,
            "epochs": 10,
            "optimizer": "adam"
        }))
        .output_dir(&output_dir)
        .file_prefix("resnet")
        .build();
    let mut session = Session::start(config, tracker.clone())?;
    let mut log = LogFile::open(output_dir_log(&output_dir)?)?;

    println!("   Run ID: {}", session.run().run_id());
    println!("   Status: {:?}", session.run().status());
    println!("   Output: {}", output_dir.display());

    // -------------------------------------------------------------------------
    // 2. Simulate training loop with metric logging
    // -------------------------------------------------------------------------
    println!("\n2. Simulating training (10 epochs)...");

    for epoch in 0..10u64 {
        // Simulate decreasing loss
        let loss = 2.5 / (epoch as f64 + 1.0) + 0.1;
        let accuracy = 0.5 + 0.05 * epoch as f64;

        session.log_metric("loss", loss, Some(epoch))?;
        session.log_metric("accuracy", accuracy, Some(epoch))?;
        log.write(&format!("epoch {epoch}: loss={loss:.4} accuracy={accuracy:.4}"))?;

        println!("   Epoch {epoch}: loss={loss:.4}, accuracy={accuracy:.4}");
    }

    let weights = Tensor::from_shape_vec([4, 4], (0..16).map(|i| i as f32 * 0.01).collect())?
        .with_requires_grad(true)
        .to_device(Device::Accelerator(0));
    session.log_tensor("weights", &weights, None)?;

    // -------------------------------------------------------------------------
    // 3. Log a sample image
    // -------------------------------------------------------------------------
    println!("\n3. Logging sample image...");

    let pixels: Vec<u8> = (0..8 * 8 * 3).map(|i| (i * 4 % 256) as u8).collect();
    let image = Array::from_shape_vec([8, 8, 3], pixels)?;
    session.log_image("sample_prediction", &image, None)?;
    println!("   Image: 8x8 RGB");

    // -------------------------------------------------------------------------
    // 4. Save artifacts
    // -------------------------------------------------------------------------
    println!("\n4. Saving artifacts...");

    let weights_path = session.save_tensor_to_npz(&weights, "weights", Some("epoch_10"))?;
    let labels_path = session.save_obj_to_pkl(
        &serde_json::json!({"classes": ["cat", "dog", "bird"]}),
        "labels",
        None,
    )?;
    for artifact in session.artifacts() {
        println!(
            "   {:?} {} ({} bytes)",
            artifact.kind(),
            artifact.path().display(),
            artifact.size_bytes()
        );
    }

    let reloaded = load_array(&weights_path, "weights")?;
    println!(
        "   Reloaded weights: dtype={}, shape={:?}",
        reloaded.dtype(),
        reloaded.shape()
    );
    println!("   Labels: {}", labels_path.display());

    // -------------------------------------------------------------------------
    // 5. Finish the run
    // -------------------------------------------------------------------------
    println!("\n5. Finishing run...");

    session.set_metadata("best_accuracy", 0.95)?;
    session.finish()?;
    log.close()?;
    println!("   Final Status: {:?}", session.run().status());

    // -------------------------------------------------------------------------
    // 6. Query what the tracker recorded
    // -------------------------------------------------------------------------
    println!("\n6. Tracker contents:");

    tracker.with_store(|store| {
        let loss = store.get_metrics_for_run("resnet-run-001", "loss");
        println!(
            "   Loss: {:.4} -> {:.4} over {} steps",
            loss.first().and_then(|m| m.value().as_scalar()).unwrap_or(0.0),
            loss.last().and_then(|m| m.value().as_scalar()).unwrap_or(0.0),
            loss.len()
        );
        println!("   Metrics: {}", store.metric_count());
        println!("   Artifacts: {}", store.artifact_count());
        println!("   Summary: {:?}", store.get_summary("resnet-run-001"));
    });

    println!("\n=== Experiment Tracking Complete ===");
    Ok(())
}

fn output_dir_log(output_dir: &std::path::Path) -> artifact_sink::Result<std::path::PathBuf> {
    std::fs::create_dir_all(output_dir)?;
    Ok(output_dir.join("train.log"))
}
