//! Artifact Writer Tests

use std::collections::BTreeMap;

use artifact_sink::array::{Array, DType, Device, Tensor};
use artifact_sink::artifact::{
    load_array, load_object, save_array, save_object, save_tensor, ArtifactWriter,
};
use artifact_sink::npz::Compression;
use artifact_sink::Error;
use serde::{Deserialize, Serialize};

// =============================================================================
// Arrays
// =============================================================================

#[test]
fn test_save_array_repeated_into_same_folder() {
    let dir = tempfile::tempdir().unwrap();
    let folder = dir.path().join("checkpoints").join("epoch_1");

    let first = Array::from_shape_vec([2, 2], vec![1.0f64, 2.0, 3.0, 4.0]).unwrap();
    let second = Array::from_vec(vec![-7i8, 0, 7]);
    let first_path = save_array(&folder, "dense", &first, "kernel").unwrap();
    let second_path = save_array(&folder, "quant", &second, "kernel").unwrap();

    assert!(folder.is_dir());
    assert_eq!(load_array(first_path, "kernel").unwrap(), first);
    assert_eq!(load_array(second_path, "kernel").unwrap(), second);
}

#[test]
fn test_save_array_folder_is_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("taken");
    std::fs::write(&blocker, b"not a directory").unwrap();

    let err = save_array(&blocker, "x", &Array::from_vec(vec![1u8]), "x").unwrap_err();

    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn test_zero_dimensional_and_empty_arrays() {
    let dir = tempfile::tempdir().unwrap();
    let scalar = Array::from_shape_vec(Vec::<usize>::new(), vec![42u32]).unwrap();
    let empty = Array::zeros(DType::F32, [0, 3]);

    let scalar_path = save_array(dir.path(), "scalar", &scalar, "v").unwrap();
    let empty_path = save_array(dir.path(), "empty", &empty, "v").unwrap();

    let scalar_back = load_array(scalar_path, "v").unwrap();
    assert_eq!(scalar_back.ndim(), 0);
    assert_eq!(scalar_back.to_vec::<u32>().unwrap(), vec![42]);

    let empty_back = load_array(empty_path, "v").unwrap();
    assert_eq!(empty_back.shape(), &[0, 3]);
    assert!(empty_back.is_empty());
}

// =============================================================================
// Tensors
// =============================================================================

#[test]
fn test_save_tensor_from_accelerator_with_grad() {
    let dir = tempfile::tempdir().unwrap();
    let mut tensor = Tensor::from_shape_vec([3, 1], vec![0.1f32, 0.2, 0.3])
        .unwrap()
        .with_requires_grad(true)
        .to_device(Device::Accelerator(2));
    tensor
        .set_grad(Array::from_shape_vec([3, 1], vec![1.0f32; 3]).unwrap())
        .unwrap();

    let path = save_tensor(dir.path(), "activations", &tensor, "act").unwrap();

    let loaded = load_array(path, "act").unwrap();
    assert_eq!(loaded.shape(), &[3, 1]);
    assert_eq!(loaded.to_vec::<f32>().unwrap(), vec![0.1, 0.2, 0.3]);
    assert!(tensor.grad().is_some());
}

#[test]
fn test_save_tensor_on_cpu_equals_array_save() {
    let dir = tempfile::tempdir().unwrap();
    let tensor = Tensor::from_vec(vec![5u16, 6, 7]);

    let path = save_tensor(dir.path(), "ids", &tensor, "ids").unwrap();

    assert_eq!(
        load_array(path, "ids").unwrap(),
        Array::from_vec(vec![5u16, 6, 7])
    );
}

// =============================================================================
// Objects
// =============================================================================

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct TrainingState {
    step: u64,
    optimizer: BTreeMap<String, f64>,
    history: Vec<Vec<f64>>,
    note: Option<String>,
}

#[test]
fn test_save_object_nested_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let state = TrainingState {
        step: 1200,
        optimizer: BTreeMap::from([("beta1".to_string(), 0.9), ("lr".to_string(), 3e-4)]),
        history: vec![vec![2.3, 1.7], vec![1.1]],
        note: None,
    };

    let path = save_object(dir.path().join("state"), "trainer", &state).unwrap();

    assert_eq!(path, dir.path().join("state").join("trainer.json"));
    let loaded: TrainingState = load_object(path).unwrap();
    assert_eq!(loaded, state);
}

#[test]
fn test_load_object_wrong_type() {
    let dir = tempfile::tempdir().unwrap();
    let path = save_object(dir.path(), "list", &vec![1, 2, 3]).unwrap();

    let result: artifact_sink::Result<TrainingState> = load_object(path);

    assert!(matches!(result, Err(Error::Serialization(_))));
}

// =============================================================================
// Writer Settings
// =============================================================================

#[test]
fn test_stored_archive_is_larger_for_repetitive_data() {
    let dir = tempfile::tempdir().unwrap();
    let array = Array::zeros(DType::F64, [256, 256]);

    let deflated = ArtifactWriter::default()
        .save_array(dir.path(), "deflated", &array, "z")
        .unwrap();
    let stored = ArtifactWriter::new(Compression::Stored)
        .save_array(dir.path(), "stored", &array, "z")
        .unwrap();

    let deflated_len = std::fs::metadata(&deflated).unwrap().len();
    let stored_len = std::fs::metadata(&stored).unwrap().len();
    assert!(deflated_len < stored_len);
    assert_eq!(load_array(stored, "z").unwrap(), array);
}
