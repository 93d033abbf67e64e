//! Tests for error types

use std::path::PathBuf;

use artifact_sink::array::DType;
use artifact_sink::Error;

#[test]
fn test_invalid_npy_error() {
    let error = Error::InvalidNpy("missing magic".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("Invalid NPY data"));
    assert!(error_str.contains("missing magic"));
}

#[test]
fn test_missing_key_error() {
    let error = Error::MissingKey("weights".to_string());
    assert_eq!(format!("{error}"), "Archive has no array named 'weights'");
}

#[test]
fn test_dtype_mismatch_error() {
    let error = Error::DtypeMismatch {
        expected: DType::F64,
        actual: DType::F32,
    };
    let error_str = format!("{error}");
    assert!(error_str.contains("expected float64"));
    assert!(error_str.contains("found float32"));
}

#[test]
fn test_shape_mismatch_error() {
    let error = Error::ShapeMismatch {
        shape: vec![2, 3],
        expected: 6,
        actual: 5,
    };
    let error_str = format!("{error}");
    assert!(error_str.contains("[2, 3]"));
    assert!(error_str.contains("needs 6 elements, got 5"));
}

#[test]
fn test_session_finished_error() {
    let error = Error::SessionFinished {
        run: "run-9".to_string(),
    };
    let error_str = format!("{error}");
    assert!(error_str.contains("run-9"));
    assert!(error_str.contains("already finished"));
}

#[test]
fn test_closed_error() {
    let error = Error::Closed {
        path: PathBuf::from("train.log"),
    };
    assert_eq!(format!("{error}"), "Log file train.log is closed");
}

#[test]
fn test_no_output_dir_error() {
    let error_str = format!("{}", Error::NoOutputDir);
    assert!(error_str.contains("No output directory"));
}

#[test]
fn test_io_error_conversion() {
    let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let error: Error = io_error.into();
    let error_str = format!("{error}");
    assert!(error_str.contains("IO error"));
    assert!(matches!(error, Error::Io(_)));
}

#[test]
fn test_serialization_error_conversion() {
    let json_error = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    let error: Error = json_error.into();
    assert!(format!("{error}").contains("Serialization error"));
}

#[test]
fn test_archive_error_conversion() {
    let error: Error = zip::result::ZipError::FileNotFound.into();
    assert!(matches!(error, Error::Archive(_)));
    assert!(format!("{error}").contains("Archive error"));
}

#[test]
fn test_other_error() {
    let error = Error::Other("custom error message".to_string());
    assert_eq!(format!("{error}"), "custom error message");
}

#[test]
fn test_error_debug() {
    let error = Error::NoOutputDir;
    let debug_str = format!("{error:?}");
    assert!(debug_str.contains("NoOutputDir"));
}

#[test]
fn test_result_type_alias_error() {
    fn returns_error() -> artifact_sink::Result<i32> {
        Err(Error::Other("test error".to_string()))
    }

    let result = returns_error();
    assert!(result.is_err());
}

#[test]
fn test_npy_write_error_from_io() {
    let source = ndarray_npy::WriteNpyError::from(std::io::Error::other("disk full"));
    let error = Error::from(source);
    let error_str = format!("{error}");
    assert!(error_str.contains("NPY write error"));
    assert!(error_str.contains("disk full"));
}
