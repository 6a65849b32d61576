use super::*;
use crate::core::config::{ModelInferenceConfig, OrtSessionConfig};
use crate::core::errors::ErrorKind;
use std::io::Write;

#[test]
fn test_new_fails_for_missing_model() {
    let result = OrtInfer::new("dummy_path.onnx");
    let err = result.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ModelUnavailable);
}

#[test]
fn test_from_config_rejects_corrupt_artifact() {
    let mut file = tempfile::Builder::new().suffix(".onnx").tempfile().unwrap();
    file.write_all(b"definitely not a protobuf graph").unwrap();

    let common = ModelInferenceConfig {
        session_pool_size: 2,
        ort_session: Some(OrtSessionConfig::new().with_intra_threads(1)),
        ..ModelInferenceConfig::default()
    };
    let result = OrtInfer::from_config(&common, file.path());
    assert!(matches!(result, Err(PlaneError::ModelLoad { .. })));
}

#[test]
fn test_static_class_count_reads_last_dimension() {
    assert_eq!(static_class_count(&[-1, 6]), Some(6));
    assert_eq!(static_class_count(&[1, 6]), Some(6));
    assert_eq!(static_class_count(&[-1, -1]), None);
    assert_eq!(static_class_count(&[6]), None);
    assert_eq!(static_class_count(&[]), None);
}
