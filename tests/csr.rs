//! End-to-end scenarios for the CSR engine (S1-S3 in the design doc).

use sparseflow::{Csr, CsrFlowError};
use tempfile::NamedTempFile;

fn s1() -> Csr {
    Csr::new(vec![1.0, 4.0, 5.0], vec![0, 0, 1], vec![0, 1, 1, 3], Some(3), Some(3)).unwrap()
}

#[test]
fn s1_slice_with_negative_index() {
    let m = s1();
    let d = m.slice(&[0, 2, -3]).unwrap();
    assert_eq!(d.into_data(), vec![1.0, 0.0, 0.0, 4.0, 5.0, 0.0, 1.0, 0.0, 0.0]);
}

#[test]
fn s2_round_trip_through_a_saved_file() {
    let m = s1();
    let file = NamedTempFile::new().unwrap();
    m.save(file.path()).unwrap();
    let loaded = Csr::load(file.path()).unwrap();
    assert_eq!(loaded, m);
}

#[test]
fn s3_empty_indices_is_a_shape_error() {
    let err = Csr::new(vec![], vec![], vec![0], None, None).unwrap_err();
    match err {
        CsrFlowError::InvalidCsr { reason } => assert_eq!(reason, "indices array is empty"),
        other => panic!("expected InvalidCsr, got {other:?}"),
    }
}

#[test]
fn slice_of_a_wide_random_matrix_stays_within_bounds() {
    let m = Csr::random(64, 4096, 0.01);
    let ixs: Vec<i64> = (0..m.nrows() as i64).step_by(7).collect();
    let d = m.slice(&ixs).unwrap();
    assert_eq!(d.nrows(), ixs.len());
    assert_eq!(d.ncols(), m.ncols());
}

#[test]
fn out_of_range_index_is_reported_not_panicked() {
    let m = s1();
    let err = m.slice(&[100]).unwrap_err();
    assert!(matches!(err, CsrFlowError::IndexOutOfRange { index: 100, bound: 3 }));

    let err = m.slice(&[-100]).unwrap_err();
    assert!(matches!(err, CsrFlowError::IndexOutOfRange { index: -100, bound: 3 }));
}
