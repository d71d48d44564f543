//! Result discovery and matrix loading integration tests

mod common;

use common::write_result_file;
use tdplot_io::{
    compute_observable_matrix, discover_result_files, fetch_or_compute, CachePolicy, IoError,
    KeyedStore, ObservableMatrix, PickleStore, RESULT_FILE_PATTERN,
};

#[test]
fn test_discovery_sorts_by_length_then_name() {
    let dir = tempfile::tempdir().unwrap();
    for target in [10, 2, 1, 100] {
        write_result_file(dir.path(), target, &[("min_temporal_distance", vec![0.0])]);
    }
    std::fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();
    std::fs::write(dir.path().join("min_temporal_distance_matrix.pkl"), "cache").unwrap();

    let files = discover_result_files(dir.path(), RESULT_FILE_PATTERN, None).unwrap();
    let names: Vec<String> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec![
            "helsinki_all_to_all_stats_target_1.pkl",
            "helsinki_all_to_all_stats_target_2.pkl",
            "helsinki_all_to_all_stats_target_10.pkl",
            "helsinki_all_to_all_stats_target_100.pkl",
        ]
    );

    let limited = discover_result_files(dir.path(), RESULT_FILE_PATTERN, Some(2)).unwrap();
    assert_eq!(limited.len(), 2);
}

#[test]
fn test_discovery_missing_directory_is_fatal() {
    let err = discover_result_files(
        std::path::Path::new("/no/such/results"),
        RESULT_FILE_PATTERN,
        None,
    )
    .unwrap_err();
    assert!(matches!(err, IoError::FileNotFound(_)));
}

#[test]
fn test_matrix_through_pickle_cache() {
    let dir = tempfile::tempdir().unwrap();
    write_result_file(
        dir.path(),
        1,
        &[("mean_temporal_distance", vec![60.0, f64::NAN, 600.0])],
    );
    write_result_file(
        dir.path(),
        2,
        &[("mean_temporal_distance", vec![120.0, 0.0, f64::INFINITY])],
    );

    let files = discover_result_files(dir.path(), RESULT_FILE_PATTERN, None).unwrap();
    let mut store = PickleStore::new(dir.path());
    let matrix: ObservableMatrix = fetch_or_compute(
        &mut store,
        "mean_temporal_distance",
        CachePolicy::UseCached,
        || compute_observable_matrix(&files, "mean_temporal_distance"),
    )
    .unwrap();

    assert_eq!(matrix.shape(), (2, 3));
    assert!(matrix.get(0, 1).unwrap().is_nan());

    // The cache file must not be picked up as a result file
    let files_after = discover_result_files(dir.path(), RESULT_FILE_PATTERN, None).unwrap();
    assert_eq!(files_after.len(), 2);

    let cached: Option<ObservableMatrix> = store.get("mean_temporal_distance").unwrap();
    let cached = cached.unwrap();
    assert_eq!(cached.get(1, 0), Some(120.0));
    assert!(cached.get(1, 2).unwrap().is_infinite());
}
