//! End-to-end runs of the figure pipeline over a small fixture network

mod common;

use common::write_fixture;
use tdplot_core::{
    figures, names, ExportFormat, FigureManifest, Pipeline, PlotError, MANIFEST_FILE,
};
use tdplot_io::{KeyedStore, MemoryStore, ObservableMatrix, PickleStore};

#[test]
fn test_full_run_writes_catalog_and_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = write_fixture(dir.path());
    config.target_node_id = Some("1".to_string());

    let manifest = Pipeline::new(config.clone()).unwrap().run().unwrap();

    assert_eq!(manifest.pairs, 8);
    assert_eq!(manifest.dropped_pairs, 1);
    assert!(manifest.skipped.is_empty());
    assert_eq!(manifest.figures.len(), 11);
    for figure in &manifest.figures {
        assert!(figure.path.exists(), "missing {}", figure.path.display());
        assert_eq!(figure.format, ExportFormat::Png);
    }

    let summary = manifest.get(figures::SUMMARY).unwrap();
    assert_eq!(summary.dimensions, (1600, 800));
    assert_eq!(
        manifest.get(figures::MIN_VS_MAX).unwrap().dimensions,
        (320, 240)
    );

    let map = manifest
        .get("helsinki_test_1_multiple_measures")
        .expect("map grid written");
    assert_eq!(map.path.parent(), Some(config.paths.results_dir.as_path()));

    let written = std::fs::read_to_string(config.paths.figures_dir.join(MANIFEST_FILE)).unwrap();
    assert_eq!(FigureManifest::from_json(&written).unwrap(), manifest);
}

#[test]
fn test_run_persists_observable_matrices() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_fixture(dir.path());
    Pipeline::new(config.clone()).unwrap().run().unwrap();

    let store = PickleStore::new(config.paths.stats_dir());
    let cached: Option<ObservableMatrix> = store.get(names::MIN_TEMPORAL_DISTANCE).unwrap();
    let cached = cached.expect("matrix cached after first run");
    assert_eq!(cached.shape(), (3, 3));
    assert_eq!(cached.get(0, 0), Some(f64::INFINITY));
    assert_eq!(cached.get(2, 1), Some(2400.0));
}

#[test]
fn test_cached_matrices_take_precedence() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_fixture(dir.path());

    // one target with a single origin, unlike the files on disk
    let mut store: MemoryStore<ObservableMatrix> = MemoryStore::new();
    for (name, row) in [
        (names::MIN_TEMPORAL_DISTANCE, vec![600.0, 1200.0]),
        (names::MEAN_TEMPORAL_DISTANCE, vec![900.0, 1800.0]),
        (names::MAX_TEMPORAL_DISTANCE, vec![1200.0, 2400.0]),
        (names::N_PARETO_OPTIMAL_TRIPS, vec![2.0, 1.0]),
        (names::MEAN_N_BOARDINGS, vec![1.5, 1.0]),
        (names::MIN_N_BOARDINGS, vec![1.0, 1.0]),
        (names::MAX_N_BOARDINGS, vec![2.0, 1.0]),
    ] {
        store.put(name, &ObservableMatrix::new(vec![row])).unwrap();
    }

    let manifest = Pipeline::new(config).unwrap().run_with_store(&mut store).unwrap();
    assert_eq!(manifest.pairs, 2);
    assert_eq!(manifest.skipped.len(), 1);
    assert_eq!(manifest.skipped[0].name, figures::MEAN_VS_MEAN_SYMMETRICITY);
}

#[test]
fn test_quicklook_skipped_without_root_results() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_fixture(dir.path());
    for entry in std::fs::read_dir(&config.paths.results_dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_file() {
            std::fs::remove_file(path).unwrap();
        }
    }

    let manifest = Pipeline::new(config).unwrap().run().unwrap();
    assert_eq!(manifest.figures.len(), 7);
    let skipped: Vec<&str> = manifest.skipped.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(skipped, figures::QUICKLOOK);
    assert!(manifest.get("quicklook_min_vs_mean").is_none());
}

#[test]
fn test_svg_output() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = write_fixture(dir.path());
    config.export.format = ExportFormat::Svg;

    let manifest = tdplot_core::run(config).unwrap();
    let pairwise = manifest.get(figures::MEAN_VS_MAX).unwrap();
    assert_eq!(pairwise.path.extension().unwrap(), "svg");
    assert_eq!(pairwise.mime_type, "image/svg+xml");
    let text = std::fs::read_to_string(&pairwise.path).unwrap();
    assert!(text.contains("<svg"));
}

#[test]
fn test_missing_target_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_fixture(dir.path());
    let pipeline = Pipeline::new(config).unwrap();
    assert!(matches!(
        pipeline.map_grid("9999"),
        Err(PlotError::InvalidConfig(_))
    ));
}

#[test]
fn test_invalid_config_rejected_before_loading() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = write_fixture(dir.path());
    config.time.horizon = 0.0;
    assert!(matches!(Pipeline::new(config), Err(PlotError::Config(_))));
}

#[test]
fn test_missing_results_directory() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = write_fixture(dir.path());
    config.paths.results_dir = dir.path().join("elsewhere");
    assert!(matches!(
        tdplot_core::run(config),
        Err(PlotError::Load(_))
    ));
}
