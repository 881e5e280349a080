use super::*;
use proptest::prelude::*;
use std::io::Write;

const TEXT_EXPORTER: &str = "\
#FEATURE,rt,mz,intensity,charge,overall_quality,rt_quality,mz_quality,rt_start,rt_end
FEATURE,150.0,500.25,1e6,2,0.9,0.9,0.9,0,100.0,200.0
CONSENSUS,1,2,3
FEATURE,40.5,650.3300,2e5,3,0.5,0.5,0.5,0,30.0,55.0
";

const DINOSAUR: &str = "\
mz\tmostAbundantMz\tcharge\trtStart\trtApex\trtEnd\tfwhm\tnIsotopes\tnScans\taverageppm\tmass\tintensityApex\tintensitySum\tcosine
500.25\t500.75\t2\t1.5\t2.0\t2.5\t0.1\t3\t20\t1.2\t998.49\t1e6\t5e6\t0.99
420.10\t420.10\t1\t1.0\t1.1\t1.2\t0.1\t2\t5\t1.0\t419.09\t1e4\t2e4\t0.90
733.40\t733.90\t3\t0.5\t0.6\t0.7\t0.1\t4\t8\t0.8\t2197.18\t3e5\t9e5\t0.95
";

#[test]
fn test_text_exporter_rows() {
    let features = read_text_exporter(TEXT_EXPORTER.as_bytes(), "table.csv").unwrap();

    assert_eq!(features.len(), 2);
    assert_eq!(
        features[0],
        Feature {
            mz: 500.25,
            charge: 2,
            rt_apex: 150.0,
            rt_left: 100.0,
            rt_right: 200.0,
        }
    );
    assert_eq!(features[1].charge, 3);
}

#[test]
fn test_dinosaur_rows_are_scaled_and_filtered() {
    let features = read_dinosaur(DINOSAUR.as_bytes(), "run.features.csv", 2).unwrap();

    assert_eq!(features.len(), 2);
    assert_eq!(features[0].mz, 500.25);
    assert_eq!(features[0].rt_left, 90.0);
    assert_eq!(features[0].rt_apex, 120.0);
    assert_eq!(features[0].rt_right, 150.0);
    assert_eq!(features[1].charge, 3);

    let all = read_dinosaur(DINOSAUR.as_bytes(), "run.features.csv", 1).unwrap();
    assert_eq!(all.len(), 3);
}

#[test]
fn test_malformed_number_names_file_and_line() {
    let table = "FEATURE,150.0,abc,1e6,2,0.9,0.9,0.9,0,100.0,200.0\n";
    let err = read_text_exporter(table.as_bytes(), "bad.csv").unwrap_err();

    match &err {
        FeatureError::InvalidValue {
            source_name,
            line,
            field,
            value,
        } => {
            assert_eq!(source_name, "bad.csv");
            assert_eq!(*line, 1);
            assert_eq!(*field, "mz");
            assert_eq!(value, "abc");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("bad.csv line 1"));
}

#[test]
fn test_short_row_is_rejected() {
    let table = "mz\tx\tcharge\n500.0\t500.0\t2\t1.0\n";
    let err = read_dinosaur(table.as_bytes(), "short.features.csv", 2).unwrap_err();
    assert!(matches!(
        err,
        FeatureError::MissingColumn {
            line: 2,
            expected: 6,
            found: 4,
            ..
        }
    ));
}

#[test]
fn test_dialect_from_path() {
    assert_eq!(
        FeatureDialect::from_path("/data/run.features.csv"),
        FeatureDialect::Dinosaur
    );
    assert_eq!(
        FeatureDialect::from_path("/data/run.csv"),
        FeatureDialect::TextExporter
    );
    assert_eq!(
        FeatureDialect::from_path("/data/run.features.tsv"),
        FeatureDialect::TextExporter
    );
}

#[test]
fn test_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.features.csv");
    std::fs::File::create(&path)
        .unwrap()
        .write_all(DINOSAUR.as_bytes())
        .unwrap();

    let table = FeatureTable::load(&path, DEFAULT_MIN_CHARGE).unwrap();
    assert_eq!(table.len(), 2);
    // Sorted by rt_right: the charge 3 feature ends first
    let charges: Vec<i32> = table.iter().map(|(_, f)| f.charge).collect();
    assert_eq!(charges, vec![3, 2]);
}

#[test]
fn test_missing_file() {
    let err = FeatureTable::load("/nonexistent/run.csv", 2).unwrap_err();
    assert!(matches!(err, FeatureError::IoError { .. }));
}

#[test]
fn test_ids_follow_rt_right_order() {
    let table = FeatureTable::new(vec![
        feature(700.0, 0.0, 30.0),
        feature(500.0, 0.0, 10.0),
        feature(600.0, 0.0, 20.0),
    ]);

    let order: Vec<(FeatureId, f64)> = table.iter().map(|(id, f)| (id, f.mz)).collect();
    assert_eq!(order, vec![(0, 500.0), (1, 600.0), (2, 700.0)]);

    let by_mz: Vec<FeatureId> = table.candidates(0.0, 1000.0).map(|(id, _)| id).collect();
    assert_eq!(by_mz, vec![0, 1, 2]);
}

#[test]
fn test_candidate_bounds_are_inclusive() {
    let table = FeatureTable::new(vec![
        feature(498.0, 0.0, 1.0),
        feature(500.0, 0.0, 1.0),
        feature(502.0, 0.0, 1.0),
        feature(502.5, 0.0, 1.0),
    ]);

    let mzs: Vec<f64> = table.candidates(498.0, 502.0).map(|(_, f)| f.mz).collect();
    assert_eq!(mzs, vec![498.0, 500.0, 502.0]);
    assert!(table.candidate_range(503.0, 499.0).is_empty());
}

#[test]
fn test_elution_window_is_strict() {
    let f = feature(500.0, 10.0, 20.0);
    assert!(f.elutes_at(15.0));
    assert!(!f.elutes_at(10.0));
    assert!(!f.elutes_at(20.0));
}

fn feature(mz: f64, rt_left: f64, rt_right: f64) -> Feature {
    Feature {
        mz,
        charge: 2,
        rt_apex: (rt_left + rt_right) / 2.0,
        rt_left,
        rt_right,
    }
}

proptest! {
    /// The binary-searched range matches a linear scan, duplicates included
    #[test]
    fn test_candidate_range_matches_linear_scan(
        mzs in prop::collection::vec(prop::sample::select(vec![400.0, 400.5, 401.0, 401.5, 402.0, 403.0]), 0..40),
        lo in 399.0f64..404.0,
        width in 0.0f64..3.0,
    ) {
        let hi = lo + width;
        let table = FeatureTable::new(mzs.iter().map(|&mz| feature(mz, 0.0, 1.0)).collect());

        let mut found: Vec<FeatureId> = table.candidates(lo, hi).map(|(id, _)| id).collect();
        let mut expected: Vec<FeatureId> = table
            .iter()
            .filter(|(_, f)| lo <= f.mz && f.mz <= hi)
            .map(|(id, _)| id)
            .collect();
        found.sort_unstable();
        expected.sort_unstable();
        prop_assert_eq!(found, expected);
    }
}
