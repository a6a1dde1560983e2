use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::sync::Arc;

use anomalyscan::{
    DBSCAN, Error, FeatureSelector, NOISE, Pipeline, PipelineConfig, ResultTable, Scaler, Table,
};
use ndarray::array;

const SCALER_JSON: &str = r#"{
    "kind": "standard",
    "feature_names": ["V1", "V2"],
    "mean": [0.0, 0.0],
    "scale": [1.0, 1.0]
}"#;

fn pipeline() -> Pipeline {
    let scaler = Scaler::from_json(SCALER_JSON).unwrap();
    Pipeline::new(Arc::new(scaler), PipelineConfig::default()).unwrap()
}

/// Two dense groups of six rows each plus two far-away rows.
fn upload() -> String {
    let mut csv = String::from("Time,V1,V2,Class\n");
    let mut t = 0;
    for (cx, cy) in [(0.0, 0.0), (20.0, 20.0)] {
        for (dx, dy) in [(0.0, 0.0), (0.3, 0.0), (0.0, 0.3), (0.3, 0.3), (0.15, 0.15), (0.1, 0.2)] {
            csv.push_str(&format!("{},{},{},0\n", t, cx + dx, cy + dy));
            t += 1;
        }
    }
    csv.push_str("100,-40,5,1\n");
    csv.push_str("101,60,-30,1\n");
    csv
}

fn groups(labels: &[i32]) -> BTreeSet<BTreeSet<usize>> {
    let mut by_label: BTreeMap<i32, BTreeSet<usize>> = BTreeMap::new();
    for (i, &l) in labels.iter().enumerate() {
        if l != NOISE {
            by_label.entry(l).or_default().insert(i);
        }
    }
    by_label.into_values().collect()
}

#[test]
fn scenario_a_time_and_class_are_dropped() {
    let table =
        Table::from_csv_reader("Time,V1,V2,Class\n0,1.0,2.0,0\n1,1.5,2.5,1\n".as_bytes()).unwrap();
    let selected = FeatureSelector::default().select(&table).unwrap();
    assert_eq!(selected.columns(), &["V1", "V2"]);
}

#[test]
fn scenario_b_five_close_points_one_outlier() {
    let x = array![
        [0.0, 0.0],
        [1.0, 0.0],
        [0.0, 1.0],
        [1.0, 1.0],
        [0.5, 0.5],
        [10.5, 0.5]
    ];

    let mut dbscan = DBSCAN::new(1.5, 5).unwrap();
    let labels = dbscan.fit_predict(&x).unwrap();

    assert!(labels[0] >= 0);
    assert!(labels[..5].iter().all(|&l| l == labels[0]));
    assert_eq!(labels[5], NOISE);
}

#[test]
fn scenario_c_all_missing_column_leaves_no_features() {
    let err = pipeline()
        .run_csv("Time,V1,Class\n0,,0\n1,,1\n2,,0\n".as_bytes())
        .unwrap_err();
    assert!(matches!(err, Error::NoFeatures { .. }));
}

#[test]
fn scenario_d_corrupt_file_is_malformed() {
    let ragged = pipeline().run_csv("V1,V2\n1,2\n3,4,5\n".as_bytes());
    assert!(matches!(ragged, Err(Error::MalformedInput(_))));

    let binary: &[u8] = &[0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0xff, 0x00];
    assert!(matches!(
        pipeline().run_csv(binary),
        Err(Error::MalformedInput(_))
    ));

    assert!(matches!(
        pipeline().run_csv("".as_bytes()),
        Err(Error::MalformedInput(_))
    ));
}

#[test]
fn partition_of_two_groups_and_outliers() {
    let output = pipeline().run_csv(upload().as_bytes()).unwrap();
    let labels = output.result.labels();

    let first: BTreeSet<usize> = (0..6).collect();
    let second: BTreeSet<usize> = (6..12).collect();
    let expected = BTreeSet::from([first, second]);
    assert_eq!(groups(labels), expected);
    assert_eq!(labels[12], NOISE);
    assert_eq!(labels[13], NOISE);

    assert_eq!(output.distribution.total(), 14);
    assert_eq!(output.distribution.count(NOISE), 2);
    assert_eq!(output.anomalies.anomalies, 2);
    assert!((output.anomalies.ratio - 2.0 / 14.0).abs() < 1e-12);
    assert_eq!(
        output.anomalies.to_string(),
        "Anomalies Detected: 2 out of 14 rows (14.29%)"
    );
}

#[test]
fn reordered_columns_align_by_name() {
    let scaler = Scaler::from_json(
        r#"{"kind": "standard", "feature_names": ["V1", "V2"], "mean": [0.0, 100.0], "scale": [1.0, 1.0]}"#,
    )
    .unwrap();
    let pipeline = Pipeline::new(Arc::new(scaler), PipelineConfig::default()).unwrap();

    let a = pipeline
        .run_csv("V1,V2\n0,100\n0.1,100\n0.2,100\n0.3,100\n0.4,100\n9,100\n".as_bytes())
        .unwrap();
    let b = pipeline
        .run_csv("V2,V1\n100,0\n100,0.1\n100,0.2\n100,0.3\n100,0.4\n100,9\n".as_bytes())
        .unwrap();

    assert_eq!(groups(a.result.labels()), groups(b.result.labels()));
    assert_eq!(a.result.labels()[5], NOISE);
    assert_eq!(b.result.columns(), vec!["V2", "V1", "Cluster"]);
}

#[test]
fn extra_column_is_a_feature_mismatch() {
    let err = pipeline()
        .run_csv("V1,V2,V3\n1,2,3\n".as_bytes())
        .unwrap_err();
    match err {
        Error::FeatureMismatch { unexpected, .. } => assert_eq!(unexpected, vec!["V3"]),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn rows_with_missing_values_are_not_exported() {
    let mut csv = upload();
    csv.push_str("102,,3,0\n");
    csv.push_str("103,4,NA,0\n");

    let output = pipeline().run_csv(csv.as_bytes()).unwrap();
    assert_eq!(output.result.n_rows(), 14);
}

#[test]
fn export_round_trip_through_file() {
    let output = pipeline().run_csv(upload().as_bytes()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dbscan_clustered_output.csv");
    output.result.write_csv(File::create(&path).unwrap()).unwrap();

    let parsed = ResultTable::from_csv_reader(File::open(&path).unwrap()).unwrap();
    assert_eq!(parsed.n_rows(), output.result.n_rows());
    assert_eq!(parsed.labels(), output.result.labels());
    assert_eq!(parsed.columns(), vec!["V1", "V2", "Cluster"]);
}

#[test]
fn projection_matches_result_rows() {
    let output = pipeline().run_csv(upload().as_bytes()).unwrap();
    assert_eq!(output.projection.points.len(), output.result.n_rows());

    let plot = output
        .projection
        .with_labels(output.result.labels())
        .unwrap();
    assert_eq!(plot.len(), 14);
}

#[test]
fn preview_is_taken_before_numeric_selection() {
    let output = pipeline()
        .run_csv("Time,V1,V2,Note\n0,1,1,a\n1,1,1,b\n2,1,1,c\n3,1,1,d\n4,1,1,e\n5,1,1,f\n".as_bytes())
        .unwrap();

    assert_eq!(output.columns, vec!["V1", "V2", "Note"]);
    assert_eq!(output.preview.n_rows(), 5);
    assert_eq!(output.preview.columns(), &["V1", "V2", "Note"]);
    assert_eq!(output.result.columns(), vec!["V1", "V2", "Cluster"]);
    assert_eq!(output.distribution.n_clusters(), 1);
}

#[test]
fn infinite_cells_fail_the_run() {
    let scaler = Scaler::standard(array![0.0, 0.0], array![1.0, 1.0]).unwrap();
    let pipeline = Pipeline::new(Arc::new(scaler), PipelineConfig::default()).unwrap();

    let err = pipeline
        .run_csv("V1,V2\n0,0\n0.1,0\n0,0.1\n0.1,0.1\n0.05,0.05\ninf,0\n".as_bytes())
        .unwrap_err();
    assert!(matches!(err, Error::MalformedInput(_)));
    assert!(err.is_user_error());
}

#[test]
fn reuploaded_export_keeps_one_cluster_column() {
    let first = pipeline().run_csv(upload().as_bytes()).unwrap();
    let exported = first.result.to_csv_bytes().unwrap();

    // The exported Cluster column is numeric, so it is scaled like any feature.
    let scaler = Scaler::standard(array![0.0, 0.0, 0.0], array![1.0, 1.0, 1.0]).unwrap();
    let pipeline = Pipeline::new(Arc::new(scaler), PipelineConfig::default()).unwrap();
    let second = pipeline.run_csv(exported.as_slice()).unwrap();
    assert_eq!(second.result.columns(), vec!["V1", "V2", "Cluster"]);

    let bytes = second.result.to_csv_bytes().unwrap();
    let parsed = ResultTable::from_csv_reader(bytes.as_slice()).unwrap();
    assert_eq!(parsed.labels(), second.result.labels());
    assert_eq!(parsed.columns(), vec!["V1", "V2", "Cluster"]);
}

#[test]
fn saved_export_round_trips() {
    let output = pipeline().run_csv(upload().as_bytes()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dbscan_clustered_output.csv");
    output.result.save(&path).unwrap();

    let parsed = ResultTable::from_csv_reader(File::open(&path).unwrap()).unwrap();
    assert_eq!(parsed, output.result);
}
