/// Integration tests for the fare prediction pipeline
///
/// Run with: cargo test --test integration_tests -- --nocapture
use approx::assert_abs_diff_eq;
use fare_predictor::features::{TripDetails, FEATURE_NAMES, NUM_FEATURES};
use fare_predictor::pipeline::FarePipeline;
use std::fs;
use std::path::{Path, PathBuf};

fn shipped_artifacts() -> (PathBuf, PathBuf) {
    // cargo runs tests from the crate root, where the shipped artifacts live
    (
        PathBuf::from("artifacts/scaler.json"),
        PathBuf::from("artifacts/model.json"),
    )
}

fn trip_json(rate_code: u8, distance: f64) -> String {
    format!(
        r#"{{
            "rate_code": {rate_code},
            "pickup_longitude": -73.98,
            "pickup_latitude": 40.75,
            "dropoff_longitude": -73.98,
            "dropoff_latitude": 40.75,
            "passenger_count": 1,
            "trip_distance": {distance},
            "extra": 0.0,
            "improvement_surcharge": 0.3,
            "trip_type": 1,
            "pickup_date": "2015-01-01",
            "pickup_time": "00:00:00",
            "dropoff_date": "2015-01-01",
            "dropoff_time": "00:00:00"
        }}"#
    )
}

#[test]
fn test_shipped_artifacts_load_and_predict() {
    println!("\n=== Test: Shipped Artifacts ===");
    let (scaler_path, model_path) = shipped_artifacts();
    let pipeline = FarePipeline::load(&scaler_path, &model_path)
        .expect("shipped artifacts should load");

    let trip: TripDetails = serde_json::from_str(&trip_json(1, 1.0)).unwrap();
    let vector = trip.assemble().expect("valid trip should assemble");
    assert_eq!(vector.len(), NUM_FEATURES, "vector must have 20 elements");

    let fare = pipeline.predict(&vector).expect("prediction should succeed");
    println!("✓ short standard trip: ${:.2}", fare);

    // Hand-computed against the shipped artifacts:
    // scaled distance (1.0-2.7527)/2.8971 < 0 → tree0 leaf -3.2
    // scaled rate (1-1.0934)/0.5944 < 1.5    → tree1 leaf -0.4
    // tree2: distance < 1.2, extra < 0.5     → leaf -0.6
    // 12.0 - 3.2 - 0.4 - 0.6 = 7.8
    assert_abs_diff_eq!(fare, 7.8, epsilon = 1e-9);
    assert!(fare >= 0.0, "common-case fare should be non-negative");
}

#[test]
fn test_long_jfk_trip_reference_fare() {
    println!("\n=== Test: Long JFK Trip ===");
    let (scaler_path, model_path) = shipped_artifacts();
    let pipeline = FarePipeline::load(&scaler_path, &model_path).unwrap();

    let trip: TripDetails = serde_json::from_str(&trip_json(2, 12.0)).unwrap();
    let fare = pipeline.predict(&trip.assemble().unwrap()).unwrap();
    println!("✓ 12-mile JFK trip: ${:.2}", fare);

    // scaled distance 3.19 → tree0 6.8, tree2 3.1; scaled rate 1.53 → tree1 9.5
    // 12.0 + 6.8 + 9.5 + 3.1 = 31.4
    assert_abs_diff_eq!(fare, 31.4, epsilon = 1e-9);
}

#[test]
fn test_prediction_is_deterministic() {
    println!("\n=== Test: Determinism ===");
    let (scaler_path, model_path) = shipped_artifacts();
    let pipeline = FarePipeline::load(&scaler_path, &model_path).unwrap();

    let trip: TripDetails = serde_json::from_str(&trip_json(1, 3.7)).unwrap();
    let vector = trip.assemble().unwrap();

    let first = pipeline.predict(&vector).unwrap();
    for _ in 0..10 {
        let again = pipeline.predict(&vector).unwrap();
        assert_eq!(
            first.to_bits(),
            again.to_bits(),
            "identical inputs must give bit-identical output"
        );
    }
    println!("✓ 10 repeated predictions bit-identical");
}

#[test]
fn test_passenger_count_extremes_accepted() {
    println!("\n=== Test: Passenger Count Boundaries ===");
    let (scaler_path, model_path) = shipped_artifacts();
    let pipeline = FarePipeline::load(&scaler_path, &model_path).unwrap();

    for count in [1u8, 8u8] {
        let mut trip: TripDetails = serde_json::from_str(&trip_json(1, 1.0)).unwrap();
        trip.passenger_count = count;
        let fare = pipeline.predict(&trip.assemble().unwrap()).unwrap();
        println!("✓ {} passengers → ${:.2}", count, fare);
        assert!(fare.is_finite());
    }
}

#[test]
fn test_scenario_vector_layout() {
    println!("\n=== Test: Scenario Vector Layout ===");
    let trip: TripDetails = serde_json::from_str(&trip_json(1, 1.0)).unwrap();
    let vector = trip.assemble().unwrap();

    // 2015-01-01 was a Thursday: day=1, h=m=s=0, weekday=3
    let expected = [
        1.0, -73.98, 40.75, -73.98, 40.75, 1.0, 1.0, 0.0, 0.3, 1.0, //
        1.0, 0.0, 0.0, 0.0, 3.0, //
        1.0, 0.0, 0.0, 0.0, 3.0,
    ];
    assert_eq!(vector, expected);
    assert_eq!(
        vector[10..15],
        vector[15..20],
        "same instant must give identical pickup/dropoff quintuples"
    );
    println!("✓ all {} positions match the fitted order", FEATURE_NAMES.len());
}

#[test]
fn test_missing_artifact_fails_startup() {
    println!("\n=== Test: Missing Artifact ===");
    let result = FarePipeline::load(
        Path::new("/nonexistent/scaler.json"),
        Path::new("/nonexistent/model.json"),
    );
    assert!(result.is_err(), "missing artifacts must abort startup");
    println!("✓ load error: {:#}", result.unwrap_err());
}

#[test]
fn test_corrupt_artifact_fails_startup() {
    println!("\n=== Test: Corrupt Artifact ===");
    let dir = tempfile::tempdir().unwrap();
    let scaler_path = dir.path().join("scaler.json");
    let (_, model_path) = shipped_artifacts();

    fs::write(&scaler_path, "{ not json").unwrap();
    let result = FarePipeline::load(&scaler_path, &model_path);
    assert!(result.is_err(), "corrupt scaler must abort startup");
    println!("✓ load error: {:#}", result.unwrap_err());
}

#[test]
fn test_width_mismatched_artifacts_rejected() {
    println!("\n=== Test: Width Mismatch ===");
    let dir = tempfile::tempdir().unwrap();
    let scaler_path = dir.path().join("scaler.json");
    let (_, model_path) = shipped_artifacts();

    // A 5-feature scaler cannot serve the 20-feature contract.
    fs::write(
        &scaler_path,
        r#"{ "mean": [0,0,0,0,0], "scale": [1,1,1,1,1] }"#,
    )
    .unwrap();
    let result = FarePipeline::load(&scaler_path, &model_path);
    assert!(result.is_err(), "scaler width mismatch must abort startup");
    println!("✓ load error: {:#}", result.unwrap_err());
}

#[test]
fn test_fare_formats_to_two_decimals() {
    println!("\n=== Test: Fare Formatting ===");
    let (scaler_path, model_path) = shipped_artifacts();
    let pipeline = FarePipeline::load(&scaler_path, &model_path).unwrap();

    let trip: TripDetails = serde_json::from_str(&trip_json(1, 1.0)).unwrap();
    let fare = pipeline.predict(&trip.assemble().unwrap()).unwrap();
    let formatted = format!("{:.2}", fare);
    assert_eq!(formatted, "7.80");
    println!("✓ formatted: ${}", formatted);
}
