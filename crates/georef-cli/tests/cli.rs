//! Integration tests for the CLI library components.

use std::fs;
use std::path::PathBuf;

use georef_cli::input::{parse_records, read_geojson, read_records, write_json};
use georef_cli::report::{InspectReport, RecordRow};
use georef_geometry::GeoJson;
use georef_model::{ConversionRecord, ConversionStatus};
use serde_json::json;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("georef-cli-{}-{name}", std::process::id()))
}

#[test]
fn array_and_single_object_inputs() {
    let records = parse_records(r#"[{"id": "a"}, {"id": "b"}]"#).unwrap();
    assert_eq!(records.len(), 2);
    let records = parse_records(r#"{"id": "a", "data": {}}"#).unwrap();
    assert_eq!(records, [json!({"id": "a", "data": {}})]);
}

#[test]
fn scalar_input_is_rejected() {
    let error = parse_records("42").unwrap_err();
    assert_eq!(
        error.to_string(),
        "expected a JSON array or object of records, found number"
    );
    assert!(parse_records("[{").is_err());
}

#[test]
fn records_round_trip_through_files() {
    let path = temp_path("records.json");
    let records = vec![json!({"id": "w1", "data": {"MD": 10}})];
    write_json(&records, Some(&path)).unwrap();
    assert_eq!(read_records(&path).unwrap(), records);
    fs::remove_file(&path).unwrap();
}

#[test]
fn missing_file_names_the_path() {
    let path = temp_path("missing.json");
    let error = read_records(&path).unwrap_err();
    assert!(error.to_string().contains("missing.json"));
}

#[test]
fn record_rows_fall_back_to_position() {
    let mut record = ConversionRecord::new(json!({"data": {}}));
    record.add_error("Unit conversion: property MD missing");
    let row = RecordRow::from_record(3, &record);
    assert_eq!(row.label, "#3");
    assert_eq!(row.status, ConversionStatus::Error);

    let named = ConversionRecord::new(json!({"id": "w1"}));
    assert_eq!(RecordRow::from_record(0, &named).label, "w1");
}

#[test]
fn inspect_report_describes_the_document() {
    let geojson = GeoJson::from_value(&json!({
        "type": "AnyCrsFeatureCollection",
        "bbox": [0, 0, 0, 0],
        "features": [
            {
                "type": "AnyCrsFeature",
                "geometry": {"type": "AnyCrsPoint", "coordinates": [1, 2, 3]},
                "properties": {}
            },
            {
                "type": "AnyCrsFeature",
                "geometry": {"type": "AnyCrsLineString", "coordinates": [[-1, 0], [4, 5]]},
                "properties": {}
            }
        ]
    }))
    .unwrap();
    let report = InspectReport::from_geojson(&geojson);
    insta::assert_json_snapshot!(report, @r#"
    {
      "tag": "AnyCrsFeatureCollection",
      "valid": true,
      "dimension": 2,
      "tuples": 3,
      "bbox": [
        -1.0,
        0.0,
        4.0,
        5.0
      ],
      "nodes": {
        "AnyCrsFeature": 2,
        "AnyCrsFeatureCollection": 1,
        "AnyCrsLineString": 1,
        "AnyCrsPoint": 1
      }
    }
    "#);
    assert_eq!(geojson.bbox(), Some(&[0.0, 0.0, 0.0, 0.0][..]));
}

#[test]
fn geojson_files_are_loaded() {
    let path = temp_path("point.geojson");
    fs::write(&path, r#"{"type": "Point", "coordinates": [4.5, 60.1]}"#).unwrap();
    let geojson = read_geojson(&path).unwrap();
    assert_eq!(geojson.tag(), "Point");
    assert_eq!(geojson.dimension(), 2);
    fs::remove_file(&path).unwrap();
}
