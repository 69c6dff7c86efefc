//! Tests for unit normalization.

use georef_model::{ConversionRecord, ConversionStatus};
use georef_normalization::convert_units;
use proptest::prelude::*;
use serde_json::{Value, json};

const FEET: &str = r#"{"scaleOffset":{"scale":0.3048,"offset":0.0},"symbol":"ft","baseMeasurement":{"ancestry":"Length","type":"UM"},"type":"USO"}"#;
const METER: &str = r#"{"baseMeasurement":{"ancestry":"Length","type":"UM"},"scaleOffset":{"offset":0.0,"scale":1.0},"symbol":"m","type":"USO"}"#;

fn unit_meta(names: Value, reference: Value) -> Value {
    json!({"kind": "unit", "name": "ft", "propertyNames": names, "persistableReference": reference})
}

fn convert(record: Value) -> ConversionRecord {
    let mut record = ConversionRecord::new(record);
    convert_units(&mut record);
    record
}

fn assert_close(actual: &Value, expected: f64) {
    let actual = actual.as_f64().expect("numeric value");
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn feet_are_converted_to_meters() {
    let record = convert(json!({
        "meta": [{"kind": "unit", "propertyNames": ["MD"], "persistableReference": FEET}],
        "data": {"MD": 10}
    }));
    assert_eq!(record.status(), ConversionStatus::Success);
    assert!(record.messages().is_empty());
    assert_close(&record.record()["data"]["MD"], 3.048);
    assert_eq!(record.record()["meta"][0]["persistableReference"], METER);
    assert_eq!(record.record()["meta"][0]["name"], "m");
}

#[test]
fn object_reference_is_accepted() {
    let reference: Value = serde_json::from_str(FEET).unwrap();
    let record = convert(json!({
        "meta": [unit_meta(json!(["MD"]), reference)],
        "data": {"MD": 100}
    }));
    assert_eq!(record.status(), ConversionStatus::Success);
    assert_close(&record.record()["data"]["MD"], 30.48);
    assert_eq!(record.record()["meta"][0]["persistableReference"], METER);
}

#[test]
fn missing_meta_is_no_frame_of_reference() {
    let input = json!({"id": "w1", "data": {"MD": 10}});
    let record = convert(input.clone());
    assert_eq!(record.status(), ConversionStatus::NoFrameOfReference);
    assert!(record.messages().is_empty());
    assert_eq!(record.record(), &input);
}

#[test]
fn missing_reference_leaves_record_unmodified() {
    let input = json!({
        "data": {"MD": 10},
        "meta": [{"kind": "unit", "propertyNames": ["MD"]}]
    });
    let record = convert(input.clone());
    assert_eq!(record.status(), ConversionStatus::Error);
    assert_eq!(
        record.messages(),
        ["Unit conversion: persistable reference missing"]
    );
    assert_eq!(record.record(), &input);
}

#[test]
fn property_names_are_validated() {
    let missing = convert(json!({
        "data": {"MD": 10},
        "meta": [{"kind": "unit", "persistableReference": FEET}]
    }));
    assert_eq!(missing.messages(), ["Unit conversion: property names missing"]);

    let illegal = convert(json!({
        "data": {"MD": 10},
        "meta": [unit_meta(json!("MD"), json!(FEET))]
    }));
    assert_eq!(
        illegal.messages(),
        ["Unit conversion: illegal value for property names"]
    );
    assert_eq!(illegal.status(), ConversionStatus::Error);
}

#[test]
fn invalid_reference_is_reported() {
    let record = convert(json!({
        "data": {"MD": 10},
        "meta": [unit_meta(json!(["MD"]), json!("{not json"))]
    }));
    assert_eq!(record.status(), ConversionStatus::Error);
    assert_eq!(record.messages().len(), 1);
    assert!(
        record.messages()[0]
            .starts_with("Unit conversion: persistable reference not valid: invalid JSON")
    );
    assert_eq!(record.record()["data"]["MD"], 10);
}

#[test]
fn date_reference_on_unit_entry_is_invalid() {
    let record = convert(json!({
        "data": {"MD": 10},
        "meta": [unit_meta(json!(["MD"]), json!({"type": "DAT", "format": "yyyy-MM-dd"}))]
    }));
    insta::assert_snapshot!(
        record.messages().join("\n"),
        @"Unit conversion: persistable reference not valid: expected a unit reference, found type 'DAT'"
    );
}

#[test]
fn first_illegal_value_stops_the_entry() {
    let record = convert(json!({
        "data": {"A": 1, "B": "deep", "C": 2},
        "meta": [unit_meta(json!(["A", "B", "C"]), json!(FEET))]
    }));
    assert_eq!(record.status(), ConversionStatus::Error);
    assert_eq!(
        record.messages(),
        ["Unit conversion: illegal value for property B"]
    );
    assert_close(&record.record()["data"]["A"], 0.3048);
    assert_eq!(record.record()["data"]["C"], 2);
    assert_eq!(record.record()["meta"][0]["persistableReference"], FEET);
    assert_eq!(record.record()["meta"][0]["name"], "ft");
}

#[test]
fn missing_property_does_not_stop_the_entry() {
    let record = convert(json!({
        "data": {"MD": 10, "Nothing": null, "TVD": 20},
        "meta": [unit_meta(json!(["MD", "Absent", "Nothing", "TVD"]), json!(FEET))]
    }));
    assert_eq!(record.status(), ConversionStatus::Error);
    assert_eq!(
        record.messages(),
        [
            "Unit conversion: property Absent missing",
            "Unit conversion: property Nothing missing"
        ]
    );
    assert_close(&record.record()["data"]["MD"], 3.048);
    assert_close(&record.record()["data"]["TVD"], 6.096);
    assert_eq!(record.record()["meta"][0]["name"], "m");
}

#[test]
fn nothing_converted_keeps_meta() {
    let record = convert(json!({
        "data": {},
        "meta": [unit_meta(json!(["MD"]), json!(FEET))]
    }));
    assert_eq!(record.messages(), ["Unit conversion: property MD missing"]);
    assert_eq!(record.record()["meta"][0]["persistableReference"], FEET);
}

#[test]
fn later_failure_keeps_earlier_conversion() {
    let record = convert(json!({
        "data": {"MD": 10, "Elevation": [1, 2]},
        "meta": [
            unit_meta(json!(["MD"]), json!(FEET)),
            unit_meta(json!(["Elevation"]), json!(FEET))
        ]
    }));
    assert_eq!(record.status(), ConversionStatus::Error);
    assert_close(&record.record()["data"]["MD"], 3.048);
    assert_eq!(record.record()["meta"][0]["name"], "m");
    assert_eq!(record.record()["meta"][1]["name"], "ft");
    assert_eq!(record.record()["data"]["Elevation"], json!([1, 2]));
}

#[test]
fn nested_and_fanned_out_paths() {
    let record = convert(json!({
        "data": {
            "Markers": [
                {"Name": "Top", "MD": 100},
                {"Name": "Base", "MD": 200}
            ],
            "Datum": {"Elevation": {"Value": 50, "Kind": "KB"}}
        },
        "meta": [unit_meta(json!(["Markers.MD", "Datum.Elevation.Value"]), json!(FEET))]
    }));
    assert_eq!(record.status(), ConversionStatus::Success);
    let data = &record.record()["data"];
    assert_close(&data["Markers"][0]["MD"], 30.48);
    assert_close(&data["Markers"][1]["MD"], 60.96);
    assert_eq!(data["Markers"][1]["Name"], "Base");
    assert_close(&data["Datum"]["Elevation"]["Value"], 15.24);
    assert_eq!(data["Datum"]["Elevation"]["Kind"], "KB");
}

#[test]
fn indexed_path_touches_one_element() {
    let record = convert(json!({
        "data": {"Markers": [{"MD": 100}, {"MD": 200}]},
        "meta": [unit_meta(json!(["Markers[1].MD"]), json!(FEET))]
    }));
    assert_eq!(record.record()["data"]["Markers"][0]["MD"], 100);
    assert_close(&record.record()["data"]["Markers"][1]["MD"], 60.96);
}

#[test]
fn unnamed_properties_are_untouched() {
    let record = convert(json!({
        "data": {"MD": 10, "TVD": 10, "Name": "well"},
        "meta": [unit_meta(json!(["MD"]), json!(FEET))]
    }));
    let data = &record.record()["data"];
    assert_eq!(data["TVD"], 10);
    assert_eq!(data["Name"], "well");
    let keys: Vec<&String> = data.as_object().unwrap().keys().collect();
    assert_eq!(keys, ["MD", "TVD", "Name"]);
}

proptest! {
    #[test]
    fn scale_offset_conversion_is_linear(
        value in -1.0e6f64..1.0e6,
        scale in 0.001f64..1000.0,
        offset in -1000.0f64..1000.0,
    ) {
        let reference = json!({
            "scaleOffset": {"scale": scale, "offset": offset},
            "symbol": "x",
            "baseSymbol": "m",
            "type": "USO"
        });
        let record = convert(json!({
            "data": {"V": value},
            "meta": [unit_meta(json!(["V"]), reference)]
        }));
        prop_assert_eq!(record.status(), ConversionStatus::Success);
        let converted = record.record()["data"]["V"].as_f64().unwrap();
        let expected = scale * (value - offset);
        prop_assert!((converted - expected).abs() <= 1e-9 * expected.abs().max(1.0));
        prop_assert_eq!(&record.record()["meta"][0]["name"], "m");
    }
}
