//! Tests for the geometry model over GeoJSON input.

use georef_geometry::{CrsVariant, GeoJson, GeometryError, GeometryKind};
use proptest::prelude::*;
use serde_json::{Value, json};

fn parse(value: Value) -> GeoJson {
    serde_json::from_value(value).unwrap()
}

#[test]
fn documents_parse_from_text() {
    let point: GeoJson = r#"{"type": "AnyCrsPoint", "coordinates": [1, 2]}"#.parse().unwrap();
    assert_eq!(point.variant(), CrsVariant::AnyCrs);
    assert_eq!(point.dimension(), 2);

    let error = "{\"type\":".parse::<GeoJson>().unwrap_err();
    assert!(matches!(error, GeometryError::Json(_)));
    let error = "[1, 2]".parse::<GeoJson>().unwrap_err();
    assert_eq!(error.to_string(), "geometry must be a JSON object, found array");
}

#[test]
fn point_bbox_repeats_the_point() {
    let mut point = parse(json!({"type": "Point", "coordinates": [4.5, 60.1]}));
    point.update_bbox();
    assert_eq!(point.bbox(), Some(&[4.5, 60.1, 4.5, 60.1][..]));
}

#[test]
fn multi_point_bbox() {
    let mut points = parse(json!({"type": "MultiPoint", "coordinates": [[0, 0], [2, 3]]}));
    assert!(points.is_valid());
    points.update_bbox();
    assert_eq!(points.bbox(), Some(&[0.0, 0.0, 2.0, 3.0][..]));
    assert_eq!(points.len(), 2);
}

#[test]
fn multi_polygon_bbox_uses_the_smallest_dimension() {
    let mut polygons = parse(json!({
        "type": "MultiPolygon",
        "coordinates": [
            [[[0, 0, 10], [4, 0, 10], [4, 4, 10], [0, 0, 10]]],
            [[[-1, 2], [1, 2], [1, 5], [-1, 2]]]
        ]
    }));
    assert!(polygons.is_valid());
    assert_eq!(polygons.dimension(), 2);
    polygons.update_bbox();
    assert_eq!(polygons.bbox(), Some(&[-1.0, 0.0, 4.0, 5.0][..]));
    assert_eq!(polygons.len(), 8);
}

#[test]
fn short_ring_makes_polygon_invalid() {
    let mut polygon = parse(json!({
        "type": "Polygon",
        "coordinates": [[[0, 0], [1, 0], [0, 0]]],
        "bbox": [0, 0, 1, 0]
    }));
    assert!(!polygon.is_valid());
    polygon.update_bbox();
    assert_eq!(polygon.bbox(), None);
}

#[test]
fn multi_line_string_needs_valid_lines() {
    let mut lines = parse(json!({"type": "MultiLineString", "coordinates": [[[0, 0], [1, 1]], []]}));
    assert!(!lines.is_valid());
    let mut empty = parse(json!({"type": "MultiLineString", "coordinates": []}));
    assert!(!empty.is_valid());
}

#[test]
fn geometry_collection_takes_minimum_child_dimension() {
    let mut collection = parse(json!({
        "type": "GeometryCollection",
        "geometries": [
            {"type": "Point", "coordinates": [1, 1, 1]},
            {"type": "LineString", "coordinates": [[0, 5], [3, 2]]}
        ]
    }));
    assert!(collection.is_valid());
    assert_eq!(collection.dimension(), 2);
    collection.update_bbox();
    assert_eq!(collection.bbox(), Some(&[0.0, 1.0, 3.0, 5.0][..]));
    assert_eq!(collection.len(), 3);

    let mut empty = parse(json!({"type": "GeometryCollection", "geometries": []}));
    assert!(empty.is_valid());
    assert_eq!(empty.dimension(), 3);
}

#[test]
fn foreign_members_survive_a_round_trip() {
    let input = json!({
        "type": "AnyCrsFeatureCollection",
        "persistableReferenceCrs": "{\"authCode\":{\"auth\":\"EPSG\",\"code\":\"23031\"}}",
        "features": [{
            "type": "AnyCrsFeature",
            "id": "well-1",
            "geometry": {"type": "AnyCrsPoint", "coordinates": [500000.0, 6500000.0]},
            "properties": {"name": "well-1"}
        }]
    });
    let collection = parse(input);
    assert_eq!(collection.variant(), CrsVariant::AnyCrs);
    assert_eq!(collection.kind(), GeometryKind::FeatureCollection);
    insta::assert_json_snapshot!(collection, @r#"
    {
      "type": "AnyCrsFeatureCollection",
      "features": [
        {
          "type": "AnyCrsFeature",
          "id": "well-1",
          "geometry": {
            "type": "AnyCrsPoint",
            "coordinates": [
              500000.0,
              6500000.0
            ]
          },
          "properties": {
            "name": "well-1"
          }
        }
      ],
      "persistableReferenceCrs": "{\"authCode\":{\"auth\":\"EPSG\",\"code\":\"23031\"}}"
    }
    "#);
}

#[test]
fn retagging_is_reversible() {
    let input = json!({
        "type": "GeometryCollection",
        "geometries": [
            {"type": "Point", "coordinates": [1, 2]},
            {"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]}
        ]
    });
    let original = parse(input);
    let any = original.clone().with_variant(CrsVariant::AnyCrs);
    let tags: Vec<String> = any.flatten().iter().map(|node| node.tag()).collect();
    assert_eq!(
        tags,
        ["AnyCrsGeometryCollection", "AnyCrsPoint", "AnyCrsPolygon"]
    );
    assert_eq!(any.with_variant(CrsVariant::GeoJson), original);
}

#[test]
fn replacing_coordinates_refreshes_the_caches() {
    let mut line = parse(json!({"type": "LineString", "coordinates": [[0, 0], [1, 1]]}));
    line.set_coordinates(&json!([[0, 0, 0], [5, -5, 2]])).unwrap();
    assert_eq!(line.dimension(), 3);
    assert_eq!(line.bbox(), Some(&[0.0, -5.0, 0.0, 5.0, 0.0, 2.0][..]));
    assert!(line.set_coordinates(&json!("nope")).is_err());
}

proptest! {
    #[test]
    fn bbox_contains_every_point(
        points in prop::collection::vec((-180.0f64..180.0, -90.0f64..90.0), 1..20)
    ) {
        let coordinates: Vec<Vec<f64>> = points.iter().map(|&(x, y)| vec![x, y]).collect();
        let mut geometry = GeoJson::multi_point(coordinates);
        geometry.update_bbox();
        let bbox = geometry.bbox().unwrap().to_vec();
        prop_assert_eq!(bbox.len(), 4);
        for (x, y) in points {
            prop_assert!(bbox[0] <= x && x <= bbox[2]);
            prop_assert!(bbox[1] <= y && y <= bbox[3]);
        }
    }
}
