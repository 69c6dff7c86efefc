//! Request and response shapes exchanged with the CRS conversion service.
//!
//! The reprojection itself happens remotely; these types only carry points
//! and feature collections across that boundary.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GeometryError, Result};
use crate::geojson::{CrsVariant, GeoJson, GeometryKind};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Point {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvertPointsRequest {
    #[serde(rename = "fromCRS")]
    pub from_crs: String,
    #[serde(rename = "toCRS")]
    pub to_crs: String,
    pub points: Vec<Point>,
}

impl ConvertPointsRequest {
    pub fn new(from_crs: impl Into<String>, to_crs: impl Into<String>, points: Vec<Point>) -> Self {
        Self {
            from_crs: from_crs.into(),
            to_crs: to_crs.into(),
            points,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertPointsResponse {
    pub points: Vec<Point>,
    #[serde(default)]
    pub operations_applied: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertGeoJsonRequest {
    pub feature_collection: GeoJson,
    #[serde(rename = "toCRS")]
    pub to_crs: String,
    #[serde(rename = "toUnitZ", default, skip_serializing_if = "Option::is_none")]
    pub to_unit_z: Option<String>,
}

impl ConvertGeoJsonRequest {
    /// Wrap a feature collection for conversion, tagging every node `AnyCrs`.
    pub fn new(
        mut feature_collection: GeoJson,
        to_crs: impl Into<String>,
        to_unit_z: Option<String>,
    ) -> Result<Self> {
        let found = feature_collection.kind();
        if found != GeometryKind::FeatureCollection {
            return Err(GeometryError::UnexpectedKind {
                expected: GeometryKind::FeatureCollection,
                found,
            });
        }
        if !feature_collection.is_valid() {
            return Err(GeometryError::Invalid(found));
        }
        feature_collection.set_variant(CrsVariant::AnyCrs);
        let to_crs = to_crs.into();
        debug!(
            tuples = feature_collection.len(),
            dimension = feature_collection.dimension(),
            to_crs = %to_crs,
            "Prepared feature collection for conversion"
        );
        Ok(Self {
            feature_collection,
            to_crs,
            to_unit_z,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertGeoJsonResponse {
    pub feature_collection: GeoJson,
    #[serde(default)]
    pub operations_applied: Vec<String>,
}

impl ConvertGeoJsonResponse {
    /// The converted collection, retagged as canonical GeoJSON.
    pub fn into_geojson(self) -> GeoJson {
        self.feature_collection.with_variant(CrsVariant::GeoJson)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn collection() -> GeoJson {
        GeoJson::from_value(&json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [500000.0, 6500000.0]},
                "properties": {"name": "well-1"}
            }]
        }))
        .unwrap()
    }

    #[test]
    fn points_use_wire_names() {
        let request = ConvertPointsRequest::new("EPSG:23031", "EPSG:4326", vec![Point::new(1.0, 2.0, 0.0)]);
        insta::assert_json_snapshot!(request, @r#"
        {
          "fromCRS": "EPSG:23031",
          "toCRS": "EPSG:4326",
          "points": [
            {
              "x": 1.0,
              "y": 2.0,
              "z": 0.0
            }
          ]
        }
        "#);
    }

    #[test]
    fn missing_z_defaults_to_zero() {
        let response: ConvertPointsResponse =
            serde_json::from_value(json!({"points": [{"x": 1, "y": 2}]})).unwrap();
        assert_eq!(response.points, [Point::new(1.0, 2.0, 0.0)]);
        assert!(response.operations_applied.is_empty());
    }

    #[test]
    fn request_tags_collection_any_crs() {
        let request = ConvertGeoJsonRequest::new(collection(), "EPSG:4326", None).unwrap();
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["featureCollection"]["type"], "AnyCrsFeatureCollection");
        assert_eq!(
            value["featureCollection"]["features"][0]["geometry"]["type"],
            "AnyCrsPoint"
        );
        assert_eq!(value["toCRS"], "EPSG:4326");
        assert!(value.get("toUnitZ").is_none());
    }

    #[test]
    fn request_rejects_other_kinds() {
        let point = GeoJson::point(vec![1.0, 2.0]);
        assert!(matches!(
            ConvertGeoJsonRequest::new(point, "EPSG:4326", None),
            Err(GeometryError::UnexpectedKind { .. })
        ));
        let broken = GeoJson::feature_collection(vec![GeoJson::feature(None, json!({}))]);
        assert!(matches!(
            ConvertGeoJsonRequest::new(broken, "EPSG:4326", None),
            Err(GeometryError::Invalid(GeometryKind::FeatureCollection))
        ));
    }

    #[test]
    fn response_retags_to_geojson() {
        let response: ConvertGeoJsonResponse = serde_json::from_value(json!({
            "featureCollection": {
                "type": "AnyCrsFeatureCollection",
                "features": [{
                    "type": "AnyCrsFeature",
                    "geometry": {"type": "AnyCrsPoint", "coordinates": [2.9, 58.6]},
                    "properties": {}
                }]
            },
            "operationsApplied": ["conversion from ED50 / UTM zone 31N to GCS ED50"]
        }))
        .unwrap();
        assert_eq!(response.operations_applied.len(), 1);
        let collection = response.into_geojson();
        assert!(
            collection
                .flatten()
                .iter()
                .all(|node| node.variant() == CrsVariant::GeoJson)
        );
    }
}
