//! GeoJSON geometry model for CRS conversion payloads.
//!
//! - **geojson**: the geometry tree with validity, dimension, bbox and
//!   CRS-variant retagging
//! - **crs**: request/response shapes of the CRS conversion service

pub mod crs;
pub mod error;
pub mod geojson;

pub use crs::{
    ConvertGeoJsonRequest, ConvertGeoJsonResponse, ConvertPointsRequest, ConvertPointsResponse,
    Point,
};
pub use error::{GeometryError, Result};
pub use geojson::{CrsVariant, Feature, GeoJson, GeometryKind, Position, Shape};
