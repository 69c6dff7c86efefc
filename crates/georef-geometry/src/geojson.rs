//! GeoJSON geometry tree.
//!
//! Every node is one of nine shapes and carries a CRS variant: canonical
//! GeoJSON (`"Point"`) or the not-yet-reprojected form whose type tag has the
//! `AnyCrs` prefix (`"AnyCrsPoint"`). The variant is stored once per node and
//! the tag is always derived from it, so the two can never disagree.
//!
//! `dimension` and `bbox` are caches over the coordinates. Coordinates are
//! only replaced through setters that refresh both.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use georef_model::error::json_type_name;

use crate::error::GeometryError;

pub const ANY_CRS_PREFIX: &str = "AnyCrs";

/// Dimension reported when no position was examined.
pub const DEFAULT_DIMENSION: usize = 3;
const MIN_COMPONENTS: usize = 2;
const MIN_RING_POSITIONS: usize = 4;

const TYPE_FIELD: &str = "type";
const BBOX_FIELD: &str = "bbox";
const COORDINATES_FIELD: &str = "coordinates";
const GEOMETRIES_FIELD: &str = "geometries";
const GEOMETRY_FIELD: &str = "geometry";
const PROPERTIES_FIELD: &str = "properties";
const ID_FIELD: &str = "id";
const FEATURES_FIELD: &str = "features";

pub type Position = Vec<f64>;

type Parsed<T> = std::result::Result<T, String>;

/// Which coordinate reference a geometry is tagged with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CrsVariant {
    /// Standard GeoJSON (WGS 84).
    #[default]
    GeoJson,
    /// Any CRS, awaiting reprojection.
    AnyCrs,
}

impl CrsVariant {
    pub fn prefix(self) -> &'static str {
        match self {
            Self::GeoJson => "",
            Self::AnyCrs => ANY_CRS_PREFIX,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Point,
    MultiPoint,
    LineString,
    MultiLineString,
    Polygon,
    MultiPolygon,
    GeometryCollection,
    Feature,
    FeatureCollection,
}

impl GeometryKind {
    pub const ALL: [Self; 9] = [
        Self::Point,
        Self::MultiPoint,
        Self::LineString,
        Self::MultiLineString,
        Self::Polygon,
        Self::MultiPolygon,
        Self::GeometryCollection,
        Self::Feature,
        Self::FeatureCollection,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Point => "Point",
            Self::MultiPoint => "MultiPoint",
            Self::LineString => "LineString",
            Self::MultiLineString => "MultiLineString",
            Self::Polygon => "Polygon",
            Self::MultiPolygon => "MultiPolygon",
            Self::GeometryCollection => "GeometryCollection",
            Self::Feature => "Feature",
            Self::FeatureCollection => "FeatureCollection",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    /// Whether this kind holds a `coordinates` member.
    pub fn has_coordinates(self) -> bool {
        !matches!(
            self,
            Self::GeometryCollection | Self::Feature | Self::FeatureCollection
        )
    }

    fn reserved_fields(self) -> &'static [&'static str] {
        match self {
            Self::GeometryCollection => &[TYPE_FIELD, BBOX_FIELD, GEOMETRIES_FIELD],
            Self::Feature => &[
                TYPE_FIELD,
                BBOX_FIELD,
                GEOMETRY_FIELD,
                PROPERTIES_FIELD,
                ID_FIELD,
            ],
            Self::FeatureCollection => &[TYPE_FIELD, BBOX_FIELD, FEATURES_FIELD],
            _ => &[TYPE_FIELD, BBOX_FIELD, COORDINATES_FIELD],
        }
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Split a type tag into its kind and CRS variant.
pub fn parse_tag(tag: &str) -> Option<(GeometryKind, CrsVariant)> {
    match tag.strip_prefix(ANY_CRS_PREFIX) {
        Some(kind) => GeometryKind::from_name(kind).map(|kind| (kind, CrsVariant::AnyCrs)),
        None => GeometryKind::from_name(tag).map(|kind| (kind, CrsVariant::GeoJson)),
    }
}

pub fn type_tag(kind: GeometryKind, variant: CrsVariant) -> String {
    format!("{}{}", variant.prefix(), kind.as_str())
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub geometry: Option<Box<GeoJson>>,
    pub properties: Value,
    pub id: Option<Value>,
}

/// Shape-specific content of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Point(Position),
    MultiPoint(Vec<Position>),
    LineString(Vec<Position>),
    MultiLineString(Vec<Vec<Position>>),
    Polygon(Vec<Vec<Position>>),
    MultiPolygon(Vec<Vec<Vec<Position>>>),
    GeometryCollection(Vec<GeoJson>),
    Feature(Feature),
    FeatureCollection(Vec<GeoJson>),
}

impl Shape {
    pub fn kind(&self) -> GeometryKind {
        match self {
            Self::Point(_) => GeometryKind::Point,
            Self::MultiPoint(_) => GeometryKind::MultiPoint,
            Self::LineString(_) => GeometryKind::LineString,
            Self::MultiLineString(_) => GeometryKind::MultiLineString,
            Self::Polygon(_) => GeometryKind::Polygon,
            Self::MultiPolygon(_) => GeometryKind::MultiPolygon,
            Self::GeometryCollection(_) => GeometryKind::GeometryCollection,
            Self::Feature(_) => GeometryKind::Feature,
            Self::FeatureCollection(_) => GeometryKind::FeatureCollection,
        }
    }
}

/// One node of a GeoJSON tree.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoJson {
    variant: CrsVariant,
    shape: Shape,
    dimension: usize,
    bbox: Option<Vec<f64>>,
    /// Foreign members, written back unchanged.
    members: Map<String, Value>,
}

impl GeoJson {
    pub fn new(shape: Shape) -> Self {
        let mut node = Self {
            variant: CrsVariant::GeoJson,
            shape,
            dimension: DEFAULT_DIMENSION,
            bbox: None,
            members: Map::new(),
        };
        node.is_valid();
        node
    }

    pub fn point(position: Position) -> Self {
        Self::new(Shape::Point(position))
    }

    pub fn multi_point(points: Vec<Position>) -> Self {
        Self::new(Shape::MultiPoint(points))
    }

    pub fn line_string(points: Vec<Position>) -> Self {
        Self::new(Shape::LineString(points))
    }

    pub fn polygon(rings: Vec<Vec<Position>>) -> Self {
        Self::new(Shape::Polygon(rings))
    }

    pub fn feature(geometry: Option<GeoJson>, properties: Value) -> Self {
        Self::new(Shape::Feature(Feature {
            geometry: geometry.map(Box::new),
            properties,
            id: None,
        }))
    }

    pub fn feature_collection(features: Vec<GeoJson>) -> Self {
        Self::new(Shape::FeatureCollection(features))
    }

    #[must_use]
    pub fn with_variant(mut self, variant: CrsVariant) -> Self {
        self.set_variant(variant);
        self
    }

    pub fn kind(&self) -> GeometryKind {
        self.shape.kind()
    }

    pub fn variant(&self) -> CrsVariant {
        self.variant
    }

    /// The `type` string written to the wire.
    pub fn tag(&self) -> String {
        type_tag(self.kind(), self.variant)
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Coordinate tuple width as of the last validity check.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn bbox(&self) -> Option<&[f64]> {
        self.bbox.as_deref()
    }

    /// Check the shape rules and refresh `dimension` on this node and every
    /// node below it.
    pub fn is_valid(&mut self) -> bool {
        self.measure().is_some()
    }

    fn measure(&mut self) -> Option<usize> {
        let dimension = match &mut self.shape {
            Shape::Point(position) => position_dimension(position),
            Shape::MultiPoint(points) | Shape::LineString(points) => points_dimension(points),
            Shape::MultiLineString(lines) => {
                if lines.is_empty() {
                    None
                } else {
                    lines.iter().try_fold(usize::MAX, |min, line| {
                        points_dimension(line).map(|d| min.min(d))
                    })
                }
            }
            Shape::Polygon(rings) => rings_dimension(rings.iter()),
            Shape::MultiPolygon(polygons) => rings_dimension(polygons.iter().flatten()),
            Shape::GeometryCollection(children) | Shape::FeatureCollection(children) => {
                children_dimension(children)
            }
            Shape::Feature(feature) => feature.geometry.as_mut().and_then(|g| g.measure()),
        };
        if let Some(dimension) = dimension {
            self.dimension = dimension;
        }
        dimension
    }

    /// Recompute the bounding box from the coordinates.
    ///
    /// A feature collection is only recomputed when it already carries a
    /// bbox. Invalid geometries lose their bbox.
    pub fn update_bbox(&mut self) {
        if self.kind() == GeometryKind::FeatureCollection && self.bbox.is_none() {
            return;
        }
        let Some(dimension) = self.measure() else {
            self.bbox = None;
            return;
        };
        self.bbox = match &mut self.shape {
            Shape::Point(position) => positions_extent([&*position], dimension),
            Shape::MultiPoint(points) | Shape::LineString(points) => {
                positions_extent(points.iter(), dimension)
            }
            Shape::MultiLineString(lines) | Shape::Polygon(lines) => {
                positions_extent(lines.iter().flatten(), dimension)
            }
            Shape::MultiPolygon(polygons) => {
                positions_extent(polygons.iter().flatten().flatten(), dimension)
            }
            Shape::GeometryCollection(children) | Shape::FeatureCollection(children) => {
                for child in children.iter_mut() {
                    child.update_bbox();
                }
                boxes_extent(children.iter().filter_map(|c| c.bbox()), dimension)
            }
            Shape::Feature(feature) => feature.geometry.as_mut().and_then(|geometry| {
                geometry.update_bbox();
                geometry.bbox.clone()
            }),
        };
    }

    /// Number of coordinate tuples in this tree.
    pub fn len(&self) -> usize {
        match &self.shape {
            Shape::Point(position) => usize::from(position_dimension(position).is_some()),
            Shape::MultiPoint(points) | Shape::LineString(points) => points.len(),
            Shape::MultiLineString(lines) | Shape::Polygon(lines) => {
                lines.iter().map(Vec::len).sum()
            }
            Shape::MultiPolygon(polygons) => polygons.iter().flatten().map(Vec::len).sum(),
            Shape::GeometryCollection(children) | Shape::FeatureCollection(children) => {
                children.iter().map(GeoJson::len).sum()
            }
            Shape::Feature(feature) => feature.geometry.as_ref().map_or(0, |g| g.len()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Retag this node and every node below it.
    pub fn set_variant(&mut self, variant: CrsVariant) {
        self.visit_mut(&mut |node| node.variant = variant);
    }

    /// This node followed by every node below it, depth first.
    pub fn flatten(&self) -> Vec<&GeoJson> {
        let mut nodes = Vec::new();
        self.collect(&mut nodes);
        nodes
    }

    fn collect<'a>(&'a self, nodes: &mut Vec<&'a GeoJson>) {
        nodes.push(self);
        for child in self.children() {
            child.collect(nodes);
        }
    }

    fn visit_mut<F: FnMut(&mut GeoJson)>(&mut self, visit: &mut F) {
        visit(self);
        for child in self.children_mut() {
            child.visit_mut(visit);
        }
    }

    pub fn children(&self) -> &[GeoJson] {
        match &self.shape {
            Shape::GeometryCollection(children) | Shape::FeatureCollection(children) => children,
            Shape::Feature(feature) => match feature.geometry.as_deref() {
                Some(geometry) => std::slice::from_ref(geometry),
                None => &[],
            },
            _ => &[],
        }
    }

    fn children_mut(&mut self) -> &mut [GeoJson] {
        match &mut self.shape {
            Shape::GeometryCollection(children) | Shape::FeatureCollection(children) => children,
            Shape::Feature(feature) => match feature.geometry.as_deref_mut() {
                Some(geometry) => std::slice::from_mut(geometry),
                None => &mut [],
            },
            _ => &mut [],
        }
    }

    /// Replace the coordinates of a coordinate-bearing node.
    pub fn set_coordinates(&mut self, coordinates: &Value) -> Result<(), GeometryError> {
        self.shape = shape_from_coordinates(self.kind(), coordinates)?;
        self.refresh();
        Ok(())
    }

    pub fn set_point(&mut self, position: Position) -> Result<(), GeometryError> {
        match &mut self.shape {
            Shape::Point(current) => *current = position,
            other => {
                return Err(GeometryError::UnexpectedKind {
                    expected: GeometryKind::Point,
                    found: other.kind(),
                });
            }
        }
        self.refresh();
        Ok(())
    }

    /// Replace the geometry of a feature.
    pub fn set_geometry(&mut self, geometry: Option<GeoJson>) -> Result<(), GeometryError> {
        match &mut self.shape {
            Shape::Feature(feature) => feature.geometry = geometry.map(Box::new),
            other => {
                return Err(GeometryError::UnexpectedKind {
                    expected: GeometryKind::Feature,
                    found: other.kind(),
                });
            }
        }
        self.refresh();
        Ok(())
    }

    fn refresh(&mut self) {
        self.is_valid();
        self.update_bbox();
    }

    /// Build a tree from its JSON form. `dimension` is computed; `bbox` is
    /// kept as written.
    pub fn from_value(value: &Value) -> Result<Self, GeometryError> {
        let mut node = Self::parse(value)?;
        node.is_valid();
        Ok(node)
    }

    fn parse(value: &Value) -> Result<Self, GeometryError> {
        let object = value
            .as_object()
            .ok_or_else(|| GeometryError::NotAnObject(json_type_name(value)))?;
        let tag = match object.get(TYPE_FIELD) {
            Some(Value::String(tag)) => tag,
            Some(other) => return Err(GeometryError::UnknownType(other.to_string())),
            None => return Err(GeometryError::MissingField(TYPE_FIELD)),
        };
        let (kind, variant) =
            parse_tag(tag).ok_or_else(|| GeometryError::UnknownType(tag.clone()))?;

        let shape = match kind {
            GeometryKind::GeometryCollection => {
                Shape::GeometryCollection(parse_children(object, GEOMETRIES_FIELD)?)
            }
            GeometryKind::FeatureCollection => {
                Shape::FeatureCollection(parse_children(object, FEATURES_FIELD)?)
            }
            GeometryKind::Feature => {
                let geometry = match object.get(GEOMETRY_FIELD) {
                    None | Some(Value::Null) => None,
                    Some(geometry) => Some(Box::new(Self::parse(geometry)?)),
                };
                Shape::Feature(Feature {
                    geometry,
                    properties: object.get(PROPERTIES_FIELD).cloned().unwrap_or(Value::Null),
                    id: object.get(ID_FIELD).cloned(),
                })
            }
            _ => {
                let coordinates = object
                    .get(COORDINATES_FIELD)
                    .ok_or(GeometryError::MissingField(COORDINATES_FIELD))?;
                shape_from_coordinates(kind, coordinates)?
            }
        };
        let bbox = match object.get(BBOX_FIELD) {
            None | Some(Value::Null) => None,
            Some(bbox) => Some(parse_bbox(bbox)?),
        };
        let reserved = kind.reserved_fields();
        let members = object
            .iter()
            .filter(|(key, _)| !reserved.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Ok(Self {
            variant,
            shape,
            dimension: DEFAULT_DIMENSION,
            bbox,
            members,
        })
    }

    pub fn to_value(&self) -> Value {
        let mut object = Map::new();
        object.insert(TYPE_FIELD.to_string(), Value::String(self.tag()));
        match &self.shape {
            Shape::Point(position) => {
                object.insert(COORDINATES_FIELD.to_string(), Value::from(position.clone()));
            }
            Shape::MultiPoint(points) | Shape::LineString(points) => {
                object.insert(COORDINATES_FIELD.to_string(), Value::from(points.clone()));
            }
            Shape::MultiLineString(lines) | Shape::Polygon(lines) => {
                object.insert(COORDINATES_FIELD.to_string(), Value::from(lines.clone()));
            }
            Shape::MultiPolygon(polygons) => {
                object.insert(COORDINATES_FIELD.to_string(), Value::from(polygons.clone()));
            }
            Shape::GeometryCollection(children) => {
                object.insert(GEOMETRIES_FIELD.to_string(), children_value(children));
            }
            Shape::FeatureCollection(children) => {
                object.insert(FEATURES_FIELD.to_string(), children_value(children));
            }
            Shape::Feature(feature) => {
                if let Some(id) = &feature.id {
                    object.insert(ID_FIELD.to_string(), id.clone());
                }
                let geometry = feature
                    .geometry
                    .as_ref()
                    .map_or(Value::Null, |geometry| geometry.to_value());
                object.insert(GEOMETRY_FIELD.to_string(), geometry);
                object.insert(PROPERTIES_FIELD.to_string(), feature.properties.clone());
            }
        }
        if let Some(bbox) = &self.bbox {
            object.insert(BBOX_FIELD.to_string(), Value::from(bbox.clone()));
        }
        object.extend(self.members.clone());
        Value::Object(object)
    }
}

impl Serialize for GeoJson {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl FromStr for GeoJson {
    type Err = GeometryError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(&value)
    }
}

impl<'de> Deserialize<'de> for GeoJson {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).map_err(D::Error::custom)
    }
}

fn position_dimension(position: &[f64]) -> Option<usize> {
    (position.len() >= MIN_COMPONENTS).then_some(position.len())
}

fn points_dimension(points: &[Position]) -> Option<usize> {
    if points.is_empty() {
        return None;
    }
    points.iter().try_fold(usize::MAX, |min, point| {
        position_dimension(point).map(|d| min.min(d))
    })
}

fn rings_dimension<'a>(rings: impl Iterator<Item = &'a Vec<Position>>) -> Option<usize> {
    let mut dimension: Option<usize> = None;
    for ring in rings {
        if ring.len() < MIN_RING_POSITIONS {
            return None;
        }
        for position in ring {
            let d = position_dimension(position)?;
            dimension = Some(dimension.map_or(d, |min| min.min(d)));
        }
    }
    Some(dimension.unwrap_or(DEFAULT_DIMENSION))
}

/// Every child is measured, even after an invalid one.
fn children_dimension(children: &mut [GeoJson]) -> Option<usize> {
    let mut dimension: Option<usize> = None;
    let mut valid = true;
    for child in children {
        match child.measure() {
            Some(d) => dimension = Some(dimension.map_or(d, |min| min.min(d))),
            None => valid = false,
        }
    }
    valid.then(|| dimension.unwrap_or(DEFAULT_DIMENSION))
}

/// Componentwise running min/max over the first `dimension` axes.
struct Extent {
    min: Vec<f64>,
    max: Vec<f64>,
    empty: bool,
}

impl Extent {
    fn new(dimension: usize) -> Self {
        Self {
            min: vec![f64::INFINITY; dimension],
            max: vec![f64::NEG_INFINITY; dimension],
            empty: true,
        }
    }

    fn include(&mut self, lower: &[f64], upper: &[f64]) {
        let axes = self.min.iter_mut().zip(self.max.iter_mut());
        for ((min, max), (low, high)) in axes.zip(lower.iter().zip(upper)) {
            *min = min.min(*low);
            *max = max.max(*high);
        }
        self.empty = false;
    }

    fn into_bbox(self) -> Option<Vec<f64>> {
        if self.empty {
            return None;
        }
        let mut bbox = self.min;
        bbox.extend(self.max);
        Some(bbox)
    }
}

fn positions_extent<'a>(
    positions: impl IntoIterator<Item = &'a Position>,
    dimension: usize,
) -> Option<Vec<f64>> {
    let mut extent = Extent::new(dimension);
    for position in positions {
        extent.include(position, position);
    }
    extent.into_bbox()
}

fn boxes_extent<'a>(boxes: impl IntoIterator<Item = &'a [f64]>, dimension: usize) -> Option<Vec<f64>> {
    let mut extent = Extent::new(dimension);
    for bbox in boxes {
        let (lower, upper) = bbox.split_at(bbox.len() / 2);
        extent.include(lower, upper);
    }
    extent.into_bbox()
}

fn shape_from_coordinates(kind: GeometryKind, coordinates: &Value) -> Result<Shape, GeometryError> {
    let invalid = |reason: String| GeometryError::InvalidCoordinates { kind, reason };
    let shape = match kind {
        GeometryKind::Point => Shape::Point(position(coordinates).map_err(invalid)?),
        GeometryKind::MultiPoint => Shape::MultiPoint(positions(coordinates).map_err(invalid)?),
        GeometryKind::LineString => Shape::LineString(positions(coordinates).map_err(invalid)?),
        GeometryKind::MultiLineString => {
            Shape::MultiLineString(array_of(coordinates, positions).map_err(invalid)?)
        }
        GeometryKind::Polygon => Shape::Polygon(array_of(coordinates, positions).map_err(invalid)?),
        GeometryKind::MultiPolygon => Shape::MultiPolygon(
            array_of(coordinates, |polygon| array_of(polygon, positions)).map_err(invalid)?,
        ),
        GeometryKind::GeometryCollection
        | GeometryKind::Feature
        | GeometryKind::FeatureCollection => return Err(GeometryError::NoCoordinates(kind)),
    };
    Ok(shape)
}

fn array_of<T>(value: &Value, element: impl Fn(&Value) -> Parsed<T>) -> Parsed<Vec<T>> {
    value
        .as_array()
        .ok_or_else(|| format!("expected an array, found {}", json_type_name(value)))?
        .iter()
        .map(element)
        .collect()
}

fn position(value: &Value) -> Parsed<Position> {
    array_of(value, |component| {
        component
            .as_f64()
            .ok_or_else(|| format!("expected a number, found {}", json_type_name(component)))
    })
}

fn positions(value: &Value) -> Parsed<Vec<Position>> {
    array_of(value, position)
}

fn parse_bbox(value: &Value) -> Result<Vec<f64>, GeometryError> {
    let bbox = position(value).map_err(|reason| GeometryError::InvalidField {
        field: BBOX_FIELD,
        reason,
    })?;
    if bbox.len() < 2 * MIN_COMPONENTS || bbox.len() % 2 != 0 {
        return Err(GeometryError::InvalidField {
            field: BBOX_FIELD,
            reason: format!("expected an even number of at least 4 values, found {}", bbox.len()),
        });
    }
    Ok(bbox)
}

fn parse_children(object: &Map<String, Value>, field: &'static str) -> Result<Vec<GeoJson>, GeometryError> {
    match object.get(field) {
        Some(Value::Array(items)) => items.iter().map(GeoJson::parse).collect(),
        Some(other) => Err(GeometryError::InvalidField {
            field,
            reason: format!("expected an array, found {}", json_type_name(other)),
        }),
        None => Err(GeometryError::MissingField(field)),
    }
}

fn children_value(children: &[GeoJson]) -> Value {
    Value::Array(children.iter().map(GeoJson::to_value).collect())
}
