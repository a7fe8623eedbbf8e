use foundation::math::LonLat;
use serde_json::{Map, Value};
use tracing::warn;

/// A closed ring of `[lon, lat]` vertices. The closing vertex may or may not
/// be repeated; containment tests do not care.
pub type Ring = Vec<LonLat>;

/// Land geometry, tagged by GeoJSON geometry kind.
///
/// Anything that is not an area geometry is kept as `Unsupported` with its raw
/// JSON so that it survives a cache round trip but never contributes dots or
/// outlines.
#[derive(Debug, Clone, PartialEq)]
pub enum LandGeometry {
    /// Ring 0 is the outer boundary, rings 1.. are holes.
    Polygon(Vec<Ring>),
    MultiPolygon(Vec<Vec<Ring>>),
    Unsupported { kind: String, raw: Value },
}

impl LandGeometry {
    pub fn kind(&self) -> &str {
        match self {
            LandGeometry::Polygon(_) => "Polygon",
            LandGeometry::MultiPolygon(_) => "MultiPolygon",
            LandGeometry::Unsupported { kind, .. } => kind,
        }
    }

    /// Every ring of the geometry, outer rings and holes alike.
    pub fn rings(&self) -> Vec<&Ring> {
        match self {
            LandGeometry::Polygon(rings) => rings.iter().collect(),
            LandGeometry::MultiPolygon(polys) => polys.iter().flatten().collect(),
            LandGeometry::Unsupported { .. } => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LandFeature {
    pub id: Option<String>,
    pub properties: Map<String, Value>,
    pub geometry: LandGeometry,
}

impl LandFeature {
    pub fn new(geometry: LandGeometry) -> Self {
        Self {
            id: None,
            properties: Map::new(),
            geometry,
        }
    }

    /// Natural Earth tags land polygons with `featurecla`; fall back to "Land".
    pub fn label(&self) -> &str {
        self.properties
            .get("featurecla")
            .and_then(|v| v.as_str())
            .unwrap_or("Land")
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LandCollection {
    pub features: Vec<LandFeature>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LandParseError {
    Json(String),
    NotAFeatureCollection,
    InvalidFeature { index: usize, reason: String },
}

impl std::fmt::Display for LandParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LandParseError::Json(msg) => write!(f, "JSON parse error: {msg}"),
            LandParseError::NotAFeatureCollection => {
                write!(f, "expected GeoJSON FeatureCollection")
            }
            LandParseError::InvalidFeature { index, reason } => {
                write!(f, "invalid feature at index {index}: {reason}")
            }
        }
    }
}

impl std::error::Error for LandParseError {}

impl LandCollection {
    pub fn new(features: Vec<LandFeature>) -> Self {
        Self { features }
    }

    pub fn from_geojson_str(payload: &str) -> Result<Self, LandParseError> {
        let value: Value =
            serde_json::from_str(payload).map_err(|e| LandParseError::Json(e.to_string()))?;
        Self::from_geojson_value(&value)
    }

    pub fn from_geojson_value(value: &Value) -> Result<Self, LandParseError> {
        let obj = value
            .as_object()
            .ok_or(LandParseError::NotAFeatureCollection)?;
        if obj.get("type").and_then(|v| v.as_str()) != Some("FeatureCollection") {
            return Err(LandParseError::NotAFeatureCollection);
        }
        let features_val = obj
            .get("features")
            .and_then(|v| v.as_array())
            .ok_or(LandParseError::NotAFeatureCollection)?;

        let features = features_val
            .iter()
            .enumerate()
            .map(|(index, feat)| {
                parse_feature(index, feat)
                    .map_err(|reason| LandParseError::InvalidFeature { index, reason })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { features })
    }

    pub fn to_geojson_value(&self) -> Value {
        let features = self.features.iter().map(feature_to_value).collect();
        let mut root = Map::new();
        root.insert("type".to_string(), Value::from("FeatureCollection"));
        root.insert("features".to_string(), Value::Array(features));
        Value::Object(root)
    }

    pub fn to_geojson_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.to_geojson_value())
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

fn parse_feature(index: usize, value: &Value) -> Result<LandFeature, String> {
    let obj = value.as_object().ok_or("feature must be an object")?;
    match obj.get("type").and_then(|v| v.as_str()) {
        Some("Feature") => {}
        Some(other) => return Err(format!("unexpected feature type: {other}")),
        None => return Err("feature missing type".to_string()),
    }

    let id = match obj.get("id") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };
    let properties = obj
        .get("properties")
        .and_then(|v| v.as_object())
        .cloned()
        .unwrap_or_default();
    let geometry = match obj.get("geometry") {
        None | Some(Value::Null) => LandGeometry::Unsupported {
            kind: "null".to_string(),
            raw: Value::Null,
        },
        Some(geom) => parse_geometry(geom).unwrap_or_else(|reason| {
            warn!(index, %reason, "skipping malformed land geometry");
            malformed_geometry(geom)
        }),
    };

    Ok(LandFeature {
        id,
        properties,
        geometry,
    })
}

fn parse_geometry(value: &Value) -> Result<LandGeometry, String> {
    let obj = value.as_object().ok_or("geometry must be an object")?;
    let kind = obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or("geometry missing type")?;

    match kind {
        "Polygon" => {
            let coords = obj.get("coordinates").ok_or("geometry missing coordinates")?;
            Ok(LandGeometry::Polygon(parse_polygon(coords)?))
        }
        "MultiPolygon" => {
            let coords = obj.get("coordinates").ok_or("geometry missing coordinates")?;
            let polys = coords
                .as_array()
                .ok_or("MultiPolygon coordinates must be an array of polygons")?;
            let polys = polys.iter().map(parse_polygon).collect::<Result<_, _>>()?;
            Ok(LandGeometry::MultiPolygon(polys))
        }
        other => Ok(LandGeometry::Unsupported {
            kind: other.to_string(),
            raw: value.clone(),
        }),
    }
}

/// Keeps a geometry that failed to parse so it round-trips but never draws.
fn malformed_geometry(value: &Value) -> LandGeometry {
    let kind = value
        .get("type")
        .and_then(|v| v.as_str())
        .unwrap_or("invalid")
        .to_string();
    LandGeometry::Unsupported {
        kind,
        raw: value.clone(),
    }
}

fn parse_polygon(coords: &Value) -> Result<Vec<Ring>, String> {
    let rings = coords
        .as_array()
        .ok_or("Polygon coordinates must be an array of rings")?;
    rings.iter().map(parse_ring).collect()
}

fn parse_ring(value: &Value) -> Result<Ring, String> {
    let points = value.as_array().ok_or("ring must be an array of positions")?;
    points.iter().map(parse_position).collect()
}

fn parse_position(value: &Value) -> Result<LonLat, String> {
    let arr = value.as_array().ok_or("position must be an array")?;
    if arr.len() < 2 {
        return Err("position must have [lon, lat]".to_string());
    }
    let lon = arr[0].as_f64().ok_or("lon must be a number")?;
    let lat = arr[1].as_f64().ok_or("lat must be a number")?;
    Ok(LonLat::new(lon, lat))
}

fn feature_to_value(feature: &LandFeature) -> Value {
    let mut obj = Map::new();
    obj.insert("type".to_string(), Value::from("Feature"));
    if let Some(id) = &feature.id {
        obj.insert("id".to_string(), Value::from(id.as_str()));
    }
    obj.insert(
        "properties".to_string(),
        Value::Object(feature.properties.clone()),
    );
    obj.insert("geometry".to_string(), geometry_to_value(&feature.geometry));
    Value::Object(obj)
}

fn geometry_to_value(geometry: &LandGeometry) -> Value {
    let coordinates = match geometry {
        LandGeometry::Polygon(rings) => polygon_to_value(rings),
        LandGeometry::MultiPolygon(polys) => {
            Value::Array(polys.iter().map(|p| polygon_to_value(p)).collect())
        }
        LandGeometry::Unsupported { raw, .. } => return raw.clone(),
    };
    let mut obj = Map::new();
    obj.insert("type".to_string(), Value::from(geometry.kind()));
    obj.insert("coordinates".to_string(), coordinates);
    Value::Object(obj)
}

fn polygon_to_value(rings: &[Ring]) -> Value {
    Value::Array(
        rings
            .iter()
            .map(|ring| {
                Value::Array(
                    ring.iter()
                        .map(|p| Value::Array(vec![Value::from(p.lon_deg), Value::from(p.lat_deg)]))
                        .collect(),
                )
            })
            .collect(),
    )
}
