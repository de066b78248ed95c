use crate::error::LoadError;
use crate::map::geometry::{ring_centroid, ring_contains, Bbox};
use geojson::{feature::Id, GeoJson, Geometry, Value};
use serde::Deserialize;
use simd_json::OwnedValue;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// A closed ring of (lon, lat) coordinates
pub type Ring = Vec<(f64, f64)>;

/// Exterior ring first, holes after
pub type Polygon = Vec<Ring>;

/// A country boundary joined to the case table by `name`
#[derive(Debug, Clone, PartialEq)]
pub struct CountryFeature {
    pub id: String,
    pub name: String,
    pub polygons: Vec<Polygon>,
}

impl CountryFeature {
    /// Bounding box over every exterior ring
    pub fn bbox(&self) -> Bbox {
        let mut bbox = Bbox::EMPTY;
        for polygon in &self.polygons {
            if let Some(exterior) = polygon.first() {
                for &(lon, lat) in exterior {
                    bbox.extend(lon, lat);
                }
            }
        }
        bbox
    }

    /// Even-odd containment; holes cancel their exterior
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        self.polygons.iter().any(|polygon| {
            polygon
                .iter()
                .filter(|ring| ring_contains(ring, lon, lat))
                .count()
                % 2
                == 1
        })
    }

    /// Centroid of the largest exterior ring, used to place the death marker
    pub fn centroid(&self) -> Option<(f64, f64)> {
        self.polygons
            .iter()
            .filter_map(|polygon| polygon.first())
            .filter_map(|ring| ring_centroid(ring))
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(center, _)| center)
    }
}

/// Load country boundaries from a TopoJSON topology or a GeoJSON collection.
///
/// `object` names the topology object holding the countries; it is ignored
/// for GeoJSON input.
pub fn load_boundaries(path: &Path, object: &str) -> Result<Vec<CountryFeature>, LoadError> {
    let bytes = fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_boundaries(bytes, path, object)
}

/// Parse boundary bytes; `path` is only used in errors.
///
/// The document is parsed once; its top-level `type` then picks the schema.
pub fn parse_boundaries(mut bytes: Vec<u8>, path: &Path, object: &str) -> Result<Vec<CountryFeature>, LoadError> {
    let value = simd_json::to_owned_value(&mut bytes).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    if is_topology(&value) {
        let topology: Topology = simd_json::serde::from_owned_value(value).map_err(|source| LoadError::TopoJson {
            path: path.to_path_buf(),
            source,
        })?;
        topology.into_features(path, object)
    } else {
        let geojson: GeoJson = simd_json::serde::from_owned_value(value).map_err(|source| LoadError::GeoJson {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(features_from_geojson(geojson))
    }
}

fn is_topology(value: &OwnedValue) -> bool {
    match value {
        OwnedValue::Object(members) => {
            matches!(members.get("type"), Some(OwnedValue::String(kind)) if kind == "Topology")
        }
        _ => false,
    }
}

#[derive(Deserialize)]
struct Topology {
    #[serde(default)]
    transform: Option<Transform>,
    objects: HashMap<String, TopoEntry>,
    #[serde(default)]
    arcs: Vec<Vec<Vec<f64>>>,
}

#[derive(Deserialize)]
struct Transform {
    scale: [f64; 2],
    translate: [f64; 2],
}

/// A geometry object, or one that cannot be read as such. Null-type
/// geometries and malformed members land in `Skipped` instead of failing
/// the whole topology.
#[derive(Deserialize)]
#[serde(untagged)]
enum TopoEntry {
    Known(TopoObject),
    Skipped {
        #[serde(rename = "type", default)]
        kind: Option<String>,
    },
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum TopoObject {
    GeometryCollection {
        geometries: Vec<TopoEntry>,
    },
    Polygon {
        arcs: Vec<Vec<i64>>,
        #[serde(default)]
        id: Option<FeatureId>,
        #[serde(default)]
        properties: Option<Properties>,
    },
    MultiPolygon {
        arcs: Vec<Vec<Vec<i64>>>,
        #[serde(default)]
        id: Option<FeatureId>,
        #[serde(default)]
        properties: Option<Properties>,
    },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FeatureId {
    Text(String),
    Number(f64),
}

impl FeatureId {
    fn into_string(self) -> String {
        match self {
            FeatureId::Text(s) => s,
            FeatureId::Number(n) if n.fract() == 0.0 => format!("{}", n as i64),
            FeatureId::Number(n) => n.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct Properties {
    #[serde(default)]
    name: Option<String>,
}

impl Topology {
    fn into_features(mut self, path: &Path, object: &str) -> Result<Vec<CountryFeature>, LoadError> {
        let root = match self.objects.remove(object) {
            Some(root) => root,
            None if self.objects.len() == 1 => {
                let key = self.objects.keys().next().cloned().unwrap_or_default();
                tracing::info!(requested = object, using = %key, "topology object not found, using its only object");
                self.objects.remove(&key).unwrap_or(TopoEntry::Skipped { kind: None })
            }
            None => {
                let mut available: Vec<_> = self.objects.keys().cloned().collect();
                available.sort();
                return Err(LoadError::MissingObject {
                    path: path.to_path_buf(),
                    object: object.to_string(),
                    available: available.join(", "),
                });
            }
        };

        let arcs = decode_arcs(&self.arcs, self.transform.as_ref());
        let mut features = Vec::new();
        collect_topo_features(root, &arcs, path, &mut features)?;
        Ok(features)
    }
}

/// Resolve quantized, delta-encoded arcs into absolute coordinates
fn decode_arcs(raw: &[Vec<Vec<f64>>], transform: Option<&Transform>) -> Vec<Ring> {
    raw.iter()
        .map(|arc| {
            let positions = arc.iter().filter(|p| p.len() >= 2);
            match transform {
                Some(t) => {
                    let (mut x, mut y) = (0.0, 0.0);
                    positions
                        .map(|p| {
                            x += p[0];
                            y += p[1];
                            (x * t.scale[0] + t.translate[0], y * t.scale[1] + t.translate[1])
                        })
                        .collect()
                }
                None => positions.map(|p| (p[0], p[1])).collect(),
            }
        })
        .collect()
}

/// Join arcs into one ring. Negative indices mean "arc !i, reversed";
/// each arc after the first shares its first point with the previous one.
fn stitch_ring(indices: &[i64], arcs: &[Ring], path: &Path) -> Result<Ring, LoadError> {
    let mut ring: Ring = Vec::new();
    for &index in indices {
        let (slot, reversed) = if index < 0 { (!index, true) } else { (index, false) };
        let arc = usize::try_from(slot)
            .ok()
            .and_then(|slot| arcs.get(slot))
            .ok_or_else(|| LoadError::BadArc {
                path: path.to_path_buf(),
                index,
            })?;

        let skip = usize::from(!ring.is_empty());
        if reversed {
            ring.extend(arc.iter().rev().skip(skip));
        } else {
            ring.extend(arc.iter().skip(skip));
        }
    }
    Ok(ring)
}

fn stitch_polygon(rings: &[Vec<i64>], arcs: &[Ring], path: &Path) -> Result<Polygon, LoadError> {
    rings.iter().map(|ring| stitch_ring(ring, arcs, path)).collect()
}

fn collect_topo_features(
    entry: TopoEntry,
    arcs: &[Ring],
    path: &Path,
    out: &mut Vec<CountryFeature>,
) -> Result<(), LoadError> {
    let object = match entry {
        TopoEntry::Known(object) => object,
        TopoEntry::Skipped { kind } => {
            tracing::debug!(?kind, "skipping unreadable topology geometry");
            return Ok(());
        }
    };
    let (polygons, id, properties) = match object {
        TopoObject::GeometryCollection { geometries } => {
            for geometry in geometries {
                collect_topo_features(geometry, arcs, path, out)?;
            }
            return Ok(());
        }
        TopoObject::Polygon { arcs: rings, id, properties } => {
            (vec![stitch_polygon(&rings, arcs, path)?], id, properties)
        }
        TopoObject::MultiPolygon { arcs: polys, id, properties } => {
            let polygons = polys
                .iter()
                .map(|rings| stitch_polygon(rings, arcs, path))
                .collect::<Result<Vec<_>, _>>()?;
            (polygons, id, properties)
        }
        TopoObject::Other => return Ok(()),
    };

    let Some(name) = properties.and_then(|p| p.name) else {
        tracing::debug!("skipping unnamed topology geometry");
        return Ok(());
    };
    let id = id.map(FeatureId::into_string).unwrap_or_else(|| name.clone());
    out.push(CountryFeature { id, name, polygons });
    Ok(())
}

/// Property keys tried, in order, for a feature's display name
const NAME_KEYS: [&str; 4] = ["name", "NAME", "ADMIN", "name_en"];

fn features_from_geojson(geojson: GeoJson) -> Vec<CountryFeature> {
    let features = match geojson {
        GeoJson::FeatureCollection(fc) => fc.features,
        GeoJson::Feature(f) => vec![f],
        GeoJson::Geometry(_) => Vec::new(),
    };

    features
        .into_iter()
        .filter_map(|feature| {
            let props = feature.properties.as_ref();
            let name = NAME_KEYS
                .iter()
                .find_map(|key| props.and_then(|p| p.get(*key)).and_then(|v| v.as_str()))?
                .to_string();

            let id = match &feature.id {
                Some(Id::String(s)) => s.clone(),
                Some(Id::Number(n)) => n.to_string(),
                None => name.clone(),
            };

            let mut polygons = Vec::new();
            if let Some(ref geometry) = feature.geometry {
                collect_geojson_polygons(geometry, &mut polygons);
            }
            Some(CountryFeature { id, name, polygons })
        })
        .collect()
}

fn collect_geojson_polygons(geometry: &Geometry, out: &mut Vec<Polygon>) {
    let to_ring = |coords: &Vec<Vec<f64>>| -> Ring {
        coords.iter().filter(|c| c.len() >= 2).map(|c| (c[0], c[1])).collect()
    };

    match &geometry.value {
        Value::Polygon(rings) => out.push(rings.iter().map(to_ring).collect()),
        Value::MultiPolygon(polygons) => {
            for rings in polygons {
                out.push(rings.iter().map(to_ring).collect());
            }
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                collect_geojson_polygons(g, out);
            }
        }
        _ => {}
    }
}
