//! GeoJSON boundary documents.
//!
//! Only the polygonal subset matters for boundary overlays: `Polygon`,
//! `MultiPolygon` and `GeometryCollection`s of those, either bare or wrapped in
//! a `Feature` / `FeatureCollection`. Other geometry types are counted and skipped.

use crate::geo::{BoundingBox, LatLng, Polygon};
use serde::Deserialize;

/// A `[lng, lat, (alt)]` position.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(try_from = "Vec<f64>")]
struct Position(LatLng);

impl TryFrom<Vec<f64>> for Position {
    type Error = String;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        match values.as_slice() {
            [lng, lat, ..] => Ok(Self(LatLng::new(*lat, *lng))),
            _ => Err(format!(
                "position needs at least 2 numbers, got {}",
                values.len()
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PolygonCoordinates {
    coordinates: Vec<Vec<Position>>,
}

#[derive(Debug, Deserialize)]
struct MultiPolygonCoordinates {
    coordinates: Vec<Vec<Vec<Position>>>,
}

#[derive(Debug, Deserialize)]
struct Geometries {
    geometries: Vec<GeometryObject>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum GeometryObject {
    Polygon(PolygonCoordinates),
    MultiPolygon(MultiPolygonCoordinates),
    GeometryCollection(Geometries),
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    geometry: Option<GeometryObject>,
}

#[derive(Debug, Deserialize)]
struct Features {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Document {
    FeatureCollection(Features),
    Feature(Feature),
    Polygon(PolygonCoordinates),
    MultiPolygon(MultiPolygonCoordinates),
    GeometryCollection(Geometries),
    #[serde(other)]
    Unsupported,
}

/// The polygons of one boundary dataset, ready for hit testing and drawing.
#[derive(Debug, Clone, Default)]
pub struct Geometry {
    pub polygons: Vec<Polygon>,
    pub bounds: Option<BoundingBox>,
    /// Number of non-polygonal or degenerate geometries that were dropped
    pub skipped: usize,
}

impl Geometry {
    /// Parses a GeoJSON document.
    pub fn from_geojson_str(json: &str) -> Result<Self, serde_json::Error> {
        let document: Document = serde_json::from_str(json)?;
        let mut geometry = Self::default();

        match document {
            Document::FeatureCollection(Features { features }) => {
                for feature in features {
                    geometry.push_feature(feature);
                }
            }
            Document::Feature(feature) => geometry.push_feature(feature),
            Document::Polygon(p) => geometry.push_object(GeometryObject::Polygon(p)),
            Document::MultiPolygon(mp) => geometry.push_object(GeometryObject::MultiPolygon(mp)),
            Document::GeometryCollection(g) => {
                geometry.push_object(GeometryObject::GeometryCollection(g))
            }
            Document::Unsupported => geometry.skipped += 1,
        }

        geometry.bounds = geometry
            .polygons
            .iter()
            .map(|polygon| polygon.bounds)
            .reduce(BoundingBox::union);

        Ok(geometry)
    }

    /// Whether any polygon contains the point.
    pub fn contains(&self, point: LatLng) -> bool {
        self.bounds.is_some_and(|bounds| bounds.contains(point))
            && self.polygons.iter().any(|polygon| polygon.contains(point))
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    fn push_feature(&mut self, feature: Feature) {
        match feature.geometry {
            Some(object) => self.push_object(object),
            None => self.skipped += 1,
        }
    }

    fn push_object(&mut self, object: GeometryObject) {
        match object {
            GeometryObject::Polygon(PolygonCoordinates { coordinates }) => {
                self.push_rings(coordinates)
            }
            GeometryObject::MultiPolygon(MultiPolygonCoordinates { coordinates }) => {
                for rings in coordinates {
                    self.push_rings(rings);
                }
            }
            GeometryObject::GeometryCollection(Geometries { geometries }) => {
                for object in geometries {
                    self.push_object(object);
                }
            }
            GeometryObject::Unsupported => self.skipped += 1,
        }
    }

    fn push_rings(&mut self, rings: Vec<Vec<Position>>) {
        let mut rings = rings
            .into_iter()
            .map(|ring| ring.into_iter().map(|Position(p)| p).collect::<Vec<_>>());

        let Some(exterior) = rings.next() else {
            self.skipped += 1;
            return;
        };

        match Polygon::new(exterior, rings.collect()) {
            Some(polygon) => self.polygons.push(polygon),
            None => self.skipped += 1,
        }
    }
}
