//! Geographic primitives, hit testing and fill triangulation for boundary polygons.

use earcutr::earcut;
use serde::{Deserialize, Serialize};

/// A WGS84 coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Axis-aligned bounds in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl BoundingBox {
    /// Computes the bounds of a set of points. Returns `None` for an empty set.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a LatLng>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let init = Self {
            south: first.lat,
            west: first.lng,
            north: first.lat,
            east: first.lng,
        };
        Some(iter.fold(init, |bounds, p| Self {
            south: bounds.south.min(p.lat),
            west: bounds.west.min(p.lng),
            north: bounds.north.max(p.lat),
            east: bounds.east.max(p.lng),
        }))
    }

    pub fn union(self, other: Self) -> Self {
        Self {
            south: self.south.min(other.south),
            west: self.west.min(other.west),
            north: self.north.max(other.north),
            east: self.east.max(other.east),
        }
    }

    pub fn contains(&self, point: LatLng) -> bool {
        point.lat >= self.south
            && point.lat <= self.north
            && point.lng >= self.west
            && point.lng <= self.east
    }
}

/// Even-odd ray casting test in lng/lat space.
pub fn ring_contains(ring: &[LatLng], point: LatLng) -> bool {
    let mut inside = false;
    let n = ring.len();
    if n < 3 {
        return false;
    }

    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (ring[i], ring[j]);
        if (a.lat > point.lat) != (b.lat > point.lat) {
            let cross_lng = (b.lng - a.lng) * (point.lat - a.lat) / (b.lat - a.lat) + a.lng;
            if point.lng < cross_lng {
                inside = !inside;
            }
        }
        j = i;
    }

    inside
}

/// A single polygon: one exterior ring and any number of holes.
#[derive(Debug, Clone)]
pub struct Polygon {
    pub exterior: Vec<LatLng>,
    pub holes: Vec<Vec<LatLng>>,
    pub bounds: BoundingBox,
    /// Vertices of the fill mesh: the exterior followed by every hole.
    pub fill_vertices: Vec<LatLng>,
    /// Triangles indexing into `fill_vertices`.
    pub fill_triangles: Vec<[u32; 3]>,
}

impl Polygon {
    /// Builds a polygon from its rings. Returns `None` if the exterior ring is degenerate.
    pub fn new(exterior: Vec<LatLng>, holes: Vec<Vec<LatLng>>) -> Option<Self> {
        let exterior = strip_closing_point(exterior);
        if exterior.len() < 3 {
            return None;
        }
        let bounds = BoundingBox::from_points(&exterior)?;
        let holes: Vec<Vec<LatLng>> = holes
            .into_iter()
            .map(strip_closing_point)
            .filter(|hole| hole.len() >= 3)
            .collect();

        let (fill_vertices, fill_triangles) = triangulate(&exterior, &holes);

        Some(Self {
            exterior,
            holes,
            bounds,
            fill_vertices,
            fill_triangles,
        })
    }

    /// Point-in-polygon, honoring holes.
    pub fn contains(&self, point: LatLng) -> bool {
        self.bounds.contains(point)
            && ring_contains(&self.exterior, point)
            && !self.holes.iter().any(|hole| ring_contains(hole, point))
    }
}

fn strip_closing_point(mut ring: Vec<LatLng>) -> Vec<LatLng> {
    if ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    ring
}

/// Triangulates a ring and its holes with earcut.
///
/// Returns the flattened vertices and triangles indexing into them. Input that
/// earcut rejects yields no triangles; the outline is still drawn.
pub fn triangulate(exterior: &[LatLng], holes: &[Vec<LatLng>]) -> (Vec<LatLng>, Vec<[u32; 3]>) {
    let mut vertices = exterior.to_vec();
    let mut hole_indices = Vec::with_capacity(holes.len());
    for hole in holes {
        hole_indices.push(vertices.len());
        vertices.extend_from_slice(hole);
    }

    // Flattened [x0, y0, x1, y1, ...] in lng/lat order
    let flat: Vec<f64> = vertices.iter().flat_map(|p| [p.lng, p.lat]).collect();
    let indices = earcut(&flat, &hole_indices, 2).unwrap_or_else(|err| {
        log::debug!("Fill triangulation failed: {err:?}");
        Vec::new()
    });

    let triangles = indices
        .chunks_exact(3)
        .filter(|t| t.iter().all(|&i| i < vertices.len()))
        .map(|t| [t[0] as u32, t[1] as u32, t[2] as u32])
        .collect();

    (vertices, triangles)
}
