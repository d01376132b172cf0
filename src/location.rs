//! Immutable location aggregate.
//!
//! A [`Location`] is a self-consistent polygon-based representation of a
//! physical indoor space: its boundary walls, the objects placed on them
//! (doors, windows, beacons) and free-standing points of interest. It is
//! produced atomically by the builder or by record deserialization and is
//! read-only afterwards; every derived metric (polygon winding, area,
//! bounding box, triangulation) is computed once at construction, not on
//! each read.
//!
//! The polygon is stored in the supplied vertex order, either winding; the
//! inward-normal derivation reads the winding off the shoelace sign.

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::error::{GeometryFault, IndoorError};
use crate::geometry::{
    vector_orientation, OrientedLineSegment, OrientedPoint, Point, GEOMETRY_EPSILON,
};
use crate::types::BeaconColor;

/// Default name given to locations built without an explicit one.
pub const DEFAULT_LOCATION_NAME: &str = "MyEstimoteLocation";

/// Kind of a linear object placed on a boundary segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LinearObjectKind {
    /// A door.
    Door,
    /// A window.
    Window,
}

/// An object occupying a stretch of a boundary segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearObject {
    /// Door or window.
    pub kind: LinearObjectKind,
    /// Placement of the object; orientation mirrors the inward normal of the
    /// parent boundary segment.
    pub position: OrientedLineSegment,
}

impl LinearObject {
    /// Creates a linear object of the given kind at the given placement.
    pub const fn new(kind: LinearObjectKind, position: OrientedLineSegment) -> Self {
        Self { kind, position }
    }

    /// Returns a copy translated by `(dx, dy)`.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            kind: self.kind,
            position: self.position.translated(dx, dy),
        }
    }
}

/// Radio identity triple of a beacon, when known.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BeaconIdentity {
    /// Proximity UUID shared by a fleet of beacons.
    pub proximity_uuid: String,
    /// Major value.
    pub major: u16,
    /// Minor value.
    pub minor: u16,
}

/// A beacon with a known position inside a location.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedBeacon {
    /// Stable external key: radio MAC address or cloud-assigned identifier.
    pub identifier: String,
    /// Position and orientation of the beacon.
    pub position: OrientedPoint,
    /// Enclosure color.
    pub color: BeaconColor,
    /// Radio identity, if known.
    pub identity: Option<BeaconIdentity>,
}

impl PositionedBeacon {
    /// Creates a beacon with unknown color and radio identity.
    pub fn new(identifier: impl Into<String>, position: OrientedPoint) -> Self {
        Self {
            identifier: identifier.into(),
            position,
            color: BeaconColor::Unknown,
            identity: None,
        }
    }

    /// Creates a beacon with a known enclosure color.
    pub fn with_color(
        identifier: impl Into<String>,
        position: OrientedPoint,
        color: BeaconColor,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            position,
            color,
            identity: None,
        }
    }

    /// Returns a copy translated by `(dx, dy)`.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            identifier: self.identifier.clone(),
            position: self.position.translated(dx, dy),
            color: self.color,
            identity: self.identity.clone(),
        }
    }
}

/// A named point of interest inside a location.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationPin {
    /// Display name of the pin.
    pub name: String,
    /// Free-form pin type understood by the application.
    pub kind: String,
    /// Identifier assigned once the pin is persisted remotely.
    pub identifier: Option<i64>,
    /// Position of the pin.
    pub position: OrientedPoint,
}

impl LocationPin {
    /// Creates an unpersisted pin (no identifier yet).
    pub fn new(name: impl Into<String>, kind: impl Into<String>, position: OrientedPoint) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            identifier: None,
            position,
        }
    }

    /// Returns a copy translated by `(dx, dy)`.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            name: self.name.clone(),
            kind: self.kind.clone(),
            identifier: self.identifier,
            position: self.position.translated(dx, dy),
        }
    }
}

/// Axis-aligned bounding box of a location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Minimum corner.
    pub min: Point,
    /// Maximum corner.
    pub max: Point,
}

impl BoundingBox {
    /// Computes the bounding box of a non-empty point set.
    fn of(points: &[Point]) -> Self {
        let mut min = points[0];
        let mut max = points[0];
        for p in points {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Self { min, max }
    }

    /// Width of the box.
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Height of the box.
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Whether the box contains the point (boundary inclusive).
    pub fn contains(&self, point: &Point) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }
}

/// A physical indoor space prepared for monitoring and positioning.
///
/// Immutable after construction; "modifications" such as [`Location::translated`]
/// return a new value with every nested entity moved consistently.
#[derive(Debug, Clone)]
pub struct Location {
    identifier: Option<String>,
    name: String,
    orientation: f64,
    polygon: Vec<Point>,
    boundary_segments: Vec<OrientedLineSegment>,
    area: f64,
    bounding_box: BoundingBox,
    linear_objects: Vec<LinearObject>,
    beacons: Vec<PositionedBeacon>,
    pins: Vec<LocationPin>,
    creation_date: DateTime<Utc>,
    triangles: Vec<[Point; 3]>,
}

impl Location {
    /// Assembles a location from validated parts.
    ///
    /// This is the single construction path shared by the builder and record
    /// deserialization: boundary points are validated (vertex count,
    /// self-intersection, enclosed area, identifier uniqueness), kept in the
    /// supplied vertex order, and every derived metric is computed here.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn assemble(
        identifier: Option<String>,
        name: String,
        orientation: f64,
        boundary_points: Vec<Point>,
        linear_objects: Vec<LinearObject>,
        beacons: Vec<PositionedBeacon>,
        pins: Vec<LocationPin>,
        creation_date: DateTime<Utc>,
    ) -> Result<Self, IndoorError> {
        let polygon = validated_polygon(boundary_points)?;

        for (i, beacon) in beacons.iter().enumerate() {
            if beacons[..i].iter().any(|b| b.identifier == beacon.identifier) {
                return Err(GeometryFault::DuplicateBeacon(beacon.identifier.clone()).into());
            }
        }
        for (i, pin) in pins.iter().enumerate() {
            if let Some(id) = pin.identifier {
                if pins[..i].iter().any(|p| p.identifier == Some(id)) {
                    return Err(GeometryFault::DuplicatePin(id).into());
                }
            }
        }

        let boundary_segments = boundary_segments(&polygon);
        let area = shoelace_sum(&polygon).abs() / 2.0;
        let bounding_box = BoundingBox::of(&polygon);
        let triangles = triangulate(&polygon);

        Ok(Self {
            identifier,
            name,
            orientation,
            polygon,
            boundary_segments,
            area,
            bounding_box,
            linear_objects,
            beacons,
            pins,
            creation_date,
            triangles,
        })
    }

    /// Globally unique identifier, set once the location is persisted remotely.
    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    /// Name of the location.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Orientation to magnetic north in degrees, counted clockwise.
    pub fn orientation(&self) -> f64 {
        self.orientation
    }

    /// Vertices of the boundary polygon, clockwise.
    pub fn polygon(&self) -> &[Point] {
        &self.polygon
    }

    /// Boundary segments in vertex order, each carrying its inward normal as
    /// orientation. `segments[i].point2 == segments[(i+1) % n].point1`.
    pub fn boundary_segments(&self) -> &[OrientedLineSegment] {
        &self.boundary_segments
    }

    /// Closed outline path: the polygon vertices with the first one repeated
    /// at the end. The drawable shape for rendering collaborators.
    pub fn shape(&self) -> Vec<Point> {
        let mut path = self.polygon.clone();
        path.push(self.polygon[0]);
        path
    }

    /// Area in square meters (shoelace formula over the polygon).
    pub fn area(&self) -> f64 {
        self.area
    }

    /// Axis-aligned bounding box of the polygon.
    pub fn bounding_box(&self) -> BoundingBox {
        self.bounding_box
    }

    /// Linear objects (doors, windows) on the boundary.
    pub fn linear_objects(&self) -> &[LinearObject] {
        &self.linear_objects
    }

    /// Linear objects of one kind.
    pub fn linear_objects_of(&self, kind: LinearObjectKind) -> Vec<&LinearObject> {
        self.linear_objects.iter().filter(|o| o.kind == kind).collect()
    }

    /// Beacons positioned in the location.
    pub fn beacons(&self) -> &[PositionedBeacon] {
        &self.beacons
    }

    /// Points of interest in the location.
    pub fn pins(&self) -> &[LocationPin] {
        &self.pins
    }

    /// Creation date of the location.
    pub fn creation_date(&self) -> DateTime<Utc> {
        self.creation_date
    }

    /// Triangulation of the polygon used for interior-point sampling.
    pub fn triangles(&self) -> &[[Point; 3]] {
        &self.triangles
    }

    /// Whether the point `(x, y)` lies inside the boundary polygon.
    ///
    /// Even-odd ray casting; points exactly on the boundary are not
    /// guaranteed either way.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let mut inside = false;
        let n = self.polygon.len();
        let mut j = n - 1;
        for i in 0..n {
            let pi = self.polygon[i];
            let pj = self.polygon[j];
            if (pi.y > y) != (pj.y > y) {
                let x_cross = (pj.x - pi.x) * (y - pi.y) / (pj.y - pi.y) + pi.x;
                if x < x_cross {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }

    /// Whether the point lies inside the boundary polygon.
    pub fn contains_point(&self, point: &Point) -> bool {
        self.contains(point.x, point.y)
    }

    /// An equally distributed random point inside the location.
    pub fn random_point_inside(&self) -> Point {
        self.random_point_inside_with(&mut rand::thread_rng())
    }

    /// An equally distributed random point inside the location, drawn from
    /// the given generator.
    ///
    /// Uniformity is exact: a triangle of the precomputed triangulation is
    /// chosen with probability proportional to its area, then a point is
    /// sampled uniformly within it.
    pub fn random_point_inside_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Point {
        let target = rng.gen_range(0.0..self.area.max(f64::MIN_POSITIVE));
        let mut cumulative = 0.0;
        let mut chosen = self.triangles[self.triangles.len() - 1];
        for triangle in &self.triangles {
            cumulative += triangle_area(triangle);
            if target < cumulative {
                chosen = *triangle;
                break;
            }
        }

        let [a, b, c] = chosen;
        let r1: f64 = rng.gen::<f64>().sqrt();
        let r2: f64 = rng.gen();
        Point::new(
            (1.0 - r1) * a.x + r1 * (1.0 - r2) * b.x + r1 * r2 * c.x,
            (1.0 - r1) * a.y + r1 * (1.0 - r2) * b.y + r1 * r2 * c.y,
        )
    }

    /// Returns a new location translated by `(dx, dy)`, with every nested
    /// entity translated consistently.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            identifier: self.identifier.clone(),
            name: self.name.clone(),
            orientation: self.orientation,
            polygon: self.polygon.iter().map(|p| p.translated(dx, dy)).collect(),
            boundary_segments: self
                .boundary_segments
                .iter()
                .map(|s| s.translated(dx, dy))
                .collect(),
            area: self.area,
            bounding_box: BoundingBox {
                min: self.bounding_box.min.translated(dx, dy),
                max: self.bounding_box.max.translated(dx, dy),
            },
            linear_objects: self.linear_objects.iter().map(|o| o.translated(dx, dy)).collect(),
            beacons: self.beacons.iter().map(|b| b.translated(dx, dy)).collect(),
            pins: self.pins.iter().map(|p| p.translated(dx, dy)).collect(),
            creation_date: self.creation_date,
            triangles: self
                .triangles
                .iter()
                .map(|[a, b, c]| [a.translated(dx, dy), b.translated(dx, dy), c.translated(dx, dy)])
                .collect(),
        }
    }
}

/// Structural equality over name, boundary, linear objects, beacons, pins and
/// orientation. Identifier and creation date are deliberately excluded: two
/// structurally identical rooms are the same room whether or not one of them
/// has been persisted yet.
impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.orientation == other.orientation
            && self.polygon.len() == other.polygon.len()
            && self
                .polygon
                .iter()
                .zip(&other.polygon)
                .all(|(a, b)| a.almost_eq(b))
            && self.linear_objects.len() == other.linear_objects.len()
            && self
                .linear_objects
                .iter()
                .zip(&other.linear_objects)
                .all(|(a, b)| a.kind == b.kind && a.position.almost_eq(&b.position))
            && self.beacons.len() == other.beacons.len()
            && self.beacons.iter().zip(&other.beacons).all(|(a, b)| {
                a.identifier == b.identifier
                    && a.position.almost_eq(&b.position)
                    && a.color == b.color
                    && a.identity == b.identity
            })
            && self.pins.len() == other.pins.len()
            && self.pins.iter().zip(&other.pins).all(|(a, b)| {
                a.name == b.name
                    && a.kind == b.kind
                    && a.identifier == b.identifier
                    && a.position.almost_eq(&b.position)
            })
    }
}

/// Validates boundary points, preserving the supplied vertex order.
///
/// Vertex order is part of the authoring contract: boundary segments are
/// indexed in the same order as the points, whichever winding was supplied,
/// so later segment-relative placements refer to the walls as measured.
pub(crate) fn validated_polygon(points: Vec<Point>) -> Result<Vec<Point>, IndoorError> {
    if points.is_empty() {
        return Err(GeometryFault::BoundaryNotSet.into());
    }
    if points.len() < 3 {
        return Err(GeometryFault::TooFewPoints(points.len()).into());
    }
    if is_self_intersecting(&points) {
        return Err(GeometryFault::SelfIntersecting.into());
    }
    if shoelace_sum(&points).abs() / 2.0 <= GEOMETRY_EPSILON {
        return Err(GeometryFault::ZeroArea.into());
    }
    Ok(points)
}

/// Signed shoelace sum over the polygon; the enclosed area is `|sum| / 2`.
pub(crate) fn shoelace_sum(points: &[Point]) -> f64 {
    let n = points.len();
    (0..n)
        .map(|i| {
            let a = points[i];
            let b = points[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum()
}

/// Derives the boundary segments of a polygon, each oriented along its
/// inward normal and indexed in vertex order.
///
/// For clockwise winding (y-up) the interior lies to the right of the travel
/// direction, so the inward normal of a segment with direction `d` is
/// `(d.y, -d.x)`; for counter-clockwise winding it is the opposite,
/// `(-d.y, d.x)`. The winding is read off the shoelace sum so that either
/// vertex order yields normals pointing into the interior.
pub(crate) fn boundary_segments(polygon: &[Point]) -> Vec<OrientedLineSegment> {
    let clockwise = shoelace_sum(polygon) < 0.0;
    let n = polygon.len();
    (0..n)
        .map(|i| {
            let p1 = polygon[i];
            let p2 = polygon[(i + 1) % n];
            let (dx, dy) = (p2.x - p1.x, p2.y - p1.y);
            let normal = if clockwise {
                vector_orientation(dy, -dx)
            } else {
                vector_orientation(-dy, dx)
            };
            OrientedLineSegment::new(p1, p2, normal)
        })
        .collect()
}

/// Whether any two non-adjacent boundary edges intersect.
pub(crate) fn is_self_intersecting(points: &[Point]) -> bool {
    let n = points.len();
    if n < 4 {
        return false;
    }
    for i in 0..n {
        let a1 = points[i];
        let a2 = points[(i + 1) % n];
        for j in (i + 1)..n {
            // Skip the edge itself and the two edges sharing a vertex with it.
            if j == i || (j + 1) % n == i || (i + 1) % n == j {
                continue;
            }
            let b1 = points[j];
            let b2 = points[(j + 1) % n];
            if segments_intersect(a1, a2, b1, b2) {
                return true;
            }
        }
    }
    false
}

/// Cross product of `(b - a)` and `(c - a)`.
fn cross(a: Point, b: Point, c: Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn on_segment(a: Point, b: Point, p: Point) -> bool {
    p.x >= a.x.min(b.x) - GEOMETRY_EPSILON
        && p.x <= a.x.max(b.x) + GEOMETRY_EPSILON
        && p.y >= a.y.min(b.y) - GEOMETRY_EPSILON
        && p.y <= a.y.max(b.y) + GEOMETRY_EPSILON
}

/// Segment intersection including improper (touching, collinear overlap)
/// cases. A vertex resting on a non-adjacent edge is a malformed boundary.
fn segments_intersect(p1: Point, p2: Point, p3: Point, p4: Point) -> bool {
    let d1 = cross(p3, p4, p1);
    let d2 = cross(p3, p4, p2);
    let d3 = cross(p1, p2, p3);
    let d4 = cross(p1, p2, p4);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1.abs() <= f64::EPSILON && on_segment(p3, p4, p1))
        || (d2.abs() <= f64::EPSILON && on_segment(p3, p4, p2))
        || (d3.abs() <= f64::EPSILON && on_segment(p1, p2, p3))
        || (d4.abs() <= f64::EPSILON && on_segment(p1, p2, p4))
}

fn triangle_area(triangle: &[Point; 3]) -> f64 {
    cross(triangle[0], triangle[1], triangle[2]).abs() / 2.0
}

fn point_in_triangle(p: Point, a: Point, b: Point, c: Point) -> bool {
    let d1 = cross(a, b, p);
    let d2 = cross(b, c, p);
    let d3 = cross(c, a, p);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}

/// Ear-clipping triangulation of a simple polygon.
///
/// Works on a counter-clockwise index list regardless of input winding.
/// O(n²) which is fine at room scale; rooms have tens of vertices, not
/// thousands.
pub(crate) fn triangulate(polygon: &[Point]) -> Vec<[Point; 3]> {
    let mut ids: Vec<usize> = (0..polygon.len()).collect();
    if shoelace_sum(polygon) < 0.0 {
        ids.reverse();
    }

    let mut triangles = Vec::with_capacity(polygon.len().saturating_sub(2));
    while ids.len() > 3 {
        let n = ids.len();
        let mut clipped = false;
        for k in 0..n {
            let prev = polygon[ids[(k + n - 1) % n]];
            let curr = polygon[ids[k]];
            let next = polygon[ids[(k + 1) % n]];
            // Convex corner of a CCW polygon.
            if cross(prev, curr, next) <= f64::EPSILON {
                continue;
            }
            let blocked = ids
                .iter()
                .enumerate()
                .filter(|(m, _)| *m != (k + n - 1) % n && *m != k && *m != (k + 1) % n)
                .any(|(_, &id)| point_in_triangle(polygon[id], prev, curr, next));
            if blocked {
                continue;
            }
            triangles.push([prev, curr, next]);
            ids.remove(k);
            clipped = true;
            break;
        }
        if !clipped {
            // Numeric degeneracy (collinear run). Clip the first corner to
            // guarantee termination; the degenerate triangle has zero area
            // and never wins the sampling lottery.
            let prev = polygon[ids[ids.len() - 1]];
            let curr = polygon[ids[0]];
            let next = polygon[ids[1]];
            triangles.push([prev, curr, next]);
            ids.remove(0);
        }
    }
    triangles.push([polygon[ids[0]], polygon[ids[1]], polygon[ids[2]]]);
    triangles
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn square(side: f64) -> Location {
        Location::assemble(
            None,
            "square".into(),
            0.0,
            vec![
                Point::new(0.0, 0.0),
                Point::new(0.0, side),
                Point::new(side, side),
                Point::new(side, 0.0),
            ],
            vec![],
            vec![],
            vec![],
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn test_boundary_closure_law() {
        let location = square(5.0);
        let segments = location.boundary_segments();
        assert_eq!(segments.len(), 4);
        for i in 0..segments.len() {
            let next = segments[(i + 1) % segments.len()];
            assert!(segments[i].point2.almost_eq(&next.point1));
        }
    }

    #[test]
    fn test_area_of_canonical_shapes() {
        assert!((square(5.0).area() - 25.0).abs() < 1e-9);

        let triangle = Location::assemble(
            None,
            "triangle".into(),
            0.0,
            vec![Point::new(0.0, 0.0), Point::new(4.0, 0.0), Point::new(0.0, 3.0)],
            vec![],
            vec![],
            vec![],
            Utc::now(),
        )
        .unwrap();
        assert!((triangle.area() - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_vertex_order_preserved_for_either_winding() {
        // Segment indices follow the supplied point order, so the vertex
        // list must never be reordered, whichever winding was given.
        let ccw = vec![
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(4.0, 4.0),
            Point::new(0.0, 4.0),
        ];
        let location = Location::assemble(
            None,
            "ccw".into(),
            0.0,
            ccw.clone(),
            vec![],
            vec![],
            vec![],
            Utc::now(),
        )
        .unwrap();
        assert_eq!(location.polygon(), ccw.as_slice());
        let first = &location.boundary_segments()[0];
        assert_eq!(first.point1, Point::new(0.0, 0.0));
        assert_eq!(first.point2, Point::new(4.0, 0.0));
    }

    #[test]
    fn test_inward_normals_point_into_ccw_square() {
        let location = Location::assemble(
            None,
            "ccw".into(),
            0.0,
            vec![
                Point::new(0.0, 0.0),
                Point::new(4.0, 0.0),
                Point::new(4.0, 4.0),
                Point::new(0.0, 4.0),
            ],
            vec![],
            vec![],
            vec![],
            Utc::now(),
        )
        .unwrap();
        for segment in location.boundary_segments() {
            let center = segment.center();
            let (vx, vy) = crate::geometry::orientation_vector(segment.orientation.unwrap());
            assert!(location.contains(center.x() + 0.1 * vx, center.y() + 0.1 * vy));
            assert!(!location.contains(center.x() - 0.1 * vx, center.y() - 0.1 * vy));
        }
    }

    #[test]
    fn test_collinear_boundary_rejected() {
        // A zero-area boundary would let interior sampling produce points
        // the polygon does not contain.
        let result = Location::assemble(
            None,
            "line".into(),
            0.0,
            vec![
                Point::new(0.0, 0.0),
                Point::new(1.0, 1.0),
                Point::new(2.0, 2.0),
            ],
            vec![],
            vec![],
            vec![],
            Utc::now(),
        );
        assert_eq!(
            result.unwrap_err(),
            IndoorError::InvalidGeometry(GeometryFault::ZeroArea)
        );
    }

    #[test]
    fn test_inward_normals_point_into_square() {
        let location = square(4.0);
        for segment in location.boundary_segments() {
            let center = segment.center();
            let (vx, vy) = crate::geometry::orientation_vector(segment.orientation.unwrap());
            // A small step along the inward normal lands inside.
            assert!(location.contains(center.x() + 0.1 * vx, center.y() + 0.1 * vy));
            // And a step the other way lands outside.
            assert!(!location.contains(center.x() - 0.1 * vx, center.y() - 0.1 * vy));
        }
    }

    #[test]
    fn test_bounding_box() {
        let location = square(4.0).translated(1.0, 2.0);
        let bb = location.bounding_box();
        assert_eq!(bb.min, Point::new(1.0, 2.0));
        assert_eq!(bb.max, Point::new(5.0, 6.0));
        assert!((bb.width() - 4.0).abs() < 1e-9);
        assert!((bb.height() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_contains_square() {
        let location = square(4.0);
        assert!(location.contains(2.0, 2.0));
        assert!(location.contains(0.1, 3.9));
        assert!(!location.contains(-0.1, 2.0));
        assert!(!location.contains(4.1, 2.0));
        assert!(!location.contains(2.0, 5.0));
    }

    #[test]
    fn test_contains_concave_polygon() {
        // An L-shaped room; the notch is outside.
        let location = Location::assemble(
            None,
            "L".into(),
            0.0,
            vec![
                Point::new(0.0, 0.0),
                Point::new(0.0, 4.0),
                Point::new(2.0, 4.0),
                Point::new(2.0, 2.0),
                Point::new(4.0, 2.0),
                Point::new(4.0, 0.0),
            ],
            vec![],
            vec![],
            vec![],
            Utc::now(),
        )
        .unwrap();
        assert!(location.contains(1.0, 3.0));
        assert!(location.contains(3.0, 1.0));
        assert!(!location.contains(3.0, 3.0));
        assert!((location.area() - 12.0).abs() < 1e-9);
    }

    /// Brute-force even-odd reference used to cross-check `contains`.
    fn reference_contains(polygon: &[Point], x: f64, y: f64) -> bool {
        let n = polygon.len();
        let mut crossings = 0;
        for i in 0..n {
            let a = polygon[i];
            let b = polygon[(i + 1) % n];
            if (a.y > y) != (b.y > y) {
                let x_cross = a.x + (y - a.y) * (b.x - a.x) / (b.y - a.y);
                if x_cross > x {
                    crossings += 1;
                }
            }
        }
        crossings % 2 == 1
    }

    /// Random star-shaped polygon: vertices at sorted angles around a center
    /// with random radii. Simple by construction.
    fn random_simple_polygon(rng: &mut StdRng) -> Vec<Point> {
        let n = rng.gen_range(3..12);
        let mut angles: Vec<f64> = (0..n).map(|_| rng.gen_range(0.0..std::f64::consts::TAU)).collect();
        angles.sort_by(|a, b| a.partial_cmp(b).unwrap());
        angles.dedup_by(|a, b| (*a - *b).abs() < 1e-3);
        while angles.len() < 3 {
            angles.push(angles.last().unwrap() + 0.5);
        }
        angles
            .iter()
            .map(|theta| {
                let r = rng.gen_range(1.0..10.0);
                Point::new(5.0 + r * theta.cos(), 5.0 + r * theta.sin())
            })
            .collect()
    }

    #[test]
    fn test_contains_agrees_with_reference_on_random_polygons() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let points = random_simple_polygon(&mut rng);
            let location = Location::assemble(
                None,
                "random".into(),
                0.0,
                points,
                vec![],
                vec![],
                vec![],
                Utc::now(),
            )
            .unwrap();
            for _ in 0..10 {
                let x = rng.gen_range(-6.0..16.0);
                let y = rng.gen_range(-6.0..16.0);
                assert_eq!(
                    location.contains(x, y),
                    reference_contains(location.polygon(), x, y),
                    "disagreement at ({x}, {y}) on {:?}",
                    location.polygon()
                );
            }
        }
    }

    #[test]
    fn test_random_point_inside_always_contained() {
        let mut rng = StdRng::seed_from_u64(11);
        let location = Location::assemble(
            None,
            "L".into(),
            0.0,
            vec![
                Point::new(0.0, 0.0),
                Point::new(0.0, 4.0),
                Point::new(2.0, 4.0),
                Point::new(2.0, 2.0),
                Point::new(4.0, 2.0),
                Point::new(4.0, 0.0),
            ],
            vec![],
            vec![],
            vec![],
            Utc::now(),
        )
        .unwrap();
        for _ in 0..10_000 {
            let p = location.random_point_inside_with(&mut rng);
            assert!(location.contains_point(&p), "{p:?} escaped the polygon");
        }
    }

    #[test]
    fn test_random_point_distribution_is_area_proportional() {
        // Rectangle 4 wide, 1 tall; the left quarter should collect ~25% of
        // the samples.
        let mut rng = StdRng::seed_from_u64(13);
        let location = Location::assemble(
            None,
            "rect".into(),
            0.0,
            vec![
                Point::new(0.0, 0.0),
                Point::new(0.0, 1.0),
                Point::new(4.0, 1.0),
                Point::new(4.0, 0.0),
            ],
            vec![],
            vec![],
            vec![],
            Utc::now(),
        )
        .unwrap();
        let samples = 20_000;
        let in_left_quarter = (0..samples)
            .filter(|_| location.random_point_inside_with(&mut rng).x < 1.0)
            .count();
        let fraction = in_left_quarter as f64 / samples as f64;
        assert!((fraction - 0.25).abs() < 0.02, "left-quarter fraction {fraction}");
    }

    #[test]
    fn test_translation_round_trip() {
        let original = square(4.0);
        let back = original.translated(3.5, -1.25).translated(-3.5, 1.25);
        assert_eq!(original, back);
    }

    #[test]
    fn test_translation_moves_every_entity() {
        let location = Location::assemble(
            None,
            "furnished".into(),
            0.0,
            vec![
                Point::new(0.0, 0.0),
                Point::new(0.0, 4.0),
                Point::new(4.0, 4.0),
                Point::new(4.0, 0.0),
            ],
            vec![LinearObject::new(
                LinearObjectKind::Door,
                OrientedLineSegment::new(Point::new(0.0, 1.0), Point::new(0.0, 2.0), 90.0),
            )],
            vec![PositionedBeacon::new("aa:bb", OrientedPoint::new(0.0, 2.0, 90.0))],
            vec![LocationPin::new("desk", "furniture", OrientedPoint::without_orientation(1.0, 1.0))],
            Utc::now(),
        )
        .unwrap();
        let moved = location.translated(1.0, 1.0);
        assert_eq!(moved.beacons()[0].position.position, Point::new(1.0, 3.0));
        assert_eq!(moved.linear_objects()[0].position.point1, Point::new(1.0, 2.0));
        assert_eq!(moved.pins()[0].position.position, Point::new(2.0, 2.0));
        assert_eq!(moved.polygon()[0], Point::new(1.0, 1.0));
    }

    #[test]
    fn test_self_intersecting_boundary_rejected() {
        // Bowtie.
        let result = Location::assemble(
            None,
            "bowtie".into(),
            0.0,
            vec![
                Point::new(0.0, 0.0),
                Point::new(4.0, 4.0),
                Point::new(4.0, 0.0),
                Point::new(0.0, 4.0),
            ],
            vec![],
            vec![],
            vec![],
            Utc::now(),
        );
        assert_eq!(
            result.unwrap_err(),
            IndoorError::InvalidGeometry(GeometryFault::SelfIntersecting)
        );
    }

    #[test]
    fn test_too_few_points_rejected() {
        let result = Location::assemble(
            None,
            "line".into(),
            0.0,
            vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)],
            vec![],
            vec![],
            vec![],
            Utc::now(),
        );
        assert_eq!(
            result.unwrap_err(),
            IndoorError::InvalidGeometry(GeometryFault::TooFewPoints(2))
        );
    }

    #[test]
    fn test_duplicate_beacon_identifier_rejected() {
        let result = Location::assemble(
            None,
            "dup".into(),
            0.0,
            vec![
                Point::new(0.0, 0.0),
                Point::new(0.0, 4.0),
                Point::new(4.0, 4.0),
                Point::new(4.0, 0.0),
            ],
            vec![],
            vec![
                PositionedBeacon::new("aa:bb", OrientedPoint::new(0.0, 2.0, 90.0)),
                PositionedBeacon::new("aa:bb", OrientedPoint::new(4.0, 2.0, 270.0)),
            ],
            vec![],
            Utc::now(),
        );
        assert_eq!(
            result.unwrap_err(),
            IndoorError::InvalidGeometry(GeometryFault::DuplicateBeacon("aa:bb".into()))
        );
    }

    #[test]
    fn test_triangulation_covers_polygon_area() {
        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..200 {
            let points = random_simple_polygon(&mut rng);
            let area = shoelace_sum(&points).abs() / 2.0;
            let triangles = triangulate(&points);
            let sum: f64 = triangles.iter().map(triangle_area).sum();
            assert!(
                (sum - area).abs() < 1e-6 * area.max(1.0),
                "triangulated {sum} vs shoelace {area}"
            );
        }
    }

    #[test]
    fn test_equality_ignores_creation_date_and_identifier() {
        let a = square(4.0);
        let mut b = square(4.0);
        b.identifier = Some("persisted".into());
        b.creation_date = Utc::now();
        assert_eq!(a, b);
    }

    #[test]
    fn test_linear_object_filter() {
        let door = LinearObject::new(
            LinearObjectKind::Door,
            OrientedLineSegment::new(Point::new(0.0, 1.0), Point::new(0.0, 2.0), 90.0),
        );
        let window = LinearObject::new(
            LinearObjectKind::Window,
            OrientedLineSegment::new(Point::new(1.0, 4.0), Point::new(2.0, 4.0), 180.0),
        );
        let location = Location::assemble(
            None,
            "mixed".into(),
            0.0,
            vec![
                Point::new(0.0, 0.0),
                Point::new(0.0, 4.0),
                Point::new(4.0, 4.0),
                Point::new(4.0, 0.0),
            ],
            vec![door, window],
            vec![],
            vec![],
            Utc::now(),
        )
        .unwrap();
        assert_eq!(location.linear_objects_of(LinearObjectKind::Door).len(), 1);
        assert_eq!(location.linear_objects_of(LinearObjectKind::Window).len(), 1);
    }
}
