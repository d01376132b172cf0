//! Incremental construction of [`Location`] values.
//!
//! The builder exists so a location can be authored purely from wall
//! measurements (distances along boundary segments) without a surveyor's
//! coordinate system. Boundary points define the shape; beacons, doors and
//! windows are then placed segment-relative: pick a segment, pick the anchor
//! side as seen from inside the room, and walk a measured distance along the
//! wall.
//!
//! ```
//! use indoor_location::{LocationBuilder, Point, Side};
//!
//! let mut builder = LocationBuilder::new();
//! builder.set_boundary_points(vec![
//!     Point::new(0.0, 0.0),
//!     Point::new(0.0, 5.0),
//!     Point::new(5.0, 5.0),
//!     Point::new(5.0, 0.0),
//! ]).unwrap();
//! builder.set_orientation(0.0);
//! builder.add_beacon("63d4819e6a1d", 0, 2.0, Side::Left).unwrap();
//! let location = builder.build().unwrap();
//! assert_eq!(location.beacons().len(), 1);
//! ```
//!
//! Placement calls validate eagerly and fail loudly; nothing is silently
//! dropped. The builder is single-owner and not meant to be shared across
//! concurrent construction.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{GeometryFault, IndoorError, PlacementFault};
use crate::geometry::{OrientedLineSegment, OrientedPoint, Point};
use crate::location::{
    boundary_segments, validated_polygon, LinearObject, LinearObjectKind, Location, LocationPin,
    PositionedBeacon, DEFAULT_LOCATION_NAME,
};
use crate::types::BeaconColor;

/// Side of a boundary segment, as seen from inside the location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Left side of the boundary segment as seen from inside.
    Left,
    /// Right side of the boundary segment as seen from inside.
    Right,
}

/// Builder for [`Location`] values.
///
/// Fields are staged as optionals and validated atomically in
/// [`LocationBuilder::build`]; segment-relative placements are additionally
/// validated on each call, so measurement errors surface at the line that
/// made them.
#[derive(Debug, Default)]
pub struct LocationBuilder {
    boundary_points: Option<Vec<Point>>,
    segments: Vec<OrientedLineSegment>,
    orientation: f64,
    name: Option<String>,
    creation_date: Option<DateTime<Utc>>,
    linear_objects: Vec<LinearObject>,
    beacons: Vec<PositionedBeacon>,
    pins: Vec<LocationPin>,
}

impl LocationBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the boundary points of the location.
    ///
    /// Points may be given clockwise or counter-clockwise. Boundary segments
    /// are derived pairwise in order, wrapping last→first, and indexed in
    /// the same order as the points for later segment-relative placement;
    /// the winding only decides which way the inward normals face.
    pub fn set_boundary_points(&mut self, points: Vec<Point>) -> Result<(), IndoorError> {
        let polygon = validated_polygon(points)?;
        self.segments = boundary_segments(&polygon);
        self.boundary_points = Some(polygon);
        Ok(())
    }

    /// Sets the orientation of the room with respect to magnetic north,
    /// counted clockwise in degrees.
    pub fn set_orientation(&mut self, degrees: f64) {
        self.orientation = degrees;
    }

    /// Sets the location name. Defaults to [`DEFAULT_LOCATION_NAME`].
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// Sets the creation date. Defaults to the current time.
    pub fn set_creation_date(&mut self, date: DateTime<Utc>) {
        self.creation_date = Some(date);
    }

    /// Places a beacon on a boundary segment.
    ///
    /// The anchor is the segment's left or right endpoint as seen from inside
    /// the room; the beacon sits `distance` meters from the anchor walking
    /// toward the opposite endpoint, oriented along the segment's inward
    /// normal.
    pub fn add_beacon(
        &mut self,
        identifier: impl Into<String>,
        segment_index: usize,
        distance: f64,
        side: Side,
    ) -> Result<(), IndoorError> {
        let position = self.point_on_segment(segment_index, distance, side)?;
        self.beacons.push(PositionedBeacon::new(identifier, position));
        Ok(())
    }

    /// Places a beacon at an absolute oriented point, bypassing
    /// segment-relative placement.
    pub fn add_beacon_at(&mut self, identifier: impl Into<String>, position: OrientedPoint) {
        self.beacons.push(PositionedBeacon::new(identifier, position));
    }

    /// Places a beacon with a known enclosure color at an absolute oriented
    /// point.
    pub fn add_beacon_colored(
        &mut self,
        identifier: impl Into<String>,
        position: OrientedPoint,
        color: BeaconColor,
    ) {
        self.beacons.push(PositionedBeacon::with_color(identifier, position, color));
    }

    /// Adds a point of interest. The identifier stays unset until the pin is
    /// persisted remotely.
    pub fn add_pin(
        &mut self,
        name: impl Into<String>,
        kind: impl Into<String>,
        position: OrientedPoint,
    ) {
        self.pins.push(LocationPin::new(name, kind, position));
    }

    /// Places a door on a boundary segment.
    ///
    /// The door spans `distance` to `distance + length` meters from the
    /// anchor side; `distance + length` must not walk past the far end of the
    /// segment.
    pub fn add_door(
        &mut self,
        length: f64,
        segment_index: usize,
        distance: f64,
        side: Side,
    ) -> Result<(), IndoorError> {
        self.add_linear_object(LinearObjectKind::Door, length, segment_index, distance, side)
    }

    /// Places a window on a boundary segment. Same anchor and length rules as
    /// [`LocationBuilder::add_door`].
    pub fn add_window(
        &mut self,
        length: f64,
        segment_index: usize,
        distance: f64,
        side: Side,
    ) -> Result<(), IndoorError> {
        self.add_linear_object(LinearObjectKind::Window, length, segment_index, distance, side)
    }

    /// Builds the location.
    ///
    /// Validates that a boundary was set, and assembles the immutable
    /// [`Location`] with all derived metrics. Fails with
    /// [`IndoorError::InvalidGeometry`] if the boundary was never set or is
    /// malformed.
    pub fn build(self) -> Result<Location, IndoorError> {
        let points = self
            .boundary_points
            .ok_or(GeometryFault::BoundaryNotSet)?;
        let name = self.name.unwrap_or_else(|| DEFAULT_LOCATION_NAME.to_string());
        let location = Location::assemble(
            None,
            name,
            self.orientation,
            points,
            self.linear_objects,
            self.beacons,
            self.pins,
            self.creation_date.unwrap_or_else(Utc::now),
        )?;
        debug!(
            name = location.name(),
            vertices = location.polygon().len(),
            beacons = location.beacons().len(),
            linear_objects = location.linear_objects().len(),
            area_m2 = location.area(),
            "built location"
        );
        Ok(location)
    }

    /// Resolves a segment-relative measurement to an oriented point.
    fn point_on_segment(
        &self,
        segment_index: usize,
        distance: f64,
        side: Side,
    ) -> Result<OrientedPoint, IndoorError> {
        let segment = self.segment(segment_index)?;
        let limit = segment.length();
        if distance < 0.0 || distance > limit {
            return Err(PlacementFault::OutOfBounds { distance, limit }.into());
        }

        let (anchor, toward) = anchor_and_direction(&segment, side);
        let (ux, uy) = unit(anchor, toward);
        Ok(OrientedPoint::from_point(
            Point::new(anchor.x + ux * distance, anchor.y + uy * distance),
            segment.orientation,
        ))
    }

    fn add_linear_object(
        &mut self,
        kind: LinearObjectKind,
        length: f64,
        segment_index: usize,
        distance: f64,
        side: Side,
    ) -> Result<(), IndoorError> {
        let segment = self.segment(segment_index)?;
        let limit = segment.length();
        if distance < 0.0 || length < 0.0 || distance + length > limit {
            return Err(PlacementFault::OutOfBounds {
                distance: distance + length,
                limit,
            }
            .into());
        }

        let (anchor, toward) = anchor_and_direction(&segment, side);
        let (ux, uy) = unit(anchor, toward);
        let near = Point::new(anchor.x + ux * distance, anchor.y + uy * distance);
        let far = Point::new(anchor.x + ux * (distance + length), anchor.y + uy * (distance + length));
        self.linear_objects.push(LinearObject::new(
            kind,
            OrientedLineSegment {
                point1: near,
                point2: far,
                orientation: segment.orientation,
            },
        ));
        Ok(())
    }

    fn segment(&self, index: usize) -> Result<OrientedLineSegment, IndoorError> {
        self.segments.get(index).copied().ok_or_else(|| {
            PlacementFault::UnknownSegment {
                index,
                segment_count: self.segments.len(),
            }
            .into()
        })
    }
}

/// Anchor endpoint for the given side, plus the opposite endpoint the
/// distance is walked toward.
///
/// Boundary segments always carry their inward normal, so the left/right
/// classification (as seen from inside) is defined; the endpoint-order
/// fallback is unreachable for segments derived from a polygon.
fn anchor_and_direction(segment: &OrientedLineSegment, side: Side) -> (Point, Point) {
    let (left, right) = match (segment.left_point(), segment.right_point()) {
        (Some(l), Some(r)) => (l.position, r.position),
        _ => (segment.point1, segment.point2),
    };
    match side {
        Side::Left => (left, right),
        Side::Right => (right, left),
    }
}

/// Unit vector from `a` toward `b`.
fn unit(a: Point, b: Point) -> (f64, f64) {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len = dx.hypot(dy);
    (dx / len, dy / len)
}
