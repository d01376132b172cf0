//! Structured records for persistence collaborators.
//!
//! The core performs no I/O; this module defines the serde data contract a
//! persistence layer round-trips locations through: field-for-field the
//! aggregate of the location model, with camelCase keys and the legacy `-1`
//! sentinel for undefined orientations on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::IndoorError;
use crate::geometry::{OrientedLineSegment, OrientedPoint, Point};
use crate::location::{
    BeaconIdentity, LinearObject, LinearObjectKind, Location, LocationPin, PositionedBeacon,
};
use crate::types::BeaconColor;

/// Wire value of an undefined orientation.
const WIRE_ORIENTATION_UNDEFINED: f64 = -1.0;

fn to_wire_orientation(orientation: Option<f64>) -> f64 {
    orientation.unwrap_or(WIRE_ORIENTATION_UNDEFINED)
}

fn from_wire_orientation(value: f64) -> Option<f64> {
    if value < 0.0 {
        None
    } else {
        Some(value)
    }
}

/// Serialized shape of a [`Location`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRecord {
    /// Identifier assigned by the remote store, absent until persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Location name.
    pub name: String,
    /// Orientation to magnetic north, degrees clockwise.
    pub orientation: f64,
    /// Creation date, RFC 3339.
    pub creation_date: DateTime<Utc>,
    /// Boundary vertices in polygon order.
    pub boundary: Vec<Point>,
    /// Doors and windows on the boundary.
    pub linear_objects: Vec<LinearObjectRecord>,
    /// Positioned beacons.
    pub beacons: Vec<BeaconRecord>,
    /// Points of interest.
    pub pins: Vec<PinRecord>,
}

/// Serialized shape of a [`LinearObject`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinearObjectRecord {
    /// Door or window.
    #[serde(rename = "type")]
    pub kind: LinearObjectKind,
    /// First endpoint.
    pub point1: Point,
    /// Second endpoint.
    pub point2: Point,
    /// Inward-normal orientation, `-1` when undefined.
    pub orientation: f64,
}

/// Serialized shape of a [`PositionedBeacon`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeaconRecord {
    /// Radio MAC or cloud-assigned identifier.
    pub identifier: String,
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Orientation, `-1` when undefined.
    pub orientation: f64,
    /// Enclosure color.
    pub color: BeaconColor,
    /// Proximity UUID, if known.
    #[serde(rename = "proximityUUID", default, skip_serializing_if = "Option::is_none")]
    pub proximity_uuid: Option<String>,
    /// Major value, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major: Option<u16>,
    /// Minor value, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minor: Option<u16>,
}

/// Serialized shape of a [`LocationPin`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinRecord {
    /// Identifier assigned on remote persistence, absent until then.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<i64>,
    /// Pin name.
    pub name: String,
    /// Pin type.
    #[serde(rename = "type")]
    pub kind: String,
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Orientation, `-1` when undefined.
    pub orientation: f64,
}

impl From<&Location> for LocationRecord {
    fn from(location: &Location) -> Self {
        Self {
            id: location.identifier().map(str::to_string),
            name: location.name().to_string(),
            orientation: location.orientation(),
            creation_date: location.creation_date(),
            boundary: location.polygon().to_vec(),
            linear_objects: location
                .linear_objects()
                .iter()
                .map(|o| LinearObjectRecord {
                    kind: o.kind,
                    point1: o.position.point1,
                    point2: o.position.point2,
                    orientation: to_wire_orientation(o.position.orientation),
                })
                .collect(),
            beacons: location
                .beacons()
                .iter()
                .map(|b| BeaconRecord {
                    identifier: b.identifier.clone(),
                    x: b.position.x(),
                    y: b.position.y(),
                    orientation: to_wire_orientation(b.position.orientation),
                    color: b.color,
                    proximity_uuid: b.identity.as_ref().map(|i| i.proximity_uuid.clone()),
                    major: b.identity.as_ref().map(|i| i.major),
                    minor: b.identity.as_ref().map(|i| i.minor),
                })
                .collect(),
            pins: location
                .pins()
                .iter()
                .map(|p| PinRecord {
                    identifier: p.identifier,
                    name: p.name.clone(),
                    kind: p.kind.clone(),
                    x: p.position.x(),
                    y: p.position.y(),
                    orientation: to_wire_orientation(p.position.orientation),
                })
                .collect(),
        }
    }
}

impl TryFrom<LocationRecord> for Location {
    type Error = IndoorError;

    /// Rebuilds a location from its record, revalidating through the same
    /// construction path as the builder; derived metrics are recomputed, not
    /// trusted from the wire.
    fn try_from(record: LocationRecord) -> Result<Self, Self::Error> {
        let linear_objects = record
            .linear_objects
            .into_iter()
            .map(|o| {
                LinearObject::new(
                    o.kind,
                    OrientedLineSegment {
                        point1: o.point1,
                        point2: o.point2,
                        orientation: from_wire_orientation(o.orientation),
                    },
                )
            })
            .collect();
        let beacons = record
            .beacons
            .into_iter()
            .map(|b| {
                let identity = match (b.proximity_uuid, b.major, b.minor) {
                    (Some(proximity_uuid), Some(major), Some(minor)) => Some(BeaconIdentity {
                        proximity_uuid,
                        major,
                        minor,
                    }),
                    _ => None,
                };
                PositionedBeacon {
                    identifier: b.identifier,
                    position: OrientedPoint::from_point(
                        Point::new(b.x, b.y),
                        from_wire_orientation(b.orientation),
                    ),
                    color: b.color,
                    identity,
                }
            })
            .collect();
        let pins = record
            .pins
            .into_iter()
            .map(|p| LocationPin {
                name: p.name,
                kind: p.kind,
                identifier: p.identifier,
                position: OrientedPoint::from_point(
                    Point::new(p.x, p.y),
                    from_wire_orientation(p.orientation),
                ),
            })
            .collect();

        Location::assemble(
            record.id,
            record.name,
            record.orientation,
            record.boundary,
            linear_objects,
            beacons,
            pins,
            record.creation_date,
        )
    }
}

impl LocationRecord {
    /// Serializes the record to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parses a record from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{LocationBuilder, Side};
    use crate::location::BeaconIdentity;

    fn furnished_location() -> Location {
        let mut builder = LocationBuilder::new();
        builder
            .set_boundary_points(vec![
                Point::new(0.0, 0.0),
                Point::new(0.0, 5.0),
                Point::new(5.0, 5.0),
                Point::new(5.0, 0.0),
            ])
            .unwrap();
        builder.set_name("office");
        builder.set_orientation(15.0);
        builder.add_beacon("63d4819e6a1d", 0, 2.0, Side::Left).unwrap();
        builder.add_door(1.0, 1, 2.0, Side::Left).unwrap();
        builder.add_window(1.5, 2, 1.0, Side::Right).unwrap();
        builder.add_pin("front desk", "poi", OrientedPoint::without_orientation(2.0, 2.0));
        builder.build().unwrap()
    }

    #[test]
    fn test_json_round_trip_preserves_structure() {
        let original = furnished_location();
        let json = LocationRecord::from(&original).to_json().unwrap();
        let restored = Location::try_from(LocationRecord::from_json(&json).unwrap()).unwrap();
        assert_eq!(original, restored);
        // Derived metrics are recomputed identically.
        assert!((original.area() - restored.area()).abs() < 1e-9);
        assert_eq!(original.boundary_segments().len(), restored.boundary_segments().len());
    }

    #[test]
    fn test_record_field_names_are_wire_exact() {
        let location = furnished_location();
        let json = LocationRecord::from(&location).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value.get("name").is_some());
        assert!(value.get("orientation").is_some());
        assert!(value.get("creationDate").is_some());
        assert!(value.get("boundary").is_some());
        assert!(value.get("linearObjects").is_some());
        assert!(value.get("beacons").is_some());
        assert!(value.get("pins").is_some());
        // Unpersisted: no id key at all.
        assert!(value.get("id").is_none());
        assert!(value["linearObjects"][0].get("type").is_some());
        assert!(value["pins"][0].get("type").is_some());
    }

    #[test]
    fn test_undefined_orientation_uses_wire_sentinel() {
        let location = furnished_location();
        let record = LocationRecord::from(&location);
        // The pin was placed without orientation.
        assert_eq!(record.pins[0].orientation, -1.0);
        let restored = Location::try_from(record).unwrap();
        assert_eq!(restored.pins()[0].position.orientation, None);
    }

    #[test]
    fn test_beacon_identity_round_trip() {
        let mut builder = LocationBuilder::new();
        builder
            .set_boundary_points(vec![
                Point::new(0.0, 0.0),
                Point::new(0.0, 4.0),
                Point::new(4.0, 4.0),
                Point::new(4.0, 0.0),
            ])
            .unwrap();
        builder.add_beacon_at("nearable", OrientedPoint::new(1.0, 1.0, 0.0));
        let mut location = builder.build().unwrap();
        // Identity is attached by the persistence collaborator in practice.
        let mut record = LocationRecord::from(&location);
        record.beacons[0].proximity_uuid = Some("B9407F30-F5F8-466E-AFF9-25556B57FE6D".into());
        record.beacons[0].major = Some(101);
        record.beacons[0].minor = Some(7);
        location = Location::try_from(record).unwrap();
        assert_eq!(
            location.beacons()[0].identity,
            Some(BeaconIdentity {
                proximity_uuid: "B9407F30-F5F8-466E-AFF9-25556B57FE6D".into(),
                major: 101,
                minor: 7,
            })
        );
    }

    #[test]
    fn test_malformed_boundary_in_record_is_rejected() {
        let location = furnished_location();
        let mut record = LocationRecord::from(&location);
        record.boundary.truncate(2);
        // Doors/beacons reference the old boundary but validation catches the
        // polygon first.
        assert!(Location::try_from(record).is_err());
    }
}
