//! Indoor location core.
//!
//! This crate lets an application define a physical indoor space (boundary,
//! beacons, doors, windows, points of interest) and continuously determine
//! whether a tracked device is inside that space and where within it, given
//! raw position fixes from an external positioning engine.
//!
//! # Design principles
//!
//! - **Immutable model**: a [`Location`] is built once, atomically, and is
//!   read-only afterwards; derived geometry (area, bounding box,
//!   triangulation) is computed at construction, never on the hot path.
//! - **Fail-loud construction**: malformed boundaries and impossible
//!   placements are rejected synchronously with typed errors, never silently
//!   accepted.
//! - **Single-owner state machine**: the manager takes `&mut self`
//!   everywhere, so fix processing is sequential and ordered by
//!   construction, not by locking.
//! - **Opaque upstream**: sensor fusion, ranging and frame alignment stay
//!   behind the [`PositioningEngine`] trait; the core only consumes graded
//!   fixes.
//!
//! # Example
//!
//! ```
//! use indoor_location::{
//!     Fix, IndoorLocationManager, LocationBuilder, Point, PositionAccuracy, Side,
//! };
//!
//! let mut builder = LocationBuilder::new();
//! builder.set_boundary_points(vec![
//!     Point::new(0.0, 0.0),
//!     Point::new(0.0, 4.0),
//!     Point::new(4.0, 4.0),
//!     Point::new(4.0, 0.0),
//! ])?;
//! builder.set_name("office");
//! builder.add_beacon("63d4819e6a1d", 0, 2.0, Side::Left)?;
//! let location = builder.build()?;
//!
//! let mut manager = IndoorLocationManager::new();
//! manager.start_monitoring(location);
//! manager.process_fix("office", Fix::new(2.0, 2.0, PositionAccuracy::High, 0));
//! # Ok::<(), indoor_location::IndoorError>(())
//! ```

pub mod builder;
pub mod error;
pub mod geometry;
pub mod location;
pub mod manager;
pub mod records;
pub mod transform;
pub mod types;


// Re-export the primary surface.
pub use builder::{LocationBuilder, Side};
pub use error::{GeometryFault, IndoorError, PlacementFault};
pub use geometry::{OrientedLineSegment, OrientedPoint, Point};
pub use location::{
    BeaconIdentity, BoundingBox, LinearObject, LinearObjectKind, Location, LocationPin,
    PositionedBeacon, DEFAULT_LOCATION_NAME,
};
pub use manager::{
    Clock, IndoorLocationManager, IndoorObserver, NullEngine, PositioningEngine, SpaceLayout,
    SystemClock, WARM_UP_MS,
};
pub use records::{BeaconRecord, LinearObjectRecord, LocationRecord, PinRecord};
pub use transform::FrameTransform;
pub use types::{
    BeaconColor, Fix, LocationState, PositionAccuracy, PositioningMode, TrackingFault,
};
