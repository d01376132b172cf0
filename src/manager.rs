//! Monitoring and position-update state machine.
//!
//! [`IndoorLocationManager`] tracks, per monitored location, whether the
//! device is inside or outside, and optionally streams graded position
//! updates for one location at a time. It consumes raw fixes produced by an
//! external positioning engine and never looks past their data contract.
//!
//! # Ownership model
//!
//! The manager is a single-owner state machine, not internally thread-safe:
//! every mutating call takes `&mut self`, which makes the required
//! marshaling of engine callbacks onto one control-flow context a compile
//! time property rather than a locking discipline. Fix processing is
//! strictly sequential and ordered; [`IndoorLocationManager::stop`] is safe
//! at any time and synchronously guarantees that no further observer
//! callbacks are delivered.

use tracing::{debug, warn};

use crate::error::IndoorError;
use crate::geometry::{OrientedLineSegment, OrientedPoint, Point};
use crate::location::{Location, PositionedBeacon};
use crate::transform::FrameTransform;
use crate::types::{Fix, LocationState, PositionAccuracy, PositioningMode, TrackingFault};

/// Warm-up interval of the upstream positioning engine.
///
/// Position updates requested without prior monitoring are delayed by this
/// long; monitoring that was already running for the location reduces the
/// delay by the elapsed time, down to zero.
pub const WARM_UP_MS: u64 = 6000;

/// Monotonic time source for the warm-up contract.
///
/// Injected so the timing behavior is deterministic under test.
pub trait Clock {
    /// Current time in milliseconds.
    fn now_ms(&self) -> u64;
}

/// Wall-clock milliseconds since the Unix epoch.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// The slice of a location the positioning engine needs to do its job: the
/// space's boundary and its radio/landmark layout.
#[derive(Debug, Clone)]
pub struct SpaceLayout {
    /// Boundary segments of the space.
    pub boundary: Vec<OrientedLineSegment>,
    /// Beacons positioned in the space.
    pub beacons: Vec<PositionedBeacon>,
}

impl SpaceLayout {
    /// Extracts the engine-facing layout of a location.
    pub fn of(location: &Location) -> Self {
        Self {
            boundary: location.boundary_segments().to_vec(),
            beacons: location.beacons().to_vec(),
        }
    }
}

/// External positioning engine lifecycle contract.
///
/// The engine is an opaque upstream: sensor fusion, ranging and frame
/// alignment happen behind this trait. The mode is a hint, not a contract
/// the core implements.
pub trait PositioningEngine {
    /// Starts (or reconfigures) the engine for a space.
    fn start(&mut self, layout: &SpaceLayout, mode: PositioningMode);
    /// Stops the engine.
    fn stop(&mut self);
}

/// A do-nothing engine for tests and demos where fixes are fed manually.
#[derive(Debug, Default)]
pub struct NullEngine;

impl PositioningEngine for NullEngine {
    fn start(&mut self, _layout: &SpaceLayout, _mode: PositioningMode) {}
    fn stop(&mut self) {}
}

/// Receiver of monitoring and positioning events.
///
/// All methods default to no-ops so observers implement only what they care
/// about.
pub trait IndoorObserver {
    /// A new graded position is available for the location.
    fn position_updated(
        &mut self,
        location: &Location,
        position: OrientedPoint,
        accuracy: PositionAccuracy,
    ) {
        let _ = (location, position, accuracy);
    }

    /// The inside/outside state of a monitored location changed.
    fn state_changed(&mut self, location: &Location, state: LocationState) {
        let _ = (location, state);
    }

    /// A fix or the tracking stack could not be used. Monitoring state is
    /// not affected.
    fn tracking_failed(&mut self, error: &IndoorError) {
        let _ = error;
    }
}

struct Monitored {
    location: Location,
    state: LocationState,
    since_ms: u64,
}

struct PositionUpdates {
    key: String,
    ready_at_ms: u64,
}

/// Per-location containment tracking and accuracy-graded position dispatch.
pub struct IndoorLocationManager {
    clock: Box<dyn Clock>,
    engine: Box<dyn PositioningEngine>,
    mode: PositioningMode,
    running: bool,
    monitored: Vec<Monitored>,
    updates: Option<PositionUpdates>,
    alignment: Option<FrameTransform>,
    observers: Vec<Box<dyn IndoorObserver>>,
}

impl Default for IndoorLocationManager {
    fn default() -> Self {
        Self::new()
    }
}

impl IndoorLocationManager {
    /// Creates a manager with the system clock and a no-op engine.
    pub fn new() -> Self {
        Self::with_parts(Box::new(NullEngine), Box::new(SystemClock))
    }

    /// Creates a manager driving the given engine with the given clock.
    pub fn with_parts(engine: Box<dyn PositioningEngine>, clock: Box<dyn Clock>) -> Self {
        Self {
            clock,
            engine,
            mode: PositioningMode::default(),
            running: false,
            monitored: Vec::new(),
            updates: None,
            alignment: None,
            observers: Vec::new(),
        }
    }

    /// Registers an observer for position, state and failure events.
    pub fn add_observer(&mut self, observer: Box<dyn IndoorObserver>) {
        self.observers.push(observer);
    }

    /// Whether the manager is currently running.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Current delivery mode hint.
    pub fn mode(&self) -> PositioningMode {
        self.mode
    }

    /// Changes the delivery mode hint.
    ///
    /// While position updates are in progress this restarts the engine with
    /// the new mode; the warm-up already served is not repeated.
    pub fn set_mode(&mut self, mode: PositioningMode) {
        self.mode = mode;
        if let Some(updates) = &self.updates {
            if let Some(entry) = self.monitored.iter().find(|m| matches_key(&m.location, &updates.key)) {
                let layout = SpaceLayout::of(&entry.location);
                self.engine.stop();
                self.engine.start(&layout, mode);
            }
        }
    }

    /// Registers the rigid-body alignment between the engine's reporting
    /// frame and the local frame. Fix positions and device orientations are
    /// both mapped through it before containment tests and dispatch.
    pub fn set_frame_alignment(&mut self, alignment: FrameTransform) {
        self.alignment = Some(alignment);
    }

    /// Drops any registered frame alignment; fixes are then taken to be in
    /// the local frame already.
    pub fn clear_frame_alignment(&mut self) {
        self.alignment = None;
    }

    /// Starts the manager.
    ///
    /// Starting early lets the upstream engine warm up so that later
    /// monitoring and position updates are delivered without delay.
    pub fn start(&mut self) {
        if !self.running {
            self.running = true;
            debug!("indoor location manager started");
        }
    }

    /// Completely stops the manager: all monitoring and position updates
    /// end, the engine is stopped, and no further observer callbacks will be
    /// delivered.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.engine.stop();
        self.monitored.clear();
        self.updates = None;
        self.running = false;
        debug!("indoor location manager stopped");
    }

    /// Starts monitoring a location, starting the manager and the engine if
    /// needed.
    ///
    /// Idempotent: re-adding a location already monitored (matched by
    /// identifier or name) is a no-op. Initial state is
    /// [`LocationState::Unknown`] until the first definitive fix.
    pub fn start_monitoring(&mut self, location: Location) {
        self.start();
        if self.monitored.iter().any(|m| same_location(&m.location, &location)) {
            debug!(name = location.name(), "location already monitored");
            return;
        }
        let layout = SpaceLayout::of(&location);
        self.engine.start(&layout, self.mode);
        debug!(name = location.name(), "monitoring started");
        self.monitored.push(Monitored {
            location,
            state: LocationState::Unknown,
            since_ms: self.clock.now_ms(),
        });
    }

    /// Stops monitoring one location; other monitored locations are not
    /// affected. The engine keeps running; stopping it when nothing remains
    /// monitored is the owning collaborator's call.
    pub fn stop_monitoring(&mut self, location: &Location) {
        let before = self.monitored.len();
        self.monitored.retain(|m| !same_location(&m.location, location));
        if self.monitored.len() < before {
            debug!(name = location.name(), "monitoring stopped");
        }
        if let Some(updates) = &self.updates {
            if matches_key(location, &updates.key) {
                self.updates = None;
            }
        }
    }

    /// The currently monitored locations.
    pub fn monitored_locations(&self) -> Vec<&Location> {
        self.monitored.iter().map(|m| &m.location).collect()
    }

    /// Containment state for a monitored location; `Unknown` when the
    /// location is not monitored.
    pub fn state_for(&self, location: &Location) -> LocationState {
        self.monitored
            .iter()
            .find(|m| same_location(&m.location, location))
            .map(|m| m.state)
            .unwrap_or(LocationState::Unknown)
    }

    /// Containment state looked up by location identifier or name.
    pub fn state_for_key(&self, key: &str) -> LocationState {
        self.monitored
            .iter()
            .find(|m| matches_key(&m.location, key))
            .map(|m| m.state)
            .unwrap_or(LocationState::Unknown)
    }

    /// Starts the delivery of position updates for a location.
    ///
    /// Only one location is served at a time; calling this while updates are
    /// already active has no effect. Without prior monitoring warm-up the
    /// first usable fix is delayed by [`WARM_UP_MS`]; monitoring already
    /// running for this location reduces the delay by its elapsed time.
    pub fn start_position_updates(&mut self, location: Location) {
        if self.updates.is_some() {
            warn!("position updates already in progress, ignoring");
            return;
        }
        let now = self.clock.now_ms();
        let warmed_for = self
            .monitored
            .iter()
            .find(|m| same_location(&m.location, &location))
            .map(|m| now.saturating_sub(m.since_ms))
            .unwrap_or(0);
        let key = key_of(&location);
        self.start_monitoring(location);
        let remaining = WARM_UP_MS.saturating_sub(warmed_for);
        debug!(key, remaining_warm_up_ms = remaining, "position updates started");
        self.updates = Some(PositionUpdates {
            key,
            ready_at_ms: now + remaining,
        });
    }

    /// Stops the delivery of position updates; monitoring continues.
    pub fn stop_position_updates(&mut self) {
        if self.updates.take().is_some() {
            debug!("position updates stopped");
        }
    }

    /// Processes one raw fix delivered by the positioning engine for the
    /// location identified by `key` (identifier or name).
    ///
    /// A usable fix drives the containment state machine (edge-triggered:
    /// observers hear only actual changes) and, when position updates are
    /// active and warmed up for that location, is forwarded as a graded
    /// position. A fix with `Unknown` accuracy never overrides a previously
    /// established state.
    pub fn process_fix(&mut self, key: &str, fix: Fix) {
        if !self.running {
            warn!(key, "fix dropped, manager is not running");
            return;
        }
        let Some(index) = self.monitored.iter().position(|m| matches_key(&m.location, key)) else {
            warn!(key, "fix dropped, location is not monitored");
            return;
        };

        if !fix.accuracy.is_usable() {
            debug!(key, "indeterminate fix, keeping previous state");
            return;
        }

        let (local, orientation) = match &self.alignment {
            Some(t) => (
                t.to_local(Point::new(fix.x, fix.y)),
                fix.orientation.map(|deg| t.to_local_orientation(deg)),
            ),
            None => (Point::new(fix.x, fix.y), fix.orientation),
        };

        let inside = self.monitored[index].location.contains_point(&local);
        let new_state = if inside {
            LocationState::Inside
        } else {
            LocationState::Outside
        };
        if new_state != self.monitored[index].state {
            self.monitored[index].state = new_state;
            debug!(key, ?new_state, "location state changed");
            let location = &self.monitored[index].location;
            for observer in &mut self.observers {
                observer.state_changed(location, new_state);
            }
        }

        let Some(updates) = &self.updates else {
            return;
        };
        if !matches_key(&self.monitored[index].location, &updates.key) {
            return;
        }
        if self.clock.now_ms() < updates.ready_at_ms {
            debug!(key, "fix within warm-up window, not forwarded");
            return;
        }

        let location = &self.monitored[index].location;
        if inside {
            let position = OrientedPoint::from_point(local, orientation);
            for observer in &mut self.observers {
                observer.position_updated(location, position, fix.accuracy);
            }
        } else {
            // The engine produced a position, but it cannot be reconciled
            // with the updates target.
            for observer in &mut self.observers {
                observer.tracking_failed(&IndoorError::PositionOutsideLocation);
            }
        }
    }

    /// Forwards an upstream engine failure to observers as a typed error.
    ///
    /// Surfaced once per occurrence. Monitoring state is not changed and no
    /// retry is attempted here; retry policy belongs to the engine.
    pub fn engine_failed(&mut self, fault: TrackingFault) {
        if !self.running {
            return;
        }
        warn!(fault = fault.description(), "positioning engine failed");
        let error = IndoorError::TrackingUnavailable(fault);
        for observer in &mut self.observers {
            observer.tracking_failed(&error);
        }
    }
}

/// Identifier match when both sides have one, name match otherwise.
fn same_location(a: &Location, b: &Location) -> bool {
    match (a.identifier(), b.identifier()) {
        (Some(x), Some(y)) => x == y,
        _ => a.name() == b.name(),
    }
}

/// The key a fix stream uses for a location: identifier when persisted,
/// name otherwise.
fn key_of(location: &Location) -> String {
    location
        .identifier()
        .unwrap_or(location.name())
        .to_string()
}

fn matches_key(location: &Location, key: &str) -> bool {
    location.identifier() == Some(key) || location.name() == key
}
