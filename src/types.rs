//! Domain vocabulary for the monitoring and positioning pipeline.
//!
//! Every concept that crosses the boundary between the external positioning
//! engine and the core gets a type: raw fixes, accuracy grades, containment
//! states, engine modes, and fault reasons. Never raw tuples across
//! boundaries.

use serde::{Deserialize, Serialize};

/// A single raw position sample from the external positioning engine.
///
/// This is the minimal input contract: a position in the engine's reporting
/// frame, an optional device orientation, an accuracy grade, and a monotonic
/// timestamp. The core never interprets how the engine produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fix {
    /// X coordinate in meters, in the engine's reporting frame.
    pub x: f64,
    /// Y coordinate in meters, in the engine's reporting frame.
    pub y: f64,
    /// Device orientation in degrees, clockwise, if the engine knows it.
    pub orientation: Option<f64>,
    /// Accuracy grade assigned by the engine.
    pub accuracy: PositionAccuracy,
    /// Monotonic timestamp in milliseconds.
    pub timestamp_ms: u64,
}

impl Fix {
    /// Creates a fix with the given coordinates, accuracy and timestamp.
    pub fn new(x: f64, y: f64, accuracy: PositionAccuracy, timestamp_ms: u64) -> Self {
        Self {
            x,
            y,
            orientation: None,
            accuracy,
            timestamp_ms,
        }
    }

    /// Creates a fix that also carries a device orientation.
    pub fn with_orientation(
        x: f64,
        y: f64,
        orientation: f64,
        accuracy: PositionAccuracy,
        timestamp_ms: u64,
    ) -> Self {
        Self {
            x,
            y,
            orientation: Some(orientation),
            accuracy,
            timestamp_ms,
        }
    }
}

/// Accuracy of a determined position.
///
/// Accuracy is a circle of a given radius within which the real position is
/// expected to be. The ordinal order is `VeryHigh(0) < High(1) < Medium(2) <
/// Low(3) < VeryLow(4) < Unknown(5)`; radius bounds are approximate and used
/// by callers for display, never by the state machine for gating beyond the
/// usable/unusable split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PositionAccuracy {
    /// The algorithm is highly certain about the determined position (< 1 m).
    VeryHigh = 0,
    /// High accuracy (< 1.62 m).
    High = 1,
    /// Medium accuracy (< 2.62 m).
    Medium = 2,
    /// Low accuracy (< 4.24 m).
    Low = 3,
    /// Very low accuracy, typical of the initialization phase; comparable to
    /// the location size.
    VeryLow = 4,
    /// Accuracy is unknown.
    Unknown = 5,
}

impl PositionAccuracy {
    /// Approximate upper bound of the accuracy radius in meters, when one is
    /// defined for the grade.
    pub fn max_radius(&self) -> Option<f64> {
        match self {
            PositionAccuracy::VeryHigh => Some(1.0),
            PositionAccuracy::High => Some(1.62),
            PositionAccuracy::Medium => Some(2.62),
            PositionAccuracy::Low => Some(4.24),
            PositionAccuracy::VeryLow | PositionAccuracy::Unknown => None,
        }
    }

    /// Classifies an accuracy radius reported in meters into a grade.
    pub fn from_radius(radius_m: f64) -> Self {
        match radius_m {
            r if r < 1.0 => PositionAccuracy::VeryHigh,
            r if r < 1.62 => PositionAccuracy::High,
            r if r < 2.62 => PositionAccuracy::Medium,
            r if r < 4.24 => PositionAccuracy::Low,
            _ => PositionAccuracy::VeryLow,
        }
    }

    /// Whether a fix with this accuracy can drive state and position updates.
    ///
    /// An `Unknown` grade classifies the fix as indeterminate: it never
    /// overrides a previously established inside/outside state.
    pub fn is_usable(&self) -> bool {
        !matches!(self, PositionAccuracy::Unknown)
    }
}

/// Containment state of a monitored location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LocationState {
    /// The state of the monitored location has not been determined yet.
    Unknown,
    /// The tracked device is inside the location.
    Inside,
    /// The tracked device is outside the location.
    Outside,
}

/// Delivery mode hint passed to the external positioning engine.
///
/// A hint, not a contract the core implements: the engine decides what the
/// mode means for its sensor mix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PositioningMode {
    /// Stable and responsive updates, compatible with all devices.
    #[default]
    Standard,
    /// More responsive updates backed by inertial sensors.
    InertiaAssisted,
    /// Hyper-precise updates backed by a camera-tracking subsystem.
    CameraAssisted,
}

/// Reason the upstream tracking stack is unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackingFault {
    /// The radio is powered off.
    RadioPoweredOff,
    /// The application is not authorized to use the radio.
    Unauthorized,
    /// The platform does not support the required radio.
    Unsupported,
    /// A local sensor failed to initialize or has a hardware problem.
    SensorInitFailed,
    /// An unclassified upstream failure.
    Generic,
}

impl TrackingFault {
    /// Human-readable description of the fault.
    pub fn description(&self) -> &'static str {
        match self {
            TrackingFault::RadioPoweredOff => "radio is powered off",
            TrackingFault::Unauthorized => "not authorized to use the radio",
            TrackingFault::Unsupported => "radio is not supported on this platform",
            TrackingFault::SensorInitFailed => "local sensor failed to initialize",
            TrackingFault::Generic => "unclassified tracking failure",
        }
    }
}

/// Color of a positioned beacon's enclosure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BeaconColor {
    /// Color is not known.
    #[default]
    Unknown,
    MintCocktail,
    IcyMarshmallow,
    BlueberryPie,
    SweetBeetroot,
    CandyFloss,
    LemonTart,
    White,
    Black,
    CoconutPuff,
    Transparent,
}
