//! Indoor location demo.
//!
//! Builds the documented square location, starts monitoring, and replays a
//! short synthetic fix sequence to show the state machine and warm-up gating
//! at work; the crate's debug logs show the gating decision for each fix.
//! For library use, see lib.rs.

use indoor_location::{
    Fix, IndoorLocationManager, IndoorObserver, Location, LocationBuilder, LocationRecord,
    LocationState, OrientedPoint, Point, PositionAccuracy, Side,
};

fn setup_logging() {
    use tracing_subscriber::prelude::*;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,indoor_location=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

struct Printer;

impl IndoorObserver for Printer {
    fn position_updated(
        &mut self,
        location: &Location,
        position: OrientedPoint,
        accuracy: PositionAccuracy,
    ) {
        println!(
            "position in {}: ({:.2}, {:.2}) accuracy {:?}",
            location.name(),
            position.x(),
            position.y(),
            accuracy
        );
    }

    fn state_changed(&mut self, location: &Location, state: LocationState) {
        println!("state of {}: {:?}", location.name(), state);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_logging();

    let mut builder = LocationBuilder::new();
    builder.set_boundary_points(vec![
        Point::new(0.0, 0.0),
        Point::new(0.0, 5.0),
        Point::new(5.0, 5.0),
        Point::new(5.0, 0.0),
    ])?;
    builder.set_name("demo office");
    builder.set_orientation(0.0);
    builder.add_beacon("63d4819e6a1d", 0, 2.0, Side::Left)?;
    builder.add_door(1.0, 3, 2.0, Side::Left)?;
    let location = builder.build()?;

    println!(
        "built {:?}: area {:.1} m², {} boundary segments, {} beacons",
        location.name(),
        location.area(),
        location.boundary_segments().len(),
        location.beacons().len()
    );
    println!("as record: {}", LocationRecord::from(&location).to_json()?);

    let mut manager = IndoorLocationManager::new();
    manager.add_observer(Box::new(Printer));
    manager.start_monitoring(location.clone());
    manager.start_position_updates(location);

    // A walk from outside, through the room, and back out.
    let path = [
        (-1.0, 2.5, PositionAccuracy::Low),
        (0.5, 2.5, PositionAccuracy::Medium),
        (2.5, 2.5, PositionAccuracy::High),
        (4.5, 2.5, PositionAccuracy::High),
        (5.5, 2.5, PositionAccuracy::Medium),
    ];
    for (i, (x, y, accuracy)) in path.into_iter().enumerate() {
        manager.process_fix("demo office", Fix::new(x, y, accuracy, i as u64 * 1000));
    }

    manager.stop();
    Ok(())
}
