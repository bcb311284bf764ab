use crate::event::Event;
use std::collections::HashMap;

/// Folds a telemetry snapshot into the latest known event per drone id.
///
/// Single pass; the greatest timestamp wins and an exact timestamp tie
/// keeps whichever event was scanned later. Events without a resolvable
/// `drone_id` are skipped.
pub fn latest_by_drone(events: &[Event]) -> HashMap<String, Event> {
    let mut latest: HashMap<String, Event> = HashMap::new();

    for event in events {
        let Some(drone_id) = event.payload_str("drone_id") else {
            continue;
        };
        match latest.get(drone_id) {
            Some(current) if current.timestamp > event.timestamp => {}
            _ => {
                latest.insert(drone_id.to_string(), event.clone());
            }
        }
    }

    latest
}
