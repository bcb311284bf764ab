// Derived analytics over event snapshots.
// Read-only: these functions never mutate store state, they produce new
// structures recomputed on demand.

mod cluster;
mod fleet;
mod geo;

pub use cluster::{cluster_detections, DetectionCluster};
pub use fleet::latest_by_drone;
pub use geo::haversine_m;
