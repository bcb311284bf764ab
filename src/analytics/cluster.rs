use super::geo::haversine_m;
use crate::event::Event;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};

/// A group of co-located detections.
///
/// Membership is transitive over the threshold graph: if A is within the
/// threshold of B and B of C, all three share a cluster even when A and C
/// are further apart than the threshold. The chaining is a design choice,
/// matching how a cordon of nearby sightings reads on a map.
#[derive(Debug, Clone, Serialize)]
pub struct DetectionCluster {
    pub count: usize,
    /// Arithmetic mean of member coordinates (fine at sub-kilometer scale,
    /// not a true spherical centroid)
    pub lat: f64,
    pub lon: f64,
    /// Count per category; unclassified members land under "UNKNOWN"
    pub categories: HashMap<String, usize>,
    #[serde(rename = "latestTs")]
    pub latest_ts: i64,
    /// Member with the greatest timestamp (first seen wins exact ties)
    pub primary: Event,
    pub members: Vec<Event>,
}

/// Groups detections whose positions chain together within `threshold_m`
/// meters, via connected components over the pairwise-distance graph.
///
/// Entries without finite lat/lon are unlocatable: excluded entirely, never
/// reported as singleton clusters. Components of size 1 are dropped. Output
/// is sorted by descending member count; ties keep encounter order.
pub fn cluster_detections(detections: &[Event], threshold_m: f64) -> Vec<DetectionCluster> {
    let nodes: Vec<&Event> = detections.iter().filter(|e| locatable(e)).collect();
    let coords: Vec<(f64, f64)> = nodes
        .iter()
        .map(|e| (e.payload_f64("lat").unwrap(), e.payload_f64("lon").unwrap()))
        .collect();

    let mut visited = vec![false; nodes.len()];
    let mut clusters = Vec::new();

    for start in 0..nodes.len() {
        if visited[start] {
            continue;
        }
        visited[start] = true;

        // BFS from the seed; only the resulting partition matters, not the
        // traversal order
        let mut component = vec![start];
        let mut queue = VecDeque::from([start]);
        while let Some(i) = queue.pop_front() {
            for j in 0..nodes.len() {
                if visited[j] {
                    continue;
                }
                let (lat_i, lon_i) = coords[i];
                let (lat_j, lon_j) = coords[j];
                if haversine_m(lat_i, lon_i, lat_j, lon_j) <= threshold_m {
                    visited[j] = true;
                    component.push(j);
                    queue.push_back(j);
                }
            }
        }

        if component.len() >= 2 {
            clusters.push(summarize(&component, &nodes));
        }
    }

    // sort is stable: equal counts keep encounter order
    clusters.sort_by(|a, b| b.count.cmp(&a.count));
    clusters
}

fn locatable(event: &Event) -> bool {
    event.payload_f64("lat").is_some() && event.payload_f64("lon").is_some()
}

fn summarize(component: &[usize], nodes: &[&Event]) -> DetectionCluster {
    let members: Vec<Event> = component.iter().map(|&i| nodes[i].clone()).collect();
    let count = members.len();

    let mut lat_sum = 0.0;
    let mut lon_sum = 0.0;
    let mut categories: HashMap<String, usize> = HashMap::new();
    for member in &members {
        lat_sum += member.payload_f64("lat").unwrap_or(0.0);
        lon_sum += member.payload_f64("lon").unwrap_or(0.0);

        let category = member
            .payload_str("category")
            .filter(|c| !c.is_empty())
            .unwrap_or("UNKNOWN");
        *categories.entry(category.to_string()).or_insert(0) += 1;
    }

    let mut primary = &members[0];
    for member in &members[1..] {
        if member.timestamp > primary.timestamp {
            primary = member;
        }
    }
    let primary = primary.clone();

    DetectionCluster {
        count,
        lat: lat_sum / count as f64,
        lon: lon_sum / count as f64,
        categories,
        latest_ts: primary.timestamp,
        primary,
        members,
    }
}
