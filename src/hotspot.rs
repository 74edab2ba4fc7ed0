//! Hotspot detection: density clusters of request locations.
//!
//! Uses DBSCAN over raw (lat, lng) degrees. At the default `eps` of 0.01
//! degrees two requests roughly a kilometre apart end up in one hotspot.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::domain::location::Location;
use crate::domain::request::{EmergencyRequest, Priority, RequestId};

/// Default neighbourhood radius in degrees.
pub const DEFAULT_EPS: f64 = 0.01;

/// Default number of requests (including the point itself) that make a
/// neighbourhood dense.
pub const DEFAULT_MIN_SAMPLES: usize = 2;

/// A dense group of requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotspot {
    /// Discovery order, starting at 0.
    pub cluster_id: usize,
    /// Mean position of the members.
    pub centroid: Location,
    pub request_ids: Vec<RequestId>,
    /// Most urgent member priority.
    pub priority: Priority,
}

/// Cluster `requests`, dropping noise points.
///
/// Returns nothing when fewer than two requests are given.
pub fn cluster(requests: &[&EmergencyRequest], eps: f64, min_samples: usize) -> Vec<Hotspot> {
    if requests.len() < 2 {
        return Vec::new();
    }
    let min_samples = min_samples.max(1);
    let neighbours = |i: usize| -> Vec<usize> {
        let here = requests[i].location;
        (0..requests.len())
            .filter(|&j| here.degrees_to(&requests[j].location) <= eps)
            .collect()
    };

    let mut labels: Vec<Option<usize>> = vec![None; requests.len()];
    let mut next_cluster = 0;

    for i in 0..requests.len() {
        if labels[i].is_some() {
            continue;
        }
        let seeds = neighbours(i);
        if seeds.len() < min_samples {
            // Noise for now; a later core point may still claim it.
            continue;
        }
        let cluster_id = next_cluster;
        next_cluster += 1;
        labels[i] = Some(cluster_id);

        let mut queue: VecDeque<usize> = seeds.into();
        while let Some(j) = queue.pop_front() {
            if labels[j].is_some() {
                continue;
            }
            labels[j] = Some(cluster_id);
            let reach = neighbours(j);
            if reach.len() >= min_samples {
                queue.extend(reach.into_iter().filter(|&k| labels[k].is_none()));
            }
        }
    }

    (0..next_cluster)
        .filter_map(|cluster_id| {
            let members: Vec<&EmergencyRequest> = requests
                .iter()
                .zip(&labels)
                .filter(|(_, label)| **label == Some(cluster_id))
                .map(|(r, _)| *r)
                .collect();
            summarize(cluster_id, &members)
        })
        .collect()
}

fn summarize(cluster_id: usize, members: &[&EmergencyRequest]) -> Option<Hotspot> {
    let priority = members.iter().map(|r| r.priority).max()?;
    let n = members.len() as f64;
    let lat = members.iter().map(|r| r.location.lat).sum::<f64>() / n;
    let lng = members.iter().map(|r| r.location.lng).sum::<f64>() / n;
    Some(Hotspot {
        cluster_id,
        centroid: Location::new(lat, lng),
        request_ids: members.iter().map(|r| r.id).collect(),
        priority,
    })
}
