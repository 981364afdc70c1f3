//! Decision branch fan-out.
//!
//! Branches of a decision node spread symmetrically around straight down. Spread
//! and reach grow with the branch count so labels stay apart. A branch's slot is
//! the index of its criterion in the criteria list, never creation order.

use crate::{
    geometry::{Footprint, Point, Vector},
    graph::{BranchKey, ConnectionTarget, Graph, NodeId},
};

/// Base direction of the fan, in degrees (y down).
const FAN_BASE_ANGLE: f64 = 90.0;

/// `(spread in degrees, reach in pixels)` for a decision with `n` branches.
pub fn fan_spec(n: usize) -> (f64, f64) {
    match n {
        0 | 1 => (0.0, 200.0),
        2 => (60.0, 200.0),
        3 => (50.0, 230.0),
        4 => (42.0, 250.0),
        5 => (38.0, 270.0),
        _ => (35.0, 290.0),
    }
}

/// Angle in degrees of branch `index` out of `n`.
pub fn branch_angle(
    index: usize,
    n: usize,
) -> f64 {
    let (spread, _) = fan_spec(n);
    let middle = (n.max(1) - 1) as f64 / 2.0;
    FAN_BASE_ANGLE + (index as f64 - middle) * spread
}

/// Endpoint of branch `index` out of `n` around `center`.
pub fn branch_endpoint(
    center: Point,
    index: usize,
    n: usize,
) -> Point {
    let (_, length) = fan_spec(n);
    let theta = branch_angle(index, n).to_radians();
    center + Vector::new(theta.cos(), theta.sin()) * length
}

/// One laid-out branch of a decision node.
#[derive(Debug, Clone, PartialEq)]
pub struct BranchEndpoint {
    pub decision: NodeId,
    pub criteria_id: String,
    pub index: usize,
    pub point: Point,
    pub target: ConnectionTarget,
}

/// Fan-out layout of every branch (bound and pending) of a decision node.
pub fn branch_endpoints(
    graph: &Graph,
    decision: &str,
    footprint: &Footprint,
) -> Vec<BranchEndpoint> {
    let Some(node) = graph.node(decision) else {
        return Vec::new();
    };
    let n = node.criteria().len();
    let center = footprint.center(node.position);
    graph
        .branches(decision)
        .into_iter()
        .filter_map(|(index, c)| {
            c.criteria_id.clone().map(|criteria_id| BranchEndpoint {
                decision: decision.to_string(),
                criteria_id,
                index,
                point: branch_endpoint(center, index, n),
                target: c.to.clone(),
            })
        })
        .collect()
}

/// Fan-out endpoints of every pending placeholder in the graph.
pub fn pending_endpoints(
    graph: &Graph,
    footprint: &Footprint,
) -> Vec<(BranchKey, Point)> {
    graph
        .nodes()
        .iter()
        .filter(|n| n.is_decision())
        .flat_map(|n| branch_endpoints(graph, &n.id, footprint))
        .filter_map(|b| match b.target {
            ConnectionTarget::Pending(key) => Some((key, b.point)),
            ConnectionTarget::Bound(_) => None,
        })
        .collect()
}
