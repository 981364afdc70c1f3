//! Snap detection for a node being placed or dragged.
//!
//! Two detectors run against the candidate node's center:
//!
//! - line-snap: near the middle part of a bound connection, offering "insert between"
//! - endpoint-snap: near a pending branch endpoint, offering "attach here"
//!
//! Line-snap wins when both qualify.

use serde::Serialize;

use crate::{
    SnapConfig,
    geometry::{Footprint, Point, pending_endpoints, place_ports},
    graph::{BranchKey, Graph, NodeId, NodeKind},
};

/// A drawn bound connection, from the output port to the input port.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub from: NodeId,
    pub to: NodeId,
    pub a: Point,
    pub b: Point,
}

/// Segments of all bound connections.
pub fn bound_segments(
    graph: &Graph,
    footprint: &Footprint,
) -> Vec<Segment> {
    graph
        .connections()
        .iter()
        .filter_map(|c| {
            let to = c.to.node_id()?;
            let from_node = graph.node(&c.from)?;
            let to_node = graph.node(to)?;
            let ports = place_ports(from_node.position, to_node.position, footprint);
            Some(Segment {
                from: c.from.clone(),
                to: to.clone(),
                a: ports.output,
                b: ports.input,
            })
        })
        .collect()
}

/// Projects `p` onto segment `a`-`b`. Returns the parameter `t` (0 at `a`, 1 at `b`),
/// the perpendicular distance and the projected point. Degenerate segments yield `None`.
pub fn project_onto_segment(
    p: Point,
    a: Point,
    b: Point,
) -> Option<(f64, f64, Point)> {
    let ab = b - a;
    let len2 = ab.square_length();
    if len2 <= f64::EPSILON {
        return None;
    }
    let t = (p - a).dot(ab) / len2;
    let foot = a + ab * t;
    Some((t, (p - foot).length(), foot))
}

/// Attach target offered to a dragged or placed node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SnapTarget {
    /// Insert between the two ends of a bound connection, centered on `point`.
    Line {
        from: NodeId,
        to: NodeId,
        #[serde(skip)]
        point: Point,
        t: f64,
        distance: f64,
    },
    /// Bind a pending branch, centered on its endpoint `point`.
    Endpoint {
        key: BranchKey,
        #[serde(skip)]
        point: Point,
        distance: f64,
    },
}

impl SnapTarget {
    /// Where the snapped node's center goes.
    pub fn point(&self) -> Point {
        match self {
            SnapTarget::Line {
                point, ..
            } => *point,
            SnapTarget::Endpoint {
                point, ..
            } => *point,
        }
    }
}

/// The node snaps are evaluated for.
#[derive(Debug, Clone, Copy)]
pub struct SnapCandidate<'a> {
    /// id of an existing node being dragged, `None` for a palette drop
    pub id: Option<&'a str>,
    pub kind: NodeKind,
    pub center: Point,
}

#[derive(Debug, Clone, Copy)]
pub struct SnapDetector {
    config: SnapConfig,
    footprint: Footprint,
}

impl SnapDetector {
    pub fn new(
        config: SnapConfig,
        footprint: Footprint,
    ) -> Self {
        Self {
            config,
            footprint,
        }
    }

    pub fn detect(
        &self,
        graph: &Graph,
        candidate: &SnapCandidate<'_>,
    ) -> Option<SnapTarget> {
        if candidate.kind == NodeKind::Start {
            return None;
        }
        self.detect_line(graph, candidate).or_else(|| self.detect_endpoint(graph, candidate))
    }

    /// Nearest qualifying bound segment. The exclusion zone at each end is open:
    /// `t` must lie strictly between `line_exclusion` and `1 - line_exclusion`.
    pub fn detect_line(
        &self,
        graph: &Graph,
        candidate: &SnapCandidate<'_>,
    ) -> Option<SnapTarget> {
        // decision nodes own their branches and cannot sit inside a connection
        if candidate.kind == NodeKind::Decision {
            return None;
        }
        let t_min = self.config.line_exclusion;
        let t_max = 1.0 - self.config.line_exclusion;
        bound_segments(graph, &self.footprint)
            .into_iter()
            .filter(|s| match candidate.id {
                Some(id) => s.from != id && s.to != id && graph.validate_link(&s.from, id).is_ok() && graph.validate_link(id, &s.to).is_ok(),
                None => true,
            })
            .filter_map(|s| {
                let (t, distance, point) = project_onto_segment(candidate.center, s.a, s.b)?;
                (t > t_min && t < t_max && distance <= self.config.line_distance).then_some(SnapTarget::Line {
                    from: s.from,
                    to: s.to,
                    point,
                    t,
                    distance,
                })
            })
            .min_by(|a, b| distance_of(a).total_cmp(&distance_of(b)))
    }

    /// Nearest pending branch endpoint within `endpoint_radius`.
    pub fn detect_endpoint(
        &self,
        graph: &Graph,
        candidate: &SnapCandidate<'_>,
    ) -> Option<SnapTarget> {
        pending_endpoints(graph, &self.footprint)
            .into_iter()
            .filter(|(key, _)| match candidate.id {
                Some(id) => key.node != id && graph.validate_link(&key.node, id).is_ok(),
                None => true,
            })
            .filter_map(|(key, point)| {
                let distance = (candidate.center - point).length();
                (distance <= self.config.endpoint_radius).then_some(SnapTarget::Endpoint {
                    key,
                    point,
                    distance,
                })
            })
            .min_by(|a, b| distance_of(a).total_cmp(&distance_of(b)))
    }
}

fn distance_of(target: &SnapTarget) -> f64 {
    match target {
        SnapTarget::Line {
            distance, ..
        } => *distance,
        SnapTarget::Endpoint {
            distance, ..
        } => *distance,
    }
}
