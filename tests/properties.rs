use flowcanvas::{
    geometry::{Footprint, Side, place_ports},
    graph::{ConnectionTarget, DecisionType, Graph, Node, NodeKind, Position, START_NODE_ID},
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    AddNode(u8, i32, i32),
    RemoveNode(usize),
    Connect(usize, usize),
    Disconnect(usize),
    SetDecisionType(usize, u8),
    AddCriterion(usize),
    RemoveCriterion(usize, usize),
    BindPending(usize, usize),
    InsertBetween(usize, usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0u8..7, -500i32..500, -500i32..500).prop_map(|(k, x, y)| Op::AddNode(k, x, y)),
        1 => any::<usize>().prop_map(Op::RemoveNode),
        3 => (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Op::Connect(a, b)),
        1 => any::<usize>().prop_map(Op::Disconnect),
        1 => (any::<usize>(), 0u8..3).prop_map(|(a, t)| Op::SetDecisionType(a, t)),
        1 => any::<usize>().prop_map(Op::AddCriterion),
        1 => (any::<usize>(), any::<usize>()).prop_map(|(a, c)| Op::RemoveCriterion(a, c)),
        2 => (any::<usize>(), any::<usize>()).prop_map(|(p, n)| Op::BindPending(p, n)),
        2 => (any::<usize>(), any::<usize>()).prop_map(|(c, n)| Op::InsertBetween(c, n)),
    ]
}

const KINDS: [NodeKind; 7] = [NodeKind::Start, NodeKind::End, NodeKind::Task, NodeKind::Decision, NodeKind::Input, NodeKind::Document, NodeKind::Action];

fn pick<T: Clone>(
    items: &[T],
    i: usize,
) -> Option<T> {
    (!items.is_empty()).then(|| items[i % items.len()].clone())
}

fn apply(
    graph: &mut Graph,
    op: &Op,
    counter: &mut usize,
) -> Option<flowcanvas::Result<()>> {
    let ids: Vec<String> = graph.nodes().iter().map(|n| n.id.clone()).collect();
    let decisions: Vec<String> = graph.nodes().iter().filter(|n| n.is_decision()).map(|n| n.id.clone()).collect();
    Some(match op {
        Op::AddNode(k, x, y) => {
            *counter += 1;
            graph.add_node(Node::new(format!("n{}", counter), KINDS[*k as usize], "N", Position::new(*x, *y)))
        }
        Op::RemoveNode(i) => graph.remove_node(&pick(&ids, *i)?).map(|_| ()),
        Op::Connect(a, b) => graph.add_connection(&pick(&ids, *a)?, ConnectionTarget::bound(pick(&ids, *b)?), None, None),
        Op::Disconnect(i) => {
            let c = pick(graph.connections(), *i)?;
            graph.remove_connection(&c.from, &c.to).map(|_| ())
        }
        Op::SetDecisionType(a, t) => {
            let t = [DecisionType::YesNo, DecisionType::ApproveReject, DecisionType::Custom][*t as usize];
            graph.set_decision_type(&pick(&decisions, *a)?, t)
        }
        Op::AddCriterion(a) => graph.add_criterion(&pick(&decisions, *a)?, "Option").map(|_| ()),
        Op::RemoveCriterion(a, c) => {
            let d = pick(&decisions, *a)?;
            let criteria: Vec<String> = graph.node(&d)?.criteria().iter().map(|c| c.id.clone()).collect();
            graph.remove_criterion(&d, &pick(&criteria, *c)?)
        }
        Op::BindPending(p, n) => {
            let pending: Vec<_> = graph.pending_branches().cloned().collect();
            graph.bind_pending(&pick(&pending, *p)?, &pick(&ids, *n)?)
        }
        Op::InsertBetween(c, n) => {
            let c = pick(graph.connections(), *c)?;
            graph.insert_between(&c.from, &c.to, &pick(&ids, *n)?)
        }
    })
}

fn assert_invariants(graph: &Graph) {
    assert!(graph.check_invariants().is_ok(), "{:?}", graph.check_invariants());
    assert_eq!(graph.nodes().iter().filter(|n| n.kind == NodeKind::Start).count(), 1);
    assert!(graph.contains(START_NODE_ID));
    for c in graph.connections() {
        assert!(graph.contains(&c.from));
        if let Some(to) = c.to.node_id() {
            assert!(graph.contains(to));
            assert_ne!(to, START_NODE_ID);
            assert_ne!(to, &c.from);
        }
    }
    for node in graph.nodes().iter().filter(|n| n.is_decision()) {
        let mut criteria: Vec<&str> = node.criteria().iter().map(|c| c.id.as_str()).collect();
        let mut branches: Vec<&str> = graph.outgoing(&node.id).filter_map(|c| c.criteria_id.as_deref()).collect();
        assert_eq!(graph.outgoing(&node.id).count(), criteria.len());
        criteria.sort();
        branches.sort();
        assert_eq!(criteria, branches);
    }
}

proptest! {
    #[test]
    fn graph_invariants_hold_under_random_edits(ops in prop::collection::vec(op(), 1..60)) {
        let mut graph = Graph::new();
        let mut counter = 0;
        for op in &ops {
            let before = graph.clone();
            if let Some(Err(_)) = apply(&mut graph, op, &mut counter) {
                // rejected edits leave nothing behind
                prop_assert_eq!(&graph, &before);
            }
            assert_invariants(&graph);
        }
    }

    #[test]
    fn start_node_is_never_removable(ops in prop::collection::vec(op(), 0..30)) {
        let mut graph = Graph::new();
        let mut counter = 0;
        for op in &ops {
            apply(&mut graph, op, &mut counter);
        }
        prop_assert!(graph.remove_node(START_NODE_ID).is_err());
        prop_assert!(graph.remove_nodes(&[START_NODE_ID.to_string()]).is_err());
    }

    #[test]
    fn ports_mirror_each_other(ax in -1000i32..1000, ay in -1000i32..1000, bx in -1000i32..1000, by in -1000i32..1000) {
        let (from, to) = (Position::new(ax, ay), Position::new(bx, by));
        prop_assume!(from != to);
        let fp = Footprint::default();
        let ports = place_ports(from, to, &fp);
        prop_assert_eq!(ports.input_side, ports.output_side.opposite());
        prop_assert_eq!(ports.output, fp.side_midpoint(from, ports.output_side));
        prop_assert_eq!(ports.input, fp.side_midpoint(to, ports.input_side));

        // off the diagonals the direction is unambiguous, so the reverse link agrees
        prop_assume!((bx - ax).abs() != (by - ay).abs());
        let back = place_ports(to, from, &fp);
        prop_assert_eq!(back.output_side, ports.input_side);
        prop_assert_eq!(back.input_side, ports.output_side);
    }

    #[test]
    fn side_bands_are_mirrored(a in -720.0f64..720.0) {
        let s = Side::from_angle(a);
        // stay clear of band edges where adding 180 rounds across them
        let edge = ((a.rem_euclid(90.0)) - 45.0).abs();
        prop_assume!(edge > 1e-6);
        prop_assert_eq!(Side::from_angle(a + 180.0), s.opposite());
    }

    #[test]
    fn drag_translation_is_rigid(dx in -500.0f64..500.0, dy in -500.0f64..500.0, xs in prop::collection::vec((-1000i32..1000, -1000i32..1000), 1..8)) {
        let delta = flowcanvas::geometry::Vector::new(dx, dy);
        let moved: Vec<(Position, Position)> = xs.iter().map(|(x, y)| {
            let p = Position::new(*x, *y);
            (p, p.translate(delta))
        }).collect();
        let (p0, q0) = moved[0];
        for (p, q) in &moved {
            prop_assert_eq!(q.x() - p.x(), q0.x() - p0.x());
            prop_assert_eq!(q.y() - p.y(), q0.y() - p0.y());
        }
    }
}
