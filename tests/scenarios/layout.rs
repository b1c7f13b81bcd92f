use crate::harness::TestHarness;

use std::collections::HashMap;

use euclid::default::Point2D;
use taskgraph_canvas::canvas::{CanvasEffect, CanvasIntent};
use taskgraph_canvas::layout::{LayoutAlgorithmKind, LayoutDirection, LayoutPhase};

fn request_constraint(harness: &mut TestHarness) -> u64 {
    harness.canvas.apply(CanvasIntent::RequestLayout {
        algorithm: LayoutAlgorithmKind::Constraint,
        direction: LayoutDirection::TopDown,
    });
    let effects = harness.canvas.drain_effects();
    effects
        .iter()
        .find_map(|e| match e {
            CanvasEffect::SolveLayout { request } => Some(request.seq),
            _ => None,
        })
        .expect("expected a solve request")
}

#[test]
fn rejected_solver_falls_back_to_layered_and_ends_applied() {
    let mut harness = TestHarness::new();
    harness.rebuild(&["a", "b", "c"], &[("d1", "a", "b"), ("d2", "b", "c")]);
    let seq = request_constraint(&mut harness);

    harness.canvas.apply(CanvasIntent::LayoutSolved {
        seq,
        result: Err("solver rejected the model".to_string()),
    });

    assert_eq!(
        *harness.canvas.layout_phase(),
        LayoutPhase::Applied {
            algorithm: LayoutAlgorithmKind::Layered
        }
    );
    // Layered fallback positions: the chain advances down the primary axis.
    let graph = harness.canvas.graph();
    let a = graph.node_by_id("a").unwrap().1.position;
    let b = graph.node_by_id("b").unwrap().1.position;
    let c = graph.node_by_id("c").unwrap().1.position;
    assert!(a.y < b.y && b.y < c.y);
    assert!(harness
        .canvas
        .drain_effects()
        .iter()
        .all(|e| !matches!(e, CanvasEffect::LayoutFailed { .. })));
}

#[test]
fn successful_solve_applies_positions_and_fits_the_view() {
    let mut harness = TestHarness::new();
    harness.rebuild(&["a", "b"], &[("d1", "a", "b")]);
    let seq = request_constraint(&mut harness);

    let mut positions = HashMap::new();
    positions.insert("a".to_string(), Point2D::new(-300.0, 40.0));
    positions.insert("b".to_string(), Point2D::new(300.0, 40.0));
    harness.canvas.apply(CanvasIntent::LayoutSolved {
        seq,
        result: Ok(positions),
    });

    let graph = harness.canvas.graph();
    assert_eq!(
        graph.node_by_id("a").unwrap().1.position,
        Point2D::new(-300.0, 40.0)
    );
    assert_eq!(
        *harness.canvas.layout_phase(),
        LayoutPhase::Applied {
            algorithm: LayoutAlgorithmKind::Constraint
        }
    );
    // Fit-to-screen ran: the whole graph sits inside the visible rect.
    let visible = harness.canvas.viewport().visible_rect();
    let bounds = graph.bounding_rect().unwrap();
    assert!(visible.origin.x <= bounds.origin.x);
    assert!(visible.max_x() >= bounds.max_x());
}

#[test]
fn solve_result_after_rebuild_is_discarded() {
    let mut harness = TestHarness::new();
    harness.rebuild(&["a", "b"], &[]);
    let seq = request_constraint(&mut harness);

    // Feed refresh invalidates the in-flight snapshot.
    harness.rebuild(&["a", "b"], &[]);
    let before = harness.canvas.graph().node_by_id("a").unwrap().1.position;

    let mut positions = HashMap::new();
    positions.insert("a".to_string(), Point2D::new(-9999.0, -9999.0));
    harness.canvas.apply(CanvasIntent::LayoutSolved {
        seq,
        result: Ok(positions),
    });

    assert_eq!(
        harness.canvas.graph().node_by_id("a").unwrap().1.position,
        before
    );
    assert_eq!(*harness.canvas.layout_phase(), LayoutPhase::Idle);
}

#[test]
fn newer_request_supersedes_the_older_one() {
    let mut harness = TestHarness::new();
    harness.rebuild(&["a"], &[]);
    let first = request_constraint(&mut harness);
    let second = request_constraint(&mut harness);
    assert!(second > first);

    let mut stale = HashMap::new();
    stale.insert("a".to_string(), Point2D::new(-1.0, -1.0));
    harness.canvas.apply(CanvasIntent::LayoutSolved {
        seq: first,
        result: Ok(stale),
    });
    // Stale result ignored; the newer request is still computing.
    assert!(matches!(
        harness.canvas.layout_phase(),
        LayoutPhase::Computing { .. }
    ));

    let mut fresh = HashMap::new();
    fresh.insert("a".to_string(), Point2D::new(5.0, 5.0));
    harness.canvas.apply(CanvasIntent::LayoutSolved {
        seq: second,
        result: Ok(fresh),
    });
    assert_eq!(
        harness.canvas.graph().node_by_id("a").unwrap().1.position,
        Point2D::new(5.0, 5.0)
    );
}

#[test]
fn layout_reclaims_user_positioned_nodes() {
    let mut harness = TestHarness::new();
    harness.rebuild(&["a", "b"], &[("d1", "a", "b")]);
    harness.canvas.apply(CanvasIntent::DragNode {
        id: "a".to_string(),
        position: Point2D::new(777.0, 777.0),
    });
    assert!(harness.canvas.graph().node_by_id("a").unwrap().1.user_positioned);

    harness.canvas.apply(CanvasIntent::RequestLayout {
        algorithm: LayoutAlgorithmKind::Layered,
        direction: LayoutDirection::LeftRight,
    });
    let (_, node) = harness.canvas.graph().node_by_id("a").unwrap();
    assert!(!node.user_positioned);
    assert_ne!(node.position, Point2D::new(777.0, 777.0));
}
