use crate::harness::TestHarness;

use taskgraph_canvas::canvas::{CanvasEffect, CanvasIntent};

#[test]
fn large_graph_small_viewport_virtualizes() {
    // 600 nodes against the default threshold of 500, default camera over a
    // corner of the seed grid: virtualized, strictly fewer than 600 drawn.
    let mut harness = TestHarness::new();
    harness.rebuild_chain(600);

    let scene = harness.canvas.scene();
    assert!(scene.is_virtualized);
    assert!(scene.nodes.len() < 600);
    assert!(!scene.nodes.is_empty());
}

#[test]
fn scene_edges_never_dangle() {
    let mut harness = TestHarness::new();
    harness.rebuild_chain(600);

    let scene = harness.canvas.scene();
    let drawn: std::collections::HashSet<&str> =
        scene.nodes.iter().map(|n| n.id.as_str()).collect();
    for edge in &scene.edges {
        let (_, record) = harness.canvas.graph().edge_by_id(&edge.id).unwrap();
        assert!(drawn.contains(record.predecessor_id.as_str()));
        assert!(drawn.contains(record.successor_id.as_str()));
    }
}

#[test]
fn small_graph_is_not_virtualized() {
    let mut harness = TestHarness::new();
    harness.rebuild_chain(50);
    let scene = harness.canvas.scene();
    assert!(!scene.is_virtualized);
    assert_eq!(scene.nodes.len(), 50);
    assert_eq!(scene.edges.len(), 49);
}

#[test]
fn progressive_reveal_converges_over_frame_ticks() {
    let mut harness = TestHarness::new();
    harness.rebuild_chain(600);
    // Fit the whole graph on screen: virtualization passes everything
    // through and progressive reveal takes over.
    harness.canvas.apply(CanvasIntent::FitToScreen);

    let first = harness.canvas.scene();
    assert!(first.nodes.len() < 600);
    assert!(first.progress < 100);
    assert!(harness
        .canvas
        .drain_effects()
        .contains(&CanvasEffect::ScheduleFrame));

    let mut last_progress = first.progress;
    let mut frames = 0;
    loop {
        harness.canvas.apply(CanvasIntent::FrameTick);
        let scene = harness.canvas.scene();
        assert!(scene.progress >= last_progress, "progress went backwards");
        last_progress = scene.progress;
        harness.canvas.drain_effects();
        frames += 1;
        assert!(frames < 100, "progressive reveal failed to converge");
        if scene.progress == 100 {
            assert_eq!(scene.nodes.len(), 600);
            assert_eq!(scene.edges.len(), 599);
            break;
        }
    }
}

#[test]
fn panning_updates_the_visible_subset() {
    let mut harness = TestHarness::new();
    harness.rebuild_chain(600);

    let before = harness.canvas.scene();
    let first_ids: Vec<String> = before.nodes.iter().map(|n| n.id.clone()).collect();

    // Pan far down the seed grid; the visible window slides to other rows.
    harness.canvas.apply(CanvasIntent::Pan {
        delta: euclid::default::Vector2D::new(0.0, -5000.0),
    });
    harness.canvas.drain_effects();
    let after = harness.canvas.scene();
    let after_ids: Vec<String> = after.nodes.iter().map(|n| n.id.clone()).collect();
    assert_ne!(first_ids, after_ids);
}
