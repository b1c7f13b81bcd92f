use crate::harness::TestHarness;

use taskgraph_canvas::canvas::{CanvasEffect, CanvasIntent};
use taskgraph_canvas::graph::DependencyKind;

fn select_all_three(harness: &mut TestHarness) {
    harness.rebuild(
        &["a", "b", "c", "d"],
        &[("d1", "a", "b"), ("d2", "b", "c"), ("d3", "c", "d")],
    );
    for id in ["d1", "d2", "d3"] {
        harness.canvas.apply(CanvasIntent::ClickEdge {
            id: id.to_string(),
            multi: true,
        });
    }
    assert_eq!(harness.canvas.selection().len(), 3);
}

#[test]
fn bulk_delete_partial_failure_keeps_the_failing_edge() {
    let mut harness = TestHarness::new();
    select_all_three(&mut harness);

    harness.canvas.apply(CanvasIntent::DeleteKey);
    let effects = harness.canvas.drain_effects();
    assert!(effects.contains(&CanvasEffect::RequestDeleteConfirmation { count: 3 }));

    harness.canvas.apply(CanvasIntent::ConfirmBulkDelete);
    let effects = harness.canvas.drain_effects();
    let delete_count = effects
        .iter()
        .filter(|e| matches!(e, CanvasEffect::DeleteDependency { .. }))
        .count();
    assert_eq!(delete_count, 3);

    harness.canvas.apply(CanvasIntent::DeleteCompleted {
        id: "d1".to_string(),
        result: Ok(()),
    });
    harness.canvas.apply(CanvasIntent::DeleteCompleted {
        id: "d2".to_string(),
        result: Err("row locked".to_string()),
    });
    harness.canvas.apply(CanvasIntent::DeleteCompleted {
        id: "d3".to_string(),
        result: Ok(()),
    });

    let effects = harness.canvas.drain_effects();
    let removed: Vec<&str> = effects
        .iter()
        .filter_map(|e| match e {
            CanvasEffect::DependencyRemoved { id } => Some(id.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(removed, vec!["d1", "d3"]);

    let outcome = effects
        .iter()
        .find_map(|e| match e {
            CanvasEffect::BulkCompleted { outcome } => Some(*outcome),
            _ => None,
        })
        .expect("bulk outcome reported");
    assert_eq!(outcome.requested, 3);
    assert_eq!(outcome.succeeded, 2);
    assert_eq!(outcome.failed, 1);

    // The failing edge stays in the store and stays selected.
    assert!(harness.canvas.graph().edge_by_id("d2").is_some());
    assert!(harness.canvas.graph().edge_by_id("d1").is_none());
    assert!(harness.canvas.graph().edge_by_id("d3").is_none());
    assert!(harness.canvas.selection().contains("d2"));
    assert_eq!(harness.canvas.selection().len(), 1);
}

#[test]
fn fully_successful_bulk_delete_clears_selection_and_multi_mode() {
    let mut harness = TestHarness::new();
    select_all_three(&mut harness);

    harness.canvas.apply(CanvasIntent::DeleteKey);
    harness.canvas.apply(CanvasIntent::ConfirmBulkDelete);
    harness.canvas.drain_effects();
    for id in ["d1", "d2", "d3"] {
        harness.canvas.apply(CanvasIntent::DeleteCompleted {
            id: id.to_string(),
            result: Ok(()),
        });
    }
    harness.canvas.drain_effects();

    assert_eq!(harness.canvas.graph().edge_count(), 0);
    assert!(harness.canvas.selection().is_empty());
    assert!(!harness.canvas.selection().is_multi_select());
}

#[test]
fn bulk_retype_updates_kinds_without_confirmation() {
    let mut harness = TestHarness::new();
    select_all_three(&mut harness);

    harness.canvas.apply(CanvasIntent::RequestBulkRetype {
        kind: DependencyKind::StartToStart,
    });
    let effects = harness.canvas.drain_effects();
    let retype_count = effects
        .iter()
        .filter(|e| {
            matches!(
                e,
                CanvasEffect::RetypeDependency {
                    kind: DependencyKind::StartToStart,
                    ..
                }
            )
        })
        .count();
    assert_eq!(retype_count, 3);

    harness.canvas.apply(CanvasIntent::RetypeCompleted {
        id: "d1".to_string(),
        result: Ok(()),
    });
    harness.canvas.apply(CanvasIntent::RetypeCompleted {
        id: "d2".to_string(),
        result: Ok(()),
    });
    harness.canvas.apply(CanvasIntent::RetypeCompleted {
        id: "d3".to_string(),
        result: Err("gone".to_string()),
    });
    let effects = harness.canvas.drain_effects();
    let outcome = effects
        .iter()
        .find_map(|e| match e {
            CanvasEffect::BulkCompleted { outcome } => Some(*outcome),
            _ => None,
        })
        .expect("bulk outcome reported");
    assert_eq!(outcome.succeeded, 2);
    assert_eq!(outcome.failed, 1);

    let graph = harness.canvas.graph();
    assert_eq!(
        graph.edge_by_id("d1").unwrap().1.kind,
        DependencyKind::StartToStart
    );
    assert_eq!(
        graph.edge_by_id("d2").unwrap().1.kind,
        DependencyKind::StartToStart
    );
    assert_eq!(
        graph.edge_by_id("d3").unwrap().1.kind,
        DependencyKind::FinishToStart
    );
}

#[test]
fn single_select_click_collapses_selection_to_one() {
    let mut harness = TestHarness::new();
    select_all_three(&mut harness);

    // Leave multi-select mode explicitly, then plain-click.
    harness
        .canvas
        .apply(CanvasIntent::SetMultiSelect { enabled: false });
    harness.canvas.apply(CanvasIntent::ClickEdge {
        id: "d2".to_string(),
        multi: false,
    });
    assert_eq!(harness.canvas.selection().len(), 1);
    assert!(harness.canvas.selection().contains("d2"));
    assert!(!harness.canvas.selection().is_multi_select());
}
