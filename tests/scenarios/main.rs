mod harness;

mod bulk_edit;
mod layout;
mod virtualization;

#[test]
fn scenarios_binary_smoke_runs() {
    let harness = harness::TestHarness::new();
    assert_eq!(harness.canvas.graph().node_count(), 0);
}
