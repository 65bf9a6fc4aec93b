use std::sync::Arc;

use carbon_trace::lifecycle::{LifeCyclePhase, LifeCyclePhases};
use carbon_trace::model::footprint::{
    ProductCarbonFootprint, TransportCarbonFootprint, TransportProcesses, MISSING_PROCESSES_TITLE,
};
use carbon_trace::model::record::{AssetInfo, BasicInfo, ConnectionInfo};
use carbon_trace::model::{epsilon_zero, format_diff, tree::MISMATCH_TITLE};
use carbon_trace::{
    BufferedWarnings, CarbonFootprint, CarbonTree, CarbonTreeBuilder, CarbonTreeRecord, EditKind, TreeEvent,
};

fn asset(id: &str, product: Option<f64>, transport: f64, phases: &str) -> CarbonTreeRecord {
    let footprint = product.map(|co2eq| {
        CarbonFootprint::new(
            vec![ProductCarbonFootprint::new(co2eq, LifeCyclePhases::parse(phases))],
            vec![TransportCarbonFootprint::new(transport)],
        )
    });
    CarbonTreeRecord::new(AssetInfo::new(id, footprint), BasicInfo::new(id))
}

fn part(id: &str, product: f64, bulk: f64) -> CarbonTreeRecord {
    asset(id, Some(product), 0.0, "A1-A3").with_connection(ConnectionInfo::with_bulk_count(bulk))
}

fn build(record: CarbonTreeRecord) -> (CarbonTree, Arc<BufferedWarnings>) {
    let warnings = Arc::new(BufferedWarnings::new(false));
    let tree = CarbonTreeBuilder::new(record).with_warnings(warnings.clone()).build();
    (tree, warnings)
}

#[test]
fn test_children_sum_without_own_footprint() {
    let (tree, warnings) = build(
        asset("root", None, 0.0, "")
            .with_child(part("a", 10.0, 2.0))
            .with_child(part("b", 20.0, 3.0)),
    );
    assert_eq!(tree.product_co2eq(), 80.0);
    assert_eq!(tree.original_product_co2eq(), 80.0);
    assert_eq!(tree.children_product_co2eq(), Some(80.0));
    assert_eq!(tree.product_co2eq_diff(), 0.0);
    assert!(warnings.pending().is_empty());
}

#[test]
fn test_declared_footprint_includes_original_children() {
    let (mut tree, warnings) = build(asset("root", Some(50.0), 0.0, "A1-A3").with_child(part("child", 20.0, 1.0)));
    assert_eq!(tree.product_co2eq(), 50.0);
    assert_eq!(tree.original_asset_product_co2eq(), Some(30.0));

    tree.edit(&["child"], |child| child.set_bulk_count(2.0)).unwrap();
    assert_eq!(tree.product_co2eq(), 70.0);
    assert_eq!(tree.original_product_co2eq(), 50.0);
    assert_eq!(tree.product_co2eq_diff(), 20.0);
    assert_eq!(tree.children_product_co2eq_diff(), Some(20.0));
    assert_eq!(tree.asset_product_co2eq(), Some(30.0));
    assert_eq!(tree.asset_product_co2eq_diff(), 0.0);
    assert!(warnings.pending().is_empty());
}

#[test]
fn test_mismatch_falls_back_to_children_and_warns() {
    let (tree, warnings) = build(asset("root", Some(10.0), 0.0, "A1").with_child(part("child", 20.0, 1.0)));
    assert_eq!(tree.original_product_co2eq(), 20.0);
    assert_eq!(tree.product_co2eq(), 0.0);

    let pending = warnings.drain();
    assert_eq!(pending.len(), 2);
    assert!(pending.iter().all(|w| w.title == MISMATCH_TITLE));
    let details: Vec<String> = pending.into_iter().filter_map(|w| w.details).collect();
    assert!(details[0].ends_with("(1)"));
    assert!(details[1].ends_with("(2)"));
    assert!(details[0].contains("(root)"));
}

#[test]
fn test_transport_is_never_inherited() {
    let (tree, _) = build(
        asset("root", Some(100.0), 4.0, "A1-A3")
            .with_child(asset("a", Some(10.0), 1.5, "A1").with_connection(ConnectionInfo::with_bulk_count(2.0))),
    );
    assert_eq!(tree.transport_co2eq(), 4.0);
    assert_eq!(tree.original_transport_co2eq(), 4.0);
    assert_eq!(tree.children_transport_co2eq(), Some(3.0));
    assert_eq!(tree.children_total_co2eq(), Some(23.0));
    assert_eq!(tree.total_co2eq(), 104.0);
    assert_eq!(tree.transport_co2eq_diff(), 0.0);
    assert_eq!(tree.asset_transport_co2eq(), 4.0);

    let (leaf, _) = build(asset("leaf", None, 0.0, ""));
    assert_eq!(leaf.children_total_co2eq(), None);
    assert_eq!(leaf.total_co2eq(), 0.0);
}

#[test]
fn test_component_counts() {
    let (mut tree, _) = build(
        asset("root", None, 0.0, "")
            .with_child(part("a", 1.0, 2.0).with_child(part("a1", 1.0, 4.0)))
            .with_child(part("b", 1.0, 3.0)),
    );
    assert_eq!(tree.direct_components_count(), 5.0);
    assert_eq!(tree.all_components_count(), 13.0);

    tree.delete_connection("b").unwrap();
    assert_eq!(tree.direct_components_count_diff(), -3.0);
    assert_eq!(tree.all_components_count(), 10.0);
    assert_eq!(tree.all_components_count_diff(), -3.0);
    assert_eq!(tree.original_all_components_count(), 13.0);
}

#[test]
fn test_has_changes_follows_edits() {
    let (mut tree, _) = build(
        asset("root", None, 0.0, "")
            .with_child(part("a", 10.0, 2.0).with_child(part("a1", 1.0, 1.0)))
            .with_child(part("b", 20.0, 3.0)),
    );
    assert!(!tree.has_changes());

    tree.add_connection(part("c", 5.0, 1.0)).unwrap();
    assert!(tree.has_changes());
    tree.reset_connection("c").unwrap();
    assert!(!tree.has_changes());

    tree.edit(&["a", "a1"], |n| n.set_bulk_count(7.0)).unwrap();
    assert!(tree.has_changes());
    assert!(tree.child("a").unwrap().has_changes());
    assert!(!tree.child("b").unwrap().has_changes());
    tree.edit(&["a", "a1"], |n| n.reset_bulk_count()).unwrap();
    assert!(!tree.has_changes());

    tree.set_bulk_count(1.0);
    assert!(!tree.has_changes());
    tree.set_bulk_count(2.0);
    assert!(tree.has_changes());
}

#[test]
fn test_descendant_phase_coverage() {
    let (mut tree, _) = build(
        asset("root", None, 0.0, "")
            .with_child(asset("a", Some(1.0), 0.0, "A1-A3").with_child(asset("a1", Some(0.5), 0.0, "C1")))
            .with_child(asset("b", Some(2.0), 0.0, "B6")),
    );
    assert_eq!(tree.by_children_covered_life_cycle_phases().to_string(), "A1 - A3, B6, C1");
    assert_eq!(
        tree.original_by_children_covered_life_cycle_phases().to_string(),
        "A1 - A3, B6, C1"
    );

    tree.swap_connection("b", asset("d", Some(2.0), 0.0, "D"), EditKind::Swapped).unwrap();
    let diff = tree.by_children_covered_life_cycle_phases_diff();
    assert_eq!(diff.only_this, vec![LifeCyclePhase::D]);
    assert_eq!(diff.only_other, vec![LifeCyclePhase::B6]);
    assert!(tree.covered_life_cycle_phases().is_empty());
}

#[test]
fn test_epsilon_zero_diffs() {
    assert_eq!(epsilon_zero(1e-18), 0.0);
    assert_eq!(format_diff(1e-18, 2), "±0");

    let (mut tree, _) = build(
        asset("root", None, 0.0, "")
            .with_child(part("a", 0.1, 1.0))
            .with_child(part("b", 0.2, 1.0)),
    );
    tree.swap_connection("b", part("c", 0.2, 1.0), EditKind::Modified).unwrap();
    assert_eq!(tree.product_co2eq_diff(), 0.0);
    assert_eq!(tree.total_co2eq_diff(), 0.0);
}

#[test]
fn test_edit_notifies_node_and_ancestors() {
    let (mut tree, _) = build(asset("root", None, 0.0, "").with_child(part("a", 1.0, 1.0).with_child(part("a1", 1.0, 1.0))));
    let mut root_events = tree.subscribe();
    let mut leaf_events = tree.node(&["a", "a1"]).unwrap().subscribe();

    tree.edit(&["a", "a1"], |leaf| leaf.set_bulk_count(3.0)).unwrap();

    assert_eq!(
        leaf_events.try_recv().unwrap(),
        TreeEvent::Changed { asset_id: "a1".into() }
    );
    assert_eq!(
        root_events.try_recv().unwrap(),
        TreeEvent::ChildChanged {
            asset_id: "root".into(),
            origin_id: "a1".into()
        }
    );

    tree.delete_connection("a").unwrap();
    assert_eq!(
        root_events.try_recv().unwrap(),
        TreeEvent::Changed { asset_id: "root".into() }
    );
    assert!(root_events.try_recv().is_err());
}

#[test]
fn test_for_each_visits_current_view() {
    let (mut tree, _) = build(
        asset("root", None, 0.0, "")
            .with_child(part("a", 1.0, 2.0))
            .with_child(part("b", 1.0, 3.0)),
    );
    tree.delete_connection("a").unwrap();
    tree.add_connection(part("c", 1.0, 5.0)).unwrap();

    let mut visited = Vec::new();
    tree.for_each(|node, _, depth, bulk| {
        visited.push((node.asset().id.clone(), depth, bulk));
        true
    });
    assert_eq!(
        visited,
        vec![
            ("root".to_string(), 0, 1.0),
            ("b".to_string(), 1, 3.0),
            ("c".to_string(), 1, 5.0),
        ]
    );
}

#[test]
fn test_missing_transport_processes_warn_on_load() {
    let record = CarbonTreeRecord::from_value(serde_json::json!({
        "asset": {
            "id": "truck",
            "footprint": {
                "product": [{"co2eq": 1.0, "lifeCyclePhase": "A4"}],
                "transport": [
                    {"co2eq": 2.0},
                    {"co2eq": 3.0, "processesForGreenhouseGasEmissionInATransportService": "TTW - Tank-to-Wheel"}
                ]
            }
        },
        "entity": {"idShort": "truck"},
        "connections": {}
    }))
    .unwrap();
    let (tree, warnings) = build(record);

    let pending = warnings.pending();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].title, MISSING_PROCESSES_TITLE);
    let transport = tree.footprint().unwrap().transport();
    assert_eq!(
        transport[0].processes_for_greenhouse_gas_emission_in_a_transport_service,
        Some(TransportProcesses::WellToWheel)
    );
    assert_eq!(
        transport[1].processes_for_greenhouse_gas_emission_in_a_transport_service,
        Some(TransportProcesses::TankToWheel)
    );
    assert_eq!(tree.transport_co2eq(), 5.0);

    let rebuilt = CarbonTreeBuilder::new(tree.to_record()).with_warnings(warnings.clone()).build();
    assert_eq!(rebuilt.transport_co2eq(), 5.0);
    assert_eq!(warnings.pending().len(), 1);
}
