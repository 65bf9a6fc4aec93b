use std::collections::BTreeMap;
use std::sync::Arc;

use carbon_trace::lifecycle::LifeCyclePhases;
use carbon_trace::model::footprint::{ProductCarbonFootprint, TransportCarbonFootprint};
use carbon_trace::model::record::{AssetInfo, BasicInfo, ConnectionInfo};
use carbon_trace::model::{ConnectionStatus, ResetOutcome};
use carbon_trace::{
    collect_links, BufferedWarnings, CarbonFootprint, CarbonTree, CarbonTreeBuilder, CarbonTreeRecord, EditKind,
    TraceError,
};

fn part(id: &str, product: f64, bulk: f64) -> CarbonTreeRecord {
    let footprint = CarbonFootprint::new(
        vec![ProductCarbonFootprint::new(product, LifeCyclePhases::parse("A1-A3"))],
        vec![TransportCarbonFootprint::new(product / 2.0)],
    );
    CarbonTreeRecord::new(AssetInfo::new(id, Some(footprint)), BasicInfo::new(id))
        .with_connection(ConnectionInfo::with_bulk_count(bulk))
}

fn baseline() -> CarbonTreeRecord {
    CarbonTreeRecord::new(AssetInfo::new("bike", None), BasicInfo::new("Bike"))
        .with_child(part("frame", 40.0, 1.0).with_child(part("tube", 5.0, 3.0)))
        .with_child(part("wheel", 10.0, 2.0).with_child(part("spoke", 0.125, 32.0)))
        .with_child(part("bell", 0.5, 1.0))
        .with_child(part("saddle", 3.0, 1.0))
}

fn build(record: CarbonTreeRecord) -> CarbonTree {
    CarbonTreeBuilder::new(record)
        .with_warnings(Arc::new(BufferedWarnings::new(false)))
        .build()
}

type NodeState = (String, usize, f64, BTreeMap<String, ConnectionStatus>);

fn states(tree: &CarbonTree) -> Vec<NodeState> {
    let mut out = Vec::new();
    tree.for_each(|node, _, depth, _| {
        out.push((
            node.asset().id.clone(),
            depth,
            node.bulk_count(),
            node.connection_status().clone(),
        ));
        true
    });
    out
}

#[test]
fn test_add_then_delete_leaves_no_trace() {
    let mut tree = build(baseline());
    let connections_before: Vec<String> = tree.connections().keys().cloned().collect();
    let status_before = tree.connection_status().clone();

    tree.add_connection(part("basket", 2.0, 1.0)).unwrap();
    assert_eq!(tree.connection_status()["basket"], ConnectionStatus::Added);
    tree.delete_connection("basket").unwrap();

    let connections_after: Vec<String> = tree.connections().keys().cloned().collect();
    assert_eq!(connections_after, connections_before);
    assert_eq!(tree.connection_status(), &status_before);
    assert!(!tree.has_changes());
}

#[test]
fn test_delete_unknown_id_is_ignored() {
    let mut tree = build(baseline());
    tree.delete_connection("horn").unwrap();
    assert!(!tree.connection_status().contains_key("horn"));
    assert!(!tree.has_changes());
}

#[test]
fn test_delete_and_restore_baseline_child() {
    let mut tree = build(baseline());
    tree.delete_connection("bell").unwrap();
    assert_eq!(tree.connection_status()["bell"], ConnectionStatus::Deleted);
    assert!(tree.child("bell").is_none());
    assert!(tree.is_original_connection("bell"));
    assert_eq!(tree.product_co2eq_diff(), -0.5);

    assert!(matches!(tree.reset_connection("bell").unwrap(), ResetOutcome::Restored));
    assert!(Arc::ptr_eq(&tree.connections()["bell"], &tree.original_connections()["bell"]));
    assert!(!tree.has_changes());
}

#[test]
fn test_swap_then_reset_restores_original() {
    let mut tree = build(baseline());
    tree.swap_connection("saddle", part("gel-saddle", 2.0, 1.0), EditKind::Swapped)
        .unwrap();
    let pair = ConnectionStatus::Swapped {
        original_id: "saddle".into(),
        other_id: "gel-saddle".into(),
    };
    assert_eq!(tree.connection_status()["saddle"], pair);
    assert_eq!(tree.connection_status()["gel-saddle"], pair);
    assert!(tree.is_swapped_out("saddle"));
    assert!(tree.is_swapped_in("gel-saddle"));
    assert_eq!(tree.product_co2eq_diff(), -1.0);

    let outcome = tree.reset_connection("gel-saddle").unwrap();
    match outcome {
        ResetOutcome::SwappedBack(Some(swapped_in)) => assert_eq!(swapped_in.asset().id, "gel-saddle"),
        other => panic!("unexpected outcome {:?}", other),
    }
    assert!(tree.child("gel-saddle").is_none());
    assert!(!tree.connection_status().contains_key("gel-saddle"));
    assert!(Arc::ptr_eq(&tree.connections()["saddle"], &tree.original_connections()["saddle"]));
    assert_eq!(tree.connection_status()["saddle"], ConnectionStatus::Original);
    assert!(!tree.has_changes());
}

#[test]
fn test_swap_replaces_previous_edits() {
    let mut tree = build(baseline());
    tree.add_connection(part("basket", 2.0, 1.0)).unwrap();
    tree.swap_connection("basket", part("crate", 4.0, 1.0), EditKind::Swapped).unwrap();
    assert!(tree.child("basket").is_none());
    assert!(tree.child("crate").is_some());

    tree.reset_connection("crate").unwrap();
    assert!(tree.child("crate").is_none());
    assert!(!tree.connection_status().contains_key("basket"));
    assert!(!tree.connection_status().contains_key("crate"));
    assert!(!tree.has_changes());
}

#[test]
fn test_token_round_trip_replays_edits() {
    let mut tree = build(baseline());
    tree.add_connection(part("basket", 2.0, 1.0).with_child(part("strap", 0.25, 2.0)))
        .unwrap();
    tree.delete_connection("bell").unwrap();
    tree.swap_connection("saddle", part("gel-saddle", 2.0, 1.0), EditKind::Swapped)
        .unwrap();
    tree.modify_connection("frame", part("frame", 35.0, 1.0).with_child(part("tube", 4.0, 3.0)))
        .unwrap();
    tree.edit(&["wheel"], |wheel| wheel.set_bulk_count(3.0)).unwrap();
    tree.edit(&["wheel", "spoke"], |spoke| spoke.set_bulk_count(36.0)).unwrap();

    let token = tree.stringify_changes().unwrap();
    assert!(!token.is_empty());
    assert!(token.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));

    let changes = CarbonTree::parse_changes(&token).unwrap();
    assert_eq!(Some(&changes), tree.serialize_changes(false).as_ref());

    let replayed = CarbonTreeBuilder::new(baseline())
        .with_warnings(Arc::new(BufferedWarnings::new(false)))
        .with_changes(&changes)
        .build();
    assert_eq!(states(&replayed), states(&tree));
    assert_eq!(replayed.total_co2eq(), tree.total_co2eq());
    assert_eq!(replayed.total_co2eq_diff(), tree.total_co2eq_diff());
    assert_eq!(replayed.all_components_count(), tree.all_components_count());
    assert!(replayed.child("basket").unwrap().is_simulation());
    assert_eq!(replayed.node(&["basket", "strap"]).unwrap().bulk_count(), 2.0);
    let again = CarbonTree::parse_changes(&replayed.stringify_changes().unwrap()).unwrap();
    assert_eq!(again.connection_status, changes.connection_status);
}

fn replay_token(token: &str) -> CarbonTree {
    let changes = CarbonTree::parse_changes(token).unwrap();
    CarbonTreeBuilder::new(baseline())
        .with_warnings(Arc::new(BufferedWarnings::new(false)))
        .with_changes(&changes)
        .build()
}

#[test]
fn test_edits_inside_added_subtree_survive_replay() {
    let mut tree = build(baseline());
    tree.add_connection(part("crate", 10.0, 1.0).with_child(part("lid", 1.0, 1.0)))
        .unwrap();
    tree.edit(&["crate"], |c| c.add_connection(part("handle", 5.0, 1.0)).map(|_| ()))
        .unwrap()
        .unwrap();
    tree.edit(&["crate"], |c| {
        c.swap_connection("lid", part("lid-x", 4.0, 1.0), EditKind::Swapped)
            .map(|_| ())
    })
    .unwrap()
    .unwrap();
    let live = tree.node(&["crate"]).unwrap();
    assert_eq!(live.product_co2eq(), 18.0);

    let mut replayed = replay_token(&tree.stringify_changes().unwrap());
    let crate_node = replayed.node(&["crate"]).unwrap();
    assert_eq!(crate_node.product_co2eq(), live.product_co2eq());
    assert_eq!(crate_node.total_co2eq(), live.total_co2eq());
    assert_eq!(crate_node.original_children_product_co2eq(), Some(1.0));
    assert_eq!(crate_node.original_connections().keys().collect::<Vec<_>>(), vec!["lid"]);
    assert_eq!(replayed.total_co2eq(), tree.total_co2eq());
    assert_eq!(states(&replayed), states(&tree));

    let outcome = replayed
        .edit(&["crate"], |c| c.reset_connection("handle"))
        .unwrap()
        .unwrap();
    assert!(matches!(outcome, ResetOutcome::RemovedAdded(Some(_))));
    assert!(replayed.node(&["crate", "handle"]).is_err());

    replayed
        .edit(&["crate"], |c| c.reset_connection("lid-x"))
        .unwrap()
        .unwrap();
    let crate_node = replayed.node(&["crate"]).unwrap();
    assert!(crate_node.child("lid-x").is_none());
    assert!(crate_node.child("lid").is_some());
    assert_eq!(crate_node.product_co2eq(), 10.0);
    assert!(!crate_node.has_changes());
}

#[test]
fn test_in_place_modification_inside_added_subtree_keeps_baseline() {
    let mut tree = build(baseline());
    tree.add_connection(part("crate", 10.0, 1.0).with_child(part("lid", 1.0, 1.0)))
        .unwrap();
    tree.edit(&["crate"], |c| c.modify_connection("lid", part("lid", 2.0, 3.0)).map(|_| ()))
        .unwrap()
        .unwrap();
    assert_eq!(tree.node(&["crate"]).unwrap().product_co2eq(), 15.0);

    let replayed = replay_token(&tree.stringify_changes().unwrap());
    let crate_node = replayed.node(&["crate"]).unwrap();
    assert_eq!(crate_node.product_co2eq(), 15.0);
    assert_eq!(crate_node.original_child("lid").unwrap().product_co2eq(), 1.0);
    assert_eq!(crate_node.child("lid").unwrap().bulk_count(), 3.0);
    assert_eq!(
        crate_node.modification("lid"),
        Some(&ConnectionStatus::Modified {
            original_id: "lid".into(),
            other_id: "lid".into(),
        })
    );
    assert_eq!(replayed.total_co2eq(), tree.total_co2eq());
}

#[test]
fn test_unchanged_tree_has_empty_token() {
    let tree = build(baseline());
    assert_eq!(tree.stringify_changes().unwrap(), "");
}

#[test]
fn test_corrupt_tokens_are_rejected() {
    for token in ["", "%%%", "AAAAAAAA"] {
        assert!(matches!(CarbonTree::parse_changes(token), Err(TraceError::CorruptToken(_))));
    }
    let valid_compression = carbon_trace::codec::encode_token("[1, 2, 3]", 3).unwrap();
    assert!(matches!(
        CarbonTree::parse_changes(&valid_compression),
        Err(TraceError::CorruptToken(_))
    ));
}

#[test]
fn test_from_existing_turns_simulation_into_baseline() {
    let mut tree = build(baseline());
    tree.delete_connection("bell").unwrap();
    tree.edit(&["wheel"], |wheel| wheel.set_bulk_count(4.0)).unwrap();

    let rebased = CarbonTree::from_existing(&tree);
    assert!(!rebased.has_changes());
    assert_eq!(rebased.original_total_co2eq(), tree.total_co2eq());
    assert_eq!(rebased.stringify_changes().unwrap(), "");
}

#[test]
fn test_links_follow_current_view() {
    let mut tree = build(baseline());
    tree.delete_connection("wheel").unwrap();
    let links = collect_links(&tree).unwrap();
    assert!(links.iter().all(|l| l.target != "wheel" && l.target != "spoke"));
    assert_eq!(links.len(), 2 * 4);

    let duplicated = build(
        CarbonTreeRecord::new(AssetInfo::new("bike", None), BasicInfo::new("Bike"))
            .with_child(part("frame", 40.0, 1.0).with_child(part("bolt", 0.1, 4.0)))
            .with_child(part("wheel", 10.0, 2.0).with_child(part("bolt", 0.1, 8.0))),
    );
    assert!(matches!(collect_links(&duplicated), Err(TraceError::CircularDependency(id)) if id == "bolt"));
}
