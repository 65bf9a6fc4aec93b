//! Footprint Flow Links
//!
//! Flattens the current view of a carbon tree into parent/child links, one
//! for the product and one for the transport footprint of every node that
//! declares a footprint. Renderers such as Sankey diagrams consume these.

use serde::Serialize;
use std::collections::{HashSet, VecDeque};

use crate::error::{Result, TraceError};
use crate::lifecycle::LifeCyclePhases;
use crate::model::tree::CarbonTree;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    Product,
    Transport,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FootprintLink {
    /// Asset id of the parent the footprint adds to.
    pub source: String,
    /// Asset id of the node producing the footprint.
    pub target: String,
    pub kind: LinkKind,
    /// CO2eq in kg of one unit of the target.
    pub value: f64,
    /// Phases covered by the target's product footprint. Transport links
    /// carry those of their product sibling.
    pub product_life_cycle_phases: LifeCyclePhases,
}

/// Breadth-first flattening. The same asset id reached twice is reported as
/// a circular dependency.
pub fn collect_links(root: &CarbonTree) -> Result<Vec<FootprintLink>> {
    let mut links = Vec::new();
    let mut visited: HashSet<&str> = HashSet::new();
    let mut todo: VecDeque<(&CarbonTree, Option<&str>)> = VecDeque::new();
    todo.push_back((root, None));

    while let Some((current, parent_id)) = todo.pop_front() {
        let id = current.asset().id.as_str();
        if !visited.insert(id) {
            return Err(TraceError::CircularDependency(id.to_string()));
        }
        todo.extend(current.children().map(|child| (child, Some(id))));

        let (Some(parent_id), Some(_)) = (parent_id, current.footprint()) else {
            continue;
        };
        let phases = current.covered_life_cycle_phases();
        links.push(FootprintLink {
            source: parent_id.to_string(),
            target: id.to_string(),
            kind: LinkKind::Product,
            value: current.product_co2eq(),
            product_life_cycle_phases: phases.clone(),
        });
        links.push(FootprintLink {
            source: parent_id.to_string(),
            target: id.to_string(),
            kind: LinkKind::Transport,
            value: current.transport_co2eq(),
            product_life_cycle_phases: phases,
        });
    }
    Ok(links)
}
