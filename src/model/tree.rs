//! Carbon Tree
//!
//! One node of the composite product hierarchy. Each node keeps two views of
//! its children: `connections`, the current and possibly edited view, and
//! `original_connections`, the baseline frozen at construction. Both maps
//! share the same `Arc` children until an edit replaces one, so the baseline
//! costs nothing until the views diverge. Nested nodes are edited through
//! [`CarbonTree::edit`], which copies a shared child on write.
//!
//! Naming: plain getters describe the current view, `original_*` the
//! baseline and `*_diff` is always current minus original.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

use super::diff::epsilon_zero;
use super::events::{ChangeNotifier, TreeEvent, DEFAULT_EVENT_CAPACITY};
use super::footprint::CarbonFootprint;
use super::record::{AssetInfo, BasicInfo, CarbonTreeRecord, ConnectionInfo};
use super::simulation::SimulationChanges;
use super::status::{ConnectionStatus, EditKind, ResetOutcome};
use crate::diagnostics::{global_sink, AnalysisWarning, WarningSink};
use crate::error::{Result, TraceError};
use crate::lifecycle::{LifeCyclePhases, PhaseDiff};

pub const MISMATCH_TITLE: &str = "Mismatch between asset CO2eq and its components CO2eq";

type Children = BTreeMap<String, Arc<CarbonTree>>;

fn current_view(tree: &CarbonTree) -> &Children {
    &tree.connections
}

fn original_view(tree: &CarbonTree) -> &Children {
    &tree.original_connections
}

#[derive(Clone)]
pub struct CarbonTree {
    pub(crate) asset: AssetInfo,
    pub(crate) entity: BasicInfo,
    pub(crate) connection: Option<ConnectionInfo>,
    parent_id: Option<String>,
    pub(crate) connections: Children,
    pub(crate) original_connections: Children,
    pub(crate) connection_status: BTreeMap<String, ConnectionStatus>,
    /// Override of the connection's declared bulk count.
    pub(crate) bulk_count: Option<f64>,
    pub(crate) is_simulation: bool,
    changes: ChangeNotifier,
    pub(crate) warnings: Arc<dyn WarningSink>,
}

/// Builds a [`CarbonTree`] from a plain record, optionally replaying a
/// persisted edit set onto it.
pub struct CarbonTreeBuilder<'a> {
    record: CarbonTreeRecord,
    warnings: Option<Arc<dyn WarningSink>>,
    changes: Option<&'a SimulationChanges>,
    event_capacity: usize,
    parent_id: Option<String>,
}

impl<'a> CarbonTreeBuilder<'a> {
    pub fn new(record: CarbonTreeRecord) -> Self {
        Self {
            record,
            warnings: None,
            changes: None,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            parent_id: None,
        }
    }

    /// Warning sink for the whole tree. Defaults to the process-wide sink.
    pub fn with_warnings(mut self, warnings: Arc<dyn WarningSink>) -> Self {
        self.warnings = Some(warnings);
        self
    }

    pub fn with_changes(mut self, changes: &'a SimulationChanges) -> Self {
        self.changes = Some(changes);
        self
    }

    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    pub(crate) fn with_parent(mut self, parent_id: &str) -> Self {
        self.parent_id = Some(parent_id.to_string());
        self
    }

    pub fn build(self) -> CarbonTree {
        let warnings = self.warnings.unwrap_or_else(global_sink);
        let mut tree = CarbonTree::assemble(self.record, self.parent_id, &warnings, self.event_capacity);
        if let Some(changes) = self.changes {
            tree.apply_changes(changes);
        }
        tree
    }
}

impl CarbonTree {
    pub fn from_record(record: CarbonTreeRecord) -> Self {
        CarbonTreeBuilder::new(record).build()
    }

    /// Baseline from `record` with the persisted edits replayed on top.
    pub fn replay(record: CarbonTreeRecord, changes: &SimulationChanges) -> Self {
        CarbonTreeBuilder::new(record).with_changes(changes).build()
    }

    /// A fresh tree whose baseline is the current view of `tree`.
    pub fn from_existing(tree: &CarbonTree) -> Self {
        let mut builder = CarbonTreeBuilder::new(tree.to_record())
            .with_warnings(tree.warnings.clone())
            .with_event_capacity(tree.changes.capacity());
        if let Some(parent_id) = &tree.parent_id {
            builder = builder.with_parent(parent_id);
        }
        builder.build()
    }

    fn assemble(
        record: CarbonTreeRecord,
        parent_id: Option<String>,
        warnings: &Arc<dyn WarningSink>,
        event_capacity: usize,
    ) -> Self {
        let CarbonTreeRecord {
            mut asset,
            entity,
            connection,
            connections,
        } = record;
        if let Some(footprint) = asset.footprint.as_mut() {
            footprint.resolve_transport_processes(&**warnings);
        }
        let children: Children = connections
            .into_iter()
            .map(|(id, child)| {
                let node = Self::assemble(child, Some(asset.id.clone()), warnings, event_capacity);
                (id, Arc::new(node))
            })
            .collect();
        let connection_status = children
            .keys()
            .map(|id| (id.clone(), ConnectionStatus::Original))
            .collect();
        CarbonTree {
            asset,
            entity,
            connection,
            parent_id,
            original_connections: children.clone(),
            connections: children,
            connection_status,
            bulk_count: None,
            is_simulation: false,
            changes: ChangeNotifier::new(event_capacity),
            warnings: warnings.clone(),
        }
    }

    pub(crate) fn child_from_record(&self, record: CarbonTreeRecord) -> CarbonTree {
        CarbonTreeBuilder::new(record)
            .with_warnings(self.warnings.clone())
            .with_event_capacity(self.changes.capacity())
            .with_parent(&self.asset.id)
            .build()
    }

    /// The current view as a plain record, bulk count overrides included.
    pub fn to_record(&self) -> CarbonTreeRecord {
        let mut connection = self.connection.clone();
        if let Some(bulk_count) = self.bulk_count {
            connection.get_or_insert_with(ConnectionInfo::default).bulk_count = Some(bulk_count);
        }
        CarbonTreeRecord {
            asset: self.asset.clone(),
            entity: self.entity.clone(),
            connection,
            connections: self
                .connections
                .iter()
                .map(|(id, child)| (id.clone(), child.to_record()))
                .collect(),
        }
    }

    /// The baseline view as a plain record, declared bulk counts only.
    pub fn to_original_record(&self) -> CarbonTreeRecord {
        CarbonTreeRecord {
            asset: self.asset.clone(),
            entity: self.entity.clone(),
            connection: self.connection.clone(),
            connections: self
                .original_connections
                .iter()
                .map(|(id, child)| (id.clone(), child.to_original_record()))
                .collect(),
        }
    }

    // --- accessors ---

    pub fn asset(&self) -> &AssetInfo {
        &self.asset
    }

    pub fn footprint(&self) -> Option<&CarbonFootprint> {
        self.asset.footprint.as_ref()
    }

    pub fn entity(&self) -> &BasicInfo {
        &self.entity
    }

    pub fn connection_info(&self) -> Option<&ConnectionInfo> {
        self.connection.as_ref()
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    pub fn is_simulation(&self) -> bool {
        self.is_simulation
    }

    pub fn connections(&self) -> &BTreeMap<String, Arc<CarbonTree>> {
        &self.connections
    }

    pub fn original_connections(&self) -> &BTreeMap<String, Arc<CarbonTree>> {
        &self.original_connections
    }

    pub fn connection_status(&self) -> &BTreeMap<String, ConnectionStatus> {
        &self.connection_status
    }

    pub fn child(&self, id: &str) -> Option<&CarbonTree> {
        self.connections.get(id).map(Arc::as_ref)
    }

    pub fn original_child(&self, id: &str) -> Option<&CarbonTree> {
        self.original_connections.get(id).map(Arc::as_ref)
    }

    pub fn children(&self) -> impl Iterator<Item = &CarbonTree> + '_ {
        self.connections.values().map(Arc::as_ref)
    }

    pub fn original_children(&self) -> impl Iterator<Item = &CarbonTree> + '_ {
        self.original_connections.values().map(Arc::as_ref)
    }

    /// Node at `path` (child ids from this node) in the current view.
    pub fn node(&self, path: &[&str]) -> Result<&CarbonTree> {
        let mut node = self;
        for id in path {
            node = node.child(id).ok_or_else(|| not_found(path))?;
        }
        Ok(node)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TreeEvent> {
        self.changes.subscribe()
    }

    pub fn warnings(&self) -> &Arc<dyn WarningSink> {
        &self.warnings
    }

    // --- names ---

    pub fn name(&self) -> String {
        [
            self.asset.display_name.as_deref(),
            Some(self.asset.id_short.as_str()),
            self.entity.display_name.as_deref(),
        ]
        .into_iter()
        .flatten()
        .find(|name| !name.is_empty())
        .unwrap_or(self.entity.id_short.as_str())
        .to_string()
    }

    pub fn description(&self) -> Option<&str> {
        self.entity
            .description
            .as_deref()
            .or(self.asset.description.as_deref())
    }

    pub fn id_short(&self) -> &str {
        &self.entity.id_short
    }

    /// Entity and asset display names, empty and duplicate entries dropped.
    pub fn display_names(&self) -> Vec<String> {
        distinct([&self.entity.display_name, &self.asset.display_name])
    }

    pub fn descriptions(&self) -> Vec<String> {
        distinct([&self.entity.description, &self.asset.description])
    }

    pub fn id_shorts(&self) -> [&str; 2] {
        [&self.entity.id_short, &self.asset.id_short]
    }

    // --- bulk count ---

    pub fn bulk_count(&self) -> f64 {
        if let Some(bulk_count) = self.bulk_count {
            return bulk_count;
        }
        if let Some(bulk_count) = self.original_bulk_count() {
            return bulk_count;
        }
        debug!("No bulkCount set for {}", self.entity.id_short);
        1.0
    }

    /// The declared bulk count, ignoring any override.
    pub fn original_bulk_count(&self) -> Option<f64> {
        self.connection.as_ref().and_then(|c| c.bulk_count)
    }

    fn original_bulk_count_or_one(&self) -> f64 {
        self.original_bulk_count().unwrap_or(1.0)
    }

    pub fn bulk_count_override(&self) -> Option<f64> {
        self.bulk_count
    }

    pub fn bulk_count_diff(&self) -> f64 {
        epsilon_zero(self.bulk_count() - self.original_bulk_count_or_one())
    }

    // --- product CO2eq ---

    pub fn original_children_product_co2eq(&self) -> Option<f64> {
        if self.original_connections.is_empty() {
            return None;
        }
        Some(
            self.original_children()
                .map(|c| c.original_bulk_count_or_one() * c.original_product_co2eq())
                .sum(),
        )
    }

    pub fn children_product_co2eq(&self) -> Option<f64> {
        if self.connections.is_empty() {
            return None;
        }
        Some(self.children().map(|c| c.bulk_count() * c.product_co2eq()).sum())
    }

    pub fn children_product_co2eq_diff(&self) -> Option<f64> {
        let current = self.children_product_co2eq()?;
        let original = self.original_children_product_co2eq()?;
        Some(epsilon_zero(current - original))
    }

    /// Declared product footprint, unless the baseline children add up to
    /// more; then their sum is used and a mismatch is reported.
    pub fn original_product_co2eq(&self) -> f64 {
        let children = self.original_children_product_co2eq();
        let Some(footprint) = self.footprint() else {
            return children.unwrap_or(0.0);
        };
        match children {
            Some(children) if children > footprint.product_co2eq() => {
                self.report_mismatch(1);
                children
            }
            _ => footprint.product_co2eq(),
        }
    }

    /// The declared figure already contains the baseline children; the
    /// current children replace that share.
    pub fn product_co2eq(&self) -> f64 {
        let children = self.children_product_co2eq().unwrap_or(0.0);
        let Some(footprint) = self.footprint() else {
            return children;
        };
        let original_children = self.original_children_product_co2eq().unwrap_or(0.0);
        if original_children > footprint.product_co2eq() {
            self.report_mismatch(2);
            return children - original_children;
        }
        footprint.product_co2eq() + children - original_children
    }

    pub fn product_co2eq_diff(&self) -> f64 {
        epsilon_zero(self.product_co2eq() - self.original_product_co2eq())
    }

    /// The node's own share of its declared product footprint.
    pub fn original_asset_product_co2eq(&self) -> Option<f64> {
        match self.original_children_product_co2eq() {
            None => self.footprint().map(CarbonFootprint::product_co2eq),
            Some(children) => self.footprint().map(|f| f.product_co2eq() - children),
        }
    }

    /// A node cannot be edited itself, only replaced or have its children
    /// edited, so its own share never changes.
    pub fn asset_product_co2eq(&self) -> Option<f64> {
        self.original_asset_product_co2eq()
    }

    pub fn asset_product_co2eq_diff(&self) -> f64 {
        0.0
    }

    fn report_mismatch(&self, view: u8) {
        let name = self.display_names().into_iter().next().unwrap_or_else(|| self.name());
        debug!(asset = %self.asset.id, "Product CO2eq mismatch between own footprint and calculated sub footprints");
        self.warnings.report(AnalysisWarning::new(
            MISMATCH_TITLE,
            Some(format!(
                "The asset's ({}) CO2eq is lower than the sum of its components CO2eqs. ({})",
                name, view
            )),
        ));
    }

    // --- transport CO2eq ---

    pub fn original_children_transport_co2eq(&self) -> Option<f64> {
        if self.original_connections.is_empty() {
            return None;
        }
        Some(
            self.original_children()
                .map(|c| c.original_bulk_count_or_one() * c.original_transport_co2eq())
                .sum(),
        )
    }

    pub fn children_transport_co2eq(&self) -> Option<f64> {
        if self.connections.is_empty() {
            return None;
        }
        Some(self.children().map(|c| c.bulk_count() * c.transport_co2eq()).sum())
    }

    /// Transport is never inherited from children.
    pub fn original_transport_co2eq(&self) -> f64 {
        self.footprint().map_or(0.0, CarbonFootprint::transport_co2eq)
    }

    pub fn transport_co2eq(&self) -> f64 {
        self.footprint().map_or(0.0, CarbonFootprint::transport_co2eq)
    }

    pub fn transport_co2eq_diff(&self) -> f64 {
        epsilon_zero(self.transport_co2eq() - self.original_transport_co2eq())
    }

    pub fn asset_transport_co2eq(&self) -> f64 {
        self.original_transport_co2eq()
    }

    pub fn asset_transport_co2eq_diff(&self) -> f64 {
        0.0
    }

    // --- totals ---

    pub fn total_co2eq(&self) -> f64 {
        self.product_co2eq() + self.transport_co2eq()
    }

    pub fn original_total_co2eq(&self) -> f64 {
        self.original_product_co2eq() + self.original_transport_co2eq()
    }

    pub fn total_co2eq_diff(&self) -> f64 {
        epsilon_zero(self.total_co2eq() - self.original_total_co2eq())
    }

    pub fn children_total_co2eq(&self) -> Option<f64> {
        sum_present(self.children_product_co2eq(), self.children_transport_co2eq())
    }

    pub fn original_children_total_co2eq(&self) -> Option<f64> {
        sum_present(
            self.original_children_product_co2eq(),
            self.original_children_transport_co2eq(),
        )
    }

    pub fn children_total_co2eq_diff(&self) -> Option<f64> {
        let current = self.children_total_co2eq()?;
        let original = self.original_children_total_co2eq()?;
        Some(epsilon_zero(current - original))
    }

    // --- life cycle phases ---

    pub fn covered_life_cycle_phases(&self) -> LifeCyclePhases {
        self.footprint()
            .map(|f| f.covered_life_cycle_phases().clone())
            .unwrap_or_else(LifeCyclePhases::empty)
    }

    pub fn by_children_covered_life_cycle_phases(&self) -> LifeCyclePhases {
        self.descendant_phases(current_view)
    }

    pub fn original_by_children_covered_life_cycle_phases(&self) -> LifeCyclePhases {
        self.descendant_phases(original_view)
    }

    /// `only_this` holds phases only the current descendants cover,
    /// `only_other` those only the baseline covers.
    pub fn by_children_covered_life_cycle_phases_diff(&self) -> PhaseDiff {
        self.by_children_covered_life_cycle_phases()
            .diff(&self.original_by_children_covered_life_cycle_phases())
    }

    fn descendant_phases(&self, view: fn(&CarbonTree) -> &Children) -> LifeCyclePhases {
        let mut phases = Vec::new();
        let mut todo: VecDeque<&CarbonTree> = view(self).values().map(Arc::as_ref).collect();
        while let Some(current) = todo.pop_front() {
            phases.push(current.covered_life_cycle_phases());
            todo.extend(view(current).values().map(Arc::as_ref));
        }
        LifeCyclePhases::merged(phases.iter())
    }

    // --- component counts ---

    pub fn direct_components_count(&self) -> f64 {
        self.children().map(CarbonTree::bulk_count).sum()
    }

    pub fn original_direct_components_count(&self) -> f64 {
        self.original_children()
            .map(CarbonTree::original_bulk_count_or_one)
            .sum()
    }

    pub fn direct_components_count_diff(&self) -> f64 {
        epsilon_zero(self.direct_components_count() - self.original_direct_components_count())
    }

    /// Bulk-weighted number of nodes below this one.
    pub fn all_components_count(&self) -> f64 {
        self.weighted_count() - 1.0
    }

    pub fn original_all_components_count(&self) -> f64 {
        self.original_weighted_count() - 1.0
    }

    pub fn all_components_count_diff(&self) -> f64 {
        epsilon_zero(self.all_components_count() - self.original_all_components_count())
    }

    fn weighted_count(&self) -> f64 {
        self.children()
            .map(|c| c.weighted_count() * c.bulk_count())
            .sum::<f64>()
            + 1.0
    }

    fn original_weighted_count(&self) -> f64 {
        self.original_children()
            .map(|c| c.original_weighted_count() * c.original_bulk_count_or_one())
            .sum::<f64>()
            + 1.0
    }

    // --- change tracking ---

    pub fn has_changes(&self) -> bool {
        self.bulk_count_diff() != 0.0
            || self.connection_status.values().any(|s| !s.is_original())
            || self.children().any(CarbonTree::has_changes)
    }

    /// Status of `id` unless it is unchanged.
    pub fn modification(&self, id: &str) -> Option<&ConnectionStatus> {
        self.connection_status.get(id).filter(|s| !s.is_original())
    }

    pub fn is_original_connection(&self, id: &str) -> bool {
        self.original_connections.contains_key(id)
    }

    /// `id` is a baseline child replaced by another one.
    pub fn is_swapped_out(&self, id: &str) -> bool {
        matches!(
            self.connection_status.get(id).and_then(ConnectionStatus::pair),
            Some((original_id, other_id)) if original_id == id && other_id != id
        )
    }

    /// `id` replaced a baseline child.
    pub fn is_swapped_in(&self, id: &str) -> bool {
        matches!(
            self.connection_status.get(id).and_then(ConnectionStatus::pair),
            Some((_, other_id)) if other_id == id
        )
    }

    /// Breadth-first walk over the current view. The callback receives the
    /// node, a running index, the depth and the product of bulk counts down
    /// from this node; returning `false` skips that node's children.
    pub fn for_each<F>(&self, mut visit: F)
    where
        F: FnMut(&CarbonTree, usize, usize, f64) -> bool,
    {
        let mut index = 0;
        let mut todo: VecDeque<(&CarbonTree, usize, usize, f64)> = VecDeque::new();
        todo.push_back((self, index, 0, 1.0));
        while let Some((node, i, depth, bulk)) = todo.pop_front() {
            if !visit(node, i, depth, bulk) {
                continue;
            }
            for child in node.children() {
                index += 1;
                todo.push_back((child, index, depth + 1, child.bulk_count() * bulk));
            }
        }
    }

    // --- edits ---

    fn emit_changed(&self) {
        self.changes.publish(TreeEvent::Changed {
            asset_id: self.asset.id.clone(),
        });
    }

    pub fn set_bulk_count(&mut self, bulk_count: f64) {
        self.bulk_count = Some(bulk_count);
        self.emit_changed();
    }

    /// Drops the override; the declared bulk count applies again.
    pub fn reset_bulk_count(&mut self) {
        self.bulk_count = None;
        self.emit_changed();
    }

    pub fn add_connection(&mut self, record: CarbonTreeRecord) -> Result<&CarbonTree> {
        let id = record.asset.id.clone();
        if self.connections.contains_key(&id) {
            return Err(TraceError::ConnectionExists(id));
        }
        let tree = self.child_from_record(record);
        self.connections.insert(id.clone(), Arc::new(tree));
        self.connection_status.insert(id.clone(), ConnectionStatus::Added);
        self.emit_changed();
        self.child(&id).ok_or(TraceError::UnknownConnection(id))
    }

    /// Removes `id` from the current view. A child that was only added
    /// leaves no trace; a baseline child is marked deleted. Unknown ids are
    /// ignored.
    pub fn delete_connection(&mut self, id: &str) -> Result<()> {
        let Some(outcome) = self.revert(id) else {
            debug!(asset = %self.asset.id, child = %id, "Nothing to delete");
            return Ok(());
        };
        if self.connections.remove(id).is_some() {
            self.connection_status.insert(id.to_string(), ConnectionStatus::Deleted);
            self.emit_changed();
        } else if outcome.changed() {
            self.emit_changed();
        }
        Ok(())
    }

    pub fn reset_connection(&mut self, id: &str) -> Result<ResetOutcome> {
        let outcome = self
            .revert(id)
            .ok_or_else(|| TraceError::UnknownConnection(id.to_string()))?;
        if outcome.changed() {
            self.emit_changed();
        }
        Ok(outcome)
    }

    pub fn modify_connection(&mut self, old_id: &str, record: CarbonTreeRecord) -> Result<&CarbonTree> {
        self.swap_connection(old_id, record, EditKind::Modified)
    }

    /// Replaces `old_id` by a new child. Earlier edits of either id are
    /// undone first; both ids then carry the linked status pair.
    pub fn swap_connection(
        &mut self,
        old_id: &str,
        record: CarbonTreeRecord,
        kind: EditKind,
    ) -> Result<&CarbonTree> {
        if !self.connections.contains_key(old_id) && !self.original_connections.contains_key(old_id) {
            return Err(TraceError::UnknownConnection(old_id.to_string()));
        }
        let tree = self.child_from_record(record);
        let new_id = tree.asset.id.clone();
        self.revert(&new_id);
        self.revert(old_id);
        self.connections.remove(old_id);
        self.connections.insert(new_id.clone(), Arc::new(tree));
        let status = kind.status(old_id, &new_id);
        self.connection_status.insert(old_id.to_string(), status.clone());
        self.connection_status.insert(new_id.clone(), status);
        self.emit_changed();
        self.child(&new_id).ok_or(TraceError::UnknownConnection(new_id))
    }

    /// Undo without notifying. `None` when `id` has no status at all.
    fn revert(&mut self, id: &str) -> Option<ResetOutcome> {
        let status = self.connection_status.get(id)?.clone();
        let outcome = match &status {
            ConnectionStatus::Original => ResetOutcome::Unchanged,
            ConnectionStatus::Added => {
                let removed = self.connections.remove(id);
                if !self.restore_original(id) {
                    self.connection_status.remove(id);
                }
                ResetOutcome::RemovedAdded(removed)
            }
            ConnectionStatus::Deleted => {
                if !self.restore_original(id) {
                    self.connection_status.remove(id);
                }
                ResetOutcome::Restored
            }
            ConnectionStatus::Swapped { original_id, other_id }
            | ConnectionStatus::Modified { original_id, other_id } => {
                let swapped_in = self.connections.get(other_id).cloned();
                let mut linked = vec![original_id.as_str()];
                if other_id != original_id {
                    linked.push(other_id.as_str());
                }
                for linked_id in linked {
                    // Only ids still carrying this pair belong to the edit.
                    if self.connection_status.get(linked_id) != Some(&status) {
                        continue;
                    }
                    if !self.restore_original(linked_id) {
                        self.connection_status.remove(linked_id);
                        self.connections.remove(linked_id);
                    }
                }
                ResetOutcome::SwappedBack(swapped_in)
            }
        };
        Some(outcome)
    }

    fn restore_original(&mut self, id: &str) -> bool {
        let Some(original) = self.original_connections.get(id).cloned() else {
            return false;
        };
        self.connections.insert(id.to_string(), original);
        self.connection_status
            .insert(id.to_string(), ConnectionStatus::Original);
        true
    }

    /// Runs `f` on the node at `path` in the current view. The node is
    /// detached from the baseline first if it is still shared. Every
    /// ancestor on the path is notified with `ChildChanged` afterwards.
    pub fn edit<R, F>(&mut self, path: &[&str], f: F) -> Result<R>
    where
        F: FnOnce(&mut CarbonTree) -> R,
    {
        let origin_id = match path.last() {
            Some(id) => id.to_string(),
            None => self.asset.id.clone(),
        };
        self.edit_at(path, path, &origin_id, f)
    }

    fn edit_at<R, F>(&mut self, full_path: &[&str], rest: &[&str], origin_id: &str, f: F) -> Result<R>
    where
        F: FnOnce(&mut CarbonTree) -> R,
    {
        let Some((id, rest)) = rest.split_first() else {
            return Ok(f(self));
        };
        let child = self
            .connections
            .get_mut(*id)
            .ok_or_else(|| not_found(full_path))?;
        let result = Arc::make_mut(child).edit_at(full_path, rest, origin_id, f)?;
        self.changes.publish(TreeEvent::ChildChanged {
            asset_id: self.asset.id.clone(),
            origin_id: origin_id.to_string(),
        });
        Ok(result)
    }
}

fn not_found(path: &[&str]) -> TraceError {
    TraceError::NodeNotFound(path.iter().map(|s| s.to_string()).collect())
}

fn distinct(values: [&Option<String>; 2]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in values.into_iter().flatten() {
        if !value.is_empty() && !out.contains(value) {
            out.push(value.clone());
        }
    }
    out
}

fn sum_present(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (None, None) => None,
        (a, b) => Some(a.unwrap_or(0.0) + b.unwrap_or(0.0)),
    }
}

impl fmt::Debug for CarbonTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CarbonTree")
            .field("asset", &self.asset.id)
            .field("entity", &self.entity.id_short)
            .field("bulk_count", &self.bulk_count)
            .field("is_simulation", &self.is_simulation)
            .field("connection_status", &self.connection_status)
            .field("connections", &self.connections)
            .finish()
    }
}
