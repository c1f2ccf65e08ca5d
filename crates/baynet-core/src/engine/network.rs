//! # Bayesian Network Structure
//!
//! [`BayesianNetwork`] owns a DAG of named variables, each carrying a
//! [`ProbabilityModel`]. The network has two states:
//!
//! - **constructing**: [`add_variable`](BayesianNetwork::add_variable) and
//!   [`add_edge`](BayesianNetwork::add_edge) are allowed;
//! - **baked**: structure is validated, topologically ordered, and frozen.
//!   Only queries are allowed (see [`crate::engine::inference`]).
//!
//! A node's graph parents are kept in edge insertion order and must match the
//! parent order of its probability table exactly.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::engine::errors::{BayesError, BayesResult};
use crate::engine::model::{ParentVec, ProbabilityModel};
use crate::engine::variable::Variable;

/// Index of a node in insertion order.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub(crate) struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) model: ProbabilityModel,
    pub(crate) parents: ParentVec<NodeId>,
    pub(crate) children: ParentVec<NodeId>,
}

impl Node {
    pub(crate) fn variable(&self) -> &Variable {
        self.model.subject()
    }
}

/// Structure cached by [`BayesianNetwork::bake`].
#[derive(Debug, Clone)]
pub(crate) struct BakedStructure {
    pub(crate) order: Vec<NodeId>,
}

/// A discrete Bayesian network.
#[derive(Debug, Clone)]
pub struct BayesianNetwork {
    name: String,
    nodes: Vec<Node>,
    index: FxHashMap<Arc<str>, NodeId>,
    edge_count: usize,
    baked: Option<BakedStructure>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    Visiting,
    Done,
}

impl BayesianNetwork {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
            index: FxHashMap::default(),
            edge_count: 0,
            baked: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registers `variable` with its probability model.
    ///
    /// The model's subject must be `variable`. Parents named by the model are
    /// connected separately with [`add_edge`](Self::add_edge).
    pub fn add_variable(&mut self, variable: Variable, model: ProbabilityModel) -> BayesResult<()> {
        self.ensure_mutable("add_variable")?;
        if model.subject() != &variable {
            return Err(BayesError::ValidationError(format!(
                "add_variable: model describes '{}', not '{}'",
                model.subject().name(),
                variable.name()
            )));
        }
        if self.index.contains_key(variable.name()) {
            return Err(BayesError::DuplicateError(format!(
                "add_variable: '{}' is already in network '{}'",
                variable.name(),
                self.name
            )));
        }

        let id = NodeId(u32::try_from(self.nodes.len()).map_err(|_| {
            BayesError::Execution("add_variable: too many variables".into())
        })?);
        self.index.insert(variable.shared_name(), id);
        self.nodes.push(Node {
            model,
            parents: ParentVec::new(),
            children: ParentVec::new(),
        });
        Ok(())
    }

    /// Shorthand for `add_variable(model.subject().clone(), model)`.
    pub fn add_model(&mut self, model: ProbabilityModel) -> BayesResult<()> {
        let variable = model.subject().clone();
        self.add_variable(variable, model)
    }

    /// Records a directed dependency `parent -> child`.
    pub fn add_edge(&mut self, parent: &str, child: &str) -> BayesResult<()> {
        self.ensure_mutable("add_edge")?;
        let parent_id = self.require(parent, "add_edge")?;
        let child_id = self.require(child, "add_edge")?;
        if self.nodes[child_id.index()].parents.contains(&parent_id) {
            return Err(BayesError::DuplicateError(format!(
                "add_edge: edge '{}' -> '{}' already exists",
                parent, child
            )));
        }
        self.nodes[child_id.index()].parents.push(parent_id);
        self.nodes[parent_id.index()].children.push(child_id);
        self.edge_count += 1;
        Ok(())
    }

    /// Validates and freezes the structure.
    ///
    /// Checks, in order:
    /// 1. the graph is acyclic (`CycleError` naming the cycle otherwise);
    /// 2. every node's graph parents equal its table parents, in order
    ///    (`StructureError` otherwise).
    ///
    /// On success the topological order is cached and further structural
    /// changes are refused. Baking an already baked network is a no-op. On
    /// failure the network stays unbaked and can be fixed.
    pub fn bake(&mut self) -> BayesResult<()> {
        if self.baked.is_some() {
            return Ok(());
        }

        let order = self.topological_sort()?;
        self.check_table_parents()?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            network = %self.name,
            variables = self.nodes.len(),
            edges = self.edge_count,
            "baked network in order [{}]",
            order
                .iter()
                .map(|id| self.nodes[id.index()].variable().name())
                .collect::<Vec<_>>()
                .join(", ")
        );

        self.baked = Some(BakedStructure { order });
        Ok(())
    }

    pub fn is_baked(&self) -> bool {
        self.baked.is_some()
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Variables in insertion order.
    pub fn variables(&self) -> impl Iterator<Item = &Variable> + '_ {
        self.nodes.iter().map(Node::variable)
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.index
            .get(name)
            .map(|id| self.nodes[id.index()].variable())
    }

    pub fn model(&self, name: &str) -> Option<&ProbabilityModel> {
        self.index.get(name).map(|id| &self.nodes[id.index()].model)
    }

    /// Graph parents of `name` in edge insertion order.
    pub fn parents(&self, name: &str) -> BayesResult<Vec<&str>> {
        let id = self.require(name, "parents")?;
        Ok(self.names(&self.nodes[id.index()].parents))
    }

    /// Graph children of `name` in edge insertion order.
    pub fn children(&self, name: &str) -> BayesResult<Vec<&str>> {
        let id = self.require(name, "children")?;
        Ok(self.names(&self.nodes[id.index()].children))
    }

    /// Topological order computed by [`bake`](Self::bake); `None` before.
    pub fn topological_order(&self) -> Option<Vec<&str>> {
        self.baked.as_ref().map(|baked| self.names(&baked.order))
    }

    pub(crate) fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub(crate) fn node_id(&self, name: &str) -> Option<NodeId> {
        self.index.get(name).copied()
    }

    pub(crate) fn baked_structure(&self, operation: &str) -> BayesResult<&BakedStructure> {
        self.baked.as_ref().ok_or_else(|| {
            BayesError::StructureError(format!(
                "{}: network '{}' must be baked first",
                operation, self.name
            ))
        })
    }

    fn names(&self, ids: &[NodeId]) -> Vec<&str> {
        ids.iter()
            .map(|id| self.nodes[id.index()].variable().name())
            .collect()
    }

    fn ensure_mutable(&self, operation: &str) -> BayesResult<()> {
        if self.baked.is_some() {
            return Err(BayesError::StructureError(format!(
                "{}: network '{}' is baked and can no longer change",
                operation, self.name
            )));
        }
        Ok(())
    }

    fn require(&self, name: &str, operation: &str) -> BayesResult<NodeId> {
        self.node_id(name).ok_or_else(|| {
            BayesError::LookupError(format!(
                "{}: no variable '{}' in network '{}'",
                operation, name, self.name
            ))
        })
    }

    /// Depth-first search over parents. Emits each node after all of its
    /// parents, visiting roots in insertion order so the result is stable.
    ///
    /// Uses an explicit stack of `(node, next parent slot)` frames, so chain
    /// length is bounded by memory rather than the call stack.
    fn topological_sort(&self) -> BayesResult<Vec<NodeId>> {
        let mut marks = vec![Mark::Unvisited; self.nodes.len()];
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<(NodeId, usize)> = Vec::new();
        for idx in 0..self.nodes.len() {
            if marks[idx] != Mark::Unvisited {
                continue;
            }
            marks[idx] = Mark::Visiting;
            stack.push((NodeId(idx as u32), 0));
            while let Some(frame) = stack.last_mut() {
                let (id, slot) = *frame;
                let parents = &self.nodes[id.index()].parents;
                if slot == parents.len() {
                    stack.pop();
                    marks[id.index()] = Mark::Done;
                    order.push(id);
                    continue;
                }
                frame.1 += 1;
                let parent = parents[slot];
                match marks[parent.index()] {
                    Mark::Done => {}
                    Mark::Unvisited => {
                        marks[parent.index()] = Mark::Visiting;
                        stack.push((parent, 0));
                    }
                    Mark::Visiting => {
                        let path: Vec<NodeId> = stack.iter().map(|&(id, _)| id).collect();
                        return Err(self.cycle_error(parent, &path));
                    }
                }
            }
        }
        Ok(order)
    }

    // `path` runs child -> parent; reverse it so the message follows edge direction.
    fn cycle_error(&self, repeated: NodeId, path: &[NodeId]) -> BayesError {
        let start = path.iter().position(|&id| id == repeated).unwrap_or(0);
        let mut cycle: Vec<&str> = path[start..]
            .iter()
            .map(|id| self.nodes[id.index()].variable().name())
            .collect();
        cycle.push(self.nodes[repeated.index()].variable().name());
        cycle.reverse();
        BayesError::CycleError(format!(
            "bake: network '{}' contains the cycle {}",
            self.name,
            cycle.join(" -> ")
        ))
    }

    fn check_table_parents(&self) -> BayesResult<()> {
        for node in &self.nodes {
            let declared = node.model.parents();
            let matches = declared.len() == node.parents.len()
                && declared
                    .iter()
                    .zip(&node.parents)
                    .all(|(table_parent, id)| table_parent == self.nodes[id.index()].variable());
            if !matches {
                let declared: Vec<&str> = declared.iter().map(Variable::name).collect();
                return Err(BayesError::StructureError(format!(
                    "bake: '{}' has graph parents [{}] but its table is over [{}]",
                    node.variable().name(),
                    self.names(&node.parents).join(", "),
                    declared.join(", ")
                )));
            }
        }
        Ok(())
    }
}
