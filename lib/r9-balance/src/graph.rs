/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the r9 authors
 */

//! The dependency graph of discovered cluster references.
//!
//! The hierarchical policy builder owns one of these: roots are the
//! statically subscribed clusters, edges are added as aggregate cluster
//! configurations reveal sub-cluster references. The graph answers which
//! clusters need a control plane watch, deduplicated across parents, and
//! which watches to tear down after a configuration update. The control
//! plane gives no structural guarantee against an operator wiring a cluster
//! to itself or an ancestor, so every edge update runs explicit cycle
//! detection, with a depth cap as the backstop.

use std::collections::{HashMap, VecDeque};

use foldhash::fast::FixedState;
use indexmap::IndexSet;
use thiserror::Error;

use r9_types::name::NodeName;

pub const DEFAULT_MAX_DEPTH: usize = 16;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClusterGraphError {
    #[error("cyclic cluster reference: {0}")]
    CycleDetected(String),
    #[error("cluster reference chain deeper than {0}")]
    DepthExceeded(usize),
}

type EdgeMap = HashMap<NodeName, IndexSet<NodeName>, FixedState>;

pub struct ClusterGraph {
    roots: IndexSet<NodeName>,
    edges: EdgeMap,
    max_depth: usize,
}

impl Default for ClusterGraph {
    fn default() -> Self {
        ClusterGraph::new()
    }
}

impl ClusterGraph {
    pub fn new() -> Self {
        ClusterGraph::with_max_depth(DEFAULT_MAX_DEPTH)
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        ClusterGraph {
            roots: IndexSet::new(),
            edges: HashMap::with_hasher(FixedState::with_seed(0)),
            max_depth,
        }
    }

    /// Replace the statically subscribed root set.
    pub fn set_roots(&mut self, roots: impl IntoIterator<Item = NodeName>) {
        self.roots = roots.into_iter().collect();
    }

    /// Record that `parent`'s configuration references `children`, replacing
    /// whatever children were previously recorded for it.
    ///
    /// Rejected with the edge set unchanged if the update would create a
    /// reference cycle or a chain deeper than the configured cap.
    pub fn update_children(
        &mut self,
        parent: &NodeName,
        children: impl IntoIterator<Item = NodeName>,
    ) -> Result<(), ClusterGraphError> {
        let new_children: IndexSet<NodeName> = children.into_iter().collect();
        let old_children = self.edges.insert(parent.clone(), new_children);
        if let Err(e) = self.validate() {
            match old_children {
                Some(old) => {
                    self.edges.insert(parent.clone(), old);
                }
                None => {
                    self.edges.remove(parent);
                }
            }
            return Err(e);
        }
        Ok(())
    }

    /// Drop the recorded children of `name`, e.g. when its resource is
    /// removed by the control plane.
    pub fn remove_cluster(&mut self, name: &NodeName) {
        self.edges.remove(name);
    }

    /// All clusters reachable from the roots, each exactly once, in
    /// first-discovery order. This is the set of control plane watches
    /// that must exist.
    pub fn reachable(&self) -> IndexSet<NodeName> {
        let mut seen: IndexSet<NodeName> = IndexSet::new();
        let mut queue: VecDeque<NodeName> = self.roots.iter().cloned().collect();
        while let Some(name) = queue.pop_front() {
            if !seen.insert(name.clone()) {
                continue;
            }
            if let Some(children) = self.edges.get(&name) {
                for c in children {
                    if !seen.contains(c) {
                        queue.push_back(c.clone());
                    }
                }
            }
        }
        seen
    }

    /// Drop edges of clusters no longer reachable from any root and return
    /// their names; the caller tears down the matching watches.
    pub fn prune(&mut self) -> Vec<NodeName> {
        let reachable = self.reachable();
        let mut watched: IndexSet<NodeName> = IndexSet::new();
        for (parent, children) in &self.edges {
            watched.insert(parent.clone());
            for c in children {
                watched.insert(c.clone());
            }
        }
        let removed: Vec<NodeName> = watched
            .into_iter()
            .filter(|n| !reachable.contains(n))
            .collect();
        self.edges.retain(|parent, _| reachable.contains(parent));
        removed
    }

    fn validate(&self) -> Result<(), ClusterGraphError> {
        let mut path = IndexSet::new();
        for root in &self.roots {
            self.visit(root, &mut path)?;
        }
        // parents not (yet) reachable from a root can still form a cycle
        for parent in self.edges.keys() {
            self.visit(parent, &mut path)?;
        }
        Ok(())
    }

    fn visit<'a>(
        &'a self,
        name: &'a NodeName,
        path: &mut IndexSet<&'a NodeName>,
    ) -> Result<(), ClusterGraphError> {
        if path.len() >= self.max_depth {
            return Err(ClusterGraphError::DepthExceeded(self.max_depth));
        }
        if !path.insert(name) {
            let offset = path.get_index_of(name).unwrap_or(0);
            let mut cycle = path
                .iter()
                .skip(offset)
                .map(|n| n.as_str())
                .collect::<Vec<_>>();
            cycle.push(name.as_str());
            return Err(ClusterGraphError::CycleDetected(cycle.join(" -> ")));
        }
        if let Some(children) = self.edges.get(name) {
            for c in children {
                self.visit(c, path)?;
            }
        }
        path.pop();
        Ok(())
    }
}
