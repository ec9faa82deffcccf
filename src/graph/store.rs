use std::collections::HashMap;
use std::collections::HashSet;

use petgraph::Graph;
use petgraph::prelude::*;
use tracing::debug;
use tracing::warn;

use crate::Result;
use crate::err_with_loc;
use crate::error::TraceError;
use crate::model::CryptoType;
use crate::model::Edge;
use crate::model::GraphSnapshot;
use crate::model::Node;
use crate::model::Transaction;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOptions {
    /// Skip a transaction whose hash is already in the graph. Off by default, in
    /// which case merging is additive and re-merging a batch doubles its edges.
    pub dedup_by_hash: bool,
}

/// What one batch did to the graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub merged: usize,
    pub skipped_duplicates: usize,
    pub new_nodes: usize,
    pub new_edges: usize,
}

/// Live node/edge state of one session.
///
/// Nodes are keyed by address and kept in insertion order. There is at most one
/// edge per ordered `(from, to)` pair; `(A, B)` and `(B, A)` are separate edges.
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    graph: Graph<Node, Edge>,
    node_indices: HashMap<String, NodeIndex>,
    seen_hashes: HashSet<String>,
    options: MergeOptions,
}

impl GraphStore {
    pub fn new(options: MergeOptions) -> Self {
        Self {
            graph: Graph::new(),
            node_indices: HashMap::new(),
            seen_hashes: HashSet::new(),
            options,
        }
    }

    /// Builds a store from stored parts. Duplicate node ids keep the first entry,
    /// edges on an already present pair are folded into it.
    pub fn from_parts(
        nodes: Vec<Node>,
        edges: Vec<Edge>,
        options: MergeOptions,
    ) -> Self {
        let mut store = Self::new(options);
        for node in nodes {
            if store.node_indices.contains_key(&node.id) {
                warn!("graph_restore_duplicate_node::{}", node.id);
                continue;
            }
            let id = node.id.clone();
            let idx = store.graph.add_node(node);
            store.node_indices.insert(id, idx);
        }
        for mut edge in edges {
            edge.count = edge.count.max(1);
            let from_idx = store.node_or_placeholder(&edge.from, edge.currency);
            let to_idx = store.node_or_placeholder(&edge.to, edge.currency);
            match store.graph.find_edge(from_idx, to_idx) {
                Some(existing) => store.graph[existing].absorb(edge.amount, edge.count),
                None => {
                    edge.render_label();
                    store.graph.add_edge(from_idx, to_idx, edge);
                },
            }
        }
        store.rebuild_indices();
        store
    }

    // Rebuild the lookup tables from the graph
    pub fn rebuild_indices(&mut self) {
        self.node_indices.clear();
        self.seen_hashes.clear();
        for node_index in self.graph.node_indices() {
            if let Some(node) = self.graph.node_weight(node_index) {
                self.node_indices.insert(node.id.clone(), node_index);
                self.seen_hashes.extend(node.transactions.iter().filter_map(|tx| tx.hash.clone()));
            }
        }
    }

    fn node_or_placeholder(
        &mut self,
        address: &str,
        crypto_type: CryptoType,
    ) -> NodeIndex {
        if let Some(&idx) = self.node_indices.get(address) {
            return idx;
        }
        let idx = self.graph.add_node(Node::new(address, crypto_type, crypto_type.default_color()));
        self.node_indices.insert(address.to_string(), idx);
        idx
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(
        &self,
        id: &str,
    ) -> bool {
        self.node_indices.contains_key(id)
    }

    pub fn node(
        &self,
        id: &str,
    ) -> Option<&Node> {
        self.node_indices.get(id).map(|&idx| &self.graph[idx])
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_weights()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.graph.edge_weights()
    }

    pub fn edge(
        &self,
        from: &str,
        to: &str,
    ) -> Option<&Edge> {
        let from_idx = *self.node_indices.get(from)?;
        let to_idx = *self.node_indices.get(to)?;
        self.graph.find_edge(from_idx, to_idx).map(|idx| &self.graph[idx])
    }

    fn node_mut(
        &mut self,
        id: &str,
    ) -> Result<&mut Node> {
        let idx = *self
            .node_indices
            .get(id)
            .ok_or_else(|| err_with_loc!(TraceError::NotFound(format!("node {}", id))))?;
        Ok(&mut self.graph[idx])
    }

    /// Adds an empty node if the address is unknown. Returns whether it was created.
    pub fn ensure_node(
        &mut self,
        address: &str,
        crypto_type: CryptoType,
        color: &str,
    ) -> bool {
        if self.node_indices.contains_key(address) {
            return false;
        }
        let idx = self.graph.add_node(Node::new(address, crypto_type, color));
        self.node_indices.insert(address.to_string(), idx);
        true
    }

    // Append to an existing node or create it holding just this transaction
    fn append_to_node(
        &mut self,
        address: &str,
        crypto_type: CryptoType,
        tx: &Transaction,
        report: &mut MergeReport,
    ) -> NodeIndex {
        match self.node_indices.get(address) {
            Some(&idx) => {
                self.graph[idx].transactions.push(tx.clone());
                idx
            },
            None => {
                let mut node = Node::new(address, crypto_type, crypto_type.default_color());
                node.transactions.push(tx.clone());
                let idx = self.graph.add_node(node);
                self.node_indices.insert(address.to_string(), idx);
                report.new_nodes += 1;
                idx
            },
        }
    }

    /// Folds one fetched batch into the graph, in batch order.
    ///
    /// Each transaction is appended at its `to` endpoint, then at its `from`
    /// endpoint, and folded into the edge of its ordered pair. A self-transfer
    /// therefore appears twice in its node's sequence.
    pub fn merge_transactions(
        &mut self,
        transactions: &[Transaction],
        crypto_type: CryptoType,
    ) -> MergeReport {
        let mut report = MergeReport::default();

        for tx in transactions {
            if self.options.dedup_by_hash {
                if let Some(hash) = &tx.hash {
                    if self.seen_hashes.contains(hash) {
                        debug!("graph_merge_skipped_duplicate::{}", hash);
                        report.skipped_duplicates += 1;
                        continue;
                    }
                }
            }

            let to_idx = self.append_to_node(&tx.to, crypto_type, tx, &mut report);
            let from_idx = self.append_to_node(&tx.from, crypto_type, tx, &mut report);

            match self.graph.find_edge(from_idx, to_idx) {
                Some(edge_idx) => self.graph[edge_idx].absorb(tx.value(), 1),
                None => {
                    self.graph.add_edge(from_idx, to_idx, Edge::from_transaction(tx, crypto_type));
                    report.new_edges += 1;
                },
            }

            if let Some(hash) = &tx.hash {
                self.seen_hashes.insert(hash.clone());
            }
            report.merged += 1;
        }

        debug!(
            "graph_merged::{}::merged::{}::skipped::{}::new_nodes::{}::new_edges::{}",
            crypto_type, report.merged, report.skipped_duplicates, report.new_nodes, report.new_edges
        );
        report
    }

    pub fn add_tag(
        &mut self,
        id: &str,
        tag: &str,
    ) -> Result<()> {
        let tag = tag.trim();
        if tag.is_empty() {
            return Err(err_with_loc!(TraceError::ValidationError("label must not be empty".to_string())));
        }
        self.node_mut(id)?.add_tag(tag);
        Ok(())
    }

    /// Manual override, holds until the next tag recolor pass.
    pub fn set_color(
        &mut self,
        id: &str,
        color: &str,
    ) -> Result<()> {
        let color = color.trim();
        if color.is_empty() {
            return Err(err_with_loc!(TraceError::ValidationError("color must not be empty".to_string())));
        }
        self.node_mut(id)?.color = color.to_string();
        Ok(())
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.nodes().cloned().collect(),
            edges: self.edges().cloned().collect(),
        }
    }

    /// Swaps in a whole new graph, keeping this store's merge options.
    pub fn replace(
        &mut self,
        other: GraphStore,
    ) {
        let options = self.options;
        *self = other;
        self.options = options;
    }

    pub fn clear(&mut self) {
        let options = self.options;
        *self = Self::new(options);
    }
}
