//! Whole-snapshot conversion between the live graph and a stored document.

use chrono::DateTime;
use chrono::Utc;
use tracing::info;

use crate::constants::DEFAULT_CRYPTO_TYPE;
use crate::graph::GraphStore;
use crate::graph::MergeOptions;
use crate::model::Edge;
use crate::model::Node;
use crate::model::SessionDocument;
use crate::model::SessionMeta;
use crate::model::StoredEdge;
use crate::model::Transaction;

/// Everything a loaded document puts back into a session.
#[derive(Debug, Clone)]
pub struct RestoredSession {
    pub meta: SessionMeta,
    pub graph: GraphStore,
    pub last_transactions: Vec<Transaction>,
}

pub fn capture(
    meta: &SessionMeta,
    graph: &GraphStore,
    last_transactions: &[Transaction],
    now: DateTime<Utc>,
) -> SessionDocument {
    SessionDocument {
        id: meta.id.clone(),
        name: meta.name.clone(),
        user_id: meta.user_id.clone(),
        created: meta.created,
        last_modified: now,
        nodes: graph.nodes().cloned().collect(),
        edges: graph.edges().map(StoredEdge::from).collect(),
        last_transactions: last_transactions.to_vec(),
    }
}

/// Rebuilds the graph from a document.
///
/// Tag colors are re-applied over the stored color. Stored edges on the same
/// ordered pair collapse into one, with a missing count read as a single
/// transaction and a missing currency taken from the sending node. The detail
/// view is refilled with every stored node transaction.
pub fn restore(
    document: SessionDocument,
    options: MergeOptions,
) -> RestoredSession {
    let meta = document.meta();

    let nodes: Vec<Node> = document
        .nodes
        .into_iter()
        .map(|mut node| {
            node.apply_tag_colors();
            node.refresh_title();
            node
        })
        .collect();

    let edges: Vec<Edge> = document
        .edges
        .into_iter()
        .map(|stored| {
            let currency = stored
                .currency
                .or_else(|| nodes.iter().find(|node| node.id == stored.from).map(|node| node.crypto_type))
                .unwrap_or(DEFAULT_CRYPTO_TYPE);
            Edge {
                from: stored.from,
                to: stored.to,
                amount: stored.amount,
                count: stored.count.filter(|count| *count > 0).unwrap_or(1),
                label: String::new(),
                currency,
                color: currency.default_color().to_string(),
            }
        })
        .collect();

    let last_transactions: Vec<Transaction> =
        nodes.iter().flat_map(|node| node.transactions.iter().cloned()).collect();

    let graph = GraphStore::from_parts(nodes, edges, options);
    info!(
        "session_restored::{}::nodes::{}::edges::{}",
        meta.id,
        graph.node_count(),
        graph.edge_count()
    );

    RestoredSession {
        meta,
        graph,
        last_transactions,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::model::CryptoType;
    use crate::test_utils::fixtures::TestFixtures;

    fn document_with(
        nodes: serde_json::Value,
        edges: serde_json::Value,
    ) -> SessionDocument {
        serde_json::from_value(json!({
            "id": "s1",
            "name": "case 42",
            "userId": "alice",
            "created": "2024-01-01T00:00:00Z",
            "lastModified": "2024-01-02T00:00:00Z",
            "nodes": nodes,
            "edges": edges,
        }))
        .unwrap()
    }

    fn stored_node(
        id: &str,
        color: &str,
        tags: &[&str],
    ) -> serde_json::Value {
        json!({
            "id": id,
            "label": id,
            "title": id,
            "cryptoType": "ETH",
            "tags": tags,
            "color": color,
            "transactions": [],
        })
    }

    #[test]
    fn raw_edges_on_one_pair_collapse_on_load() {
        let document = document_with(
            json!([stored_node("A", "#62688F", &[]), stored_node("B", "#62688F", &[])]),
            json!([
                {"from": "A", "to": "B", "amount": 1.0},
                {"from": "A", "to": "B", "amount": 2.0},
            ]),
        );
        let restored = restore(document, MergeOptions::default());

        assert_eq!(restored.graph.edge_count(), 1);
        let edge = restored.graph.edge("A", "B").unwrap();
        assert_eq!((edge.amount, edge.count), (3.0, 2));
        assert_eq!(edge.currency, CryptoType::Eth);
        assert_eq!(edge.label, "3 ETH (2)");
    }

    #[test]
    fn stored_counts_are_summed() {
        let document = document_with(
            json!([stored_node("A", "#62688F", &[]), stored_node("B", "#62688F", &[])]),
            json!([
                {"from": "A", "to": "B", "amount": 4.0, "count": 3, "currency": "ETH"},
                {"from": "A", "to": "B", "amount": 1.0},
                {"from": "B", "to": "A", "amount": 1.0, "count": 1},
            ]),
        );
        let restored = restore(document, MergeOptions::default());

        assert_eq!(restored.graph.edge("A", "B").unwrap().count, 4);
        assert_eq!(restored.graph.edge("B", "A").unwrap().count, 1);
    }

    #[test]
    fn zero_stored_count_is_read_as_one() {
        let document = document_with(
            json!([stored_node("A", "#62688F", &[]), stored_node("B", "#62688F", &[])]),
            json!([{"from": "A", "to": "B", "amount": 1.0, "count": 0}]),
        );
        let mut restored = restore(document, MergeOptions::default());

        let edge = restored.graph.edge("A", "B").unwrap();
        assert_eq!((edge.count, edge.label.as_str()), (1, "1 ETH (1)"));

        restored.graph.merge_transactions(&[TestFixtures::eth_tx("A", "B", "2")], CryptoType::Eth);
        assert_eq!(restored.graph.edge("A", "B").unwrap().count, 2);
    }

    #[test]
    fn tag_colors_win_over_stored_color_only_when_a_rule_matches() {
        let document = document_with(
            json!([
                stored_node("A", "#123456", &["Fund Deposit", "Victim"]),
                stored_node("B", "#123456", &["cold storage"]),
            ]),
            json!([]),
        );
        let restored = restore(document, MergeOptions::default());

        assert_eq!(restored.graph.node("A").unwrap().color, "blue");
        assert_eq!(restored.graph.node("A").unwrap().display_title, "A\nFund Deposit, Victim");
        assert_eq!(restored.graph.node("B").unwrap().color, "#123456");
    }

    #[test]
    fn capture_then_restore_keeps_the_graph() {
        let meta = TestFixtures::session_meta("s1", "alice", 0);
        let mut graph = GraphStore::default();
        graph.ensure_node("A", CryptoType::Eth, "#FF0000");
        let batch = vec![TestFixtures::eth_tx("A", "B", "1"), TestFixtures::eth_tx("B", "A", "2")];
        graph.merge_transactions(&batch, CryptoType::Eth);

        let document = capture(&meta, &graph, &batch, TestFixtures::ts(60));
        assert_eq!(document.last_modified, TestFixtures::ts(60));
        assert_eq!(document.last_transactions, batch);

        let restored = restore(document, MergeOptions::default());
        assert_eq!(restored.meta, meta);
        assert_eq!(restored.graph.snapshot(), graph.snapshot());
        // A and B each hold both transactions
        assert_eq!(restored.last_transactions.len(), 4);
    }
}
