use serde::Deserialize;
use serde::Serialize;

use super::CryptoType;
use super::Transaction;
use crate::constants::FUNDING_TAG_COLOR;
use crate::constants::FUNDING_TAG_MARKERS;
use crate::constants::VICTIM_TAG_COLOR;
use crate::constants::VICTIM_TAG_MARKER;
use crate::utils::format_trimmed;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub label: String,
    #[serde(rename = "title")]
    pub display_title: String,
    pub crypto_type: CryptoType,
    #[serde(default)]
    pub tags: Vec<String>,
    pub color: String,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl Node {
    pub fn new(
        address: impl Into<String>,
        crypto_type: CryptoType,
        color: impl Into<String>,
    ) -> Self {
        let id = address.into();
        Self {
            label: id.clone(),
            display_title: id.clone(),
            id,
            crypto_type,
            tags: Vec::new(),
            color: color.into(),
            transactions: Vec::new(),
        }
    }

    /// Append a tag and run a tag recolor pass.
    pub fn add_tag(
        &mut self,
        tag: impl Into<String>,
    ) {
        self.tags.push(tag.into());
        self.apply_tag_colors();
        self.refresh_title();
    }

    /// Recolor from tags. Leaves the current color alone when no tag matches.
    pub fn apply_tag_colors(&mut self) {
        if let Some(color) = tag_color(&self.tags) {
            self.color = color.to_string();
        }
    }

    pub fn refresh_title(&mut self) {
        self.display_title = if self.tags.is_empty() {
            self.id.clone()
        } else {
            format!("{}\n{}", self.id, self.tags.join(", "))
        };
    }
}

/// Color implied by a tag sequence. Tags are scanned in insertion order, a later
/// matching tag overrides an earlier one. Matching is case-sensitive.
pub fn tag_color(tags: &[String]) -> Option<&'static str> {
    let mut color = None;
    for tag in tags {
        if FUNDING_TAG_MARKERS.iter().any(|marker| tag.contains(marker)) {
            color = Some(FUNDING_TAG_COLOR);
        }
        if tag.contains(VICTIM_TAG_MARKER) {
            color = Some(VICTIM_TAG_COLOR);
        }
    }
    color
}

/// Aggregated flow along one ordered `(from, to)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub amount: f64,
    pub count: u32,
    pub label: String,
    pub currency: CryptoType,
    #[serde(default)]
    pub color: String,
}

impl Edge {
    pub fn from_transaction(
        tx: &Transaction,
        currency: CryptoType,
    ) -> Self {
        let mut edge = Self {
            from: tx.from.clone(),
            to: tx.to.clone(),
            amount: tx.value(),
            count: 1,
            label: String::new(),
            currency,
            color: currency.default_color().to_string(),
        };
        edge.render_label();
        edge
    }

    pub fn absorb(
        &mut self,
        amount: f64,
        count: u32,
    ) {
        self.amount += amount;
        self.count += count;
        self.render_label();
    }

    /// `"{amount} {currency} ({count})"`, the amount rounded to the currency's precision
    pub fn render_label(&mut self) {
        let amount = match self.currency.decimals() {
            Some(decimals) => format_trimmed(self.amount, decimals),
            None => self.amount.to_string(),
        };
        self.label = format!("{} {} ({})", amount, self.currency, self.count);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::test_utils::fixtures::TestFixtures;

    fn tags(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[rstest]
    #[case(&["Fund Deposit"], Some("red"))]
    #[case(&["Exchange Deposit"], Some("red"))]
    #[case(&["Victim"], Some("blue"))]
    #[case(&["Fund Deposit", "Victim"], Some("blue"))]
    #[case(&["Victim", "Funder"], Some("red"))]
    #[case(&["fund", "victim"], None)]
    #[case(&["cold wallet"], None)]
    fn tag_rules_last_match_wins(
        #[case] input: &[&str],
        #[case] expected: Option<&str>,
    ) {
        assert_eq!(tag_color(&tags(input)), expected);
    }

    #[test]
    fn victim_tag_turns_funded_node_blue() {
        let mut node = Node::new("0xa", CryptoType::Eth, "#62688F");
        node.add_tag("Fund Deposit");
        assert_eq!(node.color, "red");
        node.add_tag("Victim");
        assert_eq!(node.color, "blue");
        assert_eq!(node.display_title, "0xa\nFund Deposit, Victim");
    }

    #[test]
    fn unmatched_tag_keeps_manual_color() {
        let mut node = Node::new("0xa", CryptoType::Eth, "#62688F");
        node.color = "#00FF00".to_string();
        node.add_tag("hot wallet");
        assert_eq!(node.color, "#00FF00");
    }

    #[test]
    fn edge_label_tracks_amount_and_count() {
        let mut edge = Edge::from_transaction(&TestFixtures::eth_tx("0xa", "0xb", "1"), CryptoType::Eth);
        assert_eq!(edge.label, "1 ETH (1)");
        edge.absorb(2.0, 1);
        assert_eq!((edge.amount, edge.count), (3.0, 2));
        assert_eq!(edge.label, "3 ETH (2)");
        assert_eq!(edge.color, "#62688F");
    }

    #[test]
    fn edge_label_rounds_to_currency_precision() {
        let mut edge = Edge::from_transaction(&TestFixtures::eth_tx("0xa", "0xb", "0.1000"), CryptoType::Eth);
        edge.absorb(0.2, 1);
        assert_eq!(edge.label, "0.3 ETH (2)");

        let mut btc = Edge::from_transaction(&TestFixtures::btc_tx("1A", "1B", "0.00000001"), CryptoType::Btc);
        btc.absorb(0.00000002, 1);
        assert_eq!(btc.label, "0.00000003 BTC (2)");
    }
}
