pub mod crypto;
pub mod graph;
pub mod session;
pub mod transaction;

pub use crypto::CryptoType;
pub use graph::Edge;
pub use graph::GraphSnapshot;
pub use graph::Node;
pub use session::SessionDocument;
pub use session::SessionMeta;
pub use session::SessionSummary;
pub use session::StoredEdge;
pub use transaction::Transaction;
pub use transaction::TransferAmount;
