pub mod shared;
pub mod store;

pub use shared::SharedGraphStore;
pub use store::GraphStore;
pub use store::MergeOptions;
pub use store::MergeReport;
