use crate::model::CryptoType;

/// ======================= Node palette =======================
pub const ETH_NODE_COLOR: &str = "#62688F";
pub const BTC_NODE_COLOR: &str = "#F7931A";
pub const DOMAIN_NODE_COLOR: &str = "#97C2FC";
/// Color given to the address a user seeds the graph with
pub const SEED_NODE_COLOR: &str = "#FF0000";

/// ======================= Tag colors =======================
pub const FUNDING_TAG_COLOR: &str = "red";
pub const VICTIM_TAG_COLOR: &str = "blue";
pub const FUNDING_TAG_MARKERS: [&str; 2] = ["Fund", "Deposit"];
pub const VICTIM_TAG_MARKER: &str = "Victim";

/// ======================= Providers =======================
pub const ETHEREUM_PROVIDER_KEY: &str = "ethereum";
pub const BITCOIN_PROVIDER_KEY: &str = "bitcoin";
pub const DOMAIN_PROVIDER_KEY: &str = "domain";

/// Used when nothing else says which chain an address belongs to
pub const DEFAULT_CRYPTO_TYPE: CryptoType = CryptoType::Eth;

pub const DEFAULT_ETHERSCAN_API_URL: &str = "https://api.etherscan.io/api";
pub const DEFAULT_BLOCKCHAIN_INFO_API_URL: &str = "https://blockchain.info";
pub const DEFAULT_URLSCAN_API_URL: &str = "https://urlscan.io/api/v1/search/";

pub const DEFAULT_ETHEREUM_MIN_INTERVAL_MS: u64 = 5_000;
pub const DEFAULT_BITCOIN_MIN_INTERVAL_MS: u64 = 10_000;
pub const DEFAULT_DOMAIN_MIN_INTERVAL_MS: u64 = 5_000;

/// Most recent bitcoin transactions kept per fetch
pub const DEFAULT_BTC_WINDOW: usize = 10;

/// ======================= Units =======================
pub const WEI_PER_ETH: f64 = 1e18;
pub const SATOSHI_PER_BTC: f64 = 1e8;
pub const ETH_DECIMALS: usize = 4;
pub const BTC_DECIMALS: usize = 8;

pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_REDIS_KEY_PREFIX: &str = "fundtrace";
pub const DEFAULT_LOG_DIRECTORY: &str = ".logs";
