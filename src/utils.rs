use rand::Rng;
use rand::distr::Alphanumeric;

use crate::constants::SATOSHI_PER_BTC;
use crate::constants::WEI_PER_ETH;

/// Convert a wei amount (decimal string, may exceed u64) to ETH
pub fn wei_to_eth(wei: &str) -> Option<f64> {
    wei.trim().parse::<u128>().ok().map(|wei| wei as f64 / WEI_PER_ETH)
}

pub fn satoshi_to_btc(satoshi: u64) -> f64 {
    satoshi as f64 / SATOSHI_PER_BTC
}

pub fn format_fixed(
    value: f64,
    decimals: usize,
) -> String {
    format!("{:.*}", decimals, value)
}

/// Rounds to `decimals` places, then drops trailing zeros and a dangling point
pub fn format_trimmed(
    value: f64,
    decimals: usize,
) -> String {
    let fixed = format_fixed(value, decimals);
    if !fixed.contains('.') {
        return fixed;
    }
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// 20 character alphanumeric document id
pub fn new_session_id() -> String {
    rand::rng().sample_iter(&Alphanumeric).take(20).map(char::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wei_conversion_handles_values_above_u64() {
        // 100 ETH does not fit in u64 wei
        assert_eq!(wei_to_eth("100000000000000000000"), Some(100.0));
        assert_eq!(wei_to_eth("1500000000000000000"), Some(1.5));
        assert_eq!(wei_to_eth("-1"), None);
        assert_eq!(wei_to_eth("abc"), None);
    }

    #[test]
    fn satoshi_conversion() {
        assert_eq!(format_fixed(satoshi_to_btc(12_345_678), 8), "0.12345678");
        assert_eq!(format_fixed(satoshi_to_btc(100_000_000), 8), "1.00000000");
    }

    #[test]
    fn trimmed_format_hides_float_noise() {
        assert_eq!(format_trimmed(0.1 + 0.2, 4), "0.3");
        assert_eq!(format_trimmed(3.0, 4), "3");
        assert_eq!(format_trimmed(0.12345678, 8), "0.12345678");
        assert_eq!(format_trimmed(12.0, 0), "12");
    }

    #[test]
    fn session_ids_are_unique_enough() {
        let a = new_session_id();
        let b = new_session_id();
        assert_eq!(a.len(), 20);
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
