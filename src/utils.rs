use crate::error::WalletError;
use ethers::types::{Address, U256};
use std::str::FromStr;

pub fn format_ether(wei: U256) -> String {
    ethers::utils::format_units(wei, "ether").unwrap_or_else(|_| "0.0".to_string())
}

/// Parse a user/provider decimal string. Blank, non-numeric and non-finite
/// input yields `None`.
pub fn parse_decimal(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a transfer amount, rejecting anything that is not strictly positive.
pub fn parse_positive_amount(input: &str) -> Result<f64, WalletError> {
    match parse_decimal(input) {
        Some(v) if v > 0.0 => Ok(v),
        Some(_) => Err(WalletError::InvalidInput(
            "amount must be greater than zero".into(),
        )),
        None if input.trim().is_empty() => {
            Err(WalletError::InvalidInput("amount is required".into()))
        }
        None => Err(WalletError::InvalidInput(format!(
            "'{}' is not a valid amount",
            input.trim()
        ))),
    }
}

/// Validate an EVM recipient address
pub fn parse_recipient(input: &str) -> Result<Address, WalletError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(WalletError::InvalidInput("recipient is required".into()));
    }
    Address::from_str(trimmed)
        .map_err(|_| WalletError::InvalidInput(format!("'{}' is not a valid address", trimmed)))
}

/// Convert a decimal token amount into base units for `decimals` precision.
pub fn to_base_units(amount: &str, decimals: u8) -> Result<U256, WalletError> {
    ethers::utils::parse_units(amount.trim(), decimals as u32)
        .map(Into::into)
        .map_err(|e| WalletError::InvalidInput(format!("invalid amount '{}': {}", amount.trim(), e)))
}

pub fn from_base_units(value: U256, decimals: u8) -> String {
    ethers::utils::format_units(value, decimals as u32).unwrap_or_else(|_| "0".to_string())
}

/// Cut a non-negative decimal string down to `places` fraction digits,
/// padding with zeros when it has fewer. Never rounds up.
pub fn truncate_decimals(value: &str, places: usize) -> String {
    let value = value.trim();
    let (whole, fraction) = value.split_once('.').unwrap_or((value, ""));
    let whole = if whole.is_empty() { "0" } else { whole };
    let mut fraction: String = fraction.chars().take(places).collect();
    while fraction.len() < places {
        fraction.push('0');
    }
    if places == 0 {
        whole.to_string()
    } else {
        format!("{}.{}", whole, fraction)
    }
}

/// Six decimal places, the precision of the amount field
pub fn format_amount(value: f64) -> String {
    format!("{:.6}", value)
}

pub fn format_usd(value: f64) -> String {
    format!("${:.2}", value)
}

/// "+$50.00" / "-$50.00"
pub fn format_signed_usd(value: f64) -> String {
    if value >= 0.0 {
        format!("+${:.2}", value)
    } else {
        format!("-${:.2}", value.abs())
    }
}

/// "+50.00%" / "-50.00%"
pub fn format_signed_percent(value: f64) -> String {
    if value >= 0.0 {
        format!("+{:.2}%", value)
    } else {
        format!("-{:.2}%", value.abs())
    }
}

/// Shorten an address for display: first 8 and last 8 characters.
pub fn shorten_address(address: &str) -> String {
    if address.len() <= 16 || !address.is_ascii() {
        return address.to_string();
    }
    format!("{}....{}", &address[..8], &address[address.len() - 8..])
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== parse_decimal tests ====================

    #[test]
    fn test_parse_decimal_valid() {
        assert_eq!(parse_decimal("1.5"), Some(1.5));
        assert_eq!(parse_decimal("  2  "), Some(2.0));
    }

    #[test]
    fn test_parse_decimal_rejects_garbage() {
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("abc"), None);
        assert_eq!(parse_decimal("NaN"), None);
        assert_eq!(parse_decimal("inf"), None);
    }

    // ==================== parse_positive_amount tests ====================

    #[test]
    fn test_parse_positive_amount_ok() {
        assert_eq!(parse_positive_amount("0.01").unwrap(), 0.01);
    }

    #[test]
    fn test_parse_positive_amount_zero_fails() {
        let err = parse_positive_amount("0").unwrap_err();
        assert!(matches!(err, WalletError::InvalidInput(_)));
        assert!(err.to_string().contains("greater than zero"));
    }

    #[test]
    fn test_parse_positive_amount_empty_fails() {
        let err = parse_positive_amount("   ").unwrap_err();
        assert!(err.to_string().contains("required"));
    }

    #[test]
    fn test_parse_positive_amount_negative_fails() {
        assert!(parse_positive_amount("-1").is_err());
    }

    // ==================== parse_recipient tests ====================

    #[test]
    fn test_parse_recipient_valid() {
        let addr = parse_recipient("0x742d35Cc6634C0532925a3b844Bc454e4438f44e");
        assert!(addr.is_ok());
    }

    #[test]
    fn test_parse_recipient_empty() {
        let err = parse_recipient("").unwrap_err();
        assert!(matches!(err, WalletError::InvalidInput(_)));
    }

    #[test]
    fn test_parse_recipient_malformed() {
        assert!(parse_recipient("0x1234").is_err());
        assert!(parse_recipient("not an address").is_err());
    }

    // ==================== unit conversion tests ====================

    #[test]
    fn test_to_base_units_six_decimals() {
        let v = to_base_units("1.5", 6).unwrap();
        assert_eq!(v, U256::from(1_500_000u64));
    }

    #[test]
    fn test_to_base_units_eighteen_decimals() {
        let v = to_base_units("1", 18).unwrap();
        assert_eq!(v, U256::from(10u64.pow(18)));
    }

    #[test]
    fn test_to_base_units_invalid() {
        assert!(to_base_units("abc", 6).is_err());
    }

    #[test]
    fn test_from_base_units() {
        assert_eq!(from_base_units(U256::from(2_500_000u64), 6), "2.500000");
    }

    #[test]
    fn test_format_ether_one_eth() {
        let wei = U256::from(10u64.pow(18));
        assert_eq!(format_ether(wei), "1.000000000000000000");
    }

    // ==================== formatting tests ====================

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0.9998), "0.999800");
        assert_eq!(format_amount(1.0), "1.000000");
    }

    #[test]
    fn test_truncate_decimals_floors() {
        assert_eq!(truncate_decimals("0.999800900000000000", 6), "0.999800");
        assert_eq!(truncate_decimals("0.9999999", 6), "0.999999");
        assert_eq!(truncate_decimals("2.5", 6), "2.500000");
        assert_eq!(truncate_decimals("3", 2), "3.00");
        assert_eq!(truncate_decimals(".75", 1), "0.7");
    }

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(2593.3), "$2593.30");
        assert_eq!(format_usd(0.0), "$0.00");
    }

    #[test]
    fn test_format_signed() {
        assert_eq!(format_signed_usd(50.0), "+$50.00");
        assert_eq!(format_signed_usd(-50.0), "-$50.00");
        assert_eq!(format_signed_percent(50.0), "+50.00%");
        assert_eq!(format_signed_percent(-50.0), "-50.00%");
    }

    #[test]
    fn test_shorten_address() {
        let addr = "0x742d35Cc6634C0532925a3b844Bc454e4438f44e";
        assert_eq!(shorten_address(addr), "0x742d35....4438f44e");
        assert_eq!(shorten_address("0xabc"), "0xabc");
    }
}
