//! Fiat valuation of the native balance and period-over-period change.

use crate::types::AssetBalance;
use crate::utils::{format_signed_percent, format_signed_usd, format_usd, parse_decimal};

/// Native balance in fiat. Absent, unparsable or negative input values to 0.
pub fn valuate(native_balance: Option<&str>, price_per_unit: f64) -> f64 {
    let balance = match native_balance.and_then(parse_decimal) {
        Some(b) if b >= 0.0 => b,
        _ => return 0.0,
    };
    if !price_per_unit.is_finite() || price_per_unit < 0.0 {
        return 0.0;
    }
    balance * price_per_unit
}

/// Change between a baseline valuation and the current one
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FiatChange {
    pub amount: f64,
    pub percent: f64,
}

impl FiatChange {
    /// "+$50.00", or "$0.00" when there is no reference
    pub fn amount_label(&self, has_reference: bool) -> String {
        if has_reference {
            format_signed_usd(self.amount)
        } else {
            "$0.00".to_string()
        }
    }

    pub fn percent_label(&self, has_reference: bool) -> String {
        if has_reference {
            format_signed_percent(self.percent)
        } else {
            "0.00%".to_string()
        }
    }
}

/// Change is only defined against a positive baseline.
pub fn change_since(baseline: f64, current: f64) -> FiatChange {
    if baseline.is_nan() || baseline <= 0.0 {
        return FiatChange::default();
    }
    let amount = current - baseline;
    FiatChange {
        amount,
        percent: amount / baseline * 100.0,
    }
}

/// Last observed wallet valuation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FiatBaseline {
    value: f64,
}

impl FiatBaseline {
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Compute the change against the stored baseline, then move the baseline
    /// to `current` when it is positive and differs. Read and write happen in
    /// one call so no other observation can slip in between.
    pub fn observe(&mut self, current: f64) -> Observation {
        let had_reference = self.value > 0.0;
        let change = change_since(self.value, current);
        if current > 0.0 && current != self.value {
            self.value = current;
        }
        Observation {
            total: current,
            change,
            had_reference,
        }
    }

    pub fn reset(&mut self) {
        self.value = 0.0;
    }
}

/// Result of valuing one snapshot
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Observation {
    pub total: f64,
    pub change: FiatChange,
    pub had_reference: bool,
}

impl Observation {
    pub fn total_label(&self) -> String {
        format_usd(self.total)
    }

    pub fn change_label(&self) -> String {
        self.change.amount_label(self.had_reference)
    }

    pub fn percent_label(&self) -> String {
        self.change.percent_label(self.had_reference)
    }
}

/// Rows shown when the provider reports no assets
pub fn default_assets() -> Vec<AssetBalance> {
    vec![
        AssetBalance::placeholder("ETH", "Ethereum", "ethereum"),
        AssetBalance::placeholder("USDC", "USD Coin", "usdc"),
        AssetBalance::placeholder("USDT", "Tether USD", "usdt"),
        AssetBalance::placeholder("SCR", "Scroll Token", "scroll"),
    ]
}

/// Portfolio figures displayed on the dashboard header.
#[derive(Debug, Clone)]
pub struct Portfolio {
    price_per_unit: f64,
    baseline: FiatBaseline,
    last: Observation,
    assets: Vec<AssetBalance>,
}

impl Portfolio {
    pub fn new(price_per_unit: f64) -> Self {
        Self {
            price_per_unit,
            baseline: FiatBaseline::default(),
            last: Observation::default(),
            assets: Vec::new(),
        }
    }

    /// Value a freshly published balance. Snapshots without a balance leave
    /// the displayed figures untouched.
    pub fn apply(&mut self, native_balance: Option<&str>, assets: &[AssetBalance]) {
        if native_balance.map(|b| b.trim().is_empty()).unwrap_or(true) {
            return;
        }
        let current = valuate(native_balance, self.price_per_unit);
        self.last = self.baseline.observe(current);
        self.assets = if assets.is_empty() {
            default_assets()
        } else {
            assets.to_vec()
        };
    }

    pub fn observation(&self) -> &Observation {
        &self.last
    }

    pub fn baseline(&self) -> f64 {
        self.baseline.value()
    }

    pub fn assets(&self) -> &[AssetBalance] {
        &self.assets
    }

    pub fn price_per_unit(&self) -> f64 {
        self.price_per_unit
    }

    /// Header total, masked when the user hid balances
    pub fn display_total(&self, hidden: bool) -> String {
        if hidden {
            "••••••".to_string()
        } else {
            self.last.total_label()
        }
    }

    /// Forget everything; the next valuation has no reference.
    pub fn reset(&mut self) {
        self.baseline.reset();
        self.last = Observation::default();
        self.assets.clear();
    }
}
