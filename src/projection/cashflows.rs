//! Cash-flow output structures for projections

use serde::{Deserialize, Serialize};

/// A single year of a deal's cash-flow projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowEntry {
    /// Projection year (0 = closing)
    pub year: u32,

    /// Net cash to the investor for the year, including sale proceeds in the final year
    pub cash_flow: f64,

    /// Running sum of cash flows from year 0
    pub cumulative_cash_flow: f64,

    /// Net operating income (0 at year 0)
    pub net_operating_income: f64,

    /// Appreciated purchase price
    pub property_value: f64,

    /// Sale price less loan principal; terminal year only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale_proceeds: Option<f64>,
}

impl CashFlowEntry {
    /// Closing-day entry: the down payment leaves as the only cash flow
    pub fn closing(down_payment: f64, purchase_price: f64) -> Self {
        Self {
            year: 0,
            cash_flow: -down_payment,
            cumulative_cash_flow: -down_payment,
            net_operating_income: 0.0,
            property_value: purchase_price,
            sale_proceeds: None,
        }
    }
}

/// Plain cash-flow amounts of a series, year 0 first
pub fn cash_flow_amounts(entries: &[CashFlowEntry]) -> Vec<f64> {
    entries.iter().map(|e| e.cash_flow).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closing_entry() {
        let entry = CashFlowEntry::closing(100_000.0, 500_000.0);
        assert_eq!(entry.year, 0);
        assert_eq!(entry.cash_flow, -100_000.0);
        assert_eq!(entry.cumulative_cash_flow, -100_000.0);
        assert_eq!(entry.net_operating_income, 0.0);
        assert!(entry.sale_proceeds.is_none());
    }

    #[test]
    fn test_sale_proceeds_omitted_when_absent() {
        let json = serde_json::to_string(&CashFlowEntry::closing(1.0, 2.0)).unwrap();
        assert!(!json.contains("sale_proceeds"));
    }
}
