//! Year-by-year cash-flow projection for one scenario

use serde::{Deserialize, Serialize};

use crate::deal::DealParameters;
use super::amortization::Amortization;
use super::cashflows::CashFlowEntry;

/// Operating assumptions a projection runs under.
///
/// The base case takes these straight from the deal; scenarios adjust them first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionInputs {
    /// Property appreciation per year, in percent
    pub appreciation_rate: f64,

    /// Vacancy loss, in percent
    pub vacancy_rate: f64,

    /// Operating expenses per year
    pub operating_expenses: f64,
}

impl ProjectionInputs {
    /// Unadjusted inputs taken from the deal
    pub fn from_deal(params: &DealParameters) -> Self {
        Self {
            appreciation_rate: params.annual_property_appreciation,
            vacancy_rate: params.vacancy_rate,
            operating_expenses: params.annual_operating_expenses,
        }
    }
}

/// Output of a single projection run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowProjection {
    /// Rent net of vacancy, year 1
    pub effective_rental_income: f64,

    /// NOI before appreciation, year 1
    pub net_operating_income: f64,

    /// NOI less debt service, before appreciation
    pub base_annual_cash_flow: f64,

    /// One entry per year, 0..=holding_period_years
    pub entries: Vec<CashFlowEntry>,
}

impl CashFlowProjection {
    /// Plain cash-flow amounts, year 0 first
    pub fn amounts(&self) -> Vec<f64> {
        super::cashflows::cash_flow_amounts(&self.entries)
    }
}

/// Builds cash-flow series for a deal and its loan
pub struct CashFlowProjector<'a> {
    params: &'a DealParameters,
    loan: Amortization,
}

impl<'a> CashFlowProjector<'a> {
    pub fn new(params: &'a DealParameters, loan: Amortization) -> Self {
        Self { params, loan }
    }

    /// Project the holding period under the given inputs.
    ///
    /// Each operating year's cash flow, NOI and property value grow with the
    /// appreciation factor (1 + a)^y. In the final year the property is sold and
    /// the original loan principal repaid; the loan is not amortized down.
    pub fn project(&self, inputs: &ProjectionInputs) -> CashFlowProjection {
        let params = self.params;
        let effective_rental_income = params.annual_rental_income * (1.0 - inputs.vacancy_rate / 100.0);
        let net_operating_income = effective_rental_income - inputs.operating_expenses;
        let base_annual_cash_flow = net_operating_income - self.loan.annual_debt_service;

        let holding = params.holding_period_years;
        let mut entries = Vec::with_capacity(holding as usize + 1);

        let closing = CashFlowEntry::closing(params.down_payment(), params.purchase_price);
        let mut cumulative = closing.cumulative_cash_flow;
        entries.push(closing);

        for year in 1..=holding {
            let appreciation_factor = (1.0 + inputs.appreciation_rate / 100.0).powi(year as i32);
            let property_value = params.purchase_price * appreciation_factor;
            let mut cash_flow = base_annual_cash_flow * appreciation_factor;

            let sale_proceeds = if year == holding {
                let proceeds = property_value - self.loan.loan_principal;
                cash_flow += proceeds;
                Some(proceeds)
            } else {
                None
            };

            cumulative += cash_flow;
            entries.push(CashFlowEntry {
                year,
                cash_flow,
                cumulative_cash_flow: cumulative,
                net_operating_income: net_operating_income * appreciation_factor,
                property_value,
                sale_proceeds,
            });
        }

        CashFlowProjection {
            effective_rental_income,
            net_operating_income,
            base_annual_cash_flow,
            entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deal::sample_deal;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn project_sample() -> CashFlowProjection {
        let deal = sample_deal();
        let loan = Amortization::for_deal(&deal).unwrap();
        CashFlowProjector::new(&deal, loan).project(&ProjectionInputs::from_deal(&deal))
    }

    #[test]
    fn test_series_shape() {
        let projection = project_sample();
        assert_eq!(projection.entries.len(), 11);
        for (i, entry) in projection.entries.iter().enumerate() {
            assert_eq!(entry.year as usize, i);
        }
        assert_relative_eq!(projection.entries[0].cash_flow, -100_000.0);
    }

    #[test]
    fn test_operating_figures() {
        let projection = project_sample();
        // 48k rent, 5% vacancy, 12k expenses
        assert_relative_eq!(projection.effective_rental_income, 45_600.0);
        assert_relative_eq!(projection.net_operating_income, 33_600.0);
        assert_abs_diff_eq!(projection.base_annual_cash_flow, 33_600.0 - 28_778.38, epsilon = 0.1);
    }

    #[test]
    fn test_appreciation_applied_per_year() {
        let projection = project_sample();
        let year3 = &projection.entries[3];
        let factor = 1.03_f64.powi(3);

        assert_relative_eq!(year3.property_value, 500_000.0 * factor, max_relative = 1e-12);
        assert_relative_eq!(year3.net_operating_income, 33_600.0 * factor, max_relative = 1e-12);
        assert_relative_eq!(
            year3.cash_flow,
            projection.base_annual_cash_flow * factor,
            max_relative = 1e-12
        );
        assert!(year3.sale_proceeds.is_none());
    }

    #[test]
    fn test_terminal_year_includes_sale() {
        let projection = project_sample();
        let last = projection.entries.last().unwrap();
        let factor = 1.03_f64.powi(10);
        let proceeds = 500_000.0 * factor - 400_000.0;

        assert_relative_eq!(last.sale_proceeds.unwrap(), proceeds, max_relative = 1e-12);
        assert_relative_eq!(
            last.cash_flow,
            projection.base_annual_cash_flow * factor + proceeds,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_cumulative_is_running_sum() {
        let projection = project_sample();
        let mut running = 0.0;
        for entry in &projection.entries {
            running += entry.cash_flow;
            assert_abs_diff_eq!(entry.cumulative_cash_flow, running, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_single_year_hold_sells_in_year_one() {
        let deal = DealParameters {
            holding_period_years: 1,
            ..sample_deal()
        };
        let loan = Amortization::for_deal(&deal).unwrap();
        let projection = CashFlowProjector::new(&deal, loan).project(&ProjectionInputs::from_deal(&deal));

        assert_eq!(projection.entries.len(), 2);
        assert!(projection.entries[1].sale_proceeds.is_some());
    }
}
