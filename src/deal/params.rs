//! Deal parameter structures and input validation

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// Inputs describing a single leveraged rental property deal.
///
/// Percentage fields are expressed in percent (6.0 means 6%), currency fields in
/// the caller's currency units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealParameters {
    /// Acquisition price of the property
    pub purchase_price: f64,

    /// Equity share of the purchase price, in percent
    pub down_payment_percent: f64,

    /// Annual fixed loan rate, in percent
    pub loan_interest_rate: f64,

    /// Loan term in whole years
    pub loan_term_years: u32,

    /// Gross scheduled rent per year
    pub annual_rental_income: f64,

    /// Share of rent lost to vacancy, in percent
    pub vacancy_rate: f64,

    /// Operating expenses per year (taxes, insurance, maintenance, management)
    pub annual_operating_expenses: f64,

    /// Expected property value growth per year, in percent
    pub annual_property_appreciation: f64,

    /// Years until the property is sold
    pub holding_period_years: u32,
}

impl DealParameters {
    /// Equity paid at closing
    pub fn down_payment(&self) -> f64 {
        self.purchase_price * self.down_payment_percent / 100.0
    }

    /// Amount financed by the loan
    pub fn loan_amount(&self) -> f64 {
        self.purchase_price * (1.0 - self.down_payment_percent / 100.0)
    }

    /// Loan amount over purchase price, as a fraction
    pub fn loan_to_value(&self) -> f64 {
        (self.purchase_price - self.down_payment()) / self.purchase_price
    }

    /// Check every field against its allowed range.
    ///
    /// Fails on the first offending field, in declaration order.
    pub fn validate(&self) -> Result<()> {
        if !self.purchase_price.is_finite() || self.purchase_price <= 0.0 {
            return Err(AnalysisError::validation(
                "purchase_price",
                format!("must be greater than 0, got {}", self.purchase_price),
            ));
        }

        check_range("down_payment_percent", self.down_payment_percent, 0.0, 100.0)?;
        // A 100% down payment leaves nothing to amortize
        if self.down_payment_percent >= 100.0 {
            return Err(AnalysisError::validation(
                "down_payment_percent",
                format!("must be below 100, got {}", self.down_payment_percent),
            ));
        }

        check_range("loan_interest_rate", self.loan_interest_rate, 0.0, 30.0)?;
        check_years("loan_term_years", self.loan_term_years)?;

        if !self.annual_rental_income.is_finite() || self.annual_rental_income < 0.0 {
            return Err(AnalysisError::validation(
                "annual_rental_income",
                format!("must be at least 0, got {}", self.annual_rental_income),
            ));
        }

        check_range("vacancy_rate", self.vacancy_rate, 0.0, 100.0)?;

        if !self.annual_operating_expenses.is_finite() || self.annual_operating_expenses < 0.0 {
            return Err(AnalysisError::validation(
                "annual_operating_expenses",
                format!("must be at least 0, got {}", self.annual_operating_expenses),
            ));
        }

        check_range(
            "annual_property_appreciation",
            self.annual_property_appreciation,
            -10.0,
            20.0,
        )?;
        check_years("holding_period_years", self.holding_period_years)?;

        Ok(())
    }
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<()> {
    if !value.is_finite() || value < min || value > max {
        return Err(AnalysisError::validation(
            field,
            format!("must be between {} and {}, got {}", min, max, value),
        ));
    }
    Ok(())
}

fn check_years(field: &'static str, years: u32) -> Result<()> {
    if !(1..=30).contains(&years) {
        return Err(AnalysisError::validation(
            field,
            format!("must be between 1 and 30 years, got {}", years),
        ));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Typical single-family rental used across the test suite
    pub(crate) fn sample_deal() -> DealParameters {
        DealParameters {
            purchase_price: 500_000.0,
            down_payment_percent: 20.0,
            loan_interest_rate: 6.0,
            loan_term_years: 30,
            annual_rental_income: 48_000.0,
            vacancy_rate: 5.0,
            annual_operating_expenses: 12_000.0,
            annual_property_appreciation: 3.0,
            holding_period_years: 10,
        }
    }

    #[test]
    fn test_derived_amounts() {
        let deal = sample_deal();
        assert_relative_eq!(deal.down_payment(), 100_000.0);
        assert_relative_eq!(deal.loan_amount(), 400_000.0);
        assert_relative_eq!(deal.loan_to_value(), 0.8);
    }

    #[test]
    fn test_sample_deal_is_valid() {
        assert!(sample_deal().validate().is_ok());
    }

    #[test]
    fn test_full_down_payment_rejected() {
        let deal = DealParameters {
            down_payment_percent: 100.0,
            ..sample_deal()
        };
        let err = deal.validate().unwrap_err();
        assert_eq!(err.field(), Some("down_payment_percent"));
    }

    #[test]
    fn test_zero_down_payment_accepted() {
        let deal = DealParameters {
            down_payment_percent: 0.0,
            ..sample_deal()
        };
        assert!(deal.validate().is_ok());
    }

    #[test]
    fn test_each_field_named_on_violation() {
        let cases: Vec<(DealParameters, &str)> = vec![
            (DealParameters { purchase_price: 0.0, ..sample_deal() }, "purchase_price"),
            (DealParameters { purchase_price: f64::NAN, ..sample_deal() }, "purchase_price"),
            (DealParameters { down_payment_percent: -1.0, ..sample_deal() }, "down_payment_percent"),
            (DealParameters { loan_interest_rate: 30.5, ..sample_deal() }, "loan_interest_rate"),
            (DealParameters { loan_term_years: 0, ..sample_deal() }, "loan_term_years"),
            (DealParameters { loan_term_years: 31, ..sample_deal() }, "loan_term_years"),
            (DealParameters { annual_rental_income: -5.0, ..sample_deal() }, "annual_rental_income"),
            (DealParameters { vacancy_rate: 101.0, ..sample_deal() }, "vacancy_rate"),
            (DealParameters { annual_operating_expenses: -1.0, ..sample_deal() }, "annual_operating_expenses"),
            (DealParameters { annual_property_appreciation: -10.5, ..sample_deal() }, "annual_property_appreciation"),
            (DealParameters { annual_property_appreciation: 21.0, ..sample_deal() }, "annual_property_appreciation"),
            (DealParameters { holding_period_years: 0, ..sample_deal() }, "holding_period_years"),
        ];

        for (deal, field) in cases {
            let err = deal.validate().unwrap_err();
            assert_eq!(err.field(), Some(field), "expected {} to be rejected", field);
        }
    }

    #[test]
    fn test_range_boundaries_inclusive() {
        let deal = DealParameters {
            loan_interest_rate: 30.0,
            vacancy_rate: 100.0,
            annual_property_appreciation: -10.0,
            loan_term_years: 1,
            holding_period_years: 30,
            ..sample_deal()
        };
        assert!(deal.validate().is_ok());
    }

    #[test]
    fn test_deserialize_from_json() {
        let json = r#"{
            "purchase_price": 250000,
            "down_payment_percent": 25,
            "loan_interest_rate": 5.5,
            "loan_term_years": 30,
            "annual_rental_income": 24000,
            "vacancy_rate": 5,
            "annual_operating_expenses": 6000,
            "annual_property_appreciation": 3,
            "holding_period_years": 7
        }"#;
        let deal: DealParameters = serde_json::from_str(json).unwrap();
        assert_eq!(deal.holding_period_years, 7);
        assert_relative_eq!(deal.down_payment(), 62_500.0);
    }
}
