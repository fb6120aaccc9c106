//! Fixed-rate, fully amortizing loan payments

use serde::{Deserialize, Serialize};

use crate::deal::DealParameters;
use crate::error::{AnalysisError, Result};

/// Payment figures for a fixed-rate, fully amortizing loan
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Amortization {
    /// Amount borrowed
    pub loan_principal: f64,

    /// Annual rate / 12, as a decimal
    pub monthly_rate: f64,

    /// Number of monthly payments
    pub payment_count: u32,

    /// Level monthly payment
    pub monthly_payment: f64,

    /// Twelve monthly payments
    pub annual_debt_service: f64,
}

/// One loan year of the amortization schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmortizationYear {
    pub year: u32,
    pub interest_paid: f64,
    pub principal_paid: f64,
    pub ending_balance: f64,
}

impl Amortization {
    /// Payment figures for the loan implied by a deal
    pub fn for_deal(params: &DealParameters) -> Result<Self> {
        Self::new(
            params.loan_amount(),
            params.loan_interest_rate,
            params.loan_term_years,
        )
    }

    /// Standard annuity payment: M = L·r·(1+r)^n / ((1+r)^n − 1).
    ///
    /// A zero rate falls back to straight-line repayment, M = L / n.
    pub fn new(loan_principal: f64, annual_rate_percent: f64, term_years: u32) -> Result<Self> {
        if !loan_principal.is_finite() || loan_principal <= 0.0 {
            return Err(AnalysisError::degenerate(format!(
                "amortization: loan principal must be positive, got {}",
                loan_principal
            )));
        }
        if term_years == 0 {
            return Err(AnalysisError::degenerate("amortization: zero-length loan term"));
        }

        let monthly_rate = annual_rate_percent / 100.0 / 12.0;
        let payment_count = term_years * 12;
        let n = payment_count as f64;

        let monthly_payment = if monthly_rate == 0.0 {
            loan_principal / n
        } else {
            let growth = (1.0 + monthly_rate).powi(payment_count as i32);
            loan_principal * monthly_rate * growth / (growth - 1.0)
        };

        if !monthly_payment.is_finite() {
            return Err(AnalysisError::degenerate(format!(
                "amortization: payment is not finite for rate {}%",
                annual_rate_percent
            )));
        }

        Ok(Self {
            loan_principal,
            monthly_rate,
            payment_count,
            monthly_payment,
            annual_debt_service: 12.0 * monthly_payment,
        })
    }

    /// Outstanding balance after `months` payments (zero once the loan is repaid)
    pub fn balance_after(&self, months: u32) -> f64 {
        let k = months.min(self.payment_count);
        let balance = if self.monthly_rate == 0.0 {
            self.loan_principal - self.monthly_payment * k as f64
        } else {
            let growth = (1.0 + self.monthly_rate).powi(k as i32);
            self.loan_principal * growth - self.monthly_payment * (growth - 1.0) / self.monthly_rate
        };
        balance.max(0.0)
    }

    /// Year-by-year split of payments into interest and principal
    pub fn annual_schedule(&self) -> Vec<AmortizationYear> {
        let years = self.payment_count / 12;
        let mut schedule = Vec::with_capacity(years as usize);
        let mut opening = self.loan_principal;

        for year in 1..=years {
            let ending_balance = self.balance_after(year * 12);
            let principal_paid = opening - ending_balance;
            schedule.push(AmortizationYear {
                year,
                interest_paid: self.annual_debt_service - principal_paid,
                principal_paid,
                ending_balance,
            });
            opening = ending_balance;
        }

        schedule
    }
}
