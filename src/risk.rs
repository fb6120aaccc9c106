//! Deal risk scoring
//!
//! Two separate outputs:
//! - six 0-100 sub-scores that drive the risk-factor breakdown (radar chart)
//! - a coarser headline score driven by leverage and return quality
//!
//! The headline score is not derived from the sub-scores.

use serde::{Deserialize, Serialize};

/// Measures the risk scorer looks at
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskInputs {
    /// Loan over purchase price, as a fraction
    pub loan_to_value: f64,

    /// Loan rate, in percent
    pub interest_rate: f64,

    /// Vacancy, in percent
    pub vacancy_rate: f64,

    /// Year-1 cash-on-cash return, in percent
    pub cash_on_cash_return: f64,

    /// Appreciation assumption, in percent
    pub appreciation_rate: f64,

    /// IRR, in percent
    pub irr: f64,
}

/// Risk factor identifiers, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactorKind {
    Leverage,
    InterestRate,
    Vacancy,
    CashFlow,
    Market,
    Roi,
}

impl RiskFactorKind {
    pub const ALL: [RiskFactorKind; 6] = [
        RiskFactorKind::Leverage,
        RiskFactorKind::InterestRate,
        RiskFactorKind::Vacancy,
        RiskFactorKind::CashFlow,
        RiskFactorKind::Market,
        RiskFactorKind::Roi,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RiskFactorKind::Leverage => "Leverage",
            RiskFactorKind::InterestRate => "Interest Rate",
            RiskFactorKind::Vacancy => "Vacancy",
            RiskFactorKind::CashFlow => "Cash Flow",
            RiskFactorKind::Market => "Market",
            RiskFactorKind::Roi => "ROI",
        }
    }
}

/// The six sub-scores, each in [0, 100]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskFactors {
    pub leverage: f64,
    pub interest_rate: f64,
    pub vacancy: f64,
    pub cash_flow: f64,
    pub market: f64,
    pub roi: f64,
}

impl RiskFactors {
    pub fn from_inputs(inputs: &RiskInputs) -> Self {
        Self {
            leverage: leverage_risk(inputs.loan_to_value),
            interest_rate: interest_rate_risk(inputs.interest_rate),
            vacancy: vacancy_risk(inputs.vacancy_rate),
            cash_flow: cash_flow_risk(inputs.cash_on_cash_return),
            market: market_risk(inputs.appreciation_rate),
            roi: roi_risk(inputs.irr),
        }
    }

    pub fn get(&self, kind: RiskFactorKind) -> f64 {
        match kind {
            RiskFactorKind::Leverage => self.leverage,
            RiskFactorKind::InterestRate => self.interest_rate,
            RiskFactorKind::Vacancy => self.vacancy,
            RiskFactorKind::CashFlow => self.cash_flow,
            RiskFactorKind::Market => self.market,
            RiskFactorKind::Roi => self.roi,
        }
    }

    /// Sub-scores in display order, for chart axes
    pub fn entries(&self) -> Vec<(RiskFactorKind, f64)> {
        RiskFactorKind::ALL.iter().map(|&k| (k, self.get(k))).collect()
    }
}

/// Headline score plus the factor breakdown
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub score: u8,
    pub factors: RiskFactors,
}

pub fn assess(inputs: &RiskInputs) -> RiskAssessment {
    RiskAssessment {
        score: headline_risk_score(inputs),
        factors: RiskFactors::from_inputs(inputs),
    }
}

pub fn leverage_risk(loan_to_value: f64) -> f64 {
    clip(loan_to_value * 120.0)
}

pub fn interest_rate_risk(rate_percent: f64) -> f64 {
    clip(rate_percent / 10.0 * 100.0)
}

/// Clipped at 100 even though 10x vacancy can exceed it
pub fn vacancy_risk(vacancy_percent: f64) -> f64 {
    clip(vacancy_percent * 10.0)
}

pub fn cash_flow_risk(cash_on_cash_percent: f64) -> f64 {
    if cash_on_cash_percent < 5.0 {
        80.0
    } else if cash_on_cash_percent < 8.0 {
        50.0
    } else {
        20.0
    }
}

pub fn market_risk(appreciation_percent: f64) -> f64 {
    if appreciation_percent < 2.0 {
        70.0
    } else if appreciation_percent > 5.0 {
        30.0
    } else {
        40.0
    }
}

pub fn roi_risk(irr_percent: f64) -> f64 {
    if irr_percent < 10.0 {
        70.0
    } else if irr_percent < 15.0 {
        40.0
    } else {
        20.0
    }
}

/// Headline 0-100 score: starts neutral at 50, moved by leverage and return quality.
pub fn headline_risk_score(inputs: &RiskInputs) -> u8 {
    let leverage = if inputs.loan_to_value >= 0.9 {
        25.0
    } else if inputs.loan_to_value >= 0.8 {
        15.0
    } else if inputs.loan_to_value >= 0.7 {
        5.0
    } else if inputs.loan_to_value < 0.5 {
        -10.0
    } else {
        0.0
    };

    let returns = if inputs.irr < 0.0 {
        25.0
    } else if inputs.irr < 8.0 {
        15.0
    } else if inputs.irr < 12.0 {
        5.0
    } else if inputs.irr >= 18.0 {
        -15.0
    } else {
        -5.0
    };

    let negative_carry = if inputs.cash_on_cash_return < 0.0 { 10.0 } else { 0.0 };

    clip(50.0 + leverage + returns + negative_carry).round() as u8
}

fn clip(score: f64) -> f64 {
    score.clamp(0.0, 100.0)
}
