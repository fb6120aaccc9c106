//! Deal analysis entry point
//!
//! Validates a deal, runs the base case through amortization, projection,
//! return metrics and risk scoring, then repeats the projection for both
//! scenario sets. Pure: no I/O, no shared state.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::env;

use crate::deal::DealParameters;
use crate::error::{AnalysisError, Result};
use crate::projection::{Amortization, CashFlowEntry, CashFlowProjection, CashFlowProjector, ProjectionInputs};
use crate::returns::{payback_period, reference_npv, solve_irr, IrrConfig};
use crate::risk::{self, RiskAssessment, RiskFactors, RiskInputs};
use crate::scenario::{ScenarioProjection, ScenarioRunner, ScenarioSet, ScenarioTable};

/// Engine settings. Defaults give the standard IRR search: 10% guess, 1e-5 tolerance, 100 steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// IRR search settings
    pub irr: IrrConfig,

    /// Fail with `NonConvergence` instead of returning a best-effort IRR
    pub strict_convergence: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            irr: IrrConfig::default(),
            strict_convergence: false,
        }
    }
}

impl EngineConfig {
    /// Defaults overlaid with `DEAL_*` environment variables.
    /// Values that fail to parse are ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(guess) = env_var("DEAL_IRR_INITIAL_GUESS") {
            config.irr.initial_guess = guess;
        }
        if let Some(tolerance) = env_var("DEAL_IRR_TOLERANCE") {
            config.irr.tolerance = tolerance;
        }
        if let Some(max_iterations) = env_var("DEAL_IRR_MAX_ITERATIONS") {
            config.irr.max_iterations = max_iterations;
        }
        if let Some(strict) = env_var("DEAL_STRICT_CONVERGENCE") {
            config.strict_convergence = strict;
        }

        config
    }

    /// Overlay a JSON config document on these settings. Fields the document
    /// leaves out, at any depth, keep their current values.
    pub fn overlay_json(&self, json: &str) -> serde_json::Result<Self> {
        let mut merged = serde_json::to_value(self)?;
        let overlay: Value = serde_json::from_str(json)?;
        merge_json(&mut merged, overlay);
        serde_json::from_value(merged)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.irr.initial_guess.is_finite() || self.irr.initial_guess <= -1.0 {
            return Err(AnalysisError::validation(
                "irr.initial_guess",
                format!("must be greater than -1, got {}", self.irr.initial_guess),
            ));
        }
        if self.irr.tolerance.is_nan() || self.irr.tolerance <= 0.0 {
            return Err(AnalysisError::validation(
                "irr.tolerance",
                format!("must be positive, got {}", self.irr.tolerance),
            ));
        }
        if self.irr.max_iterations == 0 {
            return Err(AnalysisError::validation("irr.max_iterations", "must be at least 1"));
        }
        Ok(())
    }
}

fn env_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

fn merge_json(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                merge_json(base.entry(key).or_insert(Value::Null), value);
            }
        }
        (base, overlay) => *base = overlay,
    }
}

/// Headline metrics of one projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioMetrics {
    /// Percent
    pub irr: f64,
    pub irr_converged: bool,
    pub npv: f64,
    /// Percent
    pub cap_rate: f64,
    /// Percent
    pub cash_on_cash_return: f64,
    pub payback_period_years: f64,
    pub payback_recovered: bool,
    pub risk_score: u8,
}

/// Complete, immutable analysis of one deal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub irr: f64,
    pub irr_converged: bool,
    pub npv: f64,
    pub cap_rate: f64,
    pub cash_on_cash_return: f64,
    pub payback_period_years: f64,
    pub payback_recovered: bool,
    pub risk_score: u8,
    pub risk_factors: RiskFactors,

    pub loan_amount: f64,
    pub down_payment: f64,
    pub monthly_payment: f64,
    pub annual_debt_service: f64,
    pub debt_service_coverage_ratio: f64,

    /// Base case, year 0 through the sale year
    pub cash_flow_series: Vec<CashFlowEntry>,

    /// Literal scenario set, for the comparison view
    pub scenarios: ScenarioTable<ScenarioMetrics>,

    /// Multiplicative scenario set with cash flows, for the cash-flow chart
    pub scenario_projections: ScenarioTable<ScenarioProjection>,
}

impl AnalysisResult {
    /// Base-case metrics in the same shape as the scenario entries
    pub fn metrics(&self) -> ScenarioMetrics {
        ScenarioMetrics {
            irr: self.irr,
            irr_converged: self.irr_converged,
            npv: self.npv,
            cap_rate: self.cap_rate,
            cash_on_cash_return: self.cash_on_cash_return,
            payback_period_years: self.payback_period_years,
            payback_recovered: self.payback_recovered,
            risk_score: self.risk_score,
        }
    }
}

/// Projection plus everything derived from it
pub(crate) struct Evaluation {
    pub projection: CashFlowProjection,
    pub metrics: ScenarioMetrics,
    pub risk: RiskAssessment,
}

/// Project one set of inputs and derive its return and risk metrics
pub(crate) fn evaluate(
    params: &DealParameters,
    loan: &Amortization,
    inputs: &ProjectionInputs,
    config: &EngineConfig,
) -> Result<Evaluation> {
    let projection = CashFlowProjector::new(params, *loan).project(inputs);
    let amounts = projection.amounts();

    let irr = solve_irr(&amounts, &config.irr)?;
    if !irr.converged && config.strict_convergence {
        return Err(AnalysisError::NonConvergence {
            iterations: irr.iterations,
            best_estimate: irr.rate_percent,
        });
    }

    let npv = reference_npv(&amounts)?;
    let payback = payback_period(&amounts);

    let cap_rate = projection.net_operating_income / params.purchase_price * 100.0;

    let down_payment = params.down_payment();
    if down_payment <= 0.0 {
        return Err(AnalysisError::degenerate(
            "cash-on-cash return is undefined without a down payment",
        ));
    }
    let cash_on_cash_return = projection.base_annual_cash_flow / down_payment * 100.0;

    let risk = risk::assess(&RiskInputs {
        loan_to_value: params.loan_to_value(),
        interest_rate: params.loan_interest_rate,
        vacancy_rate: inputs.vacancy_rate,
        cash_on_cash_return,
        appreciation_rate: inputs.appreciation_rate,
        irr: irr.rate_percent,
    });

    let metrics = ScenarioMetrics {
        irr: irr.rate_percent,
        irr_converged: irr.converged,
        npv,
        cap_rate,
        cash_on_cash_return,
        payback_period_years: payback.years,
        payback_recovered: payback.recovered,
        risk_score: risk.score,
    };

    Ok(Evaluation {
        projection,
        metrics,
        risk,
    })
}

/// Single entry point for deal analysis
#[derive(Debug, Clone, Default)]
pub struct DealAnalyzer {
    config: EngineConfig,
}

impl DealAnalyzer {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validate the deal and compute the base case and both scenario sets
    pub fn analyze(&self, params: &DealParameters) -> Result<AnalysisResult> {
        self.config.validate()?;
        params.validate()?;

        let loan = Amortization::for_deal(params)?;
        let base = evaluate(params, &loan, &ProjectionInputs::from_deal(params), &self.config)?;

        let runner = ScenarioRunner::new(self.config.clone());
        let scenarios = runner.compare(params, &loan, &ScenarioSet::literal())?;
        let scenario_projections = runner.run(params, &loan, &ScenarioSet::multiplicative())?;

        log::debug!(
            "analysis complete: irr {:.4}%, npv {:.2}, risk {}",
            base.metrics.irr,
            base.metrics.npv,
            base.metrics.risk_score
        );

        Ok(AnalysisResult {
            irr: base.metrics.irr,
            irr_converged: base.metrics.irr_converged,
            npv: base.metrics.npv,
            cap_rate: base.metrics.cap_rate,
            cash_on_cash_return: base.metrics.cash_on_cash_return,
            payback_period_years: base.metrics.payback_period_years,
            payback_recovered: base.metrics.payback_recovered,
            risk_score: base.metrics.risk_score,
            risk_factors: base.risk.factors,
            loan_amount: loan.loan_principal,
            down_payment: params.down_payment(),
            monthly_payment: loan.monthly_payment,
            annual_debt_service: loan.annual_debt_service,
            debt_service_coverage_ratio: base.projection.net_operating_income / loan.annual_debt_service,
            cash_flow_series: base.projection.entries,
            scenarios,
            scenario_projections,
        })
    }
}

/// Analyze a deal with the default engine settings
pub fn analyze_deal(params: &DealParameters) -> Result<AnalysisResult> {
    DealAnalyzer::default().analyze(params)
}
