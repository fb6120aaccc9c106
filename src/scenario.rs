//! Scenario definitions and the scenario runner
//!
//! Two parameterizations of the pessimistic/base/optimistic triple exist side by
//! side and are never merged:
//! - [`ScenarioSet::multiplicative`] scales the deal's own assumptions (cash-flow chart)
//! - [`ScenarioSet::literal`] replaces them with fixed market rates (comparison chart)
//!
//! They are not expected to agree with each other.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::analysis::{evaluate, EngineConfig, ScenarioMetrics};
use crate::deal::DealParameters;
use crate::error::Result;
use crate::projection::{Amortization, CashFlowEntry, ProjectionInputs};

/// Scenario identity. Fixed, not user-extensible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioName {
    Pessimistic,
    Base,
    Optimistic,
}

impl ScenarioName {
    pub const ALL: [ScenarioName; 3] = [
        ScenarioName::Pessimistic,
        ScenarioName::Base,
        ScenarioName::Optimistic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioName::Pessimistic => "pessimistic",
            ScenarioName::Base => "base",
            ScenarioName::Optimistic => "optimistic",
        }
    }
}

impl fmt::Display for ScenarioName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a scenario changes a percentage assumption
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateAdjustment {
    /// Multiply the deal's value
    Scale(f64),
    /// Ignore the deal's value and use this one, in percent
    Override(f64),
}

impl RateAdjustment {
    pub fn apply(&self, value: f64) -> f64 {
        match self {
            RateAdjustment::Scale(factor) => value * factor,
            RateAdjustment::Override(rate) => *rate,
        }
    }
}

/// Appreciation/vacancy/expense assumptions for one named scenario
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioAssumption {
    pub name: ScenarioName,
    pub appreciation: RateAdjustment,
    pub vacancy: RateAdjustment,
    pub expense_multiplier: f64,
}

impl ScenarioAssumption {
    /// Projection inputs for this scenario.
    ///
    /// Scaled vacancy is capped at 100% so effective rent never goes negative.
    pub fn apply(&self, params: &DealParameters) -> ProjectionInputs {
        ProjectionInputs {
            appreciation_rate: self.appreciation.apply(params.annual_property_appreciation),
            vacancy_rate: self.vacancy.apply(params.vacancy_rate).clamp(0.0, 100.0),
            operating_expenses: params.annual_operating_expenses * self.expense_multiplier,
        }
    }
}

/// One value per named scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioTable<T> {
    pub pessimistic: T,
    pub base: T,
    pub optimistic: T,
}

impl<T> ScenarioTable<T> {
    pub fn get(&self, name: ScenarioName) -> &T {
        match name {
            ScenarioName::Pessimistic => &self.pessimistic,
            ScenarioName::Base => &self.base,
            ScenarioName::Optimistic => &self.optimistic,
        }
    }

    /// Entries in pessimistic, base, optimistic order
    pub fn iter(&self) -> impl Iterator<Item = (ScenarioName, &T)> {
        ScenarioName::ALL.into_iter().map(move |name| (name, self.get(name)))
    }

    pub fn map<U, F: FnMut(&T) -> U>(&self, mut f: F) -> ScenarioTable<U> {
        ScenarioTable {
            pessimistic: f(&self.pessimistic),
            base: f(&self.base),
            optimistic: f(&self.optimistic),
        }
    }

    pub fn try_map<U, F: FnMut(&T) -> Result<U>>(&self, mut f: F) -> Result<ScenarioTable<U>> {
        Ok(ScenarioTable {
            pessimistic: f(&self.pessimistic)?,
            base: f(&self.base)?,
            optimistic: f(&self.optimistic)?,
        })
    }
}

/// Which scenario parameterization to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioSetKind {
    Multiplicative,
    Literal,
}

impl FromStr for ScenarioSetKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "multiplicative" => Ok(ScenarioSetKind::Multiplicative),
            "literal" => Ok(ScenarioSetKind::Literal),
            other => Err(format!("unknown scenario set: {} (expected multiplicative or literal)", other)),
        }
    }
}

/// The three scenarios of one parameterization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSet {
    pub kind: ScenarioSetKind,
    pub assumptions: ScenarioTable<ScenarioAssumption>,
}

impl ScenarioSet {
    pub fn of_kind(kind: ScenarioSetKind) -> Self {
        match kind {
            ScenarioSetKind::Multiplicative => Self::multiplicative(),
            ScenarioSetKind::Literal => Self::literal(),
        }
    }

    /// Scales the deal's assumptions
    pub fn multiplicative() -> Self {
        Self {
            kind: ScenarioSetKind::Multiplicative,
            assumptions: ScenarioTable {
                pessimistic: ScenarioAssumption {
                    name: ScenarioName::Pessimistic,
                    appreciation: RateAdjustment::Scale(0.5),
                    vacancy: RateAdjustment::Scale(1.5),
                    expense_multiplier: 1.1,
                },
                base: ScenarioAssumption {
                    name: ScenarioName::Base,
                    appreciation: RateAdjustment::Scale(1.0),
                    vacancy: RateAdjustment::Scale(1.0),
                    expense_multiplier: 1.0,
                },
                optimistic: ScenarioAssumption {
                    name: ScenarioName::Optimistic,
                    appreciation: RateAdjustment::Scale(1.5),
                    vacancy: RateAdjustment::Scale(0.6),
                    expense_multiplier: 0.9,
                },
            },
        }
    }

    /// Fixed market rates; expenses are left as entered
    pub fn literal() -> Self {
        Self {
            kind: ScenarioSetKind::Literal,
            assumptions: ScenarioTable {
                pessimistic: ScenarioAssumption {
                    name: ScenarioName::Pessimistic,
                    appreciation: RateAdjustment::Override(1.0),
                    vacancy: RateAdjustment::Override(8.0),
                    expense_multiplier: 1.0,
                },
                base: ScenarioAssumption {
                    name: ScenarioName::Base,
                    appreciation: RateAdjustment::Override(3.0),
                    vacancy: RateAdjustment::Override(5.0),
                    expense_multiplier: 1.0,
                },
                optimistic: ScenarioAssumption {
                    name: ScenarioName::Optimistic,
                    appreciation: RateAdjustment::Override(5.0),
                    vacancy: RateAdjustment::Override(3.0),
                    expense_multiplier: 1.0,
                },
            },
        }
    }
}

/// Metrics and cash flows of one scenario run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioProjection {
    pub inputs: ProjectionInputs,
    pub metrics: ScenarioMetrics,
    pub cash_flows: Vec<CashFlowEntry>,
}

/// Runs a scenario set against one deal
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    config: EngineConfig,
}

impl ScenarioRunner {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Project every scenario of `set`. Parameters are assumed validated.
    pub fn run(
        &self,
        params: &DealParameters,
        loan: &Amortization,
        set: &ScenarioSet,
    ) -> Result<ScenarioTable<ScenarioProjection>> {
        set.assumptions.try_map(|assumption| {
            let inputs = assumption.apply(params);
            log::debug!(
                "{:?} scenario {}: appreciation {:.2}%, vacancy {:.2}%, expenses {:.2}",
                set.kind,
                assumption.name,
                inputs.appreciation_rate,
                inputs.vacancy_rate,
                inputs.operating_expenses
            );

            let evaluation = evaluate(params, loan, &inputs, &self.config)?;
            Ok(ScenarioProjection {
                inputs,
                metrics: evaluation.metrics,
                cash_flows: evaluation.projection.entries,
            })
        })
    }

    /// Metrics-only comparison table
    pub fn compare(
        &self,
        params: &DealParameters,
        loan: &Amortization,
        set: &ScenarioSet,
    ) -> Result<ScenarioTable<ScenarioMetrics>> {
        Ok(self.run(params, loan, set)?.map(|p| p.metrics.clone()))
    }
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
