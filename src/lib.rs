//! Property Deal Engine - deterministic financial analysis for rental property deals
//!
//! This library provides:
//! - Fixed-rate loan amortization
//! - Year-by-year cash-flow projection with a terminal sale
//! - IRR (Newton-Raphson), NPV at a reference rate, and payback period
//! - Six-factor risk breakdown plus a headline risk score
//! - Pessimistic/base/optimistic scenario runs under two parameterizations

pub mod error;
pub mod deal;
pub mod projection;
pub mod returns;
pub mod risk;
pub mod scenario;
pub mod analysis;
pub mod narrative;

// Re-export commonly used types
pub use error::{AnalysisError, Result};
pub use deal::{DealParameters, DealRecord};
pub use projection::{Amortization, CashFlowEntry};
pub use analysis::{analyze_deal, AnalysisResult, DealAnalyzer, EngineConfig, ScenarioMetrics};
pub use scenario::{ScenarioName, ScenarioRunner, ScenarioSet, ScenarioTable};
pub use narrative::{enrich, EnrichedAnalysis, NarrativeGenerator, SummaryNarrator};
