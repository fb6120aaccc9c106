//! Narrative enrichment of finished analyses
//!
//! Text generation is a best-effort decoration applied after the numbers are
//! final. A failing generator leaves `narrative` empty; it never changes or
//! invalidates the numeric result.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analysis::AnalysisResult;

#[derive(Debug, Error)]
pub enum NarrativeError {
    #[error("narrative generator unavailable: {0}")]
    Unavailable(String),

    #[error("narrative generation failed: {0}")]
    Failed(String),
}

/// Produces descriptive text for a finished analysis
pub trait NarrativeGenerator {
    fn generate(&self, result: &AnalysisResult) -> Result<String, NarrativeError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Narrative {
    pub text: String,
    pub generated_at: DateTime<Utc>,
}

/// An analysis plus optional narrative text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedAnalysis {
    #[serde(flatten)]
    pub result: AnalysisResult,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrative: Option<Narrative>,
}

impl From<AnalysisResult> for EnrichedAnalysis {
    fn from(result: AnalysisResult) -> Self {
        Self {
            result,
            narrative: None,
        }
    }
}

/// Attach narrative text to a finished analysis
pub fn enrich<G: NarrativeGenerator + ?Sized>(result: AnalysisResult, generator: &G) -> EnrichedAnalysis {
    let narrative = match generator.generate(&result) {
        Ok(text) => Some(Narrative {
            text,
            generated_at: Utc::now(),
        }),
        Err(e) => {
            log::warn!("narrative enrichment skipped: {}", e);
            None
        }
    };

    EnrichedAnalysis { result, narrative }
}

/// Deterministic template summary, no external service involved
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryNarrator;

impl NarrativeGenerator for SummaryNarrator {
    fn generate(&self, result: &AnalysisResult) -> Result<String, NarrativeError> {
        let risk_band = match result.risk_score {
            0..=39 => "low",
            40..=59 => "moderate",
            60..=79 => "elevated",
            _ => "high",
        };

        let payback = if result.payback_recovered {
            format!("the initial equity is recovered after {:.1} years", result.payback_period_years)
        } else {
            "the initial equity is not recovered within the holding period".to_string()
        };

        Ok(format!(
            "The deal returns an IRR of {:.2}% with an NPV of {:.0} at the reference rate. \
             Year-one cap rate is {:.2}% and cash-on-cash return is {:.2}%; {}. \
             Across scenarios the IRR ranges from {:.2}% (pessimistic) to {:.2}% (optimistic). \
             Overall risk is {} ({}/100).",
            result.irr,
            result.npv,
            result.cap_rate,
            result.cash_on_cash_return,
            payback,
            result.scenarios.pessimistic.irr,
            result.scenarios.optimistic.irr,
            risk_band,
            result.risk_score,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze_deal;
    use crate::deal::sample_deal;

    struct FailingGenerator;

    impl NarrativeGenerator for FailingGenerator {
        fn generate(&self, _result: &AnalysisResult) -> Result<String, NarrativeError> {
            Err(NarrativeError::Unavailable("timeout".into()))
        }
    }

    #[test]
    fn test_summary_attached() {
        let result = analyze_deal(&sample_deal()).unwrap();
        let enriched = enrich(result.clone(), &SummaryNarrator);

        let narrative = enriched.narrative.expect("narrative present");
        assert!(narrative.text.contains("IRR"));
        assert!(narrative.text.contains("moderate") || narrative.text.contains("elevated"));
        assert_eq!(enriched.result, result);
    }

    #[test]
    fn test_failure_keeps_numbers() {
        let result = analyze_deal(&sample_deal()).unwrap();
        let enriched = enrich(result.clone(), &FailingGenerator);

        assert!(enriched.narrative.is_none());
        assert_eq!(enriched.result, result);
    }

    #[test]
    fn test_serialized_shape_is_flat() {
        let result = analyze_deal(&sample_deal()).unwrap();
        let value = serde_json::to_value(EnrichedAnalysis::from(result)).unwrap();

        assert!(value.get("irr").is_some());
        assert!(value.get("scenarios").and_then(|s| s.get("pessimistic")).is_some());
        assert!(value.get("narrative").is_none());
    }
}
