//! AWS Lambda handler for deal analysis
//!
//! Accepts an API Gateway proxy request whose body is either the deal parameters
//! themselves or `{"deal": {...}, "narrative": true}` and returns the analysis
//! as JSON.

use aws_lambda_events::event::apigw::{ApiGatewayProxyRequest, ApiGatewayProxyResponse};
use aws_lambda_events::encodings::Body;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use property_deal_engine::{
    enrich, AnalysisError, DealAnalyzer, DealParameters, EngineConfig, EnrichedAnalysis,
    SummaryNarrator,
};
use serde::{Deserialize, Serialize};

/// Request body wrapping a deal
#[derive(Debug, Deserialize)]
struct AnalysisRequest {
    deal: DealParameters,

    /// Attach a text summary to the result
    #[serde(default)]
    narrative: bool,
}

/// Either the wrapped form or bare deal parameters
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RequestBody {
    Wrapped(AnalysisRequest),
    Bare(DealParameters),
}

impl RequestBody {
    fn into_request(self) -> AnalysisRequest {
        match self {
            RequestBody::Wrapped(request) => request,
            RequestBody::Bare(deal) => AnalysisRequest {
                deal,
                narrative: false,
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'a str>,
}

fn response(status: i64, body: String) -> ApiGatewayProxyResponse {
    ApiGatewayProxyResponse {
        status_code: status,
        body: Some(Body::Text(body)),
        ..Default::default()
    }
}

fn error_response(status: i64, message: String, field: Option<&str>) -> ApiGatewayProxyResponse {
    let body = serde_json::to_string(&ErrorBody { error: message, field })
        .unwrap_or_else(|_| r#"{"error":"internal error"}"#.to_string());
    response(status, body)
}

/// Status code for an engine error
fn status_for(err: &AnalysisError) -> i64 {
    match err {
        AnalysisError::Validation { .. } => 400,
        AnalysisError::NumericDegeneracy { .. } | AnalysisError::NonConvergence { .. } => 422,
    }
}

fn handle(analyzer: &DealAnalyzer, body: Option<&str>) -> ApiGatewayProxyResponse {
    let request = match serde_json::from_str::<RequestBody>(body.unwrap_or("{}")) {
        Ok(parsed) => parsed.into_request(),
        Err(e) => return error_response(400, format!("Invalid JSON: {}", e), None),
    };

    let result = match analyzer.analyze(&request.deal) {
        Ok(result) => result,
        Err(e) => {
            log::info!("rejected deal: {}", e);
            return error_response(status_for(&e), e.to_string(), e.field());
        }
    };

    let output = if request.narrative {
        enrich(result, &SummaryNarrator)
    } else {
        EnrichedAnalysis::from(result)
    };

    match serde_json::to_string(&output) {
        Ok(json) => response(200, json),
        Err(e) => error_response(500, format!("Failed to serialize result: {}", e), None),
    }
}

async fn handler(event: LambdaEvent<ApiGatewayProxyRequest>) -> Result<ApiGatewayProxyResponse, Error> {
    let analyzer = DealAnalyzer::new(EngineConfig::from_env());
    Ok(handle(&analyzer, event.payload.body.as_deref()))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}
