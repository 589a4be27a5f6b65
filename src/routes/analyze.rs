use crate::{
    analyzer::AnalyzeError,
    decoder::DecodeError,
    server::SharedState,
    verdict::Verdict,
};
use axum::{
    body::Bytes,
    extract::{Multipart, State},
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use std::time::Instant;
use tracing::instrument;

#[derive(Serialize)]
pub struct AnalysisResponse {
    pub is_legal: bool,
    pub confidence: f32,
    pub verdict: String,
    pub details: Vec<String>,
}

impl From<Verdict> for AnalysisResponse {
    fn from(verdict: Verdict) -> Self {
        Self {
            is_legal: verdict.is_legal,
            confidence: verdict.confidence,
            verdict: verdict.verdict_text,
            details: verdict.details,
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Accepts a multipart photo upload and returns the analysis verdict.
///
/// Pipeline failures come back as an `{error}` payload with a success
/// status: the fault is part of the response contract, not a transport
/// problem, and it must never crash the serving loop.
#[instrument(skip(state, multipart))]
pub async fn analyze_image(State(state): State<SharedState>, mut multipart: Multipart) -> Response {
    state.metrics.record_request("/analyze");
    let started = Instant::now();

    let result = match read_upload(&mut multipart).await {
        Ok(image_data) => state.analyzer.analyze(&image_data).await,
        Err(err) => Err(err),
    };

    state
        .metrics
        .record_analysis_duration(started.elapsed().as_millis() as u64, "/analyze");

    match result {
        Ok(verdict) => Json(AnalysisResponse::from(verdict)).into_response(),
        Err(err) => {
            tracing::error!("Failed to analyze upload: {:?}", err);
            Json(ErrorResponse {
                error: err.to_string(),
            })
            .into_response()
        }
    }
}

/// Pulls the first file-bearing field out of the multipart body.
async fn read_upload(multipart: &mut Multipart) -> Result<Bytes, AnalyzeError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AnalyzeError::Unexpected(format!("malformed multipart request: {}", e)))?
    {
        if field.name() == Some("file") || field.file_name().is_some() {
            return field
                .bytes()
                .await
                .map_err(|e| AnalyzeError::Unexpected(format!("failed to read upload: {}", e)));
        }
    }

    Err(AnalyzeError::Decode(DecodeError::Empty))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_payload_matches_wire_contract() {
        let response = AnalysisResponse::from(Verdict {
            is_legal: true,
            confidence: 0.91,
            verdict_text: "Road Legal".to_string(),
            details: vec!["Identified as: sports car".to_string()],
        });

        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["is_legal"], true);
        assert_eq!(value["verdict"], "Road Legal");
        assert_eq!(value["details"][0], "Identified as: sports car");
        assert!((value["confidence"].as_f64().unwrap() - 0.91).abs() < 1e-6);
    }

    #[test]
    fn error_payload_carries_a_message() {
        let response = ErrorResponse {
            error: AnalyzeError::Decode(DecodeError::Empty).to_string(),
        };

        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["error"], "failed to decode image: empty image payload");
    }
}
