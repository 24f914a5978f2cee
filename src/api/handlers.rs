//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::error;

use super::AppState;
use super::types::{CompareQuery, ErrorResponse, ForecastQuery, ForecastResponse};
use crate::error::ForecastError;

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Maps a forecast failure onto an HTTP status and JSON error body.
fn reject(err: ForecastError) -> ApiError {
    let status = match &err {
        ForecastError::UnknownCounty(_) => StatusCode::NOT_FOUND,
        e if e.is_selection_error() => StatusCode::BAD_REQUEST,
        e => {
            error!(error = %e, "forecast request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

/// Lists county names in sorted order.
///
/// `GET /counties` → 200 + `Vec<String>` JSON
pub async fn get_counties(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.ctx.counties().into_iter().map(str::to_string).collect())
}

/// Forecasts one county.
///
/// `GET /forecast?county=King` → 200 + `ForecastResponse` JSON
/// `GET /forecast` → 400 + `ErrorResponse`
/// `GET /forecast?county=Atlantis` → 404 + `ErrorResponse`
pub async fn get_forecast(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ForecastQuery>,
) -> impl IntoResponse {
    let county = query.county.unwrap_or_default();
    state
        .ctx
        .forecast(&county)
        .map(|r| Json(ForecastResponse::from(r)))
        .map_err(reject)
}

/// Forecasts several counties side by side.
///
/// `GET /compare?counties=King,Pierce` → 200 + `Vec<ForecastResponse>` JSON
/// `GET /compare?counties=A,B,C,D` → 400 + `ErrorResponse`
pub async fn get_compare(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CompareQuery>,
) -> impl IntoResponse {
    let names = query.names();
    state
        .ctx
        .compare(names.as_slice())
        .map(|results| {
            Json(
                results
                    .into_iter()
                    .map(ForecastResponse::from)
                    .collect::<Vec<_>>(),
            )
        })
        .map_err(reject)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use tower::util::ServiceExt;

    use super::*;
    use crate::api::router;
    use crate::context::ForecastContext;
    use crate::dataset::Dataset;
    use crate::model::{Model, NaivePredictor};

    fn make_test_state() -> Arc<AppState> {
        let ctx = ForecastContext::new(
            Dataset::demo(42, 4),
            Model::Naive(NaivePredictor),
            12,
            3,
        );
        Arc::new(AppState { ctx })
    }

    async fn get(uri: &str) -> (StatusCode, serde_json::Value) {
        let app = router(make_test_state());
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn first_counties(n: usize) -> Vec<String> {
        let state = make_test_state();
        state
            .ctx
            .counties()
            .into_iter()
            .take(n)
            .map(str::to_string)
            .collect()
    }

    #[tokio::test]
    async fn counties_returns_sorted_names() {
        let (status, json) = get("/counties").await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<String> = serde_json::from_value(json).unwrap();
        assert_eq!(names.len(), 4);
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[tokio::test]
    async fn forecast_returns_full_horizon() {
        let county = first_counties(1).remove(0);
        let (status, json) = get(&format!("/forecast?county={county}")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["county"], county.as_str());
        assert_eq!(json["horizon_months"], 12);
        assert_eq!(json["forecast"].as_array().map(Vec::len), Some(12));
        let last = json["trend"].as_array().and_then(|t| t.last()).unwrap();
        assert_eq!(last["source"], "Forecast");
        assert!(json["growth"].get("growth_pct").is_some());
    }

    #[tokio::test]
    async fn forecast_without_county_returns_400() {
        let (status, json) = get("/forecast").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json.get("error").is_some());
    }

    #[tokio::test]
    async fn unknown_county_returns_404() {
        let (status, json) = get("/forecast?county=Atlantis").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(json["error"].as_str().unwrap().contains("Atlantis"));
    }

    #[tokio::test]
    async fn compare_returns_one_entry_per_county() {
        let names = first_counties(3);
        let (status, json) = get(&format!("/compare?counties={}", names.join(","))).await;

        assert_eq!(status, StatusCode::OK);
        let entries = json.as_array().unwrap();
        assert_eq!(entries.len(), 3);
        for (entry, name) in entries.iter().zip(&names) {
            assert_eq!(entry["county"], name.as_str());
        }
    }

    #[tokio::test]
    async fn compare_rejects_too_many_counties() {
        let names = first_counties(4);
        let (status, _) = get(&format!("/compare?counties={}", names.join(","))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = get("/compare").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
