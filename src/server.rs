use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};

use crate::Analyzer;
use crate::error::AnalyzeError;
use crate::results::AnalysisReport;

/// Parameters accepted by `/analyze`, from the query string or a JSON body
#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeParams {
    #[serde(default, alias = "q")]
    pub keyword: Option<String>,

    /// Target page URL
    #[serde(default, alias = "target")]
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
struct AnalyzeResponse {
    success: bool,
    #[serde(flatten)]
    report: AnalysisReport,
}

impl IntoResponse for AnalyzeError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            ::log::error!("Analysis failed: {}", self);
        } else {
            ::log::warn!("Rejected analysis request: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub fn build_router(analyzer: Arc<Analyzer>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/analyze", get(analyze_query).post(analyze_json))
        .route("/health", get(health))
        .layer(cors)
        .with_state(analyzer)
}

/// Binds `host:port` and serves the analyzer until the process exits
pub async fn serve(analyzer: Analyzer, host: &str, port: u16) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    ::log::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, build_router(Arc::new(analyzer))).await
}

async fn health() -> &'static str {
    "ok"
}

async fn analyze_query(
    State(analyzer): State<Arc<Analyzer>>,
    query: Result<Query<AnalyzeParams>, QueryRejection>,
) -> Response {
    match query {
        Ok(Query(params)) => run(&analyzer, params).await,
        Err(rejection) => {
            let message = rejection.body_text();
            ::log::warn!("Invalid query string: {}", message);
            (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
        }
    }
}

async fn analyze_json(
    State(analyzer): State<Arc<Analyzer>>,
    payload: Result<Json<AnalyzeParams>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(params)) => run(&analyzer, params).await,
        Err(rejection) => {
            ::log::warn!("Invalid JSON body: {}", rejection.body_text());
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Invalid JSON" })),
            )
                .into_response()
        }
    }
}

async fn run(analyzer: &Analyzer, params: AnalyzeParams) -> Response {
    let keyword = params.keyword.unwrap_or_default();
    match analyzer
        .analyze_with_timeout(&keyword, params.url.as_deref())
        .await
    {
        Ok(report) => Json(AnalyzeResponse {
            success: true,
            report,
        })
        .into_response(),
        Err(e) => e.into_response(),
    }
}
