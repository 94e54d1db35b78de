use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::application::services::search::DefinitionHit;
use crate::application::use_cases::search::search_definitions::SearchDefinitions;
use crate::bootstrap::app_context::AppContext;

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/definition", get(search_definitions))
        .with_state(ctx)
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct DefinitionQuery {
    pub query: String,
    #[serde(default)]
    pub topk: Option<usize>,
    #[serde(default)]
    pub width: Option<usize>,
    /// Semicolon-separated additional regex patterns.
    #[serde(rename = "extraPatterns", default)]
    pub extra_patterns: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DefinitionResponse {
    pub results: Vec<DefinitionHit>,
}

#[utoipa::path(get, path = "/api/definition", tag = "Search", params(DefinitionQuery), responses(
    (status = 200, body = DefinitionResponse),
    (status = 400, description = "invalid extra pattern")
))]
pub async fn search_definitions(
    State(ctx): State<AppContext>,
    Query(q): Query<DefinitionQuery>,
) -> Result<Json<DefinitionResponse>, StatusCode> {
    let extra: Vec<String> = q
        .extra_patterns
        .as_deref()
        .unwrap_or("")
        .split(';')
        .filter(|p| !p.is_empty())
        .map(|p| p.to_string())
        .collect();
    if extra.iter().any(|p| regex::Regex::new(p).is_err()) {
        return Err(StatusCode::BAD_REQUEST);
    }

    let search = ctx.search();
    let uc = SearchDefinitions { search: &search };
    let results = uc
        .execute(
            &q.query,
            q.topk.unwrap_or(5),
            q.width.unwrap_or(0),
            &extra,
        )
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(DefinitionResponse { results }))
}
