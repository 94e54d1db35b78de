use axum::{
    Router,
    extract::{Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::application::use_cases::scoring::score_save::{ScoreRequest, ScoreSave};
use crate::bootstrap::app_context::AppContext;

pub fn routes(ctx: AppContext) -> Router {
    Router::new().route("/score", get(score)).with_state(ctx)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, StatusCode> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| StatusCode::BAD_REQUEST)
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ScoreQuery {
    pub fileid: String,
    pub timestamp: String,
    pub ref_fileid: String,
    pub ref_timestamp: String,
    /// Semicolon-separated tag classes; empty scores all of them.
    #[serde(default)]
    pub tags: Option<String>,
}

#[utoipa::path(get, path = "/api/score", tag = "Scoring", params(ScoreQuery), responses(
    (status = 200, description = "plain-text score report")
))]
pub async fn score(
    State(ctx): State<AppContext>,
    Query(q): Query<ScoreQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let req = ScoreRequest {
        fileid: q.fileid,
        timestamp: parse_timestamp(&q.timestamp)?,
        ref_fileid: q.ref_fileid,
        ref_timestamp: parse_timestamp(&q.ref_timestamp)?,
        tags: q
            .tags
            .as_deref()
            .unwrap_or("")
            .split(';')
            .filter(|t| !t.is_empty())
            .map(|t| t.to_string())
            .collect(),
    };
    let repo = ctx.annotation_repo();
    let uc = ScoreSave {
        repo: repo.as_ref(),
    };
    let outcome = uc
        .execute(&req)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok((
        [
            (
                header::CONTENT_TYPE,
                "text/plain; charset=utf-8".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"score.txt\"".to_string(),
            ),
        ],
        outcome.to_report_text(&req),
    ))
}
