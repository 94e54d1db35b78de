use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::application::use_cases::annotations::create_mark::{
    CreateMark, CreateMarkError, CreateMarkRequest,
};
use crate::application::use_cases::annotations::diff_saves::DiffSaves;
use crate::application::use_cases::annotations::get_segments::GetSegments;
use crate::application::use_cases::annotations::load_all_annotations::LoadAllAnnotations;
use crate::application::use_cases::annotations::load_annotations::LoadAnnotations;
use crate::application::use_cases::annotations::save_annotations::SaveAnnotations;
use crate::application::services::segmenter::Segment;
use crate::bootstrap::app_context::AppContext;
use crate::domain::annotations::span::TextSpan;

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/annotations", get(get_annotations).post(post_annotations))
        .route("/annotations/all", get(get_all_annotations))
        .route("/annotations/mark", post(post_mark))
        .route("/annotations/diff", get(get_diff))
        .route("/segments", get(get_segments))
        .with_state(ctx)
}

/// `timestamp` comes back from save listings as RFC 3339; an absent or empty
/// value means "most recent".
fn parse_timestamp(raw: Option<&str>) -> Result<Option<DateTime<Utc>>, StatusCode> {
    match raw {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|_| StatusCode::BAD_REQUEST),
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct AnnotationsQuery {
    pub fileid: String,
    pub userid: String,
    pub timestamp: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AnnotationsResponse {
    pub fileid: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub savename: Option<String>,
    pub annotations: Vec<TextSpan>,
}

#[utoipa::path(get, path = "/api/annotations", tag = "Annotations", params(AnnotationsQuery), responses(
    (status = 200, body = AnnotationsResponse)
))]
pub async fn get_annotations(
    State(ctx): State<AppContext>,
    Query(q): Query<AnnotationsQuery>,
) -> Result<Json<AnnotationsResponse>, StatusCode> {
    let timestamp = parse_timestamp(q.timestamp.as_deref())?;
    let repo = ctx.annotation_repo();
    let uc = LoadAnnotations {
        repo: repo.as_ref(),
    };
    let loaded = uc
        .execute(&q.fileid, &q.userid, timestamp)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let resp = match loaded {
        Some(loaded) => AnnotationsResponse {
            fileid: q.fileid,
            timestamp: Some(loaded.save.timestamp),
            savename: Some(loaded.save.savename),
            annotations: loaded.spans,
        },
        None => AnnotationsResponse {
            fileid: q.fileid,
            timestamp: None,
            savename: None,
            annotations: Vec::new(),
        },
    };
    Ok(Json(resp))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct AllAnnotationsQuery {
    pub fileid: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AllAnnotationsResponse {
    #[serde(rename = "otherAnnotations")]
    pub other_annotations: Vec<TextSpan>,
}

#[utoipa::path(get, path = "/api/annotations/all", tag = "Annotations", params(AllAnnotationsQuery), responses(
    (status = 200, body = AllAnnotationsResponse)
))]
pub async fn get_all_annotations(
    State(ctx): State<AppContext>,
    Query(q): Query<AllAnnotationsQuery>,
) -> Result<Json<AllAnnotationsResponse>, StatusCode> {
    let repo = ctx.annotation_repo();
    let uc = LoadAllAnnotations {
        repo: repo.as_ref(),
    };
    let other_annotations = uc
        .execute(&q.fileid)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(AllAnnotationsResponse { other_annotations }))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SaveQuery {
    pub fileid: String,
    pub userid: String,
    #[serde(default)]
    pub savename: Option<String>,
    #[serde(default)]
    pub autosave: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SaveBody {
    pub annotations: Vec<TextSpan>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SaveResponse {
    pub fileid: String,
    pub timestamp: DateTime<Utc>,
    pub savename: String,
}

#[utoipa::path(post, path = "/api/annotations", tag = "Annotations", params(SaveQuery), request_body = SaveBody, responses(
    (status = 200, body = SaveResponse)
))]
pub async fn post_annotations(
    State(ctx): State<AppContext>,
    Query(q): Query<SaveQuery>,
    Json(body): Json<SaveBody>,
) -> Result<Json<SaveResponse>, StatusCode> {
    let repo = ctx.annotation_repo();
    let uc = SaveAnnotations {
        repo: repo.as_ref(),
    };
    let save = uc
        .execute(
            &q.fileid,
            &q.userid,
            q.savename.as_deref().unwrap_or(""),
            q.autosave.unwrap_or(false),
            &body.annotations,
        )
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(SaveResponse {
        fileid: save.fileid,
        timestamp: save.timestamp,
        savename: save.savename,
    }))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MarkBody {
    pub fileid: String,
    pub userid: String,
    pub start: usize,
    pub end: usize,
    pub tag: String,
    #[serde(default)]
    pub name: String,
    /// Reassign this existing mark instead of creating a new one.
    #[serde(default)]
    pub annoid: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MarkResponse {
    /// False when the selection was rejected (zero-length or out of bounds);
    /// nothing was stored in that case.
    pub created: bool,
    pub span: Option<TextSpan>,
    #[serde(rename = "linkedTo")]
    pub linked_to: Option<Uuid>,
    pub timestamp: Option<DateTime<Utc>>,
    pub savename: Option<String>,
    pub annotations: Vec<TextSpan>,
}

#[utoipa::path(post, path = "/api/annotations/mark", tag = "Annotations", request_body = MarkBody, responses(
    (status = 200, body = MarkResponse),
    (status = 404, description = "unknown fileid")
))]
pub async fn post_mark(
    State(ctx): State<AppContext>,
    Json(body): Json<MarkBody>,
) -> Result<Json<MarkResponse>, StatusCode> {
    let repo = ctx.annotation_repo();
    let store = ctx.document_store();
    let uc = CreateMark {
        repo: repo.as_ref(),
        store: store.as_ref(),
        autolink: ctx.autolink(),
    };
    let req = CreateMarkRequest {
        fileid: body.fileid,
        userid: body.userid,
        start: body.start,
        end: body.end,
        tag: body.tag,
        name: body.name,
        annoid: body.annoid,
    };
    let outcome = uc.execute(&req).await.map_err(|e| match e {
        CreateMarkError::DocumentNotFound(_) => StatusCode::NOT_FOUND,
        CreateMarkError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
    })?;
    let resp = match outcome {
        Some(outcome) => MarkResponse {
            created: true,
            span: Some(outcome.span),
            linked_to: outcome.linked_to,
            timestamp: Some(outcome.save.timestamp),
            savename: Some(outcome.save.savename),
            annotations: outcome.spans,
        },
        None => MarkResponse {
            created: false,
            span: None,
            linked_to: None,
            timestamp: None,
            savename: None,
            annotations: Vec::new(),
        },
    };
    Ok(Json(resp))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct DiffQuery {
    pub fileid: String,
    pub userid: String,
    /// Semicolon-separated RFC 3339 timestamps.
    pub timestamps: String,
    #[serde(default)]
    pub tags: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SaveDiffItem {
    pub timestamp: DateTime<Utc>,
    pub lines: Vec<String>,
}

#[utoipa::path(get, path = "/api/annotations/diff", tag = "Annotations", params(DiffQuery), responses(
    (status = 200, body = [SaveDiffItem])
))]
pub async fn get_diff(
    State(ctx): State<AppContext>,
    Query(q): Query<DiffQuery>,
) -> Result<Json<Vec<SaveDiffItem>>, StatusCode> {
    let mut timestamps = Vec::new();
    for raw in q.timestamps.split(';').filter(|s| !s.is_empty()) {
        let ts = parse_timestamp(Some(raw))?.ok_or(StatusCode::BAD_REQUEST)?;
        timestamps.push(ts);
    }
    let tags: Vec<String> = q
        .tags
        .as_deref()
        .unwrap_or("")
        .split(';')
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect();

    let repo = ctx.annotation_repo();
    let uc = DiffSaves {
        repo: repo.as_ref(),
    };
    let diffs = uc
        .execute(&q.fileid, &q.userid, &timestamps, &tags)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(
        diffs
            .into_iter()
            .map(|d| SaveDiffItem {
                timestamp: d.timestamp,
                lines: d.lines,
            })
            .collect(),
    ))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SegmentsQuery {
    pub fileid: String,
    pub userid: String,
    pub timestamp: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SegmentsResponse {
    pub fileid: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub savename: Option<String>,
    pub segments: Vec<Segment>,
}

#[utoipa::path(get, path = "/api/segments", tag = "Annotations", params(SegmentsQuery), responses(
    (status = 200, body = SegmentsResponse),
    (status = 404, description = "unknown fileid")
))]
pub async fn get_segments(
    State(ctx): State<AppContext>,
    Query(q): Query<SegmentsQuery>,
) -> Result<Json<SegmentsResponse>, StatusCode> {
    let timestamp = parse_timestamp(q.timestamp.as_deref())?;
    let repo = ctx.annotation_repo();
    let store = ctx.document_store();
    let uc = GetSegments {
        repo: repo.as_ref(),
        store: store.as_ref(),
    };
    let payload = uc
        .execute(&q.fileid, &q.userid, timestamp)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(SegmentsResponse {
        fileid: q.fileid,
        timestamp: payload.save.as_ref().map(|s| s.timestamp),
        savename: payload.save.map(|s| s.savename),
        segments: payload.segments,
    }))
}
