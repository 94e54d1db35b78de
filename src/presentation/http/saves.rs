use axum::{
    Json, Router,
    extract::{Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::application::ports::save_repository::SaveRow;
use crate::application::use_cases::export::export_save::{ExportFormat, ExportSave};
use crate::application::use_cases::saves::finalize_save::FinalizeSave;
use crate::application::use_cases::saves::list_saves::ListSaves;
use crate::application::use_cases::saves::rename_save::RenameSave;
use crate::bootstrap::app_context::AppContext;

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/saves", get(list_saves))
        .route("/finalize", post(finalize_save))
        .route("/savename", post(rename_save))
        .route("/export", get(export_save))
        .with_state(ctx)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, StatusCode> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| StatusCode::BAD_REQUEST)
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SaveItem {
    pub fileid: String,
    pub userid: String,
    pub timestamp: DateTime<Utc>,
    pub savename: String,
    pub autosave: bool,
    #[serde(rename = "final")]
    pub is_final: bool,
    pub count: i64,
}

impl From<SaveRow> for SaveItem {
    fn from(row: SaveRow) -> Self {
        SaveItem {
            fileid: row.fileid,
            userid: row.userid,
            timestamp: row.timestamp,
            savename: row.savename,
            autosave: row.autosave,
            is_final: row.is_final,
            count: row.count,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SavesResponse {
    pub saves: Vec<SaveItem>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SavesQuery {
    pub fileid: Option<String>,
    pub userid: Option<String>,
    #[serde(rename = "final", default)]
    pub only_final: Option<bool>,
}

#[utoipa::path(get, path = "/api/saves", tag = "Saves", params(SavesQuery), responses(
    (status = 200, body = SavesResponse)
))]
pub async fn list_saves(
    State(ctx): State<AppContext>,
    Query(q): Query<SavesQuery>,
) -> Result<Json<SavesResponse>, StatusCode> {
    let repo = ctx.save_repo();
    let uc = ListSaves {
        repo: repo.as_ref(),
    };
    let saves = uc
        .execute(
            q.fileid.as_deref(),
            q.userid.as_deref(),
            q.only_final.unwrap_or(false),
        )
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(SavesResponse { saves }))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct FinalizeQuery {
    pub fileid: String,
    pub userid: String,
    pub timestamp: String,
    pub savename: String,
}

#[utoipa::path(post, path = "/api/finalize", tag = "Saves", params(FinalizeQuery), responses(
    (status = 200, description = "save marked final"),
    (status = 404, description = "no such save")
))]
pub async fn finalize_save(
    State(ctx): State<AppContext>,
    Query(q): Query<FinalizeQuery>,
) -> Result<StatusCode, StatusCode> {
    let timestamp = parse_timestamp(&q.timestamp)?;
    let repo = ctx.save_repo();
    let uc = FinalizeSave {
        repo: repo.as_ref(),
    };
    let updated = uc
        .execute(&q.fileid, &q.userid, timestamp, &q.savename)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    if updated {
        Ok(StatusCode::OK)
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct RenameQuery {
    pub fileid: String,
    pub userid: String,
    pub timestamp: String,
    pub savename: String,
    pub newname: String,
}

#[utoipa::path(post, path = "/api/savename", tag = "Saves", params(RenameQuery), responses(
    (status = 200, description = "save renamed"),
    (status = 404, description = "no such save")
))]
pub async fn rename_save(
    State(ctx): State<AppContext>,
    Query(q): Query<RenameQuery>,
) -> Result<StatusCode, StatusCode> {
    let timestamp = parse_timestamp(&q.timestamp)?;
    let repo = ctx.save_repo();
    let uc = RenameSave {
        repo: repo.as_ref(),
    };
    let updated = uc
        .execute(&q.fileid, &q.userid, timestamp, &q.savename, &q.newname)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    if updated {
        Ok(StatusCode::OK)
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ExportQuery {
    pub fileid: String,
    pub timestamp: String,
    #[serde(default)]
    pub savename: Option<String>,
    /// `json` (default) or `text`.
    #[serde(default)]
    pub format: Option<String>,
}

#[utoipa::path(get, path = "/api/export", tag = "Saves", params(ExportQuery), responses(
    (status = 200, description = "downloadable save")
))]
pub async fn export_save(
    State(ctx): State<AppContext>,
    Query(q): Query<ExportQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let timestamp = parse_timestamp(&q.timestamp)?;
    let format = ExportFormat::from_str(q.format.as_deref().unwrap_or("json"));
    let repo = ctx.annotation_repo();
    let uc = ExportSave {
        repo: repo.as_ref(),
    };
    let body = uc
        .execute(&q.fileid, timestamp, format)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let stem = q.savename.unwrap_or_else(|| q.fileid.clone());
    let extension = match format {
        ExportFormat::Json => "json",
        ExportFormat::Text => "txt",
    };
    let disposition = format!("attachment; filename=\"{stem}.{extension}\"");
    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}
