use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::application::ports::document_store::{DocumentInfo, PdfPayload};
use crate::application::use_cases::documents::get_document::GetDocument;
use crate::application::use_cases::documents::list_documents::ListDocuments;
use crate::bootstrap::app_context::AppContext;

#[derive(Debug, Serialize, ToSchema)]
pub struct DocumentItem {
    pub name: String,
    pub arxiv_id: String,
    pub stem: String,
    pub modified: String,
    pub size: String,
}

impl From<DocumentInfo> for DocumentItem {
    fn from(d: DocumentInfo) -> Self {
        DocumentItem {
            name: d.name,
            arxiv_id: d.arxiv_id,
            stem: d.stem,
            modified: d.modified,
            size: d.size,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DocumentListResponse {
    pub documents: Vec<DocumentItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DocumentResponse {
    pub fileid: String,
    pub tex: String,
    /// arXiv URL or base64-encoded bytes, depending on the document.
    pub pdf: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TexResponse {
    pub fileid: String,
    pub tex: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PdfResponse {
    pub fileid: String,
    pub pdf: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct FileQuery {
    pub fileid: String,
}

fn pdf_string(pdf: PdfPayload) -> String {
    match pdf {
        PdfPayload::Url(url) => url,
        PdfPayload::Base64(data) => data,
    }
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/document/all", get(list_documents))
        .route("/document", get(get_document))
        .route("/tex", get(get_tex))
        .route("/pdf", get(get_pdf))
        .with_state(ctx)
}

#[utoipa::path(get, path = "/api/document/all", tag = "Documents", responses(
    (status = 200, body = DocumentListResponse)
))]
pub async fn list_documents(
    State(ctx): State<AppContext>,
) -> Result<Json<DocumentListResponse>, StatusCode> {
    let store = ctx.document_store();
    let uc = ListDocuments {
        store: store.as_ref(),
    };
    let documents = uc
        .execute()
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(DocumentListResponse { documents }))
}

#[utoipa::path(get, path = "/api/document", tag = "Documents", params(FileQuery), responses(
    (status = 200, body = DocumentResponse),
    (status = 404, description = "unknown fileid")
))]
pub async fn get_document(
    State(ctx): State<AppContext>,
    Query(q): Query<FileQuery>,
) -> Result<Json<DocumentResponse>, StatusCode> {
    let store = ctx.document_store();
    let uc = GetDocument {
        store: store.as_ref(),
    };
    let doc = uc
        .execute(&q.fileid, true)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(DocumentResponse {
        fileid: doc.fileid,
        tex: doc.tex,
        pdf: doc.pdf.map(pdf_string),
    }))
}

#[utoipa::path(get, path = "/api/tex", tag = "Documents", params(FileQuery), responses(
    (status = 200, body = TexResponse),
    (status = 404, description = "unknown fileid")
))]
pub async fn get_tex(
    State(ctx): State<AppContext>,
    Query(q): Query<FileQuery>,
) -> Result<Json<TexResponse>, StatusCode> {
    let store = ctx.document_store();
    let uc = GetDocument {
        store: store.as_ref(),
    };
    let doc = uc
        .execute(&q.fileid, false)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(TexResponse {
        fileid: doc.fileid,
        tex: doc.tex,
    }))
}

#[utoipa::path(get, path = "/api/pdf", tag = "Documents", params(FileQuery), responses(
    (status = 200, body = PdfResponse),
    (status = 404, description = "unknown fileid or no pdf")
))]
pub async fn get_pdf(
    State(ctx): State<AppContext>,
    Query(q): Query<FileQuery>,
) -> Result<Json<PdfResponse>, StatusCode> {
    let store = ctx.document_store();
    let pdf = store
        .load_pdf(&q.fileid)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(PdfResponse {
        fileid: q.fileid,
        pdf: pdf_string(pdf),
    }))
}
