use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::MatchedPath;
use dotenvy::dotenv;
use http::HeaderValue;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use texanno_api::application::services::search::SearchService;
use texanno_api::bootstrap::app_context::{AppContext, AppServices};
use texanno_api::bootstrap::config::Config;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
        paths(
            texanno_api::presentation::http::auth::register,
            texanno_api::presentation::http::auth::login,
            texanno_api::presentation::http::auth::me,
            texanno_api::presentation::http::auth::admin_status,
            texanno_api::presentation::http::documents::list_documents,
            texanno_api::presentation::http::documents::get_document,
            texanno_api::presentation::http::documents::get_tex,
            texanno_api::presentation::http::documents::get_pdf,
            texanno_api::presentation::http::annotations::get_annotations,
            texanno_api::presentation::http::annotations::get_all_annotations,
            texanno_api::presentation::http::annotations::post_annotations,
            texanno_api::presentation::http::annotations::post_mark,
            texanno_api::presentation::http::annotations::get_diff,
            texanno_api::presentation::http::annotations::get_segments,
            texanno_api::presentation::http::saves::list_saves,
            texanno_api::presentation::http::saves::finalize_save,
            texanno_api::presentation::http::saves::rename_save,
            texanno_api::presentation::http::saves::export_save,
            texanno_api::presentation::http::scoring::score,
            texanno_api::presentation::http::search::search_definitions,
            texanno_api::presentation::http::health::health,
        ),
        components(schemas(
            texanno_api::presentation::http::auth::RegisterRequest,
            texanno_api::presentation::http::auth::LoginRequest,
            texanno_api::presentation::http::auth::LoginResponse,
            texanno_api::presentation::http::auth::UserResponse,
            texanno_api::presentation::http::auth::AdminResponse,
            texanno_api::presentation::http::documents::DocumentItem,
            texanno_api::presentation::http::documents::DocumentListResponse,
            texanno_api::presentation::http::documents::DocumentResponse,
            texanno_api::presentation::http::documents::TexResponse,
            texanno_api::presentation::http::documents::PdfResponse,
            texanno_api::presentation::http::annotations::AnnotationsResponse,
            texanno_api::presentation::http::annotations::AllAnnotationsResponse,
            texanno_api::presentation::http::annotations::SaveBody,
            texanno_api::presentation::http::annotations::SaveResponse,
            texanno_api::presentation::http::annotations::MarkBody,
            texanno_api::presentation::http::annotations::MarkResponse,
            texanno_api::presentation::http::annotations::SaveDiffItem,
            texanno_api::presentation::http::annotations::SegmentsResponse,
            texanno_api::presentation::http::saves::SaveItem,
            texanno_api::presentation::http::saves::SavesResponse,
            texanno_api::presentation::http::search::DefinitionResponse,
            texanno_api::presentation::http::health::HealthResp,
            texanno_api::domain::annotations::span::TextSpan,
            texanno_api::domain::annotations::span::Link,
            texanno_api::application::services::segmenter::Segment,
            texanno_api::application::services::segmenter::SegmentTag,
            texanno_api::application::services::search::DefinitionHit,
        )),
        tags(
            (name = "Auth", description = "Authentication"),
            (name = "Documents", description = "Stored LaTeX sources and PDFs"),
            (name = "Annotations", description = "Span sets, marks, links and segments"),
            (name = "Saves", description = "Save management and export"),
            (name = "Scoring", description = "Save scoring and diffing"),
            (name = "Search", description = "Definition search"),
            (name = "Health", description = "System health checks")
        )
    )]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "texanno_api=debug,axum=info,tower_http=info".into()),
        )
        .init();

    let cfg = Config::from_env()?;
    info!(?cfg, "Starting TexAnno backend");

    // Database
    let pool = texanno_api::infrastructure::db::connect_pool(&cfg.database_url).await?;
    texanno_api::infrastructure::db::migrate(&pool).await?;

    // Document store directories
    for sub in ["texs", "pdfs"] {
        let dir = std::path::Path::new(&cfg.storage_root).join(sub);
        if let Err(e) = tokio::fs::create_dir_all(&dir).await {
            tracing::warn!(error = ?e, dir = %dir.display(), "Failed to create storage dir");
        }
    }

    let document_store = Arc::new(
        texanno_api::infrastructure::storage::fs_store::FsDocumentStore::new(&cfg.storage_root),
    );
    let annotation_repo = Arc::new(
        texanno_api::infrastructure::db::repositories::annotation_repository_sqlx::SqlxAnnotationRepository::new(
            pool.clone(),
        ),
    );
    let save_repo = Arc::new(
        texanno_api::infrastructure::db::repositories::save_repository_sqlx::SqlxSaveRepository::new(
            pool.clone(),
        ),
    );
    let user_repo = Arc::new(
        texanno_api::infrastructure::db::repositories::user_repository_sqlx::SqlxUserRepository::new(
            pool.clone(),
        ),
    );
    let search = Arc::new(SearchService::new(document_store.clone()));

    let services = AppServices::new(
        annotation_repo,
        save_repo,
        user_repo,
        document_store,
        search,
        cfg.autolink(),
    );
    let ctx = AppContext::new(cfg.clone(), services);

    // CORS: pin to the configured frontend origin, mirror in development.
    let cors = match cfg.frontend_url.as_deref().map(HeaderValue::from_str) {
        Some(Ok(origin)) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([http::Method::GET, http::Method::POST, http::Method::OPTIONS])
            .allow_headers([http::header::CONTENT_TYPE, http::header::AUTHORIZATION])
            .allow_credentials(true),
        _ => CorsLayer::new()
            .allow_origin(AllowOrigin::mirror_request())
            .allow_methods([http::Method::GET, http::Method::POST, http::Method::OPTIONS])
            .allow_headers([http::header::CONTENT_TYPE, http::header::AUTHORIZATION])
            .allow_credentials(true),
    };

    let app = Router::new()
        .nest(
            "/api",
            texanno_api::presentation::http::health::routes(pool.clone()),
        )
        .nest(
            "/api",
            texanno_api::presentation::http::documents::routes(ctx.clone()),
        )
        .nest(
            "/api",
            texanno_api::presentation::http::annotations::routes(ctx.clone()),
        )
        .nest(
            "/api",
            texanno_api::presentation::http::saves::routes(ctx.clone()),
        )
        .nest(
            "/api",
            texanno_api::presentation::http::scoring::routes(ctx.clone()),
        )
        .nest(
            "/api",
            texanno_api::presentation::http::search::routes(ctx.clone()),
        )
        .nest(
            "/api",
            texanno_api::presentation::http::auth::admin_routes(ctx.clone()),
        )
        .nest(
            "/api/auth",
            texanno_api::presentation::http::auth::routes(ctx.clone()),
        )
        .merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &http::Request<_>| {
                let method = req.method().clone();
                let uri = req.uri().clone();
                let matched = req
                    .extensions()
                    .get::<MatchedPath>()
                    .map(|p| p.as_str().to_string())
                    .unwrap_or_default();
                tracing::info_span!("http", %method, %uri, matched_path = %matched)
            }),
        );

    let api_addr = SocketAddr::from(([0, 0, 0, 0], cfg.api_port));
    info!(%api_addr, "HTTP API listening");
    let listener = tokio::net::TcpListener::bind(api_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
