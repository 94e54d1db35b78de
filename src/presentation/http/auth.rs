use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::application::use_cases::auth::login::{Login as LoginUc, LoginRequest as LoginDto};
use crate::application::use_cases::auth::me::GetMe;
use crate::application::use_cases::auth::register::{
    Register as RegisterUc, RegisterRequest as RegisterDto,
};
use crate::bootstrap::app_context::AppContext;
use crate::bootstrap::config::Config;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub userid: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub userid: String,
    #[serde(rename = "isAdmin")]
    pub is_admin: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub userid: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
        .with_state(ctx)
}

pub fn admin_routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/admin", get(admin_status))
        .with_state(ctx)
}

#[utoipa::path(post, path = "/api/auth/register", tag = "Auth", request_body = RegisterRequest, responses(
    (status = 200, body = UserResponse),
    (status = 409, description = "userid already taken")
))]
pub async fn register(
    State(ctx): State<AppContext>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<UserResponse>, StatusCode> {
    let repo = ctx.user_repo();
    let uc = RegisterUc {
        repo: repo.as_ref(),
    };
    let dto = RegisterDto {
        userid: req.userid.clone(),
        password: req.password.clone(),
    };
    let user = uc
        .execute(&dto)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::CONFLICT)?;
    Ok(Json(UserResponse {
        userid: user.userid,
        is_admin: user.is_admin,
    }))
}

#[utoipa::path(post, path = "/api/auth/login", tag = "Auth", request_body = LoginRequest, responses(
    (status = 200, body = LoginResponse),
    (status = 401, description = "bad credentials")
))]
pub async fn login(
    State(ctx): State<AppContext>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, StatusCode> {
    let repo = ctx.user_repo();
    let uc = LoginUc {
        repo: repo.as_ref(),
    };
    let dto = LoginDto {
        userid: req.userid.clone(),
        password: req.password.clone(),
    };
    let user = uc
        .execute(&dto)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let now = chrono::Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: user.userid.clone(),
        exp: now + (ctx.cfg.jwt_expires_secs as usize),
    };
    let token = jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(ctx.cfg.jwt_secret.as_bytes()),
    )
    .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(LoginResponse {
        access_token: token,
        user: UserResponse {
            userid: user.userid,
            is_admin: user.is_admin,
        },
    }))
}

#[utoipa::path(get, path = "/api/auth/me", tag = "Auth", responses((status = 200, body = UserResponse)))]
pub async fn me(
    State(ctx): State<AppContext>,
    bearer: Bearer,
) -> Result<Json<UserResponse>, StatusCode> {
    let sub = validate_bearer(&ctx.cfg, bearer)?;
    let repo = ctx.user_repo();
    let uc = GetMe {
        repo: repo.as_ref(),
    };
    let user = uc
        .execute(&sub)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::UNAUTHORIZED)?;
    Ok(Json(UserResponse {
        userid: user.userid,
        is_admin: user.is_admin,
    }))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct AdminQuery {
    pub userid: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminResponse {
    #[serde(rename = "isAdmin")]
    pub is_admin: bool,
}

#[utoipa::path(get, path = "/api/admin", tag = "Auth", params(AdminQuery), responses(
    (status = 200, body = AdminResponse)
))]
pub async fn admin_status(
    State(ctx): State<AppContext>,
    Query(q): Query<AdminQuery>,
) -> Result<Json<AdminResponse>, StatusCode> {
    let repo = ctx.user_repo();
    let uc = GetMe {
        repo: repo.as_ref(),
    };
    let is_admin = uc
        .execute(&q.userid)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .map(|u| u.is_admin)
        .unwrap_or(false);
    Ok(Json(AdminResponse { is_admin }))
}

// --- Bearer extractor & JWT utils ---
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

pub struct Bearer(pub String);

#[axum::async_trait]
impl<S> FromRequestParts<S> for Bearer
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(auth) = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
        {
            if let Some(t) = auth.strip_prefix("Bearer ") {
                return Ok(Bearer(t.to_string()));
            }
        }
        Err(StatusCode::UNAUTHORIZED)
    }
}

pub(crate) fn validate_bearer(cfg: &Config, bearer: Bearer) -> Result<String, StatusCode> {
    let data = jsonwebtoken::decode::<Claims>(
        &bearer.0,
        &DecodingKey::from_secret(cfg.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| StatusCode::UNAUTHORIZED)?;
    Ok(data.claims.sub)
}
