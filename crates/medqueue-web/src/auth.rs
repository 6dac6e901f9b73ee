//! 用户认证
//!
//! 登录后签发不透明的 bearer 令牌，会话保存在进程内存中。
//! 每次请求都会重新读取用户记录，医院关联变化立即生效。

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::{DateTime, Duration, Utc};
use medqueue_core::{MedQueueError, Result, SignUpRequest, User};
use medqueue_workflow::WorkflowEngine;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::server::AppState;

/// 登录请求
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// 登录响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct Session {
    user_id: Uuid,
    expires_at: DateTime<Utc>,
}

/// 认证服务
pub struct AuthService {
    engine: Arc<WorkflowEngine>,
    sessions: RwLock<HashMap<String, Session>>,
    session_ttl: Duration,
}

impl AuthService {
    pub fn new(engine: Arc<WorkflowEngine>, session_ttl_hours: i64) -> Self {
        Self {
            engine,
            sessions: RwLock::new(HashMap::new()),
            session_ttl: Duration::hours(session_ttl_hours),
        }
    }

    /// 注册账号
    pub async fn register(&self, request: SignUpRequest) -> Result<User> {
        self.engine.sign_up(request).await
    }

    /// 用户登录
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse> {
        let user = self.engine.authenticate(&request.email, &request.password).await?;

        // 登录时顺带清理过期会话，签发后不再出示的令牌不会一直驻留
        let purged = self.purge_expired().await;
        if purged > 0 {
            debug!("Purged {} expired sessions", purged);
        }

        let token = generate_token();
        let expires_at = Utc::now() + self.session_ttl;
        self.sessions.write().await.insert(
            token.clone(),
            Session {
                user_id: user.id,
                expires_at,
            },
        );

        Ok(LoginResponse {
            token,
            user,
            expires_at,
        })
    }

    /// 验证令牌并返回最新的用户记录
    pub async fn verify_token(&self, token: &str) -> Result<User> {
        let session = self
            .sessions
            .read()
            .await
            .get(token)
            .cloned()
            .ok_or_else(|| MedQueueError::Unauthenticated("Invalid token".to_string()))?;

        if session.expires_at <= Utc::now() {
            self.sessions.write().await.remove(token);
            return Err(MedQueueError::Unauthenticated("Token has expired".to_string()));
        }

        match self.engine.get_user(session.user_id).await {
            Ok(user) => Ok(user),
            Err(MedQueueError::NotFound(_)) => {
                Err(MedQueueError::Unauthenticated("Account no longer exists".to_string()))
            }
            Err(e) => Err(e),
        }
    }

    /// 当前保存的会话数，包括尚未清理的过期会话
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// 注销会话
    pub async fn logout(&self, token: &str) -> bool {
        self.sessions.write().await.remove(token).is_some()
    }

    /// 清理过期会话，返回清理数量
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.expires_at > now);
        before - sessions.len()
    }
}

fn generate_token() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

/// 从请求头提取 bearer 令牌
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// 认证中间件
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> std::result::Result<Response, ApiError> {
    let token = bearer_token(request.headers())
        .ok_or_else(|| MedQueueError::Unauthenticated("Missing bearer token".to_string()))?
        .to_string();

    let user = state.auth.verify_token(&token).await?;

    // 将用户信息添加到请求扩展中
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// 注册处理器
pub async fn register_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SignUpRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = state.auth.register(request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// 登录处理器
pub async fn login_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    match state.auth.login(request).await {
        Ok(response) => {
            info!("User logged in successfully: {}", response.user.id);
            Ok(Json(response))
        }
        Err(e) => {
            warn!("Login failed: {}", e);
            Err(e.into())
        }
    }
}

/// 注销处理器
pub async fn logout_handler(State(state): State<AppState>, headers: HeaderMap) -> StatusCode {
    if let Some(token) = bearer_token(&headers) {
        state.auth.logout(token).await;
    }
    StatusCode::NO_CONTENT
}

/// 获取当前用户信息
pub async fn me_handler(Extension(user): Extension<User>) -> Json<User> {
    Json(user)
}
