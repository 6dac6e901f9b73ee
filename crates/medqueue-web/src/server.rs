//! Web服务器

use axum::{
    middleware,
    routing::{get, patch, post, put},
    Router,
};
use medqueue_admin::FlowMetrics;
use medqueue_core::Result;
use medqueue_workflow::WorkflowEngine;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::auth::{
    auth_middleware, login_handler, logout_handler, me_handler, register_handler, AuthService,
};
use crate::handlers;

/// 处理器共享状态
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<WorkflowEngine>,
    pub auth: Arc<AuthService>,
    /// 未启用指标时 `/metrics` 返回 404
    pub metrics: Option<Arc<FlowMetrics>>,
}

pub struct WebServer {
    addr: SocketAddr,
    app: Router,
}

impl WebServer {
    pub fn new(addr: SocketAddr, state: AppState, request_timeout: Duration) -> Self {
        Self {
            addr,
            app: router(state, request_timeout),
        }
    }

    pub async fn run(self) -> Result<()> {
        info!("Starting web server on {}", self.addr);

        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Web server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// 构建完整路由
pub fn router(state: AppState, request_timeout: Duration) -> Router {
    let auth_layer = middleware::from_fn_with_state(state.clone(), auth_middleware);

    // 认证路由（无需token）
    let public = Router::new()
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .route("/auth/register", post(register_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/logout", post(logout_handler));

    let session = Router::new()
        .route("/auth/me", get(me_handler))
        .route_layer(auth_layer.clone());

    Router::new()
        .merge(public)
        .merge(session)
        .nest("/api/v1", api_routes().route_layer(auth_layer))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                )
                .layer(TimeoutLayer::new(request_timeout)),
        )
        .with_state(state)
}

/// API v1 路由
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/hospitals", post(handlers::register_hospital))
        .route("/hospitals/current", get(handlers::current_hospital))
        .route(
            "/services",
            get(handlers::list_services).post(handlers::add_service),
        )
        .route("/services/available", get(handlers::available_services))
        .route(
            "/services/:id",
            put(handlers::update_service).delete(handlers::remove_service),
        )
        .route("/staff", get(handlers::list_staff).post(handlers::add_staff))
        .route(
            "/patients",
            get(handlers::list_patients).post(handlers::register_patient),
        )
        .route(
            "/patients/:id",
            get(handlers::get_patient).patch(handlers::update_patient),
        )
        .route("/triage/estimate", post(handlers::estimate_wait))
        .route(
            "/appointments",
            get(handlers::list_appointments).post(handlers::schedule_appointment),
        )
        .route("/appointments/:id", get(handlers::get_appointment))
        .route(
            "/appointments/:id/status",
            patch(handlers::update_appointment_status),
        )
        .route("/dashboard", get(handlers::dashboard))
        .route("/analytics", get(handlers::analytics))
        .route(
            "/notifications",
            get(handlers::list_notifications).post(handlers::send_notification),
        )
        .route("/notifications/read-all", post(handlers::mark_all_read))
        .route("/notifications/:id/read", post(handlers::mark_notification_read))
}
