//! # MedQueue Web
//!
//! 基于 axum 的 HTTP 接口：账号认证、患者队列、预约、通知与运维端点。

pub mod auth;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod server;

pub use auth::AuthService;
pub use error::{ApiError, ApiResult};
pub use extract::ApiJson;
pub use server::{router, AppState, WebServer};
