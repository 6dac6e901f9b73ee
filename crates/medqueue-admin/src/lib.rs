//! # MedQueue 管理模块
//!
//! 提供配置加载与校验、日志初始化和业务指标导出等运维功能

pub mod config;
pub mod logging;
pub mod metrics;

pub use config::{
    AppConfig, AuthConfig, ConfigValidator, DatabaseConfig, LogFormat, LoggingConfig,
    ServerConfig, StorageBackend, WorkflowConfig,
};
pub use logging::init_logging;
pub use metrics::FlowMetrics;
