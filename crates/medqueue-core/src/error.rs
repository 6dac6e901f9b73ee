//! 错误定义模块

use thiserror::Error;

/// 系统统一错误类型
#[derive(Error, Debug)]
pub enum MedQueueError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("存储错误: {0}")]
    Storage(String),

    #[error("网络错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("验证错误: {0}")]
    Validation(String),

    #[error("权限错误: {0}")]
    Permission(String),

    #[error("未认证: {0}")]
    Unauthenticated(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("系统内部错误: {0}")]
    Internal(String),

    #[error("无效状态转换: 从 {from} 到 {to}")]
    InvalidStateTransition { from: String, to: String },
}

impl MedQueueError {
    /// 存储或网络层的失败可由调用方重试，其余错误重试无意义
    pub fn is_retryable(&self) -> bool {
        matches!(self, MedQueueError::Storage(_) | MedQueueError::Io(_))
    }
}

#[cfg(feature = "database")]
impl From<sqlx::Error> for MedQueueError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => MedQueueError::NotFound("Record not found".to_string()),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                MedQueueError::Validation(format!("Duplicate record: {}", db.message()))
            }
            other => MedQueueError::Storage(other.to_string()),
        }
    }
}

/// 系统统一结果类型
pub type Result<T> = std::result::Result<T, MedQueueError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(MedQueueError::Storage("timeout".to_string()).is_retryable());
        assert!(!MedQueueError::Validation("age".to_string()).is_retryable());
        assert!(!MedQueueError::Permission("patient".to_string()).is_retryable());
        assert!(!MedQueueError::NotFound("patient".to_string()).is_retryable());
    }

    #[test]
    fn test_transition_error_message() {
        let err = MedQueueError::InvalidStateTransition {
            from: "completed".to_string(),
            to: "waiting".to_string(),
        };
        assert_eq!(err.to_string(), "无效状态转换: 从 completed 到 waiting");
    }
}
