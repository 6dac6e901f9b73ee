//! # MedQueue 数据库模块
//!
//! 提供仓储接口的两种实现：用于开发和测试的内存存储，
//! 以及基于 PostgreSQL 连接池的持久化存储。

pub mod connection;
pub mod memory;
pub mod models;
pub mod queries;

// 重新导出主要类型
pub use connection::DatabasePool;
pub use memory::InMemoryStore;
pub use models::*;
pub use queries::PostgresStore;
