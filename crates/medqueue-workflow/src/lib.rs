//! # MedQueue 工作流模块
//!
//! 提供患者分诊与排队的业务逻辑，包括：
//! - 分诊预估：根据严重程度和服务估算候诊时间
//! - 排队状态机：管理患者排队状态的取值与转换
//! - 访问控制：集中的角色能力表与医院范围校验
//! - 队列与预约视图：角色范围内的列表过滤与统计

pub mod access;
pub mod analytics;
pub mod appointments;
pub mod engine;
pub mod observer;
pub mod queue;
pub mod state_machine;
pub mod triage;

// 重新导出主要类型
pub use access::{ensure_same_hospital, require_hospital, AccessPolicy, Action};
pub use analytics::HospitalAnalytics;
pub use appointments::{week_start, AppointmentFilter, DateWindow};
pub use engine::{Dashboard, NotificationInbox, WorkflowEngine, WorkflowSettings};
pub use observer::{FlowObserver, NoopObserver};
pub use queue::{PatientFilter, QueueStats};
pub use state_machine::{PatientStateMachine, TransitionPolicy};
pub use triage::{TriageEstimator, WaitEstimate, DEFAULT_BASE_WAIT_MINUTES};
