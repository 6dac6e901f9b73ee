//! 工作流事件观察者
//!
//! 引擎在关键节点回调观察者，指标采集等横切逻辑通过实现该接口接入。

use medqueue_core::{PatientStatus, Severity, UserRole};

use crate::access::Action;

/// 工作流事件回调，默认实现为空
pub trait FlowObserver: Send + Sync {
    /// 患者登记完成
    fn patient_registered(&self, _severity: Severity, _wait_minutes: u32) {}

    /// 排队状态写入
    fn status_changed(&self, _from: PatientStatus, _to: PatientStatus) {}

    /// 权限校验失败
    fn access_denied(&self, _role: UserRole, _action: Action) {}
}

/// 不做任何处理的观察者
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl FlowObserver for NoopObserver {}
