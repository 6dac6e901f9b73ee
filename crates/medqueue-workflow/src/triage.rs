//! 分诊预估
//!
//! 根据病情严重程度与所选服务估算候诊时间（分钟）。纯函数，无副作用；
//! 结果只在登记时写入一次，不随后续状态变化重新计算。

use medqueue_core::{Service, Severity};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 无法识别的严重程度使用的基础时间
pub const DEFAULT_BASE_WAIT_MINUTES: u32 = 30;

/// 预估结果明细
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitEstimate {
    pub base_minutes: u32,
    pub service_minutes: u32,
    /// 实际参与计算的服务，未提供或无法解析时为 `None`
    pub service_id: Option<Uuid>,
    pub total_minutes: u32,
}

/// 分诊预估器
#[derive(Debug, Clone, Copy, Default)]
pub struct TriageEstimator;

impl TriageEstimator {
    /// 固定的严重程度基础时间
    pub fn base_wait_minutes(severity: Severity) -> u32 {
        match severity {
            Severity::Critical => 0,
            Severity::High => 10,
            Severity::Medium => 20,
            Severity::Low => 30,
        }
    }

    /// 按原始标签取基础时间，未知标签回落到 30 分钟
    pub fn base_wait_for_label(label: &str) -> u32 {
        label
            .parse::<Severity>()
            .map(Self::base_wait_minutes)
            .unwrap_or(DEFAULT_BASE_WAIT_MINUTES)
    }

    /// 估算候诊时间
    pub fn estimate(severity: Severity, service_id: Option<Uuid>, services: &[Service]) -> u32 {
        Self::breakdown(Self::base_wait_minutes(severity), service_id, services).total_minutes
    }

    /// 以原始严重程度标签估算
    pub fn estimate_for_label(label: &str, service_id: Option<Uuid>, services: &[Service]) -> u32 {
        Self::breakdown(Self::base_wait_for_label(label), service_id, services).total_minutes
    }

    /// 带明细的估算，服务在列表中找不到时视为未提供
    pub fn breakdown(base_minutes: u32, service_id: Option<Uuid>, services: &[Service]) -> WaitEstimate {
        let service = service_id.and_then(|id| services.iter().find(|s| s.id == id));
        let service_minutes = service.map_or(0, |s| s.estimated_wait_time);

        WaitEstimate {
            base_minutes,
            service_minutes,
            service_id: service.map(|s| s.id),
            total_minutes: base_minutes.saturating_add(service_minutes),
        }
    }
}
