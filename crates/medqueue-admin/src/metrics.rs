//! 业务指标
//!
//! 以工作流观察者的形式采集登记、状态转换与拒绝访问事件，按 Prometheus 文本格式导出。

use anyhow::Result;
use medqueue_core::{PatientStatus, Severity, UserRole};
use medqueue_workflow::{Action, FlowObserver};
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder};

/// 工作流指标收集器
#[derive(Debug, Clone)]
pub struct FlowMetrics {
    /// Prometheus 指标注册表
    registry: Registry,
    /// 按严重程度统计的登记数
    registrations_total: IntCounterVec,
    /// 按目标状态统计的状态写入数
    transitions_total: IntCounterVec,
    /// 按操作统计的拒绝访问数
    access_denied_total: IntCounterVec,
    /// 登记时的预估候诊时间
    wait_estimate_minutes: Histogram,
}

impl FlowMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let registrations_total = IntCounterVec::new(
            Opts::new("medqueue_patient_registrations_total", "Patients registered by severity"),
            &["severity"],
        )?;

        let transitions_total = IntCounterVec::new(
            Opts::new("medqueue_status_transitions_total", "Queue status writes by target status"),
            &["to"],
        )?;

        let access_denied_total = IntCounterVec::new(
            Opts::new("medqueue_access_denied_total", "Denied operations by action and role"),
            &["action", "role"],
        )?;

        let wait_estimate_minutes = Histogram::with_opts(
            HistogramOpts::new(
                "medqueue_wait_estimate_minutes",
                "Estimated wait assigned at registration in minutes",
            )
            .buckets(vec![0.0, 10.0, 20.0, 30.0, 45.0, 60.0, 90.0, 120.0, 240.0]),
        )?;

        registry.register(Box::new(registrations_total.clone()))?;
        registry.register(Box::new(transitions_total.clone()))?;
        registry.register(Box::new(access_denied_total.clone()))?;
        registry.register(Box::new(wait_estimate_minutes.clone()))?;

        Ok(Self {
            registry,
            registrations_total,
            transitions_total,
            access_denied_total,
            wait_estimate_minutes,
        })
    }

    /// 导出 Prometheus 文本格式
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;

        Ok(String::from_utf8(buffer)?)
    }

    pub fn content_type(&self) -> &'static str {
        prometheus::TEXT_FORMAT
    }
}

impl FlowObserver for FlowMetrics {
    fn patient_registered(&self, severity: Severity, wait_minutes: u32) {
        self.registrations_total
            .with_label_values(&[severity.as_str()])
            .inc();
        self.wait_estimate_minutes.observe(f64::from(wait_minutes));
    }

    fn status_changed(&self, _from: PatientStatus, to: PatientStatus) {
        self.transitions_total.with_label_values(&[to.as_str()]).inc();
    }

    fn access_denied(&self, role: UserRole, action: Action) {
        let action = action.to_string();
        self.access_denied_total
            .with_label_values(&[action.as_str(), role.as_str()])
            .inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observer_events_exported() {
        let metrics = FlowMetrics::new().unwrap();
        metrics.patient_registered(Severity::Critical, 0);
        metrics.patient_registered(Severity::Low, 45);
        metrics.status_changed(PatientStatus::Waiting, PatientStatus::InProgress);
        metrics.access_denied(UserRole::Patient, Action::UpdatePatientQueue);

        let text = metrics.render().unwrap();
        assert!(text.contains("medqueue_patient_registrations_total{severity=\"critical\"} 1"));
        assert!(text.contains("medqueue_status_transitions_total{to=\"in-progress\"} 1"));
        assert!(text.contains(
            "medqueue_access_denied_total{action=\"UpdatePatientQueue\",role=\"patient\"} 1"
        ));
        assert!(text.contains("medqueue_wait_estimate_minutes_count 2"));
    }
}
