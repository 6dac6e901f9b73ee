//! 医院运营统计

use chrono::{DateTime, Datelike, Utc};
use medqueue_core::{Patient, PatientStatus, Severity};
use serde::{Deserialize, Serialize};

use crate::appointments::week_start;

/// 管理员分析面板数据
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HospitalAnalytics {
    pub total_patients: usize,
    pub patients_today: usize,
    pub patients_this_week: usize,
    pub patients_this_month: usize,
    /// 登记预估候诊时间的平均值（分钟，四舍五入）
    pub average_wait_time: u32,
    /// 已完成患者占比（百分比，四舍五入）
    pub completion_rate: u32,
    pub critical_cases: usize,
}

impl HospitalAnalytics {
    /// 按登记时间统计
    pub fn compute(patients: &[Patient], now: DateTime<Utc>) -> Self {
        let today = now.date_naive();
        let week_begin = week_start(today);

        let mut analytics = HospitalAnalytics {
            total_patients: patients.len(),
            ..Default::default()
        };

        if patients.is_empty() {
            return analytics;
        }

        let mut total_wait: u64 = 0;
        let mut completed = 0usize;

        for patient in patients {
            let registered = patient.created_at.date_naive();
            if registered == today {
                analytics.patients_today += 1;
            }
            if registered >= week_begin && registered <= today {
                analytics.patients_this_week += 1;
            }
            if registered.year() == today.year() && registered.month() == today.month() {
                analytics.patients_this_month += 1;
            }
            if patient.current_status == PatientStatus::Completed {
                completed += 1;
            }
            if patient.severity == Severity::Critical {
                analytics.critical_cases += 1;
            }
            total_wait += u64::from(patient.wait_time);
        }

        let count = patients.len() as f64;
        analytics.average_wait_time = (total_wait as f64 / count).round() as u32;
        analytics.completion_rate = (completed as f64 * 100.0 / count).round() as u32;

        analytics
    }
}
