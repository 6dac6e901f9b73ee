//! 候诊队列视图
//!
//! "队列" 只是按状态过滤后的患者列表加上登记时的静态预估，不是排序结构。
//! 过滤在内存中完成，保持存储返回的相对顺序。

use chrono::NaiveDate;
use medqueue_core::{Patient, PatientStatus, Severity};
use serde::{Deserialize, Serialize};

/// 患者列表过滤器
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientFilter {
    pub status: Option<PatientStatus>,
    pub severity: Option<Severity>,
    /// 姓名（不区分大小写）或电话号码子串
    pub search: Option<String>,
}

impl PatientFilter {
    pub fn with_status(mut self, status: PatientStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn matches(&self, patient: &Patient) -> bool {
        if let Some(term) = self.search.as_deref().filter(|t| !t.is_empty()) {
            let name_hit = patient.name.to_lowercase().contains(&term.to_lowercase());
            let phone_hit = patient.phone_number.contains(term);
            if !name_hit && !phone_hit {
                return false;
            }
        }

        if let Some(status) = self.status {
            if patient.current_status != status {
                return false;
            }
        }

        if let Some(severity) = self.severity {
            if patient.severity != severity {
                return false;
            }
        }

        true
    }

    /// 应用过滤器
    pub fn apply(&self, mut patients: Vec<Patient>) -> Vec<Patient> {
        patients.retain(|p| self.matches(p));
        patients
    }
}

/// 队列统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStats {
    pub total_patients: usize,
    pub waiting_patients: usize,
    pub in_progress_patients: usize,
    pub critical_patients: usize,
    pub completed_today: usize,
    pub appointments_today: usize,
}

impl QueueStats {
    /// 统计患者列表，`count_completed_today` 为假时当日完成数记为 0
    pub fn from_patients(patients: &[Patient], today: NaiveDate, count_completed_today: bool) -> Self {
        let mut stats = QueueStats {
            total_patients: patients.len(),
            ..Default::default()
        };

        for patient in patients {
            match patient.current_status {
                PatientStatus::Waiting => stats.waiting_patients += 1,
                PatientStatus::InProgress => stats.in_progress_patients += 1,
                PatientStatus::Completed => {
                    if count_completed_today && patient.last_updated.date_naive() >= today {
                        stats.completed_today += 1;
                    }
                }
                PatientStatus::Cancelled => {}
            }

            if patient.severity == Severity::Critical {
                stats.critical_patients += 1;
            }
        }

        stats
    }
}
