//! 预约列表过滤

use chrono::{Datelike, Duration, NaiveDate};
use medqueue_core::{Appointment, AppointmentStatus, MedQueueError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 日期窗口
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DateWindow {
    #[default]
    All,
    Today,
    /// 今天之后的日期
    Upcoming,
    /// 包含今天的自然周（周日开始）
    ThisWeek,
}

impl FromStr for DateWindow {
    type Err = MedQueueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(DateWindow::All),
            "today" => Ok(DateWindow::Today),
            "upcoming" => Ok(DateWindow::Upcoming),
            "thisWeek" => Ok(DateWindow::ThisWeek),
            other => Err(MedQueueError::Validation(format!("Unknown date filter: {}", other))),
        }
    }
}

impl DateWindow {
    pub fn contains(&self, date: NaiveDate, today: NaiveDate) -> bool {
        match self {
            DateWindow::All => true,
            DateWindow::Today => date == today,
            DateWindow::Upcoming => date > today,
            DateWindow::ThisWeek => {
                let start = week_start(today);
                date >= start && date < start + Duration::days(7)
            }
        }
    }
}

/// 本周第一天（周日）
pub fn week_start(day: NaiveDate) -> NaiveDate {
    day - Duration::days(day.weekday().num_days_from_sunday() as i64)
}

/// 预约列表过滤器
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppointmentFilter {
    /// 患者或医生姓名，不区分大小写
    pub search: Option<String>,
    pub status: Option<AppointmentStatus>,
    #[serde(default)]
    pub window: DateWindow,
}

impl AppointmentFilter {
    pub fn matches(&self, appointment: &Appointment, today: NaiveDate) -> bool {
        if let Some(term) = self.search.as_deref().filter(|t| !t.is_empty()) {
            let term = term.to_lowercase();
            let patient_hit = appointment.patient_name.to_lowercase().contains(&term);
            let doctor_hit = appointment
                .doctor_name
                .as_deref()
                .map_or(false, |name| name.to_lowercase().contains(&term));
            if !patient_hit && !doctor_hit {
                return false;
            }
        }

        if let Some(status) = self.status {
            if appointment.status != status {
                return false;
            }
        }

        self.window.contains(appointment.date, today)
    }

    pub fn apply(&self, mut appointments: Vec<Appointment>, today: NaiveDate) -> Vec<Appointment> {
        appointments.retain(|a| self.matches(a, today));
        appointments
    }
}
