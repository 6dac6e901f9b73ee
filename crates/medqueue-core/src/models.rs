//! 核心数据模型定义
//!
//! 字段在线上以 camelCase 序列化，枚举值使用小写（`in-progress` 为短横线形式），
//! 与持久化文档的字段名保持一致。

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::MedQueueError;

/// 为字符串枚举生成 `as_str`、`ALL`、`Display` 与 `FromStr`
macro_rules! string_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = MedQueueError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(MedQueueError::Validation(format!(
                        "Unknown {} value: {}",
                        stringify!($name),
                        other
                    ))),
                }
            }
        }
    };
}

/// 用户角色
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// 医院管理员
    Admin,
    /// 前台接待
    Receptionist,
    /// 医生
    Doctor,
    /// 护士
    Nurse,
    /// 患者本人
    Patient,
}

string_enum!(UserRole {
    Admin => "admin",
    Receptionist => "receptionist",
    Doctor => "doctor",
    Nurse => "nurse",
    Patient => "patient",
});

impl UserRole {
    /// 医护及行政人员角色
    pub const STAFF: &'static [UserRole] = &[
        UserRole::Admin,
        UserRole::Receptionist,
        UserRole::Doctor,
        UserRole::Nurse,
    ];

    pub fn is_staff(&self) -> bool {
        !matches!(self, UserRole::Patient)
    }
}

/// 性别
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

string_enum!(Gender {
    Male => "male",
    Female => "female",
    Other => "other",
});

/// 病情严重程度，声明顺序即紧急程度由低到高
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

string_enum!(Severity {
    Low => "low",
    Medium => "medium",
    High => "high",
    Critical => "critical",
});

/// 患者排队状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum PatientStatus {
    Waiting,    // 候诊
    InProgress, // 就诊中
    Completed,  // 已完成
    Cancelled,  // 已取消
}

string_enum!(PatientStatus {
    Waiting => "waiting",
    InProgress => "in-progress",
    Completed => "completed",
    Cancelled => "cancelled",
});

impl PatientStatus {
    /// 医生与护士工作台关注的活跃状态
    pub const ACTIVE: &'static [PatientStatus] = &[PatientStatus::Waiting, PatientStatus::InProgress];

    pub fn is_terminal(&self) -> bool {
        matches!(self, PatientStatus::Completed | PatientStatus::Cancelled)
    }
}

/// 预约状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
    Missed,
}

string_enum!(AppointmentStatus {
    Scheduled => "scheduled",
    Completed => "completed",
    Cancelled => "cancelled",
    Missed => "missed",
});

/// 通知类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Info,
    Success,
    Warning,
    Error,
}

string_enum!(NotificationType {
    Info => "info",
    Success => "success",
    Warning => "warning",
    Error => "error",
});

/// 系统用户（员工或患者账号）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hospital_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// 医院下的科室或服务项目
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// 管理员设置的预计等待时间（分钟）
    pub estimated_wait_time: u32,
    pub is_available: bool,
}

/// 医院，即租户边界
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Hospital {
    pub id: Uuid,
    pub name: String,
    pub region: String,
    pub address: String,
    pub admin_id: Uuid,
    pub services: Vec<Service>,
    pub created_at: DateTime<Utc>,
}

impl Hospital {
    /// 当前开放的服务
    pub fn available_services(&self) -> Vec<Service> {
        self.services.iter().filter(|s| s.is_available).cloned().collect()
    }
}

/// 患者就诊登记记录
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: Uuid,
    pub name: String,
    pub age: u8,
    pub gender: Gender,
    pub phone_number: String,
    pub address: String,
    pub emergency_contact: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medical_history: Option<String>,
    pub current_status: PatientStatus,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_service: Option<Uuid>,
    pub hospital_id: Uuid,
    /// 登记时计算的预计等待时间（分钟）
    pub wait_time: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

/// 预约
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub patient_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_name: Option<String>,
    pub service_id: Uuid,
    pub service_name: String,
    pub date: NaiveDate,
    /// `HH:MM`
    pub time: String,
    pub status: AppointmentStatus,
    pub hospital_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

/// 站内通知
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub read: bool,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}
