//! 请求对象
//!
//! 表现层与服务层之间传递的数据对象，校验在服务层完成。

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{AppointmentStatus, Gender, NotificationType, PatientStatus, Severity, UserRole};

/// 患者登记请求
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPatientRequest {
    pub name: String,
    pub age: i32,
    pub gender: Gender,
    pub phone_number: String,
    pub address: String,
    pub emergency_contact: String,
    #[serde(default)]
    pub medical_history: Option<String>,
    pub severity: Severity,
    #[serde(default)]
    pub assigned_service: Option<Uuid>,
    /// 关联已有的患者账号，登记记录的 id 将与该账号 id 相同
    #[serde(default)]
    pub patient_account_id: Option<Uuid>,
}

/// 排队状态更新请求，`None` 表示保持原值
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueUpdateRequest {
    pub current_status: PatientStatus,
    #[serde(default)]
    pub assigned_service: Option<Uuid>,
    #[serde(default)]
    pub doctor_notes: Option<String>,
}

/// 医院注册请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterHospitalRequest {
    pub name: String,
    pub region: String,
    pub address: String,
}

/// 服务新增或修改请求
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub estimated_wait_time: i64,
    #[serde(default = "default_true")]
    pub is_available: bool,
}

fn default_true() -> bool {
    true
}

/// 账号注册请求
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: UserRole,
    #[serde(default)]
    pub phone_number: Option<String>,
}

/// 管理员添加员工请求
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffRequest {
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub phone_number: String,
    pub password: String,
}

/// 预约请求，必填项缺失时返回具体的校验错误
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleAppointmentRequest {
    #[serde(default)]
    pub patient_id: Option<Uuid>,
    #[serde(default)]
    pub doctor_id: Option<Uuid>,
    #[serde(default)]
    pub service_id: Option<Uuid>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub time: Option<String>,
}

/// 预约状态更新请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentStatusRequest {
    pub status: AppointmentStatus,
}

/// 发送通知请求
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRequest {
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    #[serde(rename = "type", default = "default_notification_type")]
    pub notification_type: NotificationType,
}

fn default_notification_type() -> NotificationType {
    NotificationType::Info
}
